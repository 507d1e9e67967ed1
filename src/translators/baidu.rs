//! Baidu fanyi API: MD5-signed GET requests authenticated by appid/appkey

use async_trait::async_trait;
use md5::{Digest, Md5};
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

use crate::core::errors::{TranslationError, TranslationResult};
use crate::translators::{http_client, preview, Translator};

const DEFAULT_URL: &str = "http://api.fanyi.baidu.com/api/trans/vip/translate";
const FROM_LANG: &str = "en";
const TO_LANG: &str = "zh";

/// Compute the request signature: `md5(appid + text + salt + appkey)` as lower hex
pub fn sign(appid: &str, text: &str, salt: u32, appkey: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(appid.as_bytes());
    hasher.update(text.as_bytes());
    hasher.update(salt.to_string().as_bytes());
    hasher.update(appkey.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Deserialize)]
struct TransPair {
    dst: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    trans_result: Option<Vec<TransPair>>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_msg: Option<String>,
}

/// Baidu translation client
#[derive(Debug, Clone)]
pub struct BaiduTranslator {
    client: reqwest::Client,
    appid: String,
    appkey: String,
    base_url: String,
}

impl BaiduTranslator {
    /// Create a client. Fails immediately if either credential is empty.
    pub fn new(appid: &str, appkey: &str, timeout: Duration) -> TranslationResult<Self> {
        for (field, value) in [("appid", appid), ("appkey", appkey)] {
            if value.trim().is_empty() {
                error!("baidu: {} is required", field);
                return Err(TranslationError::MissingCredentials {
                    provider: "baidu".to_string(),
                    field: field.to_string(),
                });
            }
        }

        Ok(Self {
            client: http_client(timeout)?,
            appid: appid.to_string(),
            appkey: appkey.to_string(),
            base_url: DEFAULT_URL.to_string(),
        })
    }

    /// Point the client at another endpoint
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Send one signed request with an explicit salt
    async fn request(&self, text: &str, salt: u32) -> TranslationResult<String> {
        let salt_str = salt.to_string();
        let signature = sign(&self.appid, text, salt, &self.appkey);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("appid", self.appid.as_str()),
                ("q", text),
                ("from", FROM_LANG),
                ("to", TO_LANG),
                ("salt", salt_str.as_str()),
                ("sign", signature.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("baidu: HTTP {} - {}", status, preview(&body));
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        parse_response(&body)
    }
}

/// Extract the translation or map Baidu's `error_code` to a failure
fn parse_response(body: &str) -> TranslationResult<String> {
    let response: ApiResponse = serde_json::from_str(body).map_err(|e| {
        error!("baidu: cannot decode response: {} - {}", e, preview(body));
        TranslationError::InvalidResponseError {
            message: e.to_string(),
        }
    })?;

    if let Some(pairs) = response.trans_result {
        let translation = pairs
            .into_iter()
            .map(|pair| pair.dst)
            .collect::<Vec<_>>()
            .join("\n");
        return Ok(translation);
    }

    let code = response.error_code.unwrap_or_default();
    let message = format!(
        "error_code {}: {}",
        code,
        response.error_msg.unwrap_or_default()
    );
    error!("baidu fanyi api {}", message);

    Err(match code.as_str() {
        "52003" | "54001" | "58002" => TranslationError::AuthError { message },
        "54003" | "54005" => TranslationError::RateLimitError { message },
        "" => TranslationError::InvalidResponseError {
            message: format!("neither trans_result nor error_code: {}", preview(body)),
        },
        _ => TranslationError::ApiError {
            status: 200,
            message,
        },
    })
}

#[async_trait]
impl Translator for BaiduTranslator {
    fn name(&self) -> &str {
        "baidu"
    }

    async fn translate(&self, text: &str) -> TranslationResult<String> {
        let salt = rand::thread_rng().gen_range(32_768..=65_536);
        debug!("baidu: translating {} chars (salt {})", text.chars().count(), salt);
        self.request(text, salt).await
    }
}
