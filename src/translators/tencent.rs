//! Tencent Cloud machine translation (TMT) over the TC3-HMAC-SHA256 signed API
//!
//! The types mirror the shape of the official SDK: a [`Credential`], an
//! [`HttpProfile`] wrapped in a [`ClientProfile`], a [`TmtClient`] bound to a
//! region, and one structured call per translation.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{debug, error};

use crate::core::config::TencentSettings;
use crate::core::errors::{TranslationError, TranslationResult};
use crate::translators::{http_client, preview, Translator};

type HmacSha256 = Hmac<Sha256>;

const SERVICE: &str = "tmt";
const ACTION: &str = "TextTranslate";
const API_VERSION: &str = "2018-03-21";
const ALGORITHM: &str = "TC3-HMAC-SHA256";
const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host";

/// Secret id/key pair
#[derive(Debug, Clone)]
pub struct Credential {
    /// SecretId
    pub secret_id: String,
    /// SecretKey
    pub secret_key: String,
}

impl Credential {
    /// Build a credential, rejecting empty secrets
    pub fn new(secret_id: &str, secret_key: &str) -> TranslationResult<Self> {
        for (field, value) in [("secret_id", secret_id), ("secret_key", secret_key)] {
            if value.trim().is_empty() {
                error!("You must specify the secret_id and secret_key for TencentTranslator");
                return Err(TranslationError::MissingCredentials {
                    provider: "tencent".to_string(),
                    field: field.to_string(),
                });
            }
        }

        Ok(Self {
            secret_id: secret_id.to_string(),
            secret_key: secret_key.to_string(),
        })
    }
}

/// Transport settings
#[derive(Debug, Clone)]
pub struct HttpProfile {
    /// URL scheme
    pub scheme: String,
    /// API host
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for HttpProfile {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            endpoint: "tmt.tencentcloudapi.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client settings
#[derive(Debug, Clone, Default)]
pub struct ClientProfile {
    /// Transport settings
    pub http_profile: HttpProfile,
}

/// `TextTranslate` request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextTranslateRequest {
    /// Text to translate
    pub source_text: String,
    /// Source language
    pub source: String,
    /// Target language
    pub target: String,
    /// Project, 0 for the default
    pub project_id: i64,
}

impl TextTranslateRequest {
    /// English to Chinese request for `text`
    pub fn en_to_zh(text: &str) -> Self {
        Self {
            source_text: text.to_string(),
            source: "en".to_string(),
            target: "zh".to_string(),
            project_id: 0,
        }
    }
}

/// `TextTranslate` success payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextTranslateResponse {
    /// Translated text
    pub target_text: String,
    /// Detected source language
    #[serde(default)]
    pub source: Option<String>,
    /// Target language
    #[serde(default)]
    pub target: Option<String>,
    /// Request id echoed by the API
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiError {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: serde_json::Value,
}

/// Signed client for the TMT API
#[derive(Debug, Clone)]
pub struct TmtClient {
    client: reqwest::Client,
    credential: Credential,
    region: String,
    profile: ClientProfile,
}

impl TmtClient {
    /// Create a client bound to a region
    pub fn new(
        credential: Credential,
        region: &str,
        profile: ClientProfile,
    ) -> TranslationResult<Self> {
        Ok(Self {
            client: http_client(profile.http_profile.timeout)?,
            credential,
            region: region.to_string(),
            profile,
        })
    }

    /// Issue one `TextTranslate` call
    pub async fn text_translate(
        &self,
        request: &TextTranslateRequest,
    ) -> TranslationResult<TextTranslateResponse> {
        let http = &self.profile.http_profile;
        let payload = serde_json::to_string(request)?;
        let timestamp = Utc::now().timestamp();
        let authorization = sign_tc3(
            &self.credential,
            SERVICE,
            &http.endpoint,
            &payload,
            timestamp,
        )?;

        let url = format!("{}://{}/", http.scheme, http.endpoint);
        let response = self
            .client
            .post(&url)
            .header("Authorization", authorization)
            .header("Content-Type", CONTENT_TYPE)
            .header("X-TC-Action", ACTION)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Version", API_VERSION)
            .header("X-TC-Region", &self.region)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        parse_response(&body)
    }
}

/// Map the `Response` envelope to the payload or a typed error
fn parse_response(body: &str) -> TranslationResult<TextTranslateResponse> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| TranslationError::InvalidResponseError {
            message: format!("{}: {}", e, preview(body)),
        })?;

    if let Some(err) = envelope.response.get("Error") {
        let err: ApiError = serde_json::from_value(err.clone())?;
        let message = format!("{}: {}", err.code, err.message);
        return Err(if err.code.starts_with("AuthFailure") {
            TranslationError::AuthError { message }
        } else if err.code.starts_with("RequestLimitExceeded")
            || err.code.starts_with("LimitExceeded")
        {
            TranslationError::RateLimitError { message }
        } else {
            TranslationError::ApiError {
                status: 200,
                message,
            }
        });
    }

    serde_json::from_value(envelope.response).map_err(|e| TranslationError::InvalidResponseError {
        message: e.to_string(),
    })
}

fn hmac_sha256(key: &[u8], message: &str) -> TranslationResult<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| TranslationError::AuthError {
            message: format!("invalid signing key: {}", e),
        })?;
    mac.update(message.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(message: &str) -> String {
    hex::encode(Sha256::digest(message.as_bytes()))
}

/// Build the TC3-HMAC-SHA256 `Authorization` header for a JSON POST to `/`.
pub fn sign_tc3(
    credential: &Credential,
    service: &str,
    host: &str,
    payload: &str,
    timestamp: i64,
) -> TranslationResult<String> {
    let date = Utc
        .timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| TranslationError::AuthError {
            message: format!("invalid timestamp {}", timestamp),
        })?
        .format("%Y-%m-%d")
        .to_string();

    let canonical_request = format!(
        "POST\n/\n\ncontent-type:{}\nhost:{}\n\n{}\n{}",
        CONTENT_TYPE,
        host,
        SIGNED_HEADERS,
        sha256_hex(payload)
    );

    let credential_scope = format!("{}/{}/tc3_request", date, service);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        timestamp,
        credential_scope,
        sha256_hex(&canonical_request)
    );

    let secret_date = hmac_sha256(format!("TC3{}", credential.secret_key).as_bytes(), &date)?;
    let secret_service = hmac_sha256(&secret_date, service)?;
    let secret_signing = hmac_sha256(&secret_service, "tc3_request")?;
    let signature = hex::encode(hmac_sha256(&secret_signing, &string_to_sign)?);

    Ok(format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, credential.secret_id, credential_scope, SIGNED_HEADERS, signature
    ))
}

/// Tencent translation backend
#[derive(Debug, Clone)]
pub struct TencentTranslator {
    client: TmtClient,
}

impl TencentTranslator {
    /// Create a translator from configuration
    pub fn from_settings(settings: &TencentSettings, timeout: Duration) -> TranslationResult<Self> {
        let credential = Credential::new(&settings.secret_id, &settings.secret_key)?;
        let profile = ClientProfile {
            http_profile: HttpProfile {
                scheme: settings.scheme.clone(),
                endpoint: settings.endpoint.clone(),
                timeout,
            },
        };

        Ok(Self {
            client: TmtClient::new(credential, &settings.region, profile)?,
        })
    }
}

#[async_trait]
impl Translator for TencentTranslator {
    fn name(&self) -> &str {
        "tencent"
    }

    async fn translate(&self, text: &str) -> TranslationResult<String> {
        debug!("tencent: translating {} chars", text.chars().count());

        let request = TextTranslateRequest::en_to_zh(text);
        match self.client.text_translate(&request).await {
            Ok(response) => Ok(response.target_text),
            Err(e) => {
                error!("Error to use TencentAPI with {}", e);
                Err(e)
            }
        }
    }
}
