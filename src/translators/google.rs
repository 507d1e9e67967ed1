//! Google translate web endpoint with the public `gtx` consumer key

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use crate::core::errors::{TranslationError, TranslationResult};
use crate::translators::{http_client, preview, Translator};

const CLIENT_KEY: &str = "gtx";
const TARGET_LANG: &str = "zh-CN";

/// Browser-oriented Google translation client. One round trip per call, no
/// caching or retry.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslator {
    /// Create a client against a custom endpoint
    pub fn with_base_url(base_url: &str, timeout: Duration) -> TranslationResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(&self, text: &str) -> TranslationResult<String> {
        debug!("google: translating {} chars", text.chars().count());

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("client", CLIENT_KEY),
                ("sl", "auto"),
                ("tl", TARGET_LANG),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.as_u16() == 429 {
            return Err(TranslationError::RateLimitError {
                message: preview(&body),
            });
        }

        if !status.is_success() {
            error!("google: HTTP {} - {}", status, preview(&body));
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        parse_response(&body)
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// The body looks like `[[["你好","Hello",null,null,10],...],null,"en",...]`.
fn parse_response(body: &str) -> TranslationResult<String> {
    let json: Value = serde_json::from_str(body)?;

    let segments = json
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::InvalidResponseError {
            message: format!("no sentence array in response: {}", preview(body)),
        })?;

    let translation: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    Ok(translation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_response_joins_segments() {
        let body = r#"[[["你好。","Hello.",null,null,10],["世界","World",null,null,10]],null,"en"]"#;
        assert_eq!(parse_response(body).unwrap(), "你好。世界");
    }

    #[test]
    fn test_parse_response_rejects_unexpected_shape() {
        let result = parse_response(r#"{"error": "nope"}"#);
        assert!(matches!(
            result,
            Err(TranslationError::InvalidResponseError { .. })
        ));
    }

    #[tokio::test]
    async fn test_translate_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("client", "gtx"))
            .and(query_param("tl", "zh-CN"))
            .and(query_param("q", "Hello"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"[[["你好","Hello",null,null,1]],null,"en"]"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let translator =
            GoogleTranslator::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap();
        assert_eq!(translator.translate("Hello").await.unwrap(), "你好");
    }

    #[tokio::test]
    async fn test_translate_maps_429_to_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .mount(&server)
            .await;

        let translator =
            GoogleTranslator::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap();
        let result = translator.translate("Hello").await;
        assert!(matches!(result, Err(TranslationError::RateLimitError { .. })));
    }
}
