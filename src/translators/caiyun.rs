//! Caiyun (彩云小译) API: JSON POST authenticated by an `x-authorization` token

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use crate::core::errors::{TranslationError, TranslationResult};
use crate::translators::{http_client, preview, Translator};

const DEFAULT_URL: &str = "http://api.interpreter.caiyunai.com/v1/translator";
const DIRECTION: &str = "auto2zh";
const REQUEST_ID: &str = "bibtex_metadata";

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    source: &'a str,
    trans_type: &'a str,
    request_id: &'a str,
    detect: bool,
}

/// Caiyun translation client
#[derive(Debug, Clone)]
pub struct CaiyunTranslator {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl CaiyunTranslator {
    /// Create a client. Fails immediately on an empty token.
    pub fn new(token: &str, timeout: Duration) -> TranslationResult<Self> {
        if token.trim().is_empty() {
            error!("caiyun: empty token");
            return Err(TranslationError::MissingCredentials {
                provider: "caiyun".to_string(),
                field: "token".to_string(),
            });
        }

        Ok(Self {
            client: http_client(timeout)?,
            token: token.to_string(),
            base_url: DEFAULT_URL.to_string(),
        })
    }

    /// Point the client at another endpoint
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }
}

#[async_trait]
impl Translator for CaiyunTranslator {
    fn name(&self) -> &str {
        "caiyun"
    }

    async fn translate(&self, text: &str) -> TranslationResult<String> {
        debug!("caiyun: translating {} chars", text.chars().count());

        let payload = TranslateRequest {
            source: text,
            trans_type: DIRECTION,
            request_id: REQUEST_ID,
            detect: true,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("Content-Type", "application/json")
            .header("x-authorization", format!("token {}", self.token))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;

        match status.as_u16() {
            200..=299 => {}
            401 | 403 => {
                return Err(TranslationError::AuthError {
                    message: preview(&raw),
                })
            }
            429 => {
                return Err(TranslationError::RateLimitError {
                    message: preview(&raw),
                })
            }
            code => {
                error!("caiyun: HTTP {} - {}", code, preview(&raw));
                return Err(TranslationError::ApiError {
                    status: code,
                    message: preview(&raw),
                });
            }
        }

        parse_response(&raw)
    }
}

/// Decode the literal `\uXXXX` escapes Caiyun leaves in its body, then drop
/// embedded line breaks so the result parses as JSON.
///
/// Escapes that would decode to `"`, `\` or a control character are kept as-is,
/// as are all non-`\u` escapes, so string literals stay well formed.
pub fn decode_escaped_body(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '\\' || i + 1 >= chars.len() {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        if chars[i + 1] != 'u' {
            // keep the escape pair intact, so `\\u0041` stays `\\u0041`
            out.push(chars[i]);
            out.push(chars[i + 1]);
            i += 2;
            continue;
        }

        let Some(high) = hex4(&chars, i + 2) else {
            out.push(chars[i]);
            i += 1;
            continue;
        };

        let mut consumed = 6;
        let decoded = if (0xD800..0xDC00).contains(&high) {
            let low = if chars.get(i + 6) == Some(&'\\') && chars.get(i + 7) == Some(&'u') {
                hex4(&chars, i + 8).filter(|low| (0xDC00..0xE000).contains(low))
            } else {
                None
            };
            low.and_then(|low| {
                consumed = 12;
                char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
            })
        } else {
            char::from_u32(high)
        };

        match decoded {
            Some(c) if c != '"' && c != '\\' && !c.is_control() => {
                out.push(c);
                i += consumed;
            }
            _ => {
                out.extend(&chars[i..i + 6]);
                i += 6;
            }
        }
    }

    out.retain(|c| c != '\n' && c != '\r');
    out
}

fn hex4(chars: &[char], start: usize) -> Option<u32> {
    let digits: String = chars.get(start..start + 4)?.iter().collect();
    u32::from_str_radix(&digits, 16).ok()
}

/// Decode the body and pull out `target`
fn parse_response(raw: &str) -> TranslationResult<String> {
    let decoded = decode_escaped_body(raw);

    let json: Value = serde_json::from_str(&decoded).map_err(|e| {
        error!("caiyun: error to load data: {}", e);
        error!("caiyun: data is {}", preview(&decoded));
        TranslationError::InvalidResponseError {
            message: e.to_string(),
        }
    })?;

    match &json["target"] {
        Value::String(target) => Ok(target.clone()),
        Value::Array(items) => Ok(items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join("")),
        _ => {
            let message = json["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("no target in response: {}", preview(&decoded)));
            if message.to_lowercase().contains("token") {
                Err(TranslationError::AuthError { message })
            } else {
                Err(TranslationError::InvalidResponseError { message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_decode_unicode_escapes() {
        let raw = r#"{"target": "\u4f60\u597d"}"#;
        assert_eq!(decode_escaped_body(raw), r#"{"target": "你好"}"#);
    }

    #[test]
    fn test_decode_surrogate_pair() {
        assert_eq!(decode_escaped_body(r"\ud83d\ude00"), "\u{1F600}");
        // a lone high surrogate is left escaped
        assert_eq!(decode_escaped_body(r"\ud83d!"), r"\ud83d!");
    }

    #[test]
    fn test_decode_keeps_json_breaking_escapes() {
        assert_eq!(decode_escaped_body(r"a\u0022b"), r"a\u0022b");
        assert_eq!(decode_escaped_body(r"a\u000ab"), r"a\u000ab");
        assert_eq!(decode_escaped_body(r#"say \"hi\""#), r#"say \"hi\""#);
        assert_eq!(decode_escaped_body(r"\\u4f60"), r"\\u4f60");
    }

    #[test]
    fn test_decode_strips_raw_newlines() {
        let raw = "{\n  \"target\": \"\\u4e16\\u754c\"\r\n}";
        assert_eq!(decode_escaped_body(raw), "{  \"target\": \"世界\"}");
    }

    #[test]
    fn test_parse_response() {
        let raw = "{\"confidence\": 0.8, \"rc\": 0,\n \"target\": \"\\u6458\\u8981\"}";
        assert_eq!(parse_response(raw).unwrap(), "摘要");
    }

    #[test]
    fn test_parse_response_failures() {
        assert!(matches!(
            parse_response("not json"),
            Err(TranslationError::InvalidResponseError { .. })
        ));
        assert!(matches!(
            parse_response(r#"{"message": "Invalid token"}"#),
            Err(TranslationError::AuthError { .. })
        ));
    }

    #[test]
    fn test_request_payload_shape() {
        let payload = TranslateRequest {
            source: "Hello",
            trans_type: DIRECTION,
            request_id: REQUEST_ID,
            detect: true,
        };
        assert_json_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "source": "Hello",
                "trans_type": "auto2zh",
                "request_id": "bibtex_metadata",
                "detect": true
            })
        );
    }

    #[test]
    fn test_new_requires_token() {
        assert!(matches!(
            CaiyunTranslator::new("", Duration::from_secs(1)),
            Err(TranslationError::MissingCredentials { .. })
        ));
    }

    #[tokio::test]
    async fn test_translate_against_mock_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("x-authorization", "token secret"))
            .and(body_json(json!({
                "source": "Hello",
                "trans_type": "auto2zh",
                "request_id": "bibtex_metadata",
                "detect": true
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{\"rc\": 0, \"target\": \"\\u4f60\\u597d\"}\n"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let translator = CaiyunTranslator::new("secret", Duration::from_secs(5))
            .unwrap()
            .with_base_url(&server.uri());

        assert_eq!(translator.translate("Hello").await.unwrap(), "你好");
    }

    #[tokio::test]
    async fn test_translate_maps_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let translator = CaiyunTranslator::new("bad", Duration::from_secs(5))
            .unwrap()
            .with_base_url(&server.uri());

        assert!(matches!(
            translator.translate("Hello").await,
            Err(TranslationError::AuthError { .. })
        ));
    }
}
