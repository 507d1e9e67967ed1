//! Translation providers behind a single `translate(text) -> text` contract
//!
//! Each backend owns its authentication and request/response framing. Every
//! backend reports failures as a [`TranslationError`]; none of them substitutes
//! an empty or original string on its own. Fallback is decided by the
//! enrichment pipeline.

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::core::config::{AppConfig, Provider, TranslatorSettings};
use crate::core::errors::TranslationResult;

pub mod baidu;
pub mod caiyun;
pub mod chunked;
pub mod google;
pub mod identity;
pub mod rate_limited;
pub mod tencent;

pub use baidu::BaiduTranslator;
pub use caiyun::CaiyunTranslator;
pub use chunked::ChunkedTranslator;
pub use google::GoogleTranslator;
pub use identity::IdentityTranslator;
pub use rate_limited::RateLimitedTranslator;
pub use tencent::TencentTranslator;

/// A translation backend.
///
/// Implementations are called sequentially, one request at a time; they need not
/// tolerate concurrent use beyond what `Send + Sync` already implies.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Translate `text` into Chinese
    async fn translate(&self, text: &str) -> TranslationResult<String>;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn translate(&self, text: &str) -> TranslationResult<String> {
        (**self).translate(text).await
    }
}

/// Build the HTTP client shared by one backend instance
pub(crate) fn http_client(timeout: Duration) -> TranslationResult<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .build()?;
    Ok(client)
}

/// Truncate a response body for log output
pub(crate) fn preview(body: &str) -> String {
    const LIMIT: usize = 200;
    if body.chars().count() <= LIMIT {
        body.to_string()
    } else {
        let head: String = body.chars().take(LIMIT).collect();
        format!("{}...", head)
    }
}

/// Construct the configured provider, wrapped in rate limiting when a delay is
/// set, then in chunking.
pub fn build_translator(config: &AppConfig) -> TranslationResult<Box<dyn Translator>> {
    let settings = &config.translator;
    let timeout = Duration::from_millis(settings.timeout_ms);

    let backend: Box<dyn Translator> = match settings.provider {
        Provider::None => Box::new(IdentityTranslator),
        Provider::Google => Box::new(GoogleTranslator::with_base_url(
            &config.google.base_url,
            timeout,
        )?),
        Provider::Baidu => Box::new(
            BaiduTranslator::new(&config.baidu.appid, &config.baidu.appkey, timeout)?
                .with_base_url(&config.baidu.base_url),
        ),
        Provider::Caiyun => Box::new(
            CaiyunTranslator::new(&config.caiyun.token, timeout)?
                .with_base_url(&config.caiyun.base_url),
        ),
        Provider::Tencent => Box::new(TencentTranslator::from_settings(&config.tencent, timeout)?),
    };

    info!("Using translation provider: {}", backend.name());

    Ok(compose(backend, settings))
}

/// Rate limiting sits directly on the backend so each chunk request waits
fn compose(backend: Box<dyn Translator>, settings: &TranslatorSettings) -> Box<dyn Translator> {
    let limited: Box<dyn Translator> = if settings.rate_delay_ms > 0 {
        Box::new(RateLimitedTranslator::new(
            backend,
            Duration::from_millis(settings.rate_delay_ms),
        ))
    } else {
        backend
    };

    Box::new(ChunkedTranslator::new(limited, settings.max_chunk_chars))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::TranslationError;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    /// Records the start time of every call
    struct StampingTranslator {
        stamps: Arc<Mutex<Vec<Instant>>>,
    }

    #[async_trait]
    impl Translator for StampingTranslator {
        fn name(&self) -> &str {
            "stamping"
        }

        async fn translate(&self, text: &str) -> TranslationResult<String> {
            self.stamps.lock().unwrap().push(Instant::now());
            Ok(text.to_string())
        }
    }

    #[tokio::test]
    async fn test_delay_applies_between_chunk_requests() {
        let stamps = Arc::new(Mutex::new(Vec::new()));
        let settings = TranslatorSettings {
            rate_delay_ms: 30,
            max_chunk_chars: 20,
            ..TranslatorSettings::default()
        };
        let translator = compose(
            Box::new(StampingTranslator {
                stamps: Arc::clone(&stamps),
            }),
            &settings,
        );

        let text = "ab. ".repeat(20);
        assert_eq!(translator.translate(&text).await.unwrap(), text);

        let stamps = stamps.lock().unwrap();
        assert!(stamps.len() > 1);
        for pair in stamps.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(30));
        }
    }

    #[tokio::test]
    async fn test_build_identity_translator() {
        let mut config = AppConfig::default();
        config.translator.provider = Provider::None;

        let translator = build_translator(&config).unwrap();
        assert_eq!(translator.name(), "none");
        assert_eq!(translator.translate("Hello").await.unwrap(), "Hello");
    }

    #[tokio::test]
    async fn test_build_rate_limited_identity_translator() {
        let mut config = AppConfig::default();
        config.translator.provider = Provider::None;
        config.translator.rate_delay_ms = 1;

        let translator = build_translator(&config).unwrap();
        assert_eq!(translator.translate("Hello").await.unwrap(), "Hello");
    }

    #[test]
    fn test_build_fails_fast_without_credentials() {
        let mut config = AppConfig::default();
        config.translator.provider = Provider::Caiyun;

        let result = build_translator(&config);
        assert!(matches!(
            result,
            Err(TranslationError::MissingCredentials { .. })
        ));
    }

    #[test]
    fn test_preview_truncates_long_bodies() {
        let body = "x".repeat(500);
        let short = preview(&body);
        assert_eq!(short.chars().count(), 203);
        assert_eq!(preview("ok"), "ok");
    }
}
