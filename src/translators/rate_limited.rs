//! Fixed-delay decorator for provider quotas

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

use crate::core::errors::TranslationResult;
use crate::translators::Translator;

/// Sleeps `delay` before every call to the wrapped translator. Never retries.
#[derive(Debug, Clone)]
pub struct RateLimitedTranslator<T> {
    inner: T,
    delay: Duration,
}

impl<T: Translator> RateLimitedTranslator<T> {
    /// Wrap `inner`
    pub fn new(inner: T, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Unwrap the inner translator
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[async_trait]
impl<T: Translator> Translator for RateLimitedTranslator<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn translate(&self, text: &str) -> TranslationResult<String> {
        debug!("{}: waiting {:?} before request", self.inner.name(), self.delay);
        sleep(self.delay).await;
        self.inner.translate(text).await
    }
}
