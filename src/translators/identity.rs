//! No-op translator

use async_trait::async_trait;

use crate::core::errors::TranslationResult;
use crate::translators::Translator;

/// Returns its input unchanged. Used in test mode or to disable translation.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    fn name(&self) -> &str {
        "none"
    }

    async fn translate(&self, text: &str) -> TranslationResult<String> {
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identity() {
        let translator = IdentityTranslator;
        assert_eq!(translator.translate("").await.unwrap(), "");
        assert_eq!(translator.translate("HelloWorld").await.unwrap(), "HelloWorld");
    }
}
