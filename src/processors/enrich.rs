//! Entry enrichment: author splitting, abstract translation, summaries and keywords

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::analysis;
use crate::core::config::FailurePolicy;
use crate::core::errors::TranslationResult;
use crate::core::models::{
    BibEntry, FieldValue, ABSTRACT, ABSTRACT_CN, AUTHOR, CHINESE_KEYPHRASE, CHINESE_KEYWORDS,
    CHINESE_SUMMARY, ENGLISH_SUMMARY,
};
use crate::translators::Translator;

/// Literal separator between names in a BibTeX author list
pub const AUTHOR_DELIMITER: &str = " and ";

/// Outcome of enriching one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichOutcome {
    /// No abstract; at most the author list was split
    NoAbstract,
    /// Abstract translated and analysed
    Enriched,
    /// Translation failed, untranslated text used instead
    Fallback,
    /// Translation failed, derived fields omitted
    Skipped,
}

/// Counters for a batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    /// Entries translated and analysed
    pub enriched: usize,
    /// Entries analysed on the untranslated abstract
    pub fallback: usize,
    /// Entries whose translation failed
    pub skipped: usize,
    /// Entries with no abstract
    pub without_abstract: usize,
}

impl EnrichStats {
    fn record(&mut self, outcome: EnrichOutcome) {
        match outcome {
            EnrichOutcome::NoAbstract => self.without_abstract += 1,
            EnrichOutcome::Enriched => self.enriched += 1,
            EnrichOutcome::Fallback => self.fallback += 1,
            EnrichOutcome::Skipped => self.skipped += 1,
        }
    }
}

/// Split `"A and B and C"` into `["A", "B", "C"]`
pub fn split_authors(authors: &str) -> Vec<String> {
    authors
        .split(AUTHOR_DELIMITER)
        .map(str::to_string)
        .collect()
}

/// Remove embedded line breaks
pub fn strip_newlines(text: &str) -> String {
    text.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

/// Enrich one entry in place.
///
/// Translation failures never escape: depending on `policy` the entry either
/// keeps going with the untranslated abstract or is left without any
/// translation-derived field.
pub async fn enrich(
    entry: &mut BibEntry,
    translator: &dyn Translator,
    policy: FailurePolicy,
) -> EnrichOutcome {
    if let Some(authors) = entry.get_text(AUTHOR) {
        let authors = split_authors(authors);
        entry.set(AUTHOR, authors);
    }

    let Some(raw) = entry.get_text(ABSTRACT) else {
        return EnrichOutcome::NoAbstract;
    };

    let abstract_en = strip_newlines(raw);
    entry.set(ABSTRACT, abstract_en.clone());

    let (abstract_cn, outcome) = match translate_abstract(translator, &abstract_en).await {
        Ok(translated) => (translated, EnrichOutcome::Enriched),
        Err(e) => {
            let id = entry.id().unwrap_or("<unknown>");
            warn!(
                "Translation via {} failed for entry {} ({} chars): {}",
                translator.name(),
                id,
                abstract_en.chars().count(),
                e
            );
            match policy {
                FailurePolicy::Skip => return EnrichOutcome::Skipped,
                FailurePolicy::Original => (abstract_en.clone(), EnrichOutcome::Fallback),
            }
        }
    };

    let english_summary = analysis::summarize_english(&abstract_en);
    let chinese_summary = analysis::summarize_chinese(&abstract_cn);
    let (chinese_keywords, chinese_keyphrase) = analysis::extract_chinese_keywords(&abstract_cn);

    entry.set(ABSTRACT_CN, abstract_cn);
    entry.set(ENGLISH_SUMMARY, FieldValue::List(english_summary));
    entry.set(CHINESE_SUMMARY, FieldValue::List(chinese_summary));
    entry.set(CHINESE_KEYWORDS, FieldValue::List(chinese_keywords));
    entry.set(CHINESE_KEYPHRASE, FieldValue::List(chinese_keyphrase));

    outcome
}

async fn translate_abstract(translator: &dyn Translator, text: &str) -> TranslationResult<String> {
    debug!("Translating abstract ({} chars) via {}", text.chars().count(), translator.name());
    translator.translate(text).await
}

/// Enrich every entry sequentially, one translation at a time
pub async fn enrich_all(
    entries: &mut [BibEntry],
    translator: &dyn Translator,
    policy: FailurePolicy,
    progress: Option<&ProgressBar>,
) -> EnrichStats {
    let mut stats = EnrichStats::default();

    for entry in entries.iter_mut() {
        if let Some(pb) = progress {
            pb.set_message(entry.id().unwrap_or_default().to_string());
        }

        let outcome = enrich(entry, translator, policy).await;
        stats.record(outcome);

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    info!(
        "Enrichment finished: {} enriched, {} fallback, {} skipped, {} without abstract",
        stats.enriched, stats.fallback, stats.skipped, stats.without_abstract
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::TranslationError;
    use crate::translators::IdentityTranslator;
    use async_trait::async_trait;

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        fn name(&self) -> &str {
            "failing"
        }

        async fn translate(&self, _text: &str) -> TranslationResult<String> {
            Err(TranslationError::NetworkError {
                message: "connection refused".to_string(),
            })
        }
    }

    fn list(entry: &BibEntry, key: &str) -> Vec<String> {
        match entry.get(key) {
            Some(FieldValue::List(items)) => items.clone(),
            other => panic!("{} is not a list: {:?}", key, other),
        }
    }

    #[test]
    fn test_split_authors_preserves_order() {
        assert_eq!(split_authors("A and B and C"), vec!["A", "B", "C"]);
        assert_eq!(split_authors("Solo"), vec!["Solo"]);
        // only the spaced delimiter splits
        assert_eq!(split_authors("Anderson and Band"), vec!["Anderson", "Band"]);
    }

    #[tokio::test]
    async fn test_identity_translation_strips_newlines() {
        let mut entry = BibEntry::new("k", "t").with_field(ABSTRACT, "Hello\nWorld");
        let outcome = enrich(&mut entry, &IdentityTranslator, FailurePolicy::Skip).await;

        assert_eq!(outcome, EnrichOutcome::Enriched);
        assert_eq!(entry.get_text(ABSTRACT), Some("HelloWorld"));
        assert_eq!(entry.get_text(ABSTRACT_CN), Some("HelloWorld"));
        assert!(entry.contains(ENGLISH_SUMMARY));
        assert!(entry.contains(CHINESE_SUMMARY));
        assert!(entry.contains(CHINESE_KEYWORDS));
        assert!(entry.contains(CHINESE_KEYPHRASE));
    }

    #[tokio::test]
    async fn test_entry_without_abstract_only_splits_authors() {
        let mut entry = BibEntry::new("k", "t").with_field(AUTHOR, "A and B and C");
        let outcome = enrich(&mut entry, &IdentityTranslator, FailurePolicy::Skip).await;

        assert_eq!(outcome, EnrichOutcome::NoAbstract);
        assert_eq!(list(&entry, AUTHOR), vec!["A", "B", "C"]);
        assert!(!entry.contains(ABSTRACT_CN));
        assert!(!entry.contains(ENGLISH_SUMMARY));
        assert_eq!(entry.len(), 3);
    }

    #[tokio::test]
    async fn test_entry_without_author_or_abstract_is_untouched() {
        let original = BibEntry::new("k", "t").with_field("year", "2020");
        let mut entry = original.clone();
        enrich(&mut entry, &IdentityTranslator, FailurePolicy::Skip).await;
        assert_eq!(entry, original);
    }

    #[tokio::test]
    async fn test_failure_skip_omits_derived_fields() {
        let mut entry = BibEntry::new("k", "t")
            .with_field(AUTHOR, "A and B")
            .with_field(ABSTRACT, "Line one.\nLine two.");
        let outcome = enrich(&mut entry, &FailingTranslator, FailurePolicy::Skip).await;

        assert_eq!(outcome, EnrichOutcome::Skipped);
        assert_eq!(entry.get_text(ABSTRACT), Some("Line one.Line two."));
        assert_eq!(list(&entry, AUTHOR), vec!["A", "B"]);
        for key in [ABSTRACT_CN, ENGLISH_SUMMARY, CHINESE_SUMMARY, CHINESE_KEYWORDS, CHINESE_KEYPHRASE] {
            assert!(!entry.contains(key), "{} should be absent", key);
        }
    }

    #[tokio::test]
    async fn test_failure_original_uses_untranslated_text() {
        let mut entry = BibEntry::new("k", "t").with_field(ABSTRACT, "Some text.");
        let outcome = enrich(&mut entry, &FailingTranslator, FailurePolicy::Original).await;

        assert_eq!(outcome, EnrichOutcome::Fallback);
        assert_eq!(entry.get_text(ABSTRACT_CN), Some("Some text."));
        assert!(entry.contains(CHINESE_KEYWORDS));
    }

    #[tokio::test]
    async fn test_batch_continues_after_failure() {
        let mut entries = vec![
            BibEntry::new("a", "A").with_field(ABSTRACT, "First."),
            BibEntry::new("b", "B"),
            BibEntry::new("c", "C").with_field(ABSTRACT, "Third."),
        ];

        let stats = enrich_all(&mut entries, &FailingTranslator, FailurePolicy::Skip, None).await;
        assert_eq!(
            stats,
            EnrichStats {
                enriched: 0,
                fallback: 0,
                skipped: 2,
                without_abstract: 1,
            }
        );
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2].get_text(ABSTRACT), Some("Third."));
    }
}
