//! Summaries and keywords for English and Chinese abstracts
//!
//! Fixed-parameter wrappers: tokenisation comes from `jieba-rs` and
//! `stop-words`, keyword ranking from `jieba_rs::TextRank`,
//! sentence ranking from [`textrank`].

pub mod chinese;
pub mod english;
pub mod textrank;

/// Extractive summary of English text, sentences in document order
pub fn summarize_english(text: &str) -> Vec<String> {
    english::summarize(text)
}

/// Up to three top-ranked sentences of Chinese text, in rank order
pub fn summarize_chinese(text: &str) -> Vec<String> {
    chinese::summarize(text)
}

/// Up to ten keywords (min length 2) and the keyphrases occurring at least twice
pub fn extract_chinese_keywords(text: &str) -> (Vec<String>, Vec<String>) {
    chinese::extract_keywords(text)
}
