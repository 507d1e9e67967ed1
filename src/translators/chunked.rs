//! Long-text decorator: texts at or above the limit are split on sentence
//! boundaries and translated chunk by chunk.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::errors::TranslationResult;
use crate::translators::Translator;

/// Character count at which providers start truncating or rejecting input
pub const DEFAULT_MAX_CHARS: usize = 5000;

/// Splits long input and concatenates the translated chunks in order
#[derive(Debug, Clone)]
pub struct ChunkedTranslator<T> {
    inner: T,
    max_chars: usize,
}

impl<T: Translator> ChunkedTranslator<T> {
    /// Wrap `inner`; a `max_chars` of 0 falls back to the default
    pub fn new(inner: T, max_chars: usize) -> Self {
        let max_chars = if max_chars == 0 {
            DEFAULT_MAX_CHARS
        } else {
            max_chars
        };
        Self { inner, max_chars }
    }
}

#[async_trait]
impl<T: Translator> Translator for ChunkedTranslator<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn translate(&self, text: &str) -> TranslationResult<String> {
        let length = text.chars().count();
        if length < self.max_chars {
            return self.inner.translate(text).await;
        }

        let chunks = split_into_chunks(text, self.max_chars);
        info!(
            "{}: splitting {} chars into {} chunks",
            self.inner.name(),
            length,
            chunks.len()
        );

        let mut translated = String::new();
        for (index, chunk) in chunks.iter().enumerate() {
            debug!("{}: chunk {} ({} chars)", self.inner.name(), index, chunk.chars().count());
            translated.push_str(&self.inner.translate(chunk).await?);
        }

        Ok(translated)
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '。' | '！' | '？' | '；')
}

/// Split after each sentence terminator, keeping trailing whitespace with the
/// sentence it follows.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut after_terminator = false;

    for (i, c) in text.char_indices() {
        if after_terminator && !c.is_whitespace() && !is_terminator(c) {
            sentences.push(&text[start..i]);
            start = i;
            after_terminator = false;
        }
        if is_terminator(c) {
            after_terminator = true;
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Pack sentences greedily into chunks of fewer than `max_chars` chars.
/// A sentence that alone reaches the limit is hard-split on char boundaries.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let limit = max_chars.saturating_sub(1).max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in split_sentences(text) {
        let sentence_len = sentence.chars().count();

        if current_len + sentence_len <= limit {
            current.push_str(sentence);
            current_len += sentence_len;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if sentence_len <= limit {
            current.push_str(sentence);
            current_len = sentence_len;
        } else {
            let chars: Vec<char> = sentence.chars().collect();
            for piece in chars.chunks(limit) {
                chunks.push(piece.iter().collect());
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
