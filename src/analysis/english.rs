//! Extractive summary of English text

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use stop_words::{get, LANGUAGE};

use crate::analysis::textrank;

/// Share of sentences kept in the summary
const SUMMARY_RATIO: f64 = 0.2;

fn stop_words() -> &'static HashSet<String> {
    static WORDS: OnceLock<HashSet<String>> = OnceLock::new();
    WORDS.get_or_init(|| {
        get(LANGUAGE::English)
            .iter()
            .map(|w| w.to_string().to_lowercase())
            .collect()
    })
}

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[A-Za-z0-9][A-Za-z0-9'\-]*").expect("valid regex"))
}

/// Split into trimmed sentences after `.`, `!` or `?` followed by whitespace
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Lowercased content words of a sentence
fn content_words(sentence: &str) -> Vec<String> {
    let stop = stop_words();
    word_pattern()
        .find_iter(sentence)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| !stop.contains(w))
        .collect()
}

/// Select the top-ranked fifth of the sentences (at least one), in document order
pub fn summarize(text: &str) -> Vec<String> {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return Vec::new();
    }

    let words: Vec<Vec<String>> = sentences.iter().map(|s| content_words(s)).collect();
    let keep = ((sentences.len() as f64 * SUMMARY_RATIO) as usize).max(1);

    let mut selected: Vec<usize> = textrank::rank_sentences(&words)
        .into_iter()
        .take(keep)
        .collect();
    selected.sort_unstable();

    selected.into_iter().map(|i| sentences[i].clone()).collect()
}
