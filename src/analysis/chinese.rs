//! TextRank sentence and keyword extraction for Chinese text

use jieba_rs::{Jieba, KeywordExtract, KeywordExtractConfig, TextRank, DEFAULT_STOP_WORDS};
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

use crate::analysis::textrank;

/// Co-occurrence window for the keyword graph
const WINDOW: usize = 5;
/// Sentences returned by [`summarize`]
const SUMMARY_SENTENCES: usize = 3;
/// Sentences shorter than this many chars are not summary candidates
const SENTENCE_MIN_LEN: usize = 6;
/// Keywords returned by [`extract_keywords`]
const KEYWORD_COUNT: usize = 10;
const KEYWORD_MIN_LEN: usize = 2;
/// Top keywords considered when assembling keyphrases
const KEYPHRASE_CANDIDATES: usize = 20;
const KEYPHRASE_MIN_OCCUR: usize = 2;

/// Part-of-speech tags kept by the "all_filters" word source
const ALLOWED_POS: &[&str] = &[
    "an", "i", "j", "l", "n", "nr", "nrfg", "ns", "nt", "nz", "t", "v", "vd", "vn", "eng",
];

const STOP_WORDS: &[&str] = &[
    "的", "了", "和", "是", "在", "与", "及", "或", "等", "对", "将", "被", "把", "从", "为",
    "以", "于", "而", "并", "也", "都", "就", "还", "又", "这", "那", "其", "之", "中", "上",
    "下", "我们", "你们", "他们", "它们", "本文", "一个", "一种", "这些", "那些", "这种", "可以",
    "能够", "通过", "进行", "使用", "基于", "以及", "因此", "但是", "然而", "如果", "由于", "所以",
    "已经", "没有", "不是", "就是", "还是", "并且", "而且", "其中", "之间", "有", "会", "能",
    "要", "让", "使", "则", "该", "此", "各", "每", "a", "an", "the", "of", "and", "to", "in",
];

const DELIMITERS: &[char] = &['?', '!', ';', '？', '！', '。', '；', '…', '\n'];

fn jieba() -> &'static Jieba {
    static JIEBA: OnceLock<Jieba> = OnceLock::new();
    JIEBA.get_or_init(Jieba::new)
}

/// jieba's default list plus the Chinese function words above
fn stop_words() -> &'static BTreeSet<String> {
    static WORDS: OnceLock<BTreeSet<String>> = OnceLock::new();
    WORDS.get_or_init(|| {
        let mut words = DEFAULT_STOP_WORDS.clone();
        words.extend(STOP_WORDS.iter().map(|w| w.to_string()));
        words
    })
}

fn keyword_extractor() -> &'static TextRank {
    static EXTRACTOR: OnceLock<TextRank> = OnceLock::new();
    EXTRACTOR.get_or_init(|| {
        let config = KeywordExtractConfig::builder()
            .set_stop_words(stop_words().clone())
            .min_keyword_length(KEYWORD_MIN_LEN)
            .use_hmm(true)
            .build()
            .unwrap_or_default();
        TextRank::new(WINDOW, config)
    })
}

/// One analysed sentence
#[derive(Debug, Clone)]
struct Sentence {
    text: String,
    /// every segmented word, lowercased, punctuation dropped
    words: Vec<String>,
    /// words passing both the stopword and part-of-speech filters
    filtered: Vec<String>,
}

/// Split on Chinese and Latin sentence terminators
fn split_sentences(text: &str) -> Vec<String> {
    text.split(DELIMITERS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn analyse(text: &str) -> Vec<Sentence> {
    let stop = stop_words();
    split_sentences(text)
        .into_iter()
        .map(|sentence| {
            let mut words = Vec::new();
            let mut filtered = Vec::new();
            for tag in jieba().tag(&sentence, true) {
                let word = tag.word.trim().to_lowercase();
                if word.is_empty() || tag.tag == "x" {
                    continue;
                }
                if !stop.contains(word.as_str()) && ALLOWED_POS.contains(&tag.tag) {
                    filtered.push(word.clone());
                }
                words.push(word);
            }
            Sentence {
                text: sentence,
                words,
                filtered,
            }
        })
        .collect()
}

/// Top three sentences in rank order
pub fn summarize(text: &str) -> Vec<String> {
    let sentences = analyse(text);
    let filtered: Vec<Vec<String>> = sentences.iter().map(|s| s.filtered.clone()).collect();

    textrank::rank_sentences(&filtered)
        .into_iter()
        .map(|i| &sentences[i].text)
        .filter(|s| s.chars().count() >= SENTENCE_MIN_LEN)
        .take(SUMMARY_SENTENCES)
        .cloned()
        .collect()
}

/// Every eligible word of `text`, best first, lowercased and deduplicated
fn ranked_keywords(text: &str) -> Vec<String> {
    let stop = stop_words();
    let allowed: Vec<String> = ALLOWED_POS.iter().map(|pos| pos.to_string()).collect();
    // unique words never outnumber chars, so this asks for the full ranking
    let top_k = text.chars().count();

    let mut seen = HashSet::new();
    keyword_extractor()
        .extract_keywords(jieba(), text, top_k, allowed)
        .into_iter()
        .map(|keyword| keyword.keyword.trim().to_lowercase())
        .filter(|word| word.chars().count() >= KEYWORD_MIN_LEN && !stop.contains(word))
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

/// Join runs of adjacent candidate words; keep phrases occurring at least
/// twice in `text`, in first-seen order
fn assemble_keyphrases(
    sentences: &[Vec<String>],
    candidates: &HashSet<&str>,
    text: &str,
) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut keyphrases: Vec<String> = Vec::new();
    let mut push_phrase = |run: &mut Vec<&str>| {
        if run.len() > 1 {
            let phrase = run.concat();
            if lowered.matches(phrase.as_str()).count() >= KEYPHRASE_MIN_OCCUR
                && !keyphrases.contains(&phrase)
            {
                keyphrases.push(phrase);
            }
        }
        run.clear();
    };

    for words in sentences {
        let mut run: Vec<&str> = Vec::new();
        for word in words {
            if candidates.contains(word.as_str()) {
                run.push(word);
            } else {
                push_phrase(&mut run);
            }
        }
        push_phrase(&mut run);
    }

    keyphrases
}

/// Keywords (≤10, each at least two chars) and keyphrases (repeated runs of
/// adjacent top-20 keywords)
pub fn extract_keywords(text: &str) -> (Vec<String>, Vec<String>) {
    let ranked = ranked_keywords(text);

    let keywords: Vec<String> = ranked.iter().take(KEYWORD_COUNT).cloned().collect();
    let candidates: HashSet<&str> = ranked
        .iter()
        .take(KEYPHRASE_CANDIDATES)
        .map(String::as_str)
        .collect();

    let sentences: Vec<Vec<String>> = analyse(text).into_iter().map(|s| s.words).collect();
    let keyphrases = assemble_keyphrases(&sentences, &candidates, text);

    (keywords, keyphrases)
}
