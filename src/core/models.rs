//! Core data models for bibliographic entries

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Citation key field
pub const ID: &str = "ID";
/// Entry type field (lowercase, e.g. `article`)
pub const ENTRY_TYPE: &str = "ENTRYTYPE";
/// Title field
pub const TITLE: &str = "title";
/// Raw or split author field
pub const AUTHOR: &str = "author";
/// Zotero abstract field
pub const ABSTRACT: &str = "abstractnote";
/// Translated abstract
pub const ABSTRACT_CN: &str = "abstractnote_cn";
/// Sentences selected from the English abstract
pub const ENGLISH_SUMMARY: &str = "english_summary";
/// Sentences selected from the translated abstract
pub const CHINESE_SUMMARY: &str = "chinese_summary";
/// Keywords of the translated abstract
pub const CHINESE_KEYWORDS: &str = "chinese_keywords";
/// Repeated keyphrases of the translated abstract
pub const CHINESE_KEYPHRASE: &str = "chinese_keyphrase";
/// Journal field
pub const JOURNAL: &str = "journal";
/// DOI field
pub const DOI: &str = "doi";

/// Value of a single entry field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Plain string, as parsed
    Text(String),
    /// Ordered sequence produced by enrichment
    List(Vec<String>),
}

impl FieldValue {
    /// Borrow the text, if this is a plain value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    /// View the value as a list; plain text is a single item
    pub fn items(&self) -> Vec<&str> {
        match self {
            FieldValue::Text(s) => vec![s.as_str()],
            FieldValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

/// A bibliographic record with an open set of fields.
///
/// Keys are kept in a `BTreeMap`, so iteration is already in sorted key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BibEntry {
    fields: BTreeMap<String, FieldValue>,
}

impl BibEntry {
    /// Create an entry with its citation key and title
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let mut entry = Self::default();
        entry.set(ID, id.into());
        entry.set(TITLE, title.into());
        entry
    }

    /// Builder-style field setter
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Insert or replace a field
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Get a field
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Get a plain-text field
    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(FieldValue::as_text)
    }

    /// Check whether a field is present
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Remove a field
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    /// Citation key, if present
    pub fn id(&self) -> Option<&str> {
        self.get_text(ID)
    }

    /// Title, if present
    pub fn title(&self) -> Option<&str> {
        self.get_text(TITLE)
    }

    /// All fields in sorted key order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the entry has no fields at all
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_fields_are_sorted() {
        let entry = BibEntry::new("k", "t")
            .with_field("zbraz", "1")
            .with_field("abc", "2");

        let keys: Vec<&str> = entry.fields().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["ID", "abc", "title", "zbraz"]);
    }

    #[test]
    fn test_field_value_display() {
        let list = FieldValue::List(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(list.to_string(), "a,b");
        assert_eq!(FieldValue::from("x").to_string(), "x");
    }

    #[test]
    fn test_entry_serializes_as_flat_map() {
        let entry = BibEntry::new("k", "t")
            .with_field(AUTHOR, vec!["A".to_string(), "B".to_string()]);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"ID": "k", "title": "t", "author": ["A", "B"]})
        );
    }
}
