//! BibTeX metadata enrichment
//!
//! Parses BibTeX entries, translates their abstracts into Chinese through one of
//! several translation providers, derives summaries and keywords, and renders a
//! tab-indented outline for note-taking tools.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod analysis;
pub mod cli;
pub mod core;
pub mod processors;
pub mod translators;

// Re-export key types for convenience
pub use core::{
    config::{AppConfig, FailurePolicy, Provider},
    errors::{MetadataError, TranslationError},
    models::{BibEntry, FieldValue},
};

pub use processors::{bibtex::parse, enrich::enrich, render::render};
pub use translators::{build_translator, Translator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
