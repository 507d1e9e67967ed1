//! Conversion pipeline: parse, enrich, render

pub mod bibtex;
pub mod enrich;
pub mod render;
