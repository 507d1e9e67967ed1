//! BibTeX input: parsing via `biblatex` and `.bib` file discovery

use biblatex::{Bibliography, Chunk, Spanned};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::core::errors::{MetadataError, Result};
use crate::core::models::{BibEntry, ENTRY_TYPE, ID};

/// Concatenate biblatex chunks into a plain string
fn chunks_to_string(chunks: &[Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|spanned| match &spanned.v {
            Chunk::Normal(s) => s.as_str(),
            Chunk::Verbatim(s) => s.as_str(),
            Chunk::Math(s) => s.as_str(),
        })
        .collect()
}

/// Parse BibTeX text into entries, in file order.
///
/// Every field is kept as text under its lowercase name; string macros such as
/// `jan` are expanded by `biblatex`. The citation key is stored as `ID` and the
/// entry type as `ENTRYTYPE`. Any syntax error fails the whole batch.
pub fn parse(content: &str) -> Result<Vec<BibEntry>> {
    let bibliography = Bibliography::parse(content).map_err(|e| MetadataError::ParseError {
        message: e.to_string(),
    })?;

    let entries: Vec<BibEntry> = bibliography
        .iter()
        .map(|entry| {
            let mut record = BibEntry::default();
            record.set(ID, entry.key.clone());
            record.set(ENTRY_TYPE, entry.entry_type.to_string().to_lowercase());
            for (key, value) in entry.fields.iter() {
                record.set(key.to_lowercase(), chunks_to_string(value));
            }
            debug!("Parsed entry {} ({} fields)", entry.key, record.len());
            record
        })
        .collect();

    info!("Parsed {} BibTeX entries", entries.len());
    Ok(entries)
}

/// Read and parse a `.bib` file
pub async fn parse_file(path: &Path) -> Result<Vec<BibEntry>> {
    let content = tokio::fs::read_to_string(path).await?;
    parse(&content)
}

/// Check if file is BibTeX
pub fn is_bib_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("bib"))
        .unwrap_or(false)
}

/// Find `.bib` files under `dir`, sorted by path
pub fn find_bib_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(MetadataError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", dir.display()),
        )));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_bib_file(p))
        .collect();

    files.sort();
    Ok(files)
}
