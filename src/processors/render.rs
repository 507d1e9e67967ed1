//! Outline renderer: tab-indented text for import into an outliner
//!
//! ```text
//! metadata
//! \t{ID}
//! \t\t{title}
//! \t\tfield: value
//! \t\tlist_field:
//! \t\t\titem
//! ```

use tracing::warn;

use crate::core::errors::{MetadataError, Result};
use crate::core::models::{
    BibEntry, FieldValue, AUTHOR, CHINESE_KEYPHRASE, CHINESE_KEYWORDS, CHINESE_SUMMARY, DOI,
    ENGLISH_SUMMARY, ID, JOURNAL, TITLE,
};

/// First line of every document
pub const HEADER: &str = "metadata";

/// DOI resolver prefix; the single slash is the format notes already use
pub const DOI_RESOLVER: &str = "https:/doi.org/";

/// Fields rendered as a header line followed by one line per item
const LIST_FIELDS: &[&str] = &[
    CHINESE_KEYWORDS,
    CHINESE_KEYPHRASE,
    ENGLISH_SUMMARY,
    CHINESE_SUMMARY,
];

fn wiki_link(text: &str) -> String {
    format!("[[{}]]", text)
}

fn required<'a>(entry: &'a BibEntry, field: &str) -> Result<&'a FieldValue> {
    entry.get(field).ok_or_else(|| MetadataError::RenderError {
        entry: entry
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| "<unknown>".to_string()),
        field: field.to_string(),
    })
}

/// Render one entry's lines
pub fn render_entry(entry: &BibEntry) -> Result<Vec<String>> {
    let id = required(entry, ID)?;
    let title = required(entry, TITLE)?;

    let mut lines = vec![format!("\t{}", id), format!("\t\t{}", title)];

    for (key, value) in entry.fields() {
        if key == ID || key == TITLE {
            continue;
        }

        match key {
            JOURNAL => lines.push(format!("\t\t{}: {}", key, wiki_link(&value.to_string()))),
            AUTHOR => {
                let authors: Vec<String> = value.items().into_iter().map(wiki_link).collect();
                lines.push(format!("\t\t{}: {}", key, authors.join(",")));
            }
            DOI => {
                let doi = value.to_string();
                lines.push(format!("\t\t{}:[{}]({}{})", key, doi, DOI_RESOLVER, doi));
            }
            _ if LIST_FIELDS.contains(&key) => {
                lines.push(format!("\t\t{}:", key));
                for item in value.items() {
                    lines.push(format!("\t\t\t{}", item));
                }
            }
            _ => lines.push(format!("\t\t{}: {}", key, value)),
        }
    }

    Ok(lines)
}

/// Render all entries. Any entry without `ID` or `title` fails the call.
pub fn render(entries: &[BibEntry]) -> Result<String> {
    let mut lines = vec![HEADER.to_string()];
    for entry in entries {
        lines.extend(render_entry(entry)?);
    }
    Ok(lines.join("\n"))
}

/// Render all entries, skipping (and logging) those that cannot be rendered
pub fn render_lenient(entries: &[BibEntry]) -> String {
    let mut lines = vec![HEADER.to_string()];
    for entry in entries {
        match render_entry(entry) {
            Ok(entry_lines) => lines.extend(entry_lines),
            Err(e) => warn!("Skipping entry: {}", e),
        }
    }
    lines.join("\n")
}
