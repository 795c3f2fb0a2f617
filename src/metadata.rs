//! Project metadata documents.
//!
//! Each project directory carries one document (`index.md` by default) made
//! of a YAML header and a markdown body:
//!
//! ```text
//! ---
//! title: Demo
//! year: 2021
//! credits:
//!   - role: Director
//!     name: "*Someone*"
//! ---
//! Free text, rendered as block markdown.
//! ```
//!
//! ## Splitting rules
//!
//! - The header opens with a line that is exactly `---` at the very start of
//!   the file (a UTF-8 byte-order mark is tolerated) and closes with the next
//!   line that is exactly `---`.
//! - A document without an opening delimiter has an empty header; the whole
//!   text is body.
//! - An opening delimiter without a closing one is malformed, as is a header
//!   that is not a YAML mapping. An empty header is an empty mapping.
//!
//! A missing document is its own error: every project must have one.

use crate::types::{MetaMap, mapping_to_meta};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DELIMITER: &str = "---";

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Metadata document missing: {}", path.display())]
    Missing { path: PathBuf },
    #[error("Malformed metadata in {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Front-matter delimiter problems found while splitting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("front-matter opened with `---` but never closed")]
    Unclosed,
}

/// Parsed header and raw markdown body of one document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub header: MetaMap,
    pub body: String,
}

/// Split `content` into `(header, body)` text.
///
/// Returns `Ok(None)` when the document has no front-matter.
pub fn split_front_matter(content: &str) -> Result<Option<(&str, &str)>, SplitError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(rest) = strip_opening(content) else {
        return Ok(None);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Ok(Some((&rest[..offset], &rest[offset + line.len()..])));
        }
        offset += line.len();
    }
    Err(SplitError::Unclosed)
}

fn strip_opening(content: &str) -> Option<&str> {
    let (first, rest) = match content.find('\n') {
        Some(i) => (&content[..i], &content[i + 1..]),
        None => (content, ""),
    };
    (first.trim_end() == DELIMITER).then_some(rest)
}

/// Parse a document's text. `path` is only used for error messages.
pub fn parse_document(content: &str, path: &Path) -> Result<Document, MetadataError> {
    let malformed = |reason: String| MetadataError::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    let Some((header, body)) = split_front_matter(content).map_err(|e| malformed(e.to_string()))?
    else {
        return Ok(Document {
            header: MetaMap::new(),
            body: content
                .strip_prefix('\u{feff}')
                .unwrap_or(content)
                .to_string(),
        });
    };

    let value: serde_yaml::Value =
        serde_yaml::from_str(header).map_err(|e| malformed(e.to_string()))?;
    let header = match value {
        serde_yaml::Value::Null => MetaMap::new(),
        serde_yaml::Value::Mapping(map) => {
            mapping_to_meta(map).map_err(|e| malformed(e.to_string()))?
        }
        other => {
            return Err(malformed(format!(
                "header must be a mapping, found {}",
                yaml_kind(&other)
            )));
        }
    };

    Ok(Document {
        header,
        body: body.to_string(),
    })
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Read and parse the document at `path`.
pub fn load_document(path: &Path) -> Result<Document, MetadataError> {
    let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => MetadataError::Missing {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::InvalidData => MetadataError::Malformed {
            path: path.to_path_buf(),
            reason: "not valid UTF-8".to_string(),
        },
        _ => MetadataError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    parse_document(&content, path)
}
