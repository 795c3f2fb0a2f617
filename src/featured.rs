//! Featured-project overrides.
//!
//! The featured document is a YAML list. Each entry names a project by id and
//! may override any of its fields for the featured strip:
//!
//! ```yaml
//! - project: works/demo
//!   title: "Demo, the director's cut"
//! - project: talks/keynote
//! ```
//!
//! Resolution is a shallow merge. The base record holds the project's
//! metadata fields plus `id`, `body` and `media`; the entry's fields
//! (including `project`) are laid over it and win on collision. Override
//! values go through the same inline markdown rendering as metadata, so every
//! string in a record is HTML. Output order
//! is the document's order.
//!
//! An id that matches no project fails the build. The pipeline checks ids
//! against the directory listing before encoding anything
//! ([`validate_references`]) and merges once the projects are built
//! ([`resolve`]).

use crate::markdown::render_value;
use crate::types::{MetaMap, MetaValue, ProjectItem, mapping_to_meta};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// A resolved featured entry, ready for templates.
pub type FeaturedRecord = serde_json::Map<String, serde_json::Value>;

#[derive(Error, Debug)]
pub enum FeaturedError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed featured list {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
    #[error("Featured entry #{position} has no `project` id")]
    MissingProject { position: usize },
    #[error("Featured entry #{position} references unknown project `{id}`")]
    UnresolvedReference { position: usize, id: String },
}

/// One entry of the featured list.
#[derive(Debug, Clone, PartialEq)]
pub struct FeaturedEntry {
    /// Id of the referenced project.
    pub project: String,
    /// Every field of the entry, `project` included.
    pub fields: MetaMap,
}

/// Read the featured list at `path`.
///
/// A missing file means nothing is featured. An empty file is an empty list.
pub fn load_featured(path: &Path) -> Result<Vec<FeaturedEntry>, FeaturedError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "no featured list, featuring nothing");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(FeaturedError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    parse_featured(&content, path)
}

/// Parse featured-list text. `path` is only used for error messages.
pub fn parse_featured(content: &str, path: &Path) -> Result<Vec<FeaturedEntry>, FeaturedError> {
    let malformed = |reason: String| FeaturedError::Malformed {
        path: path.to_path_buf(),
        reason,
    };

    let value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| malformed(e.to_string()))?;
    let items = match value {
        serde_yaml::Value::Null => return Ok(Vec::new()),
        serde_yaml::Value::Sequence(items) => items,
        _ => return Err(malformed("expected a list of entries".to_string())),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let position = i + 1;
            let serde_yaml::Value::Mapping(map) = item else {
                return Err(malformed(format!("entry #{position} is not a mapping")));
            };
            let fields = mapping_to_meta(map).map_err(|e| malformed(e.to_string()))?;
            let project = fields
                .get("project")
                .and_then(MetaValue::as_str)
                .filter(|id| !id.is_empty())
                .ok_or(FeaturedError::MissingProject { position })?
                .to_string();
            Ok(FeaturedEntry { project, fields })
        })
        .collect()
}

/// Fail on the first entry whose id is not in `known`.
pub fn validate_references(
    entries: &[FeaturedEntry],
    known: &BTreeSet<String>,
) -> Result<(), FeaturedError> {
    match entries
        .iter()
        .enumerate()
        .find(|(_, e)| !known.contains(&e.project))
    {
        Some((i, entry)) => Err(FeaturedError::UnresolvedReference {
            position: i + 1,
            id: entry.project.clone(),
        }),
        None => Ok(()),
    }
}

/// Merge every entry over the project it references.
pub fn resolve(
    entries: &[FeaturedEntry],
    index: &BTreeMap<String, ProjectItem>,
) -> Result<Vec<FeaturedRecord>, FeaturedError> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let base = index
                .get(&entry.project)
                .ok_or_else(|| FeaturedError::UnresolvedReference {
                    position: i + 1,
                    id: entry.project.clone(),
                })?;
            let mut record = base_record(base);
            for (key, value) in &entry.fields {
                let value = if key == "project" {
                    value.to_json()
                } else {
                    render_value(value).to_json()
                };
                record.insert(key.clone(), value);
            }
            Ok(record)
        })
        .collect()
}

/// Flatten an item: metadata fields first, then `id`, `body`, `media`.
fn base_record(item: &ProjectItem) -> FeaturedRecord {
    let mut record: FeaturedRecord = item
        .metadata
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect();
    record.insert("id".into(), item.id.clone().into());
    record.insert("body".into(), item.body.clone().into());
    record.insert(
        "media".into(),
        serde_json::Value::Array(item.media.iter().map(|m| m.to_json()).collect()),
    );
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MediaAsset;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<Vec<FeaturedEntry>, FeaturedError> {
        parse_featured(content, Path::new("featured.yaml"))
    }

    fn item(id: &str, fields: &[(&str, MetaValue)]) -> ProjectItem {
        ProjectItem {
            id: id.to_string(),
            metadata: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body: "<p>body</p>\n".to_string(),
            media: vec![],
        }
    }

    fn index_of(items: Vec<ProjectItem>) -> BTreeMap<String, ProjectItem> {
        items.into_iter().map(|i| (i.id.clone(), i)).collect()
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    #[test]
    fn parse_entries_in_order() {
        let entries = parse("- project: works/b\n  title: B\n- project: works/a\n").unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.project.as_str()).collect();
        assert_eq!(ids, vec!["works/b", "works/a"]);
        assert_eq!(entries[0].fields["title"], MetaValue::from("B"));
    }

    #[test]
    fn empty_document_is_empty_list() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn entry_without_project_is_rejected() {
        let err = parse("- project: works/a\n- title: orphan\n").unwrap_err();
        assert!(matches!(err, FeaturedError::MissingProject { position: 2 }));
    }

    #[test]
    fn non_string_project_is_rejected() {
        let err = parse("- project: 42\n").unwrap_err();
        assert!(matches!(err, FeaturedError::MissingProject { position: 1 }));
    }

    #[test]
    fn mapping_document_is_malformed() {
        let err = parse("project: works/a\n").unwrap_err();
        assert!(matches!(err, FeaturedError::Malformed { .. }));
    }

    #[test]
    fn scalar_entry_is_malformed() {
        let err = parse("- works/a\n").unwrap_err();
        assert!(err.to_string().contains("entry #1 is not a mapping"));
    }

    #[test]
    fn missing_file_features_nothing() {
        let tmp = TempDir::new().unwrap();
        let entries = load_featured(&tmp.path().join("featured.yaml")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn loads_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("featured.yaml");
        fs::write(&path, "- project: talks/keynote\n").unwrap();
        assert_eq!(load_featured(&path).unwrap()[0].project, "talks/keynote");
    }

    // =========================================================================
    // validate_references
    // =========================================================================

    #[test]
    fn known_references_validate() {
        let entries = parse("- project: works/a\n").unwrap();
        let known: BTreeSet<String> = ["works/a".to_string()].into();
        assert!(validate_references(&entries, &known).is_ok());
    }

    #[test]
    fn typo_is_reported_with_position() {
        let entries = parse("- project: works/a\n- project: works/dmeo\n").unwrap();
        let known: BTreeSet<String> = ["works/a".to_string(), "works/demo".to_string()].into();
        let err = validate_references(&entries, &known).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Featured entry #2 references unknown project `works/dmeo`"
        );
    }

    // =========================================================================
    // resolve
    // =========================================================================

    #[test]
    fn override_wins_and_base_fields_survive() {
        let index = index_of(vec![item(
            "cat/x",
            &[("a", MetaValue::Integer(1)), ("b", MetaValue::Integer(2))],
        )]);
        let entries = parse("- project: cat/x\n  b: 9\n  c: 3\n").unwrap();

        let resolved = resolve(&entries, &index).unwrap();

        let record = &resolved[0];
        assert_eq!(record["a"], json!(1));
        assert_eq!(record["b"], json!(9));
        assert_eq!(record["c"], json!(3));
        assert_eq!(record["project"], json!("cat/x"));
        assert_eq!(record["id"], json!("cat/x"));
    }

    #[test]
    fn override_strings_are_rendered_like_metadata() {
        let index = index_of(vec![item("cat/x", &[("title", MetaValue::from("<em>X</em>"))])]);
        let entries = parse(
            "- project: cat/x\n  title: \"Cut < 2 & *more*\"\n  tags: [\"**a**\"]\n",
        )
        .unwrap();

        let record = &resolve(&entries, &index).unwrap()[0];

        assert_eq!(record["title"], json!("Cut &lt; 2 &amp; <em>more</em>"));
        assert_eq!(record["tags"], json!(["<strong>a</strong>"]));
        assert_eq!(record["project"], json!("cat/x"));
    }

    #[test]
    fn output_follows_featured_order() {
        let index = index_of(vec![item("a/one", &[]), item("b/two", &[])]);
        let entries = parse("- project: b/two\n- project: a/one\n").unwrap();
        let resolved = resolve(&entries, &index).unwrap();
        let ids: Vec<&str> = resolved.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b/two", "a/one"]);
    }

    #[test]
    fn unresolved_reference_fails() {
        let index = index_of(vec![item("a/one", &[])]);
        let entries = parse("- project: a/missing\n").unwrap();
        let err = resolve(&entries, &index).unwrap_err();
        assert!(matches!(
            err,
            FeaturedError::UnresolvedReference { position: 1, ref id } if id == "a/missing"
        ));
    }

    #[test]
    fn base_record_carries_media_and_body() {
        let mut base = item("a/one", &[("title", MetaValue::from("One"))]);
        base.media.push(MediaAsset::Image {
            thumbnail_path: "projects/a/one/p_thumbnail.jpeg".into(),
            full_image_path: "projects/a/one/p_full.jpeg".into(),
        });
        let index = index_of(vec![base]);
        let entries = parse("- project: a/one\n").unwrap();

        let record = &resolve(&entries, &index).unwrap()[0];

        assert_eq!(record["title"], json!("One"));
        assert_eq!(record["body"], json!("<p>body</p>\n"));
        assert_eq!(record["media"][0]["type"], json!("image"));
    }

    #[test]
    fn reserved_fields_win_over_metadata_of_the_same_name() {
        let index = index_of(vec![item("a/one", &[("id", MetaValue::from("spoof"))])]);
        let entries = parse("- project: a/one\n").unwrap();
        let record = &resolve(&entries, &index).unwrap()[0];
        assert_eq!(record["id"], json!("a/one"));
    }
}
