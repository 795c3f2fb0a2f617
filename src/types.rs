//! Shared types passed between the pipeline stages.
//!
//! Everything here is serializable so the assembled site data can be handed to
//! the templating layer (or dumped as JSON) without further conversion.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A metadata value from a project's front-matter.
///
/// The shape is closed: mappings, sequences, text, and a handful of plain
/// scalars. Markdown rendering walks this type exhaustively, so a new variant
/// has to be handled there before it compiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Sequence(Vec<MetaValue>),
    Mapping(BTreeMap<String, MetaValue>),
}

impl MetaValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// JSON form for templates. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            MetaValue::Null => Value::Null,
            MetaValue::Bool(b) => Value::Bool(*b),
            MetaValue::Integer(i) => Value::from(*i),
            MetaValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            MetaValue::Text(s) => Value::String(s.clone()),
            MetaValue::Sequence(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            MetaValue::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// String form of a scalar, used when a YAML key is not a string.
    fn scalar_key(&self) -> Option<String> {
        match self {
            MetaValue::Null => Some("null".to_string()),
            MetaValue::Bool(b) => Some(b.to_string()),
            MetaValue::Integer(i) => Some(i.to_string()),
            MetaValue::Float(f) => Some(f.to_string()),
            MetaValue::Text(s) => Some(s.clone()),
            MetaValue::Sequence(_) | MetaValue::Mapping(_) => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_string())
    }
}

impl From<i64> for MetaValue {
    fn from(i: i64) -> Self {
        MetaValue::Integer(i)
    }
}

/// Header mapping of a metadata document.
pub type MetaMap = BTreeMap<String, MetaValue>;

/// Error for YAML values that have no [`MetaValue`] equivalent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported YAML value: {0}")]
pub struct UnsupportedValue(pub String);

impl TryFrom<serde_yaml::Value> for MetaValue {
    type Error = UnsupportedValue;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        use serde_yaml::Value;
        Ok(match value {
            Value::Null => MetaValue::Null,
            Value::Bool(b) => MetaValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    MetaValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    MetaValue::Float(f)
                } else {
                    return Err(UnsupportedValue(n.to_string()));
                }
            }
            Value::String(s) => MetaValue::Text(s),
            Value::Sequence(items) => MetaValue::Sequence(
                items
                    .into_iter()
                    .map(MetaValue::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Mapping(map) => MetaValue::Mapping(mapping_to_meta(map)?),
            // Custom YAML tags (`!foo bar`) keep only their value.
            Value::Tagged(tagged) => MetaValue::try_from(tagged.value)?,
        })
    }
}

/// Convert a YAML mapping into a [`MetaMap`], stringifying scalar keys.
pub fn mapping_to_meta(map: serde_yaml::Mapping) -> Result<MetaMap, UnsupportedValue> {
    let mut out = MetaMap::new();
    for (key, value) in map {
        let key = MetaValue::try_from(key)?;
        let key = key
            .scalar_key()
            .ok_or_else(|| UnsupportedValue("non-scalar mapping key".to_string()))?;
        out.insert(key, MetaValue::try_from(value)?);
    }
    Ok(out)
}

/// A web-ready derivative set for one source media file.
///
/// Paths are relative to the output directory, e.g.
/// `projects/works/demo/photo_thumbnail.jpeg`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaAsset {
    Image {
        thumbnail_path: String,
        full_image_path: String,
    },
    Video {
        thumbnail_path: String,
        video_path: String,
    },
}

impl MediaAsset {
    pub fn thumbnail_path(&self) -> &str {
        match self {
            MediaAsset::Image { thumbnail_path, .. } | MediaAsset::Video { thumbnail_path, .. } => {
                thumbnail_path
            }
        }
    }

    /// JSON form, same shape as the serde representation.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            MediaAsset::Image {
                thumbnail_path,
                full_image_path,
            } => serde_json::json!({
                "type": "image",
                "thumbnail_path": thumbnail_path,
                "full_image_path": full_image_path,
            }),
            MediaAsset::Video {
                thumbnail_path,
                video_path,
            } => serde_json::json!({
                "type": "video",
                "thumbnail_path": thumbnail_path,
                "video_path": video_path,
            }),
        }
    }

    /// Every output-relative file this asset refers to.
    pub fn paths(&self) -> [&str; 2] {
        match self {
            MediaAsset::Image {
                thumbnail_path,
                full_image_path,
            } => [thumbnail_path, full_image_path],
            MediaAsset::Video {
                thumbnail_path,
                video_path,
            } => [thumbnail_path, video_path],
        }
    }
}

/// One project directory after aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    /// `"<category>/<slug>"`
    pub id: String,
    /// Front-matter header with every string rendered as inline HTML.
    pub metadata: MetaMap,
    /// Rendered HTML of the document body.
    pub body: String,
    pub media: Vec<MediaAsset>,
}

impl ProjectItem {
    /// Display title: the `title` metadata field, or the id.
    pub fn title(&self) -> &str {
        self.metadata
            .get("title")
            .and_then(MetaValue::as_str)
            .unwrap_or(&self.id)
    }
}

/// Category name → projects in walk order.
pub type CategoryListing = BTreeMap<String, Vec<ProjectItem>>;
