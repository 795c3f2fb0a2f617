//! Final page rendering.
//!
//! The pipeline hands a finished [`IndexContext`] and a template name to a
//! [`Renderer`] and writes whatever string comes back. [`MaudRenderer`] is
//! the built-in implementation; it knows one template, `index`:
//!
//! ```text
//! ┌ featured strip ─────────────────────────────┐
//! │ card (thumbnail, title) → #<project id> ... │
//! └─────────────────────────────────────────────┘
//! section per category, in display order
//!   article per project
//!     title, metadata list, body
//!     images: thumbnail linking to the full-size copy
//!     videos: <video> with the thumbnail as poster
//! ```
//!
//! Metadata strings and bodies are already HTML at this point and are
//! emitted unescaped; keys, ids and paths are escaped by maud.

use crate::featured::FeaturedRecord;
use crate::types::{CategoryListing, MediaAsset, MetaValue, ProjectItem};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use thiserror::Error;

const CSS: &str = include_str!("../static/style.css");

/// Name of the single page template.
pub const INDEX_TEMPLATE: &str = "index";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("Unknown template `{0}`")]
    UnknownTemplate(String),
}

/// Turns the assembled site data into a document.
pub trait Renderer {
    fn render(&self, template: &str, context: &IndexContext) -> Result<String, RenderError>;
}

/// One category with its projects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySection {
    pub name: String,
    pub items: Vec<ProjectItem>,
}

/// Everything the index page is built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexContext {
    /// Categories in display order.
    pub categories: Vec<CategorySection>,
    /// The declared order the display order was derived from.
    pub category_order: Vec<String>,
    pub featured: Vec<FeaturedRecord>,
}

impl IndexContext {
    pub fn new(
        listing: &CategoryListing,
        category_order: &[String],
        featured: Vec<FeaturedRecord>,
    ) -> Self {
        let categories = display_order(listing, category_order)
            .into_iter()
            .map(|name| CategorySection {
                items: listing.get(&name).cloned().unwrap_or_default(),
                name,
            })
            .collect();
        Self {
            categories,
            category_order: category_order.to_vec(),
            featured,
        }
    }
}

/// Declared categories that exist, in declared order, then the rest by name.
pub fn display_order(listing: &CategoryListing, declared: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::with_capacity(listing.len());
    for name in declared {
        if listing.contains_key(name) && !order.contains(name) {
            order.push(name.clone());
        }
    }
    for name in listing.keys() {
        if !order.contains(name) {
            order.push(name.clone());
        }
    }
    order
}

/// Compile-time HTML templates.
#[derive(Debug, Default, Clone, Copy)]
pub struct MaudRenderer;

impl Renderer for MaudRenderer {
    fn render(&self, template: &str, context: &IndexContext) -> Result<String, RenderError> {
        match template {
            INDEX_TEMPLATE => Ok(render_index(context).into_string()),
            other => Err(RenderError::UnknownTemplate(other.to_string())),
        }
    }
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

fn featured_card(record: &FeaturedRecord) -> Markup {
    let id = record.get("id").and_then(|v| v.as_str()).unwrap_or_default();
    let title = record
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or(id);
    let thumbnail = record
        .get("media")
        .and_then(|m| m.get(0))
        .and_then(|m| m.get("thumbnail_path"))
        .and_then(|v| v.as_str());

    html! {
        a.featured-card href={ "#" (id) } {
            @if let Some(src) = thumbnail {
                img src=(src) alt="" loading="lazy";
            }
            span.featured-title { (PreEscaped(title)) }
        }
    }
}

fn meta_markup(value: &MetaValue) -> Markup {
    html! {
        @match value {
            MetaValue::Null => {}
            MetaValue::Bool(b) => { (b.to_string()) }
            MetaValue::Integer(i) => { (i.to_string()) }
            MetaValue::Float(f) => { (f.to_string()) }
            MetaValue::Text(s) => { (PreEscaped(s)) }
            MetaValue::Sequence(items) => {
                ul {
                    @for item in items {
                        li { (meta_markup(item)) }
                    }
                }
            }
            MetaValue::Mapping(map) => {
                dl {
                    @for (key, value) in map {
                        dt { (key) }
                        dd { (meta_markup(value)) }
                    }
                }
            }
        }
    }
}

fn media_markup(asset: &MediaAsset) -> Markup {
    html! {
        @match asset {
            MediaAsset::Image { thumbnail_path, full_image_path } => {
                a href=(full_image_path) {
                    img src=(thumbnail_path) alt="" loading="lazy";
                }
            }
            MediaAsset::Video { thumbnail_path, video_path } => {
                video controls preload="none" poster=(thumbnail_path) {
                    source src=(video_path) type="video/mp4";
                }
            }
        }
    }
}

fn project_markup(item: &ProjectItem) -> Markup {
    html! {
        article.project id=(item.id) {
            h3 { (PreEscaped(item.title())) }
            @if item.metadata.keys().any(|k| k != "title") {
                dl {
                    @for (key, value) in item.metadata.iter().filter(|(k, _)| *k != "title") {
                        dt { (key) }
                        dd { (meta_markup(value)) }
                    }
                }
            }
            div.body { (PreEscaped(&item.body)) }
            @if !item.media.is_empty() {
                div.media {
                    @for asset in &item.media {
                        (media_markup(asset))
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

fn render_index(context: &IndexContext) -> Markup {
    let content = html! {
        @if !context.featured.is_empty() {
            section.featured {
                @for record in &context.featured {
                    (featured_card(record))
                }
            }
        }
        main {
            @for category in &context.categories {
                section.category id=(category.name) {
                    h2 { (category.name) }
                    @for item in &category.items {
                        (project_markup(item))
                    }
                }
            }
        }
    };
    base_document("Portfolio", content)
}
