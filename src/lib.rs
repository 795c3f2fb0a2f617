//! # Folio
//!
//! A static build pipeline for categorized portfolio sites. The filesystem is
//! the data source: category directories hold project directories, each with
//! a front-matter document and any number of images and videos.
//!
//! # Architecture
//!
//! ```text
//! src/projects/<category>/<project>/
//!     index.md          →  metadata (YAML header, markdown rendered)
//!     *.jpg|png|...     →  <key>_thumbnail.jpeg + <key>_full.jpeg
//!     *.mov|mp4|...     →  <key>_thumbnail.jpeg + <key>.mp4
//! src/featured.yaml     →  ordered overrides of selected projects
//!                       ↓
//! output/index.html     ←  one page: featured strip + categories
//! ```
//!
//! Derivatives are cached by presence: a build only encodes outputs that are
//! missing, so rebuilding an unchanged tree does no media work at all. The
//! `--reprocess` switch forces the (expensive) video outputs to be redone.
//!
//! Any failure aborts the build before the page is written. Featured ids are
//! checked before the media stage, so a typo costs nothing.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`aggregate`] | Walks categories and projects, builds the listing and id index |
//! | [`process`] | Per-project media stage: extension dispatch, output keys |
//! | [`imaging`] | Image and video derivatives: backends, cache-gated transforms |
//! | [`cache`] | Presence-based cache gate, cache statistics, pruning |
//! | [`naming`] | Media classification and deterministic derivative paths |
//! | [`metadata`] | Front-matter document loading |
//! | [`markdown`] | Inline/block markdown over nested metadata values |
//! | [`featured`] | Featured list loading, reference validation, override merge |
//! | [`render`] | Templating seam and the built-in Maud page |
//! | [`pipeline`] | Build and check orchestration |
//! | [`config`] | `folio.toml` loading, validation, merging |
//! | [`types`] | Shared data model (`ProjectItem`, `MediaAsset`, `MetaValue`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Deterministic Order
//!
//! Categories, projects and media files are processed in file-name order, so
//! the listing and the generated page do not depend on the filesystem's
//! iteration order. Display order of categories is a separate setting
//! (`[categories] order`).
//!
//! ## Collision-Free Output Names
//!
//! Derivative names come from the source stem. When two sources in a project
//! share a stem (`cover.jpg`, `cover.mov`) both fall back to their full file
//! name, see [`naming::assign_keys`].
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time
//! HTML macro system. The [`render::Renderer`] trait keeps the pipeline
//! independent of it.
//!
//! ## Pure-Rust Images, ffmpeg for Video
//!
//! Images go through the `image` crate (Lanczos3, JPEG encoder). Videos need a
//! real transcoder; `ffmpeg` is invoked as a subprocess and its stderr is
//! surfaced verbatim on failure.

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod featured;
pub mod imaging;
pub mod markdown;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
