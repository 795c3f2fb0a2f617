//! Build orchestration.
//!
//! ```text
//! discover ──► load + validate featured ──► aggregate (rayon, per project)
//!                                             │  metadata → markdown
//!                                             │  media → cache gate → backends
//!                                             ▼
//!                 write index ◄── render ◄── resolve featured
//!                      │
//!                      └─► prune (optional)
//! ```
//!
//! Featured ids are checked against the directory listing before the media
//! stage, so a typo fails the build before anything is encoded or written.
//! Every other failure also aborts before the index is written: the page is
//! either complete or absent.

use crate::aggregate::{Aggregate, AggregateError, aggregate, discover, load_metadata};
use crate::cache::{self, CacheStats};
use crate::config::{BuildConfig, ConfigError};
use crate::featured::{FeaturedError, load_featured, resolve, validate_references};
use crate::imaging::{FfmpegBackend, ImageBackend, RustBackend, Transformer, VideoBackend};
use crate::process::media_files;
use crate::render::{INDEX_TEMPLATE, IndexContext, MaudRenderer, RenderError, Renderer};
use crate::types::ProjectItem;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Featured(#[from] FeaturedError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Switches of one build run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Regenerate video derivatives even when present.
    pub reprocess: bool,
    /// Delete unreferenced files under the media root afterwards.
    pub prune: bool,
}

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub context: IndexContext,
    pub index_path: PathBuf,
    pub stats: CacheStats,
    /// Files removed by pruning.
    pub pruned: Vec<PathBuf>,
}

/// One project as seen by [`check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedProject {
    pub id: String,
    /// Rendered title, or the id.
    pub title: String,
    /// Recognized media files.
    pub media: usize,
}

/// Outcome of a successful check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub categories: Vec<String>,
    pub projects: Vec<CheckedProject>,
    pub featured: usize,
}

/// Run a full build with the production backends and renderer.
pub fn build(config: &BuildConfig, options: BuildOptions) -> Result<BuildReport, BuildError> {
    let images = RustBackend::new();
    let videos = FfmpegBackend::new(config.video.ffmpeg.clone());
    build_with_backends(config, options, &images, &videos, &MaudRenderer)
}

/// Run a full build with the given backends and renderer.
pub fn build_with_backends<I: ImageBackend, V: VideoBackend, R: Renderer>(
    config: &BuildConfig,
    options: BuildOptions,
    images: &I,
    videos: &V,
    renderer: &R,
) -> Result<BuildReport, BuildError> {
    config.validate()?;
    let discovery = discover(&config.paths.projects)?;
    info!(
        root = %config.paths.projects.display(),
        categories = discovery.categories.len(),
        projects = discovery.projects.len(),
        "discovered"
    );

    let featured = load_featured(&config.paths.featured)?;
    let known: BTreeSet<String> = discovery.ids().collect();
    validate_references(&featured, &known)?;

    let settings = config.media_settings(options.reprocess);
    let transformer = Transformer::new(images, videos, &settings);
    let Aggregate {
        categories,
        index,
        stats,
    } = aggregate(&transformer, &config.layout(), &discovery)?;

    let resolved = resolve(&featured, &index)?;
    let context = IndexContext::new(&categories, &config.categories.order, resolved);
    let html = renderer.render(INDEX_TEMPLATE, &context)?;

    let index_path = config.index_path();
    write_file(&index_path, &html)?;
    info!(path = %index_path.display(), cache = %stats, "wrote index");

    let pruned = if options.prune {
        let media_root = config.media_root();
        let keep = referenced_files(config, index.values());
        let pruned = cache::prune(&media_root, &keep).map_err(|source| BuildError::Write {
            path: media_root.clone(),
            source,
        })?;
        info!(removed = pruned.len(), "pruned stale derivatives");
        pruned
    } else {
        Vec::new()
    };

    Ok(BuildReport {
        context,
        index_path,
        stats,
        pruned,
    })
}

/// Validate the tree without encoding media or writing anything.
///
/// Loads and renders every metadata document and checks featured ids.
pub fn check(config: &BuildConfig) -> Result<CheckReport, BuildError> {
    config.validate()?;
    let discovery = discover(&config.paths.projects)?;
    let featured = load_featured(&config.paths.featured)?;
    let known: BTreeSet<String> = discovery.ids().collect();
    validate_references(&featured, &known)?;

    let projects = discovery
        .projects
        .par_iter()
        .map(|project| -> Result<CheckedProject, AggregateError> {
            let id = project.id();
            let (metadata, body) = load_metadata(project, &config.paths.metadata_file)
                .map_err(AggregateError::from)?;
            let media = media_files(&project.dir).map_err(|source| AggregateError::Media {
                id: id.clone(),
                source,
            })?;
            let title = ProjectItem {
                id: id.clone(),
                metadata,
                body,
                media: Vec::new(),
            }
            .title()
            .to_string();
            Ok(CheckedProject {
                id,
                title,
                media: media.len(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CheckReport {
        categories: discovery.categories,
        projects,
        featured: featured.len(),
    })
}

/// Absolute paths of every derivative the items refer to.
fn referenced_files<'a>(
    config: &BuildConfig,
    items: impl Iterator<Item = &'a ProjectItem>,
) -> HashSet<PathBuf> {
    items
        .flat_map(|item| item.media.iter())
        .flat_map(|asset| asset.paths())
        .map(|rel| config.paths.output.join(rel))
        .collect()
}

fn write_file(path: &std::path::Path, content: &str) -> Result<(), BuildError> {
    let write_err = |source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(path, content).map_err(write_err)
}
