//! Category/project discovery and content aggregation.
//!
//! The projects root is read two levels deep:
//!
//! ```text
//! src/projects/
//! ├── talks/             category (may be empty)
//! └── works/             category
//!     ├── demo/          project → id "works/demo"
//!     │   ├── index.md
//!     │   ├── photo.jpg
//!     │   └── clip.mov
//!     └── notes.txt      ignored: not a directory
//! ```
//!
//! [`discover`] only lists directories (cheap, no file contents are read), so
//! the pipeline can validate featured references before any media work.
//! [`aggregate`] then loads, renders and transforms every project on the rayon
//! pool. Results come back in discovery order and are folded into the listing
//! and the id index; nothing is accumulated through shared state.

use crate::cache::CacheStats;
use crate::imaging::{ImageBackend, Transformer, VideoBackend};
use crate::markdown::{render_block, render_map};
use crate::metadata::{MetadataError, load_document};
use crate::naming::ProjectOutput;
use crate::process::{ProcessError, process_directory};
use crate::types::{CategoryListing, MetaMap, ProjectItem};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Cannot read {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Project {id}: {source}")]
    Media {
        id: String,
        #[source]
        source: ProcessError,
    },
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

/// One project directory found by [`discover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub category: String,
    pub slug: String,
    pub dir: PathBuf,
}

impl ProjectRef {
    /// `"<category>/<slug>"`
    pub fn id(&self) -> String {
        format!("{}/{}", self.category, self.slug)
    }
}

/// Directory structure of the projects root, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub categories: Vec<String>,
    pub projects: Vec<ProjectRef>,
}

impl Discovery {
    pub fn ids(&self) -> impl Iterator<Item = String> + '_ {
        self.projects.iter().map(ProjectRef::id)
    }
}

/// Where a build reads documents from and writes derivatives to.
#[derive(Debug, Clone)]
pub struct Layout {
    pub output_root: PathBuf,
    /// Media root below `output_root`, e.g. `projects`.
    pub media_dir: String,
    /// File name of each project's metadata document, e.g. `index.md`.
    pub metadata_file: String,
}

impl Layout {
    pub fn project_output(&self, project: &ProjectRef) -> ProjectOutput {
        ProjectOutput::new(
            &self.output_root,
            &self.media_dir,
            &project.category,
            &project.slug,
        )
    }
}

/// Aggregated content of a whole build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    /// Category → projects, every discovered category present.
    pub categories: CategoryListing,
    /// Project id → item.
    pub index: BTreeMap<String, ProjectItem>,
    pub stats: CacheStats,
}

/// List categories and their projects. Non-directories are ignored at both
/// levels.
pub fn discover(root: &Path) -> Result<Discovery, AggregateError> {
    let mut discovery = Discovery::default();
    for (category, category_dir) in subdirectories(root)? {
        for (slug, dir) in subdirectories(&category_dir)? {
            discovery.projects.push(ProjectRef {
                category: category.clone(),
                slug,
                dir,
            });
        }
        discovery.categories.push(category);
    }
    Ok(discovery)
}

fn subdirectories(dir: &Path) -> Result<Vec<(String, PathBuf)>, AggregateError> {
    let walk_err = |source| AggregateError::Walk {
        path: dir.to_path_buf(),
        source,
    };
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(walk_err)? {
        let entry = entry.map_err(walk_err)?;
        let path = entry.path();
        // Follows symlinks, so a linked project directory counts.
        if !path.is_dir() {
            continue;
        }
        dirs.push((entry.file_name().to_string_lossy().to_string(), path));
    }
    dirs.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dirs)
}

/// Load a project's document and render header and body to HTML.
pub fn load_metadata(
    project: &ProjectRef,
    metadata_file: &str,
) -> Result<(MetaMap, String), MetadataError> {
    let doc = load_document(&project.dir.join(metadata_file))?;
    Ok((render_map(&doc.header), render_block(&doc.body)))
}

/// Build one [`ProjectItem`]. The document is loaded first so a broken header
/// fails the build before any media of the project is encoded.
fn build_project<I: ImageBackend, V: VideoBackend>(
    transformer: &Transformer<'_, I, V>,
    layout: &Layout,
    project: &ProjectRef,
) -> Result<(ProjectItem, CacheStats), AggregateError> {
    let id = project.id();
    let (metadata, body) = load_metadata(project, &layout.metadata_file)?;
    let media = process_directory(transformer, &project.dir, &layout.project_output(project))
        .map_err(|source| AggregateError::Media {
            id: id.clone(),
            source,
        })?;

    info!(project = %id, media = media.assets.len(), cache = %media.stats, "project");

    Ok((
        ProjectItem {
            id,
            metadata,
            body,
            media: media.assets,
        },
        media.stats,
    ))
}

/// Process every discovered project and assemble the listing and index.
///
/// Any failure aborts the whole aggregation.
pub fn aggregate<I: ImageBackend, V: VideoBackend>(
    transformer: &Transformer<'_, I, V>,
    layout: &Layout,
    discovery: &Discovery,
) -> Result<Aggregate, AggregateError> {
    let built: Vec<(ProjectItem, CacheStats)> = discovery
        .projects
        .par_iter()
        .map(|project| build_project(transformer, layout, project))
        .collect::<Result<_, _>>()?;

    let seed = Aggregate {
        categories: discovery
            .categories
            .iter()
            .map(|c| (c.clone(), Vec::new()))
            .collect(),
        ..Aggregate::default()
    };

    let aggregate = discovery
        .projects
        .iter()
        .zip(built)
        .fold(seed, |mut acc, (project, (item, stats))| {
            acc.index.insert(item.id.clone(), item.clone());
            acc.categories
                .entry(project.category.clone())
                .or_default()
                .push(item);
            acc.stats = acc.stats.merge(stats);
            acc
        });

    for (category, items) in &aggregate.categories {
        info!(%category, projects = items.len(), "category");
    }
    Ok(aggregate)
}
