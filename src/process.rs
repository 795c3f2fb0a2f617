//! Per-project media stage.
//!
//! Turns every recognized media file of one project directory into a
//! [`MediaAsset`] by dispatching on the file extension:
//!
//! ```text
//! works/demo/
//! ├── a-photo.jpg    → image transform → a-photo_thumbnail.jpeg, a-photo_full.jpeg
//! ├── b-clip.mov     → video transform → b-clip_thumbnail.jpeg, b-clip.mp4
//! ├── c-scan.heic    → skipped (unrecognized extension)
//! └── index.md       → skipped (metadata document)
//! ```
//!
//! Entries are processed in file-name order so the asset sequence is
//! deterministic. Subdirectories are not descended into. The first failing
//! file aborts the project.

use crate::cache::CacheStats;
use crate::imaging::{BackendError, ImageBackend, Transformer, VideoBackend};
use crate::naming::{MediaKind, ProjectOutput, assign_keys, classify};
use crate::types::MediaAsset;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to process {}: {source}", path.display())]
    Media {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
}

/// Media of one project, in processing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectMedia {
    pub assets: Vec<MediaAsset>,
    pub stats: CacheStats,
}

/// Recognized media files directly inside `dir`, sorted by file name.
pub fn media_files(dir: &Path) -> Result<Vec<(PathBuf, MediaKind)>, ProcessError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(kind) = classify(&path) {
            files.push((path, kind));
        }
    }
    files.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
    Ok(files)
}

/// Transform all media of one project directory.
pub fn process_directory<I: ImageBackend, V: VideoBackend>(
    transformer: &Transformer<'_, I, V>,
    project_dir: &Path,
    out: &ProjectOutput,
) -> Result<ProjectMedia, ProcessError> {
    let files = media_files(project_dir)?;
    let paths: Vec<PathBuf> = files.iter().map(|(p, _)| p.clone()).collect();
    let keys = assign_keys(&paths);

    let mut media = ProjectMedia::default();
    for ((path, kind), key) in files.iter().zip(&keys) {
        let transformed = match kind {
            MediaKind::Image => transformer.transform_image(path, out, key),
            MediaKind::Video => transformer.transform_video(path, out, key),
        }
        .map_err(|source| ProcessError::Media {
            path: path.clone(),
            source,
        })?;

        for (derivative, status) in &transformed.derivatives {
            debug!(
                source = %path.display(),
                derivative = derivative.label(),
                %status,
                "derivative"
            );
            media.stats.record(*status);
        }
        media.assets.push(transformed.asset);
    }
    Ok(media)
}
