//! Media classification and derivative naming.
//!
//! Every derivative lives at a path computed only from where its source sits
//! in the project tree:
//!
//! ```text
//! <media_dir>/<category>/<slug>/<key>_thumbnail.jpeg   image + video
//! <media_dir>/<category>/<slug>/<key>_full.jpeg        image
//! <media_dir>/<category>/<slug>/<key>.mp4              video
//! ```
//!
//! The `key` is the source file stem (`photo.jpg` → `photo`). Stems alone are
//! ambiguous when a project holds `cover.mov` next to `cover.jpg`: both would
//! write `cover_thumbnail.jpeg`. [`assign_keys`] detects shared stems and
//! falls back to the full file name for those entries (`cover.mov`,
//! `cover.jpg`), so distinct sources never share an output path.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Extension of every still-image derivative.
pub const IMAGE_OUTPUT_EXT: &str = "jpeg";
/// Extension of every transcoded video.
pub const VIDEO_OUTPUT_EXT: &str = "mp4";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "flv", "wmv", "webm"];

/// Which transform a source file is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

/// Classify a file by extension (case-insensitive).
///
/// Returns `None` for anything that is not a recognized image or video,
/// including the metadata document itself; such files are skipped silently.
pub fn classify(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// One generated file per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivativeKind {
    Thumbnail,
    FullImage,
    Video,
}

impl DerivativeKind {
    pub fn label(self) -> &'static str {
        match self {
            DerivativeKind::Thumbnail => "thumbnail",
            DerivativeKind::FullImage => "full",
            DerivativeKind::Video => "video",
        }
    }
}

/// File name of a derivative for the given output key.
pub fn derivative_name(key: &str, kind: DerivativeKind) -> String {
    match kind {
        DerivativeKind::Thumbnail => format!("{key}_thumbnail.{IMAGE_OUTPUT_EXT}"),
        DerivativeKind::FullImage => format!("{key}_full.{IMAGE_OUTPUT_EXT}"),
        DerivativeKind::Video => format!("{key}.{VIDEO_OUTPUT_EXT}"),
    }
}

/// Output location of one project's derivatives.
///
/// `relative` uses forward slashes and is what ends up in the rendered page;
/// `absolute` is where the files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOutput {
    pub relative: String,
    pub absolute: PathBuf,
}

impl ProjectOutput {
    pub fn new(output_root: &Path, media_dir: &str, category: &str, slug: &str) -> Self {
        let relative = if media_dir.is_empty() {
            format!("{category}/{slug}")
        } else {
            format!("{}/{category}/{slug}", media_dir.trim_end_matches('/'))
        };
        let absolute = output_root.join(&relative);
        Self { relative, absolute }
    }

    /// `(relative, absolute)` path of one derivative.
    pub fn derivative_path(&self, key: &str, kind: DerivativeKind) -> (String, PathBuf) {
        let name = derivative_name(key, kind);
        (format!("{}/{}", self.relative, name), self.absolute.join(name))
    }
}

/// Compute a unique output key for every media file of one project.
///
/// Input order is preserved. Files with a unique stem keep the stem; files
/// sharing a stem use their full file name. A numeric suffix resolves the
/// remaining corner case where a full file name equals another file's stem.
pub fn assign_keys(files: &[PathBuf]) -> Vec<String> {
    let stems: Vec<String> = files.iter().map(|f| file_stem(f)).collect();

    let mut stem_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for stem in &stems {
        *stem_counts.entry(stem.as_str()).or_default() += 1;
    }

    let candidates: Vec<String> = files
        .iter()
        .zip(&stems)
        .map(|(file, stem)| {
            if stem_counts[stem.as_str()] > 1 {
                file_name(file)
            } else {
                stem.clone()
            }
        })
        .collect();

    let mut taken: HashSet<String> = HashSet::new();
    candidates
        .into_iter()
        .map(|candidate| {
            let mut key = candidate.clone();
            let mut n = 2;
            while !taken.insert(key.clone()) {
                key = format!("{candidate}-{n}");
                n += 1;
            }
            key
        })
        .collect()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    // =========================================================================
    // classify
    // =========================================================================

    #[test]
    fn classify_images() {
        assert_eq!(classify(Path::new("photo.jpg")), Some(MediaKind::Image));
        assert_eq!(classify(Path::new("scan.TIFF")), Some(MediaKind::Image));
        assert_eq!(classify(Path::new("a/b/anim.gif")), Some(MediaKind::Image));
    }

    #[test]
    fn classify_videos() {
        assert_eq!(classify(Path::new("clip.mov")), Some(MediaKind::Video));
        assert_eq!(classify(Path::new("clip.MP4")), Some(MediaKind::Video));
    }

    #[test]
    fn classify_skips_unknown_extensions() {
        assert_eq!(classify(Path::new("photo.heic")), None);
        assert_eq!(classify(Path::new("index.md")), None);
        assert_eq!(classify(Path::new("README")), None);
    }

    // =========================================================================
    // naming
    // =========================================================================

    #[test]
    fn derivative_names() {
        assert_eq!(
            derivative_name("photo", DerivativeKind::Thumbnail),
            "photo_thumbnail.jpeg"
        );
        assert_eq!(
            derivative_name("photo", DerivativeKind::FullImage),
            "photo_full.jpeg"
        );
        assert_eq!(derivative_name("clip", DerivativeKind::Video), "clip.mp4");
    }

    #[test]
    fn project_output_mirrors_category_and_slug() {
        let out = ProjectOutput::new(Path::new("/site"), "projects", "works", "demo");
        assert_eq!(out.relative, "projects/works/demo");
        assert_eq!(out.absolute, PathBuf::from("/site/projects/works/demo"));

        let (rel, abs) = out.derivative_path("photo", DerivativeKind::FullImage);
        assert_eq!(rel, "projects/works/demo/photo_full.jpeg");
        assert_eq!(abs, PathBuf::from("/site/projects/works/demo/photo_full.jpeg"));
    }

    #[test]
    fn project_output_without_media_dir() {
        let out = ProjectOutput::new(Path::new("/site"), "", "talks", "keynote");
        assert_eq!(out.relative, "talks/keynote");
    }

    // =========================================================================
    // assign_keys
    // =========================================================================

    #[test]
    fn unique_stems_are_kept() {
        let keys = assign_keys(&paths(&["a.jpg", "b.mov", "c.png"]));
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn shared_stems_use_full_file_names() {
        let keys = assign_keys(&paths(&["cover.jpg", "cover.mov", "other.png"]));
        assert_eq!(keys, vec!["cover.jpg", "cover.mov", "other"]);
    }

    #[test]
    fn residual_duplicates_get_numeric_suffix() {
        // "cover.jpg.png" has stem "cover.jpg", which equals the fallback
        // key of "cover.jpg" once "cover.jpg" and "cover.mov" collide.
        let keys = assign_keys(&paths(&["cover.jpg", "cover.jpg.png", "cover.mov"]));
        assert_eq!(keys, vec!["cover.jpg", "cover.jpg-2", "cover.mov"]);
    }

    #[test]
    fn keys_are_unique() {
        let keys = assign_keys(&paths(&["x.jpg", "x.png", "x.mov", "x.gif"]));
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }
}
