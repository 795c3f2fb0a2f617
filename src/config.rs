//! Build configuration module.
//!
//! Handles loading, validating, and merging `folio.toml`. The file is sparse:
//! stock defaults are the base layer and the user file only overrides what it
//! names.
//!
//! ## Config File Location
//!
//! `folio.toml` in the working directory, or any file passed with
//! `--config`. A missing file means "all defaults". Relative paths in
//! `[paths]` resolve against the directory holding the config file:
//!
//! ```text
//! site/
//! ├── folio.toml
//! ├── src/
//! │   ├── featured.yaml
//! │   └── projects/
//! │       └── <category>/<project>/index.md
//! └── output/
//!     ├── index.html
//!     └── projects/<category>/<project>/<derivatives>
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [paths]
//! projects = "src/projects"
//! output = "output"
//! media_dir = "projects"        # Derivative root, inside `output`
//! featured = "src/featured.yaml"
//! index = "index.html"          # Page file name, inside `output`
//! metadata_file = "index.md"
//!
//! [categories]
//! order = []                    # Display order; unlisted follow by name
//!
//! [images]
//! thumbnail_max = 500
//! full_max = 1920
//! quality = 90                  # JPEG quality (1-100)
//!
//! [video]
//! thumbnail_timestamp = 1.0     # Seconds into the clip
//! crf = 23                      # 0-51, lower is better
//! preset = "medium"
//! audio_codec = "aac"
//! audio_bitrate = "128k"
//! ffmpeg = "ffmpeg"
//!
//! [processing]
//! max_processes = 4             # Omit for auto = CPU cores
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::aggregate::Layout;
use crate::imaging::{MediaSettings, Quality, VideoEncoding};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Build configuration loaded from `folio.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub paths: PathsConfig,
    pub categories: CategoriesConfig,
    pub images: ImagesConfig,
    pub video: VideoConfig,
    pub processing: ProcessingConfig,
}

impl BuildConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Validation(msg.into()));
        if !(1..=100).contains(&self.images.quality) {
            return invalid("images.quality must be 1-100");
        }
        if self.images.thumbnail_max == 0 || self.images.full_max == 0 {
            return invalid("images.thumbnail_max and images.full_max must be non-zero");
        }
        if self.images.thumbnail_max > self.images.full_max {
            return invalid("images.thumbnail_max must not exceed images.full_max");
        }
        let ts = self.video.thumbnail_timestamp;
        if !ts.is_finite() || ts < 0.0 {
            return invalid("video.thumbnail_timestamp must be a non-negative number");
        }
        if self.video.crf > 51 {
            return invalid("video.crf must be 0-51");
        }
        if self.paths.metadata_file.is_empty() || self.paths.index.is_empty() {
            return invalid("paths.metadata_file and paths.index must not be empty");
        }
        if !is_subdirectory(&self.paths.media_dir) {
            return invalid("paths.media_dir must be a relative directory below paths.output");
        }
        Ok(())
    }

    /// Make relative `[paths]` entries relative to `base`.
    pub fn resolve_paths(mut self, base: &Path) -> Self {
        for path in [
            &mut self.paths.projects,
            &mut self.paths.output,
            &mut self.paths.featured,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Derivative sizes and codec settings for the media stage.
    pub fn media_settings(&self, reprocess_videos: bool) -> MediaSettings {
        MediaSettings {
            thumbnail_max: self.images.thumbnail_max,
            full_max: self.images.full_max,
            quality: Quality::new(self.images.quality),
            thumbnail_timestamp: self.video.thumbnail_timestamp,
            encoding: VideoEncoding {
                crf: self.video.crf,
                preset: self.video.preset.clone(),
                audio_codec: self.video.audio_codec.clone(),
                audio_bitrate: self.video.audio_bitrate.clone(),
                ..VideoEncoding::default()
            },
            reprocess_videos,
        }
    }

    pub fn layout(&self) -> Layout {
        Layout {
            output_root: self.paths.output.clone(),
            media_dir: self.paths.media_dir.clone(),
            metadata_file: self.paths.metadata_file.clone(),
        }
    }

    /// Where the rendered page is written.
    pub fn index_path(&self) -> PathBuf {
        self.paths.output.join(&self.paths.index)
    }

    /// Root of all derivatives.
    pub fn media_root(&self) -> PathBuf {
        self.paths.output.join(&self.paths.media_dir)
    }
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Root of the `<category>/<project>` tree.
    pub projects: PathBuf,
    pub output: PathBuf,
    /// Derivative root below `output`.
    pub media_dir: String,
    /// YAML list of featured overrides.
    pub featured: PathBuf,
    /// Rendered page file name below `output`.
    pub index: String,
    /// Per-project metadata document name.
    pub metadata_file: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            projects: PathBuf::from("src/projects"),
            output: PathBuf::from("output"),
            media_dir: "projects".to_string(),
            featured: PathBuf::from("src/featured.yaml"),
            index: "index.html".to_string(),
            metadata_file: "index.md".to_string(),
        }
    }
}

/// Category display settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoriesConfig {
    /// Declared display order. Categories not listed follow, by name.
    pub order: Vec<String>,
}

/// Image derivative settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Bounding box edge of thumbnails (images and video stills).
    pub thumbnail_max: u32,
    /// Bounding box edge of full-size images and transcoded videos.
    pub full_max: u32,
    /// JPEG quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            thumbnail_max: 500,
            full_max: 1920,
            quality: 90,
        }
    }
}

/// Video derivative settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VideoConfig {
    /// Seconds into the clip for the thumbnail frame.
    pub thumbnail_timestamp: f64,
    /// H.264 constant rate factor.
    pub crf: u32,
    /// x264 speed/size preset.
    pub preset: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Name or path of the ffmpeg binary.
    pub ffmpeg: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            thumbnail_timestamp: 1.0,
            crf: 23,
            preset: "medium".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
            ffmpeg: "ffmpeg".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of projects processed in parallel.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// True for a non-empty relative path made only of normal components, so the
/// media root can never be the output root or lie outside it.
fn is_subdirectory(dir: &str) -> bool {
    let path = Path::new(dir);
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, std::path::Component::Normal(_)))
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// Parsed from [`stock_config_toml`], so the documented file and the base
/// layer cannot drift apart.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::from_str(stock_config_toml())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(toml::from_str(&content)?))
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<BuildConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: BuildConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config at `path` with relative paths resolved against its
/// directory.
pub fn load_config(path: &Path) -> Result<BuildConfig, ConfigError> {
    let config = resolve_config(load_raw_config(path)?)?;
    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Ok(config.resolve_paths(base))
}

/// Returns a fully-commented stock `folio.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Relative paths are resolved against the directory holding this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Locations
# ---------------------------------------------------------------------------
[paths]
# Root of the <category>/<project> source tree.
projects = "src/projects"

# Build output directory.
output = "output"

# Directory inside `output` that mirrors <category>/<project> with derivatives.
media_dir = "projects"

# YAML list of featured projects. A missing file features nothing.
featured = "src/featured.yaml"

# File name of the rendered page inside `output`.
index = "index.html"

# Metadata document every project directory must contain.
metadata_file = "index.md"

# ---------------------------------------------------------------------------
# Categories
# ---------------------------------------------------------------------------
[categories]
# Display order. Categories not listed here follow, sorted by name.
# Example: order = ["works", "talks"]
order = []

# ---------------------------------------------------------------------------
# Image derivatives
# ---------------------------------------------------------------------------
[images]
# Bounding box (pixels, both axes) for thumbnails. Never upscales.
thumbnail_max = 500

# Bounding box for full-size images and transcoded videos.
full_max = 1920

# JPEG quality (1 = worst, 100 = best).
quality = 90

# ---------------------------------------------------------------------------
# Video derivatives (requires ffmpeg)
# ---------------------------------------------------------------------------
[video]
# Seconds into the clip to grab the thumbnail frame from.
thumbnail_timestamp = 1.0

# H.264 constant rate factor, 0-51 (lower = better quality, bigger files).
crf = 23

# x264 preset: ultrafast ... medium ... veryslow.
preset = "medium"

audio_codec = "aac"
audio_bitrate = "128k"

# ffmpeg binary name or path.
ffmpeg = "ffmpeg"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum projects processed in parallel.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn overlay(toml_src: &str) -> Result<BuildConfig, ConfigError> {
        resolve_config(Some(toml::from_str(toml_src).unwrap()))
    }

    // =========================================================================
    // Defaults
    // =========================================================================

    #[test]
    fn stock_toml_matches_defaults() {
        let from_stock = resolve_config(None).unwrap();
        assert_eq!(from_stock, BuildConfig::default());
    }

    #[test]
    fn defaults_validate() {
        assert!(BuildConfig::default().validate().is_ok());
    }

    // =========================================================================
    // Merging
    // =========================================================================

    #[test]
    fn sparse_override_keeps_other_defaults() {
        let config = overlay("[images]\nquality = 75\n").unwrap();
        assert_eq!(config.images.quality, 75);
        assert_eq!(config.images.thumbnail_max, 500);
        assert_eq!(config.video.crf, 23);
    }

    #[test]
    fn arrays_replace_instead_of_merging() {
        let config = overlay("[categories]\norder = [\"works\", \"talks\"]\n").unwrap();
        assert_eq!(config.categories.order, vec!["works", "talks"]);
    }

    #[test]
    fn merge_toml_nested_tables() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let over: toml::Value = toml::from_str("[a]\ny = 3\n[b]\nz = 4\n").unwrap();
        let merged = merge_toml(base, over);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
        assert_eq!(merged["b"]["z"].as_integer(), Some(4));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(matches!(
            overlay("[images]\nqualty = 80\n"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            overlay("[imagess]\nquality = 80\n"),
            Err(ConfigError::Toml(_))
        ));
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn quality_out_of_range() {
        assert!(matches!(
            overlay("[images]\nquality = 0\n"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            overlay("[images]\nquality = 101\n"),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn thumbnail_larger_than_full_is_rejected() {
        let err = overlay("[images]\nthumbnail_max = 2000\n").unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn zero_box_is_rejected() {
        assert!(overlay("[images]\nthumbnail_max = 0\n").is_err());
    }

    #[test]
    fn negative_timestamp_is_rejected() {
        assert!(overlay("[video]\nthumbnail_timestamp = -1.0\n").is_err());
        assert!(overlay("[video]\nthumbnail_timestamp = nan\n").is_err());
    }

    #[test]
    fn media_dir_must_stay_below_output() {
        for bad in ["", ".", "./", "..", "../elsewhere", "media/../..", "/srv/media"] {
            let src = format!("[paths]\nmedia_dir = {bad:?}\n");
            assert!(
                matches!(overlay(&src), Err(ConfigError::Validation(_))),
                "accepted media_dir {bad:?}"
            );
        }
        assert!(overlay("[paths]\nmedia_dir = \"media/projects\"\n").is_ok());
    }

    #[test]
    fn crf_out_of_range() {
        assert!(overlay("[video]\ncrf = 52\n").is_err());
        assert!(overlay("[video]\ncrf = 0\n").is_ok());
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn missing_file_gives_defaults_relative_to_its_dir() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("folio.toml")).unwrap();
        assert_eq!(config.paths.projects, tmp.path().join("src/projects"));
        assert_eq!(config.index_path(), tmp.path().join("output/index.html"));
        assert_eq!(config.media_root(), tmp.path().join("output/projects"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("folio.toml");
        fs::write(&path, "[paths]\noutput = \"/srv/site\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.paths.output, PathBuf::from("/srv/site"));
        assert_eq!(config.paths.featured, tmp.path().join("src/featured.yaml"));
    }

    #[test]
    fn invalid_toml_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("folio.toml");
        fs::write(&path, "[images\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Derived settings
    // =========================================================================

    #[test]
    fn media_settings_carry_config_values() {
        let config = overlay("[images]\nquality = 80\n[video]\ncrf = 28\npreset = \"slow\"\n").unwrap();
        let settings = config.media_settings(true);
        assert_eq!(settings.quality, Quality::new(80));
        assert_eq!(settings.encoding.crf, 28);
        assert_eq!(settings.encoding.preset, "slow");
        assert_eq!(settings.encoding.video_codec, "libx264");
        assert!(settings.reprocess_videos);
    }

    #[test]
    fn effective_threads_clamps_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let huge = ProcessingConfig {
            max_processes: Some(10_000),
        };
        assert_eq!(effective_threads(&huge), cores);
        let one = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&one), 1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }
}
