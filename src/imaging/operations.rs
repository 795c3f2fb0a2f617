//! High-level media transforms.
//!
//! A [`Transformer`] owns the size and codec settings and turns one source
//! file into a [`MediaAsset`]. For each derivative it consults the
//! [cache gate](crate::cache::gate), creates the output directory when work is
//! needed, and only then calls the backend. Derivatives are gated
//! independently: an image whose thumbnail exists but whose full-size copy is
//! missing gets a render call for the full-size copy alone.

use super::backend::{BackendError, ImageBackend, VideoBackend};
use super::params::{
    FrameParams, ImageParams, Quality, ResizeTarget, TranscodeParams, VideoEncoding,
};
use crate::cache::{CacheStatus, Gate, gate};
use crate::naming::{DerivativeKind, ProjectOutput};
use crate::types::MediaAsset;
use std::path::{Path, PathBuf};

/// Result type for media operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Fixed sizes and codec settings for every derivative of a build.
#[derive(Debug, Clone)]
pub struct MediaSettings {
    /// Bounding box edge for thumbnails (images and video stills).
    pub thumbnail_max: u32,
    /// Bounding box edge for full-size images and transcoded videos.
    pub full_max: u32,
    pub quality: Quality,
    /// Seconds into the video for the thumbnail frame.
    pub thumbnail_timestamp: f64,
    pub encoding: VideoEncoding,
    /// Regenerate video derivatives even when they exist.
    pub reprocess_videos: bool,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            thumbnail_max: 500,
            full_max: 1920,
            quality: Quality::default(),
            thumbnail_timestamp: 1.0,
            encoding: VideoEncoding::default(),
            reprocess_videos: false,
        }
    }
}

/// A transformed source: the asset plus what happened to each derivative.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub asset: MediaAsset,
    pub derivatives: Vec<(DerivativeKind, CacheStatus)>,
}

/// Derivative producer for one build.
pub struct Transformer<'a, I: ImageBackend, V: VideoBackend> {
    images: &'a I,
    videos: &'a V,
    settings: &'a MediaSettings,
}

impl<'a, I: ImageBackend, V: VideoBackend> Transformer<'a, I, V> {
    pub fn new(images: &'a I, videos: &'a V, settings: &'a MediaSettings) -> Self {
        Self {
            images,
            videos,
            settings,
        }
    }

    pub fn settings(&self) -> &MediaSettings {
        self.settings
    }

    /// Produce the thumbnail and full-size JPEG for one image.
    ///
    /// The source is decoded at most once, and not at all when both outputs
    /// are already present. Images ignore the reprocess switch.
    pub fn transform_image(
        &self,
        source: &Path,
        out: &ProjectOutput,
        key: &str,
    ) -> Result<Transformed> {
        let (thumb_rel, thumb_abs) = out.derivative_path(key, DerivativeKind::Thumbnail);
        let (full_rel, full_abs) = out.derivative_path(key, DerivativeKind::FullImage);

        let thumb_gate = gate(&thumb_abs, false);
        let full_gate = gate(&full_abs, false);

        let mut targets = Vec::new();
        if thumb_gate == Gate::Proceed {
            targets.push(ResizeTarget {
                output: thumb_abs,
                max_edge: self.settings.thumbnail_max,
            });
        }
        if full_gate == Gate::Proceed {
            targets.push(ResizeTarget {
                output: full_abs,
                max_edge: self.settings.full_max,
            });
        }

        if !targets.is_empty() {
            std::fs::create_dir_all(&out.absolute)?;
            let outputs: Vec<PathBuf> = targets.iter().map(|t| t.output.clone()).collect();
            let params = ImageParams {
                source: source.to_path_buf(),
                targets,
                quality: self.settings.quality,
            };
            discard_on_error(self.images.render(&params), &outputs)?;
        }

        Ok(Transformed {
            asset: MediaAsset::Image {
                thumbnail_path: thumb_rel,
                full_image_path: full_rel,
            },
            derivatives: vec![
                (DerivativeKind::Thumbnail, thumb_gate.into()),
                (DerivativeKind::FullImage, full_gate.into()),
            ],
        })
    }

    /// Produce the still thumbnail and the web transcode for one video.
    ///
    /// Both outputs honor the reprocess switch.
    pub fn transform_video(
        &self,
        source: &Path,
        out: &ProjectOutput,
        key: &str,
    ) -> Result<Transformed> {
        let force = self.settings.reprocess_videos;
        let (thumb_rel, thumb_abs) = out.derivative_path(key, DerivativeKind::Thumbnail);
        let (video_rel, video_abs) = out.derivative_path(key, DerivativeKind::Video);

        let thumb_gate = gate(&thumb_abs, force);
        let video_gate = gate(&video_abs, force);

        if thumb_gate == Gate::Proceed || video_gate == Gate::Proceed {
            std::fs::create_dir_all(&out.absolute)?;
        }

        if thumb_gate == Gate::Proceed {
            let params = FrameParams {
                source: source.to_path_buf(),
                output: thumb_abs.clone(),
                timestamp: self.settings.thumbnail_timestamp,
                max_edge: self.settings.thumbnail_max,
                quality: self.settings.quality,
            };
            discard_on_error(self.videos.extract_frame(&params), &[thumb_abs])?;
        }

        if video_gate == Gate::Proceed {
            let params = TranscodeParams {
                source: source.to_path_buf(),
                output: video_abs.clone(),
                max_edge: self.settings.full_max,
                encoding: self.settings.encoding.clone(),
            };
            discard_on_error(self.videos.transcode(&params), &[video_abs])?;
        }

        Ok(Transformed {
            asset: MediaAsset::Video {
                thumbnail_path: thumb_rel,
                video_path: video_rel,
            },
            derivatives: vec![
                (DerivativeKind::Thumbnail, thumb_gate.into()),
                (DerivativeKind::Video, video_gate.into()),
            ],
        })
    }
}

/// Remove partially written outputs so the gate doesn't treat them as cached.
fn discard_on_error(result: Result<()>, outputs: &[PathBuf]) -> Result<()> {
    if result.is_err() {
        for path in outputs {
            let _ = std::fs::remove_file(path);
        }
    }
    result
}
