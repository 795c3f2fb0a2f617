//! Parameter types for media operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`operations`](super::operations) module (which
//! decides which derivatives are needed) and the backends (which do the pixel
//! and codec work). Swapping a backend for a mock never changes what gets
//! asked for.
//!
//! ## Types
//!
//! - [`Quality`] — Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`ResizeTarget`] — One bounded copy of a decoded image.
//! - [`ImageParams`] — Source image plus every copy to produce from a single decode.
//! - [`FrameParams`] — Still frame extraction from a video.
//! - [`TranscodeParams`] / [`VideoEncoding`] — Full video transcode settings.

use std::path::PathBuf;

/// Quality setting for lossy image encoding, always within 1-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// One output of an image render: bounded to `max_edge` on both axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeTarget {
    pub output: PathBuf,
    pub max_edge: u32,
}

/// Decode `source` once and write every target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageParams {
    pub source: PathBuf,
    pub targets: Vec<ResizeTarget>,
    pub quality: Quality,
}

/// Grab one frame at `timestamp` seconds, bounded to `max_edge`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub timestamp: f64,
    pub max_edge: u32,
    pub quality: Quality,
}

/// Codec settings for web-streamable output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEncoding {
    pub video_codec: String,
    /// Constant rate factor (0–51, lower is better).
    pub crf: u32,
    pub preset: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl Default for VideoEncoding {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            crf: 23,
            preset: "medium".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
        }
    }
}

/// Transcode `source` to a fast-start MP4 bounded to `max_edge`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub max_edge: u32,
    pub encoding: VideoEncoding,
}
