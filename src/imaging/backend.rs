//! Media backend traits and shared error type.
//!
//! [`ImageBackend`] turns one source image into bounded JPEG copies;
//! [`VideoBackend`] grabs still frames and transcodes videos. Production
//! implementations are [`RustBackend`](super::rust_backend::RustBackend)
//! (pure Rust, `image` crate) and
//! [`FfmpegBackend`](super::ffmpeg_backend::FfmpegBackend) (shells out to
//! `ffmpeg`). Both traits are `Sync` so a single backend can serve the rayon
//! worker pool.

use super::params::{FrameParams, ImageParams, TranscodeParams};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("`{tool}` was not found; install it or set its path in the config")]
    ToolMissing { tool: String },
    #[error("`{tool}` exited with {status}:\n{stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },
}

/// Image decode/resize/encode.
pub trait ImageBackend: Sync {
    /// Decode `params.source` once and write one bounded copy per target.
    fn render(&self, params: &ImageParams) -> Result<(), BackendError>;
}

/// Video frame extraction and transcoding.
pub trait VideoBackend: Sync {
    /// Write a single still frame.
    fn extract_frame(&self, params: &FrameParams) -> Result<(), BackendError>;

    /// Write a web-streamable transcode.
    fn transcode(&self, params: &TranscodeParams) -> Result<(), BackendError>;
}
