//! Media derivative generation.
//!
//! | Operation | Backend / function |
//! |---|---|
//! | **Image → thumbnail + full JPEG** | `image` crate, Lanczos3 + JPEG encoder |
//! | **Video → still frame** | `ffmpeg -ss … -frames:v 1` |
//! | **Video → web MP4** | `ffmpeg` H.264 + AAC, `+faststart`, even padding |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing media operations
//! - **Backend**: [`ImageBackend`] / [`VideoBackend`] traits + [`RustBackend`], [`FfmpegBackend`]
//! - **Operations**: [`Transformer`], combining cache gating + backend calls

pub mod backend;
mod calculations;
pub mod ffmpeg_backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, VideoBackend};
pub use calculations::fit_within;
pub use ffmpeg_backend::FfmpegBackend;
pub use operations::{MediaSettings, Transformed, Transformer};
pub use params::{FrameParams, ImageParams, Quality, ResizeTarget, TranscodeParams, VideoEncoding};
pub use rust_backend::RustBackend;
