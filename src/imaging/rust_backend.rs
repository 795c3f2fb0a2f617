//! Pure Rust image backend — no system dependencies.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image::ImageReader` |
//! | Bounding-box math | [`fit_within`](super::calculations::fit_within) |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `jpeg_encoder::Encoder`, optimized Huffman tables |

use super::backend::{BackendError, ImageBackend};
use super::calculations::fit_within;
use super::params::ImageParams;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use jpeg_encoder::{ColorType, Encoder};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk, sniffing the format from content.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Shrink `img` to fit `max_edge`, or return it untouched if it already fits.
fn bounded(img: &DynamicImage, max_edge: u32) -> DynamicImage {
    let dims = img.dimensions();
    let (w, h) = fit_within(dims, max_edge);
    if (w, h) == dims {
        img.clone()
    } else {
        img.resize_exact(w, h, FilterType::Lanczos3)
    }
}

/// Encode `img` as JPEG into `writer`. Alpha is dropped since JPEG has no
/// alpha channel.
///
/// `optimize` builds per-image Huffman tables instead of the standard ones,
/// which shrinks the file at some encoding cost.
fn encode_jpeg<W: std::io::Write>(
    img: &DynamicImage,
    writer: W,
    quality: u32,
    optimize: bool,
) -> Result<(), BackendError> {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    let too_large = || {
        BackendError::ProcessingFailed(format!("{w}x{h} exceeds the JPEG size limit"))
    };
    let width = u16::try_from(w).map_err(|_| too_large())?;
    let height = u16::try_from(h).map_err(|_| too_large())?;

    let mut encoder = Encoder::new(writer, quality.clamp(1, 100) as u8);
    encoder.set_optimized_huffman_tables(optimize);
    encoder
        .encode(rgb.as_raw(), width, height, ColorType::Rgb)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {e}")))
}

fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let mut buf = Vec::new();
    encode_jpeg(img, &mut buf, quality, true)?;
    std::fs::write(path, buf).map_err(BackendError::Io)
}

impl ImageBackend for RustBackend {
    fn render(&self, params: &ImageParams) -> Result<(), BackendError> {
        if params.targets.is_empty() {
            return Ok(());
        }
        let img = load_image(&params.source)?;
        for target in &params.targets {
            let resized = bounded(&img, target.max_edge);
            save_jpeg(&resized, &target.output, params.quality.value())?;
        }
        Ok(())
    }
}
