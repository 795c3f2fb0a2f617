//! Video backend that shells out to `ffmpeg`.
//!
//! Argument lists are built by pure `plan_*` functions so they can be tested
//! without the binary installed. Scaling uses ffmpeg's own expression
//! evaluator since the source dimensions are only known inside ffmpeg:
//!
//! ```text
//! scale=w='min(iw,MAX)':h='min(ih,MAX)':force_original_aspect_ratio=decrease
//! ```
//!
//! `min(iw,MAX)` keeps small sources at their native size and
//! `force_original_aspect_ratio=decrease` shrinks the other axis to keep the
//! aspect ratio. Transcodes then pad to even dimensions, which H.264 with
//! 4:2:0 chroma requires.

use super::backend::{BackendError, VideoBackend};
use super::params::{FrameParams, Quality, TranscodeParams};
use std::ffi::OsString;
use std::process::{Command, Stdio};

/// Production video backend.
pub struct FfmpegBackend {
    binary: String,
}

impl FfmpegBackend {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn run(&self, args: Vec<OsString>) -> Result<(), BackendError> {
        tracing::trace!(binary = %self.binary, ?args, "running ffmpeg");
        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => BackendError::ToolMissing {
                    tool: self.binary.clone(),
                },
                _ => BackendError::Io(e),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(BackendError::ToolFailed {
                tool: self.binary.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
            })
        }
    }
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

/// Bounding-box scale filter that never upscales.
fn scale_filter(max_edge: u32) -> String {
    format!(
        "scale=w='min(iw,{max_edge})':h='min(ih,{max_edge})':force_original_aspect_ratio=decrease"
    )
}

/// Map a 1–100 quality onto ffmpeg's MJPEG `-q:v` scale (2 best, 31 worst).
pub fn jpeg_qscale(quality: Quality) -> u32 {
    let q = quality.value();
    2 + ((100 - q) * 29 + 49) / 99
}

/// Arguments for a single-frame JPEG grab.
pub fn plan_frame(params: &FrameParams) -> Vec<OsString> {
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
        "-ss".into(),
        format!("{}", params.timestamp).into(),
        "-i".into(),
        params.source.clone().into_os_string(),
        "-frames:v".into(),
        "1".into(),
        "-vf".into(),
        scale_filter(params.max_edge).into(),
        "-q:v".into(),
        jpeg_qscale(params.quality).to_string().into(),
        params.output.clone().into_os_string(),
    ]
}

/// Arguments for a fast-start H.264/AAC transcode.
pub fn plan_transcode(params: &TranscodeParams) -> Vec<OsString> {
    let enc = &params.encoding;
    let filter = format!(
        "{},pad=ceil(iw/2)*2:ceil(ih/2)*2",
        scale_filter(params.max_edge)
    );
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
        "-i".into(),
        params.source.clone().into_os_string(),
        "-vf".into(),
        filter.into(),
        "-c:v".into(),
        enc.video_codec.clone().into(),
        "-crf".into(),
        enc.crf.to_string().into(),
        "-preset".into(),
        enc.preset.clone().into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-c:a".into(),
        enc.audio_codec.clone().into(),
        "-b:a".into(),
        enc.audio_bitrate.clone().into(),
        "-movflags".into(),
        "+faststart".into(),
        params.output.clone().into_os_string(),
    ]
}

impl VideoBackend for FfmpegBackend {
    fn extract_frame(&self, params: &FrameParams) -> Result<(), BackendError> {
        // A frame left over from an earlier run would hide a missing one.
        match std::fs::remove_file(&params.output) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
            _ => {}
        }
        self.run(plan_frame(params))?;
        // Seeking past the end succeeds without writing anything.
        if !params.output.exists() {
            return Err(BackendError::ProcessingFailed(format!(
                "no frame at {}s in {}",
                params.timestamp,
                params.source.display()
            )));
        }
        Ok(())
    }

    fn transcode(&self, params: &TranscodeParams) -> Result<(), BackendError> {
        self.run(plan_transcode(params))
    }
}
