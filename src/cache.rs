//! Derivative cache gate for incremental builds.
//!
//! Image resizing and especially video transcoding dominate build time. The
//! gate lets the media stage skip any derivative whose output file is already
//! on disk.
//!
//! # Design
//!
//! There is no manifest. Cache state is the presence of the output file at its
//! deterministic path (see [`naming`](crate::naming)). A derivative is
//! regenerated when:
//!
//! 1. its output file does not exist, or
//! 2. the caller passes `force = true` (the `--reprocess` switch, videos only).
//!
//! Nothing is invalidated by time or content: replacing a source file with a
//! new version under the same name keeps the stale derivative until it is
//! deleted by hand or reprocessed. Each derivative is gated on its own path,
//! so a missing full-size image is regenerated even when its thumbnail is
//! present.
//!
//! The gate never touches the filesystem beyond an existence check; creating
//! the parent directory before writing is the caller's job.
//!
//! Derivatives of deleted or renamed sources stay on disk until [`prune`]
//! removes every file under the media root that the current build did not
//! reference.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Decision for one derivative output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Output exists and is not forced: leave it alone.
    Skip,
    /// Output must be (re)generated.
    Proceed,
}

/// Decide whether the derivative at `output` has to be generated.
pub fn gate(output: &Path, force: bool) -> Gate {
    if output.exists() && !force {
        Gate::Skip
    } else {
        Gate::Proceed
    }
}

/// What happened to a single derivative during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Cached,
    Encoded,
}

impl From<Gate> for CacheStatus {
    fn from(gate: Gate) -> Self {
        match gate {
            Gate::Skip => CacheStatus::Cached,
            Gate::Proceed => CacheStatus::Encoded,
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStatus::Cached => f.write_str("cached"),
            CacheStatus::Encoded => f.write_str("encoded"),
        }
    }
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn record(&mut self, status: CacheStatus) {
        match status {
            CacheStatus::Cached => self.hits += 1,
            CacheStatus::Encoded => self.misses += 1,
        }
    }

    pub fn merge(mut self, other: CacheStats) -> Self {
        self.hits += other.hits;
        self.misses += other.misses;
        self
    }

    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} encoded ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} encoded", self.misses)
        }
    }
}

/// Delete files under `media_root` that are not in `keep`, then remove
/// directories left empty. `media_root` itself is never removed.
///
/// Returns the deleted files. A missing `media_root` prunes nothing.
pub fn prune(media_root: &Path, keep: &HashSet<PathBuf>) -> std::io::Result<Vec<PathBuf>> {
    if !media_root.is_dir() {
        return Ok(Vec::new());
    }

    let mut removed = Vec::new();
    for entry in WalkDir::new(media_root).contents_first(true) {
        let entry = entry.map_err(std::io::Error::other)?;
        let path = entry.path();
        if entry.file_type().is_dir() {
            if path != media_root && std::fs::read_dir(path)?.next().is_none() {
                std::fs::remove_dir(path)?;
            }
        } else if !keep.contains(path) {
            std::fs::remove_file(path)?;
            removed.push(path.to_path_buf());
        }
    }
    Ok(removed)
}
