//! Shared test utilities for the folio test suite.
//!
//! Provides a builder for throwaway project trees and small image fixtures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tree = ProjectTree::new()
//!     .project("works", "demo", "---\ntitle: Demo\n---\nBody")
//!     .media("works", "demo", &["photo.jpg", "clip.mov"])
//!     .category("talks");
//!
//! let discovery = discover(&tree.root()).unwrap();
//! let layout = layout_in(&tree);
//! ```

use crate::aggregate::Layout;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Fixture setup
// =========================================================================

/// A temp directory holding `projects/` (sources) and `output/`.
pub struct ProjectTree {
    tmp: TempDir,
}

impl ProjectTree {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("projects")).unwrap();
        Self { tmp }
    }

    /// Base of the temp directory.
    pub fn base(&self) -> &Path {
        self.tmp.path()
    }

    /// The projects root passed to discovery.
    pub fn root(&self) -> PathBuf {
        self.tmp.path().join("projects")
    }

    pub fn output(&self) -> PathBuf {
        self.tmp.path().join("output")
    }

    pub fn category(self, name: &str) -> Self {
        fs::create_dir_all(self.root().join(name)).unwrap();
        self
    }

    /// Create a project with the given `index.md` content.
    pub fn project(self, category: &str, slug: &str, document: &str) -> Self {
        let dir = self.root().join(category).join(slug);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("index.md"), document).unwrap();
        self
    }

    /// Add empty media files to a project. Mock backends never read them.
    pub fn media(self, category: &str, slug: &str, names: &[&str]) -> Self {
        let dir = self.root().join(category).join(slug);
        fs::create_dir_all(&dir).unwrap();
        for name in names {
            fs::write(dir.join(name), "").unwrap();
        }
        self
    }

    /// Write an arbitrary file relative to the projects root.
    pub fn file(self, relative: &str, content: &str) -> Self {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }
}

/// Layout writing into the tree's `output/` with default names.
pub fn layout_in(tree: &ProjectTree) -> Layout {
    Layout {
        output_root: tree.output(),
        media_dir: "projects".to_string(),
        metadata_file: "index.md".to_string(),
    }
}

// =========================================================================
// Images
// =========================================================================

/// Write a real image (format from the extension) with a simple gradient.
pub fn write_test_image(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    });
    img.save(path).unwrap();
}

/// Relative paths of every file under `dir`, sorted.
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
