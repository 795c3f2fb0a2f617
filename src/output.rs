//! CLI output formatting for build and check.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (category, project, featured entry) is its identity:
//! positional index plus title. Ids and counts follow as indented context
//! lines, so the output reads as a content inventory.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Featured
//! 001 Demo → works/demo
//!
//! Categories
//! 001 works (1 projects)
//!     001 Demo
//!         Id: works/demo
//!         Media: 1 image, 1 video
//! 002 talks (0 projects)
//!
//! Cache: 2 cached, 2 encoded (4 total)
//! Wrote output/index.html
//! ```
//!
//! ## Check
//!
//! ```text
//! Categories
//! 001 talks (0 projects)
//! 002 works (1 projects)
//!     001 Demo
//!         Id: works/demo
//!         Media: 2 files
//!
//! 1 featured entry
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::pipeline::{BuildReport, CheckReport};
use crate::types::{MediaAsset, ProjectItem};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional count.
///
/// ```text
/// 001 works (3 projects)
/// 001 Demo
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({} projects)", format_index(index), title, n),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Strip HTML tags from a string (simple angle-bracket stripping).
///
/// Titles arrive rendered (`<em>Demo</em>`); the terminal gets plain text.
fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// `1 image, 2 videos`, or `no media`.
fn media_summary(media: &[MediaAsset]) -> String {
    let images = media
        .iter()
        .filter(|m| matches!(m, MediaAsset::Image { .. }))
        .count();
    let videos = media.len() - images;
    match (images, videos) {
        (0, 0) => "no media".to_string(),
        (i, 0) => plural(i, "image"),
        (0, v) => plural(v, "video"),
        (i, v) => format!("{}, {}", plural(i, "image"), plural(v, "video")),
    }
}

fn project_lines(index: usize, item: &ProjectItem) -> Vec<String> {
    vec![
        format!("{}{}", indent(1), entity_header(index, &strip_html_tags(item.title()), None)),
        format!("{}Id: {}", indent(2), item.id),
        format!("{}Media: {}", indent(2), media_summary(&item.media)),
    ]
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.context.featured.is_empty() {
        lines.push("Featured".to_string());
        for (i, record) in report.context.featured.iter().enumerate() {
            let id = record.get("id").and_then(|v| v.as_str()).unwrap_or_default();
            let title = record
                .get("title")
                .and_then(|v| v.as_str())
                .map(strip_html_tags)
                .unwrap_or_else(|| id.to_string());
            lines.push(format!("{} → {}", entity_header(i + 1, &title, None), id));
        }
        lines.push(String::new());
    }

    lines.push("Categories".to_string());
    for (i, section) in report.context.categories.iter().enumerate() {
        lines.push(entity_header(i + 1, &section.name, Some(section.items.len())));
        for (j, item) in section.items.iter().enumerate() {
            lines.extend(project_lines(j + 1, item));
        }
    }

    lines.push(String::new());
    lines.push(format!("Cache: {}", report.stats));
    if !report.pruned.is_empty() {
        lines.push(format!("Pruned {}", plural(report.pruned.len(), "stale file")));
    }
    lines.push(format!("Wrote {}", report.index_path.display()));
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = vec!["Categories".to_string()];
    for (i, category) in report.categories.iter().enumerate() {
        let projects: Vec<_> = report
            .projects
            .iter()
            .filter(|p| p.id.split_once('/').map(|(c, _)| c) == Some(category.as_str()))
            .collect();
        lines.push(entity_header(i + 1, category, Some(projects.len())));
        for (j, project) in projects.iter().enumerate() {
            lines.push(format!(
                "{}{}",
                indent(1),
                entity_header(j + 1, &strip_html_tags(&project.title), None)
            ));
            lines.push(format!("{}Id: {}", indent(2), project.id));
            lines.push(format!("{}Media: {}", indent(2), plural(project.media, "file")));
        }
    }
    lines.push(String::new());
    let noun = if report.featured == 1 { "entry" } else { "entries" };
    lines.push(format!("{} featured {}", report.featured, noun));
    lines
}

pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}
