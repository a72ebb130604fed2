//! CLI output formatting for builds.
//!
//! Every page declaration gets one header line: its 1-based position in the
//! manifest, its template, and what happened to its output. Named pages show
//! the context name they fed; pages with a URL show the file they were
//! written to. Copied assets follow as indented context lines.
//!
//! ```text
//! 001 snippet.html (name: snippets)
//! 002 index.html → index.html
//!     asset: site.css
//!
//! Built 2 pages, wrote 1 file into build/
//! ```
//!
//! A page with neither a name nor a URL is still listed: it was rendered and
//! its assets were copied, even though its text went nowhere.
//!
//! Format functions are pure and return `Vec<String>`; `print_*` wrappers
//! write them to stdout.

use crate::site::{BuildReport, PageOutcome};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn page_header(index: usize, page: &PageOutcome) -> String {
    let mut line = format!("{} {}", format_index(index), page.template);
    if let Some(name) = &page.name {
        line.push_str(&format!(" (name: {name})"));
    }
    if let Some(written) = &page.written {
        line.push_str(&format!(
            " \u{2192} {}",
            written.to_string_lossy().replace('\\', "/")
        ));
    }
    line
}

// ============================================================================
// Build
// ============================================================================

/// Format a build report as display lines.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, page) in report.pages.iter().enumerate() {
        lines.push(page_header(i + 1, page));
        for asset in &page.assets {
            lines.push(format!("{}asset: {}", indent(1), asset));
        }
    }

    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Built {}, wrote {} into {}/",
        plural(report.pages.len(), "page"),
        plural(report.files_written(), "file"),
        report.output_root.display()
    ));

    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
