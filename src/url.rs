//! Mapping page URLs to files in the output tree.
//!
//! URLs are always relative to the output root. A trailing `/` means "the
//! index page of that directory":
//!
//! | URL | Directory | File |
//! |-----|-----------|------|
//! | `/` | (root) | `index.html` |
//! | `/blog/` | `blog` | `index.html` |
//! | `page.html` | (root) | `page.html` |
//! | `/a/b/c.html` | `a/b` | `c.html` |
//!
//! Only one leading `/` is stripped. Empty segments produced by repeated
//! separators are skipped. `..` segments are refused so a page can never be
//! written outside the output root.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filename used for URLs that end in `/`.
pub const INDEX_FILE: &str = "index.html";

#[derive(Error, Debug)]
pub enum UrlError {
    #[error("URL '{0}' does not name a file")]
    NoFilename(String),
    #[error("URL '{0}' points outside the output directory")]
    Escapes(String),
    #[error("IO error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Output location of a page, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPath {
    /// Directory relative to the output root; empty for the root itself.
    pub dir: PathBuf,
    pub filename: String,
}

impl OutputPath {
    /// Full relative path of the file.
    pub fn relative(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }
}

/// Convert a page URL into an output directory and filename.
pub fn map_url(url: &str) -> Result<OutputPath, UrlError> {
    let mut path = url.to_string();
    if path.ends_with('/') {
        path.push_str(INDEX_FILE);
    }
    let path = path.strip_prefix('/').unwrap_or(&path);

    let mut segments: Vec<&str> = path.split('/').collect();
    let filename = segments.pop().unwrap_or_default();
    if filename == ".." || segments.contains(&"..") {
        return Err(UrlError::Escapes(url.to_string()));
    }
    if filename.is_empty() || filename == "." {
        return Err(UrlError::NoFilename(url.to_string()));
    }

    let dir: PathBuf = segments
        .into_iter()
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    Ok(OutputPath {
        dir,
        filename: filename.to_string(),
    })
}

/// Write `content` for `url` under `output_root`, creating directories as needed.
///
/// Returns the written path relative to the output root.
pub fn write_page(output_root: &Path, url: &str, content: &str) -> Result<PathBuf, UrlError> {
    let target = map_url(url)?;
    let dir = output_root.join(&target.dir);
    fs::create_dir_all(&dir).map_err(|source| UrlError::Io {
        path: dir.clone(),
        source,
    })?;
    let file = dir.join(&target.filename);
    fs::write(&file, content).map_err(|source| UrlError::Io { path: file, source })?;
    Ok(target.relative())
}
