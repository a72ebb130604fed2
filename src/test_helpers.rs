//! Shared test utilities for the easybake test suite.
//!
//! [`SiteFixture`] lays out a throwaway site in a temp directory (templates,
//! content, assets, manifest) and hands back a [`SiteBuilder`] configured
//! for it.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteFixture::new();
//! site.template("index.html", "<h1>{{title}}</h1>");
//! let manifest = site.manifest_json(
//!     r#"{"content": [{"template": "index.html", "url": "/", "data": {"title": "Hi"}}]}"#,
//! );
//!
//! site.builder().build(&manifest).unwrap();
//! assert_eq!(site.read_output("index.html"), "<h1>Hi</h1>");
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::site::SiteBuilder;

// =========================================================================
// Fixture setup
// =========================================================================

/// A site laid out under a temp directory with the default directory names.
pub struct SiteFixture {
    tmp: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        for dir in ["templates", "content", "assets"] {
            fs::create_dir_all(tmp.path().join(dir)).unwrap();
        }
        Self { tmp }
    }

    pub fn root(&self) -> &Path {
        self.tmp.path()
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root().join("build")
    }

    /// Config pointing every root at this fixture.
    pub fn config(&self) -> SiteConfig {
        SiteConfig {
            template_root: self.root().join("templates"),
            content_root: self.root().join("content"),
            asset_root: self.root().join("assets"),
            output_root: self.output_dir(),
            ..SiteConfig::default()
        }
    }

    /// Builder over the templates as they are on disk right now.
    pub fn builder(&self) -> SiteBuilder {
        SiteBuilder::new(self.config())
    }

    pub fn template(&self, rel: &str, body: &str) {
        write_file(&self.root().join("templates").join(rel), body);
    }

    pub fn content(&self, rel: &str, body: &str) {
        write_file(&self.root().join("content").join(rel), body);
    }

    pub fn asset(&self, rel: &str, body: &str) {
        write_file(&self.root().join("assets").join(rel), body);
    }

    pub fn output_file(&self, rel: &str, body: &str) {
        write_file(&self.output_dir().join(rel), body);
    }

    /// Write `site.json` and return its path.
    pub fn manifest_json(&self, body: &str) -> PathBuf {
        let path = self.root().join("site.json");
        write_file(&path, body);
        path
    }

    /// Write `site.yaml` and return its path.
    pub fn manifest_yaml(&self, body: &str) -> PathBuf {
        let path = self.root().join("site.yaml");
        write_file(&path, body);
        path
    }

    /// Read a file from the output root. Panics with the file list on miss.
    pub fn read_output(&self, rel: &str) -> String {
        fs::read_to_string(self.output_dir().join(rel)).unwrap_or_else(|e| {
            panic!(
                "can't read output '{rel}': {e}. Available: {:?}",
                output_files(&self.output_dir())
            )
        })
    }
}

fn write_file(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

// =========================================================================
// Output inspection
// =========================================================================

/// Sorted relative paths of every file under `root`, `/`-separated.
///
/// Directories are not listed, so an empty asset directory does not show up.
pub fn output_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(root)
                .ok()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    files.sort();
    files
}
