//! The site manifest: an ordered list of page declarations.
//!
//! ```yaml
//! content:
//!   - template: snippet.html
//!     datafile: intro.yaml
//!     name: snippets
//!   - template: index.html
//!     url: /
//!     assets: [site.css]
//!     data:
//!       title: Home
//! ```
//!
//! Order is significant: a page only sees the named output of the pages
//! declared before it.
//!
//! Any failure here is fatal for the build and carries a message meant for
//! the person running it: the manifest can't be read, isn't valid JSON/YAML,
//! decodes to nothing, or isn't shaped like a manifest.

use crate::data;
use crate::decode::{self, DecodeError, Format};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Can't load site manifest '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Site manifest '{}' is not valid JSON: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Site manifest '{}' is not valid YAML: {source}", path.display())]
    InvalidYaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Site manifest '{}' must be a .json or .yaml file", path.display())]
    UnsupportedFormat { path: PathBuf },
    #[error("Site manifest '{}' is empty", path.display())]
    Empty { path: PathBuf },
    #[error("Site manifest '{}' is malformed: {source}", path.display())]
    Invalid {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl From<DecodeError> for ManifestError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Io { path, source } => ManifestError::Unreadable { path, source },
            DecodeError::Json { path, source } => ManifestError::InvalidJson { path, source },
            DecodeError::Yaml { path, source } => ManifestError::InvalidYaml { path, source },
            DecodeError::NotAMapping { path } => ManifestError::Empty { path },
        }
    }
}

/// Decoded site manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub content: Vec<PageDeclaration>,
}

/// One entry of the manifest's `content` list.
///
/// Keys other than the ones below are ignored, so declarations can carry
/// annotations such as a `title` or a comment.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageDeclaration {
    /// Template path relative to the template root.
    pub template: String,
    /// Data file relative to the content root.
    #[serde(default)]
    pub datafile: Option<String>,
    /// Inline variables, merged last.
    #[serde(default)]
    pub data: Option<Map<String, Value>>,
    /// Shared-context name this page's output is accumulated under.
    #[serde(default)]
    pub name: Option<String>,
    /// Output URL. Pages without one are rendered but not written.
    #[serde(default)]
    pub url: Option<String>,
    /// Files copied from the asset root into the output asset directory.
    #[serde(default)]
    pub assets: Vec<String>,
}

impl Manifest {
    /// Decode, resolve and type-check the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let format = Format::from_path(path);
        let text = decode::read_source(path)?;
        if format == Format::Other {
            return Err(ManifestError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
        let raw = decode::parse(format, &text, path)?;
        if is_empty(&raw) {
            return Err(ManifestError::Empty {
                path: path.to_path_buf(),
            });
        }
        Self::from_value(data::resolve(&raw)).map_err(|source| ManifestError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
