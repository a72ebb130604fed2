//! Decoding of structured data files into a generic [`Value`] tree.
//!
//! The decoder is picked from the file extension:
//!
//! | Extension | Decoder |
//! |-----------|---------|
//! | `.json` | strict JSON (`serde_json`) |
//! | `.yaml`, `.yml` | YAML (`serde_yaml`) |
//! | anything else | [`Format::Other`], left to the caller |
//!
//! Datafiles referenced by page declarations are loaded through
//! [`load_datafile`], which resolves typed text fragments before returning.
//! The site manifest has its own stricter loader in
//! [`manifest`](crate::manifest).

use crate::data;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("can't read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("'{}' is not valid JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("'{}' is not valid YAML: {source}", path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("datafile '{}' must contain a mapping at the top level", path.display())]
    NotAMapping { path: PathBuf },
}

/// On-disk syntax of a data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Other,
}

impl Format {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Format::Json,
            Some("yaml" | "yml") => Format::Yaml,
            _ => Format::Other,
        }
    }
}

/// Read a file to a string, attaching the path to any IO error.
pub fn read_source(path: &Path) -> Result<String, DecodeError> {
    fs::read_to_string(path).map_err(|source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse `text` in the given format.
///
/// Whitespace-only input decodes to `Value::Null` for both formats.
/// `Format::Other` also yields `Value::Null`; it is up to the caller to treat
/// that as empty or as an error.
pub fn parse(format: Format, text: &str, path: &Path) -> Result<Value, DecodeError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match format {
        Format::Json => serde_json::from_str(text).map_err(|source| DecodeError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Format::Yaml => serde_yaml::from_str(text).map_err(|source| DecodeError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
        Format::Other => Ok(Value::Null),
    }
}

/// Load a datafile relative to `content_root` and resolve its fragments.
///
/// Unrecognized extensions and empty files decode to an empty mapping. The
/// file must still exist: a missing datafile is an error whatever its
/// extension.
pub fn load_datafile(content_root: &Path, datafile: &str) -> Result<Map<String, Value>, DecodeError> {
    let path = content_root.join(datafile);
    let text = read_source(&path)?;
    let format = Format::from_path(&path);
    if format == Format::Other {
        log::warn!(
            "datafile '{}' has an unrecognized extension; treating it as empty",
            path.display()
        );
    }
    match data::resolve(&parse(format, &text, &path)?) {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(DecodeError::NotAMapping { path }),
    }
}
