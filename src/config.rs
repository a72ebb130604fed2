//! Build configuration.
//!
//! Every directory the builder touches, and the preview server's address, is
//! a named field on [`SiteConfig`] with a documented default. Nothing is read
//! from module-level state: the binary loads a config, applies command-line
//! overrides, and hands the result to [`SiteBuilder`](crate::site::SiteBuilder)
//! by value.
//!
//! ## Config File
//!
//! An optional `easybake.toml` in the working directory overrides the stock
//! defaults. It is sparse: only the keys you want to change are needed.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! template_root = "templates"  # Templates, referenced by relative path
//! content_root = "content"     # Datafiles, referenced by relative path
//! asset_root = "assets"        # Source files for page `assets` lists
//! output_root = "build"        # Wiped and recreated on every build
//! asset_dir = "assets"         # Asset directory inside the output root
//!
//! [serve]
//! interface = "0.0.0.0"
//! port = 8000
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Default name of the optional config file.
pub const CONFIG_FILE: &str = "easybake.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site build configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Root directory for templates.
    pub template_root: PathBuf,
    /// Root directory for datafiles.
    pub content_root: PathBuf,
    /// Directory that page `assets` entries are copied from.
    pub asset_root: PathBuf,
    /// Output root, removed and recreated on every build.
    pub output_root: PathBuf,
    /// Name of the asset directory inside the output root. A single segment.
    pub asset_dir: String,
    /// Preview server settings.
    pub serve: ServeConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            template_root: PathBuf::from("templates"),
            content_root: PathBuf::from("content"),
            asset_root: PathBuf::from("assets"),
            output_root: PathBuf::from("build"),
            asset_dir: "assets".to_string(),
            serve: ServeConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_root.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output_root must not be empty".into(),
            ));
        }
        let mut components = Path::new(&self.asset_dir).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => {
                return Err(ConfigError::Validation(format!(
                    "asset_dir must be a single directory name, got '{}'",
                    self.asset_dir
                )));
            }
        }
        if self.serve.port == 0 {
            return Err(ConfigError::Validation("serve.port must be non-zero".into()));
        }
        Ok(())
    }

    /// Output directory that assets are copied into.
    pub fn output_asset_dir(&self) -> PathBuf {
        self.output_root.join(&self.asset_dir)
    }
}

/// Preview server settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    /// Interface to bind.
    pub interface: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Parse a sparse config file body and validate it.
///
/// Keys left out keep their defaults.
pub fn parse_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`, falling back to defaults when absent.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    parse_config(&fs::read_to_string(path)?)
}

/// Returns a fully-commented stock `easybake.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# easybake configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Relative paths are resolved against
# the directory the build runs in. Unknown keys will cause an error.

# Templates. Page declarations reference them by path relative to this root.
template_root = "templates"

# Datafiles. Page `datafile` entries are relative to this root.
content_root = "content"

# Source directory for files listed in a page's `assets`.
asset_root = "assets"

# Output directory. It is deleted and recreated on every build.
output_root = "build"

# Directory inside output_root that assets are copied into (one level).
asset_dir = "assets"

# ---------------------------------------------------------------------------
# Preview server (`easybake serve`)
# ---------------------------------------------------------------------------
[serve]
interface = "0.0.0.0"
port = 8000
"##
}
