//! Rendering a single page declaration.
//!
//! A page's template variables are layered, lowest precedence first:
//!
//! 1. a snapshot of the shared context (named output of earlier pages)
//! 2. the page's `datafile`, decoded and fragment-resolved
//! 3. the page's inline `data`
//!
//! Layers are merged key by key; a later layer replaces a key wholesale, it
//! does not merge into nested mappings. Once the template has rendered, the
//! page's `assets` are copied into the output asset directory.

use crate::decode::{self, DecodeError};
use crate::manifest::PageDeclaration;
use crate::template::{TemplateBackend, TemplateError};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Datafile(#[from] DecodeError),
    #[error("asset '{name}' not found at {}", path.display())]
    AssetNotFound { name: String, path: PathBuf },
    #[error("asset '{0}' does not name a file")]
    InvalidAsset(String),
    #[error("can't copy asset '{name}': {source}")]
    AssetCopy {
        name: String,
        source: std::io::Error,
    },
}

/// Directories a page render reads from and writes assets into.
#[derive(Debug, Clone)]
pub struct RenderPaths {
    pub content_root: PathBuf,
    pub asset_root: PathBuf,
    pub output_asset_dir: PathBuf,
}

/// Renders page declarations with a template backend.
pub struct PageRenderer<B: TemplateBackend> {
    backend: B,
    paths: RenderPaths,
}

impl<B: TemplateBackend> PageRenderer<B> {
    pub fn new(backend: B, paths: RenderPaths) -> Self {
        Self { backend, paths }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Render `page` on top of `base` (a context snapshot the renderer owns).
    ///
    /// Returns the rendered text. Asset copies have already happened when
    /// this returns.
    pub fn render(&self, page: &PageDeclaration, base: Map<String, Value>) -> Result<String, RenderError> {
        self.backend.lookup(&page.template)?;
        let vars = self.variables(page, base)?;
        let text = self.backend.render(&page.template, &Value::Object(vars))?;
        for asset in &page.assets {
            self.copy_asset(asset)?;
        }
        Ok(text)
    }

    /// Build the merged variable set for `page`.
    pub fn variables(
        &self,
        page: &PageDeclaration,
        mut vars: Map<String, Value>,
    ) -> Result<Map<String, Value>, RenderError> {
        if let Some(datafile) = &page.datafile {
            vars.extend(decode::load_datafile(&self.paths.content_root, datafile)?);
        }
        if let Some(data) = &page.data {
            vars.extend(data.clone());
        }
        Ok(vars)
    }

    /// Copy one asset into the output asset directory, keeping its filename.
    fn copy_asset(&self, asset: &str) -> Result<PathBuf, RenderError> {
        let source = self.paths.asset_root.join(asset);
        let Some(filename) = Path::new(asset).file_name() else {
            return Err(RenderError::InvalidAsset(asset.to_string()));
        };
        if !source.is_file() {
            return Err(RenderError::AssetNotFound {
                name: asset.to_string(),
                path: source,
            });
        }
        let dest = self.paths.output_asset_dir.join(filename);
        fs::copy(&source, &dest).map_err(|e| RenderError::AssetCopy {
            name: asset.to_string(),
            source: e,
        })?;
        log::debug!("copied asset {} → {}", source.display(), dest.display());
        Ok(dest)
    }
}
