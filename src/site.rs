//! Whole-site builds.
//!
//! A build is a single forward pass over the manifest:
//!
//! ```text
//! clean output → recreate output + asset dir → load manifest
//!   → for each page declaration, in order:
//!        render (on a snapshot of the shared context)
//!        → accumulate under `name`, if any
//!        → write to the path mapped from `url`, if any
//! ```
//!
//! Pages are rendered one at a time, and a page's contribution to the shared
//! context is applied before the next page starts, so a page can use the
//! named output of every page above it in the manifest and none below.
//!
//! The output root is deleted unconditionally at the start of every build.
//! A failure stops the pass where it happened; files already written stay.

use crate::config::SiteConfig;
use crate::context::SharedContext;
use crate::manifest::{Manifest, ManifestError, PageDeclaration};
use crate::render::{PageRenderer, RenderError, RenderPaths};
use crate::template::{HandlebarsBackend, TemplateBackend};
use crate::url::{self, UrlError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("can't reset output directory {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("page {index} ({template}): {source}")]
    Render {
        index: usize,
        template: String,
        source: RenderError,
    },
    #[error("page {index} ({template}): {source}")]
    Write {
        index: usize,
        template: String,
        source: UrlError,
    },
}

/// What happened to one page declaration during a build.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOutcome {
    pub template: String,
    pub name: Option<String>,
    /// Written file relative to the output root, for pages with a URL.
    pub written: Option<PathBuf>,
    pub assets: Vec<String>,
}

/// Result of a successful build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    pub output_root: PathBuf,
    pub pages: Vec<PageOutcome>,
}

impl BuildReport {
    pub fn files_written(&self) -> usize {
        self.pages.iter().filter(|p| p.written.is_some()).count()
    }
}

/// Builds a site from a manifest using a fixed configuration.
pub struct SiteBuilder<B: TemplateBackend = HandlebarsBackend> {
    config: SiteConfig,
    renderer: PageRenderer<B>,
}

impl SiteBuilder<HandlebarsBackend> {
    /// Create a builder that renders with the templates under
    /// `config.template_root`. Templates are loaded as pages reference them.
    pub fn new(config: SiteConfig) -> Self {
        let backend = HandlebarsBackend::new(&config.template_root);
        Self::with_backend(config, backend)
    }
}

impl<B: TemplateBackend> SiteBuilder<B> {
    pub fn with_backend(config: SiteConfig, backend: B) -> Self {
        let paths = RenderPaths {
            content_root: config.content_root.clone(),
            asset_root: config.asset_root.clone(),
            output_asset_dir: config.output_asset_dir(),
        };
        Self {
            config,
            renderer: PageRenderer::new(backend, paths),
        }
    }

    /// Run a full build of the manifest at `manifest_path`.
    pub fn build(&self, manifest_path: &Path) -> Result<BuildReport, BuildError> {
        clean(&self.config.output_root).map_err(|source| BuildError::Output {
            path: self.config.output_root.clone(),
            source,
        })?;
        let asset_dir = self.config.output_asset_dir();
        fs::create_dir_all(&asset_dir).map_err(|source| BuildError::Output {
            path: asset_dir.clone(),
            source,
        })?;

        let manifest = Manifest::load(manifest_path)?;
        log::info!(
            "building {} page declarations from {}",
            manifest.content.len(),
            manifest_path.display()
        );
        self.build_pages(&manifest.content)
    }

    /// Render, accumulate and write each declaration in order.
    ///
    /// Expects the output root and asset directory to exist.
    pub fn build_pages(&self, pages: &[PageDeclaration]) -> Result<BuildReport, BuildError> {
        let mut context = SharedContext::new();
        let mut outcomes = Vec::with_capacity(pages.len());

        for (i, page) in pages.iter().enumerate() {
            let index = i + 1;
            log::debug!("rendering page {index} with {}", page.template);
            let rendered = self
                .renderer
                .render(page, context.snapshot())
                .map_err(|source| BuildError::Render {
                    index,
                    template: page.template.clone(),
                    source,
                })?;

            if let Some(name) = &page.name {
                context.put(name, rendered.as_str());
            }

            let written = match &page.url {
                Some(page_url) => Some(
                    url::write_page(&self.config.output_root, page_url, &rendered).map_err(
                        |source| BuildError::Write {
                            index,
                            template: page.template.clone(),
                            source,
                        },
                    )?,
                ),
                None => None,
            };

            outcomes.push(PageOutcome {
                template: page.template.clone(),
                name: page.name.clone(),
                written,
                assets: page.assets.clone(),
            });
        }

        Ok(BuildReport {
            output_root: self.config.output_root.clone(),
            pages: outcomes,
        })
    }
}

/// Remove the output root if it exists.
pub fn clean(output_root: &Path) -> io::Result<()> {
    if output_root.exists() {
        log::info!("removing {}", output_root.display());
        fs::remove_dir_all(output_root)?;
    }
    Ok(())
}
