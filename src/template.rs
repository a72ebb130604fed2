//! Template lookup and rendering.
//!
//! The page renderer only needs one capability from a template engine:
//! "render the template at this relative path with these variables". That
//! capability is the [`TemplateBackend`] trait, so the rest of the pipeline
//! is engine-agnostic and tests can substitute a recording backend.
//!
//! The production implementation is [`HandlebarsBackend`]. On construction
//! it only indexes the files under the template root by their root-relative
//! path with `/` separators:
//!
//! ```text
//! templates/
//! ├── index.html            → "index.html"
//! ├── snippet.html          → "snippet.html"
//! ├── logo.png              → "logo.png" (indexed, never loaded unless used)
//! └── partials/
//!     └── header.html       → "partials/header.html"
//! ```
//!
//! Files are also indexed under their path without the extension
//! (`partials/header`) unless that name is already taken, which is the form
//! to use for partials: `{{> partials/header}}`.
//!
//! Nothing is parsed up front. A page template is loaded the first time a
//! page references it, and a broken one is an error for that page only.
//! Before the first render, files with a template extension (see
//! [`PARTIAL_EXTENSIONS`]) are registered as partials; one that fails to
//! load is skipped with a debug log, so images, scripts and stray files in
//! the template root never break a build.
//!
//! Output is not HTML-escaped: page variables routinely carry HTML produced
//! by markdown fragments or by earlier pages.

use handlebars::Handlebars;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions of files registered as partials before the first render.
pub const PARTIAL_EXTENSIONS: &[&str] = &["html", "htm", "hbs", "handlebars"];

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template '{name}' not found under '{}'", root.display())]
    NotFound { name: String, root: PathBuf },
    #[error("can't load template '{name}': {source}")]
    Load {
        name: String,
        source: Box<handlebars::TemplateError>,
    },
    #[error("failed to render template '{name}': {source}")]
    Render {
        name: String,
        source: Box<handlebars::RenderError>,
    },
}

/// Something that can render a named template with a set of variables.
pub trait TemplateBackend {
    /// Check that `template` exists and loads, without rendering it.
    fn lookup(&self, template: &str) -> Result<(), TemplateError>;

    /// Render `template` (a path relative to the template root) with `vars`.
    fn render(&self, template: &str, vars: &Value) -> Result<String, TemplateError>;
}

/// Handlebars templates loaded on demand from a template root directory.
pub struct HandlebarsBackend {
    registry: RefCell<Handlebars<'static>>,
    sources: BTreeMap<String, PathBuf>,
    partials_loaded: Cell<bool>,
    root: PathBuf,
}

impl HandlebarsBackend {
    /// Index every file under `root`.
    ///
    /// A missing root is not an error here: the index is simply empty and
    /// every lookup reports [`TemplateError::NotFound`].
    pub fn new(root: &Path) -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);

        let mut sources = BTreeMap::new();
        let mut stems = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };
            sources.insert(template_name(rel), entry.path().to_path_buf());
            stems.push((template_name(&rel.with_extension("")), entry.path().to_path_buf()));
        }
        for (stem, path) in stems {
            sources.entry(stem).or_insert(path);
        }
        log::debug!("indexed {} template names under {}", sources.len(), root.display());

        Self {
            registry: RefCell::new(registry),
            sources,
            partials_loaded: Cell::new(false),
            root: root.to_path_buf(),
        }
    }

    /// Register `name` from its source file if it is not registered yet.
    fn ensure_registered(&self, name: &str) -> Result<(), TemplateError> {
        if self.registry.borrow().has_template(name) {
            return Ok(());
        }
        let Some(path) = self.sources.get(name) else {
            return Err(TemplateError::NotFound {
                name: name.to_string(),
                root: self.root.clone(),
            });
        };
        self.registry
            .borrow_mut()
            .register_template_file(name, path)
            .map_err(|source| TemplateError::Load {
                name: name.to_string(),
                source: Box::new(source),
            })?;
        log::debug!("loaded template {name}");
        Ok(())
    }

    /// Register every partial candidate once, skipping files that don't load.
    fn load_partials(&self) {
        if self.partials_loaded.replace(true) {
            return;
        }
        let mut registry = self.registry.borrow_mut();
        for (name, path) in &self.sources {
            let is_candidate = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| PARTIAL_EXTENSIONS.contains(&ext));
            if !is_candidate || registry.has_template(name) {
                continue;
            }
            if let Err(e) = registry.register_template_file(name, path) {
                log::debug!("skipping partial {name}: {e}");
            }
        }
    }
}

impl TemplateBackend for HandlebarsBackend {
    fn lookup(&self, template: &str) -> Result<(), TemplateError> {
        self.ensure_registered(normalize(template))
    }

    fn render(&self, template: &str, vars: &Value) -> Result<String, TemplateError> {
        let name = normalize(template);
        self.ensure_registered(name)?;
        self.load_partials();
        self.registry
            .borrow()
            .render(name, vars)
            .map_err(|source| TemplateError::Render {
                name: name.to_string(),
                source: Box::new(source),
            })
    }
}

fn template_name(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

/// Strip a leading `./` so `./page.html` and `page.html` name the same template.
fn normalize(template: &str) -> &str {
    template.strip_prefix("./").unwrap_or(template)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Backend that records every render call and echoes the variables back.
    ///
    /// The rendered text is `"<template>|<vars as JSON>"`, so tests can assert
    /// on the exact variable set a page saw.
    #[derive(Default)]
    pub struct MockBackend {
        pub calls: RefCell<Vec<(String, Value)>>,
        pub missing: Vec<String>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_missing(missing: &[&str]) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                missing: missing.iter().map(|s| s.to_string()).collect(),
            }
        }

        pub fn calls(&self) -> Vec<(String, Value)> {
            self.calls.borrow().clone()
        }
    }

    impl TemplateBackend for MockBackend {
        fn lookup(&self, template: &str) -> Result<(), TemplateError> {
            if self.missing.iter().any(|m| m == template) {
                return Err(TemplateError::NotFound {
                    name: template.to_string(),
                    root: PathBuf::from("mock"),
                });
            }
            Ok(())
        }

        fn render(&self, template: &str, vars: &Value) -> Result<String, TemplateError> {
            self.lookup(template)?;
            self.calls
                .borrow_mut()
                .push((template.to_string(), vars.clone()));
            Ok(format!("{template}|{vars}"))
        }
    }

    fn templates(files: &[(&str, &str)]) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (name, body) in files {
            let path = tmp.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        tmp
    }

    #[test]
    fn renders_variables() {
        let tmp = templates(&[("page.html", "<h1>{{title}}</h1>")]);
        let backend = HandlebarsBackend::new(tmp.path());
        let out = backend.render("page.html", &json!({"title": "Hello"})).unwrap();
        assert_eq!(out, "<h1>Hello</h1>");
    }

    #[test]
    fn html_is_not_escaped() {
        let tmp = templates(&[("page.html", "<main>{{body}}</main>")]);
        let backend = HandlebarsBackend::new(tmp.path());
        let out = backend
            .render("page.html", &json!({"body": "<p><strong>hi</strong></p>"}))
            .unwrap();
        assert_eq!(out, "<main><p><strong>hi</strong></p></main>");
    }

    #[test]
    fn missing_variable_renders_empty() {
        let tmp = templates(&[("page.html", "[{{nothing}}]")]);
        let backend = HandlebarsBackend::new(tmp.path());
        assert_eq!(backend.render("page.html", &json!({})).unwrap(), "[]");
    }

    #[test]
    fn nested_templates_use_relative_paths() {
        let tmp = templates(&[
            ("partials/header.html", "<header>{{title}}</header>"),
            ("page.html", "{{> partials/header}}<p>body</p>"),
        ]);
        let backend = HandlebarsBackend::new(tmp.path());
        assert!(backend.lookup("partials/header.html").is_ok());
        assert!(backend.lookup("partials/header").is_ok());
        let out = backend.render("page.html", &json!({"title": "T"})).unwrap();
        assert_eq!(out, "<header>T</header><p>body</p>");
    }

    #[test]
    fn leading_dot_slash_is_ignored() {
        let tmp = templates(&[("page.html", "ok")]);
        let backend = HandlebarsBackend::new(tmp.path());
        assert_eq!(backend.render("./page.html", &json!({})).unwrap(), "ok");
    }

    #[test]
    fn missing_template_is_not_found() {
        let tmp = templates(&[("page.html", "ok")]);
        let backend = HandlebarsBackend::new(tmp.path());
        let err = backend.render("other.html", &json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::NotFound { .. }));
        assert!(err.to_string().contains("other.html"));
    }

    #[test]
    fn lookup_reports_missing_template() {
        let tmp = templates(&[("page.html", "ok")]);
        let backend = HandlebarsBackend::new(tmp.path());
        assert!(backend.lookup("page.html").is_ok());
        assert!(matches!(
            backend.lookup("nope.html"),
            Err(TemplateError::NotFound { .. })
        ));
    }

    #[test]
    fn missing_root_registers_nothing() {
        let tmp = TempDir::new().unwrap();
        let backend = HandlebarsBackend::new(&tmp.path().join("absent"));
        assert!(matches!(
            backend.render("page.html", &json!({})),
            Err(TemplateError::NotFound { .. })
        ));
    }

    #[test]
    fn invalid_syntax_fails_on_lookup() {
        let tmp = templates(&[("broken.html", "{{#each items}}never closed")]);
        let backend = HandlebarsBackend::new(tmp.path());
        let err = backend.lookup("broken.html").unwrap_err();
        assert!(matches!(err, TemplateError::Load { .. }));
        assert!(err.to_string().contains("broken.html"));
    }

    #[test]
    fn unreferenced_non_template_files_are_ignored() {
        let tmp = templates(&[
            ("index.html", "<h1>{{title}}</h1>"),
            ("vendor.js", "var t = '{{#if x}}';"),
            ("jinja.html", "{% for post in posts %}{{ post }}{% endfor %}{{#if}}"),
        ]);
        fs::write(tmp.path().join("logo.png"), [0x89, 0x50, 0xFF, 0xFE, 0x00]).unwrap();

        let backend = HandlebarsBackend::new(tmp.path());
        let out = backend.render("index.html", &json!({"title": "Home"})).unwrap();
        assert_eq!(out, "<h1>Home</h1>");
    }

    #[test]
    fn referenced_binary_file_fails_to_load() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("logo.png"), [0x89, 0x50, 0xFF, 0xFE, 0x00]).unwrap();
        let backend = HandlebarsBackend::new(tmp.path());
        assert!(matches!(
            backend.render("logo.png", &json!({})),
            Err(TemplateError::Load { .. })
        ));
    }

    #[test]
    fn partial_with_broken_sibling_still_renders() {
        let tmp = templates(&[
            ("partials/header.html", "<header>{{title}}</header>"),
            ("partials/broken.html", "{{#each items}}never closed"),
            ("page.html", "{{> partials/header}}<p>body</p>"),
        ]);
        let backend = HandlebarsBackend::new(tmp.path());
        let out = backend.render("page.html", &json!({"title": "T"})).unwrap();
        assert_eq!(out, "<header>T</header><p>body</p>");
    }

    #[test]
    fn templates_load_on_first_use() {
        let tmp = templates(&[("page.html", "v1")]);
        let backend = HandlebarsBackend::new(tmp.path());
        assert!(!backend.registry.borrow().has_template("page.html"));
        assert_eq!(backend.render("page.html", &json!({})).unwrap(), "v1");
        assert!(backend.registry.borrow().has_template("page.html"));
    }

    #[test]
    fn each_over_accumulated_list() {
        let tmp = templates(&[("list.html", "{{#each posts}}[{{this}}]{{/each}}")]);
        let backend = HandlebarsBackend::new(tmp.path());
        let out = backend
            .render("list.html", &json!({"posts": ["a", "b"]}))
            .unwrap();
        assert_eq!(out, "[a][b]");
    }
}
