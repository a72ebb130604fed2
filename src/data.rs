//! Data resolution for decoded manifests and datafiles.
//!
//! Decoded data is a generic [`Value`] tree. Before it is handed to a
//! template, the tree is walked once and every *typed text fragment* is
//! replaced by its rendered text:
//!
//! ```yaml
//! intro:
//!   _language: markdown
//!   content: "Some **bold** words"
//! ```
//!
//! resolves to
//!
//! ```yaml
//! intro: "<p>Some <strong>bold</strong> words</p>\n"
//! ```
//!
//! ## Fragment Detection
//!
//! A mapping is a fragment only when its key set is exactly
//! `{_language, content}` and both values are strings. Detection is a tagged
//! decode step ([`Fragment::detect`]); anything that is not a fragment falls
//! through to ordinary mapping handling.
//!
//! ## Unsupported Kinds
//!
//! Only `markdown` is recognized. A fragment of any other kind is left exactly
//! as it was (the mapping is kept and not walked further) and a warning is
//! logged. Templates can still reach the raw `_language`/`content` pair.
//!
//! ## Markdown Rules
//!
//! Markdown is rendered with `pulldown-cmark`: CommonMark plus tables and
//! strikethrough. Paragraphs are wrapped in `<p>…</p>` followed by a newline,
//! so `**hi**` renders to `<p><strong>hi</strong></p>\n`.

use pulldown_cmark::{Options, Parser, html as md_html};
use serde_json::{Map, Value};

/// Key carrying the fragment kind.
pub const KIND_KEY: &str = "_language";
/// Key carrying the fragment source text.
pub const CONTENT_KEY: &str = "content";

/// A typed text fragment found in decoded data.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment<'a> {
    /// Markdown source, rendered to HTML.
    Markdown(&'a str),
    /// A fragment of a kind this build does not know how to render.
    Unsupported { kind: &'a str },
}

impl<'a> Fragment<'a> {
    /// Try to read a mapping as a typed text fragment.
    ///
    /// Returns `None` when the key set is not exactly `{_language, content}`
    /// or when either value is not a string.
    pub fn detect(map: &'a Map<String, Value>) -> Option<Self> {
        if map.len() != 2 {
            return None;
        }
        let kind = map.get(KIND_KEY)?.as_str()?;
        let content = map.get(CONTENT_KEY)?.as_str()?;
        match kind {
            "markdown" => Some(Fragment::Markdown(content)),
            other => Some(Fragment::Unsupported { kind: other }),
        }
    }
}

/// Resolve every typed text fragment in `node`, returning a new tree.
///
/// Sequences keep their order and length, mappings keep their key set, and
/// scalars are returned unchanged. The input is never modified.
pub fn resolve(node: &Value) -> Value {
    match node {
        Value::Array(items) => Value::Array(items.iter().map(resolve).collect()),
        Value::Object(map) => match Fragment::detect(map) {
            Some(Fragment::Markdown(source)) => Value::String(render_markdown(source)),
            Some(Fragment::Unsupported { kind }) => {
                log::warn!("leaving '{kind}' text fragment unresolved: only markdown is supported");
                node.clone()
            }
            None => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), resolve(value)))
                    .collect(),
            ),
        },
        scalar => scalar.clone(),
    }
}

/// Render markdown source to an HTML string.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(source, options);
    let mut html = String::with_capacity(source.len() + source.len() / 2);
    md_html::push_html(&mut html, parser);
    html
}
