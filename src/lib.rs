//! # easybake
//!
//! A small static site generator driven by a single site manifest. The
//! manifest lists page declarations in order; each one names a template and
//! where its variables come from, and optionally a shared context name and an
//! output URL.
//!
//! # Architecture: One Ordered Pass
//!
//! ```text
//! site.json / site.yaml
//!   → decode + resolve fragments          (decode, data, manifest)
//!   → for each page declaration, in order:
//!        variables = context ⊕ datafile ⊕ data      (render, context)
//!        text      = template(variables)            (template)
//!        context[name] += text                      (context)
//!        write text to url                          (url)
//!   → build/
//! ```
//!
//! The shared context is what makes order matter. A page declared with
//! `name: "posts"` adds its rendered HTML under `posts`; every page declared
//! after it sees that HTML as a template variable. The first contribution to a
//! name is a plain string, the second turns it into a list, and later ones
//! append. Pages declared before a name is contributed never see it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`data`] | Recursive resolution of `{_language, content}` fragments into HTML |
//! | [`decode`] | JSON/YAML decoding by file extension, datafile loading |
//! | [`manifest`] | Site manifest loading and page declarations |
//! | [`context`] | Cross-page accumulator (scalar, then list) |
//! | [`template`] | `TemplateBackend` trait and the Handlebars implementation |
//! | [`render`] | Variable layering and asset copying for a single page |
//! | [`url`] | URL → output file mapping with directory-index semantics |
//! | [`site`] | Whole-site build orchestration and `clean` |
//! | [`serve`] | Preview HTTP server for the output directory |
//! | [`config`] | `easybake.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting of build reports |
//!
//! # Design Decisions
//!
//! ## Manifest Order Is Build Order
//!
//! There is no dependency graph. A page that lists posts must be declared
//! after the posts. This keeps a build a single predictable pass and makes
//! the manifest readable top to bottom as "what happens".
//!
//! ## Unescaped Templates
//!
//! Variables routinely hold HTML: rendered markdown fragments and the output
//! of earlier pages. Templates therefore render without HTML escaping, and a
//! template author who interpolates untrusted text must escape it.
//!
//! ## Clean Builds Only
//!
//! The output root is deleted at the start of every build. There is no
//! incremental mode and no cache; a failed build leaves only the pages written
//! before the failure.

pub mod config;
pub mod context;
pub mod data;
pub mod decode;
pub mod manifest;
pub mod output;
pub mod render;
pub mod serve;
pub mod site;
pub mod template;
pub mod url;

#[cfg(test)]
pub(crate) mod test_helpers;
