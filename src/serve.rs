//! Local preview server for the built site.
//!
//! A small blocking HTTP server on `tiny_http` that serves files from the
//! output root. It never builds anything: run `easybake build` first.
//!
//! Request resolution:
//!
//! 1. drop any query string, then percent-decode the path (undecodable → 404)
//! 2. exact file match → serve the file
//! 3. directory containing `index.html` → serve that
//! 4. anything else, including paths with `..` segments → 404
//!
//! Ctrl+C unblocks the request loop so [`Preview::run`] returns normally.

use crate::config::ServeConfig;
use crate::url::INDEX_FILE;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("can't listen on {addr}: {message}")]
    Bind { addr: String, message: String },
    #[error("failed to set Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to send response: {0}")]
    Respond(#[from] std::io::Error),
    #[error("invalid header value '{0}'")]
    Header(String),
}

/// A bound preview server, not yet accepting requests.
pub struct Preview {
    server: Arc<Server>,
    root: PathBuf,
    addr: String,
}

impl Preview {
    /// Bind to the configured interface and port.
    pub fn bind(root: &Path, config: &ServeConfig) -> Result<Self, ServeError> {
        let addr = format!("{}:{}", config.interface, config.port);
        let server = Server::http(addr.as_str()).map_err(|e| ServeError::Bind {
            addr: addr.clone(),
            message: e.to_string(),
        })?;
        log::info!("serving {} on {addr}", root.display());
        Ok(Self {
            server: Arc::new(server),
            root: root.to_path_buf(),
            addr,
        })
    }

    /// `interface:port` the server is bound to.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Serve requests until Ctrl+C.
    pub fn run(self) -> Result<(), ServeError> {
        let server_for_signal = Arc::clone(&self.server);
        ctrlc::set_handler(move || {
            server_for_signal.unblock();
        })?;

        for request in self.server.incoming_requests() {
            if let Err(e) = handle_request(request, &self.root) {
                log::warn!("request error: {e}");
            }
        }
        Ok(())
    }
}

/// Map a raw request URL to a file under `root`, if one should be served.
pub fn resolve_request(root: &Path, raw_url: &str) -> Option<PathBuf> {
    let raw_path = raw_url.split('?').next().unwrap_or_default();
    let path = urlencoding::decode(raw_path).ok()?;

    let mut local = root.to_path_buf();
    for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
        if segment == ".." || segment.contains('\\') {
            return None;
        }
        local.push(segment);
    }

    if local.is_file() {
        return Some(local);
    }
    let index = local.join(INDEX_FILE);
    index.is_file().then_some(index)
}

fn handle_request(request: Request, root: &Path) -> Result<(), ServeError> {
    match resolve_request(root, request.url()) {
        Some(path) => {
            log::debug!("{} {} → {}", request.method(), request.url(), path.display());
            serve_file(request, &path)
        }
        None => {
            log::info!("{} {} → 404", request.method(), request.url());
            serve_not_found(request)
        }
    }
}

fn serve_file(request: Request, path: &Path) -> Result<(), ServeError> {
    let content = fs::read(path).map_err(|source| ServeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let response =
        Response::from_data(content).with_header(content_type(guess_content_type(path))?);
    request.respond(response)?;
    Ok(())
}

fn serve_not_found(request: Request) -> Result<(), ServeError> {
    let body = "404 Not Found";
    let response = Response::new(
        StatusCode(404),
        vec![content_type("text/plain; charset=utf-8")?],
        Cursor::new(body),
        Some(body.len()),
        None,
    );
    request.respond(response)?;
    Ok(())
}

fn content_type(value: &str) -> Result<Header, ServeError> {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes())
        .map_err(|()| ServeError::Header(value.to_string()))
}

/// Guess a MIME type from the file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
pub fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",

        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",

        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("blog/my post")).unwrap();
        fs::create_dir_all(tmp.path().join("empty")).unwrap();
        fs::write(tmp.path().join("index.html"), "home").unwrap();
        fs::write(tmp.path().join("page.html"), "page").unwrap();
        fs::write(tmp.path().join("blog/index.html"), "blog").unwrap();
        fs::write(tmp.path().join("blog/my post/index.html"), "post").unwrap();
        tmp
    }

    #[test]
    fn root_serves_index() {
        let tmp = site();
        assert_eq!(
            resolve_request(tmp.path(), "/"),
            Some(tmp.path().join("index.html"))
        );
    }

    #[test]
    fn exact_file_match() {
        let tmp = site();
        assert_eq!(
            resolve_request(tmp.path(), "/page.html"),
            Some(tmp.path().join("page.html"))
        );
    }

    #[test]
    fn directory_serves_its_index() {
        let tmp = site();
        let expected = Some(tmp.path().join("blog").join("index.html"));
        assert_eq!(resolve_request(tmp.path(), "/blog/"), expected);
        assert_eq!(resolve_request(tmp.path(), "/blog"), expected);
    }

    #[test]
    fn percent_encoded_paths_are_decoded() {
        let tmp = site();
        assert_eq!(
            resolve_request(tmp.path(), "/blog/my%20post/"),
            Some(tmp.path().join("blog").join("my post").join("index.html"))
        );
    }

    #[test]
    fn query_string_is_ignored() {
        let tmp = site();
        assert_eq!(
            resolve_request(tmp.path(), "/page.html?v=123"),
            Some(tmp.path().join("page.html"))
        );
    }

    #[test]
    fn encoded_question_mark_is_part_of_the_name() {
        let tmp = site();
        fs::write(tmp.path().join("what?.html"), "q").unwrap();
        assert_eq!(
            resolve_request(tmp.path(), "/what%3F.html?v=1"),
            Some(tmp.path().join("what?.html"))
        );
    }

    #[test]
    fn undecodable_path_is_not_found() {
        let tmp = site();
        assert_eq!(resolve_request(tmp.path(), "/%FF%FE"), None);
    }

    #[test]
    fn directory_without_index_is_not_found() {
        let tmp = site();
        assert_eq!(resolve_request(tmp.path(), "/empty/"), None);
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = site();
        assert_eq!(resolve_request(tmp.path(), "/nope.html"), None);
    }

    #[test]
    fn parent_segments_are_refused() {
        let tmp = site();
        assert_eq!(resolve_request(&tmp.path().join("blog"), "/../page.html"), None);
        assert_eq!(resolve_request(tmp.path(), "/blog/%2E%2E/page.html"), None);
    }

    #[test]
    fn content_types() {
        assert_eq!(
            guess_content_type(Path::new("index.html")),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            guess_content_type(Path::new("site.css")),
            "text/css; charset=utf-8"
        );
        assert_eq!(guess_content_type(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(
            guess_content_type(Path::new("blob")),
            "application/octet-stream"
        );
    }

    #[test]
    fn content_type_header_builds() {
        assert!(content_type("text/html; charset=utf-8").is_ok());
    }
}
