//! Static-file resolution.
//!
//! Dispatch tries this before route matching: every registered directory is
//! probed in registration order and the first readable file wins. A missing
//! file just moves the search along; any other read failure is logged and
//! the search also moves along — one bad static root must not take down the
//! whole request.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use crate::error::Error;
use crate::response::Response;
use crate::router::Router;

/// What the root path (`/`) maps to inside each candidate directory.
const INDEX_FILE: &str = "index.html";

/// Probes every static directory for `path`. `Some` means a 200 response
/// with the classified content type and the file bytes; `None` means no
/// directory had the file and dispatch should fall through to routing.
pub(crate) async fn try_serve(router: &Router, path: &str) -> Option<Response> {
    for dir in router.static_dir_names() {
        let candidate = candidate_path(dir, path);
        match tokio::fs::read(&candidate).await {
            Ok(content) => {
                let content_type = content_type_for(&candidate);
                debug!(file = %candidate.display(), content_type, "serving static file");
                return Some(Response::content(content_type, Bytes::from(content)));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => debug!(file = %candidate.display(), "static read failed: {e}"),
        }
    }
    None
}

/// Reads one file and builds a 200 response with its classified content
/// type. Unlike the directory search, a failure here is the caller's to
/// handle — typically by propagating it from a handler with `?`.
pub async fn send_file(path: impl AsRef<Path>) -> Result<Response, Error> {
    let path = path.as_ref();
    let content = tokio::fs::read(path).await?;
    Ok(Response::content(content_type_for(path), Bytes::from(content)))
}

fn candidate_path(dir: &str, path: &str) -> PathBuf {
    let relative = if path == "/" { INDEX_FILE } else { path };
    // Keep lookups inside the directory: no parent hops, and never join an
    // absolute path (that would replace `dir` outright).
    let clean = relative.replace("..", "");
    Path::new(dir).join(clean.trim_start_matches('/'))
}

/// The fixed extension→media-type table. Anything not listed is served as a
/// generic binary blob.
fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("html") => "text/html",
        Some("js")   => "text/javascript",
        Some("css")  => "text/css",
        Some("json") => "application/json",
        Some("png")  => "image/png",
        Some("jpg")  => "image/jpeg",
        Some("gif")  => "image/gif",
        Some("wav")  => "audio/wav",
        Some("mp4")  => "video/mp4",
        Some("woff") => "font/woff",
        Some("ttf")  => "font/ttf",
        Some("eot")  => "application/vnd.ms-fontobject",
        Some("otf")  => "font/otf",
        Some("svg")  => "image/svg+xml",
        _            => "application/octet-stream",
    }
}
