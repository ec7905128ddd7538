// crates/tool-bench-server/src/frontend.rs
// ============================================================================
// Module: Static Frontend
// Description: Serves files from the configured frontend directory.
// Purpose: Host the browser UI alongside the JSON API.
// Dependencies: axum, tokio, urlencoding
// ============================================================================

//! ## Overview
//! Request paths are percent-decoded one segment at a time and mapped onto
//! the frontend directory. A decoded segment must be a single plain file
//! name, so a request can never name a file outside the directory. `/`
//! serves `index.html`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use axum::Json;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// File served for the directory root.
const INDEX_FILE: &str = "index.html";

// ============================================================================
// SECTION: Serving
// ============================================================================

/// Serves one asset from `root`, or a JSON 404.
pub async fn serve_asset(root: &Path, request_path: &str) -> Response {
    let Some(path) = resolve_asset_path(root, request_path) else {
        return not_found();
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(CONTENT_TYPE, content_type(&path))], bytes).into_response(),
        Err(_) => not_found(),
    }
}

/// JSON 404 response.
#[must_use]
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

/// Maps a request path to a file under `root`.
///
/// Returns `None` for traversal attempts, undecodable segments, and
/// segments that are not plain file names once decoded.
#[must_use]
pub fn resolve_asset_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    if relative.is_empty() {
        return Some(root.join(INDEX_FILE));
    }
    let mut resolved = root.to_path_buf();
    for segment in relative.split('/') {
        let decoded = urlencoding::decode(segment).ok()?;
        match decoded.as_ref() {
            "" | "." => {}
            ".." => return None,
            name if name.contains(['/', '\\', '\0']) => return None,
            name => {
                let mut components = Path::new(name).components();
                let (Some(Component::Normal(part)), None) =
                    (components.next(), components.next())
                else {
                    return None;
                };
                resolved.push(part);
            }
        }
    }
    Some(resolved)
}

/// Content type by file extension.
fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::content_type;
    use super::resolve_asset_path;

    #[test]
    fn root_maps_to_index() {
        let root = Path::new("/srv/frontend");
        assert_eq!(resolve_asset_path(root, "/"), Some(root.join("index.html")));
        assert_eq!(resolve_asset_path(root, "/js/app.js"), Some(root.join("js").join("app.js")));
    }

    #[test]
    fn traversal_is_rejected() {
        let root = Path::new("/srv/frontend");
        assert_eq!(resolve_asset_path(root, "/../etc/passwd"), None);
        assert_eq!(resolve_asset_path(root, "/js/../../secret"), None);
        assert_eq!(resolve_asset_path(root, "/..\\secret"), None);
    }

    #[test]
    fn encoded_segments_are_decoded() {
        let root = Path::new("/srv/frontend");
        assert_eq!(
            resolve_asset_path(root, "/img/my%20logo.png"),
            Some(root.join("img").join("my logo.png"))
        );
    }

    #[test]
    fn encoded_traversal_is_rejected() {
        let root = Path::new("/srv/frontend");
        assert_eq!(resolve_asset_path(root, "/%2e%2e/etc/passwd"), None);
        assert_eq!(resolve_asset_path(root, "/js/..%2F..%2Fsecret"), None);
        assert_eq!(resolve_asset_path(root, "/js/..%5Csecret"), None);
        assert_eq!(resolve_asset_path(root, "/bad%FF"), None);
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type(Path::new("a.css")), "text/css; charset=utf-8");
        assert_eq!(content_type(Path::new("blob")), "application/octet-stream");
    }
}
