//! Request path resolution
//!
//! Maps a decoded URL path onto the filesystem under a root directory.
//! Traversal protection is lexical: `..` segments are rejected outright and
//! the joined path is re-checked against the root, so no request can escape
//! the configured directory.

use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// Outcome of resolving a request path against the root
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A regular file to serve
    File(PathBuf),
    /// An existing directory with no matching index file
    Directory(PathBuf),
    /// A directory requested without a trailing slash
    RedirectToSlash,
    /// Nothing servable at this path
    NotFound,
}

/// Resolve a mount-relative request path (leading `/`) under `root`.
///
/// For directory requests with a trailing slash, the first existing entry
/// of `index_files` wins; otherwise the directory itself is returned and
/// the caller decides between a listing and fall-through.
pub async fn resolve(root: &Path, request_path: &str, index_files: &[String]) -> Resolved {
    let decoded = match percent_decode_str(request_path).decode_utf8() {
        Ok(d) => d,
        Err(_) => return Resolved::NotFound,
    };

    let segments = match sanitize(&decoded) {
        Some(s) => s,
        None => return Resolved::NotFound,
    };

    let mut path = root.to_path_buf();
    for segment in &segments {
        path.push(segment);
    }

    // Defense in depth after segment filtering
    if !path.starts_with(root) {
        return Resolved::NotFound;
    }

    let metadata = match tokio::fs::metadata(&path).await {
        Ok(m) => m,
        Err(_) => return Resolved::NotFound,
    };

    if metadata.is_file() {
        return Resolved::File(path);
    }

    if !metadata.is_dir() {
        // Sockets, fifos and friends are never served
        return Resolved::NotFound;
    }

    // An empty path here means the mount root was requested without a
    // trailing slash ("/static" on a "/static" mount): redirect like any
    // other slashless directory request.
    let trailing_slash = decoded.ends_with('/');
    if !trailing_slash {
        return Resolved::RedirectToSlash;
    }

    for index in index_files {
        let candidate = path.join(index);
        if tokio::fs::metadata(&candidate)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
        {
            return Resolved::File(candidate);
        }
    }

    Resolved::Directory(path)
}

/// Split a decoded path into safe segments.
///
/// Returns `None` when any segment is `..`, contains a NUL byte, or
/// contains a backslash. `.` and empty segments are dropped.
fn sanitize(path: &str) -> Option<Vec<String>> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." || segment.contains('\0') || segment.contains('\\') {
            return None;
        }
        segments.push(segment.to_string());
    }
    Some(segments)
}
