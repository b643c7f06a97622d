//! Entity tag computation and comparison

use std::fs::Metadata;
use std::time::UNIX_EPOCH;

/// Compute a strong ETag from file metadata (size and mtime, both hex).
pub fn compute(metadata: &Metadata) -> String {
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("\"{:x}-{:x}\"", metadata.len(), mtime)
}

/// Strong comparison against a comma-separated validator list (If-Match,
/// If-Range). Weak validators never strong-match.
pub fn strong_match(header: &str, etag: &str) -> bool {
    list(header).any(|candidate| candidate == "*" || candidate == etag)
}

/// Weak comparison against a comma-separated validator list (If-None-Match).
/// `W/` prefixes are ignored on both sides.
pub fn weak_match(header: &str, etag: &str) -> bool {
    let own = strip_weak(etag);
    list(header).any(|candidate| candidate == "*" || strip_weak(candidate) == own)
}

fn list(header: &str) -> impl Iterator<Item = &str> {
    header.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}
