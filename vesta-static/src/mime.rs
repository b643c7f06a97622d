//! MIME type handling

use std::path::Path;
use vesta_core::StaticFileOptions;

/// Resolve the content type for a file path.
///
/// Per-extension overrides from the options take priority over the builtin
/// table. `None` means the type is unknown and the caller must decide
/// whether the file is served at all.
pub fn resolve(path: &Path, options: &StaticFileOptions) -> Option<String> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    if let Some(ext) = &ext {
        if let Some(overridden) = options.content_types.get(ext) {
            return Some(overridden.clone());
        }
    }

    if let Some(guessed) = mime_guess::from_path(path).first_raw() {
        return Some(with_charset(guessed));
    }

    if let Some(fallback) = &options.default_content_type {
        return Some(fallback.clone());
    }

    if options.serve_unknown_types {
        return Some("application/octet-stream".to_string());
    }

    None
}

/// Guessed text types are served as UTF-8; advertise it so browsers
/// don't sniff. Overrides and configured defaults pass through verbatim.
fn with_charset(mime: &str) -> String {
    if mime.starts_with("text/") {
        format!("{}; charset=utf-8", mime)
    } else {
        mime.to_string()
    }
}
