//! Static file serving options
//!
//! The options value handed to the file server by a registration call.
//! Built directly, through a configuration closure, or from a config file.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration for a static file mount
#[derive(Debug, Clone)]
pub struct StaticFileOptions {
    /// Request path prefix this mount answers under ("" = site root).
    /// Non-empty values must start with '/' and not end with '/'.
    pub request_path: String,
    /// Root directory to serve
    pub root: PathBuf,
    /// Index files to look for when a directory is requested
    pub index_files: Vec<String>,
    /// Enable directory browsing when no index file matches
    pub browse: bool,
    /// Enable on-the-fly compression
    pub compress: bool,
    /// Check for pre-compressed sidecar files (.br, .zst, .gz)
    pub precompressed: bool,
    /// Serve files whose MIME type cannot be determined
    pub serve_unknown_types: bool,
    /// Content type for unknown files when `serve_unknown_types` is off
    pub default_content_type: Option<String>,
    /// Extension -> MIME overrides, taking priority over the builtin table
    pub content_types: HashMap<String, String>,
    /// Cache-Control header emitted verbatim on file responses
    pub cache_control: Option<String>,
}

impl Default for StaticFileOptions {
    fn default() -> Self {
        Self {
            request_path: String::new(),
            root: PathBuf::from("."),
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            browse: false,
            compress: true,
            precompressed: true,
            serve_unknown_types: false,
            default_content_type: None,
            content_types: HashMap::new(),
            cache_control: None,
        }
    }
}

impl StaticFileOptions {
    /// Options serving `root` at the site root
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Validate the options value, naming the first offending field.
    ///
    /// Called by every registration entry point before a middleware is
    /// constructed, so a bad value fails the registration call itself.
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(Error::InvalidArgument("root"));
        }
        if !self.request_path.is_empty() {
            if !self.request_path.starts_with('/') || self.request_path.ends_with('/') {
                return Err(Error::InvalidArgument("request_path"));
            }
        }
        if self.index_files.iter().any(|f| f.is_empty()) {
            return Err(Error::InvalidArgument("index_files"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(StaticFileOptions::default().validate().is_ok());
    }

    #[test]
    fn test_empty_root_rejected() {
        let opts = StaticFileOptions {
            root: PathBuf::new(),
            ..Default::default()
        };
        match opts.validate() {
            Err(Error::InvalidArgument(name)) => assert_eq!(name, "root"),
            other => panic!("expected InvalidArgument(root), got {:?}", other),
        }
    }

    #[test]
    fn test_request_path_shape() {
        let mut opts = StaticFileOptions::default();

        opts.request_path = "/static".to_string();
        assert!(opts.validate().is_ok());

        opts.request_path = "static".to_string();
        assert!(matches!(
            opts.validate(),
            Err(Error::InvalidArgument("request_path"))
        ));

        opts.request_path = "/static/".to_string();
        assert!(matches!(
            opts.validate(),
            Err(Error::InvalidArgument("request_path"))
        ));
    }

    #[test]
    fn test_empty_index_entry_rejected() {
        let opts = StaticFileOptions {
            index_files: vec!["index.html".to_string(), String::new()],
            ..Default::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(Error::InvalidArgument("index_files"))
        ));
    }
}
