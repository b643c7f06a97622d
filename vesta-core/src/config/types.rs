//! Configuration type definitions
//!
//! These types represent the on-disk configuration for Vesta. Each site
//! entry maps onto a `StaticFileOptions` value at startup.

use crate::options::StaticFileOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration for Vesta
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VestaConfig {
    /// Listen addresses
    #[serde(default)]
    pub listen: Vec<String>,

    /// Static site mounts, matched in order
    #[serde(default)]
    pub sites: Vec<SiteConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A single static mount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Request path prefix ("" = site root)
    #[serde(default)]
    pub request_path: String,

    /// Root directory to serve
    pub root: PathBuf,

    /// Index files
    #[serde(default = "default_index")]
    pub index: Vec<String>,

    /// Enable directory browsing
    #[serde(default)]
    pub browse: bool,

    /// Enable on-the-fly compression
    #[serde(default = "default_bool_true")]
    pub compress: bool,

    /// Check for pre-compressed sidecar files
    #[serde(default = "default_bool_true")]
    pub precompressed: bool,

    /// Serve files with unrecognized extensions
    #[serde(default)]
    pub serve_unknown_types: bool,

    /// Content type for unrecognized extensions
    #[serde(default)]
    pub default_content_type: Option<String>,

    /// Extension -> MIME overrides
    #[serde(default)]
    pub content_types: HashMap<String, String>,

    /// Cache-Control header for file responses
    #[serde(default)]
    pub cache_control: Option<String>,
}

fn default_index() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

fn default_bool_true() -> bool {
    true
}

impl From<SiteConfig> for StaticFileOptions {
    fn from(site: SiteConfig) -> Self {
        StaticFileOptions {
            request_path: site.request_path,
            root: site.root,
            index_files: site.index,
            browse: site.browse,
            compress: site.compress,
            precompressed: site.precompressed,
            serve_unknown_types: site.serve_unknown_types,
            default_content_type: site.default_content_type,
            content_types: site.content_types,
            cache_control: site.cache_control,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (overridden by RUST_LOG)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
