//! Vesta Core Library
//!
//! This crate provides the shared foundation for the Vesta static file
//! server: error types, the static-file options value, and configuration
//! loading.

pub mod config;
pub mod error;
pub mod options;

pub use error::{Error, Result};
pub use options::StaticFileOptions;

/// Vesta version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
