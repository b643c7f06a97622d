//! Vesta HTTP Server
//!
//! HTTP/1 serving layer that drives a middleware pipeline, plus request
//! metrics.

pub mod metrics;
pub mod server;

pub use server::run_server;
