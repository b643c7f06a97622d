//! Vesta Static File Engine
//!
//! High-performance static file serving with:
//! - Path resolution with traversal protection
//! - Conditional requests (If-None-Match, If-Modified-Since, If-Range, ...)
//! - Byte range requests
//! - MIME type detection
//! - Compression (gzip, brotli, zstd) and pre-compressed sidecars
//! - Directory browsing and index file handling

mod browse;
mod compress;
mod conditional;
mod etag;
mod file_server;
mod mime;
mod range;
mod resolver;

pub use compress::Encoding;
pub use conditional::Precondition;
pub use file_server::{FileRequest, FileServer, ServedFile};
pub use range::RangeOutcome;
pub use resolver::Resolved;
