//! File server orchestration
//!
//! Ties resolution, preconditions, ranges, and encoding together into a
//! single serve pass over one request.

use crate::conditional::{self, Precondition};
use crate::range::RangeOutcome;
use crate::resolver::{self, Resolved};
use crate::{browse, compress, etag, mime};
use bytes::Bytes;
use http::header::{ACCEPT_ENCODING, RANGE};
use http::{HeaderMap, Method, StatusCode};
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use vesta_core::{Result, StaticFileOptions};

/// The slice of an HTTP request the engine needs
pub struct FileRequest<'a> {
    /// Request method; only GET and HEAD are matched
    pub method: &'a Method,
    /// Mount-relative URL path, starting with '/'
    pub path: &'a str,
    /// Request headers
    pub headers: &'a HeaderMap,
}

/// A fully prepared response from the engine
#[derive(Debug)]
pub struct ServedFile {
    pub status: StatusCode,
    pub body: Bytes,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub content_range: Option<String>,
    pub content_encoding: Option<&'static str>,
    pub cache_control: Option<String>,
    pub location: Option<String>,
    /// Emit `Vary: Accept-Encoding`
    pub vary_accept_encoding: bool,
}

impl ServedFile {
    fn empty(status: StatusCode) -> Self {
        Self {
            status,
            body: Bytes::new(),
            content_type: None,
            etag: None,
            last_modified: None,
            content_range: None,
            content_encoding: None,
            cache_control: None,
            location: None,
            vary_accept_encoding: false,
        }
    }
}

/// Static file server
pub struct FileServer {
    options: StaticFileOptions,
}

impl FileServer {
    /// Create a new file server from validated options
    pub fn new(options: StaticFileOptions) -> Self {
        Self { options }
    }

    /// Create a file server for a directory with default options
    pub fn serve_dir(root: impl Into<std::path::PathBuf>) -> Self {
        Self::new(StaticFileOptions::for_root(root))
    }

    /// The options this server was built with
    pub fn options(&self) -> &StaticFileOptions {
        &self.options
    }

    /// Serve one request. `Ok(None)` means the request was not handled
    /// and the caller should fall through to the next handler.
    pub async fn serve(&self, req: &FileRequest<'_>) -> Result<Option<ServedFile>> {
        if req.method != Method::GET && req.method != Method::HEAD {
            return Ok(None);
        }

        tracing::debug!("📁 Static request: {} {}", req.method, req.path);

        match resolver::resolve(&self.options.root, req.path, &self.options.index_files).await {
            Resolved::NotFound => Ok(None),
            Resolved::RedirectToSlash => {
                let mut file = ServedFile::empty(StatusCode::MOVED_PERMANENTLY);
                file.location = Some(format!("{}{}/", self.options.request_path, req.path));
                Ok(Some(file))
            }
            Resolved::Directory(dir) => self.serve_listing(&dir, req).await,
            Resolved::File(path) => self.serve_file(&path, req).await,
        }
    }

    async fn serve_listing(&self, dir: &Path, req: &FileRequest<'_>) -> Result<Option<ServedFile>> {
        if !self.options.browse {
            return Ok(None);
        }

        let listing = browse::render_listing(dir, req.path).await?;
        let mut file = ServedFile::empty(StatusCode::OK);
        file.content_type = Some("text/html; charset=utf-8".to_string());
        file.body = Bytes::from(listing);

        if self.options.compress {
            file.vary_accept_encoding = true;
            let accept = header_str(req.headers, &ACCEPT_ENCODING);
            if let Some(encoding) = compress::negotiate(accept) {
                file.body = Bytes::from(compress::encode(&file.body, encoding).await?);
                file.content_encoding = Some(encoding.token());
            }
        }

        Ok(Some(file))
    }

    async fn serve_file(&self, path: &Path, req: &FileRequest<'_>) -> Result<Option<ServedFile>> {
        let content_type = match mime::resolve(path, &self.options) {
            Some(ct) => ct,
            None => {
                tracing::debug!("Refusing unknown type: {}", path.display());
                return Ok(None);
            }
        };

        let metadata = match tokio::fs::metadata(path).await {
            Ok(m) => m,
            Err(_) => return Ok(None),
        };
        let file_len = metadata.len();
        let modified = metadata.modified().ok();
        let tag = etag::compute(&metadata);
        let last_modified = modified.map(httpdate::fmt_http_date);

        match conditional::evaluate(req.headers, &tag, modified) {
            Precondition::PreconditionFailed => {
                return Ok(Some(ServedFile::empty(StatusCode::PRECONDITION_FAILED)));
            }
            Precondition::NotModified => {
                let mut file = ServedFile::empty(StatusCode::NOT_MODIFIED);
                file.etag = Some(tag);
                file.last_modified = last_modified;
                file.cache_control = self.options.cache_control.clone();
                return Ok(Some(file));
            }
            Precondition::Proceed => {}
        }

        let range = match header_str(req.headers, &RANGE) {
            Some(header) if conditional::range_applies(req.headers, &tag, modified) => {
                crate::range::parse(header, file_len)
            }
            _ => RangeOutcome::Full,
        };

        let mut file = ServedFile::empty(StatusCode::OK);
        file.content_type = Some(content_type.clone());
        file.etag = Some(tag);
        file.last_modified = last_modified;
        file.cache_control = self.options.cache_control.clone();

        let (start, length) = match range {
            RangeOutcome::Unsatisfiable => {
                file.status = StatusCode::RANGE_NOT_SATISFIABLE;
                file.content_range = Some(format!("bytes */{}", file_len));
                return Ok(Some(file));
            }
            RangeOutcome::Partial { start, end } => {
                file.status = StatusCode::PARTIAL_CONTENT;
                file.content_range = Some(format!("bytes {}-{}/{}", start, end, file_len));
                (start, end - start + 1)
            }
            RangeOutcome::Full => (0, file_len),
        };

        let accept = header_str(req.headers, &ACCEPT_ENCODING);

        // Pre-compressed sidecars replace the full body, never a range window
        if self.options.precompressed && file.status == StatusCode::OK {
            if let Some((content, encoding)) = compress::try_precompressed(path, accept).await {
                file.body = Bytes::from(content);
                file.content_encoding = Some(encoding.token());
                file.vary_accept_encoding = true;
                return Ok(Some(file));
            }
        }

        let mut handle = tokio::fs::File::open(path).await?;
        if start > 0 {
            handle.seek(std::io::SeekFrom::Start(start)).await?;
        }
        let mut content = vec![0u8; length as usize];
        handle.read_exact(&mut content).await?;

        let compressible =
            self.options.compress && file.status == StatusCode::OK && compress::is_compressible(&content_type);
        if compressible {
            file.vary_accept_encoding = true;
            if let Some(encoding) = compress::negotiate(accept) {
                content = compress::encode(&content, encoding).await?;
                file.content_encoding = Some(encoding.token());
            }
        }

        file.body = Bytes::from(content);
        Ok(Some(file))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &http::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
