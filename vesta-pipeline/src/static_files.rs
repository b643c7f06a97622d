//! Static file middleware and registration
//!
//! The four registration entry points mirror the classic
//! use-static-files surface: bare defaults, a request path, a
//! configuration closure, or a pre-built options value. Every entry point
//! validates before registering and returns the same builder handle for
//! chaining.

use crate::builder::PipelineBuilder;
use crate::middleware::{Middleware, Request, Response};
use async_trait::async_trait;
use http::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE,
    ETAG, LAST_MODIFIED, LOCATION, VARY,
};
use http::{HeaderValue, StatusCode};
use std::sync::Arc;
use vesta_core::{Result, StaticFileOptions};
use vesta_static::{FileRequest, FileServer, ServedFile};

/// Middleware serving files from a directory under a request path prefix
pub struct StaticFileMiddleware {
    server: FileServer,
}

impl StaticFileMiddleware {
    /// Build the middleware, validating the options first
    pub fn new(options: StaticFileOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            server: FileServer::new(options),
        })
    }

    /// The options this middleware was registered with
    pub fn options(&self) -> &StaticFileOptions {
        self.server.options()
    }

    /// Match the mount prefix at a segment boundary and strip it.
    /// "/static" matches "/static" and "/static/x", never "/staticx".
    fn strip_prefix<'a>(&self, path: &'a str) -> Option<&'a str> {
        let prefix = &self.options().request_path;
        if prefix.is_empty() {
            return Some(path);
        }
        let rest = path.strip_prefix(prefix.as_str())?;
        if rest.is_empty() || rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

#[async_trait]
impl Middleware for StaticFileMiddleware {
    fn name(&self) -> &str {
        "static_files"
    }

    async fn handle(&self, req: &Request) -> Result<Option<Response>> {
        let rel_path = match self.strip_prefix(req.uri().path()) {
            Some(p) => p,
            None => return Ok(None),
        };

        let file_req = FileRequest {
            method: req.method(),
            path: rel_path,
            headers: req.headers(),
        };

        match self.server.serve(&file_req).await? {
            Some(file) => Ok(Some(into_response(file))),
            None => Ok(None),
        }
    }
}

fn into_response(file: ServedFile) -> Response {
    let mut builder = http::Response::builder().status(file.status);

    if let Some(headers) = builder.headers_mut() {
        if let Some(ct) = &file.content_type {
            insert(headers, CONTENT_TYPE, ct);
        }
        if let Some(tag) = &file.etag {
            insert(headers, ETAG, tag);
            headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
        }
        if let Some(lm) = &file.last_modified {
            insert(headers, LAST_MODIFIED, lm);
        }
        if let Some(range) = &file.content_range {
            insert(headers, CONTENT_RANGE, range);
        }
        if let Some(encoding) = file.content_encoding {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding));
        }
        if let Some(cc) = &file.cache_control {
            insert(headers, CACHE_CONTROL, cc);
        }
        if let Some(location) = &file.location {
            insert(headers, LOCATION, location);
        }
        if file.vary_accept_encoding {
            headers.insert(VARY, HeaderValue::from_static("accept-encoding"));
        }
        if file.status != StatusCode::NOT_MODIFIED {
            headers.insert(CONTENT_LENGTH, HeaderValue::from(file.body.len() as u64));
        }
    }

    builder
        .body(file.body)
        .unwrap_or_else(|_| Response::new(bytes::Bytes::new()))
}

fn insert(headers: &mut http::HeaderMap, name: http::header::HeaderName, value: &str) {
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}

impl PipelineBuilder {
    /// Enable static file serving for the current request path with defaults
    pub fn use_static_files(&mut self) -> Result<&mut Self> {
        self.use_static_files_opts(StaticFileOptions::default())
    }

    /// Enable static file serving for the given request path
    pub fn use_static_files_at(&mut self, request_path: &str) -> Result<&mut Self> {
        self.use_static_files_opts(StaticFileOptions {
            request_path: request_path.to_string(),
            ..Default::default()
        })
    }

    /// Enable static file serving, configuring the options through a closure
    pub fn use_static_files_with<F>(&mut self, configure: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut StaticFileOptions),
    {
        let mut options = StaticFileOptions::default();
        configure(&mut options);
        self.use_static_files_opts(options)
    }

    /// Enable static file serving with a pre-built options value
    pub fn use_static_files_opts(&mut self, options: StaticFileOptions) -> Result<&mut Self> {
        let middleware = StaticFileMiddleware::new(options)?;
        Ok(self.add(Arc::new(middleware)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::Method;
    use vesta_core::Error;

    fn request(method: Method, path: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    fn docroot() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.css"), "body {}").unwrap();
        dir
    }

    #[test]
    fn test_chaining_returns_same_handle() {
        let mut builder = PipelineBuilder::new();
        let addr = &builder as *const PipelineBuilder as usize;

        let handle = builder
            .use_static_files()
            .unwrap()
            .use_static_files_at("/assets")
            .unwrap();
        assert_eq!(handle as *const PipelineBuilder as usize, addr);
        assert_eq!(handle.len(), 2);
    }

    #[test]
    fn test_invalid_request_path_names_parameter() {
        let mut builder = PipelineBuilder::new();
        match builder.use_static_files_at("assets") {
            Err(Error::InvalidArgument(name)) => assert_eq!(name, "request_path"),
            other => panic!("expected InvalidArgument(request_path), got {:?}", other.map(|_| ())),
        }
        // Nothing was registered
        assert!(builder.is_empty());
    }

    #[test]
    fn test_invalid_options_name_parameter() {
        let mut builder = PipelineBuilder::new();
        let options = StaticFileOptions {
            root: std::path::PathBuf::new(),
            ..Default::default()
        };
        match builder.use_static_files_opts(options) {
            Err(Error::InvalidArgument(name)) => assert_eq!(name, "root"),
            other => panic!("expected InvalidArgument(root), got {:?}", other.map(|_| ())),
        }
        assert!(builder.is_empty());
    }

    #[test]
    fn test_closure_configures_options() {
        let middleware = {
            let mut mw = None;
            let mut builder = PipelineBuilder::new();
            builder
                .use_static_files_with(|opts| {
                    opts.request_path = "/files".to_string();
                    opts.browse = true;
                    mw = Some(());
                })
                .unwrap();
            assert!(mw.is_some());
            builder
        };
        assert_eq!(middleware.len(), 1);
    }

    #[test]
    fn test_request_path_lands_in_options() {
        let middleware = StaticFileMiddleware::new(StaticFileOptions {
            request_path: "/assets".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(middleware.options().request_path, "/assets");
    }

    #[test]
    fn test_prefix_matching_segment_boundary() {
        let middleware = StaticFileMiddleware::new(StaticFileOptions {
            request_path: "/static".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(middleware.strip_prefix("/static/app.js"), Some("/app.js"));
        assert_eq!(middleware.strip_prefix("/static"), Some(""));
        assert_eq!(middleware.strip_prefix("/staticx"), None);
        assert_eq!(middleware.strip_prefix("/other"), None);
    }

    #[tokio::test]
    async fn test_mounted_middleware_serves_and_declines() {
        let dir = docroot();
        let mut builder = PipelineBuilder::new();
        builder
            .use_static_files_with(|opts| {
                opts.request_path = "/assets".to_string();
                opts.root = dir.path().to_path_buf();
            })
            .unwrap();
        let pipeline = builder.build();

        let resp = pipeline.dispatch(&request(Method::GET, "/assets/app.css")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(CONTENT_TYPE).unwrap(),
            "text/css; charset=utf-8"
        );
        assert_eq!(&resp.body()[..], b"body {}");

        // Outside the mount falls through to the pipeline 404
        let resp = pipeline.dispatch(&request(Method::GET, "/app.css")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_head_request_has_length_no_body() {
        let dir = docroot();
        let mut builder = PipelineBuilder::new();
        builder
            .use_static_files_with(|opts| {
                opts.root = dir.path().to_path_buf();
                opts.compress = false;
            })
            .unwrap();
        let pipeline = builder.build();

        let resp = pipeline.dispatch(&request(Method::HEAD, "/app.css")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.body().is_empty());
        assert_eq!(resp.headers().get(CONTENT_LENGTH).unwrap(), "7");
    }

    #[tokio::test]
    async fn test_mount_root_redirect() {
        let dir = docroot();
        let mut builder = PipelineBuilder::new();
        builder
            .use_static_files_with(|opts| {
                opts.request_path = "/assets".to_string();
                opts.root = dir.path().to_path_buf();
            })
            .unwrap();
        let pipeline = builder.build();

        let resp = pipeline.dispatch(&request(Method::GET, "/assets")).await;
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers().get(LOCATION).unwrap(), "/assets/");
    }
}
