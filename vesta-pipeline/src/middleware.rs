//! Middleware trait and pipeline dispatch

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{Method, StatusCode};
use std::sync::Arc;
use vesta_core::Result;

/// The request type flowing through the pipeline
pub type Request = http::Request<Bytes>;
/// The response type produced by the pipeline
pub type Response = http::Response<Bytes>;

/// A registered component invoked per incoming request.
///
/// `Ok(None)` means "not handled" and the pipeline moves on to the next
/// component.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Component name for logging
    fn name(&self) -> &str;

    /// Handle a request, or decline it
    async fn handle(&self, req: &Request) -> Result<Option<Response>>;
}

/// An ordered, immutable chain of middleware
pub struct Pipeline {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Pipeline {
    pub(crate) fn new(middleware: Vec<Arc<dyn Middleware>>) -> Self {
        Self { middleware }
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Walk the chain; the first component that produces a response wins.
    /// Exhaustion is a 404, a component failure is a 500.
    pub async fn dispatch(&self, req: &Request) -> Response {
        for mw in &self.middleware {
            match mw.handle(req).await {
                Ok(Some(response)) => {
                    return finalize(req, response);
                }
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!("Middleware {} failed: {}", mw.name(), e);
                    return finalize(req, plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"));
                }
            }
        }

        finalize(req, plain_response(StatusCode::NOT_FOUND, "Not Found"))
    }
}

/// HEAD responses keep the headers (Content-Length included) but drop the body
fn finalize(req: &Request, response: Response) -> Response {
    if req.method() == Method::HEAD {
        let (parts, _) = response.into_parts();
        return Response::from_parts(parts, Bytes::new());
    }
    response
}

fn plain_response(status: StatusCode, body: &'static str) -> Response {
    http::Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, body.len())
        .body(Bytes::from_static(body.as_bytes()))
        .unwrap_or_else(|_| Response::new(Bytes::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::PipelineBuilder;

    struct FixedResponder {
        status: StatusCode,
        body: &'static str,
    }

    #[async_trait]
    impl Middleware for FixedResponder {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn handle(&self, _req: &Request) -> Result<Option<Response>> {
            Ok(Some(plain_response(self.status, self.body)))
        }
    }

    struct Decliner;

    #[async_trait]
    impl Middleware for Decliner {
        fn name(&self) -> &str {
            "decliner"
        }

        async fn handle(&self, _req: &Request) -> Result<Option<Response>> {
            Ok(None)
        }
    }

    struct Failer;

    #[async_trait]
    impl Middleware for Failer {
        fn name(&self) -> &str {
            "failer"
        }

        async fn handle(&self, _req: &Request) -> Result<Option<Response>> {
            Err(vesta_core::Error::Internal("boom".to_string()))
        }
    }

    fn request(method: Method, path: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(path)
            .body(Bytes::new())
            .unwrap()
    }

    #[tokio::test]
    async fn test_first_responder_wins() {
        let mut builder = PipelineBuilder::new();
        builder
            .add(Arc::new(Decliner))
            .add(Arc::new(FixedResponder {
                status: StatusCode::OK,
                body: "one",
            }))
            .add(Arc::new(FixedResponder {
                status: StatusCode::IM_A_TEAPOT,
                body: "two",
            }));
        let pipeline = builder.build();

        let resp = pipeline.dispatch(&request(Method::GET, "/")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(&resp.body()[..], b"one");
    }

    #[tokio::test]
    async fn test_exhaustion_is_404() {
        let mut builder = PipelineBuilder::new();
        builder.add(Arc::new(Decliner));
        let resp = builder.build().dispatch(&request(Method::GET, "/x")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_failure_is_500() {
        let mut builder = PipelineBuilder::new();
        builder.add(Arc::new(Failer));
        let resp = builder.build().dispatch(&request(Method::GET, "/")).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_head_drops_body_keeps_length() {
        let mut builder = PipelineBuilder::new();
        builder.add(Arc::new(FixedResponder {
            status: StatusCode::OK,
            body: "hello",
        }));
        let resp = builder.build().dispatch(&request(Method::HEAD, "/")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.body().is_empty());
        assert_eq!(resp.headers().get(CONTENT_LENGTH).unwrap(), "5");
    }
}
