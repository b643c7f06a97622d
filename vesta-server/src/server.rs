//! HTTP/1 serving layer

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::ALLOW;
use http::{Method, StatusCode};
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use vesta_pipeline::Pipeline;

use crate::metrics;

/// Bind and serve forever, dispatching every request through the pipeline.
pub async fn run_server(addr: SocketAddr, pipeline: Arc<Pipeline>) -> vesta_core::Result<()> {
    metrics::init();

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| vesta_core::Error::Server(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("🌐 Server listening on http://{}", addr);

    loop {
        let (stream, remote) = match listener.accept().await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Accept error: {}", e);
                continue;
            }
        };

        let io = TokioIo::new(stream);
        let pipeline = pipeline.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req| handle_request(req, pipeline.clone()));
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                tracing::debug!("Connection error from {}: {:?}", remote, err);
            }
        });
    }
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    pipeline: Arc<Pipeline>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = if method == Method::GET || method == Method::HEAD {
        let (parts, _body) = req.into_parts();
        let request = http::Request::from_parts(parts, Bytes::new());
        pipeline.dispatch(&request).await
    } else {
        method_not_allowed()
    };

    let status = response.status();
    let elapsed = start.elapsed();

    metrics::REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), status.as_str()])
        .inc();
    metrics::REQUEST_DURATION_SECONDS
        .with_label_values(&[method.as_str(), status.as_str()])
        .observe(elapsed.as_secs_f64());
    metrics::BYTES_SERVED_TOTAL
        .with_label_values(&[method.as_str()])
        .inc_by(response.body().len() as u64);

    tracing::info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration_ms = elapsed.as_millis() as u64,
        "request"
    );

    let (parts, body) = response.into_parts();
    Ok(Response::from_parts(parts, Full::new(body)))
}

fn method_not_allowed() -> vesta_pipeline::Response {
    http::Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(ALLOW, "GET, HEAD")
        .body(Bytes::new())
        .unwrap_or_else(|_| http::Response::new(Bytes::new()))
}
