//! Prometheus metrics for Vesta
//!
//! Request counts, latency, and bytes served.

use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

/// Global metrics registry
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total requests processed
pub static REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("vesta_requests_total", "Total number of HTTP requests"),
        &["method", "status"],
    )
    .expect("metric can be created")
});

/// Request latency in seconds
pub static REQUEST_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "vesta_request_duration_seconds",
            "Request duration in seconds",
        ),
        &["method", "status"],
    )
    .expect("metric can be created")
});

/// Response body bytes sent
pub static BYTES_SERVED_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("vesta_bytes_served_total", "Total response body bytes served"),
        &["method"],
    )
    .expect("metric can be created")
});

/// Register all metrics. Safe to call more than once.
pub fn init() {
    let _ = REGISTRY.register(Box::new(REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(BYTES_SERVED_TOTAL.clone()));
}

/// Gather metrics in Prometheus text format
pub fn gather() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_after_init() {
        init();
        REQUESTS_TOTAL.with_label_values(&["GET", "200"]).inc();
        let text = gather();
        assert!(text.contains("vesta_requests_total"));
    }
}
