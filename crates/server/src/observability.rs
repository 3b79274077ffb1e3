use std::time::Instant;

use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use once_cell::sync::Lazy;
use prometheus::{register_histogram, register_int_counter_vec, Encoder, Histogram, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "notes_requests_total",
        "Total requests handled, by method and status",
        &["method", "status"]
    )
    .expect("register requests_total")
});

pub static REQUEST_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "notes_request_duration_seconds",
        "Request duration in seconds",
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
    )
    .expect("register request_duration")
});

/// Middleware recording one count and one duration sample per request.
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_owned();
    let started = Instant::now();
    let response = next.run(req).await;
    REQUEST_DURATION.observe(started.elapsed().as_secs_f64());
    REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), response.status().as_str()])
        .inc();
    response
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}
