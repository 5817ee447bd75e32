// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics module
//!
//! HTTP-level metrics in the default Prometheus registry, and the handler
//! that exports everything registered there (operation and upstream
//! metrics from the dispatcher included).

use std::sync::LazyLock;

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use prometheus::{Encoder, HistogramVec, TextEncoder, register_histogram_vec};
use tracing::error;

/// Histogram for HTTP request durations in seconds.
pub static HTTP_REQUEST_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "asset_gateway_http_request_duration",
        "HTTP request durations in seconds, labeled by route, method and status",
        &["route", "method", "status"],
        vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("Failed to create HTTP request duration histogram")
});

/// Observe the duration of one HTTP request
///
/// # Arguments
/// * `route` - Matched route template, or `unmatched`
/// * `method` - HTTP method
/// * `status` - Response status code
/// * `duration_secs` - The duration of the request in seconds
pub fn observe_http_duration(route: &str, method: &str, status: u16, duration_secs: f64) {
    HTTP_REQUEST_DURATION
        .with_label_values(&[route, method, &status.to_string()])
        .observe(duration_secs);
}

/// Axum handler that exports metrics in Prometheus text format
pub async fn metrics_handler() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "failed to encode metrics");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }

    (
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}
