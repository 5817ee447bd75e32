// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics for dispatched operations
//!
//! Registered in the default registry, so whatever exports
//! `prometheus::gather()` picks them up.

use std::{sync::LazyLock, time::Instant};

use prometheus::{HistogramVec, IntCounterVec, register_histogram_vec, register_int_counter_vec};

/// Operations answered, labeled by operation and outcome (`success` or error code)
pub static OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "asset_gateway_operations_total",
        "Total number of dispatched operations, labeled by operation and outcome",
        &["operation", "outcome"]
    )
    .expect("Failed to create asset_gateway_operations_total counter vec")
});

/// Histogram for upstream provider call durations in seconds.
pub static UPSTREAM_REQUEST_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "asset_gateway_upstream_request_duration",
        "Upstream provider request durations in seconds",
        &["provider", "result"],
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("Failed to create upstream request duration histogram")
});

/// Count one answered operation
///
/// # Arguments
/// * `operation` - Operation label
/// * `outcome` - `success` or the error code of the envelope
pub fn record_operation(operation: &str, outcome: &str) {
    OPERATIONS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Observe the duration of one upstream call
///
/// # Arguments
/// * `provider` - Provider family (`evm`, `bitcoin`, `price`)
/// * `result` - `success` or `error`
/// * `started` - When the call was issued
pub fn observe_upstream_duration(provider: &str, result: &str, started: Instant) {
    UPSTREAM_REQUEST_DURATION
        .with_label_values(&[provider, result])
        .observe(started.elapsed().as_secs_f64());
}

/// Awaits an upstream call and records its duration
pub(crate) async fn timed<T, E>(
    provider: &'static str,
    call: impl Future<Output = Result<T, E>>,
) -> Result<T, E> {
    let started = Instant::now();
    let result = call.await;
    let label = if result.is_ok() { "success" } else { "error" };
    observe_upstream_duration(provider, label, started);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn timed_records_outcome() {
        let before = UPSTREAM_REQUEST_DURATION
            .with_label_values(&["metrics-test", "error"])
            .get_sample_count();

        let result: Result<(), &str> = timed("metrics-test", async { Err("boom") }).await;
        assert!(result.is_err());

        let after = UPSTREAM_REQUEST_DURATION
            .with_label_values(&["metrics-test", "error"])
            .get_sample_count();
        assert_eq!(after, before + 1);
    }

    #[test]
    fn operations_are_counted() {
        record_operation("metrics-test", "success");
        assert!(
            OPERATIONS_TOTAL
                .with_label_values(&["metrics-test", "success"])
                .get()
                >= 1
        );
    }
}
