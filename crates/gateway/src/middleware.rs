// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Middleware module for HTTP request processing

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::metrics::observe_http_duration;

const UNMATCHED_ROUTE: &str = "unmatched";

/// Records the duration of every request under its route template
///
/// Labels use the matched template (`/v1/balance/{address}`), not the raw
/// path, so addresses never become label values.
pub async fn http_metrics_middleware(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| UNMATCHED_ROUTE.to_string(), |path| path.as_str().to_string());
    let method = req.method().to_string();

    let start = Instant::now();
    let response = next.run(req).await;
    let elapsed = start.elapsed();

    let status = response.status();
    if status.is_server_error() {
        warn!(route, method, status = status.as_u16(), ?elapsed, "request failed");
    } else {
        debug!(route, method, status = status.as_u16(), ?elapsed, "request served");
    }
    observe_http_duration(&route, &method, status.as_u16(), elapsed.as_secs_f64());

    response
}
