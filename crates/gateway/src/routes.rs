// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Routes module
//!
//! API routes live under `/v1`; health, metrics and documentation sit at
//! the root.

pub mod handlers;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use handlers::{
    balance_handler, gas_handler, health_handler, history_handler, networks_handler,
    nft_metadata_handler, nft_owners_handler, owned_nfts_handler, portfolio_handler,
    price_handler, price_history_handler, token_metadata_handler,
};

use crate::{
    metrics::metrics_handler,
    middleware::http_metrics_middleware,
    openapi::{openapi_spec, swagger_ui},
    state::ServerState,
};

/// Create application routes
pub fn create_routes() -> Router<ServerState> {
    let operational_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));

    let docs_routes = Router::new()
        .route("/api-doc/openapi.json", get(openapi_spec))
        .route("/swagger-ui", get(swagger_ui));

    let api_routes = Router::new()
        .route("/balance/{address}", get(balance_handler))
        .route("/gas/{networkId}", get(gas_handler))
        .route("/price/{assetId}", get(price_handler))
        .route("/price/{assetId}/history", get(price_history_handler))
        .route("/history/{address}", get(history_handler))
        .route("/nft/owners/{networkId}/{contract}", get(nft_owners_handler))
        .route("/nft/owned/{networkId}/{owner}", get(owned_nfts_handler))
        .route("/nft/{assetId}/metadata", get(nft_metadata_handler))
        .route("/token/{assetId}/metadata", get(token_metadata_handler))
        .route("/portfolio", post(portfolio_handler))
        .route("/networks", get(networks_handler));

    let v1 = Router::new().nest("/v1", api_routes);

    Router::new()
        .merge(operational_routes)
        .merge(docs_routes)
        .merge(v1)
        .layer(middleware::from_fn(http_metrics_middleware))
}
