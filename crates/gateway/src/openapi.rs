// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! `OpenAPI` documentation module
//!
//! This module provides the `OpenAPI` document and `Swagger UI` endpoints.

use axum::{Json, response::Html};
use utoipa::OpenApi;

use crate::routes::handlers;

/// `OpenAPI` document for every gateway route
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Multi-chain Asset Gateway",
        description = "Balances, fees, prices, history, NFTs and portfolio valuation across EVM networks and Bitcoin behind one envelope.",
    ),
    paths(
        handlers::health_handler,
        handlers::balance_handler,
        handlers::gas_handler,
        handlers::price_handler,
        handlers::price_history_handler,
        handlers::history_handler,
        handlers::nft_owners_handler,
        handlers::owned_nfts_handler,
        handlers::token_metadata_handler,
        handlers::nft_metadata_handler,
        handlers::portfolio_handler,
        handlers::networks_handler,
    ),
    tags(
        (name = "health", description = "Gateway and provider health"),
        (name = "assets", description = "Balances, history, token metadata and portfolios"),
        (name = "prices", description = "Spot prices and price history"),
        (name = "nfts", description = "NFT ownership and metadata"),
        (name = "network", description = "Supported networks and fee data"),
    )
)]
pub struct ApiDoc;

/// `OpenAPI` specification endpoint
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Swagger UI endpoint
pub async fn swagger_ui() -> Html<&'static str> {
    Html(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Asset Gateway API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css" />
    <style>
        html { box-sizing: border-box; overflow-y: scroll; }
        *, *:before, *:after { box-sizing: inherit; }
        body { margin: 0; background: #fafafa; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({ url: '/api-doc/openapi.json', dom_id: '#swagger-ui', deepLinking: true });
        }
    </script>
</body>
</html>
"#,
    )
}
