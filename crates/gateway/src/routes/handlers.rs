// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! HTTP request handlers module
//!
//! Thin adapters from HTTP to [`blockchain_service::BlockchainService`]:
//! each handler decodes path and query parameters, calls one operation and
//! renders the envelope it returns. Asset identifiers containing `/` must be
//! percent-encoded (`eip155:1%2Ferc20:0x...`) when they appear in a path.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use blockchain_service::{
    BalanceData, GasData, HistoryData, NftMetadata, NftOwnersData, NftsForOwnerData,
    PortfolioData, PortfolioRequest, PriceData, PriceHistoryData, TokenMetadata,
};
use serde::Deserialize;
use shared_types::{ApiResponse, Network};
use utoipa::IntoParams;

use crate::{
    error::Envelope,
    extractors::{JsonExtractor, QueryExtractor},
    state::{HealthCheck, HealthStatus, ServerState},
};

/// Health check endpoint handler
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Health check endpoint",
    description = "Probes Alchemy, Esplora and CoinGecko concurrently and reports each provider's status alongside the overall status.",
    responses(
        (status = 200, description = "Gateway is up or degraded", body = HealthCheck),
        (status = 503, description = "Every provider is down", body = HealthCheck)
    )
)]
pub async fn health_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let health = state.health_check().await;
    let status = match health.status {
        HealthStatus::Down { .. } => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Up | HealthStatus::Degraded { .. } => StatusCode::OK,
    };
    (status, Json(health))
}

/// Query parameters of the balance endpoint
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BalanceQuery {
    /// Asset identifier, CAIP or legacy form
    #[param(example = "eip155:1/slip44:60")]
    pub asset_id: String,
}

/// Balance of one asset held by one address
#[utoipa::path(
    get,
    path = "/v1/balance/{address}",
    tag = "assets",
    params(("address" = String, Path, description = "Holder address"), BalanceQuery),
    responses(
        (status = 200, description = "Balance resolved", body = ApiResponse<BalanceData>),
        (status = 400, description = "Malformed asset id or address", body = ApiResponse<BalanceData>),
        (status = 502, description = "Upstream provider failed", body = ApiResponse<BalanceData>)
    )
)]
pub async fn balance_handler(
    State(state): State<ServerState>,
    Path(address): Path<String>,
    QueryExtractor(query): QueryExtractor<BalanceQuery>,
) -> Envelope<BalanceData> {
    state
        .service()
        .get_balance(&address, &query.asset_id)
        .await
        .into()
}

/// Query parameters of the gas endpoint
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GasQuery {
    /// `legacy` (default) or `eip1559`
    #[serde(rename = "type")]
    pub mode: Option<String>,
}

/// Current fee suggestion for an EVM network
#[utoipa::path(
    get,
    path = "/v1/gas/{networkId}",
    tag = "network",
    params(("networkId" = String, Path, description = "Network key or alias"), GasQuery),
    responses(
        (status = 200, description = "Fee data resolved", body = ApiResponse<GasData>),
        (status = 501, description = "Network has no gas market", body = ApiResponse<GasData>)
    )
)]
pub async fn gas_handler(
    State(state): State<ServerState>,
    Path(network_id): Path<String>,
    QueryExtractor(query): QueryExtractor<GasQuery>,
) -> Envelope<GasData> {
    state
        .service()
        .get_gas(&network_id, query.mode.as_deref())
        .await
        .into()
}

/// Query parameters of the spot price endpoint
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PriceQuery {
    /// Quote currency, `usd` when absent
    pub currency: Option<String>,
}

/// Spot price of an asset
#[utoipa::path(
    get,
    path = "/v1/price/{assetId}",
    tag = "prices",
    params(("assetId" = String, Path, description = "Percent-encoded asset identifier"), PriceQuery),
    responses(
        (status = 200, description = "Price resolved", body = ApiResponse<PriceData>),
        (status = 501, description = "Asset has no listed price", body = ApiResponse<PriceData>)
    )
)]
pub async fn price_handler(
    State(state): State<ServerState>,
    Path(asset_id): Path<String>,
    QueryExtractor(query): QueryExtractor<PriceQuery>,
) -> Envelope<PriceData> {
    state
        .service()
        .get_price(&asset_id, query.currency.as_deref())
        .await
        .into()
}

/// Query parameters of the price history endpoint
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PriceHistoryQuery {
    /// Days of history, 1..=3650, 7 when absent
    pub days: Option<u32>,
    /// Quote currency, `usd` when absent
    pub currency: Option<String>,
}

/// Price series of an asset
#[utoipa::path(
    get,
    path = "/v1/price/{assetId}/history",
    tag = "prices",
    params(("assetId" = String, Path, description = "Percent-encoded asset identifier"), PriceHistoryQuery),
    responses(
        (status = 200, description = "Series resolved", body = ApiResponse<PriceHistoryData>),
        (status = 400, description = "Days out of range", body = ApiResponse<PriceHistoryData>)
    )
)]
pub async fn price_history_handler(
    State(state): State<ServerState>,
    Path(asset_id): Path<String>,
    QueryExtractor(query): QueryExtractor<PriceHistoryQuery>,
) -> Envelope<PriceHistoryData> {
    state
        .service()
        .get_price_history(&asset_id, query.days, query.currency.as_deref())
        .await
        .into()
}

/// Query parameters of the history endpoint
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Asset identifier, CAIP or legacy form
    pub asset_id: String,
    /// 1-based page, 1 when absent
    pub page: Option<u32>,
    /// Page size, 1..=100, 20 when absent
    pub limit: Option<u32>,
}

/// Transaction history of an address
#[utoipa::path(
    get,
    path = "/v1/history/{address}",
    tag = "assets",
    params(("address" = String, Path, description = "Holder address"), HistoryQuery),
    responses(
        (status = 200, description = "Page resolved", body = ApiResponse<HistoryData>),
        (status = 400, description = "Invalid paging parameters", body = ApiResponse<HistoryData>)
    )
)]
pub async fn history_handler(
    State(state): State<ServerState>,
    Path(address): Path<String>,
    QueryExtractor(query): QueryExtractor<HistoryQuery>,
) -> Envelope<HistoryData> {
    state
        .service()
        .get_history(&address, &query.asset_id, query.page, query.limit)
        .await
        .into()
}

/// Query parameters of the NFT owners endpoint
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NftOwnersQuery {
    /// Restrict to the owners of one token
    pub token_id: Option<String>,
}

/// Owners of an NFT collection or token
#[utoipa::path(
    get,
    path = "/v1/nft/owners/{networkId}/{contract}",
    tag = "nfts",
    params(
        ("networkId" = String, Path, description = "Network key or alias"),
        ("contract" = String, Path, description = "Collection contract address"),
        NftOwnersQuery
    ),
    responses(
        (status = 200, description = "Owners resolved", body = ApiResponse<NftOwnersData>),
        (status = 501, description = "Network has no NFT support", body = ApiResponse<NftOwnersData>)
    )
)]
pub async fn nft_owners_handler(
    State(state): State<ServerState>,
    Path((network_id, contract)): Path<(String, String)>,
    QueryExtractor(query): QueryExtractor<NftOwnersQuery>,
) -> Envelope<NftOwnersData> {
    state
        .service()
        .get_nft_owners(&contract, &network_id, query.token_id.as_deref())
        .await
        .into()
}

/// Query parameters of the owned NFTs endpoint
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OwnedNftsQuery {
    /// Restrict to one collection
    pub contract_address: Option<String>,
}

/// NFTs held by an address
#[utoipa::path(
    get,
    path = "/v1/nft/owned/{networkId}/{owner}",
    tag = "nfts",
    params(
        ("networkId" = String, Path, description = "Network key or alias"),
        ("owner" = String, Path, description = "Holder address"),
        OwnedNftsQuery
    ),
    responses(
        (status = 200, description = "Holdings resolved", body = ApiResponse<NftsForOwnerData>),
        (status = 501, description = "Network has no NFT support", body = ApiResponse<NftsForOwnerData>)
    )
)]
pub async fn owned_nfts_handler(
    State(state): State<ServerState>,
    Path((network_id, owner)): Path<(String, String)>,
    QueryExtractor(query): QueryExtractor<OwnedNftsQuery>,
) -> Envelope<NftsForOwnerData> {
    state
        .service()
        .get_nfts_for_owner(&owner, &network_id, query.contract_address.as_deref())
        .await
        .into()
}

/// Fungible token metadata
#[utoipa::path(
    get,
    path = "/v1/token/{assetId}/metadata",
    tag = "assets",
    params(("assetId" = String, Path, description = "Percent-encoded asset identifier")),
    responses(
        (status = 200, description = "Metadata resolved", body = ApiResponse<TokenMetadata>),
        (status = 501, description = "Asset is an NFT", body = ApiResponse<TokenMetadata>)
    )
)]
pub async fn token_metadata_handler(
    State(state): State<ServerState>,
    Path(asset_id): Path<String>,
) -> Envelope<TokenMetadata> {
    state.service().get_token_metadata(&asset_id).await.into()
}

/// NFT token metadata
#[utoipa::path(
    get,
    path = "/v1/nft/{assetId}/metadata",
    tag = "nfts",
    params(("assetId" = String, Path, description = "Percent-encoded NFT asset identifier")),
    responses(
        (status = 200, description = "Metadata resolved", body = ApiResponse<NftMetadata>),
        (status = 501, description = "Asset is not an NFT", body = ApiResponse<NftMetadata>)
    )
)]
pub async fn nft_metadata_handler(
    State(state): State<ServerState>,
    Path(asset_id): Path<String>,
) -> Envelope<NftMetadata> {
    state.service().get_nft_metadata(&asset_id).await.into()
}

/// Portfolio valuation
///
/// Balances and prices of every holding are fetched concurrently; the first
/// failure fails the whole request.
#[utoipa::path(
    post,
    path = "/v1/portfolio",
    tag = "assets",
    request_body = PortfolioRequest,
    responses(
        (status = 200, description = "Portfolio valued", body = ApiResponse<PortfolioData>),
        (status = 400, description = "Empty or malformed holdings", body = ApiResponse<PortfolioData>),
        (status = 502, description = "Upstream provider failed", body = ApiResponse<PortfolioData>)
    )
)]
pub async fn portfolio_handler(
    State(state): State<ServerState>,
    JsonExtractor(request): JsonExtractor<PortfolioRequest>,
) -> Envelope<PortfolioData> {
    state.service().get_portfolio(request).await.into()
}

/// Supported networks
#[utoipa::path(
    get,
    path = "/v1/networks",
    tag = "network",
    responses((status = 200, description = "Registry entries", body = ApiResponse<Vec<Network>>))
)]
pub async fn networks_handler(State(state): State<ServerState>) -> Envelope<Vec<Network>> {
    state.service().list_networks().into()
}
