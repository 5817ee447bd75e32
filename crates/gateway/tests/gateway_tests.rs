// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests: HTTP in, mocked upstreams out

mod fixtures;

use fixtures::{BITCOIN_CAIP, RPC_PATH, SATOSHI, TestGateway, VITALIK};
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{method, path},
};

/// Test that health reports every provider and degrades without an Alchemy key
#[tokio::test]
async fn health_degrades_without_alchemy_key() {
    let gateway = TestGateway::start_with_key(None).await;
    gateway.mount_health_probes().await;

    let (status, body) = gateway.get("/health", &[]).await;

    assert_eq!(status, 200);
    assert!(body["status"]["Degraded"]["reason"].is_string());
    let providers = body["providers"].as_array().unwrap();
    assert_eq!(providers.len(), 3);
    assert!(
        providers
            .iter()
            .any(|p| p["provider"] == "esplora" && p["status"] == "Up")
    );
    assert!(
        providers
            .iter()
            .any(|p| p["provider"] == "coingecko" && p["status"] == "Up")
    );
}

/// Test that a Bitcoin balance is served from the Esplora mock
#[tokio::test]
async fn bitcoin_balance_end_to_end() {
    let gateway = TestGateway::start().await;
    gateway
        .mount_address_stats(SATOSHI, 200_000_000, 50_000_000)
        .await;

    let (status, body) = gateway
        .get(&format!("/v1/balance/{SATOSHI}"), &[("assetId", BITCOIN_CAIP)])
        .await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["networkId"], "bitcoin");
    assert_eq!(body["data"]["type"], "bitcoin");
    assert_eq!(body["data"]["balance"], "1.5");
    assert_eq!(body["data"]["rawBalance"], "150000000");
    assert!(body["timestamp"].is_i64());
    assert!(gateway.alchemy.received_requests().await.unwrap().is_empty());
}

/// Test that an ether balance is served from the Alchemy mock
#[tokio::test]
async fn ethereum_balance_end_to_end() {
    let gateway = TestGateway::start().await;
    gateway
        .mount_rpc("eth_getBalance", json!("0x14d1120d7b160000"))
        .await;

    let (status, body) = gateway
        .get(&format!("/v1/balance/{VITALIK}"), &[("assetId", "ethereum")])
        .await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["balance"], "1.5");
    assert_eq!(body["data"]["decimals"], 18);
    assert!(gateway.esplora.received_requests().await.unwrap().is_empty());
}

/// Test that EVM operations without an Alchemy key answer 503
#[tokio::test]
async fn missing_credential_is_service_unavailable() {
    let gateway = TestGateway::start_with_key(None).await;

    let (status, body) = gateway
        .get(&format!("/v1/balance/{VITALIK}"), &[("assetId", "ethereum")])
        .await;

    assert_eq!(status, 503);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "MISSING_CREDENTIAL");
    assert!(gateway.alchemy.received_requests().await.unwrap().is_empty());
}

/// Test that upstream failures map to 502 with the upstream detail attached
#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let gateway = TestGateway::start().await;
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&gateway.alchemy)
        .await;

    let (status, body) = gateway
        .get(&format!("/v1/balance/{VITALIK}"), &[("assetId", "ethereum")])
        .await;

    assert_eq!(status, 502);
    assert_eq!(body["error"]["code"], "BALANCE_FETCH_ERROR");
    assert!(!body["error"]["details"].is_null());
}

/// Test that gas is not offered for Bitcoin
#[tokio::test]
async fn bitcoin_gas_is_not_implemented() {
    let gateway = TestGateway::start().await;

    let (status, body) = gateway.get("/v1/gas/bitcoin", &[]).await;

    assert_eq!(status, 501);
    assert_eq!(body["error"]["code"], "UNSUPPORTED_OPERATION");
}

/// Test that asset id and network errors map to 400 and 404
#[tokio::test]
async fn identifier_errors_map_to_client_status() {
    let gateway = TestGateway::start().await;

    let (status, body) = gateway
        .get(&format!("/v1/balance/{VITALIK}"), &[("assetId", "invalid:::::")])
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "INVALID_FORMAT");

    let (status, body) = gateway.get("/v1/gas/solana", &[]).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = gateway
        .get(&format!("/v1/history/{VITALIK}"), &[("assetId", "ethereum"), ("limit", "500")])
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "INVALID_PARAMETER");
}

/// Test that a missing or undecodable query parameter is an envelope, not plain text
#[tokio::test]
async fn bad_query_string_is_invalid_parameter() {
    let gateway = TestGateway::start().await;

    let (status, body) = gateway.get(&format!("/v1/balance/{SATOSHI}"), &[]).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_PARAMETER");

    let (status, body) = gateway
        .get(
            &format!("/v1/history/{SATOSHI}"),
            &[("assetId", "bitcoin"), ("page", "first")],
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "INVALID_PARAMETER");
}

/// Test that a percent-encoded CAIP identifier survives the path segment
#[tokio::test]
async fn encoded_caip_asset_in_path() {
    let gateway = TestGateway::start().await;

    let (status, body) = gateway
        .get(
            "/v1/token/bip122:000000000019d6689c085ae165831e93%2Fslip44:0/metadata",
            &[],
        )
        .await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["symbol"], "BTC");
    assert_eq!(body["data"]["decimals"], 8);
    assert!(gateway.esplora.received_requests().await.unwrap().is_empty());
}

/// Test that the spot price is served from the CoinGecko mock
#[tokio::test]
async fn price_end_to_end() {
    let gateway = TestGateway::start().await;
    gateway.mount_simple_price("bitcoin", 65_000.0).await;

    let (status, body) = gateway.get("/v1/price/bitcoin", &[("currency", "USD")]).await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["currency"], "usd");
    assert_eq!(body["data"]["price"], 65_000.0);
}

/// Test that the portfolio values every holding and sums the total
#[tokio::test]
async fn portfolio_end_to_end() {
    let gateway = TestGateway::start().await;
    gateway
        .mount_address_stats(SATOSHI, 150_000_000, 0)
        .await;
    gateway.mount_simple_price("bitcoin", 60_000.0).await;

    let (status, body) = gateway
        .post(
            "/v1/portfolio",
            &json!({ "holdings": [{ "address": SATOSHI, "assetId": "bitcoin" }] }),
        )
        .await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["data"]["currency"], "usd");
    assert_eq!(body["data"]["totalValue"], 90_000.0);
    assert_eq!(body["data"]["holdings"][0]["balance"], "1.5");
}

/// Test that an empty or malformed portfolio is rejected with 400
#[tokio::test]
async fn portfolio_rejects_bad_bodies() {
    let gateway = TestGateway::start().await;

    let (status, body) = gateway
        .post("/v1/portfolio", &json!({ "holdings": [] }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "INVALID_PARAMETER");

    let (status, body) = gateway
        .post(
            "/v1/portfolio",
            &json!({ "holdings": [{ "address": SATOSHI }] }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "INVALID_PARAMETER");
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("malformed holdings at positions [0]")
    );
}

/// Test that the network registry is listed
#[tokio::test]
async fn networks_are_listed() {
    let gateway = TestGateway::start().await;

    let (status, body) = gateway.get("/v1/networks", &[]).await;

    assert_eq!(status, 200);
    let networks = body["data"].as_array().unwrap();
    assert!(networks.iter().any(|n| n["id"] == "bitcoin"));
    assert!(
        networks
            .iter()
            .any(|n| n["id"] == "ethereum" && n["chainId"] == 1)
    );
}

/// Test that responses carry a request id and requests show up in /metrics
#[tokio::test]
async fn request_id_and_metrics() {
    let gateway = TestGateway::start().await;

    let response = gateway
        .client
        .get(gateway.url("/v1/networks"))
        .send()
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));

    let metrics = gateway
        .client
        .get(gateway.url("/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(metrics.contains("asset_gateway_http_request_duration"));
    assert!(metrics.contains("route=\"/v1/networks\""));
}

/// Test that the OpenAPI document is served
#[tokio::test]
async fn openapi_document_is_served() {
    let gateway = TestGateway::start().await;

    let (status, body) = gateway.get("/api-doc/openapi.json", &[]).await;

    assert_eq!(status, 200);
    assert!(body["paths"]["/v1/portfolio"]["post"].is_object());
}

/// Test that the path templates routed and measured are the ones documented
#[tokio::test]
async fn documented_paths_match_routed_paths() {
    let gateway = TestGateway::start().await;
    gateway.get("/v1/gas/bitcoin", &[]).await;
    gateway.get("/v1/token/bitcoin/metadata", &[]).await;

    let (_, doc) = gateway.get("/api-doc/openapi.json", &[]).await;
    let metrics = gateway
        .client
        .get(gateway.url("/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    let routed: Vec<&str> = metrics
        .split("route=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .filter(|route| route.starts_with("/v1/"))
        .collect();
    assert!(routed.contains(&"/v1/gas/{networkId}"), "{routed:?}");
    assert!(routed.contains(&"/v1/token/{assetId}/metadata"), "{routed:?}");
    for route in routed {
        assert!(doc["paths"][route].is_object(), "{route} is not documented");
    }
}
