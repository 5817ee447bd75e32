// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for `ProviderRegistry`

use api_client::HealthStatus;
use external_apis::{
    AlchemyClient, AlchemyConfig, CoinGeckoClient, CoinGeckoConfig, EsploraClient, EsploraConfig,
    ProviderRegistry, overall_status,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn registry(mock_server: &MockServer, alchemy_key: Option<&str>) -> ProviderRegistry {
    let alchemy = AlchemyClient::new(AlchemyConfig {
        api_key: alchemy_key.map(str::to_string),
        base_url: mock_server.uri(),
        ..Default::default()
    })
    .unwrap();
    let esplora = EsploraClient::new(EsploraConfig::new(mock_server.uri(), 5).unwrap()).unwrap();
    let coingecko = CoinGeckoClient::new(CoinGeckoConfig {
        base_url: mock_server.uri(),
        ..Default::default()
    })
    .unwrap();

    ProviderRegistry::new(alchemy, esplora, coingecko)
}

/// Test that every provider is probed and reported in order
#[tokio::test]
async fn overall_health_all_up() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/key"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blocks/tip/height"))
        .respond_with(ResponseTemplate::new(200).set_body_string("840000"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let registry = registry(&mock_server, Some("key"));
    let results = registry.get_overall_health().await;

    let providers: Vec<&str> = results.iter().map(|r| r.provider.as_str()).collect();
    assert_eq!(providers, registry.client_names());
    assert!(results.iter().all(|r| r.status == HealthStatus::Up));
    assert_eq!(overall_status(&results), HealthStatus::Up);
}

/// Test that one impaired provider degrades the overall status
#[tokio::test]
async fn overall_health_degraded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blocks/tip/height"))
        .respond_with(ResponseTemplate::new(200).set_body_string("840000"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let registry = registry(&mock_server, None);
    let results = registry.get_overall_health().await;

    match overall_status(&results) {
        HealthStatus::Degraded { reason } => assert_eq!(reason, "Impaired providers: alchemy"),
        other => panic!("Expected Degraded status, got: {other:?}"),
    }
}
