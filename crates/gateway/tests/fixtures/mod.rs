// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Gateway wired to mock upstreams
//!
//! Every test gets its own Alchemy, Esplora and CoinGecko mock servers and a
//! gateway bound to an ephemeral port that talks only to them.

use std::net::SocketAddr;

use gateway::{Server, ServerConfig, ShutdownConfig};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path},
};

pub const ALCHEMY_KEY: &str = "test-api-key";
pub const RPC_PATH: &str = "/v2/test-api-key";
pub const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
pub const SATOSHI: &str = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq";
pub const BITCOIN_CAIP: &str = "bip122:000000000019d6689c085ae165831e93/slip44:0";

/// Mock upstreams plus the gateway in front of them
pub struct TestGateway {
    pub alchemy: MockServer,
    pub esplora: MockServer,
    pub coingecko: MockServer,
    pub addr: SocketAddr,
    pub shutdown: CancellationToken,
    pub client: reqwest::Client,
}

impl TestGateway {
    /// Gateway with an Alchemy key configured
    pub async fn start() -> Self {
        Self::start_with_key(Some(ALCHEMY_KEY)).await
    }

    /// Gateway with an optional Alchemy key
    pub async fn start_with_key(alchemy_key: Option<&str>) -> Self {
        let alchemy = MockServer::start().await;
        let esplora = MockServer::start().await;
        let coingecko = MockServer::start().await;

        let mut config = ServerConfig::for_testing();
        config.providers.alchemy.api_key = alchemy_key.map(str::to_string);
        config.providers.alchemy.base_url = alchemy.uri();
        config.providers.esplora.base_url = esplora.uri();
        config.providers.coingecko.base_url = coingecko.uri();

        let (addr, shutdown) = Server::new(config, ShutdownConfig::default())
            .expect("Failed to create server")
            .run_for_testing()
            .await
            .expect("Failed to start test server");

        Self {
            alchemy,
            esplora,
            coingecko,
            addr,
            shutdown,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// GET `path` and decode the JSON body
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> (u16, Value) {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .expect("Failed to send request");
        let status = response.status().as_u16();
        (status, response.json().await.expect("Failed to decode body"))
    }

    /// POST `body` to `path` and decode the JSON answer
    pub async fn post(&self, path: &str, body: &Value) -> (u16, Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send request");
        let status = response.status().as_u16();
        (status, response.json().await.expect("Failed to decode body"))
    }

    /// Answers one JSON-RPC method on the Alchemy mock
    pub async fn mount_rpc(&self, rpc_method: &str, result: Value) {
        Mock::given(method("POST"))
            .and(path(RPC_PATH))
            .and(body_partial_json(json!({ "method": rpc_method })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result })),
            )
            .mount(&self.alchemy)
            .await;
    }

    /// Esplora address statistics with `funded` and `spent` satoshi
    pub async fn mount_address_stats(&self, address: &str, funded: u64, spent: u64) {
        Mock::given(method("GET"))
            .and(path(format!("/address/{address}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "address": address,
                "chain_stats": {
                    "funded_txo_count": 2,
                    "funded_txo_sum": funded,
                    "spent_txo_count": 1,
                    "spent_txo_sum": spent,
                    "tx_count": 3
                },
                "mempool_stats": {
                    "funded_txo_count": 0,
                    "funded_txo_sum": 0,
                    "spent_txo_count": 0,
                    "spent_txo_sum": 0,
                    "tx_count": 0
                }
            })))
            .mount(&self.esplora)
            .await;
    }

    /// CoinGecko spot price of `coin_id` in usd
    pub async fn mount_simple_price(&self, coin_id: &str, usd: f64) {
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Object(
                [(
                    coin_id.to_string(),
                    json!({ "usd": usd, "usd_24h_change": 2.5, "usd_24h_vol": 1.0e10 }),
                )]
                .into_iter()
                .collect(),
            )))
            .mount(&self.coingecko)
            .await;
    }

    /// Health probes of Esplora and CoinGecko answer 200
    pub async fn mount_health_probes(&self) {
        Mock::given(method("GET"))
            .and(path("/blocks/tip/height"))
            .respond_with(ResponseTemplate::new(200).set_body_string("840000"))
            .mount(&self.esplora)
            .await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "gecko_says": "(V3) To the Moon!" })),
            )
            .mount(&self.coingecko)
            .await;
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
