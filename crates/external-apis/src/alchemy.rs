// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Alchemy API integration
//!
//! Implements [`EvmRpc`] on top of Alchemy's JSON-RPC endpoints and its NFT v3
//! REST API. Every EVM network has its own host, so endpoints are resolved
//! per network on first use and kept for the lifetime of the client.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use alloy_primitives::{Address, Bytes, U256};
use api_client::{
    ApiClient, ApiError, AssetTransfer, ContractOwner, Erc20Metadata, EvmRpc, FeeData,
    HealthStatus, Nft, NftContract, OwnedNfts, TransferPage, TransferQuery,
};
use dashmap::DashMap;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use shared_types::{NetworkId, parse_quantity};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

use crate::non_empty_string::NonEmptyString;

// Alchemy API constants
const DEFAULT_ALCHEMY_BASE_URL: &str = "https://{network}.g.alchemy.com";
const DEFAULT_ALCHEMY_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_ALCHEMY_HEALTH_CHECK_TIMEOUT_SECONDS: u64 = 5;
const NETWORK_PLACEHOLDER: &str = "{network}";

/// `balanceOf(address)`
const BALANCE_OF_SELECTOR: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
/// `decimals()`
const DECIMALS_SELECTOR: [u8; 4] = [0x31, 0x3c, 0xe5, 0x67];

/// Configuration for the Alchemy API client
#[derive(Debug, Clone)]
pub struct AlchemyConfig {
    /// API key; EVM calls fail with a credential error while it is unset
    pub api_key: Option<String>,
    /// Base URL, with `{network}` standing for the Alchemy network slug
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Health check timeout in seconds
    pub health_check_timeout_seconds: u64,
}

impl Default for AlchemyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_ALCHEMY_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_ALCHEMY_TIMEOUT_SECONDS,
            health_check_timeout_seconds: DEFAULT_ALCHEMY_HEALTH_CHECK_TIMEOUT_SECONDS,
        }
    }
}

/// Errors specific to the Alchemy API client
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum AlchemyError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// JSON-RPC error object in an otherwise successful response
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Response was well-formed JSON but not what was expected
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    /// Requested token or contract is unknown to Alchemy
    #[error("Not found")]
    NotFound,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Authentication failed
    #[error("Authentication failed")]
    Unauthorized,

    /// No API key configured
    #[error("Alchemy API key is not configured")]
    MissingApiKey,

    /// Network has no Alchemy endpoint
    #[error("Network {0} has no Alchemy endpoint")]
    UnsupportedNetwork(NetworkId),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout error
    #[error("Request timeout")]
    Timeout { seconds: u64 },
}

impl From<AlchemyError> for ApiError {
    fn from(value: AlchemyError) -> Self {
        match value {
            // request URLs embed the API key
            AlchemyError::Http(error) => ApiError::Http {
                message: error.without_url().to_string(),
            },
            AlchemyError::Json(error) => ApiError::InvalidResponse {
                message: error.to_string(),
            },
            AlchemyError::InvalidResponse(message) => ApiError::InvalidResponse { message },
            AlchemyError::ApiError { status, message } => ApiError::Upstream { status, message },
            AlchemyError::Rpc { code, message } => ApiError::Rpc { code, message },
            AlchemyError::NotFound => ApiError::NotFound {
                message: "Alchemy has no record of the requested item".to_string(),
            },
            AlchemyError::RateLimited => ApiError::RateLimitExceeded {
                retry_after_seconds: 1,
            },
            AlchemyError::Unauthorized => ApiError::Authentication {
                message: value.to_string(),
            },
            AlchemyError::MissingApiKey => ApiError::MissingCredential {
                provider: "alchemy",
            },
            AlchemyError::UnsupportedNetwork(network) => ApiError::UnsupportedNetwork {
                network,
                provider: "alchemy",
            },
            AlchemyError::Config(message) => ApiError::Configuration { message },
            AlchemyError::Timeout { seconds } => ApiError::Timeout {
                timeout_seconds: seconds,
            },
        }
    }
}

/// Resolved URLs for one network
#[derive(Debug)]
struct NetworkEndpoints {
    rpc: Url,
    nft: Url,
}

impl NetworkEndpoints {
    fn new(base_url: &str, slug: &str, api_key: &str) -> Result<Self, AlchemyError> {
        let host = base_url.replace(NETWORK_PLACEHOLDER, slug);
        let host = host.trim_end_matches('/');
        let parse = |raw: String| {
            Url::parse(&raw)
                .map_err(|e| AlchemyError::Config(format!("invalid Alchemy URL for {slug}: {e}")))
        };

        Ok(Self {
            rpc: parse(format!("{host}/v2/{api_key}"))?,
            nft: parse(format!("{host}/nft/v3/{api_key}/"))?,
        })
    }

    fn nft_method(&self, method: &str) -> Result<Url, AlchemyError> {
        self.nft
            .join(method)
            .map_err(|e| AlchemyError::Config(format!("invalid NFT method {method}: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    id: Option<u64>,
    result: Option<Value>,
    error: Option<RpcErrorObject>,
}

impl RpcEnvelope {
    fn into_result<T: DeserializeOwned>(self) -> Result<T, AlchemyError> {
        if let Some(error) = self.error {
            return Err(AlchemyError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        Ok(serde_json::from_value(self.result.unwrap_or(Value::Null))?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransfersResult {
    #[serde(default)]
    transfers: Vec<AssetTransfer>,
    page_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockHeader {
    base_fee_per_gas: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenOwnersResponse {
    owners: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ContractOwnersResponse {
    owners: Vec<ContractOwner>,
}

/// Alchemy API client implementation
#[derive(Debug)]
pub struct AlchemyClient {
    client: Client,
    config: AlchemyConfig,
    api_key: Option<NonEmptyString>,
    endpoints: DashMap<NetworkId, Arc<NetworkEndpoints>>,
}

impl AlchemyClient {
    /// Create a new Alchemy API client
    ///
    /// A blank or absent API key is accepted; calls then fail with
    /// [`AlchemyError::MissingApiKey`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or the base URL is blank
    pub fn new(config: AlchemyConfig) -> Result<Self, AlchemyError> {
        if config.base_url.trim().is_empty() {
            return Err(AlchemyError::Config("Base URL cannot be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("asset-gateway/0.1.0")
            .build()
            .map_err(AlchemyError::Http)?;

        let api_key = NonEmptyString::optional(config.api_key.clone());
        if api_key.is_none() {
            warn!("Alchemy API key not configured, EVM operations will be unavailable");
        }

        Ok(Self {
            client,
            config,
            api_key,
            endpoints: DashMap::new(),
        })
    }

    /// Endpoints for `network`, built on first use
    ///
    /// Concurrent first calls may each build the endpoints; the last insert
    /// wins and every copy is identical.
    fn endpoints(&self, network: NetworkId) -> Result<Arc<NetworkEndpoints>, AlchemyError> {
        if let Some(cached) = self.endpoints.get(&network) {
            return Ok(Arc::clone(cached.value()));
        }

        let api_key = self.api_key.as_ref().ok_or(AlchemyError::MissingApiKey)?;
        let slug = network
            .rpc_network_slug()
            .ok_or(AlchemyError::UnsupportedNetwork(network))?;

        let built = Arc::new(NetworkEndpoints::new(
            &self.config.base_url,
            slug,
            api_key.as_str(),
        )?);
        self.endpoints.insert(network, Arc::clone(&built));
        debug!(network = %network, slug, "resolved Alchemy endpoints");

        Ok(built)
    }

    /// Number of networks with resolved endpoints
    pub fn cached_networks(&self) -> usize {
        self.endpoints.len()
    }

    async fn send(
        &self,
        request: RequestBuilder,
        timeout_seconds: u64,
    ) -> Result<Response, AlchemyError> {
        let response = timeout(Duration::from_secs(timeout_seconds), request.send())
            .await
            .map_err(|_| AlchemyError::Timeout {
                seconds: timeout_seconds,
            })?
            .map_err(AlchemyError::Http)?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(AlchemyError::NotFound),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AlchemyError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => Err(AlchemyError::RateLimited),
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                warn!(
                    status = status.as_u16(),
                    error = error_text,
                    "Alchemy API error"
                );
                Err(AlchemyError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    async fn rpc<T: DeserializeOwned>(
        &self,
        network: NetworkId,
        method: &str,
        params: Value,
    ) -> Result<T, AlchemyError> {
        let endpoints = self.endpoints(network)?;
        debug!(network = %network, method, "sending Alchemy JSON-RPC request");

        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let request = self.client.post(endpoints.rpc.clone()).json(&body);
        let response = self.send(request, self.config.timeout_seconds).await?;
        let text = response.text().await.map_err(AlchemyError::Http)?;

        serde_json::from_str::<RpcEnvelope>(&text)?.into_result()
    }

    /// Sends several calls in one JSON-RPC batch, answers ordered by request
    async fn rpc_batch(
        &self,
        network: NetworkId,
        calls: &[(&str, Value)],
    ) -> Result<Vec<RpcEnvelope>, AlchemyError> {
        let endpoints = self.endpoints(network)?;
        debug!(network = %network, calls = calls.len(), "sending Alchemy JSON-RPC batch");

        let body: Vec<Value> = calls
            .iter()
            .enumerate()
            .map(|(id, (method, params))| {
                json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "method": method,
                    "params": params,
                })
            })
            .collect();
        let request = self.client.post(endpoints.rpc.clone()).json(&body);
        let response = self.send(request, self.config.timeout_seconds).await?;
        let text = response.text().await.map_err(AlchemyError::Http)?;

        let mut envelopes: Vec<RpcEnvelope> = serde_json::from_str(&text)?;
        if envelopes.len() != calls.len() {
            return Err(AlchemyError::InvalidResponse(format!(
                "batch of {} calls answered with {} responses",
                calls.len(),
                envelopes.len()
            )));
        }
        envelopes.sort_by_key(|envelope| envelope.id.unwrap_or(u64::MAX));

        Ok(envelopes)
    }

    async fn eth_call(
        &self,
        network: NetworkId,
        contract: Address,
        data: Vec<u8>,
    ) -> Result<U256, AlchemyError> {
        let result: String = self
            .rpc(
                network,
                "eth_call",
                json!([{ "to": contract, "data": Bytes::from(data) }, "latest"]),
            )
            .await?;
        quantity(&result)
    }

    async fn nft_get<T: DeserializeOwned>(
        &self,
        network: NetworkId,
        method: &str,
        query: &[(&str, String)],
    ) -> Result<T, AlchemyError> {
        let endpoints = self.endpoints(network)?;
        let url = endpoints.nft_method(method)?;
        debug!(network = %network, method, "fetching from Alchemy NFT API");

        let request = self
            .client
            .get(url)
            .query(query)
            .header("accept", "application/json");
        let response = self.send(request, self.config.timeout_seconds).await?;
        let text = response.text().await.map_err(AlchemyError::Http)?;

        Ok(serde_json::from_str(&text)?)
    }
}

fn quantity(value: &str) -> Result<U256, AlchemyError> {
    parse_quantity(value).map_err(|e| AlchemyError::InvalidResponse(e.to_string()))
}

/// Values the node declined to compute become `None`; transport failures propagate.
fn optional<T>(result: Result<T, AlchemyError>) -> Result<Option<T>, AlchemyError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(AlchemyError::Rpc { code, message }) => {
            debug!(code, reason = %message, "fee component unavailable");
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

fn transfer_params(query: &TransferQuery, direction: &str) -> Value {
    let mut filter = json!({
        "fromBlock": "0x0",
        "toBlock": "latest",
        "category": query.categories,
        "maxCount": format!("{:#x}", query.max_count),
        "order": "desc",
        "withMetadata": true,
        "excludeZeroValue": false,
    });
    filter[direction] = json!(query.address);
    if let Some(contract) = query.contract {
        filter["contractAddresses"] = json!([contract]);
    }
    json!([filter])
}

fn encode_call(selector: [u8; 4], argument: Option<Address>) -> Vec<u8> {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&selector);
    if let Some(argument) = argument {
        data.extend_from_slice(argument.into_word().as_slice());
    }
    data
}

impl EvmRpc for AlchemyClient {
    async fn native_balance(&self, network: NetworkId, address: Address) -> Result<U256, ApiError> {
        let balance: String = self
            .rpc(network, "eth_getBalance", json!([address, "latest"]))
            .await?;
        Ok(quantity(&balance)?)
    }

    async fn erc20_balance(
        &self,
        network: NetworkId,
        contract: Address,
        owner: Address,
    ) -> Result<U256, ApiError> {
        let data = encode_call(BALANCE_OF_SELECTOR, Some(owner));
        Ok(self.eth_call(network, contract, data).await?)
    }

    async fn erc20_decimals(&self, network: NetworkId, contract: Address) -> Result<u8, ApiError> {
        let data = encode_call(DECIMALS_SELECTOR, None);
        let value = self.eth_call(network, contract, data).await?;

        if value > U256::from(u8::MAX) {
            return Err(AlchemyError::InvalidResponse(format!(
                "decimals() returned {value} for {contract}"
            ))
            .into());
        }
        u8::try_from(value.as_limbs()[0]).map_err(|e| {
            ApiError::from(AlchemyError::InvalidResponse(format!(
                "decimals() out of range: {e}"
            )))
        })
    }

    async fn erc20_metadata(
        &self,
        network: NetworkId,
        contract: Address,
    ) -> Result<Erc20Metadata, ApiError> {
        let metadata: Option<Erc20Metadata> = self
            .rpc(network, "alchemy_getTokenMetadata", json!([contract]))
            .await?;
        metadata.ok_or_else(|| AlchemyError::NotFound.into())
    }

    async fn fee_data(&self, network: NetworkId) -> Result<FeeData, ApiError> {
        let (gas_price, block, priority) = tokio::join!(
            self.rpc::<String>(network, "eth_gasPrice", json!([])),
            self.rpc::<Option<BlockHeader>>(
                network,
                "eth_getBlockByNumber",
                json!(["latest", false])
            ),
            self.rpc::<String>(network, "eth_maxPriorityFeePerGas", json!([])),
        );

        let gas_price = optional(gas_price)?
            .map(|raw| quantity(&raw))
            .transpose()?;
        let base_fee = optional(block)?
            .flatten()
            .and_then(|header| header.base_fee_per_gas)
            .map(|raw| quantity(&raw))
            .transpose()?;
        let max_priority_fee_per_gas = optional(priority)?
            .map(|raw| quantity(&raw))
            .transpose()?;

        let max_fee_per_gas = base_fee
            .zip(max_priority_fee_per_gas)
            .map(|(base, tip)| base.saturating_mul(U256::from(2u8)).saturating_add(tip));

        debug!(
            network = %network,
            gas_price = ?gas_price,
            base_fee = ?base_fee,
            "fetched fee data"
        );

        Ok(FeeData {
            gas_price,
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }

    async fn asset_transfers(
        &self,
        network: NetworkId,
        query: TransferQuery,
    ) -> Result<TransferPage, ApiError> {
        let calls = [
            (
                "alchemy_getAssetTransfers",
                transfer_params(&query, "fromAddress"),
            ),
            (
                "alchemy_getAssetTransfers",
                transfer_params(&query, "toAddress"),
            ),
        ];
        let mut envelopes = self.rpc_batch(network, &calls).await?.into_iter();

        let (Some(outgoing), Some(incoming)) = (envelopes.next(), envelopes.next()) else {
            return Err(AlchemyError::InvalidResponse("incomplete transfer batch".to_string()).into());
        };
        let outgoing: TransfersResult = outgoing.into_result()?;
        let incoming: TransfersResult = incoming.into_result()?;

        info!(
            network = %network,
            outgoing = outgoing.transfers.len(),
            incoming = incoming.transfers.len(),
            "fetched asset transfers from Alchemy"
        );

        Ok(TransferPage {
            outgoing: outgoing.transfers,
            incoming: incoming.transfers,
            outgoing_page_key: outgoing.page_key,
            incoming_page_key: incoming.page_key,
        })
    }

    async fn owners_for_token(
        &self,
        network: NetworkId,
        contract: Address,
        token_id: &str,
    ) -> Result<Vec<String>, ApiError> {
        let response: TokenOwnersResponse = self
            .nft_get(
                network,
                "getOwnersForNFT",
                &[
                    ("contractAddress", contract.to_string()),
                    ("tokenId", token_id.to_string()),
                ],
            )
            .await?;
        Ok(response.owners)
    }

    async fn owners_for_contract(
        &self,
        network: NetworkId,
        contract: Address,
    ) -> Result<Vec<ContractOwner>, ApiError> {
        let response: ContractOwnersResponse = self
            .nft_get(
                network,
                "getOwnersForContract",
                &[
                    ("contractAddress", contract.to_string()),
                    ("withTokenBalances", "true".to_string()),
                ],
            )
            .await?;
        Ok(response.owners)
    }

    async fn nfts_for_owner(
        &self,
        network: NetworkId,
        owner: Address,
        contract: Option<Address>,
    ) -> Result<OwnedNfts, ApiError> {
        let mut query = vec![
            ("owner", owner.to_string()),
            ("withMetadata", "true".to_string()),
        ];
        if let Some(contract) = contract {
            query.push(("contractAddresses[]", contract.to_string()));
        }

        Ok(self.nft_get(network, "getNFTsForOwner", &query).await?)
    }

    async fn nft_metadata(
        &self,
        network: NetworkId,
        contract: Address,
        token_id: &str,
    ) -> Result<Nft, ApiError> {
        Ok(self
            .nft_get(
                network,
                "getNFTMetadata",
                &[
                    ("contractAddress", contract.to_string()),
                    ("tokenId", token_id.to_string()),
                ],
            )
            .await?)
    }

    async fn contract_metadata(
        &self,
        network: NetworkId,
        contract: Address,
    ) -> Result<NftContract, ApiError> {
        Ok(self
            .nft_get(
                network,
                "getContractMetadata",
                &[("contractAddress", contract.to_string())],
            )
            .await?)
    }
}

impl ApiClient for AlchemyClient {
    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        if self.api_key.is_none() {
            return Ok(HealthStatus::Degraded {
                reason: "API key not configured".to_string(),
            });
        }

        let endpoints = self.endpoints(NetworkId::Ethereum)?;
        debug!("performing health check on Alchemy API");

        let request = self.client.post(endpoints.rpc.clone()).json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_blockNumber",
            "params": [],
        }));

        let start_time = Instant::now();
        match self
            .send(request, self.config.health_check_timeout_seconds)
            .await
        {
            Ok(_) => {
                info!(
                    "Alchemy API health check passed in {:?}",
                    start_time.elapsed()
                );
                Ok(HealthStatus::Up)
            }
            Err(AlchemyError::Unauthorized) => {
                warn!("Alchemy API health check failed: unauthorized");
                Ok(HealthStatus::Down {
                    reason: "Authentication failed".to_string(),
                })
            }
            Err(AlchemyError::RateLimited) => {
                warn!("Alchemy API health check failed: rate limited");
                Ok(HealthStatus::Degraded {
                    reason: "Rate limited".to_string(),
                })
            }
            Err(AlchemyError::ApiError { status, .. }) => {
                warn!("Alchemy API health check failed with status: {}", status);
                Ok(HealthStatus::Degraded {
                    reason: format!("API returned status {status}"),
                })
            }
            Err(error) => Err(error.into()),
        }
    }

    fn name(&self) -> &'static str {
        "alchemy"
    }
}
