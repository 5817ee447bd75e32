// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Esplora API integration
//!
//! Implements [`UtxoLedger`] against an Esplora-compatible Bitcoin indexer
//! such as Blockstream or mempool.space. The API is unauthenticated.

use std::time::{Duration, Instant};

use api_client::{AddressStats, ApiClient, ApiError, HealthStatus, UtxoLedger, UtxoTransaction};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::non_empty_string::NonEmptyString;

// Esplora API constants
const DEFAULT_ESPLORA_BASE_URL: &str = "https://blockstream.info/api";
const DEFAULT_ESPLORA_TIMEOUT_SECONDS: u64 = 20;
const DEFAULT_ESPLORA_HEALTH_CHECK_TIMEOUT_SECONDS: u64 = 5;

/// Configuration for the Esplora API client
/// This type is always valid by construction.
#[derive(Debug, Clone)]
pub struct EsploraConfig {
    /// Base URL of the indexer, without a trailing slash
    pub base_url: NonEmptyString,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Health check timeout in seconds
    pub health_check_timeout_seconds: u64,
}

impl EsploraConfig {
    /// Create a new `EsploraConfig` with validation
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Result<Self, String> {
        let base_url = base_url.into();
        Ok(Self {
            base_url: NonEmptyString::new(base_url.trim_end_matches('/'))?,
            timeout_seconds,
            health_check_timeout_seconds: DEFAULT_ESPLORA_HEALTH_CHECK_TIMEOUT_SECONDS
                .min(timeout_seconds.max(1)),
        })
    }

    /// Configuration pointing at the public Blockstream instance
    pub fn blockstream() -> Result<Self, String> {
        Self::new(DEFAULT_ESPLORA_BASE_URL, DEFAULT_ESPLORA_TIMEOUT_SECONDS)
    }
}

/// Errors specific to the Esplora API client
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum EsploraError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Address or transaction is unknown to the indexer
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Timeout error
    #[error("Request timeout")]
    Timeout { seconds: u64 },
}

impl From<EsploraError> for ApiError {
    fn from(value: EsploraError) -> Self {
        match value {
            EsploraError::Http(error) => ApiError::Http {
                message: error.to_string(),
            },
            EsploraError::Json(error) => ApiError::InvalidResponse {
                message: error.to_string(),
            },
            EsploraError::ApiError { status, message } => ApiError::Upstream { status, message },
            EsploraError::NotFound { path } => ApiError::NotFound { message: path },
            EsploraError::RateLimited => ApiError::RateLimitExceeded {
                retry_after_seconds: 1,
            },
            EsploraError::Timeout { seconds } => ApiError::Timeout {
                timeout_seconds: seconds,
            },
        }
    }
}

/// Esplora API client implementation
#[derive(Debug)]
pub struct EsploraClient {
    client: Client,
    config: EsploraConfig,
}

impl EsploraClient {
    /// Create a new Esplora API client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: EsploraConfig) -> Result<Self, EsploraError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("asset-gateway/0.1.0")
            .build()
            .map_err(EsploraError::Http)?;

        Ok(Self { client, config })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, EsploraError> {
        let url = format!("{}{path}", self.config.base_url);
        debug!(url, "fetching from Esplora");

        let response = timeout(
            Duration::from_secs(self.config.timeout_seconds),
            self.client.get(&url).send(),
        )
        .await
        .map_err(|_| EsploraError::Timeout {
            seconds: self.config.timeout_seconds,
        })?
        .map_err(EsploraError::Http)?;

        match response.status() {
            StatusCode::OK => {
                let text = response.text().await.map_err(EsploraError::Http)?;
                Ok(serde_json::from_str(&text)?)
            }
            StatusCode::NOT_FOUND => Err(EsploraError::NotFound {
                path: path.to_string(),
            }),
            StatusCode::TOO_MANY_REQUESTS => Err(EsploraError::RateLimited),
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                warn!(
                    status = status.as_u16(),
                    error = error_text,
                    "Esplora API error"
                );
                Err(EsploraError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }
}

impl UtxoLedger for EsploraClient {
    async fn address_stats(&self, address: &str) -> Result<AddressStats, ApiError> {
        Ok(self.get(&format!("/address/{address}")).await?)
    }

    async fn address_transactions(
        &self,
        address: &str,
        after_txid: Option<&str>,
    ) -> Result<Vec<UtxoTransaction>, ApiError> {
        let path = match after_txid {
            Some(last_seen) => format!("/address/{address}/txs/chain/{last_seen}"),
            None => format!("/address/{address}/txs"),
        };
        let transactions: Vec<UtxoTransaction> = self.get(&path).await?;
        debug!(
            address,
            count = transactions.len(),
            "fetched address transactions from Esplora"
        );
        Ok(transactions)
    }

    async fn transaction(&self, txid: &str) -> Result<UtxoTransaction, ApiError> {
        Ok(self.get(&format!("/tx/{txid}")).await?)
    }
}

impl ApiClient for EsploraClient {
    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        let url = format!("{}/blocks/tip/height", self.config.base_url);
        debug!(url, "performing health check on Esplora API");

        let start_time = Instant::now();
        let response = timeout(
            Duration::from_secs(self.config.health_check_timeout_seconds),
            self.client.get(&url).send(),
        )
        .await
        .map_err(|_| EsploraError::Timeout {
            seconds: self.config.health_check_timeout_seconds,
        })?
        .map_err(EsploraError::Http)?;

        let response_time = start_time.elapsed();

        match response.status() {
            StatusCode::OK => {
                info!("Esplora API health check passed in {:?}", response_time);
                Ok(HealthStatus::Up)
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Esplora API health check failed: rate limited");
                Ok(HealthStatus::Degraded {
                    reason: "Rate limited".to_string(),
                })
            }
            status => {
                warn!("Esplora API health check failed with status: {}", status);
                Ok(HealthStatus::Degraded {
                    reason: format!("API returned status {}", status.as_u16()),
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "esplora"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_trims_trailing_slash() {
        let config = EsploraConfig::new("https://mempool.space/api/", 10).unwrap();
        assert_eq!(config.base_url.as_str(), "https://mempool.space/api");
        assert_eq!(config.health_check_timeout_seconds, 5);
    }

    #[test]
    fn config_rejects_blank_url() {
        assert!(EsploraConfig::new("  ", 10).is_err());
    }

    #[test]
    fn health_timeout_never_exceeds_request_timeout() {
        let config = EsploraConfig::new("http://localhost", 2).unwrap();
        assert_eq!(config.health_check_timeout_seconds, 2);
    }

    #[test]
    fn default_instance() {
        let config = EsploraConfig::blockstream().unwrap();
        assert_eq!(config.base_url.as_str(), DEFAULT_ESPLORA_BASE_URL);
        assert!(EsploraClient::new(config).is_ok());
    }

    #[test]
    fn error_conversion() {
        assert!(matches!(
            ApiError::from(EsploraError::NotFound {
                path: "/tx/abc".to_string()
            }),
            ApiError::NotFound { .. }
        ));
        assert!(matches!(
            ApiError::from(EsploraError::ApiError {
                status: 400,
                message: "Invalid Bitcoin address".to_string()
            }),
            ApiError::Upstream { status: 400, .. }
        ));
    }
}
