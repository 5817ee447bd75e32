// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! CoinGecko API integration
//!
//! Implements [`PriceFeed`] with the `simple` and `market_chart` endpoints.
//! An API key is optional; without one the public rate limits apply.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use api_client::{ApiClient, ApiError, HealthStatus, PriceFeed, PricePoint, PriceQuote};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::non_empty_string::NonEmptyString;

// CoinGecko API constants
const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const DEFAULT_COINGECKO_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_COINGECKO_HEALTH_CHECK_TIMEOUT_SECONDS: u64 = 5;
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Configuration for the CoinGecko API client
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// Demo API key, sent as `x-cg-demo-api-key` when present
    pub api_key: Option<String>,
    /// Base URL of the v3 API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Health check timeout in seconds
    pub health_check_timeout_seconds: u64,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_COINGECKO_BASE_URL.to_string(),
            timeout_seconds: DEFAULT_COINGECKO_TIMEOUT_SECONDS,
            health_check_timeout_seconds: DEFAULT_COINGECKO_HEALTH_CHECK_TIMEOUT_SECONDS,
        }
    }
}

/// Errors specific to the CoinGecko API client
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum CoinGeckoError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// API returned an error response
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// No price is listed for the coin or contract
    #[error("No {currency} price listed for {id}")]
    PriceNotListed { id: String, currency: String },

    /// Coin or contract unknown to CoinGecko
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Authentication failed
    #[error("Authentication failed")]
    Unauthorized,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Timeout error
    #[error("Request timeout")]
    Timeout { seconds: u64 },
}

impl From<CoinGeckoError> for ApiError {
    fn from(value: CoinGeckoError) -> Self {
        match value {
            CoinGeckoError::Http(error) => ApiError::Http {
                message: error.to_string(),
            },
            CoinGeckoError::Json(error) => ApiError::InvalidResponse {
                message: error.to_string(),
            },
            CoinGeckoError::ApiError { status, message } => ApiError::Upstream { status, message },
            CoinGeckoError::PriceNotListed { .. } | CoinGeckoError::NotFound(_) => {
                ApiError::NotFound {
                    message: value.to_string(),
                }
            }
            CoinGeckoError::RateLimited => ApiError::RateLimitExceeded {
                retry_after_seconds: 60,
            },
            CoinGeckoError::Unauthorized => ApiError::Authentication {
                message: value.to_string(),
            },
            CoinGeckoError::Config(message) => ApiError::Configuration { message },
            CoinGeckoError::Timeout { seconds } => ApiError::Timeout {
                timeout_seconds: seconds,
            },
        }
    }
}

/// `simple/price` and `simple/token_price` answer keyed by id, then by field
type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(f64, f64)>,
}

/// CoinGecko API client implementation
#[derive(Debug)]
pub struct CoinGeckoClient {
    client: Client,
    config: CoinGeckoConfig,
    api_key: Option<NonEmptyString>,
}

impl CoinGeckoClient {
    /// Create a new CoinGecko API client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or the base URL is blank
    pub fn new(config: CoinGeckoConfig) -> Result<Self, CoinGeckoError> {
        if config.base_url.trim().is_empty() {
            return Err(CoinGeckoError::Config(
                "Base URL cannot be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("asset-gateway/0.1.0")
            .build()
            .map_err(CoinGeckoError::Http)?;

        let api_key = NonEmptyString::optional(config.api_key.clone());

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn request(&self, path: &str, seconds: u64) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let request = self
            .client
            .get(url)
            .timeout(Duration::from_secs(seconds))
            .header("accept", "application/json");
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key.as_str()),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CoinGeckoError> {
        debug!(path, ?query, "fetching from CoinGecko");

        let request = self.request(path, self.config.timeout_seconds).query(query);
        let response = timeout(
            Duration::from_secs(self.config.timeout_seconds),
            request.send(),
        )
        .await
        .map_err(|_| CoinGeckoError::Timeout {
            seconds: self.config.timeout_seconds,
        })?
        .map_err(CoinGeckoError::Http)?;

        match response.status() {
            StatusCode::OK => {
                let text = response.text().await.map_err(CoinGeckoError::Http)?;
                Ok(serde_json::from_str(&text)?)
            }
            StatusCode::NOT_FOUND => Err(CoinGeckoError::NotFound(path.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CoinGeckoError::Unauthorized),
            StatusCode::TOO_MANY_REQUESTS => Err(CoinGeckoError::RateLimited),
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                warn!(
                    status = status.as_u16(),
                    error = error_text,
                    "CoinGecko API error"
                );
                Err(CoinGeckoError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    async fn quote(
        &self,
        path: &str,
        id_param: &str,
        id: &str,
        currency: &str,
    ) -> Result<PriceQuote, CoinGeckoError> {
        let response: SimplePriceResponse = self
            .get(
                path,
                &[
                    (id_param, id.to_string()),
                    ("vs_currencies", currency.to_string()),
                    ("include_24hr_change", "true".to_string()),
                    ("include_24hr_vol", "true".to_string()),
                    ("include_market_cap", "true".to_string()),
                ],
            )
            .await?;

        let not_listed = || CoinGeckoError::PriceNotListed {
            id: id.to_string(),
            currency: currency.to_string(),
        };
        // contract keys come back lowercased
        let fields = response
            .get(id)
            .or_else(|| response.get(&id.to_lowercase()))
            .ok_or_else(not_listed)?;
        let field = |suffix: &str| fields.get(&format!("{currency}{suffix}")).copied().flatten();

        Ok(PriceQuote {
            price: field("").ok_or_else(not_listed)?,
            change_24h: field("_24h_change"),
            volume_24h: field("_24h_vol"),
            market_cap: field("_market_cap"),
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn chart(
        &self,
        path: &str,
        currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, CoinGeckoError> {
        let response: MarketChartResponse = self
            .get(
                path,
                &[
                    ("vs_currency", currency.to_string()),
                    ("days", days.to_string()),
                ],
            )
            .await?;

        Ok(response
            .prices
            .into_iter()
            .map(|(timestamp, price)| PricePoint {
                timestamp: timestamp as i64,
                price,
            })
            .collect())
    }
}

impl PriceFeed for CoinGeckoClient {
    async fn simple_price(&self, coin_id: &str, currency: &str) -> Result<PriceQuote, ApiError> {
        Ok(self
            .quote("/simple/price", "ids", coin_id, currency)
            .await?)
    }

    async fn token_price(
        &self,
        platform: &str,
        contract: &str,
        currency: &str,
    ) -> Result<PriceQuote, ApiError> {
        let path = format!("/simple/token_price/{platform}");
        Ok(self
            .quote(&path, "contract_addresses", contract, currency)
            .await?)
    }

    async fn market_chart(
        &self,
        coin_id: &str,
        currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, ApiError> {
        let path = format!("/coins/{coin_id}/market_chart");
        Ok(self.chart(&path, currency, days).await?)
    }

    async fn contract_market_chart(
        &self,
        platform: &str,
        contract: &str,
        currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, ApiError> {
        let path = format!("/coins/{platform}/contract/{contract}/market_chart");
        Ok(self.chart(&path, currency, days).await?)
    }
}

impl ApiClient for CoinGeckoClient {
    async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        debug!("performing health check on CoinGecko API");

        let seconds = self.config.health_check_timeout_seconds;
        let start_time = Instant::now();
        let response = timeout(
            Duration::from_secs(seconds),
            self.request("/ping", seconds).send(),
        )
        .await
        .map_err(|_| CoinGeckoError::Timeout { seconds })?
        .map_err(CoinGeckoError::Http)?;

        let response_time = start_time.elapsed();

        match response.status() {
            StatusCode::OK => {
                info!("CoinGecko API health check passed in {:?}", response_time);
                Ok(HealthStatus::Up)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("CoinGecko API health check failed: unauthorized");
                Ok(HealthStatus::Down {
                    reason: "Authentication failed".to_string(),
                })
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("CoinGecko API health check failed: rate limited");
                Ok(HealthStatus::Degraded {
                    reason: "Rate limited".to_string(),
                })
            }
            status => {
                warn!("CoinGecko API health check failed with status: {}", status);
                Ok(HealthStatus::Degraded {
                    reason: format!("API returned status {}", status.as_u16()),
                })
            }
        }
    }

    fn name(&self) -> &'static str {
        "coingecko"
    }
}
