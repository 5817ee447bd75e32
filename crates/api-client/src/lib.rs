// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Upstream provider interfaces for the asset gateway
//!
//! This crate describes what the gateway consumes from its upstream data
//! providers, without saying how any of them is reached.
//!
//! # Core Abstractions
//!
//! - **`ApiClient` Trait**: health reporting shared by every upstream client
//! - **Provider Traits**: [`EvmRpc`], [`UtxoLedger`] and [`PriceFeed`], one per upstream family
//! - **Error Handling**: [`ApiError`] classifies transport, authentication and upstream failures
//! - **Data Types**: raw upstream records before any unit conversion
//!
//! All operations return `impl Future + Send` so callers can hold clients
//! behind `Arc` and join calls across tasks.

use serde_json::{Value, json};
use shared_types::NetworkId;
use thiserror::Error;

pub mod health;
pub mod providers;
pub mod types;

pub use health::*;
pub use providers::*;
pub use types::*;

/// Common behaviour of every upstream client
pub trait ApiClient: Send + Sync {
    /// Check the health of this API client
    ///
    /// # Errors
    ///
    /// Returns an error if the health probe could not be sent at all
    fn health_check(&self) -> impl Future<Output = Result<HealthStatus, ApiError>> + Send;

    /// Get the name/identifier of this API client
    fn name(&self) -> &'static str;
}

/// Common errors that can occur when working with API clients
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {message}")]
    Http { message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    /// Authentication failed
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Invalid response format
    #[error("Invalid response format: {message}")]
    InvalidResponse { message: String },

    /// Upstream answered with a non-success status
    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// JSON-RPC error object
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Upstream has no record of the requested entity
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Required credential is not configured
    #[error("Missing credential for {provider}")]
    MissingCredential { provider: &'static str },

    /// Provider has no endpoint for the network
    #[error("{provider} does not serve network {network}")]
    UnsupportedNetwork {
        network: NetworkId,
        provider: &'static str,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Network timeout
    #[error("Request timeout after {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },
}

impl ApiError {
    /// Raw upstream detail suitable for an error envelope
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::Upstream { status, message } => Some(json!({
                "status": status,
                "message": message,
            })),
            Self::Rpc { code, message } => Some(json!({
                "rpcCode": code,
                "message": message,
            })),
            Self::RateLimitExceeded {
                retry_after_seconds,
            } => Some(json!({
                "status": 429,
                "retryAfterSeconds": retry_after_seconds,
            })),
            Self::Timeout { timeout_seconds } => Some(json!({
                "timeoutSeconds": timeout_seconds,
            })),
            Self::Http { message }
            | Self::Authentication { message }
            | Self::InvalidResponse { message }
            | Self::NotFound { message } => Some(json!({ "message": message })),
            Self::MissingCredential { .. }
            | Self::UnsupportedNetwork { .. }
            | Self::Configuration { .. } => None,
        }
    }
}
