// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Service errors and their envelope form
//!
//! Errors never leave the service as `Err`. [`respond`] is applied at every
//! operation boundary and turns the outcome into an [`ApiResponse`] with a
//! stable [`ErrorCode`].

use std::time::Instant;

use api_client::ApiError;
use serde_json::{Value, json};
use shared_types::{ApiResponse, AssetIdError, AssetType, ErrorCode, NetworkError, UnitError};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{metrics, routing::Operation};

/// Result type alias for dispatched operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Everything that can go wrong while answering an operation
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ServiceError {
    /// Asset identifier could not be parsed
    #[error(transparent)]
    AssetId(#[from] AssetIdError),

    /// Network unknown or lacking a provider alias
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Operation has no meaning on the network
    #[error("{operation} is not supported on network {network}")]
    UnsupportedOperation {
        operation: Operation,
        network: String,
    },

    /// Asset kind has no handling branch for the operation
    #[error("{operation} is not supported for {asset_type} assets")]
    UnsupportedAssetType {
        operation: Operation,
        asset_type: AssetType,
    },

    /// Address is malformed for the network
    #[error("invalid address {address:?} for network {network}")]
    InvalidAddress { address: String, network: String },

    /// Request parameter out of range
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Upstream amount could not be converted
    #[error("malformed upstream amount: {0}")]
    Amount(#[from] UnitError),

    /// Upstream provider failed
    #[error(transparent)]
    Upstream(#[from] ApiError),
}

impl ServiceError {
    /// Shorthand for [`ServiceError::InvalidParameter`]
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Stable code reported for this error while answering `operation`
    pub fn code(&self, operation: Operation) -> ErrorCode {
        match self {
            Self::AssetId(AssetIdError::InvalidFormat { .. }) => ErrorCode::InvalidFormat,
            Self::AssetId(AssetIdError::UnsupportedNamespace { .. }) => {
                ErrorCode::UnsupportedNamespace
            }
            Self::Network(_) => ErrorCode::NotFound,
            Self::UnsupportedOperation { .. } => ErrorCode::UnsupportedOperation,
            Self::UnsupportedAssetType { .. } => ErrorCode::UnsupportedAssetType,
            Self::InvalidAddress { .. } => ErrorCode::InvalidAddress,
            Self::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            Self::Upstream(ApiError::MissingCredential { .. }) => ErrorCode::MissingCredential,
            Self::Upstream(ApiError::UnsupportedNetwork { .. }) => ErrorCode::NotFound,
            Self::Upstream(ApiError::Configuration { .. }) => ErrorCode::InternalError,
            Self::Upstream(_) | Self::Amount(_) => operation.fetch_error_code(),
        }
    }

    /// Structured detail carried in the envelope
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::Upstream(error) => error.details(),
            Self::InvalidParameter { name, .. } => Some(json!({ "parameter": name })),
            Self::UnsupportedAssetType { asset_type, .. } => {
                Some(json!({ "assetType": asset_type }))
            }
            _ => None,
        }
    }
}

/// Converts an operation outcome into the response envelope
///
/// Also counts the outcome and logs failures: upstream failures at `warn`,
/// internal ones at `error`, caller mistakes at `debug`.
pub fn respond<T>(
    operation: Operation,
    started: Instant,
    result: ServiceResult<T>,
) -> ApiResponse<T> {
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    match result {
        Ok(data) => {
            metrics::record_operation(operation.as_str(), "success");
            debug!(operation = %operation, elapsed_ms, "operation succeeded");
            ApiResponse::ok(data)
        }
        Err(e) => {
            let code = e.code(operation);
            metrics::record_operation(operation.as_str(), code.as_str());

            if code == ErrorCode::InternalError {
                error!(operation = %operation, code = %code, error = %e, "operation failed");
            } else if code.is_upstream() || code == ErrorCode::MissingCredential {
                warn!(operation = %operation, code = %code, error = %e, elapsed_ms, "operation failed");
            } else {
                debug!(operation = %operation, code = %code, error = %e, "operation rejected");
            }

            ApiResponse::err(code, e.to_string(), e.details())
        }
    }
}
