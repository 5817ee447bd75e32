// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Uniform response envelope
//!
//! Every gateway operation answers with an [`ApiResponse`], whether the
//! upstream call succeeded or not. Exactly one of `data` and `error` is set,
//! which the two constructors guarantee.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

/// Stable machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Asset identifier matches no accepted grammar
    InvalidFormat,
    /// CAIP asset namespace is not supported
    UnsupportedNamespace,
    /// Unknown network or provider alias
    NotFound,
    /// Required upstream credential is not configured
    MissingCredential,
    /// Operation has no meaning for the resolved network
    UnsupportedOperation,
    /// Resolved asset type has no handling branch
    UnsupportedAssetType,
    /// Address is not well formed for the network
    InvalidAddress,
    /// Request parameter is out of range
    InvalidParameter,
    /// Upstream failure outside a named operation
    UpstreamFetchError,
    /// Balance lookup failed upstream
    BalanceFetchError,
    /// Gas price lookup failed upstream
    GasFetchError,
    /// Price lookup failed upstream
    PriceFetchError,
    /// Price history lookup failed upstream
    PriceHistoryFetchError,
    /// Transaction history lookup failed upstream
    HistoryFetchError,
    /// NFT ownership lookup failed upstream
    NftOwnersFetchError,
    /// NFTs-for-owner lookup failed upstream
    NftsFetchError,
    /// Token metadata lookup failed upstream
    TokenMetadataFetchError,
    /// NFT metadata lookup failed upstream
    NftMetadataFetchError,
    /// Portfolio valuation failed upstream
    PortfolioFetchError,
    /// Unexpected failure inside the gateway
    InternalError,
}

impl ErrorCode {
    /// Returns the serialized form of the code
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::UnsupportedNamespace => "UNSUPPORTED_NAMESPACE",
            Self::NotFound => "NOT_FOUND",
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            Self::UnsupportedAssetType => "UNSUPPORTED_ASSET_TYPE",
            Self::InvalidAddress => "INVALID_ADDRESS",
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::UpstreamFetchError => "UPSTREAM_FETCH_ERROR",
            Self::BalanceFetchError => "BALANCE_FETCH_ERROR",
            Self::GasFetchError => "GAS_FETCH_ERROR",
            Self::PriceFetchError => "PRICE_FETCH_ERROR",
            Self::PriceHistoryFetchError => "PRICE_HISTORY_FETCH_ERROR",
            Self::HistoryFetchError => "HISTORY_FETCH_ERROR",
            Self::NftOwnersFetchError => "NFT_OWNERS_FETCH_ERROR",
            Self::NftsFetchError => "NFTS_FETCH_ERROR",
            Self::TokenMetadataFetchError => "TOKEN_METADATA_FETCH_ERROR",
            Self::NftMetadataFetchError => "NFT_METADATA_FETCH_ERROR",
            Self::PortfolioFetchError => "PORTFOLIO_FETCH_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether the code reports an upstream provider failure
    pub const fn is_upstream(self) -> bool {
        matches!(
            self,
            Self::UpstreamFetchError
                | Self::BalanceFetchError
                | Self::GasFetchError
                | Self::PriceFetchError
                | Self::PriceHistoryFetchError
                | Self::HistoryFetchError
                | Self::NftOwnersFetchError
                | Self::NftsFetchError
                | Self::TokenMetadataFetchError
                | Self::NftMetadataFetchError
                | Self::PortfolioFetchError
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error half of the envelope
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Stable error code
    pub code: ErrorCode,
    /// Human readable description
    pub message: String,
    /// Raw upstream detail, when one was available
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

/// Response envelope shared by every operation
///
/// Fields are private so an envelope can only come from [`ApiResponse::ok`]
/// or [`ApiResponse::err`].
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether `data` is populated
    success: bool,
    /// Operation result on success
    data: Option<T>,
    /// Failure description otherwise
    error: Option<ErrorBody>,
    /// Milliseconds since the Unix epoch at construction time
    timestamp: i64,
}

impl<T> ApiResponse<T> {
    /// Successful envelope carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: now_millis(),
        }
    }

    /// Failed envelope
    pub fn err(code: ErrorCode, message: impl Into<String>, details: Option<Value>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code,
                message: message.into(),
                details,
            }),
            timestamp: now_millis(),
        }
    }

    /// Whether the operation succeeded
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Payload of a successful envelope
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Consumes the envelope, yielding the payload of a success
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Failure description of a failed envelope
    pub fn error(&self) -> Option<&ErrorBody> {
        self.error.as_ref()
    }

    /// Consumes the envelope, yielding the failure description
    pub fn into_error(self) -> Option<ErrorBody> {
        self.error
    }

    /// Milliseconds since the Unix epoch at construction time
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Error code of a failed envelope
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.error.as_ref().map(|error| error.code)
    }

    /// Re-wraps a failure for a different payload type
    ///
    /// Returns `None` for successful envelopes.
    pub fn into_failure<U>(self) -> Option<ApiResponse<U>> {
        let error = self.error?;
        Some(ApiResponse {
            success: false,
            data: None,
            error: Some(error),
            timestamp: self.timestamp,
        })
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
