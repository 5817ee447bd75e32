// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Error handling module
//!
//! Server lifecycle errors, plus the mapping from envelope error codes to
//! HTTP status codes. Both render as the standard response envelope.

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared_types::{ApiResponse, ErrorCode};
use thiserror::Error;

/// Error types for server operations
#[derive(Error, Debug)]
pub enum ServerError {
    /// Configuration validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Network binding errors
    #[error("Failed to bind to {address}: {source}")]
    Bind {
        /// Socket address that failed to bind
        address: SocketAddr,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server startup errors
    #[error("Server startup failed: {source}")]
    Startup {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Server shutdown errors
    #[error("Server shutdown failed: {source}")]
    Shutdown {
        /// Underlying IO error
        source: std::io::Error,
    },

    /// An upstream client could not be built
    #[error("Provider {provider} could not be initialized: {message}")]
    Provider {
        /// Provider name
        provider: &'static str,
        /// Error message
        message: String,
    },

    /// JSON parsing errors with detailed context
    #[error("Invalid JSON request: {message}")]
    JsonError {
        /// Detailed error message
        message: String,
    },

    /// Query string or path segment could not be decoded
    #[error("Invalid request parameter: {message}")]
    InvalidParameter {
        /// Detailed error message
        message: String,
    },
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    /// Envelope code reported for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::JsonError { .. } | Self::InvalidParameter { .. } => ErrorCode::InvalidParameter,
            Self::Config { .. }
            | Self::Bind { .. }
            | Self::Startup { .. }
            | Self::Shutdown { .. }
            | Self::Provider { .. } => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let code = self.code();
        let body = ApiResponse::<()>::err(code, self.to_string(), None);
        (status_for(code), Json(body)).into_response()
    }
}

/// HTTP status for a failed envelope
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidFormat
        | ErrorCode::UnsupportedNamespace
        | ErrorCode::InvalidParameter
        | ErrorCode::InvalidAddress => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::UnsupportedOperation | ErrorCode::UnsupportedAssetType => {
            StatusCode::NOT_IMPLEMENTED
        }
        ErrorCode::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        code if code.is_upstream() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Envelope rendered with the status its error code maps to
#[derive(Debug)]
pub struct Envelope<T>(pub ApiResponse<T>);

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = self.0.error_code().map_or(StatusCode::OK, status_for);
        (status, Json(self.0)).into_response()
    }
}

impl<T> From<ApiResponse<T>> for Envelope<T> {
    fn from(response: ApiResponse<T>) -> Self {
        Self(response)
    }
}
