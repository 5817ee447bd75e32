// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Custom extractors for improved error handling
//!
//! Better messages than the stock Axum extractors for JSON bodies and
//! query strings, rendered through [`ServerError`] as failed envelopes.

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ServerError;

mod error_hints {
    pub const HOLDING_SHAPE: &str =
        "each holding must be an object with string fields \"address\" and \"assetId\"";
    pub const MISSING_COMMA: &str =
        "check for missing or extra commas between object properties or array elements";
    pub const MISSING_BRACE: &str = "check for missing closing brace '}' for JSON object";
    pub const MISSING_BRACKET: &str = "check for missing closing bracket ']' for JSON array";
    pub const MISSING_QUOTES: &str =
        "check for missing or improperly escaped quotes around string values";
    pub const CONTROL_CHARS: &str = "JSON contains invalid control characters that must be escaped";
    pub const EXPECTED_VALUE: &str =
        "expected a valid JSON value (string, number, boolean, null, object, or array)";
    pub const DEFAULT_SYNTAX: &str = "check JSON formatting and structure";
    pub const EMPTY_BODY: &str = "request body is empty, expected valid JSON";
    pub const TRUNCATED_JSON: &str =
        "unexpected end of JSON input, request appears to be truncated";
}

const MAX_JSON_PAYLOAD_SIZE: usize = 1024 * 1024; // 1MB limit

/// JSON body extractor with detailed error messages
#[derive(Debug)]
pub struct JsonExtractor<T>(pub T);

impl<T, S> FromRequest<S> for JsonExtractor<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(content_type) = req.headers().get("content-type")
            && let Ok(content_type_str) = content_type.to_str()
            && !content_type_str.starts_with("application/json")
        {
            return Err(ServerError::JsonError {
                message: format!(
                    "invalid content-type: expected 'application/json', got '{content_type_str}'"
                ),
            });
        }

        let bytes = axum::body::Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ServerError::JsonError {
                message: format!("failed to read request body: {rejection}"),
            })?;

        if bytes.len() > MAX_JSON_PAYLOAD_SIZE {
            return Err(ServerError::JsonError {
                message: format!(
                    "request body too large: {} bytes (max: {} bytes)",
                    bytes.len(),
                    MAX_JSON_PAYLOAD_SIZE
                ),
            });
        }

        if bytes.is_empty() {
            return Err(ServerError::JsonError {
                message: error_hints::EMPTY_BODY.to_string(),
            });
        }

        serde_json::from_slice::<T>(&bytes)
            .map(JsonExtractor)
            .map_err(|err| ServerError::JsonError {
                message: describe_json_error(&err, &bytes),
            })
    }
}

fn describe_json_error(err: &serde_json::Error, raw_json: &[u8]) -> String {
    if err.is_syntax() {
        format!(
            "invalid JSON syntax at line {}, column {}: {}",
            err.line(),
            err.column(),
            get_json_syntax_hint(err)
        )
    } else if err.is_data() {
        format!(
            "JSON data validation failed: {}",
            get_data_validation_hint_with_context(err, raw_json)
        )
    } else if err.is_eof() {
        error_hints::TRUNCATED_JSON.to_string()
    } else {
        format!("JSON parsing error: {err}")
    }
}

/// Query string extractor whose rejection is a failed envelope
#[derive(Debug)]
pub struct QueryExtractor<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryExtractor<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection| ServerError::InvalidParameter {
                message: rejection.body_text(),
            })
    }
}

fn get_json_syntax_hint(err: &serde_json::Error) -> &'static str {
    let err_msg = err.to_string();

    if err_msg.contains("expected ','") || err_msg.contains("trailing comma") {
        error_hints::MISSING_COMMA
    } else if err_msg.contains("expected '}'") {
        error_hints::MISSING_BRACE
    } else if err_msg.contains("expected ']'") {
        error_hints::MISSING_BRACKET
    } else if err_msg.contains("expected '\"'") {
        error_hints::MISSING_QUOTES
    } else if err_msg.contains("control character") {
        error_hints::CONTROL_CHARS
    } else if err_msg.contains("expected value") {
        error_hints::EXPECTED_VALUE
    } else {
        error_hints::DEFAULT_SYNTAX
    }
}

/// Points at the malformed holdings when the body is a portfolio request
fn get_data_validation_hint_with_context(err: &serde_json::Error, raw_json: &[u8]) -> String {
    if let Some(malformed) = find_malformed_holdings(raw_json)
        && !malformed.is_empty()
    {
        let positions: Vec<String> = malformed.iter().map(ToString::to_string).collect();
        return format!(
            "malformed holdings at positions [{}]. {}",
            positions.join(", "),
            error_hints::HOLDING_SHAPE
        );
    }

    get_data_validation_hint(err)
}

fn get_data_validation_hint(err: &serde_json::Error) -> String {
    let err_msg = err.to_string();

    if err_msg.contains("invalid type") {
        if err_msg.contains("expected a string") {
            "expected a string value, but received a different data type".to_string()
        } else if err_msg.contains("expected a sequence") {
            "expected an array, but received a different data type".to_string()
        } else if err_msg.contains("expected struct") || err_msg.contains("expected a map") {
            "expected a JSON object, but received a different data type".to_string()
        } else {
            format!("data type mismatch: {err_msg}")
        }
    } else if err_msg.contains("missing field") {
        format!("required field is missing: {err_msg}")
    } else if err_msg.contains("unknown field") {
        format!("unrecognized field found: {err_msg}")
    } else {
        err_msg
    }
}

/// Indices of `holdings` entries lacking a string `address` or `assetId`
fn find_malformed_holdings(raw_json: &[u8]) -> Option<Vec<usize>> {
    let json_value: serde_json::Value = serde_json::from_slice(raw_json).ok()?;
    let holdings = json_value.get("holdings")?.as_array()?;

    let is_string = |holding: &serde_json::Value, field: &str| {
        holding.get(field).is_some_and(serde_json::Value::is_string)
    };

    Some(
        holdings
            .iter()
            .enumerate()
            .filter(|(_, holding)| !(is_string(holding, "address") && is_string(holding, "assetId")))
            .map(|(index, _)| index)
            .collect(),
    )
}
