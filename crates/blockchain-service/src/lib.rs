// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Operation dispatch for the asset gateway
//!
//! [`BlockchainService`] answers balance, gas, price, history, NFT, metadata
//! and portfolio requests by routing each one to the EVM, Bitcoin or price
//! provider that can serve it. Every operation returns an
//! [`shared_types::ApiResponse`]; failures never escape as `Err`.
//!
//! ```text
//! asset id -> parse -> network registry -> routing table -> adapter -> envelope
//! ```

pub mod error;
pub mod metrics;
pub mod params;
pub mod providers;
pub mod routing;
pub mod service;
pub mod sources;
pub mod types;

pub use error::{ServiceError, ServiceResult, respond};
pub use providers::{BitcoinProvider, EvmProvider, PriceProvider};
pub use routing::{Operation, Route, route};
pub use service::BlockchainService;
pub use types::*;
