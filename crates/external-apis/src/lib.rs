// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Upstream data provider clients for the asset gateway
//!
//! # Architecture
//!
//! - **Client Implementations**: [`alchemy`] (EVM JSON-RPC and NFT API), [`esplora`]
//!   (Bitcoin ledger), [`coingecko`] (prices)
//! - **Registry**: [`registry::ProviderRegistry`] shares the clients and probes their health concurrently
//! - **Validation Utilities**: [`non_empty_string::NonEmptyString`] keeps blank URLs and keys out of clients
//!
//! Each client has its own error enum that converts into [`api_client::ApiError`],
//! and a fixed per-request deadline. Nothing is retried.

pub mod alchemy;
pub mod coingecko;
pub mod esplora;
pub mod non_empty_string;
pub mod registry;

pub use alchemy::*;
pub use coingecko::*;
pub use esplora::*;
pub use non_empty_string::NonEmptyString;
pub use registry::*;
