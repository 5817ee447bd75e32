// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Shared types for the asset gateway
//!
//! Asset identifiers, the network registry, exact unit conversion and the
//! response envelope. Every other crate in the workspace builds on these,
//! so this crate depends on none of them.

pub mod asset;
pub mod networks;
pub mod response;
pub mod units;

pub use asset::{AssetIdError, AssetInfo, AssetType, build_asset_id};
pub use networks::{NativeCurrency, Network, NetworkError, NetworkId, all_networks, lookup};
pub use response::{ApiResponse, ErrorBody, ErrorCode};
pub use units::{UnitError, parse_quantity, to_base_unit, to_human_unit};
