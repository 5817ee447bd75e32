// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Operation routing table
//!
//! Decides which provider family answers an operation for a given asset
//! kind. The table is a pure function so it can be checked without any
//! provider in place.

use std::fmt;

use shared_types::{AssetType, ErrorCode, NetworkId};

/// Logical operations exposed by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Balance of an address
    Balance,
    /// Current gas price
    Gas,
    /// Spot price
    Price,
    /// Historical price series
    PriceHistory,
    /// Transaction history of an address
    History,
    /// Owners of an NFT or collection
    NftOwners,
    /// NFTs held by an address
    NftsForOwner,
    /// Token name, symbol and decimals
    TokenMetadata,
    /// NFT or collection metadata
    NftMetadata,
    /// Valuation of several holdings
    Portfolio,
    /// Network registry listing
    Networks,
}

impl Operation {
    /// Label used in logs and metrics
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::Gas => "gas",
            Self::Price => "price",
            Self::PriceHistory => "price_history",
            Self::History => "history",
            Self::NftOwners => "nft_owners",
            Self::NftsForOwner => "nfts_for_owner",
            Self::TokenMetadata => "token_metadata",
            Self::NftMetadata => "nft_metadata",
            Self::Portfolio => "portfolio",
            Self::Networks => "networks",
        }
    }

    /// Error code reported when the upstream call for this operation fails
    pub const fn fetch_error_code(self) -> ErrorCode {
        match self {
            Self::Balance => ErrorCode::BalanceFetchError,
            Self::Gas => ErrorCode::GasFetchError,
            Self::Price => ErrorCode::PriceFetchError,
            Self::PriceHistory => ErrorCode::PriceHistoryFetchError,
            Self::History => ErrorCode::HistoryFetchError,
            Self::NftOwners => ErrorCode::NftOwnersFetchError,
            Self::NftsForOwner => ErrorCode::NftsFetchError,
            Self::TokenMetadata => ErrorCode::TokenMetadataFetchError,
            Self::NftMetadata => ErrorCode::NftMetadataFetchError,
            Self::Portfolio => ErrorCode::PortfolioFetchError,
            Self::Networks => ErrorCode::UpstreamFetchError,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider family chosen for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// EVM JSON-RPC and NFT provider
    Evm,
    /// Bitcoin UTXO ledger
    Bitcoin,
    /// Price aggregator
    Price,
    /// Answered from compiled-in data
    Local,
}

/// Routing table
///
/// `None` means the operation has no meaning for the asset kind.
/// [`Operation::Portfolio`] and [`Operation::Networks`] never reach a single
/// provider and are not routed.
pub const fn route(operation: Operation, asset_type: AssetType) -> Option<Route> {
    let bitcoin = matches!(asset_type, AssetType::Bitcoin);
    match operation {
        Operation::Balance | Operation::History => {
            if bitcoin {
                Some(Route::Bitcoin)
            } else {
                Some(Route::Evm)
            }
        }
        Operation::Price | Operation::PriceHistory => Some(Route::Price),
        Operation::Gas | Operation::NftOwners | Operation::NftsForOwner | Operation::NftMetadata => {
            if bitcoin {
                None
            } else {
                Some(Route::Evm)
            }
        }
        Operation::TokenMetadata => {
            if bitcoin {
                Some(Route::Local)
            } else {
                Some(Route::Evm)
            }
        }
        Operation::Portfolio | Operation::Networks => None,
    }
}

/// Asset kind that stands for a whole network in network-keyed operations
pub const fn network_asset_type(network: NetworkId) -> AssetType {
    match network {
        NetworkId::Bitcoin => AssetType::Bitcoin,
        _ => AssetType::Native,
    }
}

/// Asset kind after accounting for the resolved network
///
/// Aliases such as `btc` parse as a native asset on a network that resolves
/// to Bitcoin.
pub const fn effective_asset_type(asset_type: AssetType, network: NetworkId) -> AssetType {
    match (asset_type, network) {
        (AssetType::Native, NetworkId::Bitcoin) => AssetType::Bitcoin,
        (asset_type, _) => asset_type,
    }
}
