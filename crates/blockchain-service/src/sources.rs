// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Per-operation capabilities
//!
//! Each trait is one thing a provider family can answer. The service picks
//! the implementation through the routing table, so no adapter ever has to
//! say "not supported" for a whole operation; adapters only reject asset
//! kinds they cannot handle within an operation they do support.

use alloy_primitives::U256;
use api_client::{FeeData, PricePoint, PriceQuote};
use shared_types::{AssetInfo, NetworkId};

use crate::{
    error::ServiceResult,
    params::Pagination,
    types::{NftMetadata, NftOwner, OwnedNft, TokenMetadata, TransactionRecord},
};

/// Raw balance with the decimals needed to render it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    /// Amount in base units
    pub raw: U256,
    /// Decimals between base and display units
    pub decimals: u8,
    /// Ticker symbol, when known without another upstream call
    pub symbol: Option<String>,
}

/// One page of normalized history
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryPage {
    /// Transactions on the page, newest first
    pub transactions: Vec<TransactionRecord>,
    /// Whether later pages exist
    pub has_more: bool,
}

/// One page of NFTs held by an owner
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NftPage {
    /// Tokens on the page
    pub nfts: Vec<OwnedNft>,
    /// Total tokens held
    pub total_count: u64,
    /// Upstream cursor for the next page
    pub page_key: Option<String>,
}

/// Balance of an address
pub trait BalanceSource: Send + Sync {
    /// Raw balance of `asset` held by `address`
    fn balance(
        &self,
        network: NetworkId,
        address: &str,
        asset: &AssetInfo,
    ) -> impl Future<Output = ServiceResult<Balance>> + Send;
}

/// Transaction history of an address
pub trait HistorySource: Send + Sync {
    /// One page of transfers of `asset` involving `address`
    fn history(
        &self,
        network: NetworkId,
        address: &str,
        asset: &AssetInfo,
        pagination: Pagination,
    ) -> impl Future<Output = ServiceResult<HistoryPage>> + Send;
}

/// Gas pricing
pub trait GasSource: Send + Sync {
    /// Current fee data in base units
    fn fee_data(&self, network: NetworkId) -> impl Future<Output = ServiceResult<FeeData>> + Send;
}

/// NFT ownership and metadata
pub trait NftSource: Send + Sync {
    /// Owners of one token, or of every token in the collection
    fn owners(
        &self,
        network: NetworkId,
        contract: &str,
        token_id: Option<&str>,
    ) -> impl Future<Output = ServiceResult<Vec<NftOwner>>> + Send;

    /// NFTs held by `owner`, optionally restricted to one collection
    fn nfts_for_owner(
        &self,
        network: NetworkId,
        owner: &str,
        contract: Option<&str>,
    ) -> impl Future<Output = ServiceResult<NftPage>> + Send;

    /// Token metadata, or collection metadata when no token id was given
    fn nft_metadata(
        &self,
        network: NetworkId,
        asset: &AssetInfo,
    ) -> impl Future<Output = ServiceResult<NftMetadata>> + Send;
}

/// Fungible token details
pub trait TokenMetadataSource: Send + Sync {
    /// Name, symbol and decimals of `asset`
    fn token_metadata(
        &self,
        network: NetworkId,
        asset: &AssetInfo,
    ) -> impl Future<Output = ServiceResult<TokenMetadata>> + Send;
}

/// Market prices
pub trait PriceSource: Send + Sync {
    /// Spot price of `asset` in `currency`
    fn quote(
        &self,
        network: NetworkId,
        asset: &AssetInfo,
        currency: &str,
    ) -> impl Future<Output = ServiceResult<PriceQuote>> + Send;

    /// Price series covering the last `days` days
    fn price_history(
        &self,
        network: NetworkId,
        asset: &AssetInfo,
        currency: &str,
        days: u32,
    ) -> impl Future<Output = ServiceResult<Vec<PricePoint>>> + Send;
}
