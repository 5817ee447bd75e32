// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Upstream provider families
//!
//! Each trait covers one kind of upstream. Implementations own their HTTP
//! clients and endpoint resolution; callers only see raw records and
//! [`ApiError`].

use alloy_primitives::{Address, U256};
use shared_types::NetworkId;

use crate::{
    AddressStats, ApiError, ContractOwner, Erc20Metadata, FeeData, Nft, NftContract, OwnedNfts,
    PricePoint, PriceQuote, TransferPage, TransferQuery, UtxoTransaction,
};

/// JSON-RPC node with token and NFT extensions, one endpoint per EVM network
pub trait EvmRpc: Send + Sync {
    /// Native balance in wei
    fn native_balance(
        &self,
        network: NetworkId,
        address: Address,
    ) -> impl Future<Output = Result<U256, ApiError>> + Send;

    /// `balanceOf(owner)` on an ERC-20 contract
    fn erc20_balance(
        &self,
        network: NetworkId,
        contract: Address,
        owner: Address,
    ) -> impl Future<Output = Result<U256, ApiError>> + Send;

    /// `decimals()` on an ERC-20 contract
    fn erc20_decimals(
        &self,
        network: NetworkId,
        contract: Address,
    ) -> impl Future<Output = Result<u8, ApiError>> + Send;

    /// Name, symbol, decimals and logo of an ERC-20 contract
    fn erc20_metadata(
        &self,
        network: NetworkId,
        contract: Address,
    ) -> impl Future<Output = Result<Erc20Metadata, ApiError>> + Send;

    /// Current gas price and EIP-1559 fee suggestions
    fn fee_data(&self, network: NetworkId)
    -> impl Future<Output = Result<FeeData, ApiError>> + Send;

    /// Outgoing and incoming transfers in one batched request
    fn asset_transfers(
        &self,
        network: NetworkId,
        query: TransferQuery,
    ) -> impl Future<Output = Result<TransferPage, ApiError>> + Send;

    /// Holders of a single token
    fn owners_for_token(
        &self,
        network: NetworkId,
        contract: Address,
        token_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, ApiError>> + Send;

    /// Holders across a collection, with per-token balances
    fn owners_for_contract(
        &self,
        network: NetworkId,
        contract: Address,
    ) -> impl Future<Output = Result<Vec<ContractOwner>, ApiError>> + Send;

    /// NFTs held by `owner`, optionally limited to one collection
    fn nfts_for_owner(
        &self,
        network: NetworkId,
        owner: Address,
        contract: Option<Address>,
    ) -> impl Future<Output = Result<OwnedNfts, ApiError>> + Send;

    /// Metadata of one token
    fn nft_metadata(
        &self,
        network: NetworkId,
        contract: Address,
        token_id: &str,
    ) -> impl Future<Output = Result<Nft, ApiError>> + Send;

    /// Metadata of a collection
    fn contract_metadata(
        &self,
        network: NetworkId,
        contract: Address,
    ) -> impl Future<Output = Result<NftContract, ApiError>> + Send;
}

/// Bitcoin indexer
pub trait UtxoLedger: Send + Sync {
    /// Funded and spent totals for an address
    fn address_stats(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<AddressStats, ApiError>> + Send;

    /// Newest-first transactions, continuing after `after_txid` when given
    fn address_transactions(
        &self,
        address: &str,
        after_txid: Option<&str>,
    ) -> impl Future<Output = Result<Vec<UtxoTransaction>, ApiError>> + Send;

    /// A single transaction
    fn transaction(
        &self,
        txid: &str,
    ) -> impl Future<Output = Result<UtxoTransaction, ApiError>> + Send;
}

/// Market data aggregator
pub trait PriceFeed: Send + Sync {
    /// Spot price of a coin
    fn simple_price(
        &self,
        coin_id: &str,
        currency: &str,
    ) -> impl Future<Output = Result<PriceQuote, ApiError>> + Send;

    /// Spot price of a token contract on a platform
    fn token_price(
        &self,
        platform: &str,
        contract: &str,
        currency: &str,
    ) -> impl Future<Output = Result<PriceQuote, ApiError>> + Send;

    /// Price series of a coin over `days`
    fn market_chart(
        &self,
        coin_id: &str,
        currency: &str,
        days: u32,
    ) -> impl Future<Output = Result<Vec<PricePoint>, ApiError>> + Send;

    /// Price series of a token contract over `days`
    fn contract_market_chart(
        &self,
        platform: &str,
        contract: &str,
        currency: &str,
        days: u32,
    ) -> impl Future<Output = Result<Vec<PricePoint>, ApiError>> + Send;
}
