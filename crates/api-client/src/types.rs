// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Raw upstream records
//!
//! These mirror what the providers send, with amounts still in base units.
//! Field names follow the upstream JSON so the clients can deserialize
//! straight into them.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fee data for an EVM network, all values in wei
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeData {
    /// Result of `eth_gasPrice`
    pub gas_price: Option<U256>,
    /// `2 * baseFee + priorityFee`, when both are known
    pub max_fee_per_gas: Option<U256>,
    /// Result of `eth_maxPriorityFeePerGas`
    pub max_priority_fee_per_gas: Option<U256>,
}

/// ERC-20 contract details
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Erc20Metadata {
    /// Token name
    pub name: Option<String>,
    /// Token symbol
    pub symbol: Option<String>,
    /// Decimal count reported by the contract
    pub decimals: Option<u8>,
    /// Logo URL
    pub logo: Option<String>,
}

/// Kind of transfer to include in a history query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TransferCategory {
    External,
    Internal,
    Erc20,
    Erc721,
    Erc1155,
}

/// Transfer history query for one address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferQuery {
    /// Address whose transfers are wanted
    pub address: Address,
    /// Restrict to a single token contract
    pub contract: Option<Address>,
    /// Transfer kinds to include
    pub categories: Vec<TransferCategory>,
    /// Upper bound on transfers per direction
    pub max_count: u32,
}

/// Raw on-chain amount of a transfer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawContract {
    /// Hex amount in base units
    pub value: Option<String>,
    /// Token contract, absent for native transfers
    pub address: Option<String>,
    /// Hex decimal count
    pub decimal: Option<String>,
}

/// Block metadata attached to a transfer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferMetadata {
    /// ISO-8601 block timestamp
    pub block_timestamp: Option<String>,
}

/// One asset transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTransfer {
    /// Hex block number
    pub block_num: String,
    /// Transaction hash
    pub hash: String,
    /// Sender
    pub from: String,
    /// Recipient, absent for contract creation
    pub to: Option<String>,
    /// Asset symbol
    pub asset: Option<String>,
    /// Transfer category
    pub category: String,
    /// Token id for NFT transfers
    pub token_id: Option<String>,
    /// Base-unit amount
    #[serde(default)]
    pub raw_contract: RawContract,
    /// Block metadata
    pub metadata: Option<TransferMetadata>,
}

/// Both directions of a transfer history query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransferPage {
    /// Transfers sent by the address
    pub outgoing: Vec<AssetTransfer>,
    /// Transfers received by the address
    pub incoming: Vec<AssetTransfer>,
    /// Upstream cursor when more outgoing transfers exist
    pub outgoing_page_key: Option<String>,
    /// Upstream cursor when more incoming transfers exist
    pub incoming_page_key: Option<String>,
}

impl TransferPage {
    /// Whether the upstream holds transfers beyond this page
    pub fn has_more(&self) -> bool {
        self.outgoing_page_key.is_some() || self.incoming_page_key.is_some()
    }
}

/// Per-token balance held by a collection owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    /// Token id
    pub token_id: String,
    /// Number of copies held
    pub balance: String,
}

/// Owner of tokens in a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractOwner {
    /// Owner address
    pub owner_address: String,
    /// Per-token holdings, when the upstream reported them
    #[serde(default)]
    pub token_balances: Vec<TokenBalance>,
}

/// NFT collection details
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftContract {
    /// Contract address
    pub address: String,
    /// Collection name
    pub name: Option<String>,
    /// Collection symbol
    pub symbol: Option<String>,
    /// Total supply as reported upstream
    pub total_supply: Option<String>,
    /// `ERC721`, `ERC1155` or `NOT_A_CONTRACT`
    pub token_type: Option<String>,
}

/// Image URLs of an NFT
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftImage {
    /// Provider-cached copy
    pub cached_url: Option<String>,
    /// URL from the token metadata
    pub original_url: Option<String>,
}

/// Token URI and metadata document as fetched
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftRaw {
    /// Token URI
    pub token_uri: Option<String>,
    /// Metadata JSON
    pub metadata: Option<Value>,
}

/// A single NFT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    /// Collection
    pub contract: NftContract,
    /// Token id
    pub token_id: String,
    /// `ERC721` or `ERC1155`
    pub token_type: Option<String>,
    /// Token name
    pub name: Option<String>,
    /// Token description
    pub description: Option<String>,
    /// Image URLs
    pub image: Option<NftImage>,
    /// Raw metadata
    pub raw: Option<NftRaw>,
    /// Copies held, only set in ownership listings
    pub balance: Option<String>,
}

/// NFTs held by one owner
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedNfts {
    /// Tokens in this page
    pub owned_nfts: Vec<Nft>,
    /// Total tokens held
    #[serde(default)]
    pub total_count: u64,
    /// Cursor for the next page
    pub page_key: Option<String>,
}

/// Funded and spent output totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct TxoStats {
    pub funded_txo_count: u64,
    pub funded_txo_sum: u64,
    pub spent_txo_count: u64,
    pub spent_txo_sum: u64,
    pub tx_count: u64,
}

impl TxoStats {
    /// Unspent balance in satoshi
    pub fn balance(&self) -> u64 {
        self.funded_txo_sum.saturating_sub(self.spent_txo_sum)
    }
}

/// Statistics for a Bitcoin address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressStats {
    /// The address
    pub address: String,
    /// Confirmed activity
    pub chain_stats: TxoStats,
    /// Unconfirmed activity
    #[serde(default)]
    pub mempool_stats: TxoStats,
}

/// Transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    /// Receiving address, absent for non-standard scripts
    pub scriptpubkey_address: Option<String>,
    /// Amount in satoshi
    pub value: u64,
}

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Funding transaction
    pub txid: String,
    /// Output index within the funding transaction
    pub vout: u32,
    /// The output being spent, absent for coinbase inputs
    pub prevout: Option<TxOutput>,
    /// Whether this is a coinbase input
    #[serde(default)]
    pub is_coinbase: bool,
}

/// Confirmation state of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TxStatus {
    /// Included in a block
    pub confirmed: bool,
    /// Height of that block
    pub block_height: Option<u64>,
    /// Hash of that block
    pub block_hash: Option<String>,
    /// Unix time of that block
    pub block_time: Option<i64>,
}

/// Bitcoin transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoTransaction {
    /// Transaction id
    pub txid: String,
    /// Inputs
    pub vin: Vec<TxInput>,
    /// Outputs
    pub vout: Vec<TxOutput>,
    /// Fee in satoshi
    #[serde(default)]
    pub fee: u64,
    /// Confirmation state
    #[serde(default)]
    pub status: TxStatus,
}

/// Spot price with market data
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Price in the quote currency
    pub price: f64,
    /// Percent change over 24 hours
    pub change_24h: Option<f64>,
    /// Trading volume over 24 hours
    pub volume_24h: Option<f64>,
    /// Market capitalisation
    pub market_cap: Option<f64>,
}

/// One sample of a price series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Price in the quote currency
    pub price: f64,
}
