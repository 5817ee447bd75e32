// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Normalized operation results
//!
//! Whichever provider answered, results leave the service in these shapes.
//! Amounts are decimal strings in display units unless a field says
//! otherwise.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use shared_types::AssetType;
use utoipa::ToSchema;

/// Balance of one asset held by one address
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceData {
    /// Queried address
    pub address: String,
    /// Asset identifier as supplied
    pub asset_id: String,
    /// Canonical network key
    pub network_id: String,
    /// Resolved asset kind
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// Balance in display units
    pub balance: String,
    /// Balance in base units
    pub raw_balance: String,
    /// Decimals used for the conversion
    pub decimals: u8,
    /// Ticker symbol, when known without an extra upstream call
    pub symbol: Option<String>,
}

/// Fee report shape requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GasMode {
    /// Single gas price
    #[default]
    Legacy,
    /// Gas price plus EIP-1559 fee suggestions
    Eip1559,
}

impl GasMode {
    /// Query-string form
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Eip1559 => "eip1559",
        }
    }
}

impl fmt::Display for GasMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GasMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "eip1559" | "eip-1559" => Ok(Self::Eip1559),
            other => Err(format!("unknown gas type {other:?}, expected legacy or eip1559")),
        }
    }
}

/// Current gas price of an EVM network, amounts in wei unless suffixed
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GasData {
    /// Canonical network key
    pub network_id: String,
    /// Report shape
    #[serde(rename = "type")]
    pub mode: GasMode,
    /// Gas price, `"0"` when the node did not report one
    pub gas_price: String,
    /// Gas price rendered in gwei
    pub gas_price_gwei: String,
    /// Suggested max fee per gas (eip1559 only)
    pub max_fee_per_gas: Option<String>,
    /// Suggested priority fee per gas (eip1559 only)
    pub max_priority_fee_per_gas: Option<String>,
}

/// Spot price of an asset
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceData {
    /// Asset identifier as supplied
    pub asset_id: String,
    /// Quote currency
    pub currency: String,
    /// Price in the quote currency
    pub price: f64,
    /// Percent change over 24 hours
    #[serde(rename = "change24h")]
    pub change_24h: Option<f64>,
    /// Volume over 24 hours
    #[serde(rename = "volume24h")]
    pub volume_24h: Option<f64>,
    /// Market capitalisation
    pub market_cap: Option<f64>,
}

/// One sample of a price series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceSample {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Price in the quote currency
    pub price: f64,
}

/// Price series of an asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryData {
    /// Asset identifier as supplied
    pub asset_id: String,
    /// Quote currency
    pub currency: String,
    /// Days of history requested
    pub days: u32,
    /// Samples, oldest first
    pub prices: Vec<PriceSample>,
}

/// Direction of a transaction relative to the queried address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Direction {
    Send,
    Receive,
}

/// Confirmation state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TransactionStatus {
    Success,
    Pending,
}

/// One entry of a transaction history
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Transaction hash or id
    pub hash: String,
    /// Sender, when a single one exists
    pub from: Option<String>,
    /// Recipient, when a single one exists
    pub to: Option<String>,
    /// Amount moved, in display units
    pub value: String,
    /// Asset symbol
    pub asset: Option<String>,
    /// Direction relative to the queried address
    pub direction: Direction,
    /// Confirmation state
    pub status: TransactionStatus,
    /// Block height
    pub block_number: Option<u64>,
    /// Seconds since the Unix epoch
    pub timestamp: Option<i64>,
    /// Gas price; always `"0"` on Bitcoin
    pub gas_price: Option<String>,
    /// Fee paid, in display units
    pub fee: Option<String>,
}

/// One page of transaction history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryData {
    /// Queried address
    pub address: String,
    /// Asset identifier as supplied
    pub asset_id: String,
    /// Canonical network key
    pub network_id: String,
    /// Page number, starting at 1
    pub page: u32,
    /// Page size
    pub limit: u32,
    /// Whether later pages exist
    pub has_more: bool,
    /// Transactions, newest first
    pub transactions: Vec<TransactionRecord>,
}

/// Holder of an NFT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NftOwner {
    /// Owner address
    pub owner_address: String,
    /// Token held, empty when the provider gave no per-token detail
    pub token_id: String,
    /// Copies held
    pub balance: String,
}

/// Owners of an NFT or a whole collection
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NftOwnersData {
    /// Collection contract
    pub contract_address: String,
    /// Canonical network key
    pub network_id: String,
    /// Token queried, absent for collection-wide queries
    pub token_id: Option<String>,
    /// One entry per owner and token
    pub owners: Vec<NftOwner>,
}

/// NFT as listed for an owner
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnedNft {
    /// Collection contract
    pub contract_address: String,
    /// Token id
    pub token_id: String,
    /// `ERC721` or `ERC1155`
    pub token_type: Option<String>,
    /// Token name
    pub name: Option<String>,
    /// Collection name
    pub collection_name: Option<String>,
    /// Image URL, cached copy preferred
    pub image_url: Option<String>,
    /// Copies held
    pub balance: Option<String>,
}

/// NFTs held by an address
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NftsForOwnerData {
    /// Queried owner
    pub owner: String,
    /// Canonical network key
    pub network_id: String,
    /// Total tokens held
    pub total_count: u64,
    /// Upstream cursor for the next page
    pub page_key: Option<String>,
    /// Tokens in this page
    pub nfts: Vec<OwnedNft>,
}

/// Fungible token details
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetadata {
    /// Asset identifier as supplied
    pub asset_id: String,
    /// Canonical network key
    pub network_id: String,
    /// Resolved asset kind
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    /// Token contract, absent for native currencies
    pub contract_address: Option<String>,
    /// Token name
    pub name: Option<String>,
    /// Ticker symbol
    pub symbol: Option<String>,
    /// Decimal count
    pub decimals: Option<u8>,
    /// Logo URL
    pub logo: Option<String>,
}

/// NFT or collection details
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NftMetadata {
    /// Asset identifier as supplied
    pub asset_id: String,
    /// Canonical network key
    pub network_id: String,
    /// Collection contract
    pub contract_address: String,
    /// Token id, absent for collection metadata
    pub token_id: Option<String>,
    /// `ERC721` or `ERC1155`
    pub token_type: Option<String>,
    /// Token or collection name
    pub name: Option<String>,
    /// Collection symbol
    pub symbol: Option<String>,
    /// Token description
    pub description: Option<String>,
    /// Image URL, cached copy preferred
    pub image_url: Option<String>,
    /// Token URI
    pub token_uri: Option<String>,
    /// Collection supply
    pub total_supply: Option<String>,
    /// Metadata document as published by the token
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Value>,
}

/// One position to value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Holder address
    pub address: String,
    /// Asset identifier
    pub asset_id: String,
}

/// Portfolio valuation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PortfolioRequest {
    /// Positions to value
    pub holdings: Vec<Holding>,
    /// Quote currency, `usd` when absent
    #[serde(default)]
    pub currency: Option<String>,
}

/// Valued position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioEntry {
    /// Holder address
    pub address: String,
    /// Asset identifier as supplied
    pub asset_id: String,
    /// Canonical network key
    pub network_id: String,
    /// Balance in display units
    pub balance: String,
    /// Unit price in the quote currency
    pub price: f64,
    /// `balance * price`
    pub value: f64,
}

/// Portfolio valuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioData {
    /// Quote currency
    pub currency: String,
    /// Sum of all position values
    pub total_value: f64,
    /// Valued positions, in request order
    pub holdings: Vec<PortfolioEntry>,
}
