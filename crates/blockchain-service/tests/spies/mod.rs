// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs, dead_code)]

//! Hand-written upstream collaborators that count their calls

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use alloy_primitives::{Address, U256};
use api_client::{
    AddressStats, ApiError, ContractOwner, Erc20Metadata, EvmRpc, FeeData, Nft, NftContract,
    OwnedNfts, PriceFeed, PricePoint, PriceQuote, TransferPage, TransferQuery, TxInput, TxOutput,
    TxStatus, TxoStats, UtxoLedger, UtxoTransaction,
};
use blockchain_service::BlockchainService;
use shared_types::NetworkId;

pub const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
pub const USDC: &str = "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48";
pub const SATOSHI: &str = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq";
pub const OTHER: &str = "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh";

/// Error a spy answers with instead of its canned data
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    MissingCredential,
    Upstream(u16),
}

impl Failure {
    fn error(self) -> ApiError {
        match self {
            Self::MissingCredential => ApiError::MissingCredential { provider: "alchemy" },
            Self::Upstream(status) => ApiError::Upstream {
                status,
                message: "upstream failed".to_string(),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct SpyEvm {
    pub calls: AtomicUsize,
    pub native: U256,
    pub token: U256,
    pub decimals: u8,
    pub fees: FeeData,
    pub transfers: TransferPage,
    pub token_owners: Vec<String>,
    pub contract_owners: Vec<ContractOwner>,
    pub failure: Option<Failure>,
}

impl SpyEvm {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer<T>(&self, value: T) -> Result<T, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure {
            Some(failure) => Err(failure.error()),
            None => Ok(value),
        }
    }
}

impl EvmRpc for SpyEvm {
    async fn native_balance(&self, _network: NetworkId, _address: Address) -> Result<U256, ApiError> {
        self.answer(self.native)
    }

    async fn erc20_balance(
        &self,
        _network: NetworkId,
        _contract: Address,
        _owner: Address,
    ) -> Result<U256, ApiError> {
        self.answer(self.token)
    }

    async fn erc20_decimals(&self, _network: NetworkId, _contract: Address) -> Result<u8, ApiError> {
        self.answer(self.decimals)
    }

    async fn erc20_metadata(
        &self,
        _network: NetworkId,
        _contract: Address,
    ) -> Result<Erc20Metadata, ApiError> {
        self.answer(Erc20Metadata {
            name: Some("USD Coin".to_string()),
            symbol: Some("USDC".to_string()),
            decimals: Some(self.decimals),
            logo: None,
        })
    }

    async fn fee_data(&self, _network: NetworkId) -> Result<FeeData, ApiError> {
        self.answer(self.fees)
    }

    async fn asset_transfers(
        &self,
        _network: NetworkId,
        query: TransferQuery,
    ) -> Result<TransferPage, ApiError> {
        let max_count = query.max_count as usize;
        let mut page = self.transfers.clone();
        page.outgoing.truncate(max_count);
        page.incoming.truncate(max_count);
        self.answer(page)
    }

    async fn owners_for_token(
        &self,
        _network: NetworkId,
        _contract: Address,
        _token_id: &str,
    ) -> Result<Vec<String>, ApiError> {
        self.answer(self.token_owners.clone())
    }

    async fn owners_for_contract(
        &self,
        _network: NetworkId,
        _contract: Address,
    ) -> Result<Vec<ContractOwner>, ApiError> {
        self.answer(self.contract_owners.clone())
    }

    async fn nfts_for_owner(
        &self,
        _network: NetworkId,
        _owner: Address,
        _contract: Option<Address>,
    ) -> Result<OwnedNfts, ApiError> {
        self.answer(OwnedNfts::default())
    }

    async fn nft_metadata(
        &self,
        _network: NetworkId,
        contract: Address,
        token_id: &str,
    ) -> Result<Nft, ApiError> {
        self.answer(Nft {
            contract: NftContract {
                address: contract.to_string(),
                name: Some("Punks".to_string()),
                ..NftContract::default()
            },
            token_id: token_id.to_string(),
            token_type: Some("ERC721".to_string()),
            name: Some(format!("Punk #{token_id}")),
            description: None,
            image: None,
            raw: None,
            balance: None,
        })
    }

    async fn contract_metadata(
        &self,
        _network: NetworkId,
        contract: Address,
    ) -> Result<NftContract, ApiError> {
        self.answer(NftContract {
            address: contract.to_string(),
            name: Some("Punks".to_string()),
            symbol: Some("PUNK".to_string()),
            total_supply: Some("10000".to_string()),
            token_type: Some("ERC721".to_string()),
        })
    }
}

#[derive(Debug, Default)]
pub struct SpyLedger {
    pub calls: AtomicUsize,
    pub funded: u64,
    pub spent: u64,
    /// Pages returned by successive history calls
    pub pages: Vec<Vec<UtxoTransaction>>,
    pub page_calls: AtomicUsize,
}

impl SpyLedger {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UtxoLedger for SpyLedger {
    async fn address_stats(&self, address: &str) -> Result<AddressStats, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AddressStats {
            address: address.to_string(),
            chain_stats: TxoStats {
                funded_txo_sum: self.funded,
                spent_txo_sum: self.spent,
                ..TxoStats::default()
            },
            mempool_stats: TxoStats::default(),
        })
    }

    async fn address_transactions(
        &self,
        _address: &str,
        _after_txid: Option<&str>,
    ) -> Result<Vec<UtxoTransaction>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let index = self.page_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }

    async fn transaction(&self, txid: &str) -> Result<UtxoTransaction, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ApiError::NotFound {
            message: format!("/tx/{txid}"),
        })
    }
}

#[derive(Debug, Default)]
pub struct SpyFeed {
    pub calls: AtomicUsize,
    pub price: f64,
}

impl SpyFeed {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn quote(&self) -> PriceQuote {
        self.calls.fetch_add(1, Ordering::SeqCst);
        PriceQuote {
            price: self.price,
            change_24h: Some(-1.25),
            ..PriceQuote::default()
        }
    }

    fn chart(&self, days: u32) -> Vec<PricePoint> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (0..days)
            .map(|day| PricePoint {
                timestamp: i64::from(day) * 86_400_000,
                price: self.price,
            })
            .collect()
    }
}

impl PriceFeed for SpyFeed {
    async fn simple_price(&self, _coin_id: &str, _currency: &str) -> Result<PriceQuote, ApiError> {
        Ok(self.quote())
    }

    async fn token_price(
        &self,
        _platform: &str,
        _contract: &str,
        _currency: &str,
    ) -> Result<PriceQuote, ApiError> {
        Ok(self.quote())
    }

    async fn market_chart(
        &self,
        _coin_id: &str,
        _currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, ApiError> {
        Ok(self.chart(days))
    }

    async fn contract_market_chart(
        &self,
        _platform: &str,
        _contract: &str,
        _currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, ApiError> {
        Ok(self.chart(days))
    }
}

pub type SpyService = BlockchainService<SpyEvm, SpyLedger, SpyFeed>;

/// Service over the three spies, with handles kept for call counting
pub struct Harness {
    pub service: SpyService,
    pub evm: Arc<SpyEvm>,
    pub ledger: Arc<SpyLedger>,
    pub feed: Arc<SpyFeed>,
}

impl Harness {
    pub fn new(evm: SpyEvm, ledger: SpyLedger, feed: SpyFeed) -> Self {
        let evm = Arc::new(evm);
        let ledger = Arc::new(ledger);
        let feed = Arc::new(feed);
        Self {
            service: BlockchainService::new(evm.clone(), ledger.clone(), feed.clone()),
            evm,
            ledger,
            feed,
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new(SpyEvm::default(), SpyLedger::default(), SpyFeed::default())
    }
}

pub fn sats_output(address: &str, value: u64) -> TxOutput {
    TxOutput {
        scriptpubkey_address: Some(address.to_string()),
        value,
    }
}

pub fn sats_input(address: &str, value: u64) -> TxInput {
    TxInput {
        txid: "f".repeat(64),
        vout: 0,
        prevout: Some(sats_output(address, value)),
        is_coinbase: false,
    }
}

pub fn utxo_tx(txid: &str, vin: Vec<TxInput>, vout: Vec<TxOutput>) -> UtxoTransaction {
    UtxoTransaction {
        txid: txid.to_string(),
        vin,
        vout,
        fee: 500,
        status: TxStatus {
            confirmed: true,
            block_height: Some(840_000),
            block_hash: None,
            block_time: Some(1_713_571_767),
        },
    }
}

/// `count` confirmed receipts paying `address`, newest first
pub fn receipts(prefix: &str, count: usize, address: &str) -> Vec<UtxoTransaction> {
    (0..count)
        .map(|i| {
            utxo_tx(
                &format!("{prefix}{i}"),
                vec![sats_input(OTHER, 20_000)],
                vec![sats_output(address, 10_000)],
            )
        })
        .collect()
}
