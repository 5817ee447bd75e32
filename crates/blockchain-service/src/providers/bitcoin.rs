// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Bitcoin provider adapter
//!
//! Balance, history and metadata for the Bitcoin network on top of any
//! [`UtxoLedger`].

use std::{fmt, sync::Arc};

use alloy_primitives::U256;
use api_client::{UtxoLedger, UtxoTransaction};
use shared_types::{AssetInfo, AssetType, NetworkId, to_human_unit, units::BITCOIN_DECIMALS};
use tracing::{debug, info};

use crate::{
    error::{ServiceError, ServiceResult},
    metrics::timed,
    params::{Pagination, bitcoin_address},
    routing::{Operation, effective_asset_type},
    sources::{Balance, BalanceSource, HistoryPage, HistorySource, TokenMetadataSource},
    types::{Direction, TokenMetadata, TransactionRecord, TransactionStatus},
};

const PROVIDER: &str = "bitcoin";

/// Confirmed transactions per ledger page
pub const LEDGER_PAGE_SIZE: usize = 25;

/// Deepest history window served, in ledger transactions
pub const MAX_TRANSACTIONS: usize = 1000;

/// Adapter over a Bitcoin indexer
pub struct BitcoinProvider<U> {
    ledger: Arc<U>,
}

impl<U> BitcoinProvider<U> {
    /// Wrap a shared ledger client
    pub fn new(ledger: Arc<U>) -> Self {
        Self { ledger }
    }

    /// Metadata of the native coin; needs no upstream call
    pub fn bitcoin_metadata(asset: &AssetInfo) -> TokenMetadata {
        let currency = &NetworkId::Bitcoin.network().native_currency;
        TokenMetadata {
            asset_id: asset.asset_id().to_string(),
            network_id: NetworkId::Bitcoin.to_string(),
            asset_type: AssetType::Bitcoin,
            contract_address: None,
            name: Some(currency.name.to_string()),
            symbol: Some(currency.symbol.to_string()),
            decimals: Some(currency.decimals),
            logo: None,
        }
    }
}

impl<U> Clone for BitcoinProvider<U> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<U> fmt::Debug for BitcoinProvider<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitcoinProvider").finish_non_exhaustive()
    }
}

fn btc(sats: u64) -> String {
    to_human_unit(U256::from(sats), BITCOIN_DECIMALS)
}

/// Direction and amount of `tx` as seen from `address`
///
/// Spending without receiving change is a send of every output. Receiving
/// without spending is a receive of the matching output. Anything else,
/// such as a self transfer, is reported as a send of zero.
fn classify(tx: &UtxoTransaction, address: &str) -> (Direction, u64) {
    let spends = tx.vin.iter().any(|input| {
        input
            .prevout
            .as_ref()
            .and_then(|prevout| prevout.scriptpubkey_address.as_deref())
            == Some(address)
    });
    let received: Option<u64> = tx
        .vout
        .iter()
        .filter(|output| output.scriptpubkey_address.as_deref() == Some(address))
        .map(|output| output.value)
        .reduce(u64::saturating_add);

    match (spends, received) {
        (true, None) => (
            Direction::Send,
            tx.vout
                .iter()
                .map(|output| output.value)
                .fold(0, u64::saturating_add),
        ),
        (false, Some(value)) => (Direction::Receive, value),
        _ => (Direction::Send, 0),
    }
}

fn transaction_record(tx: UtxoTransaction, address: &str) -> TransactionRecord {
    let (direction, sats) = classify(&tx, address);
    let from = tx
        .vin
        .iter()
        .find_map(|input| input.prevout.as_ref()?.scriptpubkey_address.clone());
    let to = tx
        .vout
        .iter()
        .find_map(|output| output.scriptpubkey_address.clone());

    TransactionRecord {
        from,
        to,
        value: btc(sats),
        asset: Some(NetworkId::Bitcoin.network().native_currency.symbol.to_string()),
        direction,
        status: if tx.status.confirmed {
            TransactionStatus::Success
        } else {
            TransactionStatus::Pending
        },
        block_number: tx.status.block_height,
        timestamp: tx.status.block_time,
        gas_price: Some("0".to_string()),
        fee: Some(btc(tx.fee)),
        hash: tx.txid,
    }
}

impl<U: UtxoLedger> BitcoinProvider<U> {
    /// Walks the ledger until `wanted` transactions are held or it runs out
    ///
    /// Returns the transactions and whether the ledger had more.
    async fn walk(&self, address: &str, wanted: usize) -> ServiceResult<(Vec<UtxoTransaction>, bool)> {
        let first = timed(PROVIDER, self.ledger.address_transactions(address, None)).await?;

        // the first page also carries unconfirmed transactions
        let confirmed = first.iter().filter(|tx| tx.status.confirmed).count();
        let mut exhausted = confirmed < LEDGER_PAGE_SIZE;
        let mut transactions = first;

        while !exhausted && transactions.len() <= wanted {
            let Some(last) = transactions
                .iter()
                .rev()
                .find(|tx| tx.status.confirmed)
                .map(|tx| tx.txid.clone())
            else {
                break;
            };
            let page =
                timed(PROVIDER, self.ledger.address_transactions(address, Some(&last))).await?;
            debug!(after = %last, fetched = page.len(), "fetched ledger page");
            exhausted = page.len() < LEDGER_PAGE_SIZE;
            transactions.extend(page);
        }

        Ok((transactions, !exhausted))
    }
}

impl<U: UtxoLedger> BalanceSource for BitcoinProvider<U> {
    async fn balance(
        &self,
        network: NetworkId,
        address: &str,
        asset: &AssetInfo,
    ) -> ServiceResult<Balance> {
        if effective_asset_type(asset.asset_type(), network) != AssetType::Bitcoin {
            return Err(ServiceError::UnsupportedAssetType {
                operation: Operation::Balance,
                asset_type: asset.asset_type(),
            });
        }
        let address = bitcoin_address(address)?;

        let stats = timed(PROVIDER, self.ledger.address_stats(address)).await?;
        Ok(Balance {
            raw: U256::from(stats.chain_stats.balance()),
            decimals: BITCOIN_DECIMALS,
            symbol: Some(NetworkId::Bitcoin.network().native_currency.symbol.to_string()),
        })
    }
}

impl<U: UtxoLedger> HistorySource for BitcoinProvider<U> {
    async fn history(
        &self,
        network: NetworkId,
        address: &str,
        asset: &AssetInfo,
        pagination: Pagination,
    ) -> ServiceResult<HistoryPage> {
        if effective_asset_type(asset.asset_type(), network) != AssetType::Bitcoin {
            return Err(ServiceError::UnsupportedAssetType {
                operation: Operation::History,
                asset_type: asset.asset_type(),
            });
        }
        let address = bitcoin_address(address)?;
        let pagination = pagination.within(MAX_TRANSACTIONS)?;

        let (walked, ledger_has_more) = self.walk(address, pagination.end()).await?;
        let total = walked.len();
        let transactions: Vec<TransactionRecord> = walked
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit as usize)
            .map(|tx| transaction_record(tx, address))
            .collect();

        info!(total, returned = transactions.len(), "fetched Bitcoin history");

        Ok(HistoryPage {
            transactions,
            has_more: total > pagination.end() || ledger_has_more,
        })
    }
}

impl<U: UtxoLedger> TokenMetadataSource for BitcoinProvider<U> {
    async fn token_metadata(
        &self,
        _network: NetworkId,
        asset: &AssetInfo,
    ) -> ServiceResult<TokenMetadata> {
        Ok(Self::bitcoin_metadata(asset))
    }
}
