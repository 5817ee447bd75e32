// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! EVM provider adapter
//!
//! Answers balance, history, gas, NFT and token metadata operations for
//! EVM networks on top of any [`EvmRpc`] implementation.

use std::{fmt, sync::Arc};

use api_client::{AssetTransfer, EvmRpc, FeeData, Nft, TransferCategory, TransferQuery};
use chrono::DateTime;
use shared_types::{AssetInfo, AssetType, NetworkId, parse_quantity, to_human_unit};
use tracing::{debug, info};

use crate::{
    error::{ServiceError, ServiceResult},
    metrics::timed,
    params::{Pagination, evm_address},
    routing::Operation,
    sources::{
        Balance, BalanceSource, GasSource, HistoryPage, HistorySource, NftPage, NftSource,
        TokenMetadataSource,
    },
    types::{
        Direction, NftMetadata, NftOwner, OwnedNft, TokenMetadata, TransactionRecord,
        TransactionStatus,
    },
};

const PROVIDER: &str = "evm";

/// Deepest history window served, in merged transfers
pub const MAX_TRANSFERS: u32 = 1000;

/// Adapter over an EVM JSON-RPC provider
pub struct EvmProvider<E> {
    rpc: Arc<E>,
}

impl<E> EvmProvider<E> {
    /// Wrap a shared RPC client
    pub fn new(rpc: Arc<E>) -> Self {
        Self { rpc }
    }
}

impl<E> Clone for EvmProvider<E> {
    fn clone(&self) -> Self {
        Self {
            rpc: Arc::clone(&self.rpc),
        }
    }
}

impl<E> fmt::Debug for EvmProvider<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvmProvider").finish_non_exhaustive()
    }
}

fn contract_of(asset: &AssetInfo, network: NetworkId) -> ServiceResult<alloy_primitives::Address> {
    let contract = asset.contract_address().unwrap_or_default();
    evm_address(contract, network)
}

fn categories(asset_type: AssetType) -> Vec<TransferCategory> {
    match asset_type {
        AssetType::Erc20 => vec![TransferCategory::Erc20],
        AssetType::Erc721 => vec![TransferCategory::Erc721],
        AssetType::Erc1155 => vec![TransferCategory::Erc1155],
        AssetType::Native | AssetType::Bitcoin => {
            vec![TransferCategory::External, TransferCategory::Internal]
        }
    }
}

fn block_number(transfer: &AssetTransfer) -> u64 {
    parse_quantity(&transfer.block_num)
        .ok()
        .and_then(|block| u64::try_from(block).ok())
        .unwrap_or_default()
}

/// Transfer amount in display units
///
/// NFT transfers carry no amount and count as one token.
fn transfer_value(transfer: &AssetTransfer, native_decimals: u8) -> ServiceResult<String> {
    let raw = &transfer.raw_contract;
    let Some(value) = raw.value.as_deref() else {
        let nft = matches!(transfer.category.as_str(), "erc721" | "erc1155");
        return Ok(if nft { "1" } else { "0" }.to_string());
    };

    let decimals = match raw.decimal.as_deref() {
        Some(decimal) => u8::try_from(parse_quantity(decimal)?).unwrap_or(native_decimals),
        None if raw.address.is_some() => 0,
        None => native_decimals,
    };
    Ok(to_human_unit(parse_quantity(value)?, decimals))
}

fn transaction_record(
    transfer: AssetTransfer,
    direction: Direction,
    native_decimals: u8,
) -> ServiceResult<TransactionRecord> {
    let value = transfer_value(&transfer, native_decimals)?;
    let timestamp = transfer
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.block_timestamp.as_deref())
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|time| time.timestamp());

    Ok(TransactionRecord {
        block_number: Some(block_number(&transfer)),
        hash: transfer.hash,
        from: Some(transfer.from),
        to: transfer.to,
        value,
        asset: transfer.asset,
        direction,
        status: TransactionStatus::Success,
        timestamp,
        gas_price: None,
        fee: None,
    })
}

fn owned_nft(nft: Nft) -> OwnedNft {
    let image_url = nft
        .image
        .and_then(|image| image.cached_url.or(image.original_url));
    OwnedNft {
        contract_address: nft.contract.address,
        token_id: nft.token_id,
        token_type: nft.token_type,
        name: nft.name,
        collection_name: nft.contract.name,
        image_url,
        balance: nft.balance,
    }
}

impl<E: EvmRpc> BalanceSource for EvmProvider<E> {
    async fn balance(
        &self,
        network: NetworkId,
        address: &str,
        asset: &AssetInfo,
    ) -> ServiceResult<Balance> {
        let owner = evm_address(address, network)?;

        match asset.asset_type() {
            AssetType::Native => {
                let currency = &network.network().native_currency;
                let raw = timed(PROVIDER, self.rpc.native_balance(network, owner)).await?;
                Ok(Balance {
                    raw,
                    decimals: currency.decimals,
                    symbol: Some(currency.symbol.to_string()),
                })
            }
            AssetType::Erc20 => {
                let contract = contract_of(asset, network)?;
                let (raw, decimals) = tokio::try_join!(
                    timed(PROVIDER, self.rpc.erc20_balance(network, contract, owner)),
                    timed(PROVIDER, self.rpc.erc20_decimals(network, contract)),
                )?;
                debug!(network = %network, %contract, decimals, "read ERC-20 balance");
                Ok(Balance {
                    raw,
                    decimals,
                    symbol: None,
                })
            }
            asset_type => Err(ServiceError::UnsupportedAssetType {
                operation: Operation::Balance,
                asset_type,
            }),
        }
    }
}

impl<E: EvmRpc> HistorySource for EvmProvider<E> {
    async fn history(
        &self,
        network: NetworkId,
        address: &str,
        asset: &AssetInfo,
        pagination: Pagination,
    ) -> ServiceResult<HistoryPage> {
        let owner = evm_address(address, network)?;
        let contract = if asset.asset_type().has_contract() {
            Some(contract_of(asset, network)?)
        } else {
            None
        };

        // each direction is fetched up to the window end before merging
        let pagination = pagination.within(MAX_TRANSFERS as usize)?;
        let query = TransferQuery {
            address: owner,
            contract,
            categories: categories(asset.asset_type()),
            max_count: pagination.page.saturating_mul(pagination.limit),
        };
        let page = timed(PROVIDER, self.rpc.asset_transfers(network, query)).await?;
        let upstream_has_more = page.has_more();

        let native_decimals = network.network().native_currency.decimals;
        let mut transfers: Vec<(u64, TransactionRecord)> = page
            .outgoing
            .into_iter()
            .map(|transfer| (transfer, Direction::Send))
            .chain(
                page.incoming
                    .into_iter()
                    .map(|transfer| (transfer, Direction::Receive)),
            )
            .map(|(transfer, direction)| {
                let block = block_number(&transfer);
                transaction_record(transfer, direction, native_decimals).map(|record| (block, record))
            })
            .collect::<ServiceResult<_>>()?;

        // newest first; stable so outgoing precedes incoming within a block
        transfers.sort_by(|a, b| b.0.cmp(&a.0));

        let total = transfers.len();
        let transactions: Vec<TransactionRecord> = transfers
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.limit as usize)
            .map(|(_, record)| record)
            .collect();

        info!(
            network = %network,
            total,
            returned = transactions.len(),
            "fetched EVM transfer history"
        );

        Ok(HistoryPage {
            transactions,
            has_more: total > pagination.end() || upstream_has_more,
        })
    }
}

impl<E: EvmRpc> GasSource for EvmProvider<E> {
    async fn fee_data(&self, network: NetworkId) -> ServiceResult<FeeData> {
        Ok(timed(PROVIDER, self.rpc.fee_data(network)).await?)
    }
}

impl<E: EvmRpc> NftSource for EvmProvider<E> {
    async fn owners(
        &self,
        network: NetworkId,
        contract: &str,
        token_id: Option<&str>,
    ) -> ServiceResult<Vec<NftOwner>> {
        let contract = evm_address(contract, network)?;

        if let Some(token_id) = token_id {
            let owners =
                timed(PROVIDER, self.rpc.owners_for_token(network, contract, token_id)).await?;
            return Ok(owners
                .into_iter()
                .map(|owner_address| NftOwner {
                    owner_address,
                    token_id: token_id.to_string(),
                    balance: "1".to_string(),
                })
                .collect());
        }

        let owners = timed(PROVIDER, self.rpc.owners_for_contract(network, contract)).await?;
        let flattened = owners
            .into_iter()
            .flat_map(|owner| {
                if owner.token_balances.is_empty() {
                    vec![NftOwner {
                        owner_address: owner.owner_address,
                        token_id: String::new(),
                        balance: "1".to_string(),
                    }]
                } else {
                    owner
                        .token_balances
                        .into_iter()
                        .map(|held| NftOwner {
                            owner_address: owner.owner_address.clone(),
                            token_id: held.token_id,
                            balance: held.balance,
                        })
                        .collect()
                }
            })
            .collect();
        Ok(flattened)
    }

    async fn nfts_for_owner(
        &self,
        network: NetworkId,
        owner: &str,
        contract: Option<&str>,
    ) -> ServiceResult<NftPage> {
        let owner = evm_address(owner, network)?;
        let contract = contract
            .map(|contract| evm_address(contract, network))
            .transpose()?;

        let owned = timed(PROVIDER, self.rpc.nfts_for_owner(network, owner, contract)).await?;
        Ok(NftPage {
            total_count: owned.total_count,
            page_key: owned.page_key,
            nfts: owned.owned_nfts.into_iter().map(owned_nft).collect(),
        })
    }

    async fn nft_metadata(
        &self,
        network: NetworkId,
        asset: &AssetInfo,
    ) -> ServiceResult<NftMetadata> {
        if !asset.asset_type().is_nft() {
            return Err(ServiceError::UnsupportedAssetType {
                operation: Operation::NftMetadata,
                asset_type: asset.asset_type(),
            });
        }
        let contract = contract_of(asset, network)?;

        let Some(token_id) = asset.token_id() else {
            let collection = timed(PROVIDER, self.rpc.contract_metadata(network, contract)).await?;
            return Ok(NftMetadata {
                asset_id: asset.asset_id().to_string(),
                network_id: network.to_string(),
                contract_address: collection.address,
                token_id: None,
                token_type: collection.token_type,
                name: collection.name,
                symbol: collection.symbol,
                description: None,
                image_url: None,
                token_uri: None,
                total_supply: collection.total_supply,
                metadata: None,
            });
        };

        let nft = timed(PROVIDER, self.rpc.nft_metadata(network, contract, token_id)).await?;
        let image_url = nft
            .image
            .and_then(|image| image.cached_url.or(image.original_url));
        let (token_uri, metadata) = nft
            .raw
            .map(|raw| (raw.token_uri, raw.metadata))
            .unwrap_or_default();

        Ok(NftMetadata {
            asset_id: asset.asset_id().to_string(),
            network_id: network.to_string(),
            contract_address: nft.contract.address,
            token_id: Some(nft.token_id),
            token_type: nft.token_type,
            name: nft.name,
            symbol: nft.contract.symbol,
            description: nft.description,
            image_url,
            token_uri,
            total_supply: nft.contract.total_supply,
            metadata,
        })
    }
}

impl<E: EvmRpc> TokenMetadataSource for EvmProvider<E> {
    async fn token_metadata(
        &self,
        network: NetworkId,
        asset: &AssetInfo,
    ) -> ServiceResult<TokenMetadata> {
        match asset.asset_type() {
            AssetType::Native => {
                let currency = &network.network().native_currency;
                Ok(TokenMetadata {
                    asset_id: asset.asset_id().to_string(),
                    network_id: network.to_string(),
                    asset_type: AssetType::Native,
                    contract_address: None,
                    name: Some(currency.name.to_string()),
                    symbol: Some(currency.symbol.to_string()),
                    decimals: Some(currency.decimals),
                    logo: None,
                })
            }
            AssetType::Erc20 => {
                let contract = contract_of(asset, network)?;
                let metadata = timed(PROVIDER, self.rpc.erc20_metadata(network, contract)).await?;
                Ok(TokenMetadata {
                    asset_id: asset.asset_id().to_string(),
                    network_id: network.to_string(),
                    asset_type: AssetType::Erc20,
                    contract_address: asset.contract_address().map(str::to_string),
                    name: metadata.name,
                    symbol: metadata.symbol,
                    decimals: metadata.decimals,
                    logo: metadata.logo,
                })
            }
            asset_type => Err(ServiceError::UnsupportedAssetType {
                operation: Operation::TokenMetadata,
                asset_type,
            }),
        }
    }
}
