// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Provider dispatcher
//!
//! [`BlockchainService`] resolves the asset or network of a request, picks
//! a provider family from the routing table, and wraps the outcome in an
//! [`ApiResponse`]. It holds no mutable state and is cheap to clone.

use std::{fmt, str::FromStr, sync::Arc, time::Instant};

use alloy_primitives::U256;
use api_client::{EvmRpc, PriceFeed, UtxoLedger};
use futures::future::try_join_all;
use shared_types::{
    ApiResponse, AssetInfo, AssetType, Network, NetworkId, UnitError, all_networks,
    to_human_unit, units::GWEI_DECIMALS,
};
use tracing::{debug, instrument};

use crate::{
    error::{ServiceError, ServiceResult, respond},
    params::{self, MAX_HOLDINGS, Pagination},
    providers::{BitcoinProvider, EvmProvider, PriceProvider},
    routing::{Operation, Route, effective_asset_type, network_asset_type, route},
    sources::{
        BalanceSource, GasSource, HistorySource, NftSource, PriceSource, TokenMetadataSource,
    },
    types::{
        BalanceData, GasData, GasMode, HistoryData, NftMetadata, NftOwnersData, NftsForOwnerData,
        PortfolioData, PortfolioEntry, PortfolioRequest, PriceData, PriceHistoryData,
        PriceSample, TokenMetadata,
    },
};

/// An asset identifier resolved against the network registry
struct Resolved {
    asset: AssetInfo,
    network: NetworkId,
    asset_type: AssetType,
}

impl Resolved {
    fn parse(asset_id: &str) -> ServiceResult<Self> {
        let asset = AssetInfo::parse(asset_id.trim())?;
        let network = NetworkId::from_str(asset.network_id())?;
        let asset_type = effective_asset_type(asset.asset_type(), network);
        Ok(Self {
            asset,
            network,
            asset_type,
        })
    }
}

/// Uniform entry point over every upstream provider
pub struct BlockchainService<E, U, P> {
    evm: EvmProvider<E>,
    bitcoin: BitcoinProvider<U>,
    price: PriceProvider<P>,
}

impl<E, U, P> Clone for BlockchainService<E, U, P> {
    fn clone(&self) -> Self {
        Self {
            evm: self.evm.clone(),
            bitcoin: self.bitcoin.clone(),
            price: self.price.clone(),
        }
    }
}

impl<E, U, P> fmt::Debug for BlockchainService<E, U, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockchainService")
            .field("evm", &self.evm)
            .field("bitcoin", &self.bitcoin)
            .field("price", &self.price)
            .finish()
    }
}

impl<E, U, P> BlockchainService<E, U, P>
where
    E: EvmRpc,
    U: UtxoLedger,
    P: PriceFeed,
{
    /// Create a dispatcher over shared upstream clients
    pub fn new(evm: Arc<E>, ledger: Arc<U>, feed: Arc<P>) -> Self {
        Self {
            evm: EvmProvider::new(evm),
            bitcoin: BitcoinProvider::new(ledger),
            price: PriceProvider::new(feed),
        }
    }

    /// Provider family for `operation`, checked against the network
    fn route(
        operation: Operation,
        asset_type: AssetType,
        network: NetworkId,
    ) -> ServiceResult<Route> {
        let unsupported = || ServiceError::UnsupportedOperation {
            operation,
            network: network.to_string(),
        };
        match route(operation, asset_type).ok_or_else(unsupported)? {
            Route::Evm if !network.is_evm() => Err(unsupported()),
            Route::Bitcoin if network != NetworkId::Bitcoin => Err(unsupported()),
            chosen => {
                debug!(operation = %operation, network = %network, route = ?chosen, "routed");
                Ok(chosen)
            }
        }
    }

    /// Balance of `address` in `asset_id`, in display and base units
    #[instrument(skip(self))]
    pub async fn get_balance(&self, address: &str, asset_id: &str) -> ApiResponse<BalanceData> {
        respond(
            Operation::Balance,
            Instant::now(),
            self.balance(address, asset_id).await,
        )
    }

    async fn balance(&self, address: &str, asset_id: &str) -> ServiceResult<BalanceData> {
        let Resolved {
            asset,
            network,
            asset_type,
        } = Resolved::parse(asset_id)?;

        let balance = match Self::route(Operation::Balance, asset_type, network)? {
            Route::Evm => self.evm.balance(network, address, &asset).await?,
            Route::Bitcoin => self.bitcoin.balance(network, address, &asset).await?,
            Route::Price | Route::Local => {
                return Err(ServiceError::UnsupportedOperation {
                    operation: Operation::Balance,
                    network: network.to_string(),
                });
            }
        };

        Ok(BalanceData {
            address: address.trim().to_string(),
            asset_id: asset.asset_id().to_string(),
            network_id: network.to_string(),
            asset_type,
            balance: to_human_unit(balance.raw, balance.decimals),
            raw_balance: balance.raw.to_string(),
            decimals: balance.decimals,
            symbol: balance.symbol,
        })
    }

    /// Current gas price of an EVM network
    ///
    /// `mode` is `legacy` (default) or `eip1559`.
    #[instrument(skip(self))]
    pub async fn get_gas(&self, network_id: &str, mode: Option<&str>) -> ApiResponse<GasData> {
        respond(
            Operation::Gas,
            Instant::now(),
            self.gas(network_id, mode).await,
        )
    }

    async fn gas(&self, network_id: &str, mode: Option<&str>) -> ServiceResult<GasData> {
        let network = NetworkId::from_str(network_id.trim())?;
        let mode = mode
            .map(GasMode::from_str)
            .transpose()
            .map_err(|reason| ServiceError::invalid_parameter("type", reason))?
            .unwrap_or_default();

        Self::route(Operation::Gas, network_asset_type(network), network)?;
        let fees = self.evm.fee_data(network).await?;

        let gas_price = fees.gas_price.unwrap_or(U256::ZERO);
        let (max_fee_per_gas, max_priority_fee_per_gas) = match mode {
            GasMode::Legacy => (None, None),
            GasMode::Eip1559 => (
                fees.max_fee_per_gas.map(|fee| fee.to_string()),
                fees.max_priority_fee_per_gas.map(|fee| fee.to_string()),
            ),
        };

        Ok(GasData {
            network_id: network.to_string(),
            mode,
            gas_price: gas_price.to_string(),
            gas_price_gwei: to_human_unit(gas_price, GWEI_DECIMALS),
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }

    /// Spot price of `asset_id`
    #[instrument(skip(self))]
    pub async fn get_price(&self, asset_id: &str, currency: Option<&str>) -> ApiResponse<PriceData> {
        respond(
            Operation::Price,
            Instant::now(),
            self.price(asset_id, currency).await,
        )
    }

    async fn price(&self, asset_id: &str, currency: Option<&str>) -> ServiceResult<PriceData> {
        let currency = params::currency(currency)?;
        let Resolved { asset, network, asset_type } = Resolved::parse(asset_id)?;
        Self::route(Operation::Price, asset_type, network)?;

        let quote = self.price.quote(network, &asset, &currency).await?;
        Ok(PriceData {
            asset_id: asset.asset_id().to_string(),
            currency,
            price: quote.price,
            change_24h: quote.change_24h,
            volume_24h: quote.volume_24h,
            market_cap: quote.market_cap,
        })
    }

    /// Price series of `asset_id` over the last `days` days
    #[instrument(skip(self))]
    pub async fn get_price_history(
        &self,
        asset_id: &str,
        days: Option<u32>,
        currency: Option<&str>,
    ) -> ApiResponse<PriceHistoryData> {
        respond(
            Operation::PriceHistory,
            Instant::now(),
            self.price_history(asset_id, days, currency).await,
        )
    }

    async fn price_history(
        &self,
        asset_id: &str,
        days: Option<u32>,
        currency: Option<&str>,
    ) -> ServiceResult<PriceHistoryData> {
        let days = params::days(days)?;
        let currency = params::currency(currency)?;
        let Resolved { asset, network, asset_type } = Resolved::parse(asset_id)?;
        Self::route(Operation::PriceHistory, asset_type, network)?;

        let points = self
            .price
            .price_history(network, &asset, &currency, days)
            .await?;
        Ok(PriceHistoryData {
            asset_id: asset.asset_id().to_string(),
            currency,
            days,
            prices: points
                .into_iter()
                .map(|point| PriceSample {
                    timestamp: point.timestamp,
                    price: point.price,
                })
                .collect(),
        })
    }

    /// One page of transaction history of `address` in `asset_id`
    #[instrument(skip(self))]
    pub async fn get_history(
        &self,
        address: &str,
        asset_id: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> ApiResponse<HistoryData> {
        respond(
            Operation::History,
            Instant::now(),
            self.history(address, asset_id, page, limit).await,
        )
    }

    async fn history(
        &self,
        address: &str,
        asset_id: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> ServiceResult<HistoryData> {
        let pagination = Pagination::new(page, limit)?;
        let Resolved { asset, network, asset_type } = Resolved::parse(asset_id)?;

        let history = match Self::route(Operation::History, asset_type, network)? {
            Route::Evm => {
                self.evm
                    .history(network, address, &asset, pagination)
                    .await?
            }
            Route::Bitcoin => {
                self.bitcoin
                    .history(network, address, &asset, pagination)
                    .await?
            }
            Route::Price | Route::Local => {
                return Err(ServiceError::UnsupportedOperation {
                    operation: Operation::History,
                    network: network.to_string(),
                });
            }
        };

        Ok(HistoryData {
            address: address.trim().to_string(),
            asset_id: asset.asset_id().to_string(),
            network_id: network.to_string(),
            page: pagination.page,
            limit: pagination.limit,
            has_more: history.has_more,
            transactions: history.transactions,
        })
    }

    /// Owners of an NFT collection, or of one token when `token_id` is given
    #[instrument(skip(self))]
    pub async fn get_nft_owners(
        &self,
        contract: &str,
        network_id: &str,
        token_id: Option<&str>,
    ) -> ApiResponse<NftOwnersData> {
        respond(
            Operation::NftOwners,
            Instant::now(),
            self.nft_owners(contract, network_id, token_id).await,
        )
    }

    async fn nft_owners(
        &self,
        contract: &str,
        network_id: &str,
        token_id: Option<&str>,
    ) -> ServiceResult<NftOwnersData> {
        let network = NetworkId::from_str(network_id.trim())?;
        Self::route(Operation::NftOwners, network_asset_type(network), network)?;
        let token_id = token_id.map(str::trim).filter(|id| !id.is_empty());

        let owners = self.evm.owners(network, contract, token_id).await?;
        Ok(NftOwnersData {
            contract_address: contract.trim().to_string(),
            network_id: network.to_string(),
            token_id: token_id.map(str::to_string),
            owners,
        })
    }

    /// NFTs held by `owner`, optionally limited to one collection
    #[instrument(skip(self))]
    pub async fn get_nfts_for_owner(
        &self,
        owner: &str,
        network_id: &str,
        contract: Option<&str>,
    ) -> ApiResponse<NftsForOwnerData> {
        respond(
            Operation::NftsForOwner,
            Instant::now(),
            self.nfts_for_owner(owner, network_id, contract).await,
        )
    }

    async fn nfts_for_owner(
        &self,
        owner: &str,
        network_id: &str,
        contract: Option<&str>,
    ) -> ServiceResult<NftsForOwnerData> {
        let network = NetworkId::from_str(network_id.trim())?;
        Self::route(Operation::NftsForOwner, network_asset_type(network), network)?;
        let contract = contract.map(str::trim).filter(|c| !c.is_empty());

        let page = self.evm.nfts_for_owner(network, owner, contract).await?;
        Ok(NftsForOwnerData {
            owner: owner.trim().to_string(),
            network_id: network.to_string(),
            total_count: page.total_count,
            page_key: page.page_key,
            nfts: page.nfts,
        })
    }

    /// Name, symbol and decimals of a fungible asset
    #[instrument(skip(self))]
    pub async fn get_token_metadata(&self, asset_id: &str) -> ApiResponse<TokenMetadata> {
        respond(
            Operation::TokenMetadata,
            Instant::now(),
            self.token_metadata(asset_id).await,
        )
    }

    async fn token_metadata(&self, asset_id: &str) -> ServiceResult<TokenMetadata> {
        let Resolved { asset, network, asset_type } = Resolved::parse(asset_id)?;
        match Self::route(Operation::TokenMetadata, asset_type, network)? {
            Route::Evm => self.evm.token_metadata(network, &asset).await,
            Route::Local => self.bitcoin.token_metadata(network, &asset).await,
            Route::Bitcoin | Route::Price => Err(ServiceError::UnsupportedOperation {
                operation: Operation::TokenMetadata,
                network: network.to_string(),
            }),
        }
    }

    /// Metadata of an NFT, or of its collection when no token id is given
    #[instrument(skip(self))]
    pub async fn get_nft_metadata(&self, asset_id: &str) -> ApiResponse<NftMetadata> {
        respond(
            Operation::NftMetadata,
            Instant::now(),
            self.nft_metadata(asset_id).await,
        )
    }

    async fn nft_metadata(&self, asset_id: &str) -> ServiceResult<NftMetadata> {
        let Resolved { asset, network, asset_type } = Resolved::parse(asset_id)?;
        Self::route(Operation::NftMetadata, asset_type, network)?;
        self.evm.nft_metadata(network, &asset).await
    }

    /// Values several holdings in one currency
    ///
    /// Balance and price of every holding are fetched concurrently. The first
    /// failure fails the whole request.
    #[instrument(skip(self, request), fields(holdings = request.holdings.len()))]
    pub async fn get_portfolio(&self, request: PortfolioRequest) -> ApiResponse<PortfolioData> {
        respond(
            Operation::Portfolio,
            Instant::now(),
            self.portfolio(request).await,
        )
    }

    async fn portfolio(&self, request: PortfolioRequest) -> ServiceResult<PortfolioData> {
        if request.holdings.is_empty() {
            return Err(ServiceError::invalid_parameter(
                "holdings",
                "at least one holding is required",
            ));
        }
        if request.holdings.len() > MAX_HOLDINGS {
            return Err(ServiceError::invalid_parameter(
                "holdings",
                format!("at most {MAX_HOLDINGS} holdings are accepted"),
            ));
        }
        let currency = params::currency(request.currency.as_deref())?;

        let holdings = try_join_all(request.holdings.iter().map(|holding| {
            let currency = currency.as_str();
            async move {
                let (balance, quote) = tokio::try_join!(
                    self.balance(&holding.address, &holding.asset_id),
                    self.price(&holding.asset_id, Some(currency)),
                )?;
                let amount = balance
                    .balance
                    .parse::<f64>()
                    .map_err(|_| UnitError::InvalidAmount(balance.balance.clone()))?;

                Ok::<_, ServiceError>(PortfolioEntry {
                    address: balance.address,
                    asset_id: balance.asset_id,
                    network_id: balance.network_id,
                    value: amount * quote.price,
                    balance: balance.balance,
                    price: quote.price,
                })
            }
        }))
        .await?;

        let total_value = holdings.iter().map(|entry| entry.value).sum();
        Ok(PortfolioData {
            currency,
            total_value,
            holdings,
        })
    }

    /// Every network in the registry
    pub fn list_networks(&self) -> ApiResponse<Vec<Network>> {
        respond(
            Operation::Networks,
            Instant::now(),
            Ok(all_networks().to_vec()),
        )
    }
}
