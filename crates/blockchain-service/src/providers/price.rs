// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Price provider adapter over a [`PriceFeed`]

use std::{fmt, sync::Arc};

use api_client::{PriceFeed, PricePoint, PriceQuote};
use shared_types::{AssetInfo, AssetType, NetworkError, NetworkId};

use crate::{
    error::{ServiceError, ServiceResult},
    metrics::timed,
    routing::Operation,
    sources::PriceSource,
};

const PROVIDER: &str = "price";
const FEED_NAME: &str = "coingecko";

/// How the feed identifies an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Listing<'a> {
    Coin(&'static str),
    Token {
        platform: &'static str,
        contract: &'a str,
    },
}

fn listing(network: NetworkId, asset: &AssetInfo, operation: Operation) -> ServiceResult<Listing<'_>> {
    match asset.asset_type() {
        AssetType::Native | AssetType::Bitcoin => Ok(Listing::Coin(network.price_coin_id())),
        AssetType::Erc20 => {
            let platform = network
                .price_platform_id()
                .ok_or(NetworkError::MissingAlias {
                    network,
                    provider: FEED_NAME,
                })?;
            Ok(Listing::Token {
                platform,
                contract: asset.contract_address().unwrap_or_default(),
            })
        }
        asset_type => Err(ServiceError::UnsupportedAssetType {
            operation,
            asset_type,
        }),
    }
}

/// Adapter over a market data feed
pub struct PriceProvider<P> {
    feed: Arc<P>,
}

impl<P> PriceProvider<P> {
    /// Wrap a shared price feed
    pub fn new(feed: Arc<P>) -> Self {
        Self { feed }
    }
}

impl<P> Clone for PriceProvider<P> {
    fn clone(&self) -> Self {
        Self {
            feed: Arc::clone(&self.feed),
        }
    }
}

impl<P> fmt::Debug for PriceProvider<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceProvider").finish_non_exhaustive()
    }
}

impl<P: PriceFeed> PriceSource for PriceProvider<P> {
    async fn quote(
        &self,
        network: NetworkId,
        asset: &AssetInfo,
        currency: &str,
    ) -> ServiceResult<PriceQuote> {
        let quote = match listing(network, asset, Operation::Price)? {
            Listing::Coin(coin_id) => {
                timed(PROVIDER, self.feed.simple_price(coin_id, currency)).await?
            }
            Listing::Token { platform, contract } => {
                timed(PROVIDER, self.feed.token_price(platform, contract, currency)).await?
            }
        };
        Ok(quote)
    }

    async fn price_history(
        &self,
        network: NetworkId,
        asset: &AssetInfo,
        currency: &str,
        days: u32,
    ) -> ServiceResult<Vec<PricePoint>> {
        let points = match listing(network, asset, Operation::PriceHistory)? {
            Listing::Coin(coin_id) => {
                timed(PROVIDER, self.feed.market_chart(coin_id, currency, days)).await?
            }
            Listing::Token { platform, contract } => {
                timed(
                    PROVIDER,
                    self.feed
                        .contract_market_chart(platform, contract, currency, days),
                )
                .await?
            }
        };
        Ok(points)
    }
}
