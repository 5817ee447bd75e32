// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Network registry
//!
//! This module provides the static table of networks the gateway can serve,
//! together with the vocabulary each upstream provider uses to name them.
//! The registry is compiled in and never mutated at runtime.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// Canonical network identifiers known to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NetworkId {
    /// Ethereum Mainnet - Chain ID: 1
    Ethereum,
    /// Polygon PoS - Chain ID: 137
    Polygon,
    /// Arbitrum One - Chain ID: 42161
    Arbitrum,
    /// OP Mainnet - Chain ID: 10
    Optimism,
    /// Base - Chain ID: 8453
    Base,
    /// Bitcoin mainnet (UTXO ledger, no EVM chain id)
    Bitcoin,
}

impl NetworkId {
    /// Returns the canonical network key used in asset identifiers
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Polygon => "polygon",
            Self::Arbitrum => "arbitrum",
            Self::Optimism => "optimism",
            Self::Base => "base",
            Self::Bitcoin => "bitcoin",
        }
    }

    /// Returns the EIP-155 chain id, if the network is an EVM chain
    pub const fn chain_id(self) -> Option<u64> {
        match self {
            Self::Ethereum => Some(1),
            Self::Polygon => Some(137),
            Self::Arbitrum => Some(42161),
            Self::Optimism => Some(10),
            Self::Base => Some(8453),
            Self::Bitcoin => None,
        }
    }

    /// Resolves a CAIP-2 `eip155` chain reference
    pub const fn from_chain_reference(reference: u64) -> Option<Self> {
        match reference {
            1 => Some(Self::Ethereum),
            137 => Some(Self::Polygon),
            42161 => Some(Self::Arbitrum),
            10 => Some(Self::Optimism),
            8453 => Some(Self::Base),
            _ => None,
        }
    }

    /// Whether the network follows the EVM account model
    pub const fn is_evm(self) -> bool {
        !matches!(self, Self::Bitcoin)
    }

    /// Returns the registry entry for this network
    pub fn network(self) -> &'static Network {
        match self {
            Self::Ethereum => &NETWORKS[0],
            Self::Polygon => &NETWORKS[1],
            Self::Arbitrum => &NETWORKS[2],
            Self::Optimism => &NETWORKS[3],
            Self::Base => &NETWORKS[4],
            Self::Bitcoin => &NETWORKS[5],
        }
    }

    /// Coin identifier of the native currency on the price aggregator
    pub const fn price_coin_id(self) -> &'static str {
        match self {
            // Arbitrum, Optimism and Base all settle gas in ETH
            Self::Ethereum | Self::Arbitrum | Self::Optimism | Self::Base => "ethereum",
            Self::Polygon => "matic-network",
            Self::Bitcoin => "bitcoin",
        }
    }

    /// Asset platform used by the price aggregator for contract-address lookups
    pub const fn price_platform_id(self) -> Option<&'static str> {
        match self {
            Self::Ethereum => Some("ethereum"),
            Self::Polygon => Some("polygon-pos"),
            Self::Arbitrum => Some("arbitrum-one"),
            Self::Optimism => Some("optimistic-ethereum"),
            Self::Base => Some("base"),
            Self::Bitcoin => None,
        }
    }

    /// Network slug used by the EVM RPC provider in its endpoint host names
    pub const fn rpc_network_slug(self) -> Option<&'static str> {
        match self {
            Self::Ethereum => Some("eth-mainnet"),
            Self::Polygon => Some("polygon-mainnet"),
            Self::Arbitrum => Some("arb-mainnet"),
            Self::Optimism => Some("opt-mainnet"),
            Self::Base => Some("base-mainnet"),
            Self::Bitcoin => None,
        }
    }

    /// Returns all networks in registry order
    pub const fn all() -> &'static [Self] {
        &[
            Self::Ethereum,
            Self::Polygon,
            Self::Arbitrum,
            Self::Optimism,
            Self::Base,
            Self::Bitcoin,
        ]
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkId {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Numeric EVM chain ids are accepted for convenience
        if let Ok(id) = s.parse::<u64>() {
            return Self::from_chain_reference(id).ok_or_else(|| NetworkError::NotFound {
                network_id: s.to_string(),
            });
        }

        match s.to_lowercase().as_str() {
            "ethereum" | "eth" => Ok(Self::Ethereum),
            "polygon" | "matic" => Ok(Self::Polygon),
            "arbitrum" | "arb" => Ok(Self::Arbitrum),
            "optimism" | "op" => Ok(Self::Optimism),
            "base" => Ok(Self::Base),
            "bitcoin" | "btc" => Ok(Self::Bitcoin),
            _ => Err(NetworkError::NotFound {
                network_id: s.to_string(),
            }),
        }
    }
}

impl Serialize for NetworkId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NetworkId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::from_str(&value).map_err(serde::de::Error::custom)
    }
}

/// Native currency of a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NativeCurrency {
    /// Currency name
    #[schema(value_type = String)]
    pub name: &'static str,
    /// Ticker symbol
    #[schema(value_type = String)]
    pub symbol: &'static str,
    /// Number of decimals between the base unit and the display unit
    pub decimals: u8,
}

/// Static registry entry for a network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Canonical network identifier
    #[schema(value_type = String, example = "ethereum")]
    pub id: NetworkId,
    /// Human-readable network name
    #[schema(value_type = String)]
    pub name: &'static str,
    /// EIP-155 chain id (absent for Bitcoin)
    pub chain_id: Option<u64>,
    /// Native currency description
    pub native_currency: NativeCurrency,
    /// Block explorer base URL
    #[schema(value_type = String)]
    pub explorer_url: &'static str,
    /// Whether this is a test network
    pub is_testnet: bool,
}

const ETHER: NativeCurrency = NativeCurrency {
    name: "Ether",
    symbol: "ETH",
    decimals: 18,
};

static NETWORKS: [Network; 6] = [
    Network {
        id: NetworkId::Ethereum,
        name: "Ethereum",
        chain_id: Some(1),
        native_currency: ETHER,
        explorer_url: "https://etherscan.io",
        is_testnet: false,
    },
    Network {
        id: NetworkId::Polygon,
        name: "Polygon",
        chain_id: Some(137),
        native_currency: NativeCurrency {
            name: "POL",
            symbol: "POL",
            decimals: 18,
        },
        explorer_url: "https://polygonscan.com",
        is_testnet: false,
    },
    Network {
        id: NetworkId::Arbitrum,
        name: "Arbitrum One",
        chain_id: Some(42161),
        native_currency: ETHER,
        explorer_url: "https://arbiscan.io",
        is_testnet: false,
    },
    Network {
        id: NetworkId::Optimism,
        name: "OP Mainnet",
        chain_id: Some(10),
        native_currency: ETHER,
        explorer_url: "https://optimistic.etherscan.io",
        is_testnet: false,
    },
    Network {
        id: NetworkId::Base,
        name: "Base",
        chain_id: Some(8453),
        native_currency: ETHER,
        explorer_url: "https://basescan.org",
        is_testnet: false,
    },
    Network {
        id: NetworkId::Bitcoin,
        name: "Bitcoin",
        chain_id: None,
        native_currency: NativeCurrency {
            name: "Bitcoin",
            symbol: "BTC",
            decimals: 8,
        },
        explorer_url: "https://mempool.space",
        is_testnet: false,
    },
];

/// Looks up a network by its canonical key, alias, or numeric chain id
pub fn lookup(network_id: &str) -> Result<&'static Network, NetworkError> {
    NetworkId::from_str(network_id).map(NetworkId::network)
}

/// Returns every registry entry
pub fn all_networks() -> &'static [Network] {
    &NETWORKS
}

/// Error type for registry lookups
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// Network is not present in the registry
    #[error(
        "unknown network: {network_id}. Supported networks are: ethereum, polygon, arbitrum, optimism, base, bitcoin"
    )]
    NotFound {
        /// The identifier that failed to resolve
        network_id: String,
    },

    /// Network exists but the named provider has no alias for it
    #[error("network {network} has no {provider} alias")]
    MissingAlias {
        /// Network without an alias
        network: NetworkId,
        /// Provider vocabulary that was requested
        provider: &'static str,
    },
}
