// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Asset identifiers
//!
//! An asset identifier names "what asset, on what network, of what kind".
//! Two syntaxes are accepted and both resolve to the same [`AssetInfo`]:
//!
//! - CAIP-19 style: `eip155:1/erc20:0xa0b8...`, `bip122:000000000019d6689c085ae165831e93/slip44:0`
//! - legacy colon form: `ethereum`, `polygon:0xabc`, `base:0xabc:42`, `bitcoin`
//!
//! The two are told apart by the presence of `/`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::networks::NetworkId;

const BITCOIN_NETWORK: &str = "bitcoin";
const BIP122_NAMESPACE: &str = "bip122";
const EIP155_NAMESPACE: &str = "eip155";

/// Kind of asset an identifier resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    /// Native currency of an EVM network
    Native,
    /// ERC-20 fungible token
    Erc20,
    /// ERC-721 non-fungible token
    Erc721,
    /// ERC-1155 multi-token
    Erc1155,
    /// Bitcoin on the UTXO ledger
    Bitcoin,
}

impl AssetType {
    /// Returns the lowercase name used in identifiers and responses
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Erc20 => "erc20",
            Self::Erc721 => "erc721",
            Self::Erc1155 => "erc1155",
            Self::Bitcoin => "bitcoin",
        }
    }

    /// Whether the asset lives in a token contract
    pub const fn has_contract(self) -> bool {
        matches!(self, Self::Erc20 | Self::Erc721 | Self::Erc1155)
    }

    /// Whether the asset is a non-fungible token standard
    pub const fn is_nft(self) -> bool {
        matches!(self, Self::Erc721 | Self::Erc1155)
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while parsing an asset identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssetIdError {
    /// Identifier matches neither accepted grammar
    #[error("invalid asset identifier format: {asset_id:?}")]
    InvalidFormat {
        /// The rejected identifier
        asset_id: String,
    },

    /// CAIP asset namespace is not one the gateway understands
    #[error("unsupported asset namespace {namespace:?} in {asset_id:?}")]
    UnsupportedNamespace {
        /// The rejected namespace
        namespace: String,
        /// The identifier containing it
        asset_id: String,
    },
}

/// Canonical description of an asset
///
/// Built only through [`AssetInfo::parse`] or the typed constructors, so the
/// pairing between `asset_type` and the optional contract and token fields
/// always holds.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetInfo {
    asset_id: String,
    network_id: String,
    #[serde(rename = "type")]
    asset_type: AssetType,
    contract_address: Option<String>,
    token_id: Option<String>,
}

impl AssetInfo {
    /// Native currency of `network_id`
    pub fn native(asset_id: impl Into<String>, network_id: impl Into<String>) -> Self {
        let network_id = network_id.into();
        let asset_type = if network_id == BITCOIN_NETWORK {
            AssetType::Bitcoin
        } else {
            AssetType::Native
        };
        Self {
            asset_id: asset_id.into(),
            network_id,
            asset_type,
            contract_address: None,
            token_id: None,
        }
    }

    /// Bitcoin on the UTXO ledger
    pub fn bitcoin(asset_id: impl Into<String>) -> Self {
        Self::native(asset_id, BITCOIN_NETWORK)
    }

    /// ERC-20 token at `contract_address`
    pub fn erc20(
        asset_id: impl Into<String>,
        network_id: impl Into<String>,
        contract_address: impl Into<String>,
    ) -> Self {
        Self {
            asset_id: asset_id.into(),
            network_id: network_id.into(),
            asset_type: AssetType::Erc20,
            contract_address: Some(contract_address.into()),
            token_id: None,
        }
    }

    /// NFT collection or token; `nft_type` outside ERC-721/ERC-1155 is treated as ERC-721
    pub fn nft(
        asset_id: impl Into<String>,
        network_id: impl Into<String>,
        nft_type: AssetType,
        contract_address: impl Into<String>,
        token_id: Option<String>,
    ) -> Self {
        let asset_type = if nft_type.is_nft() {
            nft_type
        } else {
            AssetType::Erc721
        };
        Self {
            asset_id: asset_id.into(),
            network_id: network_id.into(),
            asset_type,
            contract_address: Some(contract_address.into()),
            token_id,
        }
    }

    /// Parses either identifier syntax
    pub fn parse(asset_id: &str) -> Result<Self, AssetIdError> {
        if asset_id.contains('/') {
            parse_caip(asset_id)
        } else {
            parse_legacy(asset_id)
        }
    }

    /// The identifier exactly as it was supplied
    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }

    /// Canonical network key, or the `namespace:reference` fallback
    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    /// Resolved asset kind
    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    /// Token contract, present for ERC-20/721/1155 assets
    pub fn contract_address(&self) -> Option<&str> {
        self.contract_address.as_deref()
    }

    /// Token instance, present when a specific NFT was addressed
    pub fn token_id(&self) -> Option<&str> {
        self.token_id.as_deref()
    }

    /// Registry entry for the network, if the network is known
    pub fn known_network(&self) -> Option<NetworkId> {
        NetworkId::from_str(&self.network_id).ok()
    }

    /// Legacy-form identifier for the same asset
    pub fn to_legacy_id(&self) -> String {
        build_asset_id(
            &self.network_id,
            self.contract_address.as_deref(),
            self.token_id.as_deref(),
        )
    }
}

impl FromStr for AssetInfo {
    type Err = AssetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AssetInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.asset_id)
    }
}

/// Builds the most specific legacy identifier available
///
/// A token id without a contract address is ignored.
pub fn build_asset_id(
    network_id: &str,
    contract_address: Option<&str>,
    token_id: Option<&str>,
) -> String {
    if network_id == BITCOIN_NETWORK {
        return BITCOIN_NETWORK.to_string();
    }

    match (contract_address, token_id) {
        (Some(contract), Some(token)) => format!("{network_id}:{contract}:{token}"),
        (Some(contract), None) => format!("{network_id}:{contract}"),
        (None, _) => network_id.to_string(),
    }
}

fn invalid(asset_id: &str) -> AssetIdError {
    AssetIdError::InvalidFormat {
        asset_id: asset_id.to_string(),
    }
}

fn parse_caip(asset_id: &str) -> Result<AssetInfo, AssetIdError> {
    let (chain, asset) = asset_id.split_once('/').ok_or_else(|| invalid(asset_id))?;

    let (chain_namespace, chain_reference) = chain
        .split_once(':')
        .filter(|(ns, reference)| !ns.is_empty() && !reference.is_empty() && !reference.contains(':'))
        .ok_or_else(|| invalid(asset_id))?;

    let (asset_namespace, asset_reference) = asset
        .split_once(':')
        .filter(|(ns, reference)| !ns.is_empty() && !reference.is_empty())
        .ok_or_else(|| invalid(asset_id))?;

    if chain_namespace == BIP122_NAMESPACE {
        return Ok(AssetInfo::bitcoin(asset_id));
    }

    let network_id = if chain_namespace == EIP155_NAMESPACE {
        chain_reference
            .parse::<u64>()
            .ok()
            .and_then(NetworkId::from_chain_reference)
            .map_or_else(
                || format!("{chain_namespace}:{chain_reference}"),
                |network| network.as_str().to_string(),
            )
    } else {
        format!("{chain_namespace}:{chain_reference}")
    };

    match asset_namespace {
        "slip44" => Ok(AssetInfo::native(asset_id, network_id)),
        "erc20" => Ok(AssetInfo::erc20(asset_id, network_id, asset_reference)),
        "erc721" | "erc1155" => {
            let nft_type = if asset_namespace == "erc721" {
                AssetType::Erc721
            } else {
                AssetType::Erc1155
            };
            let parts: Vec<&str> = asset_reference.split(':').collect();
            let (contract, token_id) = match parts.as_slice() {
                [contract, token_id] if contract.is_empty() || token_id.is_empty() => {
                    return Err(invalid(asset_id));
                }
                [contract, token_id] => (*contract, Some((*token_id).to_string())),
                _ => (asset_reference, None),
            };
            Ok(AssetInfo::nft(asset_id, network_id, nft_type, contract, token_id))
        }
        namespace => Err(AssetIdError::UnsupportedNamespace {
            namespace: namespace.to_string(),
            asset_id: asset_id.to_string(),
        }),
    }
}

fn parse_legacy(asset_id: &str) -> Result<AssetInfo, AssetIdError> {
    if asset_id == BITCOIN_NETWORK {
        return Ok(AssetInfo::bitcoin(asset_id));
    }

    let segments: Vec<&str> = asset_id.split(':').collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(invalid(asset_id));
    }

    match segments.as_slice() {
        [network] => Ok(AssetInfo::native(asset_id, *network)),
        [network, contract] => Ok(AssetInfo::erc20(asset_id, *network, *contract)),
        // ERC-1155 cannot be expressed in this form
        [network, contract, token_id] => Ok(AssetInfo::nft(
            asset_id,
            *network,
            AssetType::Erc721,
            *contract,
            Some((*token_id).to_string()),
        )),
        _ => Err(invalid(asset_id)),
    }
}
