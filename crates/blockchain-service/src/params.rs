// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Request parameter validation

use alloy_primitives::Address;
use shared_types::NetworkId;

use crate::error::{ServiceError, ServiceResult};

/// Page size when none is given
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest accepted page size
pub const MAX_LIMIT: u32 = 100;
/// Days of price history when none is given
pub const DEFAULT_DAYS: u32 = 7;
/// Longest accepted price history
pub const MAX_DAYS: u32 = 3650;
/// Quote currency when none is given
pub const DEFAULT_CURRENCY: &str = "usd";
/// Most holdings valued in one portfolio request
pub const MAX_HOLDINGS: usize = 50;

/// Page and page size of a history query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number, starting at 1
    pub page: u32,
    /// Entries per page
    pub limit: u32,
}

impl Pagination {
    /// Validates optional page and limit, applying defaults
    pub fn new(page: Option<u32>, limit: Option<u32>) -> ServiceResult<Self> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(ServiceError::invalid_parameter(
                "page",
                "must be at least 1",
            ));
        }

        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(ServiceError::invalid_parameter(
                "limit",
                format!("must be between 1 and {MAX_LIMIT}"),
            ));
        }

        Ok(Self { page, limit })
    }

    /// Index of the first entry on this page
    pub fn offset(self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }

    /// Index one past the last entry on this page
    pub fn end(self) -> usize {
        self.offset().saturating_add(self.limit as usize)
    }

    /// Rejects pages reaching past the first `cap` entries
    pub fn within(self, cap: usize) -> ServiceResult<Self> {
        if self.end() > cap {
            return Err(ServiceError::invalid_parameter(
                "page",
                format!(
                    "page {} of size {} reaches past the first {cap} entries",
                    self.page, self.limit
                ),
            ));
        }
        Ok(self)
    }
}

/// Validates an optional day count, applying the default
pub fn days(days: Option<u32>) -> ServiceResult<u32> {
    let days = days.unwrap_or(DEFAULT_DAYS);
    if (1..=MAX_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(ServiceError::invalid_parameter(
            "days",
            format!("must be between 1 and {MAX_DAYS}"),
        ))
    }
}

/// Lowercases the quote currency, applying the default
pub fn currency(currency: Option<&str>) -> ServiceResult<String> {
    let currency = currency.map_or(DEFAULT_CURRENCY, str::trim);
    if currency.is_empty() || !currency.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ServiceError::invalid_parameter(
            "currency",
            format!("{currency:?} is not a currency code"),
        ));
    }
    Ok(currency.to_lowercase())
}

/// Parses a 20-byte hex address
pub fn evm_address(address: &str, network: NetworkId) -> ServiceResult<Address> {
    address
        .trim()
        .parse::<Address>()
        .map_err(|_| ServiceError::InvalidAddress {
            address: address.to_string(),
            network: network.to_string(),
        })
}

/// Light shape check of a Bitcoin address; the ledger has the final say
pub fn bitcoin_address(address: &str) -> ServiceResult<&str> {
    let address = address.trim();
    let well_formed = (26..=90).contains(&address.len())
        && address.chars().all(|c| c.is_ascii_alphanumeric());
    if well_formed {
        Ok(address)
    } else {
        Err(ServiceError::InvalidAddress {
            address: address.to_string(),
            network: NetworkId::Bitcoin.to_string(),
        })
    }
}
