// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Provider adapters
//!
//! Each adapter turns one upstream family into the capabilities of
//! [`crate::sources`], normalizing units and record shapes on the way.

pub mod bitcoin;
pub mod evm;
pub mod price;

pub use bitcoin::BitcoinProvider;
pub use evm::EvmProvider;
pub use price::PriceProvider;
