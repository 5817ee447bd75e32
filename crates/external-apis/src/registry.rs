// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Registry of the upstream clients the gateway was started with
//!
//! Each client is built once and shared through `Arc`; the registry hands
//! out those handles and probes every provider's health concurrently.

use std::{sync::Arc, time::Instant};

use api_client::{ApiClient, HealthCheckResult, HealthStatus};
use tracing::{debug, warn};

use crate::{AlchemyClient, CoinGeckoClient, EsploraClient};

/// Shared handles to every upstream client
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    alchemy: Arc<AlchemyClient>,
    esplora: Arc<EsploraClient>,
    coingecko: Arc<CoinGeckoClient>,
}

impl ProviderRegistry {
    /// Create a registry over already-built clients
    pub fn new(alchemy: AlchemyClient, esplora: EsploraClient, coingecko: CoinGeckoClient) -> Self {
        Self {
            alchemy: Arc::new(alchemy),
            esplora: Arc::new(esplora),
            coingecko: Arc::new(coingecko),
        }
    }

    /// EVM RPC client
    pub fn alchemy(&self) -> Arc<AlchemyClient> {
        Arc::clone(&self.alchemy)
    }

    /// Bitcoin ledger client
    pub fn esplora(&self) -> Arc<EsploraClient> {
        Arc::clone(&self.esplora)
    }

    /// Price client
    pub fn coingecko(&self) -> Arc<CoinGeckoClient> {
        Arc::clone(&self.coingecko)
    }

    /// Probe every provider
    ///
    /// Health checks are performed concurrently; a probe that errors is
    /// reported as down rather than failing the whole check.
    pub async fn get_overall_health(&self) -> Vec<HealthCheckResult> {
        let (alchemy, esplora, coingecko) = tokio::join!(
            probe(self.alchemy.as_ref()),
            probe(self.esplora.as_ref()),
            probe(self.coingecko.as_ref()),
        );
        vec![alchemy, esplora, coingecko]
    }

    /// Get the names of all registered clients
    pub fn client_names(&self) -> [&'static str; 3] {
        [
            self.alchemy.name(),
            self.esplora.name(),
            self.coingecko.name(),
        ]
    }
}

async fn probe<C: ApiClient>(client: &C) -> HealthCheckResult {
    let start_time = Instant::now();
    let status = match client.health_check().await {
        Ok(status) => status,
        Err(e) => {
            warn!(provider = client.name(), error = %e, "health check failed");
            HealthStatus::Down {
                reason: format!("Health check failed: {e}"),
            }
        }
    };
    debug!(provider = client.name(), ?status, "probed provider");
    HealthCheckResult::new(client.name(), status, start_time.elapsed())
}

/// Folds per-provider results into one status
///
/// Up only when every provider is up, down only when every provider is down.
pub fn overall_status(results: &[HealthCheckResult]) -> HealthStatus {
    let down: Vec<&str> = results
        .iter()
        .filter(|result| result.status.is_down())
        .map(|result| result.provider.as_str())
        .collect();

    if !results.is_empty() && down.len() == results.len() {
        return HealthStatus::Down {
            reason: "All providers are down".to_string(),
        };
    }

    let impaired: Vec<&str> = results
        .iter()
        .filter(|result| result.status != HealthStatus::Up)
        .map(|result| result.provider.as_str())
        .collect();

    if impaired.is_empty() {
        HealthStatus::Up
    } else {
        HealthStatus::Degraded {
            reason: format!("Impaired providers: {}", impaired.join(", ")),
        }
    }
}
