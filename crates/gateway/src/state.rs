// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server state management module
//!
//! Shared application state: configuration, the provider registry, the
//! dispatcher built over it, and the cancellation token used for shutdown.

use std::sync::Arc;

use blockchain_service::BlockchainService;
use external_apis::{
    AlchemyClient, CoinGeckoClient, EsploraClient, ProviderRegistry, overall_status,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use utoipa::ToSchema;

use crate::config::{Environment, ServerConfig};

/// Dispatcher over the production clients
pub type GatewayService = BlockchainService<AlchemyClient, EsploraClient, CoinGeckoClient>;

/// Shared application state with cancellation token support
#[derive(Debug, Clone)]
pub struct ServerState {
    config: ServerConfig,
    registry: ProviderRegistry,
    service: Arc<GatewayService>,
    /// Cancellation token for coordinated shutdown
    pub cancellation_token: CancellationToken,
}

impl ServerState {
    /// Create new server state, wiring the dispatcher to the registry's clients
    pub fn new(
        config: ServerConfig,
        registry: ProviderRegistry,
        cancellation_token: CancellationToken,
    ) -> Self {
        let service = Arc::new(BlockchainService::new(
            registry.alchemy(),
            registry.esplora(),
            registry.coingecko(),
        ));
        Self {
            config,
            registry,
            service,
            cancellation_token,
        }
    }

    /// Server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Upstream clients
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Operation dispatcher
    pub fn service(&self) -> &GatewayService {
        &self.service
    }

    /// Probe every provider and fold the results
    pub async fn health_check(&self) -> HealthCheck {
        let results = self.registry.get_overall_health().await;
        let status = Self::convert_health_status(overall_status(&results));

        let providers = results
            .into_iter()
            .map(|result| ProviderHealth {
                provider: result.provider,
                status: Self::convert_health_status(result.status),
                response_time_ms: result.response_time_ms,
            })
            .collect();

        HealthCheck {
            status,
            version: Box::from(env!("CARGO_PKG_VERSION")),
            environment: self.config.environment,
            timestamp: chrono::Utc::now().to_rfc3339(),
            providers,
        }
    }

    fn convert_health_status(external_status: api_client::HealthStatus) -> HealthStatus {
        match external_status {
            api_client::HealthStatus::Up => HealthStatus::Up,
            api_client::HealthStatus::Degraded { reason } => HealthStatus::Degraded {
                reason: reason.into_boxed_str(),
            },
            api_client::HealthStatus::Down { reason } => HealthStatus::Down {
                reason: reason.into_boxed_str(),
            },
        }
    }
}

/// Health status of the gateway or one of its providers
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum HealthStatus {
    /// Fully operational
    Up,

    /// Not operational
    Down {
        /// Why
        reason: Box<str>,
    },

    /// Operational with impaired providers or missing credentials
    Degraded {
        /// Why
        reason: Box<str>,
    },
}

/// Probe outcome for one provider
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProviderHealth {
    /// Provider name
    pub provider: String,
    /// Probe outcome
    pub status: HealthStatus,
    /// Probe round trip in milliseconds
    pub response_time_ms: u64,
}

/// Health check report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthCheck {
    /// Overall status
    pub status: HealthStatus,
    /// Service version
    pub version: Box<str>,
    /// Environment
    pub environment: Environment,
    /// Timestamp
    pub timestamp: String,
    /// Per-provider probes
    pub providers: Vec<ProviderHealth>,
}
