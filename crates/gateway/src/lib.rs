// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Asset gateway HTTP server
//!
//! Exposes the [`blockchain_service::BlockchainService`] operations over an
//! Axum router, with hierarchical configuration, request tracing, Prometheus
//! metrics and graceful shutdown.
//!
//! # Module Structure
//!
//! - [`config`]: Server and provider configuration with hierarchical loading
//! - [`error`]: Server errors and the envelope-to-status mapping
//! - [`state`]: Shared state: provider registry, dispatcher, cancellation token
//! - [`server`]: Server lifecycle and coordinated shutdown
//! - [`routes`]: Route table and HTTP handlers
//! - [`extractors`]: JSON and query extractors that reject with envelopes
//! - [`middleware`]: HTTP metrics
//! - [`metrics`]: HTTP metrics and the `/metrics` exporter
//! - [`openapi`]: `OpenAPI` document and Swagger UI

pub mod config;
pub mod error;
pub mod extractors;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{Environment, ProvidersConfig, ServerConfig};
pub use error::{Envelope, ServerError, ServerResult, status_for};
pub use server::{Server, ShutdownConfig};
pub use state::{GatewayService, HealthCheck, ServerState};
