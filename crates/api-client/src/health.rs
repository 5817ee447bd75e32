// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Health check types for upstream providers

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health status of an upstream provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum HealthStatus {
    /// Provider answered its probe
    Up,
    /// Provider answered but is throttling or misconfigured
    Degraded { reason: String },
    /// Provider could not be reached
    Down { reason: String },
}

impl HealthStatus {
    /// Check if this health status indicates the service is available
    pub fn is_available(&self) -> bool {
        matches!(self, HealthStatus::Up | HealthStatus::Degraded { .. })
    }

    /// Check if this health status indicates the service is completely down
    pub fn is_down(&self) -> bool {
        matches!(self, HealthStatus::Down { .. })
    }

    /// Get a human-readable description of the status
    pub fn description(&self) -> &str {
        match self {
            HealthStatus::Up => "Service is healthy",
            HealthStatus::Degraded { reason } | HealthStatus::Down { reason } => reason,
        }
    }
}

/// Outcome of probing one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResult {
    /// Provider name as reported by `ApiClient::name`
    pub provider: String,
    /// The health status
    #[serde(flatten)]
    pub status: HealthStatus,
    /// Probe round trip in milliseconds
    pub response_time_ms: u64,
    /// When the probe finished
    pub timestamp: DateTime<Utc>,
}

impl HealthCheckResult {
    /// Records a probe outcome
    pub fn new(provider: impl Into<String>, status: HealthStatus, response_time: Duration) -> Self {
        Self {
            provider: provider.into(),
            status,
            response_time_ms: u64::try_from(response_time.as_millis()).unwrap_or(u64::MAX),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_status_availability() {
        assert!(HealthStatus::Up.is_available());
        assert!(
            HealthStatus::Degraded {
                reason: "slow".to_string()
            }
            .is_available()
        );
        assert!(
            HealthStatus::Down {
                reason: "offline".to_string()
            }
            .is_down()
        );
        assert!(!HealthStatus::Up.is_down());
    }

    #[test]
    fn result_serializes_flat() {
        let result = HealthCheckResult::new(
            "esplora",
            HealthStatus::Degraded {
                reason: "Rate limited".to_string(),
            },
            Duration::from_millis(42),
        );
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["provider"], "esplora");
        assert_eq!(value["status"], "degraded");
        assert_eq!(value["reason"], "Rate limited");
        assert_eq!(value["responseTimeMs"], 42);
    }
}
