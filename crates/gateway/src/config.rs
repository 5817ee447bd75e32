// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Server configuration module
//!
//! Listener settings plus one section per upstream provider, loaded
//! hierarchically through the `config` crate.

use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use anyhow::{Result, anyhow, ensure};
use config::{Config, ConfigError, Environment as ConfigEnv, File};
use external_apis::{AlchemyConfig, CoinGeckoConfig, EsploraConfig};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{ServerError, ServerResult};

const DEFAULT_ALCHEMY_BASE_URL: &str = "https://{network}.g.alchemy.com";
const DEFAULT_ESPLORA_BASE_URL: &str = "https://blockstream.info/api";
const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PROVIDER_HEALTH_CHECK_TIMEOUT_SECONDS: u64 = 5;

/// A validated server port that ensures the value is appropriate for the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServerPort {
    port: u16,
    environment: Environment,
}

impl ServerPort {
    /// Create a new `ServerPort`, ensuring it's valid for the given environment
    ///
    /// # Errors
    ///
    /// Returns an error if the port is 0 in non-testing environments
    pub fn new(port: u16, environment: Environment) -> Result<Self> {
        if port == 0 && environment != Environment::Testing {
            return Err(anyhow!("port cannot be 0 in non-testing environments"));
        }
        Ok(Self { port, environment })
    }

    /// Default port for development
    pub const fn default_development() -> Self {
        Self {
            port: 3000,
            environment: Environment::Development,
        }
    }

    /// Port 0, letting the OS pick
    pub const fn testing() -> Self {
        Self {
            port: 0,
            environment: Environment::Testing,
        }
    }

    /// Get the port value
    pub fn value(&self) -> u16 {
        self.port
    }
}

impl<'de> Deserialize<'de> for ServerPort {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        // re-validated in `load` once the environment is known
        Ok(Self {
            port,
            environment: Environment::Development,
        })
    }
}

/// A validated timeout duration in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeoutSeconds(Duration);

impl TimeoutSeconds {
    /// Create a new `TimeoutSeconds`, ensuring the value is within valid bounds
    ///
    /// # Errors
    ///
    /// Returns an error if timeout is 0 or greater than 300 seconds
    pub fn new(seconds: u64) -> Result<Self> {
        ensure!(seconds != 0, "timeout must be greater than 0");
        ensure!(seconds <= 300, "timeout cannot exceed 300");
        Ok(Self(Duration::from_secs(seconds)))
    }

    /// 30 seconds
    pub const fn default_value() -> Self {
        Self(Duration::from_secs(30))
    }

    /// 5 seconds
    pub const fn testing() -> Self {
        Self(Duration::from_secs(5))
    }

    /// Get the timeout value
    pub fn value(&self) -> Duration {
        self.0
    }

    /// Whole seconds, as the provider clients take them
    pub fn as_secs(&self) -> u64 {
        self.0.as_secs()
    }
}

impl<'de> Deserialize<'de> for TimeoutSeconds {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = u64::deserialize(deserializer)?;
        Self::new(seconds).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl Default for TimeoutSeconds {
    fn default() -> Self {
        Self::default_value()
    }
}

/// Environment types for configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production environment
    Production,
    /// Development environment
    Development,
    /// Testing environment
    Testing,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Development => write!(f, "development"),
            Environment::Testing => write!(f, "testing"),
        }
    }
}

/// EVM RPC and NFT provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlchemySettings {
    /// API key; EVM operations answer `MISSING_CREDENTIAL` while unset
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL with a `{network}` placeholder for the network slug
    pub base_url: String,
    /// Request timeout
    pub timeout_seconds: TimeoutSeconds,
}

impl Default for AlchemySettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_ALCHEMY_BASE_URL.to_string(),
            timeout_seconds: TimeoutSeconds::default(),
        }
    }
}

impl AlchemySettings {
    /// Client configuration
    pub fn client_config(&self) -> AlchemyConfig {
        AlchemyConfig {
            api_key: self.api_key.clone().filter(|key| !key.trim().is_empty()),
            base_url: self.base_url.clone(),
            timeout_seconds: self.timeout_seconds.as_secs(),
            health_check_timeout_seconds: health_timeout(self.timeout_seconds),
        }
    }
}

/// Bitcoin indexer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsploraSettings {
    /// Esplora REST base URL
    pub base_url: String,
    /// Request timeout
    pub timeout_seconds: TimeoutSeconds,
}

impl Default for EsploraSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ESPLORA_BASE_URL.to_string(),
            timeout_seconds: TimeoutSeconds(Duration::from_secs(20)),
        }
    }
}

impl EsploraSettings {
    /// Client configuration
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if the base URL is empty.
    pub fn client_config(&self) -> ServerResult<EsploraConfig> {
        EsploraConfig::new(&self.base_url, self.timeout_seconds.as_secs()).map_err(|message| {
            ServerError::Config {
                message: format!("providers.esplora.base_url: {message}"),
            }
        })
    }
}

/// Price feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinGeckoSettings {
    /// Demo API key, optional
    #[serde(default)]
    pub api_key: Option<String>,
    /// v3 API base URL
    pub base_url: String,
    /// Request timeout
    pub timeout_seconds: TimeoutSeconds,
}

impl Default for CoinGeckoSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_COINGECKO_BASE_URL.to_string(),
            timeout_seconds: TimeoutSeconds(Duration::from_secs(10)),
        }
    }
}

impl CoinGeckoSettings {
    /// Client configuration
    pub fn client_config(&self) -> CoinGeckoConfig {
        CoinGeckoConfig {
            api_key: self.api_key.clone().filter(|key| !key.trim().is_empty()),
            base_url: self.base_url.clone(),
            timeout_seconds: self.timeout_seconds.as_secs(),
            health_check_timeout_seconds: health_timeout(self.timeout_seconds),
        }
    }
}

fn health_timeout(timeout: TimeoutSeconds) -> u64 {
    PROVIDER_HEALTH_CHECK_TIMEOUT_SECONDS.min(timeout.as_secs())
}

/// Upstream provider sections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// EVM provider
    #[serde(default)]
    pub alchemy: AlchemySettings,
    /// Bitcoin provider
    #[serde(default)]
    pub esplora: EsploraSettings,
    /// Price provider
    #[serde(default)]
    pub coingecko: CoinGeckoSettings,
}

/// Server configuration for different environments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: IpAddr,
    /// Server port (validated for environment compatibility)
    pub port: ServerPort,
    /// Request timeout in seconds (validated range: 1-300)
    pub timeout_seconds: TimeoutSeconds,
    /// Environment type
    pub environment: Environment,
    /// Upstream providers
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::default_development(),
            timeout_seconds: TimeoutSeconds::default(),
            environment: Environment::Development,
            providers: ProvidersConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment variables and optional configuration files
    ///
    /// # Errors
    ///
    /// Returns `ServerError::Config` if configuration is invalid or cannot be loaded.
    pub fn from_env() -> ServerResult<Self> {
        Self::load().map_err(|e| ServerError::Config {
            message: format!("failed to load configuration: {e}"),
        })
    }

    /// Load configuration using the config crate with hierarchical sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier ones):
    /// 1. Default values
    /// 2. Configuration file (config.json)
    /// 3. Environment-specific files (config.{env}.json)
    /// 4. Environment variables with the `SERVER__` prefix, `__` between nested keys
    /// 5. `ALCHEMY_API_KEY`, `COINGECKO_API_KEY` and `ESPLORA_BASE_URL`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let env_var = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let mut config_builder = Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 3000)?
            .set_default("timeout_seconds", 30)?
            .set_default("environment", "development")?
            .set_default("providers.alchemy.base_url", DEFAULT_ALCHEMY_BASE_URL)?
            .set_default("providers.alchemy.timeout_seconds", 30)?
            .set_default("providers.esplora.base_url", DEFAULT_ESPLORA_BASE_URL)?
            .set_default("providers.esplora.timeout_seconds", 20)?
            .set_default("providers.coingecko.base_url", DEFAULT_COINGECKO_BASE_URL)?
            .set_default("providers.coingecko.timeout_seconds", 10)?
            .add_source(File::with_name("config.json").required(false))
            .add_source(
                File::with_name(&format!("config.{}.json", env_var.to_lowercase())).required(false),
            )
            .add_source(
                ConfigEnv::with_prefix("SERVER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("providers.alchemy.api_key", std::env::var("ALCHEMY_API_KEY").ok())?
            .set_override_option(
                "providers.coingecko.api_key",
                std::env::var("COINGECKO_API_KEY").ok(),
            )?
            .set_override_option(
                "providers.esplora.base_url",
                std::env::var("ESPLORA_BASE_URL").ok(),
            )?;

        if std::env::var("ENVIRONMENT").is_ok() {
            config_builder = config_builder.set_override("environment", env_var.to_lowercase())?;
        }

        let config = config_builder.build()?;
        let mut server_config: Self = config.try_deserialize()?;

        server_config.port = ServerPort::new(server_config.port.value(), server_config.environment)
            .map_err(|e| ConfigError::Message(format!("invalid port configuration: {e}")))?;

        Ok(server_config)
    }

    /// Configuration for tests: port 0 and short timeouts
    pub fn for_testing() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: ServerPort::testing(),
            timeout_seconds: TimeoutSeconds::testing(),
            environment: Environment::Testing,
            providers: ProvidersConfig {
                alchemy: AlchemySettings {
                    timeout_seconds: TimeoutSeconds::testing(),
                    ..AlchemySettings::default()
                },
                esplora: EsploraSettings {
                    timeout_seconds: TimeoutSeconds::testing(),
                    ..EsploraSettings::default()
                },
                coingecko: CoinGeckoSettings {
                    timeout_seconds: TimeoutSeconds::testing(),
                    ..CoinGeckoSettings::default()
                },
            },
        }
    }

    /// Get socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port.value())
    }
}
