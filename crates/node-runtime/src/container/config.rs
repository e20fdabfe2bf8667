//! # Node Configuration
//!
//! Environment-driven settings for one SQLChain node.
//!
//! ## Security Requirements
//!
//! - `node_seed` MUST NOT be the all-zero value in production

use shared_types::DatabaseId;
use std::time::Duration;
use thiserror::Error;

/// Default wait for in-flight calls when a database is dropped.
pub const DEFAULT_DRAIN_TIMEOUT_MS: u64 = 5_000;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Ed25519 seed for the node key. MUST be overridden in production.
    pub node_seed: [u8; 32],
    /// Databases opened at startup.
    pub databases: Vec<DatabaseId>,
    /// Upper bound on blocks or queries returned by one fetch.
    pub max_fetch_count: u32,
    /// How long `drop_database` waits for in-flight calls.
    pub drain_timeout: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_seed: [0u8; 32],
            databases: Vec::new(),
            max_fetch_count: sc_02_sqlchain::ChainConfig::DEFAULT_MAX_FETCH_COUNT,
            drain_timeout: Duration::from_millis(DEFAULT_DRAIN_TIMEOUT_MS),
        }
    }
}

impl NodeConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `SC_NODE_SEED`: node key seed, 64 hex chars
    /// - `SC_DATABASES`: comma separated database ids
    /// - `SC_MAX_FETCH_COUNT`: fetch cap (default: 1024)
    /// - `SC_DRAIN_TIMEOUT_MS`: drain wait on drop (default: 5000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(seed_hex) = lookup("SC_NODE_SEED") {
            let bytes = hex::decode(seed_hex.trim()).map_err(|_| ConfigError::InvalidValue {
                var: "SC_NODE_SEED",
                value: "<redacted>".into(),
            })?;
            config.node_seed = bytes
                .as_slice()
                .try_into()
                .map_err(|_| ConfigError::InvalidValue {
                    var: "SC_NODE_SEED",
                    value: format!("{} bytes", bytes.len()),
                })?;
        }

        if let Some(list) = lookup("SC_DATABASES") {
            config.databases = list
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(DatabaseId::new)
                .collect();
        }

        if let Some(value) = lookup("SC_MAX_FETCH_COUNT") {
            config.max_fetch_count = parse_number("SC_MAX_FETCH_COUNT", &value)?;
        }

        if let Some(value) = lookup("SC_DRAIN_TIMEOUT_MS") {
            config.drain_timeout =
                Duration::from_millis(parse_number("SC_DRAIN_TIMEOUT_MS", &value)?);
        }

        Ok(config)
    }

    /// Validate configuration for production readiness.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the node seed is the default zero value
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.node_seed == [0u8; 32] {
            return Err(ConfigError::InsecureNodeSeed);
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Node seed is not set (zero value).
    #[error(
        "SECURITY VIOLATION: node seed is default zero value. \
         Set SC_NODE_SEED environment variable."
    )]
    InsecureNodeSeed,

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}
