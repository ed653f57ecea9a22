// src/config.rs
//! Environment-driven wallet configuration.
//!
//! Configuration is read from environment variables, with a `.env` file
//! honored when present:
//! - `WALLET_NETWORK`: chain network for address handling, `mainnet` or
//!   `testnet` (default: `mainnet`)
//! - `WALLET_HTTP_TIMEOUT_SECS`: timeout for issuer HTTP calls in seconds
//!   (default: 30)

use config::{Config, ConfigError, Environment};
use dotenv::dotenv;
use serde::Deserialize;

use crate::models::block_cert::Network;

/// Runtime configuration for the wallet.
#[derive(Deserialize, Debug, Clone)]
pub struct WalletConfig {
    /// Chain network receiving addresses belong to
    pub network: Network,

    /// Timeout applied to issuer resolution and registration calls
    pub http_timeout_secs: u64,
}

impl WalletConfig {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError` if a variable is present but cannot be parsed
    /// into its typed form (e.g. an unknown network name).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load environment variables from .env file, if any
        dotenv().ok();

        Config::builder()
            .set_default("network", "mainnet")?
            .set_default("http_timeout_secs", 30)?
            .add_source(Environment::with_prefix("WALLET"))
            .build()?
            .try_deserialize()
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        WalletConfig {
            network: Network::Mainnet,
            http_timeout_secs: 30,
        }
    }
}
