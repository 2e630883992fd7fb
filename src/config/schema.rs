//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the wallet.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ledger::types::Commitment;

/// Public test-network endpoint used when nothing else is configured.
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";

/// Root configuration for the wallet.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WalletConfig {
    /// Ledger endpoint settings.
    pub rpc: RpcConfig,

    /// Confirmation polling settings.
    pub confirmation: ConfirmationConfig,

    /// Local wallet file.
    pub keystore: KeystoreConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Ledger JSON-RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint URL.
    pub url: String,

    /// RPC request timeout in seconds.
    pub timeout_secs: u64,

    /// Commitment used for blockhash, balance and preflight queries.
    pub commitment: Commitment,

    /// Minimum slot the endpoint must have reached to answer a blockhash query.
    pub min_context_slot: Option<u64>,

    /// Skip the endpoint's preflight simulation on submit.
    pub skip_preflight: bool,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            timeout_secs: 30,
            commitment: Commitment::Confirmed,
            min_context_slot: None,
            skip_preflight: false,
        }
    }
}

/// How long and how often to poll for a transaction's status.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    /// Commitment a transaction must reach to count as confirmed.
    pub commitment: Commitment,

    /// Overall time budget in seconds.
    pub timeout_secs: u64,

    /// Maximum number of status polls.
    pub max_attempts: u32,

    /// Delay before the second poll in milliseconds; doubles afterwards.
    pub poll_interval_ms: u64,

    /// Upper bound on the delay between polls in milliseconds.
    pub max_poll_interval_ms: u64,
}

impl ConfirmationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            commitment: Commitment::Confirmed,
            timeout_secs: 60,
            max_attempts: 30,
            poll_interval_ms: 500,
            max_poll_interval_ms: 4_000,
        }
    }
}

/// Keystore file configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeystoreConfig {
    /// Path to the JSON wallet file.
    pub path: PathBuf,
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("wallets.json"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence.
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "devnet_wallet=info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}
