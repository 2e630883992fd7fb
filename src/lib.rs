//! Devnet wallet library.
//!
//! Builds, signs and submits ledger transfers over raw JSON-RPC, confirms
//! them with bounded polling, and keeps a local JSON keystore for the CLI.

pub mod config;
pub mod keystore;
pub mod ledger;
pub mod observability;
pub mod resilience;

pub use config::WalletConfig;
pub use ledger::{TransferError, TransferSubmitter};
