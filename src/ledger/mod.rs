//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! Signing authority (keypair or external wallet)
//!     → submitter.rs (validate, build, fetch blockhash, sign, submit)
//!         → transaction.rs (instruction compile, wire encoding)
//!         → client.rs (JSON-RPC with timeouts)
//!     → confirmation.rs (bounded status polling)
//! ```
//!
//! # Security Constraints
//! - Key material stays behind the `SigningAuthority` trait
//! - Never log secret keys
//! - All RPC calls have configurable timeouts
//! - A blockhash is fetched for every transaction and never cached

pub mod amount;
pub mod client;
pub mod confirmation;
pub mod faucet;
pub mod submitter;
pub mod transaction;
pub mod types;
pub mod wallet;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{LedgerEndpoint, RpcClient};
pub use confirmation::wait_for_confirmation;
pub use faucet::request_airdrop;
pub use submitter::TransferSubmitter;
pub use types::{Address, RejectionKind, RpcError, Submission, TransactionId, TransferError};
pub use wallet::{Keypair, SigningAuthority, SigningError};
