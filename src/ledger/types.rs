//! Ledger-specific types and error definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export RpcConfig from config module to avoid duplication
pub use crate::config::schema::RpcConfig;

/// Length in bytes of an account address, blockhash, or public key.
pub const HASH_BYTES: usize = 32;

/// Length in bytes of an ed25519 signature.
pub const SIGNATURE_BYTES: usize = 64;

/// Errors produced while parsing an [`Address`] or [`Blockhash`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Input was not valid base58.
    #[error("invalid base58 encoding: {0}")]
    Encoding(String),

    /// Decoded value had the wrong length.
    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N], AddressError> {
    let bytes = bs58::decode(s)
        .into_vec()
        .map_err(|e| AddressError::Encoding(e.to_string()))?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| AddressError::Length {
        expected: N,
        actual: bytes.len(),
    })
}

/// Public identifier of an account.
///
/// Validity is purely syntactic: 32 bytes, written in base58. Whether the
/// account exists on the ledger is only known once it is used.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; HASH_BYTES]);

impl Address {
    /// The System Program, which owns plain value transfers.
    pub const SYSTEM_PROGRAM: Address = Address([0u8; HASH_BYTES]);

    pub const fn new(bytes: [u8; HASH_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_BYTES] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<HASH_BYTES>(s).map(Self)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// Recent blockhash used as the freshness token of a transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Blockhash([u8; HASH_BYTES]);

impl Blockhash {
    pub const fn new(bytes: [u8; HASH_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_BYTES] {
        &self.0
    }
}

impl FromStr for Blockhash {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed::<HASH_BYTES>(s).map(Self)
    }
}

impl fmt::Display for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blockhash({})", self)
    }
}

/// A blockhash together with the last block height at which the ledger still
/// accepts transactions that reference it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessToken {
    pub blockhash: Blockhash,
    pub last_valid_block_height: u64,
}

/// Ed25519 signature over a transaction message.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_BYTES]);

impl Signature {
    pub const fn new(bytes: [u8; SIGNATURE_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_BYTES] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self)
    }
}

/// Identifier the endpoint returns for an accepted transaction.
///
/// Treated as an opaque string; on Solana-style ledgers it is the base58 form
/// of the fee payer's signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a successful submission: accepted into the pending pool, not final.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub id: TransactionId,
    /// Height after which the referenced blockhash has expired.
    pub last_valid_block_height: u64,
}

/// Commitment level of a ledger query or status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Commitment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(format!("unknown commitment level '{}'", other)),
        }
    }
}

/// Status of a submitted transaction as reported by `getSignatureStatuses`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionStatus {
    pub slot: u64,
    pub confirmations: Option<u64>,
    /// On-chain execution error, if the transaction failed.
    pub err: Option<serde_json::Value>,
    pub commitment: Option<Commitment>,
}

/// Outcome of a successful confirmation wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub id: TransactionId,
    pub slot: u64,
    pub commitment: Commitment,
}

/// Errors that can occur while talking to the ledger endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RpcError {
    /// Connection or transport failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Request did not complete within the configured timeout.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Endpoint answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Endpoint answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Response did not have the expected shape.
    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// The text an endpoint gave as the reason, if any.
    pub fn reason(&self) -> String {
        match self {
            RpcError::Rpc { message, .. } => message.clone(),
            RpcError::Status { body, .. } if !body.is_empty() => body.clone(),
            other => other.to_string(),
        }
    }
}

/// Why the endpoint refused a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    InsufficientFunds,
    InvalidAccount,
    RateLimited,
    BlockhashExpired,
    /// The endpoint could not be reached; the transaction may still have landed.
    Unreachable,
    Other,
}

impl RejectionKind {
    /// Classify an endpoint failure by status code and message text.
    pub fn classify(error: &RpcError) -> Self {
        match error {
            RpcError::Status { status: 429, .. } => return RejectionKind::RateLimited,
            RpcError::Transport(_) | RpcError::Timeout(_) => return RejectionKind::Unreachable,
            _ => {}
        }

        let text = error.reason().to_lowercase();
        if text.contains("429") || text.contains("rate limit") || text.contains("too many requests") {
            RejectionKind::RateLimited
        } else if text.contains("insufficient") || text.contains("no record of a prior credit") {
            RejectionKind::InsufficientFunds
        } else if text.contains("blockhash not found") || text.contains("block height exceeded") {
            RejectionKind::BlockhashExpired
        } else if text.contains("invalid") {
            RejectionKind::InvalidAccount
        } else {
            RejectionKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionKind::InsufficientFunds => "insufficient_funds",
            RejectionKind::InvalidAccount => "invalid_account",
            RejectionKind::RateLimited => "rate_limited",
            RejectionKind::BlockhashExpired => "blockhash_expired",
            RejectionKind::Unreachable => "unreachable",
            RejectionKind::Other => "other",
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by transfer submission, airdrops, and confirmation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransferError {
    /// No signing capability is connected.
    #[error("signer is not connected")]
    NotConnected,

    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("invalid amount {0}: must be a positive number of base units")]
    InvalidAmount(i128),

    #[error("failed to fetch recent blockhash: {0}")]
    FreshnessTokenFetch(RpcError),

    #[error("signing rejected: {0}")]
    SigningRejected(String),

    #[error("failed to serialize transaction: {0}")]
    Serialization(#[from] crate::ledger::transaction::TransactionError),

    #[error("submission rejected ({kind}): {reason}")]
    SubmissionRejected { kind: RejectionKind, reason: String },

    #[error("transaction {id} not confirmed after {attempts} status checks")]
    Unconfirmed { id: TransactionId, attempts: u32 },

    #[error("transaction {id} failed on-chain: {error}")]
    TransactionFailed { id: TransactionId, error: String },

    #[error("transaction {id} expired before it was processed")]
    Expired { id: TransactionId },

    #[error("failed to fetch balance: {0}")]
    BalanceFetch(RpcError),
}

impl TransferError {
    pub(crate) fn rejected(error: RpcError) -> Self {
        TransferError::SubmissionRejected {
            kind: RejectionKind::classify(&error),
            reason: error.reason(),
        }
    }

    /// Short message suitable for showing to a person.
    ///
    /// Raw endpoint text stays in `Display` for logging.
    pub fn user_message(&self) -> String {
        match self {
            TransferError::NotConnected => "Please connect your wallet to continue.".to_string(),
            TransferError::InvalidAddress(_) => "Invalid recipient address.".to_string(),
            TransferError::InvalidAmount(_) => "Amount must be greater than zero.".to_string(),
            TransferError::FreshnessTokenFetch(RpcError::Timeout(_)) => {
                "Request timed out. Network might be congested.".to_string()
            }
            TransferError::FreshnessTokenFetch(_) => {
                "Could not reach the network. Please try again.".to_string()
            }
            TransferError::SigningRejected(_) => "Transaction was not approved.".to_string(),
            TransferError::Serialization(_) => "Failed to build the transaction.".to_string(),
            TransferError::SubmissionRejected { kind, reason } => match kind {
                RejectionKind::InsufficientFunds => "Insufficient funds for transfer.".to_string(),
                RejectionKind::InvalidAccount => "Invalid recipient address.".to_string(),
                RejectionKind::RateLimited => {
                    "Rate limit exceeded. Please wait a few minutes and try again later.".to_string()
                }
                RejectionKind::BlockhashExpired => {
                    "The transaction expired before it was accepted. Please try again.".to_string()
                }
                RejectionKind::Unreachable => {
                    "Could not reach the network. The transaction may still have been accepted."
                        .to_string()
                }
                RejectionKind::Other => format!("Failed to complete transfer: {}", reason),
            },
            TransferError::Unconfirmed { id, .. } => format!(
                "Transaction {} was submitted but is not confirmed yet. Check it again later.",
                id
            ),
            TransferError::TransactionFailed { id, .. } => {
                format!("Transaction {} failed on-chain.", id)
            }
            TransferError::Expired { id } => {
                format!("Transaction {} expired before it was processed. Please try again.", id)
            }
            TransferError::BalanceFetch(_) => "Failed to fetch balance. Please try again.".to_string(),
        }
    }
}

/// Result type for ledger operations.
pub type TransferResult<T> = Result<T, TransferError>;
