//! Signing authorities and local keypairs.
//!
//! # Security
//! - Callers only ever see a `sign` capability, never key material
//! - Keys are never logged; `Debug` prints the public key only
//! - Secret bytes leave a [`Keypair`] only through the keystore encoding

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use thiserror::Error;

use crate::ledger::types::{Address, Signature};

/// Length of the keypair encoding (secret seed followed by public key).
pub const KEYPAIR_BYTES: usize = 64;

/// Reasons a signing authority may decline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// The authority went away (wallet disconnected).
    #[error("signer is not connected")]
    NotConnected,

    /// The holder refused to sign, e.g. a user cancelled an approval prompt.
    #[error("signing rejected: {0}")]
    Rejected(String),
}

/// Holder of a private key that exposes a single signing capability.
#[async_trait]
pub trait SigningAuthority: Send + Sync {
    /// Address of the signing account, or `None` when not connected.
    fn address(&self) -> Option<Address>;

    /// Sign the exact message bytes of a transaction.
    async fn sign(&self, message: &[u8]) -> Result<Signature, SigningError>;
}

/// Local ed25519 keypair.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic keypair from a 32-byte secret seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Decode the 64-byte `secret || public` encoding.
    ///
    /// Fails if the public half does not belong to the secret half.
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, String> {
        let bytes: &[u8; KEYPAIR_BYTES] = bytes
            .try_into()
            .map_err(|_| format!("expected {} keypair bytes, got {}", KEYPAIR_BYTES, bytes.len()))?;
        let signing_key = SigningKey::from_keypair_bytes(bytes)
            .map_err(|e| format!("keypair mismatch: {}", e))?;
        Ok(Self { signing_key })
    }

    /// The 64-byte `secret || public` encoding.
    pub fn to_keypair_bytes(&self) -> [u8; KEYPAIR_BYTES] {
        self.signing_key.to_keypair_bytes()
    }

    pub fn pubkey(&self) -> Address {
        Address::new(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign synchronously; local keys never refuse.
    pub fn sign_message(&self, message: &[u8]) -> Signature {
        Signature::new(self.signing_key.sign(message).to_bytes())
    }
}

impl std::fmt::Debug for Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypair")
            .field("pubkey", &self.pubkey())
            .finish()
    }
}

#[async_trait]
impl SigningAuthority for Keypair {
    fn address(&self) -> Option<Address> {
        Some(self.pubkey())
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, SigningError> {
        Ok(self.sign_message(message))
    }
}
