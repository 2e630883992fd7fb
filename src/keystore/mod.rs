//! Local wallet persistence.
//!
//! # Data Flow
//! ```text
//! wallets.json  ⇄  WalletStore (owned, passed to callers)
//!                      → StoredWallet { publicKey, secretKey }
//!                      → Keypair (signing authority for transfers)
//! ```
//!
//! The whole file is rewritten on every change. Transfers never read the
//! file themselves; callers decode a keypair and hand it over.

pub mod store;

pub use store::{KeystoreError, StoredWallet, WalletStore};
