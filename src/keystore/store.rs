//! JSON-file wallet store.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::ledger::types::Address;
use crate::ledger::wallet::Keypair;

#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("keystore I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("keystore {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no wallet with public key {0}")]
    NotFound(Address),

    #[error("stored secret key for {address} is invalid: {reason}")]
    InvalidSecret { address: String, reason: String },
}

/// One persisted wallet, in the file's camelCase layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWallet {
    /// Base58 address.
    pub public_key: String,
    /// Base64 of the 64-byte `secret || public` keypair.
    pub secret_key: String,
}

impl StoredWallet {
    pub fn from_keypair(keypair: &Keypair) -> Self {
        Self {
            public_key: keypair.pubkey().to_string(),
            secret_key: B64.encode(keypair.to_keypair_bytes()),
        }
    }

    /// Decode back into a keypair, checking it matches the stored address.
    pub fn keypair(&self) -> Result<Keypair, KeystoreError> {
        let invalid = |reason: String| KeystoreError::InvalidSecret {
            address: self.public_key.clone(),
            reason,
        };
        let bytes = B64.decode(&self.secret_key).map_err(|e| invalid(e.to_string()))?;
        let keypair = Keypair::from_keypair_bytes(&bytes).map_err(invalid)?;
        if keypair.pubkey().to_string() != self.public_key {
            return Err(invalid("public key does not match secret key".to_string()));
        }
        Ok(keypair)
    }
}

/// In-memory wallet list backed by a JSON file.
#[derive(Debug)]
pub struct WalletStore {
    path: PathBuf,
    wallets: Vec<StoredWallet>,
}

impl WalletStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, KeystoreError> {
        let path = path.into();
        let wallets = if path.exists() {
            let file = File::open(&path).map_err(|source| KeystoreError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_reader(BufReader::new(file)).map_err(|source| {
                KeystoreError::Malformed { path: path.clone(), source }
            })?
        } else {
            Vec::new()
        };

        tracing::debug!(path = %path.display(), wallets = wallets.len(), "Keystore opened");
        Ok(Self { path, wallets })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[StoredWallet] {
        &self.wallets
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }

    /// Generate a new wallet, append it and persist the whole list.
    pub fn create(&mut self) -> Result<Keypair, KeystoreError> {
        let keypair = Keypair::generate();
        self.insert(&keypair)?;
        tracing::info!(public_key = %keypair.pubkey(), "Wallet created");
        Ok(keypair)
    }

    /// Append an existing keypair and persist.
    pub fn insert(&mut self, keypair: &Keypair) -> Result<(), KeystoreError> {
        self.wallets.push(StoredWallet::from_keypair(keypair));
        if let Err(e) = self.save() {
            self.wallets.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Decode the stored keypair for `address`.
    pub fn keypair(&self, address: &Address) -> Result<Keypair, KeystoreError> {
        let wanted = address.to_string();
        self.wallets
            .iter()
            .find(|w| w.public_key == wanted)
            .ok_or(KeystoreError::NotFound(*address))?
            .keypair()
    }

    /// Write the list to a sibling temp file, then rename it over the store.
    ///
    /// The temp file is created owner-only (0600 on Unix) and the rename keeps
    /// that mode, so secrets are never world-readable and a failed write
    /// leaves the previous file intact.
    fn save(&self) -> Result<(), KeystoreError> {
        let io = |source: std::io::Error| KeystoreError::Io { path: self.path.clone(), source };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(io)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, &self.wallets)
                .map_err(|e| io(std::io::Error::other(e)))?;
            writer.flush().map_err(io)?;
        }
        temp.as_file().sync_all().map_err(io)?;
        temp.persist(&self.path).map_err(|e| io(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::open(dir.path().join("wallets.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");

        let mut store = WalletStore::open(&path).unwrap();
        let first = store.create().unwrap();
        let second = store.create().unwrap();

        let reloaded = WalletStore::open(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.entries()[0].public_key, first.pubkey().to_string());
        assert_eq!(reloaded.keypair(&second.pubkey()).unwrap().pubkey(), second.pubkey());
    }

    #[test]
    fn test_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let mut store = WalletStore::open(&path).unwrap();
        store.insert(&Keypair::from_seed([5; 32])).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let entry = &json[0];
        assert!(entry["publicKey"].is_string());
        let secret = B64.decode(entry["secretKey"].as_str().unwrap()).unwrap();
        assert_eq!(secret.len(), 64);
    }

    #[test]
    fn test_save_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let mut store = WalletStore::open(&path).unwrap();
        store.create().unwrap();
        store.create().unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("wallets.json")]);
        assert_eq!(WalletStore::open(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_failed_save_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        let mut store = WalletStore::open(&path).unwrap();
        store.create().unwrap();
        let before = std::fs::read_to_string(&path).unwrap();

        // A directory cannot be replaced by a file rename.
        let blocked = dir.path().join("blocked");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("inner"), "x").unwrap();
        let mut other = WalletStore { path: blocked, wallets: store.wallets.clone() };
        assert!(matches!(other.insert(&Keypair::from_seed([6; 32])), Err(KeystoreError::Io { .. })));
        assert_eq!(other.len(), 1);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[cfg(unix)]
    #[test]
    fn test_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        WalletStore::open(&path).unwrap().create().unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallets.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(WalletStore::open(&path), Err(KeystoreError::Malformed { .. })));
    }

    #[test]
    fn test_unknown_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::open(dir.path().join("wallets.json")).unwrap();
        let address = Address::new([1; 32]);
        assert!(matches!(store.keypair(&address), Err(KeystoreError::NotFound(_))));
    }

    #[test]
    fn test_mismatched_secret_rejected() {
        let stored = StoredWallet {
            public_key: Address::new([1; 32]).to_string(),
            secret_key: B64.encode(Keypair::from_seed([5; 32]).to_keypair_bytes()),
        };
        assert!(matches!(stored.keypair(), Err(KeystoreError::InvalidSecret { .. })));
    }
}
