//! Transfer submission over raw JSON-RPC.
//!
//! # Order of Operations
//! ```text
//! validate (signer, recipient, amount)     no network
//!     → build TransferInstruction
//!     → wrap in UnsignedTransaction (fee payer = sender)
//!     → getLatestBlockhash                 fetched per call, never reused
//!     → SigningAuthority::sign(message)
//!     → serialize + base64
//!     → sendTransaction
//! ```
//!
//! A returned [`Submission`] means the endpoint accepted the transaction
//! into its pending pool. Finality is checked separately with
//! [`crate::ledger::confirmation::wait_for_confirmation`].

use crate::ledger::client::LedgerEndpoint;
use crate::ledger::transaction::{SignedTransaction, TransferInstruction, UnsignedTransaction};
use crate::ledger::types::{Address, Submission, TransferError, TransferResult};
use crate::ledger::wallet::{SigningAuthority, SigningError};
use crate::observability::metrics;

/// Builds, signs and submits single transfers against one endpoint.
#[derive(Debug, Clone)]
pub struct TransferSubmitter<E> {
    endpoint: E,
}

impl<E: LedgerEndpoint> TransferSubmitter<E> {
    pub fn new(endpoint: E) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Move `amount` base units from the signer's account to `recipient`.
    ///
    /// No step is retried; each failure maps to its own [`TransferError`]
    /// variant.
    pub async fn submit_transfer(
        &self,
        signer: &dyn SigningAuthority,
        recipient: &str,
        amount: i128,
    ) -> TransferResult<Submission> {
        let result = self.submit(signer, recipient, amount).await;
        metrics::record_transfer(match &result {
            Ok(_) => "accepted",
            Err(TransferError::SubmissionRejected { kind, .. }) => kind.as_str(),
            Err(_) => "failed",
        });
        result
    }

    async fn submit(
        &self,
        signer: &dyn SigningAuthority,
        recipient: &str,
        amount: i128,
    ) -> TransferResult<Submission> {
        let sender = signer.address().ok_or(TransferError::NotConnected)?;
        let recipient: Address = recipient.parse()?;
        let lamports = u64::try_from(amount)
            .ok()
            .filter(|l| *l > 0)
            .ok_or(TransferError::InvalidAmount(amount))?;

        let mut transaction = UnsignedTransaction::new(sender)
            .add(TransferInstruction::new(sender, recipient, lamports));

        let token = self
            .endpoint
            .get_latest_blockhash()
            .await
            .map_err(TransferError::FreshnessTokenFetch)?;
        transaction.set_recent_blockhash(token.blockhash);
        tracing::debug!(
            sender = %sender,
            blockhash = %token.blockhash,
            last_valid_block_height = token.last_valid_block_height,
            "Blockhash attached"
        );

        let message = transaction.message_bytes()?;
        let signature = signer.sign(&message).await.map_err(|e| match e {
            SigningError::NotConnected => TransferError::NotConnected,
            SigningError::Rejected(reason) => TransferError::SigningRejected(reason),
        })?;

        let encoded = SignedTransaction::new(message, vec![signature])?.to_base64()?;

        let id = self.endpoint.send_transaction(&encoded).await.map_err(|e| {
            tracing::warn!(sender = %sender, recipient = %recipient, error = %e, "Transfer rejected");
            TransferError::rejected(e)
        })?;

        tracing::info!(
            tx_id = %id,
            sender = %sender,
            recipient = %recipient,
            lamports,
            "Transfer accepted"
        );

        Ok(Submission {
            id,
            last_valid_block_height: token.last_valid_block_height,
        })
    }
}
