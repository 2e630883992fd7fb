//! Confirmation monitoring for submitted transactions.
//!
//! # Responsibilities
//! - Poll `getSignatureStatuses` until the target commitment is reached
//! - Detect on-chain failures and expired blockhashes
//! - Give up after a bounded number of polls or an overall timeout
//!
//! Acceptance by `sendTransaction` never implies the transfer happened;
//! callers that need that guarantee must wait here.

use tokio::time::{sleep, timeout};

use crate::config::schema::ConfirmationConfig;
use crate::ledger::client::LedgerEndpoint;
use crate::ledger::types::{
    Commitment, Confirmation, Submission, TransferError, TransferResult,
};
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// Wait until `submission` reaches the configured commitment.
///
/// Returns [`TransferError::Unconfirmed`] when the attempt budget or the
/// timeout runs out, [`TransferError::TransactionFailed`] when the ledger
/// reports an execution error, and [`TransferError::Expired`] when the
/// blockhash expired before the ledger saw the transaction.
pub async fn wait_for_confirmation<E>(
    endpoint: &E,
    submission: &Submission,
    config: &ConfirmationConfig,
) -> TransferResult<Confirmation>
where
    E: LedgerEndpoint + ?Sized,
{
    let id = &submission.id;
    let mut attempts: u32 = 0;

    let polling = async {
        loop {
            if attempts >= config.max_attempts {
                return Err(TransferError::Unconfirmed { id: id.clone(), attempts });
            }
            attempts += 1;
            sleep(calculate_backoff(attempts, config.poll_interval_ms, config.max_poll_interval_ms)).await;

            let status = match endpoint.get_signature_status(id).await {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!(tx_id = %id, attempt = attempts, error = %e, "Status check failed");
                    continue;
                }
            };

            let Some(status) = status else {
                match endpoint.get_block_height().await {
                    Ok(height) if height > submission.last_valid_block_height => {
                        return Err(TransferError::Expired { id: id.clone() });
                    }
                    Ok(_) => tracing::debug!(tx_id = %id, attempt = attempts, "Transaction pending"),
                    Err(e) => tracing::warn!(tx_id = %id, error = %e, "Block height check failed"),
                }
                continue;
            };

            if let Some(err) = status.err {
                return Err(TransferError::TransactionFailed {
                    id: id.clone(),
                    error: err.to_string(),
                });
            }

            let reached = status.commitment.unwrap_or(Commitment::Processed);
            if reached >= config.commitment {
                return Ok(Confirmation {
                    id: id.clone(),
                    slot: status.slot,
                    commitment: reached,
                });
            }

            tracing::debug!(
                tx_id = %id,
                reached = %reached,
                required = %config.commitment,
                confirmations = status.confirmations,
                "Waiting for commitment"
            );
        }
    };

    let result = timeout(config.timeout(), polling).await;
    let result = match result {
        Ok(result) => result,
        Err(_) => Err(TransferError::Unconfirmed { id: id.clone(), attempts }),
    };

    metrics::record_confirmation(match &result {
        Ok(_) => "confirmed",
        Err(TransferError::TransactionFailed { .. }) => "failed",
        Err(TransferError::Expired { .. }) => "expired",
        Err(_) => "unconfirmed",
    });
    match &result {
        Ok(c) => tracing::info!(tx_id = %id, slot = c.slot, commitment = %c.commitment, "Transaction confirmed"),
        Err(e) => tracing::warn!(tx_id = %id, error = %e, "Transaction not confirmed"),
    }
    result
}
