//! Test-network airdrops.

use crate::config::schema::ConfirmationConfig;
use crate::ledger::client::LedgerEndpoint;
use crate::ledger::confirmation::wait_for_confirmation;
use crate::ledger::types::{Address, Confirmation, Submission, TransferError, TransferResult};
use crate::observability::metrics;

/// Request `lamports` from the network faucet and wait for the credit to land.
///
/// Faucet refusals (rate limits, empty faucet) come back as
/// [`TransferError::SubmissionRejected`].
pub async fn request_airdrop<E>(
    endpoint: &E,
    address: &Address,
    lamports: u64,
    config: &ConfirmationConfig,
) -> TransferResult<Confirmation>
where
    E: LedgerEndpoint + ?Sized,
{
    if lamports == 0 {
        return Err(TransferError::InvalidAmount(0));
    }

    // Fetched before the request, so this blockhash is no newer than the
    // faucet's and expires no later than the airdrop transaction does.
    let token = endpoint
        .get_latest_blockhash()
        .await
        .map_err(TransferError::FreshnessTokenFetch)?;

    let id = match endpoint.request_airdrop(address, lamports).await {
        Ok(id) => id,
        Err(e) => {
            let err = TransferError::rejected(e);
            if let TransferError::SubmissionRejected { kind, reason } = &err {
                tracing::warn!(address = %address, kind = kind.as_str(), reason = %reason, "Airdrop refused");
                metrics::record_airdrop(kind.as_str());
            }
            return Err(err);
        }
    };
    metrics::record_airdrop("accepted");
    tracing::info!(address = %address, lamports, tx_id = %id, "Processing airdrop transaction");

    let submission = Submission {
        id,
        last_valid_block_height: token.last_valid_block_height,
    };
    wait_for_confirmation(endpoint, &submission, config).await
}
