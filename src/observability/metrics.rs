//! Metrics collection.
//!
//! # Metrics
//! - `wallet_rpc_requests_total` (counter): RPC calls by method, outcome
//! - `wallet_transfers_total` (counter): transfer submissions by outcome
//! - `wallet_airdrops_total` (counter): airdrop requests by outcome
//! - `wallet_confirmations_total` (counter): confirmation waits by outcome
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use metrics::counter;

/// Record one JSON-RPC request.
pub fn record_rpc_request(method: &str, ok: bool) {
    counter!(
        "wallet_rpc_requests_total",
        "method" => method.to_string(),
        "outcome" => if ok { "ok" } else { "error" }
    )
    .increment(1);
}

/// Record the outcome of a transfer submission.
pub fn record_transfer(outcome: &'static str) {
    counter!("wallet_transfers_total", "outcome" => outcome).increment(1);
}

/// Record the outcome of an airdrop request.
pub fn record_airdrop(outcome: &'static str) {
    counter!("wallet_airdrops_total", "outcome" => outcome).increment(1);
}

/// Record the outcome of a confirmation wait.
pub fn record_confirmation(outcome: &'static str) {
    counter!("wallet_confirmations_total", "outcome" => outcome).increment(1);
}
