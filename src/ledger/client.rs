//! Ledger JSON-RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Speak JSON-RPC 2.0 over HTTP(S) to the configured endpoint
//! - Fetch blockhashes, balances, block heights and signature statuses
//! - Submit serialized transactions and airdrop requests
//! - Bound every call with the configured timeout

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::timeout;
use uuid::Uuid;

use crate::ledger::types::{
    Address, Blockhash, Commitment, FreshnessToken, RpcConfig, RpcError, TransactionId,
    TransactionStatus,
};
use crate::observability::metrics;

/// Remote ledger operations the wallet relies on.
#[async_trait]
pub trait LedgerEndpoint: Send + Sync {
    /// Fetch a recent blockhash to use as a transaction's freshness token.
    async fn get_latest_blockhash(&self) -> Result<FreshnessToken, RpcError>;

    /// Submit a base64-encoded signed transaction.
    async fn send_transaction(&self, transaction_base64: &str) -> Result<TransactionId, RpcError>;

    /// Status of a submitted transaction; `None` while the ledger has no record of it.
    async fn get_signature_status(
        &self,
        id: &TransactionId,
    ) -> Result<Option<TransactionStatus>, RpcError>;

    /// Current block height.
    async fn get_block_height(&self) -> Result<u64, RpcError>;

    /// Balance of an account in base units.
    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError>;

    /// Ask the network faucet for test funds.
    async fn request_airdrop(&self, address: &Address, lamports: u64) -> Result<TransactionId, RpcError>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl RpcErrorObject {
    /// Fold any simulation logs from `data.logs` into the message.
    fn into_error(self) -> RpcError {
        let logs: Vec<&str> = self
            .data
            .as_ref()
            .and_then(|data| data.get("logs"))
            .and_then(Value::as_array)
            .map(|logs| logs.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let message = if logs.is_empty() {
            self.message
        } else {
            format!("{} (logs: {})", self.message, logs.join("; "))
        };
        RpcError::Rpc { code: self.code, message }
    }
}

/// Value wrapped together with the slot it was read at.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
    last_valid_block_height: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusValue {
    slot: u64,
    confirmations: Option<u64>,
    err: Option<Value>,
    confirmation_status: Option<Commitment>,
}

/// JSON-RPC client for a single ledger endpoint.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    url: url::Url,
    config: RpcConfig,
    timeout_duration: Duration,
}

impl RpcClient {
    /// Create a new client.
    ///
    /// Fails only if the configured URL does not parse; no request is made.
    pub fn new(config: RpcConfig) -> Result<Self, RpcError> {
        let url: url::Url = config.url.parse().map_err(|e| {
            RpcError::Transport(format!("Invalid RPC URL '{}': {}", config.url, e))
        })?;
        let timeout_duration = Duration::from_secs(config.timeout_secs);

        tracing::debug!(rpc_url = %url, timeout_secs = config.timeout_secs, "RPC client created");

        Ok(Self {
            http: reqwest::Client::new(),
            url,
            config,
            timeout_duration,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &RpcConfig {
        &self.config
    }

    /// Issue one JSON-RPC call and decode its `result`.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let request_id = Uuid::new_v4();
        let body = json!({
            "jsonrpc": "2.0",
            "id": request_id.to_string(),
            "method": method,
            "params": params,
        });

        let result = timeout(self.timeout_duration, self.post::<T>(&body)).await;
        let outcome = match result {
            Ok(inner) => inner,
            Err(_) => Err(RpcError::Timeout(self.config.timeout_secs)),
        };
        metrics::record_rpc_request(method, outcome.is_ok());

        let response: RpcResponse<T> = outcome.inspect_err(|e| {
            tracing::warn!(method, request_id = %request_id, error = %e, "RPC request failed");
        })?;

        if let Some(error) = response.error {
            tracing::debug!(method, request_id = %request_id, code = error.code, "RPC returned error");
            return Err(error.into_error());
        }
        response
            .result
            .ok_or_else(|| RpcError::InvalidResponse(format!("{} response has no result", method)))
    }

    async fn post<T: DeserializeOwned>(&self, body: &Value) -> Result<RpcResponse<T>, RpcError> {
        let res = self
            .http
            .post(self.url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| RpcError::Transport(e.to_string()))?;

        // JSON-RPC errors may arrive with a non-2xx status; prefer the error object.
        match serde_json::from_str::<RpcResponse<T>>(&text) {
            Ok(response) if status.is_success() || response.error.is_some() => Ok(response),
            Ok(_) => Err(RpcError::Status { status: status.as_u16(), body: text }),
            Err(_) if !status.is_success() => Err(RpcError::Status { status: status.as_u16(), body: text }),
            Err(e) => Err(RpcError::InvalidResponse(e.to_string())),
        }
    }

    fn commitment_config(&self) -> Value {
        let mut config = json!({ "commitment": self.config.commitment.as_str() });
        if let Some(slot) = self.config.min_context_slot {
            config["minContextSlot"] = json!(slot);
        }
        config
    }
}

#[async_trait]
impl LedgerEndpoint for RpcClient {
    async fn get_latest_blockhash(&self) -> Result<FreshnessToken, RpcError> {
        let response: WithContext<BlockhashValue> = self
            .call("getLatestBlockhash", json!([self.commitment_config()]))
            .await?;
        let blockhash: Blockhash = response
            .value
            .blockhash
            .parse()
            .map_err(|e| RpcError::InvalidResponse(format!("malformed blockhash: {}", e)))?;

        Ok(FreshnessToken {
            blockhash,
            last_valid_block_height: response.value.last_valid_block_height,
        })
    }

    async fn send_transaction(&self, transaction_base64: &str) -> Result<TransactionId, RpcError> {
        let options = json!({
            "encoding": "base64",
            "skipPreflight": self.config.skip_preflight,
            "preflightCommitment": self.config.commitment.as_str(),
        });
        let id: String = self
            .call("sendTransaction", json!([transaction_base64, options]))
            .await?;
        Ok(TransactionId::new(id))
    }

    async fn get_signature_status(
        &self,
        id: &TransactionId,
    ) -> Result<Option<TransactionStatus>, RpcError> {
        let response: WithContext<Vec<Option<StatusValue>>> = self
            .call(
                "getSignatureStatuses",
                json!([[id.as_str()], { "searchTransactionHistory": false }]),
            )
            .await?;

        Ok(response.value.into_iter().next().flatten().map(|s| TransactionStatus {
            slot: s.slot,
            confirmations: s.confirmations,
            err: s.err,
            commitment: s.confirmation_status,
        }))
    }

    async fn get_block_height(&self) -> Result<u64, RpcError> {
        self.call("getBlockHeight", json!([{ "commitment": self.config.commitment.as_str() }]))
            .await
    }

    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError> {
        let response: WithContext<u64> = self
            .call(
                "getBalance",
                json!([address.to_string(), { "commitment": self.config.commitment.as_str() }]),
            )
            .await?;
        Ok(response.value)
    }

    async fn request_airdrop(&self, address: &Address, lamports: u64) -> Result<TransactionId, RpcError> {
        let id: String = self
            .call("requestAirdrop", json!([address.to_string(), lamports]))
            .await?;
        Ok(TransactionId::new(id))
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("rpc_url", &self.config.url)
            .field("commitment", &self.config.commitment)
            .field("timeout_secs", &self.config.timeout_secs)
            .finish()
    }
}
