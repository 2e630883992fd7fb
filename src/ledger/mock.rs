//! In-memory ledger and signer used by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ledger::client::LedgerEndpoint;
use crate::ledger::types::{
    Address, Blockhash, FreshnessToken, RpcError, Signature, TransactionId, TransactionStatus,
};
use crate::ledger::wallet::{Keypair, SigningAuthority, SigningError};

/// One observed interaction, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    FetchBlockhash,
    Sign,
    Submit,
    Status,
    BlockHeight,
    Balance,
    Airdrop,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

#[derive(Default)]
struct State {
    blockhash_error: Option<RpcError>,
    issued: Vec<Blockhash>,
    submit_result: Option<Result<TransactionId, RpcError>>,
    submitted: Vec<String>,
    statuses: VecDeque<Result<Option<TransactionStatus>, RpcError>>,
    block_height: u64,
    balance: u64,
    airdrop_result: Option<Result<TransactionId, RpcError>>,
}

/// Scripted [`LedgerEndpoint`] that records every call.
#[derive(Clone, Default)]
pub struct MockLedger {
    calls: CallLog,
    state: Arc<Mutex<State>>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blockhash_error(self, error: RpcError) -> Self {
        self.state.lock().unwrap().blockhash_error = Some(error);
        self
    }

    pub fn with_submit_result(self, result: Result<TransactionId, RpcError>) -> Self {
        self.state.lock().unwrap().submit_result = Some(result);
        self
    }

    pub fn with_airdrop_result(self, result: Result<TransactionId, RpcError>) -> Self {
        self.state.lock().unwrap().airdrop_result = Some(result);
        self
    }

    /// Queue the answers for successive status polls. Once drained, polls
    /// report the transaction as unknown.
    pub fn with_statuses(
        self,
        statuses: impl IntoIterator<Item = Result<Option<TransactionStatus>, RpcError>>,
    ) -> Self {
        self.state.lock().unwrap().statuses.extend(statuses);
        self
    }

    pub fn with_block_height(self, height: u64) -> Self {
        self.state.lock().unwrap().block_height = height;
        self
    }

    pub fn with_balance(self, lamports: u64) -> Self {
        self.state.lock().unwrap().balance = lamports;
        self
    }

    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }

    pub fn recorded(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn blockhash_fetches(&self) -> usize {
        self.recorded().iter().filter(|c| **c == Call::FetchBlockhash).count()
    }

    pub fn issued_blockhashes(&self) -> Vec<Blockhash> {
        self.state.lock().unwrap().issued.clone()
    }

    pub fn submitted(&self) -> Vec<String> {
        self.state.lock().unwrap().submitted.clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LedgerEndpoint for MockLedger {
    async fn get_latest_blockhash(&self) -> Result<FreshnessToken, RpcError> {
        self.record(Call::FetchBlockhash);
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.blockhash_error.clone() {
            return Err(err);
        }
        let n = state.issued.len() as u8 + 1;
        let blockhash = Blockhash::new([n; 32]);
        state.issued.push(blockhash);
        Ok(FreshnessToken {
            blockhash,
            last_valid_block_height: 150 + n as u64,
        })
    }

    async fn send_transaction(&self, transaction_base64: &str) -> Result<TransactionId, RpcError> {
        self.record(Call::Submit);
        let mut state = self.state.lock().unwrap();
        state.submitted.push(transaction_base64.to_string());
        state
            .submit_result
            .clone()
            .unwrap_or_else(|| Ok(TransactionId::new(format!("tx{}", state.submitted.len()))))
    }

    async fn get_signature_status(
        &self,
        _id: &TransactionId,
    ) -> Result<Option<TransactionStatus>, RpcError> {
        self.record(Call::Status);
        self.state.lock().unwrap().statuses.pop_front().unwrap_or(Ok(None))
    }

    async fn get_block_height(&self) -> Result<u64, RpcError> {
        self.record(Call::BlockHeight);
        Ok(self.state.lock().unwrap().block_height)
    }

    async fn get_balance(&self, _address: &Address) -> Result<u64, RpcError> {
        self.record(Call::Balance);
        Ok(self.state.lock().unwrap().balance)
    }

    async fn request_airdrop(&self, _address: &Address, _lamports: u64) -> Result<TransactionId, RpcError> {
        self.record(Call::Airdrop);
        self.state
            .lock()
            .unwrap()
            .airdrop_result
            .clone()
            .unwrap_or_else(|| Ok(TransactionId::new("airdrop1")))
    }
}

/// Signing authority that logs into the same call log as a [`MockLedger`].
pub struct MockSigner {
    keypair: Keypair,
    calls: CallLog,
    connected: bool,
    reject: Option<String>,
    signed: Mutex<Vec<Vec<u8>>>,
}

impl MockSigner {
    pub fn new(calls: CallLog) -> Self {
        Self {
            keypair: Keypair::from_seed([1; 32]),
            calls,
            connected: true,
            reject: None,
            signed: Mutex::new(Vec::new()),
        }
    }

    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    pub fn rejecting(mut self, reason: &str) -> Self {
        self.reject = Some(reason.to_string());
        self
    }

    pub fn signed_messages(&self) -> Vec<Vec<u8>> {
        self.signed.lock().unwrap().clone()
    }
}

#[async_trait]
impl SigningAuthority for MockSigner {
    fn address(&self) -> Option<Address> {
        self.connected.then(|| self.keypair.pubkey())
    }

    async fn sign(&self, message: &[u8]) -> Result<Signature, SigningError> {
        self.calls.lock().unwrap().push(Call::Sign);
        if let Some(reason) = &self.reject {
            return Err(SigningError::Rejected(reason.clone()));
        }
        self.signed.lock().unwrap().push(message.to_vec());
        Ok(self.keypair.sign_message(message))
    }
}
