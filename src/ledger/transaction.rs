//! Transaction building and wire encoding.
//!
//! # Responsibilities
//! - Describe value transfers as System Program instructions
//! - Compile instructions into the legacy message layout
//! - Refuse to produce signable bytes until a blockhash is attached
//! - Assemble signed, immutable transactions in wire form
//!
//! # Wire Layout
//! ```text
//! transaction = compact(n_sigs) || sig[64] * n_sigs || message
//! message     = header[3] || compact(n_keys) || key[32] * n_keys
//!               || blockhash[32] || compact(n_ix) || instruction * n_ix
//! instruction = program_idx || compact(n_acc) || acc_idx * n_acc
//!               || compact(data_len) || data
//! ```

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use thiserror::Error;

use crate::ledger::types::{Address, Blockhash, Signature, TransactionId, SIGNATURE_BYTES};

/// Largest serialized transaction the ledger accepts (IPv6 MTU minus headers).
pub const PACKET_DATA_SIZE: usize = 1232;

/// System Program instruction index for `Transfer`.
const SYSTEM_TRANSFER_TAG: u32 = 2;

/// Errors raised while building or serializing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("transaction has no instructions")]
    NoInstructions,

    #[error("recent blockhash has not been set")]
    MissingBlockhash,

    #[error("too many {what} ({count}) to encode")]
    TooMany { what: &'static str, count: usize },

    #[error("expected {expected} signatures, got {actual}")]
    SignatureCount { expected: usize, actual: usize },

    #[error("serialized transaction is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// Append `value` in the ledger's compact-u16 (LEB128-style) encoding.
pub fn encode_compact_u16(value: u16, out: &mut Vec<u8>) {
    let mut rem = value;
    loop {
        let mut byte = (rem & 0x7f) as u8;
        rem >>= 7;
        if rem == 0 {
            out.push(byte);
            return;
        }
        byte |= 0x80;
        out.push(byte);
    }
}

fn encode_len(len: usize, what: &'static str, out: &mut Vec<u8>) -> Result<(), TransactionError> {
    let len = u16::try_from(len).map_err(|_| TransactionError::TooMany { what, count: len })?;
    encode_compact_u16(len, out);
    Ok(())
}

/// An account referenced by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Address,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// Unsent description of value moving from one account to another.
///
/// Amounts are in base units; decimal amounts must be converted first
/// (see [`crate::ledger::amount`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferInstruction {
    pub from: Address,
    pub to: Address,
    pub lamports: u64,
}

impl TransferInstruction {
    pub fn new(from: Address, to: Address, lamports: u64) -> Self {
        Self { from, to, lamports }
    }
}

impl From<TransferInstruction> for Instruction {
    fn from(transfer: TransferInstruction) -> Self {
        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&SYSTEM_TRANSFER_TAG.to_le_bytes());
        data.extend_from_slice(&transfer.lamports.to_le_bytes());

        Instruction {
            program_id: Address::SYSTEM_PROGRAM,
            accounts: vec![
                AccountMeta { address: transfer.from, is_signer: true, is_writable: true },
                AccountMeta { address: transfer.to, is_signer: false, is_writable: true },
            ],
            data,
        }
    }
}

/// Transaction under construction. Mutable until it is signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    fee_payer: Address,
    instructions: Vec<Instruction>,
    recent_blockhash: Option<Blockhash>,
}

impl UnsignedTransaction {
    pub fn new(fee_payer: Address) -> Self {
        Self {
            fee_payer,
            instructions: Vec::new(),
            recent_blockhash: None,
        }
    }

    /// Append an instruction.
    pub fn add(mut self, instruction: impl Into<Instruction>) -> Self {
        self.instructions.push(instruction.into());
        self
    }

    /// Attach the freshness token. Replaces any earlier one.
    pub fn set_recent_blockhash(&mut self, blockhash: Blockhash) {
        self.recent_blockhash = Some(blockhash);
    }

    pub fn recent_blockhash(&self) -> Option<Blockhash> {
        self.recent_blockhash
    }

    pub fn fee_payer(&self) -> Address {
        self.fee_payer
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Compile into the message that signers sign.
    ///
    /// Fails with [`TransactionError::MissingBlockhash`] until a blockhash has
    /// been attached.
    pub fn compile(&self) -> Result<Message, TransactionError> {
        if self.instructions.is_empty() {
            return Err(TransactionError::NoInstructions);
        }
        let blockhash = self.recent_blockhash.ok_or(TransactionError::MissingBlockhash)?;

        // Merge account flags; first occurrence fixes the relative order.
        let mut metas: Vec<AccountMeta> = vec![AccountMeta {
            address: self.fee_payer,
            is_signer: true,
            is_writable: true,
        }];
        let mut upsert = |meta: AccountMeta| {
            match metas.iter_mut().find(|m| m.address == meta.address) {
                Some(existing) => {
                    existing.is_signer |= meta.is_signer;
                    existing.is_writable |= meta.is_writable;
                }
                None => metas.push(meta),
            }
        };
        for ix in &self.instructions {
            for meta in &ix.accounts {
                upsert(*meta);
            }
            upsert(AccountMeta { address: ix.program_id, is_signer: false, is_writable: false });
        }

        // Stable sort keeps the fee payer first among writable signers.
        let rank = |m: &AccountMeta| match (m.is_signer, m.is_writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        };
        metas.sort_by_key(rank);

        let num_required_signatures = metas.iter().filter(|m| m.is_signer).count();
        let num_readonly_signed = metas.iter().filter(|m| m.is_signer && !m.is_writable).count();
        let num_readonly_unsigned = metas.iter().filter(|m| !m.is_signer && !m.is_writable).count();
        if metas.len() > u8::MAX as usize {
            return Err(TransactionError::TooMany { what: "accounts", count: metas.len() });
        }

        let account_keys: Vec<Address> = metas.iter().map(|m| m.address).collect();
        let index_of = |address: &Address| -> u8 {
            // Every referenced address was inserted above.
            account_keys.iter().position(|k| k == address).unwrap_or_default() as u8
        };

        let instructions = self
            .instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: index_of(&ix.program_id),
                accounts: ix.accounts.iter().map(|m| index_of(&m.address)).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Ok(Message {
            header: MessageHeader {
                num_required_signatures: num_required_signatures as u8,
                num_readonly_signed_accounts: num_readonly_signed as u8,
                num_readonly_unsigned_accounts: num_readonly_unsigned as u8,
            },
            account_keys,
            recent_blockhash: blockhash,
            instructions,
        })
    }

    /// The exact bytes a signing authority signs.
    pub fn message_bytes(&self) -> Result<Vec<u8>, TransactionError> {
        self.compile()?.serialize()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// Compiled, signable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Address>,
    pub recent_blockhash: Blockhash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    pub fn serialize(&self) -> Result<Vec<u8>, TransactionError> {
        let mut out = Vec::with_capacity(256);
        out.push(self.header.num_required_signatures);
        out.push(self.header.num_readonly_signed_accounts);
        out.push(self.header.num_readonly_unsigned_accounts);

        encode_len(self.account_keys.len(), "accounts", &mut out)?;
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }

        out.extend_from_slice(self.recent_blockhash.as_bytes());

        encode_len(self.instructions.len(), "instructions", &mut out)?;
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            encode_len(ix.accounts.len(), "instruction accounts", &mut out)?;
            out.extend_from_slice(&ix.accounts);
            encode_len(ix.data.len(), "instruction data bytes", &mut out)?;
            out.extend_from_slice(&ix.data);
        }
        Ok(out)
    }
}

/// A transaction with all required signatures. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    signatures: Vec<Signature>,
    message: Vec<u8>,
}

impl SignedTransaction {
    /// Pair message bytes with their signatures.
    ///
    /// The number of signatures must match the message header.
    pub fn new(message: Vec<u8>, signatures: Vec<Signature>) -> Result<Self, TransactionError> {
        let expected = message.first().copied().unwrap_or_default() as usize;
        if signatures.len() != expected {
            return Err(TransactionError::SignatureCount {
                expected,
                actual: signatures.len(),
            });
        }
        Ok(Self { signatures, message })
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Id the ledger will use for this transaction (fee payer's signature).
    pub fn id(&self) -> Option<TransactionId> {
        self.signatures.first().map(|s| TransactionId::new(s.to_string()))
    }

    /// Canonical wire bytes.
    pub fn serialize(&self) -> Result<Vec<u8>, TransactionError> {
        let mut out = Vec::with_capacity(1 + self.signatures.len() * SIGNATURE_BYTES + self.message.len());
        encode_len(self.signatures.len(), "signatures", &mut out)?;
        for sig in &self.signatures {
            out.extend_from_slice(sig.as_bytes());
        }
        out.extend_from_slice(&self.message);

        if out.len() > PACKET_DATA_SIZE {
            return Err(TransactionError::TooLarge { size: out.len(), limit: PACKET_DATA_SIZE });
        }
        Ok(out)
    }

    /// Wire bytes as base64 for JSON-RPC transport.
    pub fn to_base64(&self) -> Result<String, TransactionError> {
        Ok(B64.encode(self.serialize()?))
    }
}
