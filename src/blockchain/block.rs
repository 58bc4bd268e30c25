use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::crypto::sha256_hex;
use super::transaction::Transaction;

/// Length of a SHA-256 digest in hexadecimal characters
pub const HASH_HEX_LEN: usize = 64;

/// Errors that can occur while hashing or mining a block
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Difficulty {0} is unreachable: a block hash has only 64 hex characters")]
    DifficultyUnreachable(usize),

    #[error("Nonce space exhausted for block {0}")]
    NonceExhausted(u64),
}

/// Contents of a block: the genesis marker or a batch of transactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockPayload {
    Genesis(String),
    Transactions(Vec<Transaction>),
}

impl BlockPayload {
    /// Transactions carried by the payload; empty for the genesis marker
    pub fn transactions(&self) -> &[Transaction] {
        match self {
            BlockPayload::Genesis(_) => &[],
            BlockPayload::Transactions(transactions) => transactions,
        }
    }

    pub fn transactions_mut(&mut self) -> &mut [Transaction] {
        match self {
            BlockPayload::Genesis(_) => &mut [],
            BlockPayload::Transactions(transactions) => transactions,
        }
    }
}

/// Represents a block in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Index of the block in the chain
    pub index: u64,

    /// Timestamp when the block was created
    pub timestamp: DateTime<Utc>,

    /// Transactions included in this block, or the genesis marker
    #[serde(rename = "transactions")]
    pub payload: BlockPayload,

    /// Hash of the previous block
    pub previous_hash: String,

    /// Proof of work counter
    pub nonce: u64,

    /// Hash of the current block
    pub hash: String,
}

/// Returns true if the first `difficulty` hex characters of `hash` are all zero
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}

impl Block {
    /// Creates a new, unsealed block
    ///
    /// The hash stays empty until the block is mined.
    ///
    /// # Arguments
    ///
    /// * `index` - The index of the block in the chain
    /// * `transactions` - The list of transactions to include in the block
    /// * `previous_hash` - The hash of the previous block
    pub fn new(index: u64, transactions: Vec<Transaction>, previous_hash: String) -> Self {
        Block {
            index,
            timestamp: Utc::now(),
            payload: BlockPayload::Transactions(transactions),
            previous_hash,
            nonce: 0,
            hash: String::new(),
        }
    }

    /// Creates a genesis block carrying `marker`, hashed but never mined
    pub fn genesis(marker: &str, previous_hash: &str) -> Result<Self, BlockError> {
        let mut block = Block {
            index: 0,
            timestamp: Utc::now(),
            payload: BlockPayload::Genesis(marker.to_string()),
            previous_hash: previous_hash.to_string(),
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.calculate_hash()?;

        Ok(block)
    }

    pub fn transactions(&self) -> &[Transaction] {
        self.payload.transactions()
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self.payload, BlockPayload::Genesis(_))
    }

    /// Everything the hash covers except the nonce, in hashing order
    fn preimage_prefix(&self) -> Result<String, BlockError> {
        let payload = serde_json::to_string(&self.payload)?;

        Ok(format!(
            "{}{}{}{}",
            self.index,
            self.timestamp.to_rfc3339(),
            payload,
            self.previous_hash
        ))
    }

    /// Calculates the hash of the block from its current field values
    ///
    /// # Returns
    ///
    /// The SHA-256 hash of the block as a hexadecimal string
    pub fn calculate_hash(&self) -> Result<String, BlockError> {
        let prefix = self.preimage_prefix()?;
        Ok(sha256_hex(format!("{}{}", prefix, self.nonce).as_bytes()))
    }

    /// Proof-of-work search starting at the current nonce
    ///
    /// Returns the first nonce whose hash has `difficulty` leading zero hex
    /// characters, together with that hash. Does not modify the block.
    pub fn find_nonce(&self, difficulty: usize) -> Result<(u64, String), BlockError> {
        if difficulty > HASH_HEX_LEN {
            return Err(BlockError::DifficultyUnreachable(difficulty));
        }

        let prefix = self.preimage_prefix()?;
        let mut nonce = self.nonce;
        let mut hash = sha256_hex(format!("{}{}", prefix, nonce).as_bytes());

        while !meets_difficulty(&hash, difficulty) {
            nonce = nonce
                .checked_add(1)
                .ok_or(BlockError::NonceExhausted(self.index))?;
            hash = sha256_hex(format!("{}{}", prefix, nonce).as_bytes());
        }

        Ok((nonce, hash))
    }

    /// Runs the proof-of-work search and returns the sealed block
    pub fn seal(mut self, difficulty: usize) -> Result<Self, BlockError> {
        let (nonce, hash) = self.find_nonce(difficulty)?;
        self.nonce = nonce;
        self.hash = hash;

        Ok(self)
    }

    /// Mines the block in place and logs the result
    pub fn mine_block(&mut self, difficulty: usize) -> Result<(), BlockError> {
        let (nonce, hash) = self.find_nonce(difficulty)?;
        self.nonce = nonce;
        self.hash = hash;

        info!("Block {} mined: {}", self.index, self.hash);
        Ok(())
    }

    /// Returns false if any contained transaction is invalid
    pub fn has_valid_transactions(&self) -> bool {
        self.transactions().iter().all(Transaction::is_valid)
    }
}
