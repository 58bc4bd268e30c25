use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use super::block::{Block, BlockError, HASH_HEX_LEN};
use super::crypto::Address;
use super::miner::spawn_mining;
use super::transaction::Transaction;
use crate::config::LedgerConfig;

/// Payload carried by the genesis block in place of transactions
pub const GENESIS_MARKER: &str = "Initial block of the Arikka ledger";

/// Previous-hash marker of the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Errors that can occur during ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Transaction must include from and to address")]
    MissingAddress,

    #[error("Cannot add invalid transaction to chain: {0}")]
    InvalidTransaction(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Block error: {0}")]
    BlockError(#[from] BlockError),

    #[error("Mining task failed: {0}")]
    MiningTaskFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// The first rule a chain breaks, with the position of the offending block
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainViolation {
    #[error("Block {0} contains invalid transactions")]
    InvalidTransactions(usize),

    #[error("Block {0} hash does not match its contents")]
    HashMismatch(usize),

    #[error("Block {0} does not link to the hash of its predecessor")]
    BrokenLink(usize),
}

/// Represents the ledger: an append-only chain of mined blocks
#[derive(Debug, Clone, Serialize)]
pub struct Ledger {
    /// The chain of blocks; index 0 is the genesis block
    chain: Vec<Block>,

    /// Transactions waiting to be included in the next block
    pending_transactions: Vec<Transaction>,

    /// Mining difficulty (number of leading zero hex characters required in a hash)
    difficulty: usize,

    /// Amount credited to whoever mines the next block
    mining_reward: f64,
}

impl Ledger {
    /// Creates a new ledger with a genesis block
    ///
    /// # Arguments
    ///
    /// * `difficulty` - Leading zero hex characters required of mined block hashes
    /// * `mining_reward` - Amount issued to the miner of each block
    pub fn new(difficulty: usize, mining_reward: f64) -> Result<Self, LedgerError> {
        if difficulty > HASH_HEX_LEN {
            return Err(BlockError::DifficultyUnreachable(difficulty).into());
        }
        if !mining_reward.is_finite() || mining_reward < 0.0 {
            return Err(LedgerError::InvalidAmount(mining_reward));
        }

        let genesis = Self::create_genesis_block()?;
        info!("Created ledger with genesis block {}", genesis.hash);

        Ok(Ledger {
            chain: vec![genesis],
            pending_transactions: Vec::new(),
            difficulty,
            mining_reward,
        })
    }

    /// Creates a new ledger from configuration
    pub fn with_config(config: &LedgerConfig) -> Result<Self, LedgerError> {
        Self::new(config.difficulty, config.mining_reward)
    }

    /// Creates the genesis block (first block in the chain)
    fn create_genesis_block() -> Result<Block, LedgerError> {
        Ok(Block::genesis(GENESIS_MARKER, GENESIS_PREVIOUS_HASH)?)
    }

    /// Gets the last block in the chain
    pub fn get_latest_block(&self) -> &Block {
        // The chain always holds at least the genesis block
        &self.chain[self.chain.len() - 1]
    }

    /// Adds a new transaction to the pending transactions
    ///
    /// No balance check is made: senders may spend beyond what they hold.
    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<(), LedgerError> {
        let has_sender = matches!(&transaction.from_address, Some(from) if !from.is_empty());
        if !has_sender || transaction.to_address.is_empty() {
            warn!("Rejected transaction without sender or recipient");
            return Err(LedgerError::MissingAddress);
        }

        if !transaction.amount.is_finite() || transaction.amount < 0.0 {
            warn!("Rejected transaction with amount {}", transaction.amount);
            return Err(LedgerError::InvalidAmount(transaction.amount));
        }

        if !transaction.is_valid() {
            warn!("Rejected transaction {} with invalid signature", transaction.hash());
            return Err(LedgerError::InvalidTransaction(transaction.hash()));
        }

        debug!("Accepted transaction {} into the pending pool", transaction.hash());
        self.pending_transactions.push(transaction);
        Ok(())
    }

    /// Unsealed block holding the current pool, or `None` if the pool is empty
    fn prepare_block(&self) -> Option<Block> {
        if self.pending_transactions.is_empty() {
            return None;
        }

        let block = Block::new(
            self.chain.len() as u64,
            self.pending_transactions.clone(),
            self.get_latest_block().hash.clone(),
        );
        info!("Block {} started mining", block.index);

        Some(block)
    }

    /// Replaces the pool with a single reward for `reward_address`
    fn reseed_pending(&mut self, reward_address: &Address) {
        self.pending_transactions =
            vec![Transaction::new_reward(reward_address.clone(), self.mining_reward)];
        debug!("Pending reward of {} queued for {}", self.mining_reward, reward_address);
    }

    /// Mines the pending transactions into a new block
    ///
    /// The reward for `reward_address` is queued in the pool afterwards, so it
    /// only reaches the chain with the block mined by the next call.
    ///
    /// # Returns
    ///
    /// The newly mined block, or `None` if the pool was empty
    pub fn mine_pending_transactions(
        &mut self,
        reward_address: &Address,
    ) -> Result<Option<Block>, LedgerError> {
        let mined = match self.prepare_block() {
            Some(mut block) => {
                block.mine_block(self.difficulty)?;
                self.chain.push(block.clone());
                Some(block)
            }
            None => None,
        };

        self.reseed_pending(reward_address);
        Ok(mined)
    }

    /// Same as [`Ledger::mine_pending_transactions`], with the proof-of-work
    /// search running on a blocking worker thread
    pub async fn mine_pending_transactions_offloaded(
        &mut self,
        reward_address: &Address,
    ) -> Result<Option<Block>, LedgerError> {
        let mined = match self.prepare_block() {
            Some(block) => {
                let sealed = spawn_mining(block, self.difficulty)
                    .await
                    .map_err(|e| LedgerError::MiningTaskFailed(e.to_string()))??;
                self.chain.push(sealed.clone());
                Some(sealed)
            }
            None => None,
        };

        self.reseed_pending(reward_address);
        Ok(mined)
    }

    /// Gets the balance of an address by replaying every transaction in the chain
    pub fn get_balance_of_address(&self, address: &Address) -> f64 {
        let mut balance = 0.0;

        for block in &self.chain {
            for transaction in block.transactions() {
                if transaction.from_address.as_ref() == Some(address) {
                    balance -= transaction.amount;
                }
                if &transaction.to_address == address {
                    balance += transaction.amount;
                }
            }
        }

        balance
    }

    /// Checks every non-genesis block and reports the first rule broken
    pub fn validate_chain(&self) -> Result<(), ChainViolation> {
        for (offset, pair) in self.chain.windows(2).enumerate() {
            let (previous_block, current_block) = (&pair[0], &pair[1]);
            let position = offset + 1;

            if !current_block.has_valid_transactions() {
                return Err(ChainViolation::InvalidTransactions(position));
            }

            match current_block.calculate_hash() {
                Ok(hash) if hash == current_block.hash => {}
                _ => return Err(ChainViolation::HashMismatch(position)),
            }

            if current_block.previous_hash != previous_block.hash {
                return Err(ChainViolation::BrokenLink(position));
            }
        }

        Ok(())
    }

    /// Validates the ledger
    ///
    /// # Returns
    ///
    /// true if the chain is valid, false otherwise
    pub fn is_chain_valid(&self) -> bool {
        self.validate_chain().is_ok()
    }

    /// Gets the entire chain
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Gets all pending transactions
    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending_transactions
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn mining_reward(&self) -> f64 {
        self.mining_reward
    }

    /// Exports the ledger as pretty-printed JSON for inspection
    pub fn to_json_pretty(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
