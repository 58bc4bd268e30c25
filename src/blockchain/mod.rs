// Blockchain module
//
// This module contains the ledger core:
// - Block structure and proof of work
// - Ledger (chain) structure
// - Transaction structure
// - Cryptography utilities
// - Background mining

pub mod block;
pub mod chain;
pub mod crypto;
pub mod miner;
pub mod transaction;

// Re-export main components for easier access
pub use block::{Block, BlockError, BlockPayload};
pub use chain::{ChainViolation, Ledger, LedgerError};
pub use crypto::{Address, CryptoError, DigitalSignature, Wallet};
pub use transaction::{Transaction, TransactionError};
