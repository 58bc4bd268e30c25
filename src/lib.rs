//! Arikka ledger: a minimal append-only chain of proof-of-work blocks
//! carrying secp256k1-signed value transfers.

pub mod blockchain;
pub mod config;

pub use blockchain::{Address, Block, Ledger, Transaction, Wallet};
pub use config::LedgerConfig;
