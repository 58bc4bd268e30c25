use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::crypto::{sha256_digest, verify_digest, Address, CryptoError, DigitalSignature, Wallet};

/// Errors that can occur during transaction operations
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Unauthorized signer: {0}")]
    Unauthorized(String),

    #[error("Crypto error: {0}")]
    CryptoError(#[from] CryptoError),
}

/// A signed, directed value transfer between two addresses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender's address; `None` for issuance (mining reward) transactions
    pub from_address: Option<Address>,

    /// Recipient's address
    pub to_address: Address,

    /// Amount being transferred
    pub amount: f64,

    /// Hex-encoded DER signature over [`Transaction::hash`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<DigitalSignature>,
}

impl Transaction {
    /// Creates a new unsigned transfer
    ///
    /// # Arguments
    ///
    /// * `from_address` - The address of the sender
    /// * `to_address` - The address of the recipient
    /// * `amount` - The amount to transfer
    pub fn new(from_address: Address, to_address: Address, amount: f64) -> Self {
        Transaction {
            from_address: Some(from_address),
            to_address,
            amount,
            signature: None,
        }
    }

    /// Creates a new issuance transaction (mining reward)
    pub fn new_reward(to_address: Address, amount: f64) -> Self {
        Transaction {
            from_address: None,
            to_address,
            amount,
            signature: None,
        }
    }

    /// Checks if the transaction mints new value rather than spending it
    pub fn is_reward(&self) -> bool {
        self.from_address.is_none()
    }

    /// Digest over `from ++ to ++ amount`, computed from the current field values
    pub fn digest(&self) -> [u8; 32] {
        let from = self.from_address.as_ref().map(Address::as_str).unwrap_or_default();
        let preimage = format!("{}{}{}", from, self.to_address, self.amount);

        sha256_digest(preimage.as_bytes())
    }

    /// Hex encoding of [`Transaction::digest`]
    pub fn hash(&self) -> String {
        hex::encode(self.digest())
    }

    /// Signs the transaction with a wallet
    ///
    /// Fails with [`TransactionError::Unauthorized`] unless the wallet's
    /// address is the sender's address.
    pub fn sign(&mut self, wallet: &Wallet) -> Result<(), TransactionError> {
        match &self.from_address {
            Some(from) if from == wallet.address() => {}
            Some(_) => {
                return Err(TransactionError::Unauthorized(
                    "You cannot sign transactions for other wallets".to_string(),
                ))
            }
            None => {
                return Err(TransactionError::Unauthorized(
                    "Issuance transactions have no signer".to_string(),
                ))
            }
        }

        self.signature = Some(wallet.sign_digest(&self.digest()));
        Ok(())
    }

    /// Verifies the transaction's signature against its sender
    ///
    /// # Returns
    ///
    /// `Ok(true)` for issuance transactions and matching signatures,
    /// `Ok(false)` when unsigned or not matching, and an error if the sender
    /// address or signature cannot be decoded.
    pub fn verify_signature(&self) -> Result<bool, TransactionError> {
        let from = match &self.from_address {
            Some(from) => from,
            None => return Ok(true),
        };

        let signature = match &self.signature {
            Some(sig) if !sig.0.is_empty() => sig,
            _ => return Ok(false),
        };

        let public_key = from.to_public_key()?;
        Ok(verify_digest(&self.digest(), signature, &public_key)?)
    }

    /// Returns true for issuance transactions and correctly signed transfers
    pub fn is_valid(&self) -> bool {
        match self.verify_signature() {
            Ok(valid) => valid,
            Err(err) => {
                debug!("Transaction {} failed verification: {}", self.hash(), err);
                false
            }
        }
    }
}
