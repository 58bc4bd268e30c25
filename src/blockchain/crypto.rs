use rand::rngs::OsRng;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use std::fmt;
use std::str::FromStr;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Decoding error: {0}")]
    DecodingError(String),
}

/// SHA-256 digest of `data`
pub fn sha256_digest(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 digest of `data` as a lowercase hexadecimal string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256_digest(data))
}

/// Represents an account address (hex-encoded uncompressed secp256k1 public key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Creates a new address from a public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Address(hex::encode(public_key.serialize_uncompressed()))
    }

    /// Converts the address back to the public key it encodes
    pub fn to_public_key(&self) -> Result<PublicKey, CryptoError> {
        let bytes = hex::decode(&self.0).map_err(|e| CryptoError::DecodingError(e.to_string()))?;

        PublicKey::from_slice(&bytes).map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Returns true if the address holds no characters
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Addresses are plain hex; the curve point itself is checked at verification time
        hex::decode(s).map_err(|e| CryptoError::DecodingError(e.to_string()))?;

        Ok(Address(s.to_string()))
    }
}

/// Represents a digital signature (hex-encoded DER ECDSA signature)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalSignature(pub String);

impl DigitalSignature {
    /// Creates a new digital signature from a signature
    pub fn from_signature(signature: &Signature) -> Self {
        DigitalSignature(hex::encode(&*signature.serialize_der()))
    }

    /// Converts the digital signature to a signature
    pub fn to_signature(&self) -> Result<Signature, CryptoError> {
        let bytes = hex::decode(&self.0).map_err(|e| CryptoError::DecodingError(e.to_string()))?;

        let mut signature =
            Signature::from_der(&bytes).map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

        // libsecp256k1 only accepts low-S signatures
        signature.normalize_s();
        Ok(signature)
    }
}

/// Represents a wallet with a secp256k1 keypair
#[derive(Debug, Clone)]
pub struct Wallet {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl Wallet {
    /// Creates a new wallet with a random keypair
    pub fn new() -> Result<Self, CryptoError> {
        let secret_key = SecretKey::new(&mut OsRng);
        Ok(Self::from_key(secret_key))
    }

    /// Creates a wallet from an existing secret key
    pub fn from_secret_key(secret_key_bytes: &[u8]) -> Result<Self, CryptoError> {
        let secret_key = SecretKey::from_slice(secret_key_bytes)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self::from_key(secret_key))
    }

    /// Creates a wallet from a hex-encoded secret key
    pub fn from_secret_hex(secret_key_hex: &str) -> Result<Self, CryptoError> {
        let bytes =
            hex::decode(secret_key_hex.trim()).map_err(|e| CryptoError::DecodingError(e.to_string()))?;

        Self::from_secret_key(&bytes)
    }

    fn from_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::signing_only();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        let address = Address::from_public_key(&public_key);

        Wallet {
            secret_key,
            public_key,
            address,
        }
    }

    /// Gets the wallet's address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Gets the wallet's public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Signs a 32-byte digest with the wallet's private key
    pub fn sign_digest(&self, digest: &[u8; 32]) -> DigitalSignature {
        let secp = Secp256k1::signing_only();
        let message = Message::from_digest(*digest);
        let signature = secp.sign_ecdsa(&message, &self.secret_key);

        DigitalSignature::from_signature(&signature)
    }

    /// Exports the wallet's secret key as bytes
    pub fn export_secret_key(&self) -> Vec<u8> {
        self.secret_key.secret_bytes().to_vec()
    }
}

/// Verifies a signature over a 32-byte digest.
///
/// A malformed signature encoding is an error; a well-formed signature that
/// does not match is `Ok(false)`.
pub fn verify_digest(
    digest: &[u8; 32],
    signature: &DigitalSignature,
    public_key: &PublicKey,
) -> Result<bool, CryptoError> {
    let signature = signature.to_signature()?;
    let secp = Secp256k1::verification_only();
    let message = Message::from_digest(*digest);

    match secp.verify_ecdsa(&message, &signature, public_key) {
        Ok(_) => Ok(true),
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_creation() {
        let wallet = Wallet::new().unwrap();
        // 65-byte uncompressed point, hex encoded
        assert_eq!(wallet.address.0.len(), 130);
        assert!(wallet.address.0.starts_with("04"));
    }

    #[test]
    fn test_signing_and_verification() {
        let wallet = Wallet::new().unwrap();
        let digest = sha256_digest(b"Hello, world!");

        let signature = wallet.sign_digest(&digest);

        let result = verify_digest(&digest, &signature, wallet.public_key()).unwrap();
        assert!(result);

        // Verify with wrong digest
        let wrong_digest = sha256_digest(b"Wrong message");
        let result = verify_digest(&wrong_digest, &signature, wallet.public_key()).unwrap();
        assert!(!result);
    }

    #[test]
    fn test_verification_with_other_key() {
        let signer = Wallet::new().unwrap();
        let other = Wallet::new().unwrap();
        let digest = sha256_digest(b"transfer");

        let signature = signer.sign_digest(&digest);
        assert!(!verify_digest(&digest, &signature, other.public_key()).unwrap());
    }

    #[test]
    fn test_malformed_signature() {
        let wallet = Wallet::new().unwrap();
        let digest = sha256_digest(b"payload");

        let not_hex = DigitalSignature("zz".to_string());
        assert!(matches!(
            verify_digest(&digest, &not_hex, wallet.public_key()),
            Err(CryptoError::DecodingError(_))
        ));

        let not_der = DigitalSignature("deadbeef".to_string());
        assert!(matches!(
            verify_digest(&digest, &not_der, wallet.public_key()),
            Err(CryptoError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_address_conversion() {
        let wallet = Wallet::new().unwrap();
        let public_key = wallet.address().to_public_key().unwrap();

        assert_eq!(&public_key, wallet.public_key());
    }

    #[test]
    fn test_wallet_from_secret_hex() {
        let wallet = Wallet::new().unwrap();
        let secret_hex = hex::encode(wallet.export_secret_key());

        let restored = Wallet::from_secret_hex(&secret_hex).unwrap();
        assert_eq!(restored.address(), wallet.address());

        assert!(Wallet::from_secret_hex("not hex").is_err());
        assert!(matches!(
            Wallet::from_secret_key(&[0u8; 32]),
            Err(CryptoError::InvalidPrivateKey(_))
        ));
    }

    #[test]
    fn test_address_from_str() {
        assert!("04abcdef".parse::<Address>().is_ok());
        assert!("xyz".parse::<Address>().is_err());
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
