// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local key loading and message signing.
//!
//! Agent keys arrive through the environment either as raw hex or as a PEM
//! block. Both are turned into an alloy [`PrivateKeySigner`], which signs
//! text with the EIP-191 personal-message scheme and EIP-712 digests as is.

use alloy::{
    primitives::{Address, Bytes, B256},
    signers::{local::PrivateKeySigner, Signer},
};
use async_trait::async_trait;
use k256::SecretKey;

use super::client::ChainClientError;
use super::traits::MessageSigner;

/// Parse a private key from PEM format to hex string.
///
/// Accepts SEC1 (`EC PRIVATE KEY`) and PKCS#8 (`PRIVATE KEY`) encodings.
///
/// # Returns
/// * `Ok(String)` - Hex-encoded private key (64 characters, no 0x prefix)
/// * `Err(ChainClientError)` - If PEM parsing fails
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, ChainClientError> {
    let pem_str = std::str::from_utf8(pem_bytes)
        .map_err(|e| ChainClientError::InvalidPrivateKey(format!("Invalid UTF-8: {}", e)))?;

    let pem = pem::parse(pem_str)
        .map_err(|e| ChainClientError::InvalidPrivateKey(format!("Invalid PEM: {}", e)))?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(|e| ChainClientError::InvalidPrivateKey(format!("Invalid key format: {}", e)))?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from a hex private key, with or without `0x`.
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, ChainClientError> {
    let trimmed = private_key_hex.trim();
    let hex_key = trimmed.strip_prefix("0x").unwrap_or(trimmed);

    let key_bytes = alloy::hex::decode(hex_key)
        .map_err(|e| ChainClientError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| ChainClientError::InvalidPrivateKey(e.to_string()))
}

/// Create a signer from PEM-encoded private key bytes.
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, ChainClientError> {
    let hex_key = pem_to_hex(pem_bytes)?;
    signer_from_hex(&hex_key)
}

/// Create a signer from either a PEM block or a hex key.
pub fn signer_from_key(raw: &str) -> Result<PrivateKeySigner, ChainClientError> {
    if raw.contains("-----BEGIN") {
        signer_from_pem(raw.trim().as_bytes())
    } else {
        signer_from_hex(raw)
    }
}

/// [`MessageSigner`] backed by a local private key.
#[derive(Debug, Clone)]
pub struct LocalMessageSigner {
    signer: PrivateKeySigner,
}

impl LocalMessageSigner {
    pub fn new(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn from_key(raw: &str) -> Result<Self, ChainClientError> {
        signer_from_key(raw).map(Self::new)
    }

    pub fn signer_address(&self) -> Address {
        self.signer.address()
    }
}

#[async_trait]
impl MessageSigner for LocalMessageSigner {
    fn address(&self) -> Option<Address> {
        Some(self.signer.address())
    }

    async fn sign_message(&self, message: &str) -> Result<Bytes, ChainClientError> {
        let signature = Signer::sign_message(&self.signer, message.as_bytes())
            .await
            .map_err(|e| ChainClientError::Signing(e.to_string()))?;

        Ok(Bytes::copy_from_slice(&signature.as_bytes()))
    }

    async fn sign_hash(&self, hash: B256) -> Result<Bytes, ChainClientError> {
        let signature = Signer::sign_hash(&self.signer, &hash)
            .await
            .map_err(|e| ChainClientError::Signing(e.to_string()))?;

        Ok(Bytes::copy_from_slice(&signature.as_bytes()))
    }
}
