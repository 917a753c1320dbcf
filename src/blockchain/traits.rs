// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Capability traits for the chain collaborators.
//!
//! The identity layer never talks to an RPC endpoint directly. It is handed
//! objects implementing these traits: the alloy-backed clients in
//! [`super::client`] in production, in-memory doubles in tests.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

use super::client::ChainClientError;

/// One log entry of a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptLog {
    /// Emitting contract
    pub address: Address,
    /// Event signature hash followed by indexed arguments
    pub topics: Vec<B256>,
    /// ABI-encoded non-indexed arguments
    pub data: Bytes,
}

/// The part of a transaction receipt the registry client looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionReceiptLogs {
    pub logs: Vec<ReceiptLog>,
}

/// `(key, value)` metadata attached to a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataEntry {
    pub key: String,
    pub value: Bytes,
}

/// Blocks until the transaction is mined and returns its receipt.
#[async_trait]
pub trait ReceiptWaiter: Send + Sync {
    async fn wait_for_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<TransactionReceiptLogs, ChainClientError>;
}

/// Fetches the receipt if the node already has it.
#[async_trait]
pub trait ReceiptFetcher: Send + Sync {
    async fn get_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceiptLogs>, ChainClientError>;
}

/// How (and whether) a reader can produce transaction receipts.
pub enum ReceiptCapability<'a> {
    Wait(&'a dyn ReceiptWaiter),
    Fetch(&'a dyn ReceiptFetcher),
    Unavailable,
}

/// Read-only access to the identity registry.
#[async_trait]
pub trait RegistryReader: Send + Sync {
    /// `agentExists(uint256)`
    async fn agent_exists(&self, registry: Address, agent_id: U256)
        -> Result<bool, ChainClientError>;

    /// `ownerOf(uint256)`
    async fn owner_of(&self, registry: Address, agent_id: U256)
        -> Result<Address, ChainClientError>;

    /// `tokenURI(uint256)`
    async fn token_uri(&self, registry: Address, agent_id: U256)
        -> Result<String, ChainClientError>;

    /// Receipt access offered by this reader.
    fn receipts(&self) -> ReceiptCapability<'_> {
        ReceiptCapability::Unavailable
    }
}

/// Write access to the identity registry through a bound account.
#[async_trait]
pub trait RegistryWriter: Send + Sync {
    /// Account the transactions are sent from.
    fn account(&self) -> Option<Address>;

    /// Submit `register(tokenURI[, metadata])` and return the transaction hash.
    async fn submit_register(
        &self,
        registry: Address,
        token_uri: &str,
        metadata: &[MetadataEntry],
    ) -> Result<B256, ChainClientError>;

    /// The same wallet as a message signer, when it can sign text.
    fn message_signer(&self) -> Option<Arc<dyn MessageSigner>> {
        None
    }
}

/// Signs text messages with the EIP-191 personal-message scheme and, when
/// the backing key allows it, EIP-712 digests.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Address of the signing account.
    fn address(&self) -> Option<Address>;

    /// Sign `message`, returning the raw signature bytes.
    async fn sign_message(&self, message: &str) -> Result<Bytes, ChainClientError>;

    /// Sign a 32-byte digest as is, without a message prefix.
    async fn sign_hash(&self, _hash: B256) -> Result<Bytes, ChainClientError> {
        Err(ChainClientError::Signing(
            "signer does not support raw digest signing".into(),
        ))
    }
}

/// On-chain signature check for contract accounts (ERC-1271).
#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    async fn verify_message(
        &self,
        address: Address,
        message: &str,
        signature: &[u8],
    ) -> Result<bool, ChainClientError>;
}
