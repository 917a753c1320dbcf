// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory doubles for the chain capability traits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use alloy::primitives::{address, b256, Address, Bytes, B256, U256};
use async_trait::async_trait;

use crate::blockchain::abi::REGISTERED_EVENT_TOPIC;
use crate::blockchain::client::ChainClientError;
use crate::blockchain::signing::LocalMessageSigner;
use crate::blockchain::traits::{
    MessageSigner, MetadataEntry, ReceiptCapability, ReceiptFetcher, ReceiptLog, ReceiptWaiter,
    RegistryReader, RegistryWriter, SignatureVerifier, TransactionReceiptLogs,
};
use crate::blockchain::types::DEFAULT_IDENTITY_REGISTRY;

// Hardhat account #0 (test key, never funded on a real network)
pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const TEST_ADDRESS: Address = address!("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266");

pub const TEST_REGISTRY: Address = DEFAULT_IDENTITY_REGISTRY;
pub const TEST_TX_HASH: B256 =
    b256!("0x00000000000000000000000000000000000000000000000000000000000000aa");

/// A `Registered(agentId, ...)` log as emitted by `registry`.
pub fn registered_log(registry: Address, agent_id: u64) -> ReceiptLog {
    ReceiptLog {
        address: registry,
        topics: vec![
            REGISTERED_EVENT_TOPIC,
            B256::from(U256::from(agent_id).to_be_bytes::<32>()),
            TEST_ADDRESS.into_word(),
        ],
        data: Bytes::new(),
    }
}

/// What the mock hands back when asked for a receipt.
#[derive(Debug, Clone)]
pub enum MockReceipts {
    Wait(Vec<ReceiptLog>),
    WaitError(String),
    Fetch(Option<Vec<ReceiptLog>>),
    Unavailable,
}

/// A registry with at most one agent and a scripted receipt.
pub struct MockRegistry {
    pub agent_id: U256,
    pub exists: bool,
    pub owner: Address,
    pub token_uri: String,
    pub fail_reads: bool,
    pub receipts: MockReceipts,
    calls: Mutex<Vec<&'static str>>,
}

impl MockRegistry {
    pub fn empty() -> Self {
        Self {
            agent_id: U256::ZERO,
            exists: false,
            owner: Address::ZERO,
            token_uri: String::new(),
            fail_reads: false,
            receipts: MockReceipts::Unavailable,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_agent(agent_id: u64, owner: Address, token_uri: &str) -> Self {
        Self {
            agent_id: U256::from(agent_id),
            exists: true,
            owner,
            token_uri: token_uri.to_string(),
            ..Self::empty()
        }
    }

    pub fn with_receipts(mut self, receipts: MockReceipts) -> Self {
        self.receipts = receipts;
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_reads(&self) -> Result<(), ChainClientError> {
        if self.fail_reads {
            Err(ChainClientError::Rpc("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RegistryReader for MockRegistry {
    async fn agent_exists(
        &self,
        _registry: Address,
        agent_id: U256,
    ) -> Result<bool, ChainClientError> {
        self.record("agent_exists");
        self.check_reads()?;
        Ok(self.exists && agent_id == self.agent_id)
    }

    async fn owner_of(
        &self,
        _registry: Address,
        _agent_id: U256,
    ) -> Result<Address, ChainClientError> {
        self.record("owner_of");
        self.check_reads()?;
        Ok(self.owner)
    }

    async fn token_uri(
        &self,
        _registry: Address,
        _agent_id: U256,
    ) -> Result<String, ChainClientError> {
        self.record("token_uri");
        self.check_reads()?;
        Ok(self.token_uri.clone())
    }

    fn receipts(&self) -> ReceiptCapability<'_> {
        match self.receipts {
            MockReceipts::Wait(_) | MockReceipts::WaitError(_) => ReceiptCapability::Wait(self),
            MockReceipts::Fetch(_) => ReceiptCapability::Fetch(self),
            MockReceipts::Unavailable => ReceiptCapability::Unavailable,
        }
    }
}

#[async_trait]
impl ReceiptWaiter for MockRegistry {
    async fn wait_for_receipt(
        &self,
        _tx_hash: B256,
    ) -> Result<TransactionReceiptLogs, ChainClientError> {
        self.record("wait_for_receipt");
        match &self.receipts {
            MockReceipts::Wait(logs) => Ok(TransactionReceiptLogs { logs: logs.clone() }),
            MockReceipts::WaitError(message) => Err(ChainClientError::Rpc(message.clone())),
            _ => Err(ChainClientError::Rpc("receipts not scripted".into())),
        }
    }
}

#[async_trait]
impl ReceiptFetcher for MockRegistry {
    async fn get_receipt(
        &self,
        _tx_hash: B256,
    ) -> Result<Option<TransactionReceiptLogs>, ChainClientError> {
        self.record("get_receipt");
        match &self.receipts {
            MockReceipts::Fetch(logs) => {
                Ok(logs.clone().map(|logs| TransactionReceiptLogs { logs }))
            }
            _ => Err(ChainClientError::Rpc("receipts not scripted".into())),
        }
    }
}

/// A wallet that records submissions and returns [`TEST_TX_HASH`].
pub struct MockWallet {
    pub account: Option<Address>,
    pub fail_submit: bool,
    pub signer: Option<Arc<dyn MessageSigner>>,
    submissions: Mutex<Vec<(Address, String, usize)>>,
}

impl MockWallet {
    pub fn new(account: Option<Address>) -> Self {
        Self {
            account,
            fail_submit: false,
            signer: None,
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn MessageSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_submit = true;
        self
    }

    /// `(registry, token_uri, metadata_len)` per submission.
    pub fn submissions(&self) -> Vec<(Address, String, usize)> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryWriter for MockWallet {
    fn account(&self) -> Option<Address> {
        self.account
    }

    async fn submit_register(
        &self,
        registry: Address,
        token_uri: &str,
        metadata: &[MetadataEntry],
    ) -> Result<B256, ChainClientError> {
        self.submissions
            .lock()
            .unwrap()
            .push((registry, token_uri.to_string(), metadata.len()));

        if self.fail_submit {
            return Err(ChainClientError::TransactionFailed(
                "insufficient funds".into(),
            ));
        }
        Ok(TEST_TX_HASH)
    }

    fn message_signer(&self) -> Option<Arc<dyn MessageSigner>> {
        self.signer.clone()
    }
}

pub fn test_signer() -> Arc<dyn MessageSigner> {
    Arc::new(LocalMessageSigner::from_key(TEST_KEY).unwrap())
}

/// A signer that always fails.
pub struct FailingSigner;

#[async_trait]
impl MessageSigner for FailingSigner {
    fn address(&self) -> Option<Address> {
        Some(TEST_ADDRESS)
    }

    async fn sign_message(&self, _message: &str) -> Result<Bytes, ChainClientError> {
        Err(ChainClientError::Signing("user rejected".into()))
    }
}

/// ERC-1271 verifier with a scripted answer.
pub struct MockVerifier {
    result: Result<bool, String>,
    calls: AtomicUsize,
}

impl MockVerifier {
    pub fn returning(valid: bool) -> Self {
        Self {
            result: Ok(valid),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignatureVerifier for MockVerifier {
    async fn verify_message(
        &self,
        _address: Address,
        _message: &str,
        _signature: &[u8],
    ) -> Result<bool, ChainClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(ChainClientError::Contract)
    }
}
