// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-8004 identity registry client.
//!
//! Wraps the read and write capabilities for one registry deployment. Agents
//! are ERC-721 tokens: the id is the token id, the owner is the token owner
//! and the token URI points at the agent metadata document.

use std::str::FromStr;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256, U256};
use tracing::{debug, info, warn};

use super::caip::address_hex;
use super::trust::{create_registration_entry, CreateRegistrationEntry, RegistrationEntry};
use crate::blockchain::abi::REGISTERED_EVENT_TOPIC;
use crate::blockchain::traits::{
    MetadataEntry, ReceiptCapability, RegistryReader, RegistryWriter, TransactionReceiptLogs,
};
use crate::blockchain::types::DEFAULT_NAMESPACE;
use crate::error::IdentityError;

/// Largest integer an `f64` represents exactly (2^53 - 1).
const MAX_EXACT_FLOAT_ID: f64 = 9_007_199_254_740_991.0;

/// Agent id as supplied by callers.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentIdInput {
    Uint(U256),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<U256> for AgentIdInput {
    fn from(value: U256) -> Self {
        AgentIdInput::Uint(value)
    }
}

impl From<u64> for AgentIdInput {
    fn from(value: u64) -> Self {
        AgentIdInput::Uint(U256::from(value))
    }
}

impl From<i64> for AgentIdInput {
    fn from(value: i64) -> Self {
        AgentIdInput::Int(value)
    }
}

impl From<f64> for AgentIdInput {
    fn from(value: f64) -> Self {
        AgentIdInput::Float(value)
    }
}

impl From<&str> for AgentIdInput {
    fn from(value: &str) -> Self {
        AgentIdInput::Text(value.to_string())
    }
}

impl From<String> for AgentIdInput {
    fn from(value: String) -> Self {
        AgentIdInput::Text(value)
    }
}

/// Turn caller input into a token id.
pub fn normalize_agent_id(input: AgentIdInput) -> Result<U256, IdentityError> {
    match input {
        AgentIdInput::Uint(value) => Ok(value),
        AgentIdInput::Int(value) => u64::try_from(value)
            .map(U256::from)
            .map_err(|_| IdentityError::invalid_agent_id("agentId must be non-negative")),
        AgentIdInput::Float(value) => {
            if !value.is_finite() || value.fract() != 0.0 || value < 0.0 {
                return Err(IdentityError::invalid_agent_id(
                    "agentId must be a non-negative integer",
                ));
            }
            if value > MAX_EXACT_FLOAT_ID {
                return Err(IdentityError::invalid_agent_id(
                    "agentId number must be a safe integer; use a string or U256 for larger values",
                ));
            }
            Ok(U256::from(value as u64))
        }
        AgentIdInput::Text(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(IdentityError::invalid_agent_id("agentId is required"));
            }
            if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
                return Err(IdentityError::invalid_agent_id(format!(
                    "agentId must be a decimal integer: {trimmed}"
                )));
            }
            U256::from_str(trimmed).map_err(|e| {
                IdentityError::invalid_agent_id(format!("agentId out of range: {e}"))
            })
        }
    }
}

/// A registered agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub agent_id: U256,
    pub owner: Address,
    pub token_uri: String,
}

impl IdentityRecord {
    pub fn owner_hex(&self) -> String {
        address_hex(&self.owner)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterAgentInput {
    pub token_uri: String,
    pub metadata: Vec<MetadataEntry>,
}

impl RegisterAgentInput {
    pub fn new(token_uri: impl Into<String>) -> Self {
        Self {
            token_uri: token_uri.into(),
            metadata: Vec::new(),
        }
    }
}

/// What became of the receipt lookup after a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptOutcome {
    /// A `Registered` log from the registry carried this id.
    Decoded(U256),
    /// The receipt had no `Registered` log from the registry.
    NoMatchingLog,
    /// The node returned no receipt yet.
    Pending,
    /// The reader offers no receipt access.
    Unavailable,
    /// The lookup failed; the transaction may still have been mined.
    Failed(String),
}

/// How receipt lookup failures are reported by [`IdentityRegistryClient::register`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReceiptPolicy {
    /// Log and report [`ReceiptOutcome::Failed`].
    #[default]
    Lenient,
    /// Fail with [`IdentityError::RegistrationReceipt`], which keeps the
    /// submitted transaction hash.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterAgentResult {
    pub transaction_hash: B256,
    /// Account the registration was sent from
    pub agent_address: Address,
    pub agent_id: Option<U256>,
    pub receipt: ReceiptOutcome,
}

pub struct IdentityRegistryClientOptions {
    pub address: Address,
    pub chain_id: Option<u64>,
    /// CAIP-2 namespace for registration entries; `eip155` when unset
    pub namespace: Option<String>,
    pub reader: Arc<dyn RegistryReader>,
    pub writer: Option<Arc<dyn RegistryWriter>>,
    pub receipt_policy: ReceiptPolicy,
}

impl IdentityRegistryClientOptions {
    pub fn new(address: Address, reader: Arc<dyn RegistryReader>) -> Self {
        Self {
            address,
            chain_id: None,
            namespace: None,
            reader,
            writer: None,
            receipt_policy: ReceiptPolicy::default(),
        }
    }
}

/// Client for one identity registry deployment.
pub struct IdentityRegistryClient {
    address: Address,
    chain_id: Option<u64>,
    namespace: String,
    reader: Arc<dyn RegistryReader>,
    writer: Option<Arc<dyn RegistryWriter>>,
    receipt_policy: ReceiptPolicy,
}

impl IdentityRegistryClient {
    pub fn new(options: IdentityRegistryClientOptions) -> Self {
        let namespace = options
            .namespace
            .as_deref()
            .map(str::trim)
            .filter(|ns| !ns.is_empty())
            .unwrap_or(DEFAULT_NAMESPACE)
            .to_ascii_lowercase();

        Self {
            address: options.address,
            chain_id: options.chain_id,
            namespace,
            reader: options.reader,
            writer: options.writer,
            receipt_policy: options.receipt_policy,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.chain_id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Account of the wallet client, if any.
    pub fn account(&self) -> Option<Address> {
        self.writer.as_ref().and_then(|w| w.account())
    }

    /// Look up an agent. `Ok(None)` when the id is not registered.
    pub async fn get(
        &self,
        agent_id: impl Into<AgentIdInput>,
    ) -> Result<Option<IdentityRecord>, IdentityError> {
        let agent_id = normalize_agent_id(agent_id.into())?;

        let exists = self
            .reader
            .agent_exists(self.address, agent_id)
            .await
            .map_err(|e| IdentityError::RegistryRead(e.to_string()))?;

        if !exists {
            debug!(%agent_id, registry = %self.address, "Agent not registered");
            return Ok(None);
        }

        let (owner, token_uri) = tokio::try_join!(
            self.reader.owner_of(self.address, agent_id),
            self.reader.token_uri(self.address, agent_id),
        )
        .map_err(|e| IdentityError::RegistryRead(e.to_string()))?;

        Ok(Some(IdentityRecord {
            agent_id,
            owner,
            token_uri,
        }))
    }

    /// Register a new agent owned by the wallet account.
    pub async fn register(
        &self,
        input: RegisterAgentInput,
    ) -> Result<RegisterAgentResult, IdentityError> {
        let writer = self.writer.as_ref().ok_or(IdentityError::MissingWallet)?;

        if input.token_uri.trim().is_empty() {
            return Err(IdentityError::invalid_input("tokenURI is required"));
        }

        let account = writer.account().ok_or(IdentityError::MissingAccount)?;

        let transaction_hash = writer
            .submit_register(self.address, &input.token_uri, &input.metadata)
            .await
            .map_err(|e| IdentityError::RegistryWrite(e.to_string()))?;

        info!(
            tx_hash = %transaction_hash,
            registry = %self.address,
            account = %account,
            "Submitted agent registration"
        );

        let receipt = self.registration_outcome(transaction_hash).await?;
        let agent_id = match receipt {
            ReceiptOutcome::Decoded(id) => Some(id),
            _ => None,
        };

        Ok(RegisterAgentResult {
            transaction_hash,
            agent_address: account,
            agent_id,
            receipt,
        })
    }

    /// One receipt attempt through whatever capability the reader offers.
    async fn registration_outcome(&self, tx_hash: B256) -> Result<ReceiptOutcome, IdentityError> {
        let receipt = match self.reader.receipts() {
            ReceiptCapability::Wait(waiter) => waiter.wait_for_receipt(tx_hash).await.map(Some),
            ReceiptCapability::Fetch(fetcher) => fetcher.get_receipt(tx_hash).await,
            ReceiptCapability::Unavailable => {
                debug!(tx_hash = %tx_hash, "No receipt access, agent id left undecoded");
                return Ok(ReceiptOutcome::Unavailable);
            }
        };

        match receipt {
            Ok(Some(receipt)) => Ok(match decode_registered_agent_id(&receipt, self.address) {
                Some(agent_id) => ReceiptOutcome::Decoded(agent_id),
                None => ReceiptOutcome::NoMatchingLog,
            }),
            Ok(None) => Ok(ReceiptOutcome::Pending),
            Err(e) => match self.receipt_policy {
                ReceiptPolicy::Strict => Err(IdentityError::RegistrationReceipt {
                    transaction_hash: tx_hash,
                    reason: e.to_string(),
                }),
                ReceiptPolicy::Lenient => {
                    warn!(error = %e, tx_hash = %tx_hash, "Failed to read registration receipt");
                    Ok(ReceiptOutcome::Failed(e.to_string()))
                }
            },
        }
    }

    /// Registration entry for `record` on this client's chain.
    pub fn to_registration_entry(
        &self,
        record: &IdentityRecord,
        signature: Option<&Bytes>,
    ) -> Result<RegistrationEntry, IdentityError> {
        let chain_id = self.chain_id.ok_or(IdentityError::MissingChainId)?;

        create_registration_entry(CreateRegistrationEntry {
            agent_id: record.agent_id,
            address: record.owner,
            chain_id,
            namespace: Some(&self.namespace),
            signature,
        })
    }
}

/// Agent id from the first `Registered` log emitted by `registry`.
///
/// `topics[1]` is the indexed agent id.
pub fn decode_registered_agent_id(
    receipt: &TransactionReceiptLogs,
    registry: Address,
) -> Option<U256> {
    receipt
        .logs
        .iter()
        .find(|log| {
            log.address == registry
                && log.topics.len() >= 2
                && log.topics[0] == REGISTERED_EVENT_TOPIC
        })
        .map(|log| U256::from_be_bytes(log.topics[1].0))
}
