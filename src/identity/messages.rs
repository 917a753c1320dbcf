// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canonical ERC-8004 message texts.
//!
//! Signatures are made over these exact strings and every verifier rebuilds
//! them independently, so the output must be byte-identical for identical
//! parameters: one labeled field per line, fixed order, `\n` separators, no
//! trailing newline. Addresses are lower-cased, integers are decimal.
//!
//! The domain proof also has an EIP-712 form, [`AgentOwnershipProof`], for
//! wallets that sign typed data.

use alloy::primitives::{Address, U256};
use alloy::sol;

use super::caip::address_hex;

pub const DOMAIN_PROOF_TITLE: &str = "ERC-8004 Agent Ownership Proof";
pub const FEEDBACK_AUTH_TITLE: &str = "ERC-8004 Reputation Feedback Authorization";
pub const VALIDATION_REQUEST_TITLE: &str = "ERC-8004 Validation Request";

/// A typed message with a canonical text form.
pub trait CanonicalMessage {
    fn canonical_text(&self) -> String;
}

/// Proof that the holder of `address` controls `domain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainProof {
    pub domain: String,
    pub address: Address,
    pub chain_id: u64,
    /// Emitted only when present and non-empty
    pub nonce: Option<String>,
}

/// Authorization for a client to leave feedback on an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackAuth {
    pub from_address: Address,
    pub to_agent_id: U256,
    pub score: u8,
    pub chain_id: u64,
    pub expiry: u64,
    pub index_limit: U256,
}

/// Request for a validator to check an agent's work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    pub agent_id: U256,
    /// Rendered exactly as given
    pub request_hash: String,
    pub validator: Address,
    pub chain_id: u64,
    pub timestamp: u64,
}

pub fn build_domain_proof_message(params: &DomainProof) -> String {
    let mut lines = vec![
        DOMAIN_PROOF_TITLE.to_string(),
        format!("Domain: {}", params.domain),
        format!("Address: {}", address_hex(&params.address)),
        format!("ChainId: {}", params.chain_id),
    ];
    if let Some(nonce) = params.nonce.as_deref().filter(|n| !n.is_empty()) {
        lines.push(format!("Nonce: {nonce}"));
    }
    lines.join("\n")
}

pub fn build_feedback_auth_message(params: &FeedbackAuth) -> String {
    [
        FEEDBACK_AUTH_TITLE.to_string(),
        format!("From: {}", address_hex(&params.from_address)),
        format!("To Agent: {}", params.to_agent_id),
        format!("Score: {}", params.score),
        format!("Chain ID: {}", params.chain_id),
        format!("Expiry: {}", params.expiry),
        format!("Index Limit: {}", params.index_limit),
    ]
    .join("\n")
}

pub fn build_validation_request_message(params: &ValidationRequest) -> String {
    [
        VALIDATION_REQUEST_TITLE.to_string(),
        format!("Agent ID: {}", params.agent_id),
        format!("Request Hash: {}", params.request_hash),
        format!("Validator: {}", address_hex(&params.validator)),
        format!("Chain ID: {}", params.chain_id),
        format!("Timestamp: {}", params.timestamp),
    ]
    .join("\n")
}

sol! {
    /// EIP-712 typed form of a [`DomainProof`]. A missing nonce is the empty string.
    #[derive(Debug, PartialEq, Eq)]
    struct AgentOwnershipProof {
        string domain;
        address agent;
        uint256 chainId;
        string nonce;
    }
}

impl From<&DomainProof> for AgentOwnershipProof {
    fn from(proof: &DomainProof) -> Self {
        Self {
            domain: proof.domain.clone(),
            agent: proof.address,
            chainId: U256::from(proof.chain_id),
            nonce: proof.nonce.clone().unwrap_or_default(),
        }
    }
}

impl CanonicalMessage for DomainProof {
    fn canonical_text(&self) -> String {
        build_domain_proof_message(self)
    }
}

impl CanonicalMessage for FeedbackAuth {
    fn canonical_text(&self) -> String {
        build_feedback_auth_message(self)
    }
}

impl CanonicalMessage for ValidationRequest {
    fn canonical_text(&self) -> String {
        build_validation_request_message(self)
    }
}
