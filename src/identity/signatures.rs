// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EIP-191 signing, recovery and verification over the canonical messages,
//! plus EIP-712 typed-data signing.
//!
//! Key accounts are checked by recovering the signer locally. Contract
//! accounts cannot be recovered, so verification falls back to an ERC-1271
//! call when a [`SignatureVerifier`] is supplied.

use alloy::primitives::{eip191_hash_message, Address, Bytes, Signature, B256, U256};
use alloy::sol_types::{Eip712Domain, SolStruct};
use tracing::debug;

use super::caip::{normalize_domain, parse_caip10};
use super::messages::{
    build_domain_proof_message, build_feedback_auth_message, build_validation_request_message,
    AgentOwnershipProof, DomainProof, FeedbackAuth, ValidationRequest,
};
use super::trust::RegistrationEntry;
use crate::blockchain::traits::{MessageSigner, SignatureVerifier};
use crate::error::IdentityError;

/// Sign `message` with the EIP-191 personal-message scheme.
pub async fn sign_message(
    signer: &dyn MessageSigner,
    message: &str,
) -> Result<Bytes, IdentityError> {
    signer
        .sign_message(message)
        .await
        .map_err(|e| IdentityError::Signature(e.to_string()))
}

/// Recover the key account that signed `message`.
///
/// Only 65-byte `r || s || v` signatures are accepted.
pub fn recover_signer(message: &str, signature: &[u8]) -> Result<Address, IdentityError> {
    let signature = Signature::from_raw(signature)
        .map_err(|e| IdentityError::SignatureRecovery(e.to_string()))?;

    signature
        .recover_address_from_msg(message)
        .map_err(|e| IdentityError::SignatureRecovery(e.to_string()))
}

/// EIP-191 digest of `message`.
pub fn hash_message(message: &str) -> B256 {
    eip191_hash_message(message)
}

/// Arguments for [`verify_signature`].
#[derive(Clone, Copy)]
pub struct VerifySignature<'a> {
    /// Claimed signer
    pub address: Address,
    pub message: &'a str,
    pub signature: &'a [u8],
    /// ERC-1271 fallback for contract accounts
    pub verifier: Option<&'a dyn SignatureVerifier>,
}

/// Check that `signature` over `message` was produced by `address`.
///
/// Never fails: malformed input, recovery errors and verifier errors all
/// yield `false`.
pub async fn verify_signature(params: VerifySignature<'_>) -> bool {
    match recover_signer(params.message, params.signature) {
        Ok(recovered) if recovered == params.address => return true,
        Ok(recovered) => {
            debug!(claimed = %params.address, %recovered, "Recovered signer does not match");
        }
        Err(e) => {
            debug!(error = %e, "Signature is not a recoverable key signature");
        }
    }

    let Some(verifier) = params.verifier else {
        return false;
    };

    match verifier
        .verify_message(params.address, params.message, params.signature)
        .await
    {
        Ok(valid) => valid,
        Err(e) => {
            debug!(error = %e, address = %params.address, "ERC-1271 verification failed");
            false
        }
    }
}

pub async fn sign_domain_proof(
    signer: &dyn MessageSigner,
    params: &DomainProof,
) -> Result<Bytes, IdentityError> {
    sign_message(signer, &build_domain_proof_message(params)).await
}

pub async fn sign_feedback_auth(
    signer: &dyn MessageSigner,
    params: &FeedbackAuth,
) -> Result<Bytes, IdentityError> {
    sign_message(signer, &build_feedback_auth_message(params)).await
}

pub async fn sign_validation_request(
    signer: &dyn MessageSigner,
    params: &ValidationRequest,
) -> Result<Bytes, IdentityError> {
    sign_message(signer, &build_validation_request_message(params)).await
}

/// EIP-712 domain naming the signing application and the contract the
/// typed data is meant for.
pub fn typed_data_domain(
    name: &str,
    version: &str,
    chain_id: u64,
    verifying_contract: Address,
) -> Eip712Domain {
    Eip712Domain::new(
        Some(name.to_string().into()),
        Some(version.to_string().into()),
        Some(U256::from(chain_id)),
        Some(verifying_contract),
        None,
    )
}

/// Sign `payload` as EIP-712 typed data under `domain`.
pub async fn sign_typed_data<T: SolStruct + Sync>(
    signer: &dyn MessageSigner,
    payload: &T,
    domain: &Eip712Domain,
) -> Result<Bytes, IdentityError> {
    let digest = payload.eip712_signing_hash(domain);
    signer
        .sign_hash(digest)
        .await
        .map_err(|e| IdentityError::Signature(e.to_string()))
}

/// Recover the key account that signed `payload` under `domain`.
pub fn recover_typed_data_signer<T: SolStruct>(
    payload: &T,
    domain: &Eip712Domain,
    signature: &[u8],
) -> Result<Address, IdentityError> {
    let signature = Signature::from_raw(signature)
        .map_err(|e| IdentityError::SignatureRecovery(e.to_string()))?;

    signature
        .recover_address_from_prehash(&payload.eip712_signing_hash(domain))
        .map_err(|e| IdentityError::SignatureRecovery(e.to_string()))
}

/// Sign the EIP-712 form of a domain proof.
pub async fn sign_domain_proof_typed(
    signer: &dyn MessageSigner,
    params: &DomainProof,
    domain: &Eip712Domain,
) -> Result<Bytes, IdentityError> {
    sign_typed_data(signer, &AgentOwnershipProof::from(params), domain).await
}

/// Arguments for [`sign_agent_domain_proof`].
#[derive(Clone, Copy)]
pub struct SignAgentDomainProof<'a> {
    pub signer: &'a dyn MessageSigner,
    /// Normalized before signing
    pub domain: &'a str,
    /// Agent owner named in the proof
    pub address: Address,
    pub chain_id: u64,
    pub nonce: Option<&'a str>,
}

/// Sign the ownership proof for an agent's domain.
pub async fn sign_agent_domain_proof(
    params: SignAgentDomainProof<'_>,
) -> Result<Bytes, IdentityError> {
    let domain = normalize_domain(params.domain);
    if domain.is_empty() {
        return Err(IdentityError::invalid_input("domain is required"));
    }
    if params.address == Address::ZERO {
        return Err(IdentityError::invalid_input(
            "address must be a valid non-zero hex address",
        ));
    }

    let proof = DomainProof {
        domain,
        address: params.address,
        chain_id: params.chain_id,
        nonce: params.nonce.map(str::to_string),
    };

    sign_domain_proof(params.signer, &proof).await
}

/// Check a published registration entry against the domain it claims.
///
/// Rebuilds the domain proof from the entry's CAIP-10 address and verifies
/// the attached signature. Entries without a signature never verify.
pub async fn verify_registration_proof(
    entry: &RegistrationEntry,
    domain: &str,
    nonce: Option<&str>,
    verifier: Option<&dyn SignatureVerifier>,
) -> bool {
    let Some(signature) = entry.signature.as_deref() else {
        return false;
    };

    let Ok(caip) = parse_caip10(&entry.agent_address) else {
        return false;
    };
    let Ok(address) = caip.evm_address() else {
        return false;
    };
    let Ok(signature) = alloy::hex::decode(signature) else {
        return false;
    };

    let domain = normalize_domain(domain);
    if domain.is_empty() {
        return false;
    }

    let message = build_domain_proof_message(&DomainProof {
        domain,
        address,
        chain_id: caip.chain_id,
        nonce: nonce.map(str::to_string),
    });

    verify_signature(VerifySignature {
        address,
        message: &message,
        signature: &signature,
        verifier,
    })
    .await
}
