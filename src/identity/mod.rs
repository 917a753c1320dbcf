// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-8004 agent identity.
//!
//! - `caip` - CAIP-10 identifiers and address/domain normalization
//! - `messages` - Canonical texts for domain proofs, feedback auth and validation requests
//! - `signatures` - EIP-191 signing and verification with ERC-1271 fallback, EIP-712 typed data
//! - `registry` - Identity registry reads and registration
//! - `trust` - Registration entries and layered trust config
//! - `bootstrap` - Start-up flow tying the above together

pub mod bootstrap;
pub mod caip;
pub mod messages;
pub mod registry;
pub mod signatures;
pub mod trust;

pub use bootstrap::{
    bootstrap_identity, bootstrap_trust, BootstrapClients, BootstrapIdentityOptions,
    BootstrapTrustOptions, BootstrapTrustResult, ClientFactory, ClientFactoryParams,
    MissingIdentityResolver, RpcClientFactory,
};
pub use caip::{
    address_hex, normalize_address, normalize_domain, parse_caip10, to_caip10, Caip10,
    Caip10Address,
};
pub use messages::{
    build_domain_proof_message, build_feedback_auth_message, build_validation_request_message,
    AgentOwnershipProof, CanonicalMessage, DomainProof, FeedbackAuth, ValidationRequest,
};
pub use registry::{
    decode_registered_agent_id, normalize_agent_id, AgentIdInput, IdentityRecord,
    IdentityRegistryClient, IdentityRegistryClientOptions, ReceiptOutcome, ReceiptPolicy,
    RegisterAgentInput, RegisterAgentResult,
};
pub use signatures::{
    hash_message, recover_signer, recover_typed_data_signer, sign_agent_domain_proof,
    sign_domain_proof, sign_domain_proof_typed, sign_feedback_auth, sign_message,
    sign_typed_data, sign_validation_request, typed_data_domain, verify_registration_proof,
    verify_signature, SignAgentDomainProof, VerifySignature,
};
pub use trust::{
    build_metadata_uri, build_trust_config_from_identity, create_registration_entry,
    domain_trust_defaults, CreateRegistrationEntry, RegistrationEntry, TrustConfig, TrustLayers,
    TrustOverrides,
};
