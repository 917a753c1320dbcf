// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trust configuration published alongside an agent.
//!
//! A [`TrustConfig`] names the agent's registry entries and where counterparties
//! find its validation and feedback data. The non-registration fields are
//! assembled from layers, lowest precedence first:
//!
//! 1. defaults derived from the agent's domain
//! 2. a caller-supplied fallback
//! 3. caller-supplied overrides
//!
//! A field left `None` by a layer keeps the value from the layer below.

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use super::caip::{address_hex, normalize_domain, origin_for, to_caip10, Caip10};
use super::registry::IdentityRecord;
use crate::blockchain::types::DEFAULT_TRUST_MODELS;
use crate::error::IdentityError;

/// Well-known path of the agent metadata document.
pub const AGENT_METADATA_PATH: &str = "/.well-known/agent-metadata.json";

/// A portable reference to an on-chain identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationEntry {
    /// Base-10 agent id
    pub agent_id: String,
    /// CAIP-10 owner account
    pub agent_address: String,
    /// Hex domain-proof signature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustConfig {
    pub registrations: Vec<RegistrationEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_models: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_requests_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_responses_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_data_uri: Option<String>,
}

/// The optional, non-registration fields of a [`TrustConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_models: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_requests_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_responses_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback_data_uri: Option<String>,
}

impl TrustOverrides {
    /// Fields set in `self` win; unset fields come from `lower`.
    pub fn layered_over(&self, lower: &TrustOverrides) -> TrustOverrides {
        TrustOverrides {
            trust_models: self
                .trust_models
                .clone()
                .or_else(|| lower.trust_models.clone()),
            validation_requests_uri: self
                .validation_requests_uri
                .clone()
                .or_else(|| lower.validation_requests_uri.clone()),
            validation_responses_uri: self
                .validation_responses_uri
                .clone()
                .or_else(|| lower.validation_responses_uri.clone()),
            feedback_data_uri: self
                .feedback_data_uri
                .clone()
                .or_else(|| lower.feedback_data_uri.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &TrustOverrides::default()
    }
}

/// Override layers in increasing precedence.
#[derive(Debug, Clone, Default)]
pub struct TrustLayers {
    pub defaults: TrustOverrides,
    pub fallback: Option<TrustOverrides>,
    pub overrides: Option<TrustOverrides>,
}

impl TrustLayers {
    /// Merge the layers: defaults, then fallback, then overrides.
    pub fn resolve(&self) -> TrustOverrides {
        [&self.fallback, &self.overrides]
            .into_iter()
            .flatten()
            .fold(self.defaults.clone(), |merged, layer| {
                layer.layered_over(&merged)
            })
    }
}

/// Defaults derived from the agent's (normalized) domain. Blank domains
/// produce no defaults.
pub fn domain_trust_defaults(domain: &str) -> TrustOverrides {
    if domain.is_empty() {
        return TrustOverrides::default();
    }

    let origin = origin_for(domain);
    TrustOverrides {
        trust_models: Some(DEFAULT_TRUST_MODELS.iter().map(|m| m.to_string()).collect()),
        validation_requests_uri: Some(format!("{origin}/validation/requests.json")),
        validation_responses_uri: Some(format!("{origin}/validation/responses.json")),
        feedback_data_uri: Some(format!("{origin}/feedback.json")),
    }
}

impl TrustConfig {
    pub fn new(registrations: Vec<RegistrationEntry>) -> Self {
        Self {
            registrations,
            trust_models: None,
            validation_requests_uri: None,
            validation_responses_uri: None,
            feedback_data_uri: None,
        }
    }

    /// The optional fields as an override layer.
    pub fn overrides(&self) -> TrustOverrides {
        TrustOverrides {
            trust_models: self.trust_models.clone(),
            validation_requests_uri: self.validation_requests_uri.clone(),
            validation_responses_uri: self.validation_responses_uri.clone(),
            feedback_data_uri: self.feedback_data_uri.clone(),
        }
    }

    /// A copy with `overrides` layered on top of the current fields.
    pub fn with_overrides(&self, overrides: &TrustOverrides) -> TrustConfig {
        let merged = overrides.layered_over(&self.overrides());
        TrustConfig {
            registrations: self.registrations.clone(),
            trust_models: merged.trust_models,
            validation_requests_uri: merged.validation_requests_uri,
            validation_responses_uri: merged.validation_responses_uri,
            feedback_data_uri: merged.feedback_data_uri,
        }
    }
}

/// Arguments for [`create_registration_entry`].
#[derive(Debug, Clone, Copy)]
pub struct CreateRegistrationEntry<'a> {
    pub agent_id: U256,
    pub address: Address,
    pub chain_id: u64,
    pub namespace: Option<&'a str>,
    pub signature: Option<&'a Bytes>,
}

pub fn create_registration_entry(
    params: CreateRegistrationEntry<'_>,
) -> Result<RegistrationEntry, IdentityError> {
    let owner = address_hex(&params.address);
    let agent_address = to_caip10(Caip10 {
        namespace: params.namespace,
        chain_id: params.chain_id,
        address: &owner,
    })?;

    Ok(RegistrationEntry {
        agent_id: params.agent_id.to_string(),
        agent_address,
        signature: params.signature.map(|s| s.to_string()),
    })
}

/// Trust config with a single registration for `record`.
pub fn build_trust_config_from_identity(
    record: &IdentityRecord,
    chain_id: u64,
    namespace: Option<&str>,
    signature: Option<&Bytes>,
    overrides: &TrustOverrides,
) -> Result<TrustConfig, IdentityError> {
    let entry = create_registration_entry(CreateRegistrationEntry {
        agent_id: record.agent_id,
        address: record.owner,
        chain_id,
        namespace,
        signature,
    })?;

    Ok(TrustConfig::new(vec![entry]).with_overrides(overrides))
}

/// `<origin>/.well-known/agent-metadata.json` for a domain.
pub fn build_metadata_uri(domain: &str) -> Result<String, IdentityError> {
    let domain = normalize_domain(domain);
    if domain.is_empty() {
        return Err(IdentityError::invalid_input("domain is required"));
    }
    Ok(format!("{}{}", origin_for(&domain), AGENT_METADATA_PATH))
}
