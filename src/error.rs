// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error taxonomy for the identity layer.
//!
//! Input and configuration errors always propagate to the caller of the
//! failing operation. Chain failures are not classified further than
//! read vs. write: the message of the underlying client error is kept as-is.

use alloy::primitives::B256;

/// Errors returned by registry, signature and bootstrap operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Malformed or missing caller-supplied data (domain, token URI, address).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Agent id is negative, fractional, too large for exact numeric input, or not decimal.
    #[error("Invalid agent id: {0}")]
    InvalidAgentId(String),

    /// Registry writes need a wallet client.
    #[error("Identity registry client requires a wallet client for writes")]
    MissingWallet,

    /// The wallet client has no bound account.
    #[error("Wallet account address is required")]
    MissingAccount,

    /// CAIP-10 entries cannot be built without a chain id.
    #[error("Identity registry client needs a chain id to build CAIP-10 registration entries")]
    MissingChainId,

    /// A read-only registry call failed.
    #[error("Registry read failed: {0}")]
    RegistryRead(String),

    /// The registration transaction could not be submitted.
    #[error("Registry write failed: {0}")]
    RegistryWrite(String),

    /// The registration was submitted but its receipt could not be read.
    #[error("Registration {transaction_hash} submitted, receipt read failed: {reason}")]
    RegistrationReceipt { transaction_hash: B256, reason: String },

    /// The signer could not produce a signature.
    #[error("Signature error: {0}")]
    Signature(String),

    /// The signature is malformed and no address can be recovered from it.
    #[error("Signature recovery failed: {0}")]
    SignatureRecovery(String),
}

impl IdentityError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_agent_id(message: impl Into<String>) -> Self {
        Self::InvalidAgentId(message.into())
    }

    /// Stable machine-readable code for logs and diagnostics.
    pub fn error_code(&self) -> &'static str {
        match self {
            IdentityError::InvalidInput(_) => "invalid_input",
            IdentityError::InvalidAgentId(_) => "invalid_agent_id",
            IdentityError::MissingWallet => "missing_wallet",
            IdentityError::MissingAccount => "missing_account",
            IdentityError::MissingChainId => "missing_chain_id",
            IdentityError::RegistryRead(_) => "registry_read",
            IdentityError::RegistryWrite(_) => "registry_write",
            IdentityError::RegistrationReceipt { .. } => "registration_receipt",
            IdentityError::Signature(_) => "signature",
            IdentityError::SignatureRecovery(_) => "signature_recovery",
        }
    }
}
