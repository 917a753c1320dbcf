// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the string-keyed environment
//! mapping consumed by [`crate::identity::bootstrap_identity`]. The mapping is
//! injected so callers and tests never depend on the process environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CHAIN_ID` | EVM chain id of the identity registry | `84532` (Base Sepolia) |
//! | `AGENT_DOMAIN` | Domain the agent is served from | Required for bootstrap |
//! | `IDENTITY_REGISTRY_ADDRESS` | Identity registry contract | CREATE2 default for supported chains |
//! | `RPC_URL` | JSON-RPC endpoint | Required for env-built clients |
//! | `PRIVATE_KEY` | Agent key (hex, optional `0x`, or PEM) | Optional, read-only without it |
//! | `REGISTER_IDENTITY` | Register when no identity exists (`true`) | `false` |
//! | `IDENTITY_SIGNATURE_NONCE` | Nonce line of the domain proof | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::collections::HashMap;

/// EVM chain id of the registry.
pub const CHAIN_ID_ENV: &str = "CHAIN_ID";

/// Domain the agent's manifest and trust files are served from.
pub const AGENT_DOMAIN_ENV: &str = "AGENT_DOMAIN";

/// Explicit identity registry address.
pub const IDENTITY_REGISTRY_ADDRESS_ENV: &str = "IDENTITY_REGISTRY_ADDRESS";

/// JSON-RPC endpoint for registry reads and writes.
pub const RPC_URL_ENV: &str = "RPC_URL";

/// Private key of the agent wallet.
///
/// Accepted as 64 hex characters with or without `0x`, or as a PEM block
/// (SEC1 or PKCS#8).
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Opt-in flag for automatic registration. Only the literal `true` enables it.
pub const REGISTER_IDENTITY_ENV: &str = "REGISTER_IDENTITY";

/// Optional nonce appended to the domain proof.
pub const IDENTITY_SIGNATURE_NONCE_ENV: &str = "IDENTITY_SIGNATURE_NONCE";

/// Logging format selector (`json` or `pretty`).
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// String-keyed environment mapping.
///
/// Blank values are treated as absent, so `CHAIN_ID=""` behaves exactly like
/// an unset variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvMap {
    vars: HashMap<String, String>,
}

impl EnvMap {
    /// Empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current process environment.
    pub fn from_process() -> Self {
        std::env::vars().collect()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Trimmed, non-blank value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Parse `key` as a positive integer (see [`parse_positive_integer`]).
    pub fn positive_integer(&self, key: &str) -> Option<u64> {
        parse_positive_integer(self.get(key))
    }

    /// Parse `key` as an opt-in flag (see [`parse_bool_flag`]).
    pub fn flag(&self, key: &str) -> bool {
        parse_bool_flag(self.get(key))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parse a strictly positive integer, truncating any fractional part.
///
/// Returns `None` for missing, non-numeric, zero or negative input.
pub fn parse_positive_integer(value: Option<&str>) -> Option<u64> {
    let raw = value?.trim();
    if let Ok(parsed) = raw.parse::<u64>() {
        return (parsed > 0).then_some(parsed);
    }
    let parsed = raw.parse::<f64>().ok()?;
    if !parsed.is_finite() || parsed < 1.0 || parsed > u64::MAX as f64 {
        return None;
    }
    Some(parsed.trunc() as u64)
}

/// Opt-in flags are enabled only by the exact string `true`.
pub fn parse_bool_flag(value: Option<&str>) -> bool {
    value.map(str::trim) == Some("true")
}
