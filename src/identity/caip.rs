// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CAIP-10 account identifiers and address/domain normalization.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;

use crate::blockchain::types::DEFAULT_NAMESPACE;
use crate::error::IdentityError;

/// Parts of a CAIP-10 identifier (`namespace:chainId:address`).
#[derive(Debug, Clone, Copy)]
pub struct Caip10<'a> {
    /// CAIP-2 namespace; `eip155` when `None` or blank
    pub namespace: Option<&'a str>,
    pub chain_id: u64,
    /// Written out as given; expected to be normalized by the caller
    pub address: &'a str,
}

/// Format a CAIP-10 identifier.
///
/// No checksum validation is done here; callers pass normalized addresses.
pub fn to_caip10(params: Caip10<'_>) -> Result<String, IdentityError> {
    if params.address.trim().is_empty() {
        return Err(IdentityError::invalid_input(
            "address is required for CAIP-10 formatting",
        ));
    }

    let namespace = params
        .namespace
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());

    Ok(format!("{}:{}:{}", namespace, params.chain_id, params.address))
}

/// A parsed CAIP-10 identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caip10Address {
    pub namespace: String,
    pub chain_id: u64,
    pub address: String,
}

impl Caip10Address {
    /// The account part as an EVM address.
    pub fn evm_address(&self) -> Result<Address, IdentityError> {
        normalize_address(&self.address)
    }
}

impl fmt::Display for Caip10Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.chain_id, self.address)
    }
}

impl FromStr for Caip10Address {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_caip10(s)
    }
}

/// Parse `namespace:chainId:address`.
pub fn parse_caip10(value: &str) -> Result<Caip10Address, IdentityError> {
    let mut parts = value.trim().splitn(3, ':');
    let (Some(namespace), Some(chain), Some(address)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(IdentityError::invalid_input(format!(
            "CAIP-10 identifier must have three parts: {value}"
        )));
    };

    if namespace.is_empty() || address.is_empty() {
        return Err(IdentityError::invalid_input(format!(
            "CAIP-10 identifier has an empty part: {value}"
        )));
    }

    let chain_id = chain.parse::<u64>().map_err(|_| {
        IdentityError::invalid_input(format!("CAIP-10 chain id must be decimal: {chain}"))
    })?;

    Ok(Caip10Address {
        namespace: namespace.to_string(),
        chain_id,
        address: address.to_string(),
    })
}

/// Parse a hex address in any case, with or without `0x`.
pub fn normalize_address(value: &str) -> Result<Address, IdentityError> {
    Address::from_str(value.trim())
        .map_err(|e| IdentityError::invalid_input(format!("invalid address {value:?}: {e}")))
}

/// Canonical lower-case `0x` rendering.
pub fn address_hex(address: &Address) -> String {
    format!("{address:#x}")
}

/// Trim, lower-case and drop trailing slashes. Returns an empty string for
/// blank input.
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('/').to_ascii_lowercase()
}

/// Origin for a domain: kept as-is when it already has an `http://` or
/// `https://` scheme, otherwise served over https.
pub fn origin_for(domain: &str) -> String {
    if domain.starts_with("https://") || domain.starts_with("http://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}
