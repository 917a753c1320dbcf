// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-8004 registry address resolution.
//!
//! The registries are deployed with CREATE2, so the same addresses are
//! expected on every chain. Chains that deviate get an entry in the override
//! table; resolution never touches the network and never fails.

use std::collections::HashMap;
use std::str::FromStr;

use alloy::primitives::Address;

use super::types::{
    chain_info, RegistryAddresses, RegistryKind, RegistryOverrides, SUPPORTED_CHAINS,
};

/// Built-in chain overrides. Empty while every deployment sits at the
/// CREATE2 addresses.
const CHAIN_OVERRIDES: &[(u64, RegistryOverrides)] = &[];

/// Registry address resolver with a per-chain override table.
#[derive(Debug, Clone)]
pub struct RegistryResolver {
    overrides: HashMap<u64, RegistryOverrides>,
}

impl Default for RegistryResolver {
    fn default() -> Self {
        Self {
            overrides: CHAIN_OVERRIDES.iter().copied().collect(),
        }
    }
}

impl RegistryResolver {
    /// Resolver with the built-in override table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the override set of `chain_id`.
    pub fn with_override(mut self, chain_id: u64, overrides: RegistryOverrides) -> Self {
        self.overrides.insert(chain_id, overrides);
        self
    }

    /// Default addresses with the chain's overrides applied.
    pub fn resolve(&self, chain_id: u64) -> RegistryAddresses {
        match self.overrides.get(&chain_id) {
            Some(overrides) => overrides.apply(RegistryAddresses::DEFAULT),
            None => RegistryAddresses::DEFAULT,
        }
    }

    pub fn address_of(&self, kind: RegistryKind, chain_id: u64) -> Address {
        self.resolve(chain_id).get(kind)
    }

    /// Whether `address` is one of the registries, on `chain_id` or on any
    /// supported chain when `chain_id` is `None`.
    ///
    /// Comparison is case-insensitive; malformed addresses are never known.
    pub fn is_known_registry_address(&self, address: &str, chain_id: Option<u64>) -> bool {
        let Ok(candidate) = Address::from_str(address.trim()) else {
            return false;
        };

        match chain_id {
            Some(id) => self.resolve(id).contains(candidate),
            None => SUPPORTED_CHAINS
                .iter()
                .any(|chain| self.resolve(chain.chain_id).contains(candidate)),
        }
    }
}

/// Registry addresses for `chain_id` using the built-in table.
pub fn resolve_addresses(chain_id: u64) -> RegistryAddresses {
    RegistryResolver::default().resolve(chain_id)
}

/// A single registry address for `chain_id` using the built-in table.
pub fn registry_address(kind: RegistryKind, chain_id: u64) -> Address {
    RegistryResolver::default().address_of(kind, chain_id)
}

/// Whether the registries are deployed on `chain_id`.
pub fn is_chain_supported(chain_id: u64) -> bool {
    chain_info(chain_id).is_some()
}

/// See [`RegistryResolver::is_known_registry_address`].
pub fn is_known_registry_address(address: &str, chain_id: Option<u64>) -> bool {
    RegistryResolver::default().is_known_registry_address(address, chain_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::types::{DEFAULT_IDENTITY_REGISTRY, DEFAULT_VALIDATION_REGISTRY};
    use alloy::primitives::address;

    #[test]
    fn supported_chains_resolve_three_distinct_addresses() {
        for chain in SUPPORTED_CHAINS {
            let addrs = resolve_addresses(chain.chain_id);
            assert_ne!(addrs.identity, addrs.reputation);
            assert_ne!(addrs.identity, addrs.validation);
            assert_ne!(addrs.reputation, addrs.validation);
            assert!(addrs.iter().all(|a| a != Address::ZERO));
        }
    }

    #[test]
    fn override_replaces_only_the_named_registry() {
        let custom = address!("0x1111111111111111111111111111111111111111");
        let resolver =
            RegistryResolver::new().with_override(42161, RegistryOverrides::reputation(custom));

        let arbitrum = resolver.resolve(42161);
        assert_eq!(arbitrum.reputation, custom);
        assert_eq!(arbitrum.identity, RegistryAddresses::DEFAULT.identity);
        assert_eq!(arbitrum.validation, RegistryAddresses::DEFAULT.validation);

        // Other chains keep the defaults.
        assert_eq!(resolver.resolve(8453), RegistryAddresses::DEFAULT);
    }

    #[test]
    fn unsupported_chain_still_resolves_defaults() {
        assert!(!is_chain_supported(999_999));
        assert_eq!(resolve_addresses(999_999), RegistryAddresses::DEFAULT);
        assert_eq!(
            registry_address(RegistryKind::Validation, 999_999),
            DEFAULT_VALIDATION_REGISTRY
        );
    }

    #[test]
    fn chain_support() {
        assert!(is_chain_supported(84532));
        assert!(is_chain_supported(1));
        assert!(!is_chain_supported(43114));

        assert_eq!(chain_info(84532).map(|c| c.name), Some("Base Sepolia"));
        assert_eq!(chain_info(10).map(|c| c.name), Some("OP Mainnet"));
        assert!(chain_info(43114).is_none());
    }

    #[test]
    fn known_registry_address_is_case_insensitive() {
        let upper = "0x7177A6867296406881E20D6647232314736DD09A";
        let lower = upper.to_lowercase();
        assert!(is_known_registry_address(upper, None));
        assert!(is_known_registry_address(&lower, Some(8453)));
        assert!(!is_known_registry_address(
            "0x0000000000000000000000000000000000000001",
            None
        ));
        assert!(!is_known_registry_address("not-an-address", None));
    }

    #[test]
    fn overridden_address_is_known_only_where_configured() {
        let custom = address!("0x2222222222222222222222222222222222222222");
        let resolver =
            RegistryResolver::new().with_override(10, RegistryOverrides::identity(custom));
        let custom_str = format!("{custom:#x}");

        assert!(resolver.is_known_registry_address(&custom_str, Some(10)));
        assert!(!resolver.is_known_registry_address(&custom_str, Some(1)));
        assert!(resolver.is_known_registry_address(&custom_str, None));
        assert_eq!(
            resolver.address_of(RegistryKind::Identity, 1),
            DEFAULT_IDENTITY_REGISTRY
        );
    }
}
