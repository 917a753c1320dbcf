// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain constants and registry address types.

use alloy::primitives::{address, Address};

/// Network entry of the supported-chain table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainInfo {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
}

pub const BASE_SEPOLIA: ChainInfo = ChainInfo {
    name: "Base Sepolia",
    chain_id: 84532,
};

pub const ETHEREUM_MAINNET: ChainInfo = ChainInfo {
    name: "Ethereum Mainnet",
    chain_id: 1,
};

pub const SEPOLIA: ChainInfo = ChainInfo {
    name: "Sepolia",
    chain_id: 11_155_111,
};

pub const BASE_MAINNET: ChainInfo = ChainInfo {
    name: "Base",
    chain_id: 8453,
};

pub const ARBITRUM: ChainInfo = ChainInfo {
    name: "Arbitrum One",
    chain_id: 42161,
};

pub const OPTIMISM: ChainInfo = ChainInfo {
    name: "OP Mainnet",
    chain_id: 10,
};

pub const POLYGON: ChainInfo = ChainInfo {
    name: "Polygon",
    chain_id: 137,
};

pub const POLYGON_AMOY: ChainInfo = ChainInfo {
    name: "Polygon Amoy",
    chain_id: 80002,
};

/// Chains with ERC-8004 registry deployments.
pub const SUPPORTED_CHAINS: &[ChainInfo] = &[
    BASE_SEPOLIA,
    ETHEREUM_MAINNET,
    SEPOLIA,
    BASE_MAINNET,
    ARBITRUM,
    OPTIMISM,
    POLYGON,
    POLYGON_AMOY,
];

/// Chain used when neither the caller nor the environment names one.
pub const DEFAULT_CHAIN_ID: u64 = BASE_SEPOLIA.chain_id;

/// CAIP-2 namespace of EVM chains.
pub const DEFAULT_NAMESPACE: &str = "eip155";

/// Trust models advertised by default in a trust config.
pub const DEFAULT_TRUST_MODELS: &[&str] = &["feedback", "inference-validation"];

/// Identity registry (ERC-721 agent identities), CREATE2-deployed.
pub const DEFAULT_IDENTITY_REGISTRY: Address =
    address!("0x7177a6867296406881e20d6647232314736dd09a");

/// Reputation registry (peer feedback), CREATE2-deployed.
pub const DEFAULT_REPUTATION_REGISTRY: Address =
    address!("0xb5048e3ef1da4e04deb6f7d0423d06f63869e322");

/// Validation registry (validation requests and responses), CREATE2-deployed.
pub const DEFAULT_VALIDATION_REGISTRY: Address =
    address!("0x662b40a526cb4017d947e71eaf6753bf3eee66d8");

/// The three ERC-8004 registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryKind {
    Identity,
    Reputation,
    Validation,
}

/// Registry addresses for one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryAddresses {
    pub identity: Address,
    pub reputation: Address,
    pub validation: Address,
}

impl RegistryAddresses {
    /// CREATE2 defaults, identical on every chain.
    pub const DEFAULT: RegistryAddresses = RegistryAddresses {
        identity: DEFAULT_IDENTITY_REGISTRY,
        reputation: DEFAULT_REPUTATION_REGISTRY,
        validation: DEFAULT_VALIDATION_REGISTRY,
    };

    pub fn get(&self, kind: RegistryKind) -> Address {
        match kind {
            RegistryKind::Identity => self.identity,
            RegistryKind::Reputation => self.reputation,
            RegistryKind::Validation => self.validation,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Address> {
        [self.identity, self.reputation, self.validation].into_iter()
    }

    pub fn contains(&self, address: Address) -> bool {
        self.iter().any(|a| a == address)
    }
}

impl Default for RegistryAddresses {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-chain replacement of individual registry addresses.
///
/// A field is either replaced wholesale or left at the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryOverrides {
    pub identity: Option<Address>,
    pub reputation: Option<Address>,
    pub validation: Option<Address>,
}

impl RegistryOverrides {
    pub fn identity(address: Address) -> Self {
        Self {
            identity: Some(address),
            ..Self::default()
        }
    }

    pub fn reputation(address: Address) -> Self {
        Self {
            reputation: Some(address),
            ..Self::default()
        }
    }

    pub fn validation(address: Address) -> Self {
        Self {
            validation: Some(address),
            ..Self::default()
        }
    }

    /// Apply these overrides on top of `base`.
    pub fn apply(&self, base: RegistryAddresses) -> RegistryAddresses {
        RegistryAddresses {
            identity: self.identity.unwrap_or(base.identity),
            reputation: self.reputation.unwrap_or(base.reputation),
            validation: self.validation.unwrap_or(base.validation),
        }
    }
}

/// Look up a supported chain by id.
pub fn chain_info(chain_id: u64) -> Option<ChainInfo> {
    SUPPORTED_CHAINS
        .iter()
        .copied()
        .find(|c| c.chain_id == chain_id)
}
