// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain-facing side of the identity layer.
//!
//! This module provides:
//! - ERC-8004 registry addresses per chain
//! - Capability traits for registry reads, writes, receipts, signing and ERC-1271 checks
//! - Alloy JSON-RPC implementations of those traits
//! - Local key loading (hex or PEM)

pub mod abi;
pub mod client;
pub mod registries;
pub mod signing;
pub mod traits;
pub mod types;

pub use client::{ChainClientError, ReceiptMode, RpcRegistryReader, RpcRegistryWriter};
pub use registries::{
    is_chain_supported, is_known_registry_address, registry_address, resolve_addresses,
    RegistryResolver,
};
pub use signing::LocalMessageSigner;
pub use traits::*;
pub use types::*;
