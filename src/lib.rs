// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Agent Identity - ERC-8004 identity for autonomous agents
//!
//! Looks an agent up in (or registers it with) the ERC-8004 identity
//! registry, signs a proof that the agent's wallet controls its domain and
//! assembles the trust config the agent publishes.
//!
//! ## Modules
//!
//! - `blockchain` - Registry addresses, capability traits and alloy clients
//! - `identity` - CAIP-10 codec, canonical messages, signatures, registry client, bootstrap
//! - `config` - Environment variables
//! - `error` - Error taxonomy

pub mod blockchain;
pub mod config;
pub mod error;
pub mod identity;

#[cfg(test)]
mod test_support;
