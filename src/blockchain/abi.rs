// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-8004 identity registry and ERC-1271 contract interfaces.

use alloy::primitives::{b256, fixed_bytes, FixedBytes, B256};
use alloy::sol;

// Define the registry interfaces using alloy's sol! macro.
// `register` is overloaded: `register_0(string)` and `register_1(string, MetadataEntry[])`.
sol! {
    #[sol(rpc)]
    interface IIdentityRegistry {
        struct MetadataEntry {
            string key;
            bytes value;
        }

        function register(string tokenURI) external returns (uint256 agentId);
        function register(string tokenURI, MetadataEntry[] metadata) external returns (uint256 agentId);
        function agentExists(uint256 agentId) external view returns (bool);
        function ownerOf(uint256 agentId) external view returns (address);
        function tokenURI(uint256 agentId) external view returns (string);
    }

    #[sol(rpc)]
    interface IERC1271 {
        function isValidSignature(bytes32 hash, bytes signature) external view returns (bytes4 magicValue);
    }
}

/// Topic 0 of the identity registry's `Registered` event.
///
/// topics[1] = agentId (indexed uint256), topics[2] = owner (indexed address).
/// Matched as an opaque constant, never recomputed from an ABI.
pub const REGISTERED_EVENT_TOPIC: B256 =
    b256!("0xca52e62c367d81bb2e328eb795f7c7ba24afb478408a26c0e201d155c449bc4a");

/// Value returned by `isValidSignature` for a valid signature.
pub const ERC1271_MAGIC_VALUE: FixedBytes<4> = fixed_bytes!("0x1626ba7e");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_topic_is_the_fixed_constant() {
        let expected = "0xca52e62c367d81bb2e328eb795f7c7ba24afb478408a26c0e201d155c449bc4a";
        let actual = format!("0x{}", alloy::hex::encode(REGISTERED_EVENT_TOPIC.as_slice()));
        assert_eq!(actual, expected);
    }

    #[test]
    fn erc1271_magic_value_matches_selector() {
        use alloy::sol_types::SolCall;
        assert_eq!(
            IERC1271::isValidSignatureCall::SELECTOR,
            ERC1271_MAGIC_VALUE.0
        );
    }
}
