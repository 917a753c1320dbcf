// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JSON-RPC clients for the ERC-8004 identity registry.

use std::sync::Arc;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{eip191_hash_message, Address, Bytes, B256, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, PendingTransactionBuilder, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;

use super::abi::{IIdentityRegistry, IERC1271, ERC1271_MAGIC_VALUE};
use super::signing::LocalMessageSigner;
use super::traits::{
    MessageSigner, MetadataEntry, ReceiptCapability, ReceiptFetcher, ReceiptLog, ReceiptWaiter,
    RegistryReader, RegistryWriter, SignatureVerifier, TransactionReceiptLogs,
};

/// HTTP provider type for registry reads (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// HTTP provider type for registry writes (fillers plus wallet).
type WalletProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// How [`RpcRegistryReader`] obtains receipts after a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiptMode {
    /// Watch the pending transaction until it is mined.
    #[default]
    Wait,
    /// Single `eth_getTransactionReceipt` lookup.
    Fetch,
}

fn parse_rpc_url(rpc_url: &str) -> Result<url::Url, ChainClientError> {
    rpc_url
        .trim()
        .parse()
        .map_err(|e: url::ParseError| ChainClientError::InvalidRpcUrl(e.to_string()))
}

/// Read-only registry client over HTTP JSON-RPC.
///
/// Also serves receipts and ERC-1271 checks, which only need a read provider.
pub struct RpcRegistryReader {
    /// Chain the endpoint is expected to serve
    chain_id: u64,
    /// Alloy HTTP provider
    provider: HttpProvider,
    receipt_mode: ReceiptMode,
}

impl RpcRegistryReader {
    /// Create a reader for the given endpoint.
    pub fn new(rpc_url: &str, chain_id: u64) -> Result<Self, ChainClientError> {
        let url = parse_rpc_url(rpc_url)?;
        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            chain_id,
            provider,
            receipt_mode: ReceiptMode::default(),
        })
    }

    pub fn with_receipt_mode(mut self, mode: ReceiptMode) -> Self {
        self.receipt_mode = mode;
        self
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    fn registry(&self, registry: Address) -> IIdentityRegistry::IIdentityRegistryInstance<HttpProvider> {
        IIdentityRegistry::new(registry, self.provider.clone())
    }
}

#[async_trait]
impl RegistryReader for RpcRegistryReader {
    async fn agent_exists(
        &self,
        registry: Address,
        agent_id: U256,
    ) -> Result<bool, ChainClientError> {
        self.registry(registry)
            .agentExists(agent_id)
            .call()
            .await
            .map_err(|e| ChainClientError::Contract(e.to_string()))
    }

    async fn owner_of(
        &self,
        registry: Address,
        agent_id: U256,
    ) -> Result<Address, ChainClientError> {
        self.registry(registry)
            .ownerOf(agent_id)
            .call()
            .await
            .map_err(|e| ChainClientError::Contract(e.to_string()))
    }

    async fn token_uri(
        &self,
        registry: Address,
        agent_id: U256,
    ) -> Result<String, ChainClientError> {
        self.registry(registry)
            .tokenURI(agent_id)
            .call()
            .await
            .map_err(|e| ChainClientError::Contract(e.to_string()))
    }

    fn receipts(&self) -> ReceiptCapability<'_> {
        match self.receipt_mode {
            ReceiptMode::Wait => ReceiptCapability::Wait(self),
            ReceiptMode::Fetch => ReceiptCapability::Fetch(self),
        }
    }
}

#[async_trait]
impl ReceiptWaiter for RpcRegistryReader {
    async fn wait_for_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<TransactionReceiptLogs, ChainClientError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await
            .map_err(|e| ChainClientError::Rpc(format!("Failed to wait for receipt: {}", e)))?;

        Ok(receipt_logs(&receipt))
    }
}

#[async_trait]
impl ReceiptFetcher for RpcRegistryReader {
    async fn get_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceiptLogs>, ChainClientError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| ChainClientError::Rpc(format!("Failed to get receipt: {}", e)))?;

        Ok(receipt.as_ref().map(receipt_logs))
    }
}

#[async_trait]
impl SignatureVerifier for RpcRegistryReader {
    async fn verify_message(
        &self,
        address: Address,
        message: &str,
        signature: &[u8],
    ) -> Result<bool, ChainClientError> {
        let hash = eip191_hash_message(message);
        let contract = IERC1271::new(address, self.provider.clone());

        let magic = contract
            .isValidSignature(hash, Bytes::copy_from_slice(signature))
            .call()
            .await
            .map_err(|e| ChainClientError::Contract(e.to_string()))?;

        Ok(magic == ERC1271_MAGIC_VALUE)
    }
}

/// Registry client that signs and sends registration transactions.
pub struct RpcRegistryWriter {
    /// Alloy HTTP provider with wallet filler
    provider: WalletProvider,
    /// Sending account
    account: Address,
    /// Same key, exposed for message signing
    signer: Arc<LocalMessageSigner>,
}

impl RpcRegistryWriter {
    /// Create a writer that sends from `signer`'s account.
    pub fn new(rpc_url: &str, signer: PrivateKeySigner) -> Result<Self, ChainClientError> {
        let url = parse_rpc_url(rpc_url)?;
        let account = signer.address();
        let message_signer = Arc::new(LocalMessageSigner::new(signer.clone()));
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self {
            provider,
            account,
            signer: message_signer,
        })
    }
}

#[async_trait]
impl RegistryWriter for RpcRegistryWriter {
    fn account(&self) -> Option<Address> {
        Some(self.account)
    }

    async fn submit_register(
        &self,
        registry: Address,
        token_uri: &str,
        metadata: &[MetadataEntry],
    ) -> Result<B256, ChainClientError> {
        let contract = IIdentityRegistry::new(registry, self.provider.clone());

        let pending = if metadata.is_empty() {
            contract.register_0(token_uri.to_string()).send().await
        } else {
            let entries = metadata
                .iter()
                .map(|m| IIdentityRegistry::MetadataEntry {
                    key: m.key.clone(),
                    value: m.value.clone(),
                })
                .collect();
            contract.register_1(token_uri.to_string(), entries).send().await
        }
        .map_err(|e| ChainClientError::TransactionFailed(format!("Failed to send: {}", e)))?;

        Ok(*pending.tx_hash())
    }

    fn message_signer(&self) -> Option<Arc<dyn MessageSigner>> {
        Some(self.signer.clone() as Arc<dyn MessageSigner>)
    }
}

/// Keep only what the registry client needs from an RPC receipt.
fn receipt_logs(receipt: &TransactionReceipt) -> TransactionReceiptLogs {
    TransactionReceiptLogs {
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| ReceiptLog {
                address: log.address(),
                topics: log.topics().to_vec(),
                data: log.data().data.clone(),
            })
            .collect(),
    }
}

/// Errors that can occur during chain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}
