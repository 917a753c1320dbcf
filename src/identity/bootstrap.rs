// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Agent start-up flow for ERC-8004 identity.
//!
//! [`bootstrap_trust`] takes explicit inputs and turns an agent's domain into
//! a signed trust configuration, registering the agent first when asked to.
//! [`bootstrap_identity`] resolves those inputs from options and the
//! environment, builds the chain clients and never fails: any problem is
//! logged and the agent runs without an identity.

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;

use super::caip::{normalize_address, normalize_domain};
use super::registry::{
    IdentityRecord, IdentityRegistryClient, IdentityRegistryClientOptions, ReceiptOutcome,
    ReceiptPolicy, RegisterAgentInput,
};
use super::signatures::{sign_agent_domain_proof, SignAgentDomainProof};
use super::trust::{
    build_metadata_uri, domain_trust_defaults, TrustConfig, TrustLayers, TrustOverrides,
};
use crate::blockchain::client::{ReceiptMode, RpcRegistryReader, RpcRegistryWriter};
use crate::blockchain::registries::{is_chain_supported, registry_address};
use crate::blockchain::signing::signer_from_key;
use crate::blockchain::traits::{MessageSigner, RegistryReader, RegistryWriter};
use crate::blockchain::types::{chain_info, RegistryKind, DEFAULT_CHAIN_ID};
use crate::config::{
    EnvMap, AGENT_DOMAIN_ENV, CHAIN_ID_ENV, IDENTITY_REGISTRY_ADDRESS_ENV,
    IDENTITY_SIGNATURE_NONCE_ENV, PRIVATE_KEY_ENV, REGISTER_IDENTITY_ENV, RPC_URL_ENV,
};
use crate::error::IdentityError;

/// Looks an identity up by domain when the registry itself cannot.
///
/// The registry is keyed by agent id only, so callers that index agents by
/// domain plug their lookup in here.
#[async_trait]
pub trait MissingIdentityResolver: Send + Sync {
    async fn resolve(
        &self,
        client: &IdentityRegistryClient,
        normalized_domain: &str,
    ) -> Result<Option<IdentityRecord>, IdentityError>;
}

pub struct BootstrapTrustOptions {
    pub domain: String,
    pub chain_id: u64,
    pub registry_address: Address,
    pub namespace: Option<String>,
    pub reader: Arc<dyn RegistryReader>,
    pub writer: Option<Arc<dyn RegistryWriter>>,
    pub signer: Option<Arc<dyn MessageSigner>>,
    pub signature_nonce: Option<String>,
    pub register_if_missing: bool,
    /// Wins over `register_if_missing`
    pub skip_register: bool,
    pub trust_fallback: Option<TrustOverrides>,
    pub trust_overrides: Option<TrustOverrides>,
    pub on_missing: Option<Arc<dyn MissingIdentityResolver>>,
    pub receipt_policy: ReceiptPolicy,
}

impl BootstrapTrustOptions {
    pub fn new(
        domain: impl Into<String>,
        chain_id: u64,
        registry_address: Address,
        reader: Arc<dyn RegistryReader>,
    ) -> Self {
        Self {
            domain: domain.into(),
            chain_id,
            registry_address,
            namespace: None,
            reader,
            writer: None,
            signer: None,
            signature_nonce: None,
            register_if_missing: false,
            skip_register: false,
            trust_fallback: None,
            trust_overrides: None,
            on_missing: None,
            receipt_policy: ReceiptPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapTrustResult {
    pub trust: Option<TrustConfig>,
    pub record: Option<IdentityRecord>,
    pub transaction_hash: Option<B256>,
    pub signature: Option<Bytes>,
    pub did_register: bool,
    /// Soft failures that did not stop the flow
    pub warnings: Vec<String>,
}

/// Resolve (or register) the agent for `domain` and build its trust config.
pub async fn bootstrap_trust(
    options: BootstrapTrustOptions,
) -> Result<BootstrapTrustResult, IdentityError> {
    let domain = normalize_domain(&options.domain);
    if domain.is_empty() {
        return Err(IdentityError::invalid_input(
            "domain is required to bootstrap trust state",
        ));
    }

    let should_register = options.register_if_missing && !options.skip_register;

    let client = IdentityRegistryClient::new(IdentityRegistryClientOptions {
        address: options.registry_address,
        chain_id: Some(options.chain_id),
        namespace: options.namespace.clone(),
        reader: options.reader.clone(),
        writer: options.writer.clone(),
        receipt_policy: options.receipt_policy,
    });

    let mut result = BootstrapTrustResult::default();

    let mut record = match &options.on_missing {
        Some(resolver) => resolver.resolve(&client, &domain).await?,
        None => None,
    };

    if record.is_none() && should_register {
        let token_uri = build_metadata_uri(&domain)?;
        let registration = client
            .register(RegisterAgentInput::new(token_uri.clone()))
            .await?;

        result.transaction_hash = Some(registration.transaction_hash);
        result.did_register = true;

        if let ReceiptOutcome::Failed(reason) = &registration.receipt {
            result
                .warnings
                .push(format!("registration receipt unavailable: {reason}"));
        }

        record = registration.agent_id.map(|agent_id| IdentityRecord {
            agent_id,
            owner: registration.agent_address,
            token_uri,
        });
    }

    let Some(record) = record else {
        tracing::info!(
            domain = %domain,
            did_register = result.did_register,
            "No identity record available"
        );
        return Ok(result);
    };

    let signature = match &options.signer {
        Some(signer) => {
            let signed = sign_agent_domain_proof(SignAgentDomainProof {
                signer: signer.as_ref(),
                domain: &domain,
                address: record.owner,
                chain_id: options.chain_id,
                nonce: options.signature_nonce.as_deref(),
            })
            .await;

            match signed {
                Ok(signature) => {
                    tracing::info!(domain = %domain, "Generated domain proof signature");
                    Some(signature)
                }
                Err(e) => {
                    tracing::warn!(error = %e, domain = %domain, "Failed to generate domain proof signature");
                    result
                        .warnings
                        .push(format!("domain proof signature failed: {e}"));
                    None
                }
            }
        }
        None => {
            tracing::info!("No signer provided, skipping domain proof signature");
            None
        }
    };

    let overrides = TrustLayers {
        defaults: domain_trust_defaults(&domain),
        fallback: options.trust_fallback,
        overrides: options.trust_overrides,
    }
    .resolve();

    let entry = client.to_registration_entry(&record, signature.as_ref())?;
    result.trust = Some(TrustConfig::new(vec![entry]).with_overrides(&overrides));
    result.record = Some(record);
    result.signature = signature;

    Ok(result)
}

/// Chain clients for one bootstrap run.
#[derive(Clone)]
pub struct BootstrapClients {
    pub reader: Arc<dyn RegistryReader>,
    pub writer: Option<Arc<dyn RegistryWriter>>,
    pub signer: Option<Arc<dyn MessageSigner>>,
}

pub struct ClientFactoryParams<'a> {
    pub chain_id: u64,
    pub rpc_url: &'a str,
    pub env: &'a EnvMap,
}

/// Builds chain clients from an RPC endpoint and the environment.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn make_clients(&self, params: ClientFactoryParams<'_>) -> Option<BootstrapClients>;
}

/// Alloy JSON-RPC clients.
///
/// The writer and signer are only built when `PRIVATE_KEY` holds a usable key.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcClientFactory {
    pub receipt_mode: ReceiptMode,
}

#[async_trait]
impl ClientFactory for RpcClientFactory {
    async fn make_clients(&self, params: ClientFactoryParams<'_>) -> Option<BootstrapClients> {
        let reader = match RpcRegistryReader::new(params.rpc_url, params.chain_id) {
            Ok(reader) => reader.with_receipt_mode(self.receipt_mode),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create registry reader");
                return None;
            }
        };

        let mut clients = BootstrapClients {
            reader: Arc::new(reader),
            writer: None,
            signer: None,
        };

        let Some(raw_key) = params.env.get(PRIVATE_KEY_ENV) else {
            tracing::debug!("No private key configured, registry access is read-only");
            return Some(clients);
        };

        let writer = signer_from_key(raw_key)
            .and_then(|signer| RpcRegistryWriter::new(params.rpc_url, signer));

        match writer {
            Ok(writer) => {
                clients.signer = writer.message_signer();
                clients.writer = Some(Arc::new(writer));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unusable private key, registry access is read-only");
            }
        }

        Some(clients)
    }
}

/// Inputs for [`bootstrap_identity`]. Unset fields fall back to the environment.
#[derive(Default)]
pub struct BootstrapIdentityOptions {
    pub domain: Option<String>,
    pub chain_id: Option<u64>,
    pub registry_address: Option<Address>,
    pub namespace: Option<String>,
    pub rpc_url: Option<String>,
    pub reader: Option<Arc<dyn RegistryReader>>,
    pub writer: Option<Arc<dyn RegistryWriter>>,
    pub signer: Option<Arc<dyn MessageSigner>>,
    /// Used when no reader is given and an RPC URL is known
    pub client_factory: Option<Arc<dyn ClientFactory>>,
    pub register_if_missing: Option<bool>,
    pub skip_register: bool,
    pub signature_nonce: Option<String>,
    pub trust_fallback: Option<TrustOverrides>,
    pub trust_overrides: Option<TrustOverrides>,
    pub on_missing: Option<Arc<dyn MissingIdentityResolver>>,
    pub receipt_policy: ReceiptPolicy,
    pub env: EnvMap,
}

impl BootstrapIdentityOptions {
    /// Options read entirely from the process environment, with alloy clients.
    pub fn from_env() -> Self {
        Self {
            env: EnvMap::from_process(),
            client_factory: Some(Arc::new(RpcClientFactory::default())),
            ..Default::default()
        }
    }
}

/// Explicit address, then `IDENTITY_REGISTRY_ADDRESS`, then the chain's
/// default identity registry.
fn resolve_registry_address(
    explicit: Option<Address>,
    env: &EnvMap,
    chain_id: u64,
) -> Result<Option<Address>, IdentityError> {
    if explicit.is_some() {
        return Ok(explicit);
    }
    if let Some(raw) = env.get(IDENTITY_REGISTRY_ADDRESS_ENV) {
        return normalize_address(raw).map(Some);
    }
    if is_chain_supported(chain_id) {
        return Ok(Some(registry_address(RegistryKind::Identity, chain_id)));
    }
    Ok(None)
}

/// Best-effort identity bootstrap for agent start-up.
///
/// Returns an empty result whenever inputs are missing, nothing was found
/// and registration is off, or any step fails.
pub async fn bootstrap_identity(options: BootstrapIdentityOptions) -> BootstrapTrustResult {
    let BootstrapIdentityOptions {
        domain,
        chain_id,
        registry_address,
        namespace,
        rpc_url,
        mut reader,
        mut writer,
        mut signer,
        client_factory,
        register_if_missing,
        skip_register,
        signature_nonce,
        trust_fallback,
        trust_overrides,
        on_missing,
        receipt_policy,
        env,
    } = options;

    let chain_id = chain_id
        .or_else(|| env.positive_integer(CHAIN_ID_ENV))
        .unwrap_or(DEFAULT_CHAIN_ID);
    let network = chain_info(chain_id).map_or("unlisted", |c| c.name);
    let domain = domain.or_else(|| env.get(AGENT_DOMAIN_ENV).map(str::to_string));
    let rpc_url = rpc_url.or_else(|| env.get(RPC_URL_ENV).map(str::to_string));

    let registry_address = match resolve_registry_address(registry_address, &env, chain_id) {
        Ok(address) => address,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid identity registry address");
            tracing::info!("Agent will run without ERC-8004 identity");
            return BootstrapTrustResult::default();
        }
    };

    if reader.is_none() {
        if let (Some(factory), Some(rpc_url)) = (&client_factory, rpc_url.as_deref()) {
            let produced = factory
                .make_clients(ClientFactoryParams {
                    chain_id,
                    rpc_url,
                    env: &env,
                })
                .await;

            if let Some(produced) = produced {
                reader = Some(produced.reader);
                writer = writer.or(produced.writer);
                signer = signer.or(produced.signer);
            }
        }
    }

    if signer.is_none() {
        signer = writer.as_ref().and_then(|w| w.message_signer());
    }

    let (Some(domain), Some(registry_address), Some(reader)) = (domain, registry_address, reader)
    else {
        tracing::info!(chain_id, network, "Identity inputs incomplete (domain, registry or RPC client missing)");
        tracing::info!("Agent will run without ERC-8004 identity");
        return BootstrapTrustResult::default();
    };

    let outcome = bootstrap_trust(BootstrapTrustOptions {
        domain,
        chain_id,
        registry_address,
        namespace,
        reader,
        writer,
        signer,
        signature_nonce: signature_nonce
            .or_else(|| env.get(IDENTITY_SIGNATURE_NONCE_ENV).map(str::to_string)),
        register_if_missing: register_if_missing
            .unwrap_or_else(|| env.flag(REGISTER_IDENTITY_ENV)),
        skip_register,
        trust_fallback,
        trust_overrides,
        on_missing,
        receipt_policy,
    })
    .await;

    match outcome {
        Ok(result)
            if result.trust.is_some() || result.did_register || result.transaction_hash.is_some() =>
        {
            return result;
        }
        Ok(_) => {
            tracing::warn!("Identity not found in registry and registration not enabled");
        }
        Err(e) => {
            tracing::warn!(error = %e, code = e.error_code(), chain_id, network, "Failed to bootstrap ERC-8004 identity");
        }
    }

    tracing::info!("Agent will run without ERC-8004 identity");
    BootstrapTrustResult::default()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::blockchain::types::DEFAULT_IDENTITY_REGISTRY;
    use crate::identity::signatures::verify_registration_proof;
    use crate::test_support::{
        registered_log, test_signer, FailingSigner, MockReceipts, MockRegistry, MockWallet,
        TEST_ADDRESS, TEST_KEY, TEST_REGISTRY, TEST_TX_HASH,
    };
    use alloy::primitives::U256;

    const METADATA_URI: &str = "https://agent.example/.well-known/agent-metadata.json";

    fn registering_reader(agent_id: u64) -> Arc<MockRegistry> {
        Arc::new(
            MockRegistry::empty()
                .with_receipts(MockReceipts::Wait(vec![registered_log(TEST_REGISTRY, agent_id)])),
        )
    }

    struct FixedResolver(Option<IdentityRecord>);

    #[async_trait]
    impl MissingIdentityResolver for FixedResolver {
        async fn resolve(
            &self,
            client: &IdentityRegistryClient,
            normalized_domain: &str,
        ) -> Result<Option<IdentityRecord>, IdentityError> {
            assert_eq!(normalized_domain, "agent.example");
            assert_eq!(client.chain_id(), Some(84532));
            Ok(self.0.clone())
        }
    }

    struct FailingResolver;

    #[async_trait]
    impl MissingIdentityResolver for FailingResolver {
        async fn resolve(
            &self,
            _client: &IdentityRegistryClient,
            _normalized_domain: &str,
        ) -> Result<Option<IdentityRecord>, IdentityError> {
            Err(IdentityError::RegistryRead("indexer offline".into()))
        }
    }

    /// Hands out fixed clients and records what it was asked for.
    struct StaticFactory {
        clients: BootstrapClients,
        seen: Mutex<Vec<(u64, String)>>,
    }

    impl StaticFactory {
        fn new(clients: BootstrapClients) -> Self {
            Self {
                clients,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ClientFactory for StaticFactory {
        async fn make_clients(&self, params: ClientFactoryParams<'_>) -> Option<BootstrapClients> {
            self.seen
                .lock()
                .unwrap()
                .push((params.chain_id, params.rpc_url.to_string()));
            Some(self.clients.clone())
        }
    }

    #[tokio::test]
    async fn registers_and_builds_trust_for_new_agent() {
        let reader = registering_reader(7);
        let wallet = Arc::new(MockWallet::new(Some(TEST_ADDRESS)));

        let result = bootstrap_trust(BootstrapTrustOptions {
            writer: Some(wallet.clone()),
            signer: Some(test_signer()),
            register_if_missing: true,
            ..BootstrapTrustOptions::new("agent.example", 84532, TEST_REGISTRY, reader)
        })
        .await
        .unwrap();

        assert!(result.did_register);
        assert_eq!(result.transaction_hash, Some(TEST_TX_HASH));
        assert!(result.warnings.is_empty());

        let record = result.record.clone().unwrap();
        assert_eq!(record.agent_id, U256::from(7u64));
        assert_eq!(record.owner, TEST_ADDRESS);
        assert_eq!(record.token_uri, METADATA_URI);
        assert_eq!(
            wallet.submissions(),
            vec![(TEST_REGISTRY, METADATA_URI.to_string(), 0)]
        );

        let trust = result.trust.clone().unwrap();
        assert_eq!(trust.registrations.len(), 1);
        let entry = &trust.registrations[0];
        assert_eq!(entry.agent_id, "7");
        assert!(entry.agent_address.starts_with("eip155:84532:"));
        assert_eq!(
            trust.validation_requests_uri.as_deref(),
            Some("https://agent.example/validation/requests.json")
        );
        assert_eq!(
            trust.feedback_data_uri.as_deref(),
            Some("https://agent.example/feedback.json")
        );

        assert_eq!(
            entry.signature.as_deref(),
            result.signature.as_ref().map(|s| s.to_string()).as_deref()
        );
        assert!(verify_registration_proof(entry, "agent.example", None, None).await);
    }

    #[tokio::test]
    async fn blank_domain_fails_before_any_call() {
        let reader = Arc::new(MockRegistry::empty());
        let err = bootstrap_trust(BootstrapTrustOptions::new(
            " / ",
            84532,
            TEST_REGISTRY,
            reader.clone(),
        ))
        .await
        .unwrap_err();

        assert!(matches!(err, IdentityError::InvalidInput(_)));
        assert!(reader.calls().is_empty());
    }

    #[tokio::test]
    async fn skip_register_wins() {
        let wallet = Arc::new(MockWallet::new(Some(TEST_ADDRESS)));
        let result = bootstrap_trust(BootstrapTrustOptions {
            writer: Some(wallet.clone()),
            register_if_missing: true,
            skip_register: true,
            ..BootstrapTrustOptions::new("agent.example", 84532, TEST_REGISTRY, registering_reader(7))
        })
        .await
        .unwrap();

        assert_eq!(result, BootstrapTrustResult::default());
        assert!(wallet.submissions().is_empty());
    }

    #[tokio::test]
    async fn resolver_record_skips_registration() {
        let owner = Address::repeat_byte(0xab);
        let resolver = FixedResolver(Some(IdentityRecord {
            agent_id: U256::from(3u64),
            owner,
            token_uri: METADATA_URI.to_string(),
        }));
        let wallet = Arc::new(MockWallet::new(Some(TEST_ADDRESS)));

        let result = bootstrap_trust(BootstrapTrustOptions {
            writer: Some(wallet.clone()),
            register_if_missing: true,
            on_missing: Some(Arc::new(resolver)),
            trust_overrides: Some(TrustOverrides {
                feedback_data_uri: Some("https://feedback.example/agent-3".to_string()),
                ..Default::default()
            }),
            ..BootstrapTrustOptions::new("Agent.Example", 84532, TEST_REGISTRY, registering_reader(9))
        })
        .await
        .unwrap();

        assert!(!result.did_register);
        assert!(wallet.submissions().is_empty());
        assert_eq!(result.signature, None);

        let trust = result.trust.unwrap();
        assert_eq!(trust.registrations[0].agent_id, "3");
        assert_eq!(
            trust.registrations[0].agent_address,
            format!("eip155:84532:{owner:#x}")
        );
        assert_eq!(trust.registrations[0].signature, None);
        assert_eq!(
            trust.feedback_data_uri.as_deref(),
            Some("https://feedback.example/agent-3")
        );
    }

    #[tokio::test]
    async fn resolver_errors_propagate() {
        let err = bootstrap_trust(BootstrapTrustOptions {
            on_missing: Some(Arc::new(FailingResolver)),
            ..BootstrapTrustOptions::new(
                "agent.example",
                84532,
                TEST_REGISTRY,
                Arc::new(MockRegistry::empty()),
            )
        })
        .await
        .unwrap_err();

        assert!(matches!(err, IdentityError::RegistryRead(_)));
    }

    #[tokio::test]
    async fn undecoded_registration_returns_hash_without_record() {
        let reader = Arc::new(MockRegistry::empty().with_receipts(MockReceipts::Wait(vec![])));
        let result = bootstrap_trust(BootstrapTrustOptions {
            writer: Some(Arc::new(MockWallet::new(Some(TEST_ADDRESS)))),
            register_if_missing: true,
            ..BootstrapTrustOptions::new("agent.example", 84532, TEST_REGISTRY, reader)
        })
        .await
        .unwrap();

        assert!(result.did_register);
        assert_eq!(result.transaction_hash, Some(TEST_TX_HASH));
        assert_eq!(result.record, None);
        assert_eq!(result.trust, None);
    }

    #[tokio::test]
    async fn receipt_failure_is_recorded_as_warning() {
        let reader = Arc::new(
            MockRegistry::empty().with_receipts(MockReceipts::WaitError("timeout".into())),
        );
        let result = bootstrap_trust(BootstrapTrustOptions {
            writer: Some(Arc::new(MockWallet::new(Some(TEST_ADDRESS)))),
            register_if_missing: true,
            ..BootstrapTrustOptions::new("agent.example", 84532, TEST_REGISTRY, reader)
        })
        .await
        .unwrap();

        assert!(result.did_register);
        assert_eq!(result.trust, None);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("timeout"));
    }

    #[tokio::test]
    async fn signing_failure_is_a_warning() {
        let result = bootstrap_trust(BootstrapTrustOptions {
            writer: Some(Arc::new(MockWallet::new(Some(TEST_ADDRESS)))),
            signer: Some(Arc::new(FailingSigner)),
            register_if_missing: true,
            ..BootstrapTrustOptions::new("agent.example", 84532, TEST_REGISTRY, registering_reader(7))
        })
        .await
        .unwrap();

        assert_eq!(result.signature, None);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("user rejected"));

        let trust = result.trust.unwrap();
        assert_eq!(trust.registrations[0].signature, None);
    }

    #[tokio::test]
    async fn identity_without_inputs_is_empty() {
        let result = bootstrap_identity(BootstrapIdentityOptions::default()).await;
        assert_eq!(result, BootstrapTrustResult::default());
    }

    #[tokio::test]
    async fn identity_from_env_uses_factory_and_default_registry() {
        let reader = Arc::new(
            MockRegistry::empty().with_receipts(MockReceipts::Wait(vec![registered_log(
                DEFAULT_IDENTITY_REGISTRY,
                11,
            )])),
        );
        let wallet = Arc::new(MockWallet::new(Some(TEST_ADDRESS)).with_signer(test_signer()));
        let factory = Arc::new(StaticFactory::new(BootstrapClients {
            reader: reader.clone(),
            writer: Some(wallet.clone()),
            signer: None,
        }));

        let env = EnvMap::new()
            .with(CHAIN_ID_ENV, "8453")
            .with(AGENT_DOMAIN_ENV, "agent.example")
            .with(RPC_URL_ENV, "https://rpc.example")
            .with(REGISTER_IDENTITY_ENV, "true")
            .with(IDENTITY_REGISTRY_ADDRESS_ENV, " ");

        let result = bootstrap_identity(BootstrapIdentityOptions {
            env,
            client_factory: Some(factory.clone()),
            ..Default::default()
        })
        .await;

        assert_eq!(
            factory.seen.lock().unwrap().clone(),
            vec![(8453, "https://rpc.example".to_string())]
        );
        assert_eq!(wallet.submissions()[0].0, DEFAULT_IDENTITY_REGISTRY);

        assert!(result.did_register);
        assert!(result.signature.is_some(), "wallet doubles as signer");
        let trust = result.trust.unwrap();
        assert!(trust.registrations[0].agent_address.starts_with("eip155:8453:"));
        assert_eq!(trust.registrations[0].agent_id, "11");
    }

    #[tokio::test]
    async fn identity_degrades_to_empty_on_failure() {
        let reader = Arc::new(MockRegistry::empty());
        let wallet = Arc::new(MockWallet::new(Some(TEST_ADDRESS)).failing());

        let result = bootstrap_identity(BootstrapIdentityOptions {
            domain: Some("agent.example".to_string()),
            registry_address: Some(TEST_REGISTRY),
            reader: Some(reader),
            writer: Some(wallet.clone()),
            register_if_missing: Some(true),
            ..Default::default()
        })
        .await;

        assert_eq!(wallet.submissions().len(), 1);
        assert_eq!(result, BootstrapTrustResult::default());
    }

    #[tokio::test]
    async fn identity_not_found_without_registration_is_empty() {
        let wallet = Arc::new(MockWallet::new(Some(TEST_ADDRESS)));
        let result = bootstrap_identity(BootstrapIdentityOptions {
            domain: Some("agent.example".to_string()),
            reader: Some(registering_reader(7)),
            writer: Some(wallet.clone()),
            env: EnvMap::new().with(REGISTER_IDENTITY_ENV, "TRUE"),
            ..Default::default()
        })
        .await;

        assert!(wallet.submissions().is_empty());
        assert_eq!(result, BootstrapTrustResult::default());
    }

    #[tokio::test]
    async fn invalid_registry_env_skips_client_creation() {
        let factory = Arc::new(StaticFactory::new(BootstrapClients {
            reader: Arc::new(MockRegistry::empty()),
            writer: None,
            signer: None,
        }));
        let env = EnvMap::new()
            .with(AGENT_DOMAIN_ENV, "agent.example")
            .with(RPC_URL_ENV, "https://rpc.example")
            .with(IDENTITY_REGISTRY_ADDRESS_ENV, "0x1234");

        let result = bootstrap_identity(BootstrapIdentityOptions {
            env,
            client_factory: Some(factory.clone()),
            ..Default::default()
        })
        .await;

        assert_eq!(result, BootstrapTrustResult::default());
        assert!(factory.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn registry_address_resolution_order() {
        let env = EnvMap::new()
            .with(IDENTITY_REGISTRY_ADDRESS_ENV, "0x2222222222222222222222222222222222222222");
        let explicit = Address::repeat_byte(0x11);

        assert_eq!(
            resolve_registry_address(Some(explicit), &env, 84532).unwrap(),
            Some(explicit)
        );
        assert_eq!(
            resolve_registry_address(None, &env, 84532).unwrap(),
            Some(Address::repeat_byte(0x22))
        );
        assert_eq!(
            resolve_registry_address(None, &EnvMap::new(), 84532).unwrap(),
            Some(DEFAULT_IDENTITY_REGISTRY)
        );
        assert_eq!(resolve_registry_address(None, &EnvMap::new(), 999).unwrap(), None);
    }

    #[tokio::test]
    async fn rpc_factory_builds_writer_only_for_valid_keys() {
        let factory = RpcClientFactory::default();

        let read_only = factory
            .make_clients(ClientFactoryParams {
                chain_id: 84532,
                rpc_url: "http://127.0.0.1:8545",
                env: &EnvMap::new(),
            })
            .await
            .unwrap();
        assert!(read_only.writer.is_none() && read_only.signer.is_none());

        let bad_key = EnvMap::new().with(PRIVATE_KEY_ENV, "0xnotakey");
        let degraded = factory
            .make_clients(ClientFactoryParams {
                chain_id: 84532,
                rpc_url: "http://127.0.0.1:8545",
                env: &bad_key,
            })
            .await
            .unwrap();
        assert!(degraded.writer.is_none() && degraded.signer.is_none());

        let good_key = EnvMap::new().with(PRIVATE_KEY_ENV, TEST_KEY);
        let full = factory
            .make_clients(ClientFactoryParams {
                chain_id: 84532,
                rpc_url: "http://127.0.0.1:8545",
                env: &good_key,
            })
            .await
            .unwrap();
        assert_eq!(full.writer.unwrap().account(), Some(TEST_ADDRESS));
        assert_eq!(full.signer.unwrap().address(), Some(TEST_ADDRESS));

        let invalid_url = factory
            .make_clients(ClientFactoryParams {
                chain_id: 84532,
                rpc_url: "not a url",
                env: &good_key,
            })
            .await;
        assert!(invalid_url.is_none());
    }
}
