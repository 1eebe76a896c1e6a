//! ENS resolution over Ethereum JSON-RPC.
//!
//! Two `eth_call`s per lookup: the registry maps the namehash to its
//! resolver contract, the resolver maps it to an address. A zero address
//! at either step means the name has no mapping.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::abi::{decode_address_word, encode_bytes32_call, namehash, selector};
use crate::jsonrpc::RpcClient;
use certibadge_core::{Address, GatewayError, GatewayResult, NameResolver};

/// The ENS registry deployment shared by mainnet and the public testnets.
pub const ENS_REGISTRY_ADDRESS: &str = "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsConfig {
    pub rpc_url: String,
    #[serde(default = "default_registry")]
    pub registry: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_registry() -> String {
    ENS_REGISTRY_ADDRESS.to_string()
}

impl EnsConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            registry: default_registry(),
            timeout_ms: None,
        }
    }
}

pub struct EnsResolver {
    rpc: RpcClient,
    registry: Address,
}

impl EnsResolver {
    pub fn new(config: &EnsConfig) -> GatewayResult<Self> {
        let timeout = Duration::from_millis(config.timeout_ms.unwrap_or(10_000));
        let rpc = RpcClient::new(config.rpc_url.clone(), timeout)?;
        let registry = Address::parse(&config.registry)
            .map_err(|e| GatewayError::Config(format!("ens registry: {}", e)))?;
        Ok(Self { rpc, registry })
    }

    async fn eth_call(&self, to: &Address, data: Vec<u8>) -> GatewayResult<String> {
        let params = json!([
            { "to": to.as_str(), "data": format!("0x{}", hex::encode(data)) },
            "latest"
        ]);
        let value = self.rpc.call("eth_call", params).await?.into_result()?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Protocol("eth_call result is not a string".into()))
    }
}

#[async_trait]
impl NameResolver for EnsResolver {
    async fn resolve(&self, name: &str) -> GatewayResult<Option<Address>> {
        let node = namehash(name);

        let data = encode_bytes32_call(selector("resolver(bytes32)"), &node);
        let word = self.eth_call(&self.registry, data).await?;
        let resolver_contract = decode_address_word(&word)?;
        if resolver_contract.is_zero() {
            debug!(name, "no resolver registered");
            return Ok(None);
        }

        let data = encode_bytes32_call(selector("addr(bytes32)"), &node);
        let word = self.eth_call(&resolver_contract, data).await?;
        let address = decode_address_word(&word)?;
        if address.is_zero() {
            debug!(name, "resolver has no address record");
            return Ok(None);
        }

        debug!(name, address = %address, "name resolved");
        Ok(Some(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_registry() {
        let config = EnsConfig::new("https://rpc.ankr.com/eth");
        assert_eq!(config.registry, ENS_REGISTRY_ADDRESS);
        assert!(config.timeout_ms.is_none());
    }

    #[test]
    fn test_new_rejects_empty_url() {
        let config = EnsConfig::new("");
        assert!(matches!(
            EnsResolver::new(&config),
            Err(GatewayError::Config(_))
        ));
    }

    #[test]
    fn test_new_rejects_bad_registry() {
        let mut config = EnsConfig::new("https://rpc.ankr.com/eth");
        config.registry = "not-an-address".into();
        assert!(matches!(
            EnsResolver::new(&config),
            Err(GatewayError::Config(_))
        ));
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = EnsConfig::new("https://rpc.ankr.com/eth");
        let json = serde_json::to_string(&config).unwrap();
        let restored: EnsConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.rpc_url, config.rpc_url);
        assert_eq!(restored.registry, config.registry);
    }

    #[test]
    fn test_registry_lookup_calldata_shape() {
        // 4-byte selector + 32-byte namehash.
        let node = namehash("alice.eth");
        let data = encode_bytes32_call(selector("resolver(bytes32)"), &node);
        assert_eq!(data.len(), 36);
        assert_eq!(hex::encode(&data[..4]), "0178b8bf");
    }
}
