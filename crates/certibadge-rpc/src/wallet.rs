//! Wallet gateway over JSON-RPC.
//!
//! Authorization via `eth_requestAccounts` (error code 4001 or an empty
//! account list is a denial, not a failure), submission via
//! `eth_sendTransaction` with ABI-encoded `issueBadge` calldata, and
//! confirmation via `eth_getTransactionReceipt` polling under the
//! caller's wait bound.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use crate::abi::encode_issue_badge;
use crate::jsonrpc::RpcClient;
use certibadge_core::{
    Address, Authorization, ConfirmationStatus, GatewayError, GatewayResult, IssueBadgeCall,
    TxHash, WalletGateway,
};

/// EIP-1193: the user rejected the request.
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub rpc_url: String,
    /// Address of the badge contract the issuance call targets.
    pub contract_address: String,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    3_000
}

impl WalletConfig {
    pub fn new(rpc_url: impl Into<String>, contract_address: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            contract_address: contract_address.into(),
            timeout_ms: None,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

pub struct JsonRpcWallet {
    rpc: RpcClient,
    contract: Address,
    poll_interval: Duration,
    /// Account granted by the last successful authorization.
    authorized: Mutex<Option<Address>>,
}

impl JsonRpcWallet {
    pub fn new(config: &WalletConfig) -> GatewayResult<Self> {
        let timeout = Duration::from_millis(config.timeout_ms.unwrap_or(30_000));
        let rpc = RpcClient::new(config.rpc_url.clone(), timeout)?;
        let contract = Address::parse(&config.contract_address)
            .map_err(|e| GatewayError::Config(format!("contract address: {}", e)))?;
        if config.poll_interval_ms == 0 {
            return Err(GatewayError::Config("poll_interval_ms must be > 0".into()));
        }
        Ok(Self {
            rpc,
            contract,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            authorized: Mutex::new(None),
        })
    }

    async fn receipt_exists(&self, tx: &TxHash) -> GatewayResult<bool> {
        let value = self
            .rpc
            .call("eth_getTransactionReceipt", json!([tx.as_str()]))
            .await?
            .into_result()?;
        Ok(!value.is_null())
    }
}

#[async_trait]
impl WalletGateway for JsonRpcWallet {
    async fn request_authorization(&self) -> GatewayResult<Authorization> {
        let response = self.rpc.call("eth_requestAccounts", json!([])).await?;
        if let Some(err) = &response.error {
            if err.code == USER_REJECTED_CODE {
                info!("wallet authorization rejected by user");
                return Ok(Authorization::Denied);
            }
        }
        let value = response.into_result()?;
        let accounts: Vec<String> = serde_json::from_value(value)
            .map_err(|e| GatewayError::Serialization(e.to_string()))?;
        let account = match accounts.first() {
            Some(account) => account,
            None => {
                info!("wallet exposed no accounts");
                return Ok(Authorization::Denied);
            }
        };
        let address = Address::parse(account)
            .map_err(|e| GatewayError::Protocol(format!("wallet account: {}", e)))?;
        *self
            .authorized
            .lock()
            .map_err(|_| GatewayError::Config("authorization lock poisoned".into()))? =
            Some(address.clone());
        info!(account = %address, "wallet authorization granted");
        Ok(Authorization::Approved(address))
    }

    async fn submit_issuance(&self, call: &IssueBadgeCall) -> GatewayResult<TxHash> {
        let from = self
            .authorized
            .lock()
            .map_err(|_| GatewayError::Config("authorization lock poisoned".into()))?
            .clone()
            .ok_or_else(|| {
                GatewayError::Config("no authorized account; request authorization first".into())
            })?;

        let data = encode_issue_badge(call)?;
        let params = json!([{
            "from": from.as_str(),
            "to": self.contract.as_str(),
            "data": format!("0x{}", hex::encode(data)),
        }]);
        let value = self
            .rpc
            .call("eth_sendTransaction", params)
            .await?
            .into_result()?;
        let hash = value
            .as_str()
            .ok_or_else(|| GatewayError::Protocol("transaction hash is not a string".into()))?;
        TxHash::parse(hash).map_err(|e| GatewayError::Protocol(e.to_string()))
    }

    async fn await_confirmation(
        &self,
        tx: &TxHash,
        wait: Duration,
    ) -> GatewayResult<ConfirmationStatus> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            match self.receipt_exists(tx).await {
                Ok(true) => return Ok(ConfirmationStatus::Confirmed),
                Ok(false) => {}
                // A failed poll leaves the inclusion state unknown; keep
                // polling until the bound.
                Err(err) => debug!(tx_hash = %tx, error = %err, "receipt poll failed"),
            }
            if tokio::time::Instant::now() + self.poll_interval > deadline {
                return Ok(ConfirmationStatus::Pending);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> WalletConfig {
        WalletConfig::new(
            "http://127.0.0.1:8545",
            "0x00000000000000000000000000000000000000cc",
        )
    }

    #[test]
    fn test_new_validates_contract_address() {
        let mut config = make_config();
        config.contract_address = "not-a-contract".into();
        assert!(matches!(
            JsonRpcWallet::new(&config),
            Err(GatewayError::Config(_))
        ));
    }

    #[test]
    fn test_new_rejects_zero_poll_interval() {
        let mut config = make_config();
        config.poll_interval_ms = 0;
        assert!(matches!(
            JsonRpcWallet::new(&config),
            Err(GatewayError::Config(_))
        ));
    }

    #[test]
    fn test_submission_requires_prior_authorization() {
        let wallet = JsonRpcWallet::new(&make_config()).unwrap();
        // No authorization has been granted; the stored account is empty.
        assert!(wallet.authorized.lock().unwrap().is_none());
    }

    #[test]
    fn test_config_defaults() {
        let config = make_config();
        assert_eq!(config.poll_interval_ms, 3_000);
        assert!(config.timeout_ms.is_none());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = make_config();
        let json = serde_json::to_string(&config).unwrap();
        let restored: WalletConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.rpc_url, config.rpc_url);
        assert_eq!(restored.contract_address, config.contract_address);
        assert_eq!(restored.poll_interval_ms, 3_000);
    }
}
