use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RootError, RootResult};
use certibadge_core::Address;

/// RPC endpoints for the naming service and the wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSection {
    /// JSON-RPC endpoint used for name resolution.
    #[serde(default = "default_ens_url")]
    pub ens_url: String,

    /// JSON-RPC endpoint of the wallet managing the issuer account.
    #[serde(default = "default_wallet_url")]
    pub wallet_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_ens_url() -> String {
    "https://rpc.ankr.com/eth".to_string()
}

fn default_wallet_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for RpcSection {
    fn default() -> Self {
        Self {
            ens_url: default_ens_url(),
            wallet_url: default_wallet_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Content-addressed storage provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default = "default_storage_url")]
    pub base_url: String,

    /// Bearer token for the upload API. No default; required for live runs.
    #[serde(default)]
    pub api_token: String,
}

fn default_storage_url() -> String {
    "https://api.web3.storage".to_string()
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            base_url: default_storage_url(),
            api_token: String::new(),
        }
    }
}

/// The badge contract the issuance call targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractSection {
    /// No default; required for live runs.
    #[serde(default)]
    pub address: String,
}

/// Confirmation tracking policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationSection {
    /// Upper bound on one confirmation wait, in seconds. A transaction
    /// still pending at the bound is reported pending, not failed.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub timeout_secs: u64,

    /// Receipt poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_confirmation_timeout_secs() -> u64 {
    90
}

fn default_poll_interval_ms() -> u64 {
    3_000
}

impl Default for ConfirmationSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_confirmation_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Top-level configuration for the CertiBadge issuer binary.
///
/// Loaded from a TOML file (typically `~/.certibadge/config.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuerConfig {
    #[serde(default)]
    pub rpc: RpcSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub contract: ContractSection,

    #[serde(default)]
    pub confirmation: ConfirmationSection,
}

impl IssuerConfig {
    /// Load configuration from a TOML file. If the file does not exist,
    /// returns a default configuration.
    pub fn load(path: &Path) -> RootResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(RootError::Io)?;
        let config: IssuerConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> RootResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RootError::Config(format!("TOML serialize error: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(RootError::Io)?;
        }
        std::fs::write(path, contents).map_err(RootError::Io)?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> RootResult<()> {
        if self.rpc.ens_url.trim().is_empty() {
            return Err(RootError::Config("rpc.ens_url is empty".into()));
        }
        if self.rpc.wallet_url.trim().is_empty() {
            return Err(RootError::Config("rpc.wallet_url is empty".into()));
        }
        if self.rpc.timeout_ms == 0 {
            return Err(RootError::Config("rpc.timeout_ms must be > 0".into()));
        }
        if self.confirmation.timeout_secs == 0 {
            return Err(RootError::Config(
                "confirmation.timeout_secs must be > 0".into(),
            ));
        }
        if self.confirmation.poll_interval_ms == 0 {
            return Err(RootError::Config(
                "confirmation.poll_interval_ms must be > 0".into(),
            ));
        }
        if !self.contract.address.is_empty() && Address::parse(&self.contract.address).is_err() {
            return Err(RootError::Config(format!(
                "contract.address is not a canonical address: {}",
                self.contract.address
            )));
        }
        Ok(())
    }

    pub fn confirmation_wait(&self) -> Duration {
        Duration::from_secs(self.confirmation.timeout_secs)
    }

    /// Return the path to the default config file location.
    pub fn default_config_path() -> PathBuf {
        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".certibadge/config.toml"))
            .unwrap_or_else(|_| PathBuf::from(".certibadge/config.toml"))
    }
}
