//! CertiBadge root library.
//!
//! Wires the gateway implementations to the issuance workflow: HTTP
//! adapters for live runs, deterministic in-memory gateways for the
//! offline smoke path. The binary in `main.rs` is a thin CLI over
//! [`run_issuance`] and [`export_log`].

pub mod config;
pub mod error;

pub use config::IssuerConfig;
pub use error::{RootError, RootResult};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use certibadge_core::{ConfirmationStatus, ContentStore, NameResolver, TxHash, WalletGateway};
use certibadge_issuer::{AuditLedger, BadgeImage, IssuanceWorkflow};
use certibadge_rpc::{
    ContentStoreConfig, EnsConfig, EnsResolver, HttpContentStore, JsonRpcWallet,
    MockContentStore, MockNameResolver, MockWallet, WalletConfig,
};

// ---------------------------------------------------------------------------
// Gateway wiring
// ---------------------------------------------------------------------------

/// Gateway handles for one run.
pub struct Gateways {
    pub resolver: Arc<dyn NameResolver>,
    pub store: Arc<dyn ContentStore>,
    pub wallet: Arc<dyn WalletGateway>,
}

/// Build HTTP gateways against the configured live services.
pub fn build_http_gateways(config: &IssuerConfig) -> RootResult<Gateways> {
    config.validate()?;
    if config.contract.address.is_empty() {
        return Err(RootError::Config("contract.address is not set".into()));
    }

    let mut ens = EnsConfig::new(config.rpc.ens_url.clone());
    ens.timeout_ms = Some(config.rpc.timeout_ms);
    let resolver = EnsResolver::new(&ens)?;

    let store = HttpContentStore::new(ContentStoreConfig::new(
        config.storage.base_url.clone(),
        config.storage.api_token.clone(),
    ))?;

    let mut wallet_config = WalletConfig::new(
        config.rpc.wallet_url.clone(),
        config.contract.address.clone(),
    );
    wallet_config.timeout_ms = Some(config.rpc.timeout_ms);
    wallet_config.poll_interval_ms = config.confirmation.poll_interval_ms;
    let wallet = JsonRpcWallet::new(&wallet_config)?;

    info!(
        ens_url = %config.rpc.ens_url,
        wallet_url = %config.rpc.wallet_url,
        contract = %config.contract.address,
        "http gateways ready"
    );
    Ok(Gateways {
        resolver: Arc::new(resolver),
        store: Arc::new(store),
        wallet: Arc::new(wallet),
    })
}

/// Build only the name resolver, for resolution without the rest of the
/// issuance configuration.
pub fn build_resolver(config: &IssuerConfig, offline: bool) -> RootResult<Arc<dyn NameResolver>> {
    if offline {
        return Ok(Arc::new(MockNameResolver::deterministic()));
    }
    let mut ens = EnsConfig::new(config.rpc.ens_url.clone());
    ens.timeout_ms = Some(config.rpc.timeout_ms);
    Ok(Arc::new(EnsResolver::new(&ens)?))
}

/// Build deterministic in-memory gateways; no network, no keys, no state
/// outside the process.
pub fn build_offline_gateways() -> Gateways {
    info!("offline gateways ready");
    Gateways {
        resolver: Arc::new(MockNameResolver::deterministic()),
        store: Arc::new(MockContentStore::new()),
        wallet: Arc::new(MockWallet::new()),
    }
}

// ---------------------------------------------------------------------------
// Issuance entry point
// ---------------------------------------------------------------------------

/// One issuance request, CLI-shaped.
pub struct IssueRequest {
    pub recipient: String,
    pub course_id: String,
    pub issued_by: String,
    pub issued_date: String,
    pub image: Option<BadgeImage>,
    /// Skip packaging and use this metadata URI directly.
    pub metadata_uri: Option<String>,
    pub wait_for_confirmation: bool,
}

/// What one completed issuance run produced.
#[derive(Debug)]
pub struct IssuanceOutcome {
    pub recipient: String,
    pub metadata_uri: String,
    pub tx_hash: TxHash,
    pub confirmation: ConfirmationStatus,
    pub status: String,
}

/// Drive one issuance attempt end to end: resolve, package (or take the
/// supplied metadata URI), issue, and optionally wait for confirmation.
pub async fn run_issuance(
    gateways: &Gateways,
    ledger: &Arc<AuditLedger>,
    config: &IssuerConfig,
    request: IssueRequest,
) -> RootResult<IssuanceOutcome> {
    let IssueRequest {
        recipient,
        course_id,
        issued_by,
        issued_date,
        image,
        metadata_uri,
        wait_for_confirmation,
    } = request;

    let mut workflow = IssuanceWorkflow::new(
        gateways.resolver.clone(),
        gateways.store.clone(),
        gateways.wallet.clone(),
        ledger.clone(),
        config.confirmation_wait(),
    );

    workflow.edit(move |form| {
        form.with_recipient(recipient)
            .with_course_id(course_id)
            .with_issued_by(issued_by)
            .with_issued_date(issued_date)
    })?;
    if let Some(image) = image {
        workflow.attach_image(image)?;
    }

    workflow.resolve().await?;

    match metadata_uri {
        Some(uri) => workflow.edit(move |form| form.with_metadata_uri(uri))?,
        None => {
            workflow.package().await?;
        }
    }

    let tx_hash = workflow.issue().await?;
    let confirmation = if wait_for_confirmation {
        workflow.await_confirmation().await?
    } else {
        ConfirmationStatus::Pending
    };

    Ok(IssuanceOutcome {
        recipient: workflow.form().recipient.clone(),
        metadata_uri: workflow.form().metadata_uri().to_string(),
        tx_hash,
        confirmation,
        status: workflow.status().to_string(),
    })
}

/// Write the ledger's CSV artifact to disk.
pub fn export_log(ledger: &AuditLedger, path: &Path) -> RootResult<PathBuf> {
    let csv = ledger.export_csv().map_err(RootError::Workflow)?;
    std::fs::write(path, &csv)?;
    info!(path = %path.display(), records = ledger.len(), "issuance log exported");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_gateways_require_contract_address() {
        let config = IssuerConfig::default();
        let result = build_http_gateways(&config);
        assert!(matches!(result, Err(RootError::Config(_))));
    }

    #[test]
    fn test_http_gateways_require_storage_token() {
        let mut config = IssuerConfig::default();
        config.contract.address = "0x00000000000000000000000000000000000000cc".into();
        // Token still empty: the content store adapter refuses.
        let result = build_http_gateways(&config);
        assert!(result.is_err());
    }

    #[test]
    fn test_http_gateways_build_with_full_config() {
        let mut config = IssuerConfig::default();
        config.contract.address = "0x00000000000000000000000000000000000000cc".into();
        config.storage.api_token = "token".into();
        assert!(build_http_gateways(&config).is_ok());
    }

    #[tokio::test]
    async fn test_offline_gateways_resolve_deterministically() {
        let gateways = build_offline_gateways();
        let a = gateways.resolver.resolve("alice.eth").await.unwrap();
        let b = gateways.resolver.resolve("alice.eth").await.unwrap();
        assert!(a.is_some());
        assert_eq!(a, b);
    }
}
