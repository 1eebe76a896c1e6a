//! Deterministic in-memory gateways for tests and offline smoke paths.
//!
//! Every identifier these mocks hand out is derived from the input, so a
//! rerun of the same flow produces the same content ids and transaction
//! hashes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::abi::keccak256;
use certibadge_core::{
    Address, Authorization, Cid, ConfirmationStatus, ContentStore, GatewayResult, IssueBadgeCall,
    NameResolver, TxHash, WalletGateway,
};

// ---------------------------------------------------------------------------
// MockNameResolver
// ---------------------------------------------------------------------------

pub struct MockNameResolver {
    names: Mutex<HashMap<String, Address>>,
    /// When set, unknown names resolve to a keccak-derived address instead
    /// of not-found. Used by the offline smoke path.
    derive_unknown: bool,
}

impl MockNameResolver {
    /// Resolves only explicitly registered names.
    pub fn new() -> Self {
        Self {
            names: Mutex::new(HashMap::new()),
            derive_unknown: false,
        }
    }

    /// Resolves any name to a deterministic keccak-derived address.
    pub fn deterministic() -> Self {
        Self {
            names: Mutex::new(HashMap::new()),
            derive_unknown: true,
        }
    }

    pub fn with_name(self, name: impl Into<String>, address: Address) -> Self {
        self.names
            .lock()
            .expect("mutex poisoned")
            .insert(name.into(), address);
        self
    }

    fn derive(name: &str) -> Address {
        let hash = keccak256(name.as_bytes());
        Address::parse(&format!("0x{}", hex::encode(&hash[..20]))).expect("derived address")
    }
}

impl Default for MockNameResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NameResolver for MockNameResolver {
    async fn resolve(&self, name: &str) -> GatewayResult<Option<Address>> {
        let known = self.names.lock().expect("mutex poisoned").get(name).cloned();
        match known {
            Some(address) => Ok(Some(address)),
            None if self.derive_unknown => Ok(Some(Self::derive(name))),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// MockContentStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct MockContentStore {
    uploads: Mutex<Vec<StoredUpload>>,
}

impl MockContentStore {
    pub fn new() -> Self {
        Self {
            uploads: Mutex::new(Vec::new()),
        }
    }

    /// Uploads in the order they happened, for ordering assertions.
    pub fn uploads(&self) -> Vec<StoredUpload> {
        self.uploads.lock().expect("mutex poisoned").clone()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().expect("mutex poisoned").len()
    }
}

impl Default for MockContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn upload(&self, bytes: &[u8], filename: &str) -> GatewayResult<Cid> {
        // Content-derived id, like a real content-addressed store.
        let hash = keccak256(bytes);
        let cid = Cid::new(format!("Qm{}", hex::encode(&hash[..8])));
        self.uploads
            .lock()
            .expect("mutex poisoned")
            .push(StoredUpload {
                filename: filename.to_string(),
                bytes: bytes.to_vec(),
            });
        Ok(cid)
    }
}

// ---------------------------------------------------------------------------
// MockWallet
// ---------------------------------------------------------------------------

pub struct MockWallet {
    account: Address,
    deny: AtomicBool,
    auto_confirm: AtomicBool,
    counter: AtomicU64,
    submissions: Mutex<Vec<(IssueBadgeCall, TxHash)>>,
}

impl MockWallet {
    pub fn new() -> Self {
        Self {
            account: Address::parse("0x00000000000000000000000000000000000000ee")
                .expect("mock account"),
            deny: AtomicBool::new(false),
            auto_confirm: AtomicBool::new(true),
            counter: AtomicU64::new(0),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn denying() -> Self {
        let wallet = Self::new();
        wallet.deny.store(true, Ordering::SeqCst);
        wallet
    }

    /// Toggle whether confirmations resolve immediately or stay pending.
    pub fn set_auto_confirm(&self, confirm: bool) {
        self.auto_confirm.store(confirm, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<(IssueBadgeCall, TxHash)> {
        self.submissions.lock().expect("mutex poisoned").clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().expect("mutex poisoned").len()
    }

    fn make_tx_hash(&self, call: &IssueBadgeCall) -> TxHash {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let mut input = n.to_be_bytes().to_vec();
        input.extend_from_slice(call.recipient.as_str().as_bytes());
        input.extend_from_slice(call.metadata_uri.as_bytes());
        let hash = keccak256(&input);
        TxHash::parse(&format!("0x{}", hex::encode(hash))).expect("derived hash")
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletGateway for MockWallet {
    async fn request_authorization(&self) -> GatewayResult<Authorization> {
        if self.deny.load(Ordering::SeqCst) {
            Ok(Authorization::Denied)
        } else {
            Ok(Authorization::Approved(self.account.clone()))
        }
    }

    async fn submit_issuance(&self, call: &IssueBadgeCall) -> GatewayResult<TxHash> {
        let tx_hash = self.make_tx_hash(call);
        self.submissions
            .lock()
            .expect("mutex poisoned")
            .push((call.clone(), tx_hash.clone()));
        Ok(tx_hash)
    }

    async fn await_confirmation(
        &self,
        _tx: &TxHash,
        _wait: Duration,
    ) -> GatewayResult<ConfirmationStatus> {
        Ok(if self.auto_confirm.load(Ordering::SeqCst) {
            ConfirmationStatus::Confirmed
        } else {
            ConfirmationStatus::Pending
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_call(metadata_uri: &str) -> IssueBadgeCall {
        IssueBadgeCall {
            recipient: Address::parse("0x00000000000000000000000000000000000000ab").unwrap(),
            course_id: "CS101".into(),
            issued_by: "MIT".into(),
            issued_date: "2024-05-01".into(),
            metadata_uri: metadata_uri.into(),
        }
    }

    #[tokio::test]
    async fn test_resolver_registered_name() {
        let address = Address::parse("0x00000000000000000000000000000000000000ab").unwrap();
        let resolver = MockNameResolver::new().with_name("alice.eth", address.clone());
        assert_eq!(resolver.resolve("alice.eth").await.unwrap(), Some(address));
        assert_eq!(resolver.resolve("bob.eth").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolver_deterministic_mode() {
        let resolver = MockNameResolver::deterministic();
        let first = resolver.resolve("carol.eth").await.unwrap().unwrap();
        let second = resolver.resolve("carol.eth").await.unwrap().unwrap();
        assert_eq!(first, second);
        let other = resolver.resolve("dave.eth").await.unwrap().unwrap();
        assert_ne!(first, other);
    }

    #[tokio::test]
    async fn test_store_cid_is_content_derived() {
        let store = MockContentStore::new();
        let a = store.upload(b"same bytes", "a.png").await.unwrap();
        let b = store.upload(b"same bytes", "b.png").await.unwrap();
        let c = store.upload(b"other bytes", "c.png").await.unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(store.upload_count(), 3);
        assert_eq!(store.uploads()[0].filename, "a.png");
    }

    #[tokio::test]
    async fn test_wallet_approves_and_records_submissions() {
        let wallet = MockWallet::new();
        let auth = wallet.request_authorization().await.unwrap();
        assert!(matches!(auth, Authorization::Approved(_)));

        let tx = wallet.submit_issuance(&make_call("ipfs://Qm1/metadata.json")).await.unwrap();
        assert_eq!(wallet.submission_count(), 1);
        assert_eq!(wallet.submissions()[0].1, tx);
    }

    #[tokio::test]
    async fn test_wallet_denial() {
        let wallet = MockWallet::denying();
        assert_eq!(
            wallet.request_authorization().await.unwrap(),
            Authorization::Denied
        );
    }

    #[tokio::test]
    async fn test_wallet_hashes_are_unique_per_submission() {
        let wallet = MockWallet::new();
        let call = make_call("ipfs://Qm1/metadata.json");
        let t1 = wallet.submit_issuance(&call).await.unwrap();
        let t2 = wallet.submit_issuance(&call).await.unwrap();
        assert_ne!(t1, t2);
    }

    #[tokio::test]
    async fn test_wallet_confirmation_toggle() {
        let wallet = MockWallet::new();
        let tx = wallet.submit_issuance(&make_call("ipfs://Qm1/metadata.json")).await.unwrap();
        wallet.set_auto_confirm(false);
        assert_eq!(
            wallet.await_confirmation(&tx, Duration::from_millis(1)).await.unwrap(),
            ConfirmationStatus::Pending
        );
        wallet.set_auto_confirm(true);
        assert_eq!(
            wallet.await_confirmation(&tx, Duration::from_millis(1)).await.unwrap(),
            ConfirmationStatus::Confirmed
        );
    }
}
