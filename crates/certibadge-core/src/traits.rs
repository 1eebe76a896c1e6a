use async_trait::async_trait;
use std::time::Duration;

use crate::error::GatewayResult;
use crate::types::{Address, Authorization, Cid, ConfirmationStatus, IssueBadgeCall, TxHash};

// ---------------------------------------------------------------------------
// NameResolver — human-readable identity to canonical address
// ---------------------------------------------------------------------------

#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve a human-readable name to its canonical address.
    /// `Ok(None)` means the naming service holds no mapping for the name.
    async fn resolve(&self, name: &str) -> GatewayResult<Option<Address>>;
}

// ---------------------------------------------------------------------------
// ContentStore — content-addressed upload interface
//
// The store is content-addressed: a failed run leaves at worst orphaned
// objects, never dangling references, so callers need no rollback.
// ---------------------------------------------------------------------------

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Upload one content object and return its content identifier.
    async fn upload(&self, bytes: &[u8], filename: &str) -> GatewayResult<Cid>;
}

// ---------------------------------------------------------------------------
// WalletGateway — authorization, submission, confirmation tracking
//
// Key management and signing live entirely behind this seam.
// ---------------------------------------------------------------------------

#[async_trait]
pub trait WalletGateway: Send + Sync {
    /// Prompt for authorization. Blocks until approved or denied; a denial
    /// is a normal outcome, not an error.
    async fn request_authorization(&self) -> GatewayResult<Authorization>;

    /// Submit the issuance call. Returns the transaction hash as soon as
    /// the submission is accepted, before any confirmation.
    async fn submit_issuance(&self, call: &IssueBadgeCall) -> GatewayResult<TxHash>;

    /// Wait up to `wait` for the transaction to be included. A transaction
    /// still pending at the bound reports `Pending`, never an error.
    async fn await_confirmation(
        &self,
        tx: &TxHash,
        wait: Duration,
    ) -> GatewayResult<ConfirmationStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify the trait objects are object-safe
    fn _assert_resolver_object_safe(_: &dyn NameResolver) {}
    fn _assert_store_object_safe(_: &dyn ContentStore) {}
    fn _assert_wallet_object_safe(_: &dyn WalletGateway) {}

    #[test]
    fn test_traits_are_object_safe() {
        // Compilation of the assertions above is the test.
    }
}
