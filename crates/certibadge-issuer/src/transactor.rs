//! Issuance transaction submission and confirmation tracking.
//!
//! Submission and confirmation are deliberately split: the transaction
//! hash exists as soon as the submission is accepted, and callers record
//! it before any confirmation arrives. Confirmation is awaited separately
//! under a bound and reports `Pending` rather than failing on timeout.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::error::{WorkflowError, WorkflowResult};
use certibadge_core::{
    Address, Authorization, ConfirmationStatus, IssueBadgeCall, TxHash, WalletGateway,
};

/// A submission accepted by the wallet: hash assigned, confirmation open.
#[derive(Debug, Clone)]
pub struct Submission {
    pub tx_hash: TxHash,
    /// The account the wallet exposed during authorization.
    pub issuer_account: Address,
}

pub struct IssuanceTransactor {
    wallet: Arc<dyn WalletGateway>,
}

impl IssuanceTransactor {
    pub fn new(wallet: Arc<dyn WalletGateway>) -> Self {
        Self { wallet }
    }

    /// Authorize and submit. Returns as soon as a hash exists; nothing is
    /// submitted on a denial, and no hash means no record anywhere.
    pub async fn issue(&self, call: &IssueBadgeCall) -> WorkflowResult<Submission> {
        if call.metadata_uri.is_empty() {
            return Err(WorkflowError::EmptyMetadataUri);
        }

        let authorization = self
            .wallet
            .request_authorization()
            .await
            .map_err(WorkflowError::Submission)?;
        let issuer_account = match authorization {
            Authorization::Approved(account) => account,
            Authorization::Denied => return Err(WorkflowError::AuthorizationDenied),
        };

        let tx_hash = self
            .wallet
            .submit_issuance(call)
            .await
            .map_err(WorkflowError::Submission)?;
        info!(tx_hash = %tx_hash, recipient = %call.recipient, "issuance submitted");

        Ok(Submission {
            tx_hash,
            issuer_account,
        })
    }

    /// Wait up to `wait` for inclusion. `Pending` at the bound is a normal
    /// outcome; the submitted record stays valid either way.
    pub async fn await_confirmation(
        &self,
        tx: &TxHash,
        wait: Duration,
    ) -> WorkflowResult<ConfirmationStatus> {
        self.wallet
            .await_confirmation(tx, wait)
            .await
            .map_err(WorkflowError::Submission)
    }
}
