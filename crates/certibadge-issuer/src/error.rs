use thiserror::Error;

use crate::workflow::{Stage, Step};
use certibadge_core::GatewayError;

/// Failures surfaced by the issuance workflow.
///
/// Every variant is caught at the orchestrator boundary and turned into a
/// failure-stage transition plus a status message; none of them crash the
/// process, and none are retried automatically.
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    /// The naming service holds no mapping for the recipient name.
    #[error("name not found: {0}")]
    NameNotFound(String),

    /// Transport failure while querying the naming service.
    #[error("resolution failed: {0}")]
    Resolution(GatewayError),

    /// Packaging was requested with no badge image attached.
    #[error("no badge image attached")]
    MissingImage,

    /// A content upload failed; wraps the provider error.
    #[error("upload failed: {0}")]
    Upload(GatewayError),

    /// Issuance was requested with an empty metadata URI.
    #[error("metadata URI is empty")]
    EmptyMetadataUri,

    /// Issuance was requested while the recipient is still a pending
    /// identity string rather than a canonical address.
    #[error("recipient is not a canonical address: {0}")]
    UnresolvedRecipient(String),

    /// The wallet rejected the authorization prompt.
    #[error("wallet authorization denied")]
    AuthorizationDenied,

    /// Submission failed before a transaction hash was obtained.
    #[error("submission failed: {0}")]
    Submission(GatewayError),

    /// A field edit was attempted while a step is in flight.
    #[error("edits are locked while the attempt is {0}")]
    EditLocked(Stage),

    /// A step was triggered from a stage it cannot run from. This is the
    /// gate that stops the same step from being triggered twice.
    #[error("{step} is not runnable from the {stage} stage")]
    StepNotRunnable { step: Step, stage: Stage },

    /// Internal invariant: a stage transition outside the table.
    #[error("invalid stage transition: {from} -> {to}")]
    TransitionDenied { from: Stage, to: Stage },

    /// The ledger lock was poisoned by a panicking writer.
    #[error("audit ledger lock poisoned")]
    LedgerPoisoned,
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_variants_display() {
        let variants: Vec<WorkflowError> = vec![
            WorkflowError::NameNotFound("alice.eth".into()),
            WorkflowError::Resolution(GatewayError::Network("down".into())),
            WorkflowError::MissingImage,
            WorkflowError::Upload(GatewayError::Protocol("http status 500".into())),
            WorkflowError::EmptyMetadataUri,
            WorkflowError::UnresolvedRecipient("bob.eth".into()),
            WorkflowError::AuthorizationDenied,
            WorkflowError::Submission(GatewayError::Network("reset".into())),
            WorkflowError::EditLocked(Stage::Issuing),
            WorkflowError::StepNotRunnable {
                step: Step::Issue,
                stage: Stage::Draft,
            },
            WorkflowError::TransitionDenied {
                from: Stage::Confirmed,
                to: Stage::Draft,
            },
            WorkflowError::LedgerPoisoned,
        ];
        for v in variants {
            assert!(!v.to_string().is_empty(), "empty Display for {:?}", v);
        }
    }

    #[test]
    fn test_upload_error_carries_provider_detail() {
        let err = WorkflowError::Upload(GatewayError::Protocol("http status 413".into()));
        assert!(err.to_string().contains("413"));
    }
}
