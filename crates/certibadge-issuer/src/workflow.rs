//! The issuance workflow state machine.
//!
//! Stages: Draft -> Resolving -> Ready -> Packaging -> MetadataReady ->
//! Issuing -> Submitted -> Confirmed, with failure stages
//! ResolutionFailed, PackagingFailed, IssuanceFailed reachable from the
//! corresponding in-flight stage. A failure stage routes straight back to
//! the stage the failed step was triggered from; the failure itself is
//! carried in the status line and last-error slot, and retries are fresh
//! user-triggered step invocations.
//!
//! Each step is runnable only from its precondition stage, which is what
//! stops the same step from being triggered twice on one attempt.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{WorkflowError, WorkflowResult};
use crate::form::IssuanceForm;
use crate::ledger::{AuditLedger, IssuanceRecord};
use crate::packager::{BadgeImage, ContentPackager};
use crate::transactor::IssuanceTransactor;
use certibadge_core::{
    Address, ConfirmationStatus, ContentStore, IssueBadgeCall, NameResolver, TxHash,
    WalletGateway,
};

/// Suffix that marks a recipient as a human-readable name to resolve.
pub const RECOGNIZED_NAME_SUFFIX: &str = ".eth";

// ---------------------------------------------------------------------------
// Stage — where one issuance attempt currently stands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Draft,
    Resolving,
    Ready,
    Packaging,
    MetadataReady,
    Issuing,
    Submitted,
    Confirmed,
    ResolutionFailed,
    PackagingFailed,
    IssuanceFailed,
}

impl Stage {
    /// A step is running; no edits and no further triggers.
    pub fn is_in_flight(self) -> bool {
        matches!(self, Stage::Resolving | Stage::Packaging | Stage::Issuing)
    }

    /// Valid end states for audit purposes. A submission whose
    /// confirmation never arrives stays Submitted indefinitely.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Submitted | Stage::Confirmed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Draft => "Draft",
            Stage::Resolving => "Resolving",
            Stage::Ready => "Ready",
            Stage::Packaging => "Packaging",
            Stage::MetadataReady => "MetadataReady",
            Stage::Issuing => "Issuing",
            Stage::Submitted => "Submitted",
            Stage::Confirmed => "Confirmed",
            Stage::ResolutionFailed => "ResolutionFailed",
            Stage::PackagingFailed => "PackagingFailed",
            Stage::IssuanceFailed => "IssuanceFailed",
        };
        write!(f, "{}", name)
    }
}

// ---------------------------------------------------------------------------
// Step — the user-triggerable operations, for gate errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Resolve,
    Package,
    Issue,
    Confirm,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Resolve => "identity resolution",
            Step::Package => "packaging",
            Step::Issue => "issuance",
            Step::Confirm => "confirmation",
        };
        write!(f, "{}", name)
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

/// Check whether a stage transition is valid.
pub fn is_valid_transition(from: Stage, to: Stage) -> bool {
    matches!(
        (from, to),
        (Stage::Draft, Stage::Resolving)
            | (Stage::Draft, Stage::Ready)
            | (Stage::Ready, Stage::Resolving)
            | (Stage::Resolving, Stage::Ready)
            | (Stage::Resolving, Stage::ResolutionFailed)
            | (Stage::ResolutionFailed, Stage::Draft)
            | (Stage::ResolutionFailed, Stage::Ready)
            | (Stage::Ready, Stage::Packaging)
            | (Stage::Ready, Stage::MetadataReady)
            | (Stage::Packaging, Stage::MetadataReady)
            | (Stage::Packaging, Stage::PackagingFailed)
            | (Stage::PackagingFailed, Stage::Ready)
            | (Stage::MetadataReady, Stage::Issuing)
            | (Stage::Issuing, Stage::Submitted)
            | (Stage::Issuing, Stage::IssuanceFailed)
            | (Stage::IssuanceFailed, Stage::MetadataReady)
            | (Stage::Submitted, Stage::Confirmed)
    )
}

/// Attempt a stage transition, returning the new stage or an error.
pub fn transition(from: Stage, to: Stage) -> WorkflowResult<Stage> {
    if is_valid_transition(from, to) {
        Ok(to)
    } else {
        Err(WorkflowError::TransitionDenied { from, to })
    }
}

// ---------------------------------------------------------------------------
// IssuanceWorkflow — one attempt, from draft to submitted/confirmed
// ---------------------------------------------------------------------------

/// Drives a single issuance attempt. Owns its draft exclusively; the only
/// shared state is the injected ledger, which each attempt appends to at
/// most once.
pub struct IssuanceWorkflow {
    form: IssuanceForm,
    image: Option<BadgeImage>,
    stage: Stage,
    status: String,
    last_error: Option<WorkflowError>,
    submitted_tx: Option<TxHash>,
    resolver: Arc<dyn NameResolver>,
    packager: ContentPackager,
    transactor: IssuanceTransactor,
    ledger: Arc<AuditLedger>,
    confirmation_wait: Duration,
}

impl IssuanceWorkflow {
    pub fn new(
        resolver: Arc<dyn NameResolver>,
        store: Arc<dyn ContentStore>,
        wallet: Arc<dyn WalletGateway>,
        ledger: Arc<AuditLedger>,
        confirmation_wait: Duration,
    ) -> Self {
        Self {
            form: IssuanceForm::new(),
            image: None,
            stage: Stage::Draft,
            status: String::new(),
            last_error: None,
            submitted_tx: None,
            resolver,
            packager: ContentPackager::new(store),
            transactor: IssuanceTransactor::new(wallet),
            ledger,
            confirmation_wait,
        }
    }

    pub fn form(&self) -> &IssuanceForm {
        &self.form
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Human-readable status line for the last completed or failed step.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn last_error(&self) -> Option<&WorkflowError> {
        self.last_error.as_ref()
    }

    pub fn submitted_tx(&self) -> Option<&TxHash> {
        self.submitted_tx.as_ref()
    }

    /// Apply a field edit as a fresh snapshot. Allowed in any stage except
    /// while a step is in flight. Manually supplying a metadata URI while
    /// Ready moves the attempt to MetadataReady.
    pub fn edit(
        &mut self,
        apply: impl FnOnce(IssuanceForm) -> IssuanceForm,
    ) -> WorkflowResult<()> {
        if self.stage.is_in_flight() {
            return Err(WorkflowError::EditLocked(self.stage));
        }
        self.form = apply(std::mem::take(&mut self.form));
        if self.stage == Stage::Ready && !self.form.metadata_uri().is_empty() {
            self.stage = transition(Stage::Ready, Stage::MetadataReady)?;
            self.set_status("Metadata URI supplied manually".to_string());
        }
        Ok(())
    }

    /// Attach the badge image, keeping its original filename.
    pub fn attach_image(&mut self, image: BadgeImage) -> WorkflowResult<()> {
        if self.stage.is_in_flight() {
            return Err(WorkflowError::EditLocked(self.stage));
        }
        self.set_status(format!("Image {} attached", image.filename));
        self.image = Some(image);
        Ok(())
    }

    /// Resolve the recipient identity. A recipient without the recognized
    /// suffix is assumed canonical: no external call is made and a Draft
    /// attempt simply becomes Ready.
    pub async fn resolve(&mut self) -> WorkflowResult<()> {
        let entry = self.stage;
        if !matches!(entry, Stage::Draft | Stage::Ready) {
            return Err(WorkflowError::StepNotRunnable {
                step: Step::Resolve,
                stage: entry,
            });
        }

        if !self.form.recipient.ends_with(RECOGNIZED_NAME_SUFFIX) {
            if entry == Stage::Draft {
                self.stage = transition(Stage::Draft, Stage::Ready)?;
            }
            self.set_status(format!(
                "Recipient {} needs no resolution",
                self.form.recipient
            ));
            return Ok(());
        }

        let name = self.form.recipient.clone();
        self.stage = transition(entry, Stage::Resolving)?;
        match self.resolver.resolve(&name).await {
            Ok(Some(address)) => {
                // The human-readable form is not retained.
                self.form = std::mem::take(&mut self.form).with_recipient(address.as_str());
                self.stage = transition(Stage::Resolving, Stage::Ready)?;
                self.set_status(format!("Resolved {} to {}", name, address));
                Ok(())
            }
            Ok(None) => self.fail(
                Stage::ResolutionFailed,
                entry,
                WorkflowError::NameNotFound(name),
            ),
            Err(e) => self.fail(
                Stage::ResolutionFailed,
                entry,
                WorkflowError::Resolution(e),
            ),
        }
    }

    /// Package the metadata: image upload, then metadata upload. Requires
    /// an attached image; refused with no upload attempted otherwise.
    pub async fn package(&mut self) -> WorkflowResult<String> {
        if self.stage != Stage::Ready {
            return Err(WorkflowError::StepNotRunnable {
                step: Step::Package,
                stage: self.stage,
            });
        }
        if self.image.is_none() {
            // Refused before entering Packaging: the stage stays Ready.
            return self.refuse(WorkflowError::MissingImage);
        }

        self.stage = transition(Stage::Ready, Stage::Packaging)?;
        match self
            .packager
            .package_and_upload(self.image.as_ref(), &self.form)
            .await
        {
            Ok(packaged) => {
                self.form =
                    std::mem::take(&mut self.form).with_metadata_uri(&packaged.metadata_uri);
                self.stage = transition(Stage::Packaging, Stage::MetadataReady)?;
                self.set_status(format!("Metadata uploaded to {}", packaged.metadata_uri));
                Ok(packaged.metadata_uri)
            }
            Err(err) => self.fail(Stage::PackagingFailed, Stage::Ready, err),
        }
    }

    /// Submit the issuance transaction. The ledger record is appended as
    /// soon as the submission hash exists, before any confirmation.
    pub async fn issue(&mut self) -> WorkflowResult<TxHash> {
        if self.stage != Stage::MetadataReady {
            return Err(WorkflowError::StepNotRunnable {
                step: Step::Issue,
                stage: self.stage,
            });
        }

        let metadata_uri = self.form.metadata_uri().to_string();
        if metadata_uri.is_empty() {
            return self.refuse(WorkflowError::EmptyMetadataUri);
        }
        let recipient = match Address::parse(&self.form.recipient) {
            Ok(address) => address,
            Err(_) => {
                return self.refuse(WorkflowError::UnresolvedRecipient(
                    self.form.recipient.clone(),
                ))
            }
        };

        self.stage = transition(Stage::MetadataReady, Stage::Issuing)?;
        let call = IssueBadgeCall {
            recipient: recipient.clone(),
            course_id: self.form.course_id.clone(),
            issued_by: self.form.issued_by.clone(),
            issued_date: self.form.issued_date.clone(),
            metadata_uri: metadata_uri.clone(),
        };
        match self.transactor.issue(&call).await {
            Ok(submission) => {
                self.ledger.append(IssuanceRecord::new(
                    recipient,
                    call.course_id,
                    call.issued_by,
                    call.issued_date,
                    metadata_uri,
                    submission.tx_hash.clone(),
                ))?;
                self.submitted_tx = Some(submission.tx_hash.clone());
                self.stage = transition(Stage::Issuing, Stage::Submitted)?;
                self.set_status(format!(
                    "Badge issued: transaction {} submitted",
                    submission.tx_hash
                ));
                Ok(submission.tx_hash)
            }
            Err(err) => self.fail(Stage::IssuanceFailed, Stage::MetadataReady, err),
        }
    }

    /// Wait (bounded) for the submitted transaction to confirm. A pending
    /// or unknown outcome leaves the attempt Submitted, which is already a
    /// valid terminal stage; the appended record keeps its unconfirmed
    /// flag until the inclusion event arrives.
    pub async fn await_confirmation(&mut self) -> WorkflowResult<ConfirmationStatus> {
        let tx = match (self.stage, &self.submitted_tx) {
            (Stage::Submitted, Some(tx)) => tx.clone(),
            _ => {
                return Err(WorkflowError::StepNotRunnable {
                    step: Step::Confirm,
                    stage: self.stage,
                })
            }
        };

        match self
            .transactor
            .await_confirmation(&tx, self.confirmation_wait)
            .await
        {
            Ok(ConfirmationStatus::Confirmed) => {
                self.ledger.mark_confirmed(&tx)?;
                self.stage = transition(Stage::Submitted, Stage::Confirmed)?;
                self.set_status(format!("Transaction {} confirmed", tx));
                Ok(ConfirmationStatus::Confirmed)
            }
            Ok(ConfirmationStatus::Pending) => {
                self.set_status(format!("Transaction {} still pending", tx));
                Ok(ConfirmationStatus::Pending)
            }
            Err(err) => {
                // Unknown inclusion state is reported as pending, never as
                // a workflow failure.
                warn!(tx_hash = %tx, error = %err, "confirmation wait failed");
                self.set_status(format!("Confirmation state unknown for {}", tx));
                Ok(ConfirmationStatus::Pending)
            }
        }
    }

    fn set_status(&mut self, status: String) {
        info!(stage = %self.stage, "{}", status);
        self.status = status;
    }

    /// Route a failed step through its failure stage back to the stage it
    /// was triggered from.
    fn fail<T>(
        &mut self,
        failure: Stage,
        retry_point: Stage,
        err: WorkflowError,
    ) -> WorkflowResult<T> {
        self.stage = transition(self.stage, failure)?;
        self.stage = transition(failure, retry_point)?;
        warn!(stage = %failure, error = %err, "issuance step failed");
        self.status = err.to_string();
        self.last_error = Some(err.clone());
        Err(err)
    }

    /// Reject a step before it starts: stage untouched, error surfaced.
    fn refuse<T>(&mut self, err: WorkflowError) -> WorkflowResult<T> {
        warn!(stage = %self.stage, error = %err, "issuance step refused");
        self.status = err.to_string();
        self.last_error = Some(err.clone());
        Err(err)
    }
}
