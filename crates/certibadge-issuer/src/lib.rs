//! Badge issuance workflow.
//!
//! One [`workflow::IssuanceWorkflow`] per issuance attempt drives the
//! sequence: identity resolution, content packaging (image upload, then
//! metadata upload), transaction submission through the wallet, and
//! confirmation tracking. Every successful submission is appended to the
//! shared [`ledger::AuditLedger`] as soon as a transaction hash exists.
//!
//! External collaborators (naming service, content store, wallet) are
//! reached only through the `certibadge-core` gateway traits.

pub mod error;
pub mod form;
pub mod ledger;
pub mod metadata;
pub mod packager;
pub mod transactor;
pub mod workflow;

pub use error::{WorkflowError, WorkflowResult};
pub use form::IssuanceForm;
pub use ledger::{AuditLedger, IssuanceRecord, CSV_HEADER, EXPORT_FILENAME};
pub use metadata::{ipfs_uri, MetadataAttribute, MetadataObject, METADATA_FILENAME};
pub use packager::{BadgeImage, ContentPackager, PackagedMetadata};
pub use transactor::{IssuanceTransactor, Submission};
pub use workflow::{is_valid_transition, IssuanceWorkflow, Stage, Step, RECOGNIZED_NAME_SUFFIX};
