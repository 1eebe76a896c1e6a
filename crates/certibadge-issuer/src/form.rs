//! The issuance draft.
//!
//! Every edit produces a new snapshot instead of mutating in place, so the
//! workflow can check stage preconditions against a value that cannot
//! change underneath it.

use serde::{Deserialize, Serialize};

use certibadge_core::is_canonical_address;

/// One issuance attempt's draft fields. Owned exclusively by the workflow
/// until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceForm {
    /// Recipient identity: a human-readable name or a canonical address.
    /// Once resolved, only the canonical address is retained.
    pub recipient: String,
    pub course_id: String,
    pub issued_by: String,
    pub issued_date: String,
    /// Set by packaging, or supplied manually.
    pub metadata_uri: Option<String>,
}

impl IssuanceForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipient(self, recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            ..self
        }
    }

    pub fn with_course_id(self, course_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            ..self
        }
    }

    pub fn with_issued_by(self, issued_by: impl Into<String>) -> Self {
        Self {
            issued_by: issued_by.into(),
            ..self
        }
    }

    pub fn with_issued_date(self, issued_date: impl Into<String>) -> Self {
        Self {
            issued_date: issued_date.into(),
            ..self
        }
    }

    pub fn with_metadata_uri(self, metadata_uri: impl Into<String>) -> Self {
        Self {
            metadata_uri: Some(metadata_uri.into()),
            ..self
        }
    }

    /// Whether the recipient no longer needs identity resolution.
    pub fn recipient_is_canonical(&self) -> bool {
        is_canonical_address(&self.recipient)
    }

    pub fn metadata_uri(&self) -> &str {
        self.metadata_uri.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_field_leaves_original_untouched() {
        let base = IssuanceForm::new().with_recipient("alice.eth");
        let edited = base.clone().with_course_id("CS101");
        assert_eq!(base.course_id, "");
        assert_eq!(edited.course_id, "CS101");
        assert_eq!(edited.recipient, "alice.eth");
    }

    #[test]
    fn test_chained_edits() {
        let form = IssuanceForm::new()
            .with_recipient("alice.eth")
            .with_course_id("CS101")
            .with_issued_by("MIT")
            .with_issued_date("2024-05-01");
        assert_eq!(form.recipient, "alice.eth");
        assert_eq!(form.issued_by, "MIT");
        assert!(form.metadata_uri.is_none());
        assert_eq!(form.metadata_uri(), "");
    }

    #[test]
    fn test_recipient_is_canonical() {
        let named = IssuanceForm::new().with_recipient("alice.eth");
        assert!(!named.recipient_is_canonical());

        let resolved = named.with_recipient("0x00000000000000000000000000000000000000aB");
        assert!(resolved.recipient_is_canonical());
    }

    #[test]
    fn test_metadata_uri_accessor() {
        let form = IssuanceForm::new().with_metadata_uri("ipfs://Qm123/metadata.json");
        assert_eq!(form.metadata_uri(), "ipfs://Qm123/metadata.json");
    }
}
