//! Append-only audit ledger with deterministic CSV export.
//!
//! One record per accepted submission, appended as soon as a transaction
//! hash exists — before confirmation. Process-lifetime state only; the
//! exported CSV is the single durable artifact.

use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{WorkflowError, WorkflowResult};
use certibadge_core::{Address, TxHash};

/// Exact header of the exported CSV.
pub const CSV_HEADER: &str = "Recipient,Course,Issuer,Date,MetadataURI,TxHash";

/// Default filename for the exported log artifact.
pub const EXPORT_FILENAME: &str = "issued_badges_log.csv";

/// One successful submission. Immutable once appended, except for the
/// confirmation flag which flips when the inclusion event arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceRecord {
    pub recipient: Address,
    pub course_id: String,
    pub issued_by: String,
    pub issued_date: String,
    pub metadata_uri: String,
    pub tx_hash: TxHash,
    /// False while the transaction is submitted but not yet included.
    pub confirmed: bool,
    pub recorded_at: String,
}

impl IssuanceRecord {
    pub fn new(
        recipient: Address,
        course_id: impl Into<String>,
        issued_by: impl Into<String>,
        issued_date: impl Into<String>,
        metadata_uri: impl Into<String>,
        tx_hash: TxHash,
    ) -> Self {
        Self {
            recipient,
            course_id: course_id.into(),
            issued_by: issued_by.into(),
            issued_date: issued_date.into(),
            metadata_uri: metadata_uri.into(),
            tx_hash,
            confirmed: false,
            recorded_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Thread-safe, insertion-ordered ledger. Append is the only mutator
/// besides the confirmation flag; a single-writer lock serializes both.
pub struct AuditLedger {
    records: Mutex<Vec<IssuanceRecord>>,
}

impl AuditLedger {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// O(1) append preserving insertion order (insertion order = issuance
    /// order, which the export relies on).
    pub fn append(&self, record: IssuanceRecord) -> WorkflowResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| WorkflowError::LedgerPoisoned)?;
        records.push(record);
        Ok(())
    }

    /// Flip the confirmation flag for the record with the given hash.
    /// Returns whether a record was found.
    pub fn mark_confirmed(&self, tx_hash: &TxHash) -> WorkflowResult<bool> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| WorkflowError::LedgerPoisoned)?;
        for record in records.iter_mut() {
            if &record.tx_hash == tx_hash {
                record.confirmed = true;
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn records(&self) -> WorkflowResult<Vec<IssuanceRecord>> {
        let records = self
            .records
            .lock()
            .map_err(|_| WorkflowError::LedgerPoisoned)?;
        Ok(records.clone())
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deterministic CSV: header row, then one row per record in insertion
    /// order, every line newline-terminated.
    ///
    /// Fields are joined verbatim. An embedded comma in a free-text field
    /// (issuer name, course id) shifts the columns of that row — a known
    /// limitation of the log format, kept as-is.
    pub fn export_csv(&self) -> WorkflowResult<Vec<u8>> {
        let records = self
            .records
            .lock()
            .map_err(|_| WorkflowError::LedgerPoisoned)?;

        let mut out = String::with_capacity(64 + records.len() * 128);
        out.push_str(CSV_HEADER);
        out.push('\n');
        for record in records.iter() {
            out.push_str(record.recipient.as_str());
            out.push(',');
            out.push_str(&record.course_id);
            out.push(',');
            out.push_str(&record.issued_by);
            out.push(',');
            out.push_str(&record.issued_date);
            out.push(',');
            out.push_str(&record.metadata_uri);
            out.push(',');
            out.push_str(record.tx_hash.as_str());
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

impl Default for AuditLedger {
    fn default() -> Self {
        Self::new()
    }
}
