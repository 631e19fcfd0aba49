//! Upload reports and the import ledger entry.

use serde::{Deserialize, Serialize};

use super::EntityKind;
use crate::config::ImportPolicy;
use crate::parse::ColumnBinding;

/// Summary of one CSV import.
///
/// Row-level failures never abort an import; they are counted as skipped and
/// described in `errors` in row order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadReport {
    /// Data rows found (header excluded)
    pub total_records: usize,
    /// Data rows visited
    pub processed_records: usize,
    pub skipped_records: usize,
    pub inserted_records: usize,
    pub updated_records: usize,
    /// One message per failed row, prefixed with its 1-based file row number
    pub errors: Vec<String>,
}

impl UploadReport {
    /// Create an empty report for a file with `total` data rows.
    pub fn new(total: usize) -> Self {
        Self {
            total_records: total,
            ..Default::default()
        }
    }

    /// Count a skipped row and record why.
    pub fn skip_with_error(&mut self, message: String) {
        self.skipped_records += 1;
        self.errors.push(message);
    }

    /// Count a skipped row that is not an error (existing key).
    pub fn skip(&mut self) {
        self.skipped_records += 1;
    }

    /// Whether every visited row was written.
    pub fn is_clean(&self) -> bool {
        self.skipped_records == 0 && self.errors.is_empty()
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// A completed import, as kept in the `import_runs` ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportRun {
    /// Unique import ID (UUIDv4)
    pub import_id: String,
    pub entity: EntityKind,
    /// SHA-256 of the uploaded payload, hex encoded
    pub checksum: String,
    pub policy: ImportPolicy,
    /// How columns were bound for this file
    pub binding: ColumnBinding,
    pub report: UploadReport,
    pub started_at: String,
    pub finished_at: String,
}
