//! PPS Core Library
//!
//! Ingestion of Point Prevalence Survey (PPS) CSV exports into a relational store.
//!
//! # Architecture
//!
//! ```text
//!   CSV bytes (one file per entity)
//!         │
//!         ▼
//!   csv reader ── < 2 rows / malformed ──► ImportError (whole file rejected)
//!         │
//!         ▼
//!   header binding (positional | by name)
//!         │
//!         ▼  per data row
//!   ┌─────────────────────────────────────────────┐
//!   │ column count → FromCells parse → id check   │
//!   │ → parent patient check → existing-key check │──► error entry, skipped
//!   └──────────────────────┬──────────────────────┘
//!                          │
//!                          ▼
//!                 RecordStore::write ──► inserted / updated / skipped
//!                          │
//!                          ▼
//!                   UploadReport ──► import_runs ledger
//! ```
//!
//! # Core Principle
//!
//! **One bad row never fails a file.** Only unreadable files, files without data
//! rows, or a strict header mismatch abort an import.
//!
//! # Modules
//!
//! - [`parse`]: date parser, key normalizer, column tables, record parsers
//! - [`import`]: the import orchestrator and its storage trait
//! - [`db`]: SQLite store and import ledger
//! - [`models`]: the six survey record types and the upload report
//! - [`config`]: import policy, header binding and key uniqueness

pub mod config;
pub mod db;
pub mod import;
pub mod models;
pub mod parse;

// Re-export commonly used types
pub use config::{HeaderBinding, ImportConfig, ImportPolicy, KeyUniqueness};
pub use db::Database;
pub use import::{ImportError, Importer, RecordStore, WriteMode, WriteOutcome};
pub use models::{
    Antibiotic, AntibioticDetails, EntityKind, ImportRun, Indication, OptionalVar, Patient,
    Record, Specimen, UploadReport,
};
pub use parse::{normalize_key, parse_date};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PpsError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Import failed: {0}")]
    ImportFailed(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl From<db::DbError> for PpsError {
    fn from(e: db::DbError) -> Self {
        PpsError::DatabaseError(e.to_string())
    }
}

impl From<ImportError> for PpsError {
    fn from(e: ImportError) -> Self {
        PpsError::ImportFailed(e.to_string())
    }
}

impl From<config::ConfigError> for PpsError {
    fn from(e: config::ConfigError) -> Self {
        PpsError::InvalidConfig(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PpsError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PpsError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

fn parse_config(config_json: Option<&str>) -> Result<ImportConfig, PpsError> {
    match config_json {
        Some(json) => Ok(ImportConfig::from_json(json)?),
        None => Ok(ImportConfig::default()),
    }
}

/// Open or create a database at the given path.
///
/// `config_json` is an optional [`ImportConfig`] as JSON; omitted fields take defaults.
/// Without it an existing database keeps the key uniqueness it was created with;
/// with it the configured uniqueness must match.
#[uniffi::export]
pub fn open_database(path: String, config_json: Option<String>) -> Result<Arc<PpsCore>, PpsError> {
    let config = parse_config(config_json.as_deref())?;
    let db = match config_json {
        Some(_) => Database::open_with(&path, config.key_uniqueness)?,
        None => Database::open(&path)?,
    };
    Ok(Arc::new(PpsCore {
        db: Arc::new(Mutex::new(db)),
        config,
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory(config_json: Option<String>) -> Result<Arc<PpsCore>, PpsError> {
    let config = parse_config(config_json.as_deref())?;
    let db = Database::open_in_memory_with(config.key_uniqueness)?;
    Ok(Arc::new(PpsCore {
        db: Arc::new(Mutex::new(db)),
        config,
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI. Imports run one at a time.
#[derive(uniffi::Object)]
pub struct PpsCore {
    db: Arc<Mutex<Database>>,
    config: ImportConfig,
}

impl PpsCore {
    fn run_import(&self, kind: EntityKind, data: &[u8]) -> Result<FfiUploadReport, PpsError> {
        let db = self.db.lock()?;
        let importer = Importer::new(&*db, self.config.clone());
        let report = importer.import(kind, data)?;
        Ok(report.into())
    }
}

#[uniffi::export]
impl PpsCore {
    // =========================================================================
    // Import Operations
    // =========================================================================

    pub fn import_patients(&self, data: Vec<u8>) -> Result<FfiUploadReport, PpsError> {
        self.run_import(EntityKind::Patient, &data)
    }

    pub fn import_antibiotics(&self, data: Vec<u8>) -> Result<FfiUploadReport, PpsError> {
        self.run_import(EntityKind::Antibiotic, &data)
    }

    pub fn import_antibiotic_details(&self, data: Vec<u8>) -> Result<FfiUploadReport, PpsError> {
        self.run_import(EntityKind::AntibioticDetails, &data)
    }

    pub fn import_indications(&self, data: Vec<u8>) -> Result<FfiUploadReport, PpsError> {
        self.run_import(EntityKind::Indication, &data)
    }

    pub fn import_optional_vars(&self, data: Vec<u8>) -> Result<FfiUploadReport, PpsError> {
        self.run_import(EntityKind::OptionalVar, &data)
    }

    pub fn import_specimens(&self, data: Vec<u8>) -> Result<FfiUploadReport, PpsError> {
        self.run_import(EntityKind::Specimen, &data)
    }

    /// Import a CSV payload for any entity kind.
    pub fn import_csv(
        &self,
        kind: FfiEntityKind,
        data: Vec<u8>,
    ) -> Result<FfiUploadReport, PpsError> {
        self.run_import(kind.into(), &data)
    }

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    /// Most recent imports first.
    pub fn recent_import_runs(&self, limit: u32) -> Result<Vec<FfiImportRun>, PpsError> {
        let db = self.db.lock()?;
        let runs = db.list_import_runs(limit as usize)?;
        Ok(runs.into_iter().map(|r| r.into()).collect())
    }

    /// Number of stored records of a kind.
    pub fn count_records(&self, kind: FfiEntityKind) -> Result<u64, PpsError> {
        let db = self.db.lock()?;
        Ok(db.count_records(kind.into())? as u64)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiEntityKind {
    Patient,
    Antibiotic,
    AntibioticDetails,
    Indication,
    OptionalVar,
    Specimen,
}

impl From<FfiEntityKind> for EntityKind {
    fn from(kind: FfiEntityKind) -> Self {
        match kind {
            FfiEntityKind::Patient => EntityKind::Patient,
            FfiEntityKind::Antibiotic => EntityKind::Antibiotic,
            FfiEntityKind::AntibioticDetails => EntityKind::AntibioticDetails,
            FfiEntityKind::Indication => EntityKind::Indication,
            FfiEntityKind::OptionalVar => EntityKind::OptionalVar,
            FfiEntityKind::Specimen => EntityKind::Specimen,
        }
    }
}

impl From<EntityKind> for FfiEntityKind {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Patient => FfiEntityKind::Patient,
            EntityKind::Antibiotic => FfiEntityKind::Antibiotic,
            EntityKind::AntibioticDetails => FfiEntityKind::AntibioticDetails,
            EntityKind::Indication => FfiEntityKind::Indication,
            EntityKind::OptionalVar => FfiEntityKind::OptionalVar,
            EntityKind::Specimen => FfiEntityKind::Specimen,
        }
    }
}

/// FFI-safe upload report.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct FfiUploadReport {
    pub total_records: u64,
    pub processed_records: u64,
    pub skipped_records: u64,
    pub inserted_records: u64,
    pub updated_records: u64,
    pub errors: Vec<String>,
}

impl From<UploadReport> for FfiUploadReport {
    fn from(report: UploadReport) -> Self {
        Self {
            total_records: report.total_records as u64,
            processed_records: report.processed_records as u64,
            skipped_records: report.skipped_records as u64,
            inserted_records: report.inserted_records as u64,
            updated_records: report.updated_records as u64,
            errors: report.errors,
        }
    }
}

/// FFI-safe ledger entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiImportRun {
    pub import_id: String,
    pub entity: FfiEntityKind,
    pub checksum: String,
    pub policy: String,
    pub binding: String,
    pub report: FfiUploadReport,
    pub started_at: String,
    pub finished_at: String,
}

impl From<ImportRun> for FfiImportRun {
    fn from(run: ImportRun) -> Self {
        Self {
            import_id: run.import_id,
            entity: run.entity.into(),
            checksum: run.checksum,
            policy: run.policy.as_str().to_string(),
            binding: run.binding.as_str().to_string(),
            report: run.report.into(),
            started_at: run.started_at,
            finished_at: run.finished_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATIENTS: &str = "key,region\np1,Central\n";

    #[test]
    fn test_ffi_import_and_ledger() {
        let core = open_database_in_memory(None).unwrap();
        let report = core.import_patients(PATIENTS.as_bytes().to_vec()).unwrap();
        // Row shorter than the patient minimum column count
        assert_eq!(report.total_records, 1);
        assert_eq!(report.skipped_records, 1);

        let runs = core.recent_import_runs(5).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].entity, FfiEntityKind::Patient);
        assert_eq!(runs[0].policy, "skip_if_exists");
        assert_eq!(runs[0].report, report);
    }

    #[test]
    fn test_ffi_fatal_and_config_errors() {
        let core = open_database_in_memory(Some(r#"{"record_runs": false}"#.into())).unwrap();
        let err = core
            .import_csv(FfiEntityKind::Specimen, b"only a header\n".to_vec())
            .unwrap_err();
        assert!(matches!(err, PpsError::ImportFailed(_)));
        assert!(core.recent_import_runs(5).unwrap().is_empty());

        assert!(matches!(
            open_database_in_memory(Some("{not json".into())),
            Err(PpsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_ffi_reopen_keeps_key_uniqueness() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pps.sqlite").to_string_lossy().into_owned();

        open_database(
            path.clone(),
            Some(r#"{"key_uniqueness": {"optional_vars": false}}"#.into()),
        )
        .unwrap();
        assert!(open_database(path.clone(), None).is_ok());
        assert!(matches!(
            open_database(path, Some("{}".into())),
            Err(PpsError::DatabaseError(_))
        ));
    }

    #[test]
    fn test_entity_kind_conversion() {
        for kind in EntityKind::ALL {
            let ffi: FfiEntityKind = kind.into();
            assert_eq!(EntityKind::from(ffi), kind);
        }
    }
}
