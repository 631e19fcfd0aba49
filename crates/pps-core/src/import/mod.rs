//! CSV import orchestration.
//!
//! Pipeline per file: CSV parse → row-count check → header binding → per-row
//! parse / id check / parent check / persist → report.
//!
//! Only a malformed file, a file without data rows, or (in strict binding) a
//! header mismatch fails the whole import. Every other problem skips the row
//! and is listed in the report.

mod store;

pub use store::*;

use chrono::Utc;
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{ImportConfig, ImportPolicy};
use crate::models::{
    Antibiotic, AntibioticDetails, EntityKind, ImportRun, Indication, OptionalVar, Patient,
    Record, Specimen, UploadReport,
};
use crate::parse::{BindError, Cells, ColumnMap, FromCells, Layout, MissingHeader};

/// Errors that abort a whole import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("error reading CSV file: {0}")]
    Malformed(#[from] csv::Error),

    #[error("CSV file must have at least a header row and one data row (found {found} rows)")]
    NotEnoughRows { entity: EntityKind, found: usize },

    #[error("CSV header for {entity} is missing expected columns: {}", describe_missing(.missing))]
    HeaderMismatch {
        entity: EntityKind,
        missing: Vec<MissingHeader>,
    },

    #[error("CSV header for {entity} has several columns named {expected} (columns {})", describe_columns(.columns))]
    AmbiguousHeader {
        entity: EntityKind,
        expected: &'static str,
        columns: Vec<usize>,
    },
}

pub type ImportResult<T> = Result<T, ImportError>;

fn describe_missing(missing: &[MissingHeader]) -> String {
    missing
        .iter()
        .map(|m| match &m.closest {
            Some(closest) => format!("{} (found '{}')", m.expected, closest),
            None => m.expected.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// 1-based column numbers as they appear in a spreadsheet.
fn describe_columns(columns: &[usize]) -> String {
    columns
        .iter()
        .map(|c| (c + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Imports PPS CSV exports into a record store.
pub struct Importer<'a, S: RecordStore> {
    store: &'a S,
    config: ImportConfig,
}

impl<'a, S: RecordStore> Importer<'a, S> {
    /// Create an importer over a store.
    pub fn new(store: &'a S, config: ImportConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn import_patients(&self, data: &[u8]) -> ImportResult<UploadReport> {
        self.import_records::<Patient>(data)
    }

    pub fn import_antibiotics(&self, data: &[u8]) -> ImportResult<UploadReport> {
        self.import_records::<Antibiotic>(data)
    }

    pub fn import_antibiotic_details(&self, data: &[u8]) -> ImportResult<UploadReport> {
        self.import_records::<AntibioticDetails>(data)
    }

    pub fn import_indications(&self, data: &[u8]) -> ImportResult<UploadReport> {
        self.import_records::<Indication>(data)
    }

    pub fn import_optional_vars(&self, data: &[u8]) -> ImportResult<UploadReport> {
        self.import_records::<OptionalVar>(data)
    }

    pub fn import_specimens(&self, data: &[u8]) -> ImportResult<UploadReport> {
        self.import_records::<Specimen>(data)
    }

    /// Import a payload for the given entity kind.
    pub fn import(&self, kind: EntityKind, data: &[u8]) -> ImportResult<UploadReport> {
        match kind {
            EntityKind::Patient => self.import_patients(data),
            EntityKind::Antibiotic => self.import_antibiotics(data),
            EntityKind::AntibioticDetails => self.import_antibiotic_details(data),
            EntityKind::Indication => self.import_indications(data),
            EntityKind::OptionalVar => self.import_optional_vars(data),
            EntityKind::Specimen => self.import_specimens(data),
        }
    }

    fn import_records<R: Record + FromCells>(&self, data: &[u8]) -> ImportResult<UploadReport> {
        let kind = R::KIND;
        let import_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now().to_rfc3339();
        let span = tracing::info_span!("import", entity = %kind, import_id = %import_id);
        let _guard = span.enter();

        let rows = read_rows(data)?;
        if rows.len() < 2 {
            return Err(ImportError::NotEnoughRows {
                entity: kind,
                found: rows.len(),
            });
        }

        let layout = R::layout();
        let header: Vec<&str> = rows[0].iter().collect();
        let map = ColumnMap::bind(layout, &header, self.config.header_binding)
            .map_err(|e| match e {
                BindError::Missing(missing) => ImportError::HeaderMismatch {
                    entity: kind,
                    missing,
                },
                BindError::Ambiguous { expected, columns } => ImportError::AmbiguousHeader {
                    entity: kind,
                    expected,
                    columns,
                },
            })?;

        let checksum = hex::encode(Sha256::digest(data));
        if self.config.record_runs {
            self.warn_if_reupload(kind, &checksum);
        }

        let mut report = UploadReport::new(rows.len() - 1);
        for (index, record) in rows[1..].iter().enumerate() {
            report.processed_records += 1;
            self.import_row::<R>(record, &map, layout, index + 2, &mut report);
        }

        info!(
            total = report.total_records,
            inserted = report.inserted_records,
            updated = report.updated_records,
            skipped = report.skipped_records,
            binding = map.binding().as_str(),
            "import finished"
        );

        if self.config.record_runs {
            let run = ImportRun {
                import_id,
                entity: kind,
                checksum,
                policy: self.config.policy,
                binding: map.binding(),
                report: report.clone(),
                started_at,
                finished_at: Utc::now().to_rfc3339(),
            };
            if let Err(e) = self.store.record_import_run(&run) {
                warn!(error = %e, "failed to record import run");
            }
        }

        Ok(report)
    }

    /// Process one data row. `row` is the 1-based file row (header is row 1).
    fn import_row<R: Record + FromCells>(
        &self,
        record: &StringRecord,
        map: &ColumnMap,
        layout: &Layout,
        row: usize,
        report: &mut UploadReport,
    ) {
        let kind = R::KIND;
        let label = kind.label();

        let cells = Cells::new(record, map);
        if cells.width() < layout.min_columns {
            warn!(row, columns = cells.width(), "skipping row: insufficient columns");
            report.skip_with_error(format!(
                "Row {row}: insufficient columns (expected at least {}, found {})",
                layout.min_columns,
                cells.width()
            ));
            return;
        }

        let parsed = R::from_cells(&cells);
        let id = parsed.id();
        if id.is_empty() {
            warn!(row, "skipping row: missing {label} ID");
            report.skip_with_error(format!("Row {row}: missing {label} ID"));
            return;
        }

        if let Some(parent) = parsed.parent_key().filter(|p| !p.is_empty()) {
            match self.store.patient_exists(parent) {
                Ok(true) => {}
                Ok(false) => {
                    warn!(row, id, parent, "skipping row: parent patient not found");
                    report.skip_with_error(format!(
                        "Row {row}: parent patient '{parent}' not found for {label} '{id}'"
                    ));
                    return;
                }
                Err(e) => {
                    warn!(row, id, parent, error = %e, "skipping row: parent lookup failed");
                    report.skip_with_error(format!(
                        "Row {row}: failed to verify parent patient '{parent}' for {label} '{id}': {e}"
                    ));
                    return;
                }
            }
        }

        // Stored keys are skipped whether or not the key is unique; only
        // upsert appends to a non-unique table.
        let unique = self.store.key_is_unique(kind);
        let mode = match self.config.policy {
            ImportPolicy::Upsert if unique => WriteMode::Upsert,
            ImportPolicy::Upsert => WriteMode::Append,
            ImportPolicy::SkipIfExists => match self.store.record_exists(kind, id) {
                Ok(false) if unique => WriteMode::InsertIfAbsent,
                Ok(false) => WriteMode::Append,
                Ok(true) => {
                    debug!(row, id, "{label} already exists, skipping");
                    report.skip();
                    return;
                }
                Err(e) => {
                    warn!(row, id, error = %e, "skipping row: existence check failed");
                    report.skip_with_error(format!(
                        "Row {row}: failed to check existing {label} '{id}': {e}"
                    ));
                    return;
                }
            },
        };

        match self.store.write(&parsed, mode) {
            Ok(WriteOutcome::Inserted) => report.inserted_records += 1,
            Ok(WriteOutcome::Updated) => report.updated_records += 1,
            Ok(WriteOutcome::Unchanged) => {
                debug!(row, id, "{label} stored concurrently, skipping");
                report.skip();
            }
            Err(e) => {
                warn!(row, id, error = %e, "skipping row: save failed");
                report.skip_with_error(format!("Row {row}: failed to save {label} '{id}': {e}"));
            }
        }
    }

    fn warn_if_reupload(&self, kind: EntityKind, checksum: &str) {
        match self.store.import_runs_with_checksum(kind, checksum) {
            Ok(runs) => {
                if let Some(previous) = runs.first() {
                    warn!(
                        previous_import = %previous.import_id,
                        previous_finished_at = %previous.finished_at,
                        times = runs.len(),
                        "identical file was imported before"
                    );
                }
            }
            Err(e) => warn!(error = %e, "failed to look up earlier imports"),
        }
    }
}

/// Read every CSV row, header included. Row lengths may vary.
fn read_rows(data: &[u8]) -> ImportResult<Vec<StringRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);
    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
