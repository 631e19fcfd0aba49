//! SQLite schema definition.
//!
//! Column names match the serde field names of the record models; records
//! are written and read through their serde representation.

use crate::config::KeyUniqueness;
use crate::models::EntityKind;

/// Complete database schema for PPS ingestion.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients (root records)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    "key" TEXT PRIMARY KEY,
    submission_date TEXT,
    region TEXT NOT NULL DEFAULT '',
    district TEXT NOT NULL DEFAULT '',
    subcounty TEXT NOT NULL DEFAULT '',
    facility TEXT NOT NULL DEFAULT '',
    level_of_care TEXT NOT NULL DEFAULT '',
    ownership TEXT NOT NULL DEFAULT '',
    ward_name TEXT NOT NULL DEFAULT '',
    ward_total_patients INTEGER NOT NULL DEFAULT 0,
    ward_eligible_patients INTEGER NOT NULL DEFAULT 0,
    survey_date TEXT,
    patient_initials TEXT NOT NULL DEFAULT '',
    code TEXT NOT NULL DEFAULT '',
    rand_num INTEGER NOT NULL DEFAULT 0,
    patient_code TEXT NOT NULL DEFAULT '',
    show_code TEXT NOT NULL DEFAULT '',
    is_the_patient_an_infant TEXT NOT NULL DEFAULT '',
    age_months INTEGER NOT NULL DEFAULT 0,
    age_years INTEGER NOT NULL DEFAULT 0,
    pre_term_birth TEXT NOT NULL DEFAULT '',
    gender TEXT NOT NULL DEFAULT '',
    weight REAL NOT NULL DEFAULT 0,
    weight_birth_kg REAL NOT NULL DEFAULT 0,
    admission_date TEXT,
    surgery_since_admission TEXT NOT NULL DEFAULT '',
    urinary_catheter TEXT NOT NULL DEFAULT '',
    peripheral_vascular_catheter TEXT NOT NULL DEFAULT '',
    central_vascular_catheter TEXT NOT NULL DEFAULT '',
    intubation TEXT NOT NULL DEFAULT '',
    patient_on_antibiotic TEXT NOT NULL DEFAULT '',
    patient_number_antibiotics INTEGER NOT NULL DEFAULT 0,
    malaria_status TEXT NOT NULL DEFAULT '',
    tuberculosis_status TEXT NOT NULL DEFAULT '',
    hiv_status TEXT NOT NULL DEFAULT '',
    hiv_on_art TEXT NOT NULL DEFAULT '',
    hiv_cd4_count TEXT NOT NULL DEFAULT '',
    hiv_viral_load TEXT NOT NULL DEFAULT '',
    diabetes TEXT NOT NULL DEFAULT '',
    malnutrition_status TEXT NOT NULL DEFAULT '',
    hypertension TEXT NOT NULL DEFAULT '',
    referred_from TEXT NOT NULL DEFAULT '',
    hospitalization_90_days TEXT NOT NULL DEFAULT '',
    type_surgery_since_admission TEXT NOT NULL DEFAULT '',
    additional_comment TEXT NOT NULL DEFAULT '',
    comments TEXT NOT NULL DEFAULT '',
    instance_id TEXT NOT NULL DEFAULT '',
    submitter_id TEXT NOT NULL DEFAULT '',
    submitter_name TEXT NOT NULL DEFAULT '',
    attachments_present TEXT NOT NULL DEFAULT '',
    attachments_expected TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT '',
    review_state TEXT NOT NULL DEFAULT '',
    device_id TEXT NOT NULL DEFAULT '',
    edits TEXT NOT NULL DEFAULT '',
    form_version TEXT NOT NULL DEFAULT '',
    imported_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_facility ON patients(region, district, facility);
CREATE INDEX IF NOT EXISTS idx_patients_submission ON patients(submission_date);

-- ============================================================================
-- Child records
--
-- parent_key references patients("key") but is checked at import time only.
-- The "key" index is created separately: unique or not per entity config.
-- ============================================================================

CREATE TABLE IF NOT EXISTS antibiotics (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    "key" TEXT NOT NULL,
    antibiotic_notes TEXT NOT NULL DEFAULT '',
    antibiotic_inn_name TEXT NOT NULL DEFAULT '',
    other_antibiotic TEXT NOT NULL DEFAULT '',
    atc_code TEXT NOT NULL DEFAULT '',
    antibiotic_class TEXT NOT NULL DEFAULT '',
    antibiotic_aware_classification TEXT NOT NULL DEFAULT '',
    antibiotic_written_in_inn TEXT NOT NULL DEFAULT '',
    start_date_antibiotic TEXT,
    unit_dose REAL NOT NULL DEFAULT 0,
    unit_doses_combination TEXT NOT NULL DEFAULT '',
    unit_dose_measure_unit TEXT NOT NULL DEFAULT '',
    unit_dose_frequency TEXT NOT NULL DEFAULT '',
    administration_route TEXT NOT NULL DEFAULT '',
    parent_key TEXT NOT NULL DEFAULT '',
    imported_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_antibiotics_parent ON antibiotics(parent_key);

CREATE TABLE IF NOT EXISTS antibiotic_details (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    "key" TEXT NOT NULL,
    prescriber TEXT NOT NULL DEFAULT '',
    intraveno TEXT NOT NULL DEFAULT '',
    oral_switch TEXT NOT NULL DEFAULT '',
    number_missed TEXT NOT NULL DEFAULT '',
    missed_dose TEXT NOT NULL DEFAULT '',
    guideline TEXT NOT NULL DEFAULT '',
    treatment TEXT NOT NULL DEFAULT '',
    parent_key TEXT NOT NULL DEFAULT '',
    imported_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_antibiotic_details_parent ON antibiotic_details(parent_key);

CREATE TABLE IF NOT EXISTS indications (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    "key" TEXT NOT NULL,
    indication_type TEXT NOT NULL DEFAULT '',
    surg_proph_duration TEXT NOT NULL DEFAULT '',
    surg_proph_site TEXT NOT NULL DEFAULT '',
    diagnosis TEXT NOT NULL DEFAULT '',
    start_date_treatment TEXT,
    reason_in_notes TEXT NOT NULL DEFAULT '',
    culture_sample_taken TEXT NOT NULL DEFAULT '',
    parent_key TEXT NOT NULL DEFAULT '',
    imported_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_indications_parent ON indications(parent_key);

CREATE TABLE IF NOT EXISTS optional_vars (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    "key" TEXT NOT NULL,
    prescriber_type TEXT NOT NULL DEFAULT '',
    intravenous_type TEXT NOT NULL DEFAULT '',
    oral_switch TEXT NOT NULL DEFAULT '',
    number_missed_doses INTEGER NOT NULL DEFAULT 0,
    missed_doses_reason TEXT NOT NULL DEFAULT '',
    guidelines_compliance TEXT NOT NULL DEFAULT '',
    treatment_type TEXT NOT NULL DEFAULT '',
    parent_key TEXT NOT NULL DEFAULT '',
    imported_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_optional_vars_parent ON optional_vars(parent_key);

CREATE TABLE IF NOT EXISTS specimens (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    "key" TEXT NOT NULL,
    specimen_type TEXT NOT NULL DEFAULT '',
    culture_result TEXT NOT NULL DEFAULT '',
    microorganism TEXT NOT NULL DEFAULT '',
    antibiotic_susceptibility_test_results TEXT NOT NULL DEFAULT '',
    resistant_phenotype TEXT NOT NULL DEFAULT '',
    parent_key TEXT NOT NULL DEFAULT '',
    imported_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_specimens_parent ON specimens(parent_key);

-- ============================================================================
-- Import ledger (append-only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS import_runs (
    import_id TEXT PRIMARY KEY,
    entity TEXT NOT NULL,
    checksum TEXT NOT NULL,
    policy TEXT NOT NULL,
    binding TEXT NOT NULL,
    report TEXT NOT NULL,                        -- JSON UploadReport
    started_at TEXT NOT NULL,
    finished_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_import_runs_checksum ON import_runs(entity, checksum);
CREATE INDEX IF NOT EXISTS idx_import_runs_finished ON import_runs(finished_at);

-- Database-wide settings fixed when the file is created (JSON values)
CREATE TABLE IF NOT EXISTS settings (
    name TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// DDL that makes each child table's `key` index unique or not.
///
/// The opposite index is dropped first. Creating a unique index over existing
/// duplicates fails. Only run on a fresh database or through
/// [`super::Database::set_key_uniqueness`].
pub fn key_index_sql(uniqueness: &KeyUniqueness) -> String {
    EntityKind::ALL
        .iter()
        .filter(|kind| kind.has_parent())
        .map(|kind| {
            let table = kind.table();
            if uniqueness.is_unique(*kind) {
                format!(
                    "DROP INDEX IF EXISTS idx_{table}_key;\n\
                     CREATE UNIQUE INDEX IF NOT EXISTS ux_{table}_key ON {table}(\"key\");\n"
                )
            } else {
                format!(
                    "DROP INDEX IF EXISTS ux_{table}_key;\n\
                     CREATE INDEX IF NOT EXISTS idx_{table}_key ON {table}(\"key\");\n"
                )
            }
        })
        .collect()
}
