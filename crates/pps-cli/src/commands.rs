//! Subcommand implementations.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use pps_core::{Database, ImportConfig, ImportRun, Importer, KeyUniqueness, UploadReport};
use tracing::info;

use crate::cli::{ImportArgs, RunsArgs};

/// Build the effective import configuration: file, then flag overrides.
pub fn load_config(path: Option<&Path>, args: Option<&ImportArgs>) -> Result<ImportConfig> {
    let mut config = match path {
        Some(path) => ImportConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ImportConfig::default(),
    };
    if let Some(args) = args {
        if let Some(policy) = args.policy {
            config = config.with_policy(policy);
        }
        if let Some(binding) = args.header_binding {
            config = config.with_header_binding(binding);
        }
    }
    Ok(config)
}

/// Reject uploads that are not CSV files or exceed the size limit.
pub fn validate_upload(path: &Path, max_bytes: u64) -> Result<()> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        bail!("only CSV files are allowed: {}", path.display());
    }

    let size = fs::metadata(path)
        .with_context(|| format!("failed to read {}", path.display()))?
        .len();
    if size > max_bytes {
        bail!(
            "file too large: {} is {} bytes (limit {} bytes)",
            path.display(),
            size,
            max_bytes
        );
    }
    Ok(())
}

/// Open the database, requiring `keys` when given; otherwise the stored
/// key uniqueness applies.
fn open_database(db_path: &Path, keys: Option<KeyUniqueness>) -> Result<Database> {
    let db = match keys {
        Some(keys) => Database::open_with(db_path, keys),
        None => Database::open(db_path),
    };
    db.with_context(|| format!("failed to open database {}", db_path.display()))
}

/// Import one file. `keys` is the key uniqueness from an explicit config file.
pub fn run_import(
    db_path: &Path,
    config: ImportConfig,
    keys: Option<KeyUniqueness>,
    args: &ImportArgs,
) -> Result<UploadReport> {
    validate_upload(&args.file, config.max_upload_bytes)?;
    let data = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let db = open_database(db_path, keys)?;
    info!(entity = %args.entity, file = %args.file.display(), "importing");

    let report = Importer::new(&db, config)
        .import(args.entity, &data)
        .with_context(|| format!("failed to import {}", args.file.display()))?;
    Ok(report)
}

pub fn run_runs(db_path: &Path, args: &RunsArgs) -> Result<Vec<ImportRun>> {
    let db = open_database(db_path, None)?;
    db.list_import_runs(args.limit)
        .context("failed to read import ledger")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pps_core::{EntityKind, ImportPolicy};
    use std::io::Write;

    fn import_args(file: &Path) -> ImportArgs {
        ImportArgs {
            entity: EntityKind::Patient,
            file: file.to_path_buf(),
            policy: None,
            header_binding: None,
        }
    }

    #[test]
    fn test_rejects_non_csv_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.xlsx");
        fs::write(&path, "key\np1\n").unwrap();

        let err = validate_upload(&path, 1024).unwrap_err();
        assert!(err.to_string().contains("only CSV files are allowed"));
    }

    #[test]
    fn test_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.CSV");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(&[b'x'; 64]).unwrap();

        assert!(validate_upload(&path, 64).is_ok());
        let err = validate_upload(&path, 63).unwrap_err();
        assert!(err.to_string().contains("file too large"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("pps.json");
        fs::write(&config_path, r#"{"policy": "upsert", "record_runs": false}"#).unwrap();

        let mut args = import_args(&dir.path().join("p.csv"));
        let config = load_config(Some(&config_path), Some(&args)).unwrap();
        assert_eq!(config.policy, ImportPolicy::Upsert);
        assert!(!config.record_runs);

        args.policy = Some(ImportPolicy::SkipIfExists);
        let config = load_config(Some(&config_path), Some(&args)).unwrap();
        assert_eq!(config.policy, ImportPolicy::SkipIfExists);
    }

    #[test]
    fn test_import_and_list_runs() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("pps.sqlite");
        let csv_path = dir.path().join("patients.csv");
        let row = std::iter::once("p1".to_string())
            .chain((1..57).map(|_| String::new()))
            .collect::<Vec<_>>()
            .join(",");
        fs::write(&csv_path, format!("key\n{row}\n")).unwrap();

        let report =
            run_import(&db_path, ImportConfig::default(), None, &import_args(&csv_path)).unwrap();
        assert_eq!(report.inserted_records, 1);

        let runs = run_runs(&db_path, &RunsArgs { limit: 5 }).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].report, report);
    }

    #[test]
    fn test_listing_runs_keeps_key_uniqueness() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("pps.sqlite");
        let csv_path = dir.path().join("patients.csv");
        fs::write(&csv_path, "key\n").unwrap();

        let appending = KeyUniqueness {
            optional_vars: false,
            ..KeyUniqueness::default()
        };
        // Fails on the empty file after the database is created.
        let config = ImportConfig::default();
        let args = import_args(&csv_path);
        assert!(run_import(&db_path, config.clone(), Some(appending), &args).is_err());

        run_runs(&db_path, &RunsArgs { limit: 5 }).unwrap();
        let db = Database::open(&db_path).unwrap();
        assert_eq!(*db.uniqueness(), appending);

        // An explicit config that disagrees is refused.
        let err = run_import(&db_path, config, Some(KeyUniqueness::default()), &args).unwrap_err();
        assert!(format!("{err:#}").contains("key uniqueness"));
    }
}
