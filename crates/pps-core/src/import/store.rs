//! Storage boundary consumed by the importer.

use crate::models::{EntityKind, ImportRun, Record};

/// How a record should be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Insert unless a record with the same key exists (atomic).
    InsertIfAbsent,
    /// Insert, or overwrite the record with the same key.
    Upsert,
    /// Insert unconditionally; the entity allows repeated keys.
    Append,
}

/// What a write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted,
    Updated,
    /// `InsertIfAbsent` found the key already stored.
    Unchanged,
}

/// Persistence primitives the importer needs.
pub trait RecordStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether a patient with this key exists.
    fn patient_exists(&self, id: &str) -> Result<bool, Self::Error>;

    /// Whether a record of `kind` with this key exists.
    fn record_exists(&self, kind: EntityKind, id: &str) -> Result<bool, Self::Error>;

    /// Whether keys of `kind` identify at most one stored record.
    fn key_is_unique(&self, kind: EntityKind) -> bool;

    /// Persist a record.
    fn write<R: Record>(&self, record: &R, mode: WriteMode) -> Result<WriteOutcome, Self::Error>;

    /// Keep a ledger entry for a completed import.
    fn record_import_run(&self, _run: &ImportRun) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Earlier imports of the same payload for the same entity.
    fn import_runs_with_checksum(
        &self,
        _entity: EntityKind,
        _checksum: &str,
    ) -> Result<Vec<ImportRun>, Self::Error> {
        Ok(Vec::new())
    }
}
