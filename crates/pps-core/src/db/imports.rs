//! Import ledger operations.

use rusqlite::params;

use super::{Database, DbError, DbResult};
use crate::models::{EntityKind, ImportRun};

impl Database {
    /// Append a completed import to the ledger.
    pub fn insert_import_run(&self, run: &ImportRun) -> DbResult<()> {
        let report_json = serde_json::to_string(&run.report)?;
        self.conn.execute(
            r#"
            INSERT INTO import_runs (
                import_id, entity, checksum, policy, binding,
                report, started_at, finished_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                run.import_id,
                run.entity.table(),
                run.checksum,
                run.policy.as_str(),
                run.binding.as_str(),
                report_json,
                run.started_at,
                run.finished_at,
            ],
        )?;
        Ok(())
    }

    /// Most recent imports first.
    pub fn list_import_runs(&self, limit: usize) -> DbResult<Vec<ImportRun>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT import_id, entity, checksum, policy, binding,
                   report, started_at, finished_at
            FROM import_runs
            ORDER BY finished_at DESC, rowid DESC
            LIMIT ?
            "#,
        )?;
        let rows = stmt.query_map([limit as i64], ImportRunRow::from_row)?;

        let mut runs = Vec::new();
        for row in rows {
            runs.push(row?.try_into()?);
        }
        Ok(runs)
    }

    /// Earlier imports of the same payload for an entity, oldest first.
    pub fn find_import_runs_by_checksum(
        &self,
        entity: EntityKind,
        checksum: &str,
    ) -> DbResult<Vec<ImportRun>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT import_id, entity, checksum, policy, binding,
                   report, started_at, finished_at
            FROM import_runs
            WHERE entity = ?1 AND checksum = ?2
            ORDER BY finished_at, rowid
            "#,
        )?;
        let rows = stmt.query_map(params![entity.table(), checksum], ImportRunRow::from_row)?;

        let mut runs = Vec::new();
        for row in rows {
            runs.push(row?.try_into()?);
        }
        Ok(runs)
    }
}

/// Raw ledger row before enum and JSON decoding.
struct ImportRunRow {
    import_id: String,
    entity: String,
    checksum: String,
    policy: String,
    binding: String,
    report: String,
    started_at: String,
    finished_at: String,
}

impl ImportRunRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            import_id: row.get(0)?,
            entity: row.get(1)?,
            checksum: row.get(2)?,
            policy: row.get(3)?,
            binding: row.get(4)?,
            report: row.get(5)?,
            started_at: row.get(6)?,
            finished_at: row.get(7)?,
        })
    }
}

impl TryFrom<ImportRunRow> for ImportRun {
    type Error = DbError;

    fn try_from(row: ImportRunRow) -> DbResult<Self> {
        let entity = row
            .entity
            .parse()
            .map_err(|e| DbError::InvalidRecord(format!("import run {}: {}", row.import_id, e)))?;
        Ok(ImportRun {
            entity,
            checksum: row.checksum,
            policy: serde_json::from_value(serde_json::Value::String(row.policy))?,
            binding: serde_json::from_value(serde_json::Value::String(row.binding))?,
            report: serde_json::from_str(&row.report)?,
            started_at: row.started_at,
            finished_at: row.finished_at,
            import_id: row.import_id,
        })
    }
}
