//! Survey record operations.
//!
//! Records are mapped to rows through serde: serialized field names are the
//! column names, so one set of statements serves all six tables.

use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Row};
use serde_json::{Map, Number, Value as JsonValue};

use super::{Database, DbError, DbResult};
use crate::import::{RecordStore, WriteMode, WriteOutcome};
use crate::models::{EntityKind, ImportRun, Record};

impl Database {
    /// Insert a record unconditionally.
    pub fn insert_record<R: Record>(&self, record: &R) -> DbResult<()> {
        let columns = record_columns(record)?;
        let sql = insert_sql(R::KIND, &columns, "");
        self.conn
            .execute(&sql, params_from_iter(columns.iter().map(|(_, v)| v)))?;
        Ok(())
    }

    /// Insert a record unless its key is already stored.
    ///
    /// Returns `false` when the key existed. Requires a unique key.
    pub fn insert_record_if_absent<R: Record>(&self, record: &R) -> DbResult<bool> {
        let columns = record_columns(record)?;
        let sql = insert_sql(R::KIND, &columns, r#" ON CONFLICT("key") DO NOTHING"#);
        let rows_affected = self
            .conn
            .execute(&sql, params_from_iter(columns.iter().map(|(_, v)| v)))?;
        Ok(rows_affected > 0)
    }

    /// Insert or overwrite a record by key.
    ///
    /// Returns `true` when an existing record was overwritten. Requires a unique key.
    pub fn upsert_record<R: Record>(&self, record: &R) -> DbResult<bool> {
        let existed = self.record_exists(R::KIND, record.id())?;
        let columns = record_columns(record)?;
        let assignments: Vec<String> = columns
            .iter()
            .filter(|(name, _)| name != "key")
            .map(|(name, _)| format!(r#""{name}" = excluded."{name}""#))
            .chain(std::iter::once("updated_at = datetime('now')".to_string()))
            .collect();
        let conflict = format!(
            r#" ON CONFLICT("key") DO UPDATE SET {}"#,
            assignments.join(", ")
        );
        let sql = insert_sql(R::KIND, &columns, &conflict);
        self.conn
            .execute(&sql, params_from_iter(columns.iter().map(|(_, v)| v)))?;
        Ok(existed)
    }

    /// Check whether any record of `kind` has this key.
    pub fn record_exists(&self, kind: EntityKind, id: &str) -> DbResult<bool> {
        let sql = format!(
            r#"SELECT EXISTS(SELECT 1 FROM {} WHERE "key" = ?1)"#,
            kind.table()
        );
        let exists: bool = self.conn.query_row(&sql, [id], |row| row.get(0))?;
        Ok(exists)
    }

    /// Get the first stored record with this key.
    pub fn get_record<R: Record>(&self, id: &str) -> DbResult<Option<R>> {
        Ok(self.get_records(id)?.into_iter().next())
    }

    /// Get every stored record with this key, oldest first.
    pub fn get_records<R: Record>(&self, id: &str) -> DbResult<Vec<R>> {
        let sql = format!(
            r#"SELECT * FROM {} WHERE "key" = ?1 ORDER BY rowid"#,
            R::KIND.table()
        );
        self.query_records(&sql, [id])
    }

    /// Get all records of a kind belonging to a patient.
    pub fn list_children<R: Record>(&self, parent_key: &str) -> DbResult<Vec<R>> {
        if !R::KIND.has_parent() {
            return Err(DbError::InvalidRecord(format!(
                "{} records have no parent",
                R::KIND
            )));
        }
        let sql = format!(
            "SELECT * FROM {} WHERE parent_key = ?1 ORDER BY rowid",
            R::KIND.table()
        );
        self.query_records(&sql, [parent_key])
    }

    /// Count stored records of a kind.
    pub fn count_records(&self, kind: EntityKind) -> DbResult<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn query_records<R: Record, P: rusqlite::Params>(&self, sql: &str, params: P) -> DbResult<Vec<R>> {
        let mut stmt = self.conn.prepare(sql)?;
        let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();
        let rows = stmt.query_map(params, |row| row_to_json(row, &names))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_value(JsonValue::Object(row?))?);
        }
        Ok(records)
    }
}

impl RecordStore for Database {
    type Error = DbError;

    fn patient_exists(&self, id: &str) -> DbResult<bool> {
        self.record_exists(EntityKind::Patient, id)
    }

    fn record_exists(&self, kind: EntityKind, id: &str) -> DbResult<bool> {
        Database::record_exists(self, kind, id)
    }

    fn key_is_unique(&self, kind: EntityKind) -> bool {
        self.uniqueness.is_unique(kind)
    }

    fn write<R: Record>(&self, record: &R, mode: WriteMode) -> DbResult<WriteOutcome> {
        match mode {
            WriteMode::Append => {
                self.insert_record(record)?;
                Ok(WriteOutcome::Inserted)
            }
            WriteMode::InsertIfAbsent => Ok(if self.insert_record_if_absent(record)? {
                WriteOutcome::Inserted
            } else {
                WriteOutcome::Unchanged
            }),
            WriteMode::Upsert => Ok(if self.upsert_record(record)? {
                WriteOutcome::Updated
            } else {
                WriteOutcome::Inserted
            }),
        }
    }

    fn record_import_run(&self, run: &ImportRun) -> DbResult<()> {
        self.insert_import_run(run)
    }

    fn import_runs_with_checksum(
        &self,
        entity: EntityKind,
        checksum: &str,
    ) -> DbResult<Vec<ImportRun>> {
        self.find_import_runs_by_checksum(entity, checksum)
    }
}

/// Serialize a record into (column, value) pairs.
fn record_columns<R: Record>(record: &R) -> DbResult<Vec<(String, Value)>> {
    match serde_json::to_value(record)? {
        JsonValue::Object(fields) => Ok(fields
            .into_iter()
            .map(|(name, value)| (name, json_to_sql(value)))
            .collect()),
        other => Err(DbError::InvalidRecord(format!(
            "{} serialized to non-object {}",
            R::KIND,
            other
        ))),
    }
}

fn insert_sql(kind: EntityKind, columns: &[(String, Value)], suffix: &str) -> String {
    let names: Vec<String> = columns.iter().map(|(name, _)| format!(r#""{name}""#)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}){}",
        kind.table(),
        names.join(", "),
        placeholders.join(", "),
        suffix
    )
}

fn json_to_sql(value: JsonValue) -> Value {
    match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Integer(b as i64),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or(0.0)),
        },
        JsonValue::String(s) => Value::Text(s),
        nested => Value::Text(nested.to_string()),
    }
}

fn row_to_json(row: &Row<'_>, names: &[String]) -> rusqlite::Result<Map<String, JsonValue>> {
    let mut map = Map::new();
    for (index, name) in names.iter().enumerate() {
        let value = match row.get_ref(index)? {
            ValueRef::Null => JsonValue::Null,
            ValueRef::Integer(i) => JsonValue::from(i),
            ValueRef::Real(f) => Number::from_f64(f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            ValueRef::Text(t) => JsonValue::String(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(_) => continue,
        };
        map.insert(name.clone(), value);
    }
    Ok(map)
}
