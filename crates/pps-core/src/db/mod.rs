//! SQLite storage for imported survey records.

mod imports;
mod records;
mod schema;

#[allow(unused_imports)]
pub use imports::*;
#[allow(unused_imports)]
pub use records::*;
pub use schema::*;

use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

use crate::config::KeyUniqueness;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("database key uniqueness is {stored:?} but {requested:?} was requested")]
    KeyUniquenessMismatch {
        stored: KeyUniqueness,
        requested: KeyUniqueness,
    },
}

pub type DbResult<T> = Result<T, DbError>;

const KEY_UNIQUENESS_SETTING: &str = "key_uniqueness";

/// Database connection wrapper.
///
/// Key uniqueness is fixed when a database is created and stored in it.
/// Later opens adopt the stored setting; changing it takes an explicit
/// [`Database::set_key_uniqueness`].
pub struct Database {
    conn: Connection,
    uniqueness: KeyUniqueness,
}

impl Database {
    /// Open database at path, creating it with default key uniqueness if new.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Self::initialize(Connection::open(path)?, None)
    }

    /// Open database at path, requiring the given key uniqueness.
    ///
    /// A new database is created with it; an existing one must already use it.
    pub fn open_with<P: AsRef<Path>>(path: P, uniqueness: KeyUniqueness) -> DbResult<Self> {
        Self::initialize(Connection::open(path)?, Some(uniqueness))
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        Self::initialize(Connection::open_in_memory()?, None)
    }

    /// Create in-memory database with the given key uniqueness.
    pub fn open_in_memory_with(uniqueness: KeyUniqueness) -> DbResult<Self> {
        Self::initialize(Connection::open_in_memory()?, Some(uniqueness))
    }

    /// Initialize schema; settle key uniqueness against the stored setting.
    fn initialize(conn: Connection, requested: Option<KeyUniqueness>) -> DbResult<Self> {
        conn.execute_batch(SCHEMA)?;

        let uniqueness = match (load_key_uniqueness(&conn)?, requested) {
            (Some(stored), Some(requested)) if stored != requested => {
                return Err(DbError::KeyUniquenessMismatch { stored, requested });
            }
            (Some(stored), _) => stored,
            (None, requested) => {
                let uniqueness = requested.unwrap_or_default();
                store_key_uniqueness(&conn, &uniqueness)?;
                uniqueness
            }
        };

        Ok(Self { conn, uniqueness })
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Key uniqueness in effect for this database.
    pub fn uniqueness(&self) -> &KeyUniqueness {
        &self.uniqueness
    }

    /// Rebuild key indexes for a new uniqueness setting and store it.
    ///
    /// Fails, leaving the database unchanged, if a table that becomes unique
    /// already holds duplicate keys.
    pub fn set_key_uniqueness(&mut self, uniqueness: KeyUniqueness) -> DbResult<()> {
        let tx = self.conn.transaction()?;
        store_key_uniqueness(&tx, &uniqueness)?;
        tx.commit()?;
        self.uniqueness = uniqueness;
        Ok(())
    }
}

fn load_key_uniqueness(conn: &Connection) -> DbResult<Option<KeyUniqueness>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE name = ?1",
            [KEY_UNIQUENESS_SETTING],
            |row| row.get(0),
        )
        .optional()?;
    match value {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Apply the key indexes and record the setting.
fn store_key_uniqueness(conn: &Connection, uniqueness: &KeyUniqueness) -> DbResult<()> {
    conn.execute_batch(&key_index_sql(uniqueness))?;
    conn.execute(
        "INSERT INTO settings (name, value) VALUES (?1, ?2)
         ON CONFLICT(name) DO UPDATE SET value = excluded.value",
        [KEY_UNIQUENESS_SETTING, serde_json::to_string(uniqueness)?.as_str()],
    )?;
    Ok(())
}
