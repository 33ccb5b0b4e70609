//! SqliteCoffeeStore - durable store on a single SQLite table.
//!
//! Ids come from `INTEGER PRIMARY KEY AUTOINCREMENT`, which never hands out
//! an id that was used before, even after its row is deleted.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};

use super::CoffeeStore;
use crate::coffee::{validate_name, CoffeeRecord};
use crate::error::StoreError;
use crate::guard::check_version;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS coffee (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    version INTEGER NOT NULL
)";

/// SQLite-backed coffee store.
///
/// One connection behind a mutex; updates additionally run inside an
/// `IMMEDIATE` transaction with a version predicate on the `UPDATE`, so the
/// compare-and-bump holds even if another process shares the file.
#[derive(Clone)]
pub struct SqliteCoffeeStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCoffeeStore {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StoreError::Storage(e.to_string()))?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Storage("connection lock poisoned".into()))
    }
}

fn to_record(row: &Row<'_>) -> rusqlite::Result<CoffeeRecord> {
    Ok(CoffeeRecord {
        id: row.get::<_, i64>(0)? as u64,
        name: row.get(1)?,
        version: row.get::<_, i64>(2)? as u64,
    })
}

fn select_one(conn: &Connection, id: u64) -> Result<Option<CoffeeRecord>, StoreError> {
    let record = conn
        .query_row(
            "SELECT id, name, version FROM coffee WHERE id = ?1",
            params![id as i64],
            to_record,
        )
        .optional()?;
    Ok(record)
}

/// Why a version-predicated `UPDATE` matched no row: the record is gone, or
/// its version moved past `expected`.
fn stale_update(conn: &Connection, id: u64, expected: u64) -> Result<StoreError, StoreError> {
    let outcome = match select_one(conn, id)? {
        None => StoreError::NotFound { id },
        Some(current) => match check_version(id, expected, current.version) {
            Err(conflict) => conflict,
            Ok(()) => StoreError::Storage(format!(
                "coffee {} matched version {} but was not updated",
                id, expected
            )),
        },
    };
    Ok(outcome)
}

impl CoffeeStore for SqliteCoffeeStore {
    fn list_all(&self) -> Result<Vec<CoffeeRecord>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, version FROM coffee ORDER BY id")?;
        let rows = stmt.query_map([], to_record)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn get(&self, id: u64) -> Result<CoffeeRecord, StoreError> {
        let conn = self.lock()?;
        select_one(&conn, id)?.ok_or(StoreError::NotFound { id })
    }

    fn create(&self, name: &str) -> Result<CoffeeRecord, StoreError> {
        let name = validate_name(name)?;
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO coffee (name, version) VALUES (?1, 1)",
            params![name],
        )?;

        Ok(CoffeeRecord {
            id: conn.last_insert_rowid() as u64,
            name: name.to_string(),
            version: 1,
        })
    }

    fn update(
        &self,
        id: u64,
        name: &str,
        expected_version: u64,
    ) -> Result<CoffeeRecord, StoreError> {
        let name = validate_name(name)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = select_one(&tx, id)?.ok_or(StoreError::NotFound { id })?;
        check_version(id, expected_version, current.version)?;

        let changed = tx.execute(
            "UPDATE coffee SET name = ?1, version = version + 1 WHERE id = ?2 AND version = ?3",
            params![name, id as i64, current.version as i64],
        )?;
        if changed != 1 {
            return Err(stale_update(&tx, id, expected_version)?);
        }

        tx.commit()?;

        Ok(CoffeeRecord {
            id,
            name: name.to_string(),
            version: current.version + 1,
        })
    }

    fn delete(&self, id: u64) -> Result<(), StoreError> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM coffee WHERE id = ?1", params![id as i64])?;
        if removed == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }

    fn count(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM coffee", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
