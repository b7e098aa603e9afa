mod schema;

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use time::OffsetDateTime;

use crate::storage::KeyValueStore;
use schema::INITIAL_SCHEMA;

/// SQLite-backed key-value storage for the application's slots.
///
/// Plays the role browser local storage plays for a web client: a flat map
/// of slot name to JSON string, written through on every state change.
pub struct Database {
    conn: Connection,
}

/// Diagnostic summary of one stored slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    /// Slot name, e.g. `NOTES`.
    pub key: String,
    /// Size of the stored JSON in bytes.
    pub bytes: usize,
    /// When the slot was last written.
    pub updated_at: OffsetDateTime,
}

impl Database {
    /// Opens an in-memory SQLite database.
    ///
    /// Automatically initializes the schema on connection open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Opens a file-based SQLite database at the given path.
    ///
    /// Creates the database file if it does not exist.
    /// Automatically initializes the schema on connection open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// Uses IF NOT EXISTS for idempotent execution.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(INITIAL_SCHEMA)?;
        Ok(())
    }

    /// Returns a reference to the underlying connection.
    ///
    /// Useful for executing custom queries in tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Lists every stored slot with its size and last write time, by key.
    pub fn slot_info(&self) -> Result<Vec<SlotInfo>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, length(CAST(value AS BLOB)), updated_at FROM local_storage ORDER BY key")
            .context("Failed to prepare slot query")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })
            .context("Failed to query slots")?;

        let mut slots = Vec::new();
        for row_result in rows {
            let (key, bytes, updated_at) = row_result.context("Failed to read slot row")?;
            slots.push(SlotInfo {
                key,
                bytes: usize::try_from(bytes).unwrap_or_default(),
                updated_at: OffsetDateTime::from_unix_timestamp(updated_at)?,
            });
        }
        Ok(slots)
    }

    fn upsert(conn: &Connection, key: &str, value: &str, now: i64) -> rusqlite::Result<usize> {
        conn.execute(
            "INSERT INTO local_storage (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value, now),
        )
    }
}

impl KeyValueStore for Database {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to read slot {key}"))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Self::upsert(&self.conn, key, value, now)
            .with_context(|| format!("Failed to write slot {key}"))?;
        Ok(())
    }

    fn set_items(&self, items: &[(&str, String)]) -> Result<()> {
        let now = OffsetDateTime::now_utc().unix_timestamp();

        // Dropping the transaction without commit rolls every write back
        let tx = self
            .conn
            .unchecked_transaction()
            .context("Failed to begin transaction")?;
        for (key, value) in items {
            Self::upsert(&tx, key, value, now)
                .with_context(|| format!("Failed to write slot {key}"))?;
        }
        tx.commit().context("Failed to commit slot writes")?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM local_storage WHERE key = ?1", [key])
            .with_context(|| format!("Failed to remove slot {key}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
