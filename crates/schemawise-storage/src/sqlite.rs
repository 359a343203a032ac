//! SQLite persistence for metadata snapshots

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::{MetadataStore, SnapshotKind, StorageBackend};

/// Snapshot storage in a single SQLite database
#[derive(Debug, Clone)]
pub struct SqliteMetadataStore {
    db_path: PathBuf,
}

impl SqliteMetadataStore {
    /// Opens (creating if needed) `<base_dir>/metadata.db`
    pub fn open(base_dir: &Path) -> Result<Self> {
        Self::with_path(base_dir.join("metadata.db"))
    }

    /// Opens a store at an explicit database path
    pub fn with_path(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let store = Self { db_path };
        store.initialize_schema()?;

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open metadata database at {:?}", self.db_path))
    }

    fn initialize_schema(&self) -> Result<()> {
        let conn = self.connect()?;

        for kind in SnapshotKind::ALL {
            let table = kind.table_name();
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        db_name TEXT NOT NULL,
                        timestamp TEXT NOT NULL,
                        payload TEXT NOT NULL
                    )"
                ),
                [],
            )?;
            conn.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_db_time
                     ON {table}(db_name, timestamp)"
                ),
                [],
            )?;
        }

        Ok(())
    }
}

impl MetadataStore for SqliteMetadataStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Sqlite
    }

    #[tracing::instrument(skip(self, payload))]
    fn append_snapshot(
        &self,
        kind: SnapshotKind,
        db_name: &str,
        taken_at: DateTime<Utc>,
        payload: &str,
    ) -> Result<()> {
        let conn = self.connect()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (db_name, timestamp, payload) VALUES (?1, ?2, ?3)",
                kind.table_name()
            ),
            params![
                db_name,
                taken_at.to_rfc3339_opts(SecondsFormat::Micros, true),
                payload
            ],
        )
        .with_context(|| format!("Failed to insert into {}", kind.table_name()))?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn latest_snapshot(&self, kind: SnapshotKind, db_name: &str) -> Result<Option<String>> {
        let conn = self.connect()?;
        let payload = conn
            .query_row(
                &format!(
                    "SELECT payload FROM {}
                     WHERE db_name = ?1
                     ORDER BY timestamp DESC, id DESC
                     LIMIT 1",
                    kind.table_name()
                ),
                params![db_name],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("Failed to query {}", kind.table_name()))?;

        Ok(payload)
    }

    fn try_list_databases(&self) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT db_name FROM schema_snapshots ORDER BY db_name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(names)
    }
}

#[cfg(test)]
mod tests;
