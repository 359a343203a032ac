//! Opening SQLite databases and running statements for the benchmark harness

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use schemawise_bench::{ConnectionSource, QueryExecutor};
use schemawise_core::{ConnectionDescriptor, Result, SchemawiseError};

pub const MEMORY_PATH: &str = ":memory:";

/// Maps `sqlite:///abs.db`, `sqlite://rel.db`, bare paths and `:memory:` to
/// the path rusqlite expects. Other schemes are rejected.
pub fn sqlite_path(descriptor: &ConnectionDescriptor) -> Result<String> {
    match descriptor.scheme().as_deref() {
        None | Some("sqlite") | Some("sqlite3") => {
            let path = descriptor.location();
            if path.is_empty() {
                return Err(SchemawiseError::Connection(format!(
                    "No database path in '{}'",
                    descriptor
                )));
            }
            Ok(path.to_string())
        }
        Some(other) => Err(SchemawiseError::Connection(format!(
            "Unsupported scheme '{}' for SQLite",
            other
        ))),
    }
}

/// Opens an existing database; never creates a new file
pub fn open_existing(path: &str) -> Result<Connection> {
    tracing::debug!(path = %path, "opening SQLite database");

    if path == MEMORY_PATH {
        return Connection::open_in_memory().map_err(|e| {
            SchemawiseError::Connection(format!("Failed to open in-memory database: {}", e))
        });
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;

    Connection::open_with_flags(path, flags).map_err(|e| {
        SchemawiseError::Connection(format!(
            "Failed to open SQLite database at '{}': {}",
            path, e
        ))
    })
}

/// Runs a statement and steps through every result row
pub(crate) fn run_to_completion(conn: &Connection, query: &str) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare(query)?;
    let mut rows = stmt.query([])?;
    while rows.next()?.is_some() {}
    Ok(())
}

/// One connection per benchmark worker, all against the same file
#[derive(Debug, Clone)]
pub struct SqliteConnectionSource {
    path: String,
}

impl SqliteConnectionSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_descriptor(descriptor: &ConnectionDescriptor) -> Result<Self> {
        Ok(Self::new(sqlite_path(descriptor)?))
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl ConnectionSource for SqliteConnectionSource {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn connect(&self) -> Result<Box<dyn QueryExecutor>> {
        let conn = open_existing(&self.path)?;
        Ok(Box::new(SqliteExecutor {
            conn: Arc::new(Mutex::new(conn)),
        }))
    }
}

struct SqliteExecutor {
    conn: Arc<Mutex<Connection>>,
}

#[async_trait]
impl QueryExecutor for SqliteExecutor {
    async fn execute(&self, query: &str) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let query = query.to_string();

        // rusqlite blocks; keep it off the async workers so benchmark tasks overlap
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            run_to_completion(&conn, &query)
                .map_err(|e| SchemawiseError::Other(format!("Failed to execute query: {}", e)))
        })
        .await
        .map_err(|e| SchemawiseError::Other(format!("Query task failed: {}", e)))?
    }
}
