//! Metadata store interface

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use schemawise_analyzer::{QueryStatistics, Recommendation};
use schemawise_core::Schema;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{JsonMetadataStore, SqliteMetadataStore, StorageBackend, StorageConfig};

/// Kind of stored snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    Schema,
    QueryAnalysis,
    Recommendations,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 3] = [
        SnapshotKind::Schema,
        SnapshotKind::QueryAnalysis,
        SnapshotKind::Recommendations,
    ];

    /// SQLite table holding this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Schema => "schema_snapshots",
            Self::QueryAnalysis => "query_analysis",
            Self::Recommendations => "recommendations",
        }
    }

    /// JSON file name prefix for this kind
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::QueryAnalysis => "query_analysis",
            Self::Recommendations => "recommendations",
        }
    }
}

/// Append-only, versioned store of schemawise records
///
/// Backends implement the raw payload methods; the typed methods serialize,
/// log failures and report success as `bool` / `Option`.
pub trait MetadataStore: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> StorageBackend;

    /// Appends a JSON payload; never replaces an existing snapshot
    fn append_snapshot(
        &self,
        kind: SnapshotKind,
        db_name: &str,
        taken_at: DateTime<Utc>,
        payload: &str,
    ) -> Result<()>;

    /// Most recent payload of `kind` for `db_name`
    fn latest_snapshot(&self, kind: SnapshotKind, db_name: &str) -> Result<Option<String>>;

    /// Database names that have at least one schema snapshot
    fn try_list_databases(&self) -> Result<Vec<String>>;

    fn save_schema(&self, db_name: &str, schema: &Schema) -> bool {
        save(self, SnapshotKind::Schema, db_name, schema)
    }

    fn save_query_analysis(&self, db_name: &str, stats: &QueryStatistics) -> bool {
        save(self, SnapshotKind::QueryAnalysis, db_name, stats)
    }

    fn save_recommendations(&self, db_name: &str, recommendations: &[Recommendation]) -> bool {
        save(self, SnapshotKind::Recommendations, db_name, recommendations)
    }

    fn load_latest_schema(&self, db_name: &str) -> Option<Schema> {
        load(self, SnapshotKind::Schema, db_name)
    }

    fn load_latest_query_analysis(&self, db_name: &str) -> Option<QueryStatistics> {
        load(self, SnapshotKind::QueryAnalysis, db_name)
    }

    fn load_latest_recommendations(&self, db_name: &str) -> Option<Vec<Recommendation>> {
        load(self, SnapshotKind::Recommendations, db_name)
    }

    fn list_databases(&self) -> Vec<String> {
        self.try_list_databases().unwrap_or_else(|e| {
            tracing::error!(backend = %self.backend(), error = %e, "failed to list databases");
            Vec::new()
        })
    }
}

fn save<S, T>(store: &S, kind: SnapshotKind, db_name: &str, value: &T) -> bool
where
    S: MetadataStore + ?Sized,
    T: Serialize + ?Sized,
{
    let result = serde_json::to_string_pretty(value)
        .context("Failed to serialize snapshot")
        .and_then(|payload| store.append_snapshot(kind, db_name, Utc::now(), &payload));

    match result {
        Ok(()) => {
            tracing::info!(kind = kind.file_prefix(), db_name, "saved snapshot");
            true
        }
        Err(e) => {
            tracing::error!(kind = kind.file_prefix(), db_name, error = %format!("{:#}", e), "failed to save snapshot");
            false
        }
    }
}

fn load<S, T>(store: &S, kind: SnapshotKind, db_name: &str) -> Option<T>
where
    S: MetadataStore + ?Sized,
    T: DeserializeOwned,
{
    let result = store.latest_snapshot(kind, db_name).and_then(|payload| {
        payload
            .map(|p| serde_json::from_str(&p).context("Failed to parse stored snapshot"))
            .transpose()
    });

    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(kind = kind.file_prefix(), db_name, error = %format!("{:#}", e), "failed to load snapshot");
            None
        }
    }
}

/// Opens the backend selected by `config`
pub fn open_store(config: &StorageConfig) -> Result<Box<dyn MetadataStore>> {
    let store: Box<dyn MetadataStore> = match config.backend {
        StorageBackend::Sqlite => Box::new(SqliteMetadataStore::open(&config.base_dir)?),
        StorageBackend::Json => Box::new(JsonMetadataStore::open(&config.base_dir)?),
    };
    tracing::debug!(backend = %config.backend, dir = %config.base_dir.display(), "opened metadata store");
    Ok(store)
}
