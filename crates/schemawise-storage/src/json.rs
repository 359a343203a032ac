//! JSON-file persistence for metadata snapshots
//!
//! Layout: `<base>/<db_name>/<kind>_<timestamp>.json`. Timestamps sort
//! lexicographically, so the greatest file name is the latest snapshot.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};

use crate::{MetadataStore, SnapshotKind, StorageBackend};

const MAX_NAME_ATTEMPTS: usize = 100;

/// Snapshot storage as individual JSON files
#[derive(Debug, Clone)]
pub struct JsonMetadataStore {
    base_dir: PathBuf,
}

impl JsonMetadataStore {
    /// Opens (creating if needed) the base directory
    pub fn open(base_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(base_dir)
            .with_context(|| format!("Failed to create directory {:?}", base_dir))?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn database_dir(&self, db_name: &str) -> Result<PathBuf> {
        validate_db_name(db_name)?;
        Ok(self.base_dir.join(db_name))
    }

    fn snapshot_files(dir: &Path, kind: SnapshotKind) -> Result<Vec<String>> {
        let prefix = format!("{}_", kind.file_prefix());
        let mut names = Vec::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(e).with_context(|| format!("Failed to read {:?}", dir)),
        };
        for entry in entries {
            let name = entry?.file_name().to_string_lossy().to_string();
            if name.starts_with(&prefix) && name.ends_with(".json") {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }
}

impl MetadataStore for JsonMetadataStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Json
    }

    #[tracing::instrument(skip(self, payload))]
    fn append_snapshot(
        &self,
        kind: SnapshotKind,
        db_name: &str,
        taken_at: DateTime<Utc>,
        payload: &str,
    ) -> Result<()> {
        let dir = self.database_dir(db_name)?;
        std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;

        let stamp = taken_at.format("%Y%m%dT%H%M%S%.6fZ").to_string();
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = match attempt {
                0 => format!("{}_{}.json", kind.file_prefix(), stamp),
                n => format!("{}_{}_{:02}.json", kind.file_prefix(), stamp, n),
            };
            let path = dir.join(file_name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(payload.as_bytes())
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e).with_context(|| format!("Failed to create {:?}", path)),
            }
        }

        bail!("Could not find a free snapshot file name in {:?}", dir)
    }

    #[tracing::instrument(skip(self))]
    fn latest_snapshot(&self, kind: SnapshotKind, db_name: &str) -> Result<Option<String>> {
        let dir = self.database_dir(db_name)?;
        let Some(latest) = Self::snapshot_files(&dir, kind)?.pop() else {
            return Ok(None);
        };

        let path = dir.join(latest);
        let payload =
            std::fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        Ok(Some(payload))
    }

    fn try_list_databases(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.base_dir)
            .with_context(|| format!("Failed to read {:?}", self.base_dir))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if !Self::snapshot_files(&entry.path(), SnapshotKind::Schema)?.is_empty() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }

        names.sort();
        Ok(names)
    }
}

/// Database names become directory names, so keep them to one plain path segment
fn validate_db_name(db_name: &str) -> Result<()> {
    let valid = !db_name.is_empty()
        && db_name != "."
        && db_name != ".."
        && db_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if !valid {
        bail!("Invalid database name {:?}", db_name);
    }
    Ok(())
}
