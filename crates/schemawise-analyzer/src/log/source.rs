//! Log sources

use std::path::Path;

use schemawise_core::{Result, SchemawiseError};

/// Supplies raw log lines for a location
pub trait LogSource: Send + Sync {
    /// Reads every line at `location`; a missing or unreadable location is
    /// [`SchemawiseError::InputNotFound`]
    fn read_lines(&self, location: &str) -> Result<Vec<String>>;
}

/// Reads statement logs from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLogSource;

impl FileLogSource {
    pub fn new() -> Self {
        Self
    }
}

impl LogSource for FileLogSource {
    fn read_lines(&self, location: &str) -> Result<Vec<String>> {
        let path = Path::new(location);
        let bytes = std::fs::read(path).map_err(|e| {
            tracing::error!(path = %location, error = %e, "log file unreadable");
            SchemawiseError::InputNotFound(format!("cannot read log file {}: {}", location, e))
        })?;

        // Stray non-UTF-8 bytes only damage the lines they sit on.
        let contents = String::from_utf8_lossy(&bytes);
        Ok(contents.lines().map(str::to_string).collect())
    }
}
