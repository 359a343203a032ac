use schemawise_analyzer::{ExplainDialect, PerfSample, explain_command};
use schemawise_core::{Result, SchemawiseError};

use crate::open_existing;

/// Runs `EXPLAIN QUERY PLAN` for `query` and summarizes the plan
#[tracing::instrument(skip(query))]
pub fn explain_sqlite(path: &str, query: &str) -> Result<PerfSample> {
    let conn = open_existing(path)?;
    let sql = explain_command(ExplainDialect::Sqlite, query, false);

    let read = || -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare(&sql)?;
        let details = stmt.query_map([], |row| row.get::<_, String>(3))?;
        details.collect()
    };
    let details =
        read().map_err(|e| SchemawiseError::Other(format!("Failed to explain query: {}", e)))?;

    tracing::debug!(steps = details.len(), "query plan read");
    Ok(PerfSample::from_sqlite_plan(query, details))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn fixture() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("explain.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch(
                "CREATE TABLE orders (id INTEGER PRIMARY KEY, status TEXT, total REAL);
                 CREATE INDEX idx_orders_status ON orders (status);",
            )
            .unwrap();
        let path = path.to_str().unwrap().to_string();
        (dir, path)
    }

    #[test]
    fn test_full_scan_is_sequential() {
        let (_dir, path) = fixture();

        let sample = explain_sqlite(&path, "SELECT * FROM orders WHERE total > 10").unwrap();

        assert_eq!(sample.sequential_scans, vec!["orders".to_string()]);
        assert!(sample.has_sequential_scans());
        assert_eq!(sample.query, "SELECT * FROM orders WHERE total > 10");
    }

    #[test]
    fn test_indexed_lookup() {
        let (_dir, path) = fixture();

        let sample = explain_sqlite(&path, "SELECT * FROM orders WHERE status = 'open'").unwrap();

        assert!(sample.sequential_scans.is_empty());
        assert_eq!(sample.search_operations, 1);
        assert_eq!(sample.index_scans, vec!["idx_orders_status".to_string()]);
    }

    #[test]
    fn test_aliased_scan_reports_table_name() {
        let (_dir, path) = fixture();

        for query in [
            "SELECT * FROM orders o WHERE o.total > 10",
            "SELECT * FROM orders AS o WHERE o.total > 10",
        ] {
            let sample = explain_sqlite(&path, query).unwrap();
            assert_eq!(sample.sequential_scans, vec!["orders".to_string()], "{}", query);
        }
    }

    #[test]
    fn test_invalid_query() {
        let (_dir, path) = fixture();
        assert!(explain_sqlite(&path, "SELECT * FROM missing").is_err());
    }
}
