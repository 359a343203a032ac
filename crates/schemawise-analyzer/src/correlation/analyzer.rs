//! Correlation Analyzer
//!
//! Blends a [`Schema`] with [`QueryStatistics`] into per-table
//! [`TableMetrics`]. Only tables that are both referenced by the workload and
//! defined in the schema get metrics.
//!
//! `join_count` is approximated from the captured join samples rather than
//! the full log, so it is bounded by the sample cap.

use indexmap::IndexMap;
use schemawise_core::{Schema, TableDef};
use serde::{Deserialize, Serialize};

use crate::QueryStatistics;

/// Upper bound of the normalization score
pub const MAX_NORMALIZATION_SCORE: f64 = 10.0;

/// Derived statistics for one table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableMetrics {
    pub access_count: u64,
    pub column_count: usize,
    pub index_count: usize,
    pub foreign_key_count: usize,
    /// Number of sampled join lines mentioning the table
    #[serde(default)]
    pub join_count: u32,
    /// Higher means more normalized; never above 10
    pub normalization_score: f64,
    /// Workload-wide read/write ratio
    pub read_write_ratio: f64,
}

impl TableMetrics {
    /// Structural metrics for `table`; workload-derived fields start at zero
    pub fn from_table(table: &TableDef, access_count: u64, read_write_ratio: f64) -> Self {
        Self {
            access_count,
            column_count: table.column_count,
            index_count: table.index_count(),
            foreign_key_count: table.foreign_key_count(),
            join_count: 0,
            normalization_score: normalization_score(table),
            read_write_ratio,
        }
    }
}

/// min(10, 2 * foreign keys + indexes - columns / 10)
pub fn normalization_score(table: &TableDef) -> f64 {
    let raw = (table.foreign_key_count() * 2) as f64 + table.index_count() as f64
        - table.column_count as f64 / 10.0;
    raw.min(MAX_NORMALIZATION_SCORE)
}

/// Share of the sampled joins attributable to one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinPattern {
    pub table: String,
    pub join_frequency: u32,
    /// join_frequency / max(total_joins, 1) * 100
    pub percentage: f64,
}

/// Output of the correlation stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationReport {
    pub table_metrics: IndexMap<String, TableMetrics>,
    pub join_patterns: Vec<JoinPattern>,
    pub normalized_scores: IndexMap<String, f64>,
}

impl CorrelationReport {
    pub fn metrics(&self, table: &str) -> Option<&TableMetrics> {
        self.table_metrics.get(table)
    }
}

/// Combines schema structure with workload statistics
#[derive(Debug, Clone)]
pub struct CorrelationAnalyzer {
    join_sample_cap: usize,
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self { join_sample_cap: 5 }
    }
}

impl CorrelationAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits how many captured join lines are scanned for table mentions
    pub fn with_join_sample_cap(mut self, cap: usize) -> Self {
        self.join_sample_cap = cap;
        self
    }

    pub fn join_sample_cap(&self) -> usize {
        self.join_sample_cap
    }

    /// Builds per-table metrics and join patterns
    pub fn analyze(&self, schema: &Schema, stats: &QueryStatistics) -> CorrelationReport {
        let mut report = CorrelationReport::default();

        for (name, access_count) in &stats.table_access {
            let Some(table) = schema.table(name) else {
                tracing::debug!(table = %name, "referenced table not in schema");
                continue;
            };
            let metrics = TableMetrics::from_table(table, *access_count, stats.read_write_ratio);
            report
                .normalized_scores
                .insert(name.clone(), metrics.normalization_score);
            report.table_metrics.insert(name.clone(), metrics);
        }

        let mut mentions: IndexMap<&str, u32> = IndexMap::new();
        for line in stats.examples.joins.iter().take(self.join_sample_cap) {
            for table in schema.table_names() {
                if mentions_table(line, table) {
                    *mentions.entry(table).or_insert(0) += 1;
                }
            }
        }

        let total_joins = stats.join_analysis.total.max(1) as f64;
        for (table, count) in mentions {
            if let Some(metrics) = report.table_metrics.get_mut(table) {
                metrics.join_count = count;
                report.join_patterns.push(JoinPattern {
                    table: table.to_string(),
                    join_frequency: count,
                    percentage: count as f64 / total_joins * 100.0,
                });
            }
        }

        tracing::info!(
            tables = report.table_metrics.len(),
            join_patterns = report.join_patterns.len(),
            "correlated workload with schema"
        );
        report
    }
}

/// Case-insensitive whole-word search for `table` in `line`
fn mentions_table(line: &str, table: &str) -> bool {
    if table.is_empty() {
        return false;
    }
    let haystack = line.to_lowercase();
    let needle = table.to_lowercase();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    haystack.match_indices(&needle).any(|(start, _)| {
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}

#[cfg(test)]
mod tests;
