//! Query Log Analyzer
//!
//! Each retained line is classified independently: a line may count as a
//! SELECT and a JOIN at the same time. Table references are pulled from
//! `FROM` / `JOIN` / `INTO` / `UPDATE` anchors.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use schemawise_core::Result;
use serde::{Deserialize, Serialize};

use super::LogSource;

static JOIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bJOIN\b").expect("valid regex"));
static SELECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bSELECT\b").expect("valid regex"));
static INSERT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bINSERT\b").expect("valid regex"));
static UPDATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bUPDATE\b").expect("valid regex"));
static DELETE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bDELETE\b").expect("valid regex"));
static LEFT_JOIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bLEFT\s+(?:OUTER\s+)?JOIN\b").expect("valid regex"));
static RIGHT_JOIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bRIGHT\s+(?:OUTER\s+)?JOIN\b").expect("valid regex"));
static TABLE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:FROM|JOIN|INTO|UPDATE)\s+([A-Za-z0-9_]+)").expect("valid regex")
});

/// Statement counts by category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCounts {
    pub select: u64,
    pub insert: u64,
    pub update: u64,
    pub delete: u64,
    /// Retained lines, not the sum of the categories
    pub total: u64,
}

impl QueryCounts {
    /// INSERT + UPDATE + DELETE
    pub fn write_count(&self) -> u64 {
        self.insert + self.update + self.delete
    }
}

/// Join lines bucketed by modifier; every join line lands in exactly one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinAnalysis {
    #[serde(rename = "total_joins")]
    pub total: u64,
    #[serde(rename = "inner_joins")]
    pub inner: u64,
    #[serde(rename = "left_joins")]
    pub left: u64,
    #[serde(rename = "right_joins")]
    pub right: u64,
}

/// Sample lines per category, capped for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryExamples {
    #[serde(default)]
    pub joins: Vec<String>,
    #[serde(default)]
    pub selects: Vec<String>,
    #[serde(default)]
    pub inserts: Vec<String>,
    #[serde(default)]
    pub updates: Vec<String>,
    #[serde(default)]
    pub deletes: Vec<String>,
}

/// Classified workload statistics for one log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryStatistics {
    #[serde(rename = "query_counts")]
    pub counts: QueryCounts,
    pub join_analysis: JoinAnalysis,
    /// Table reference counts in first-seen order
    pub table_access: IndexMap<String, u64>,
    pub read_write_ratio: f64,
    #[serde(default)]
    pub examples: QueryExamples,
}

impl QueryStatistics {
    /// select / max(writes, 1)
    pub fn compute_read_write_ratio(counts: &QueryCounts) -> f64 {
        counts.select as f64 / counts.write_count().max(1) as f64
    }

    /// Access count for a table, zero if never referenced
    pub fn access_count(&self, table: &str) -> u64 {
        self.table_access.get(table).copied().unwrap_or(0)
    }

    /// Tables ordered by access count, most accessed first
    pub fn most_accessed(&self) -> Vec<(&str, u64)> {
        let mut tables: Vec<_> = self
            .table_access
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        tables.sort_by(|a, b| b.1.cmp(&a.1));
        tables
    }
}

/// Configuration for the query log analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogAnalyzerConfig {
    /// Lines starting with any of these (after trimming) are ignored
    pub comment_prefixes: Vec<String>,
    /// Maximum sample lines kept per category
    pub sample_cap: usize,
}

impl Default for LogAnalyzerConfig {
    fn default() -> Self {
        Self {
            comment_prefixes: vec!["--".to_string()],
            sample_cap: 5,
        }
    }
}

impl LogAnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the comment prefixes
    pub fn with_comment_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.comment_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the per-category sample cap
    pub fn with_sample_cap(mut self, cap: usize) -> Self {
        self.sample_cap = cap;
        self
    }
}

/// Classifies statement logs into [`QueryStatistics`]
#[derive(Debug, Clone, Default)]
pub struct QueryLogAnalyzer {
    config: LogAnalyzerConfig,
}

impl QueryLogAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LogAnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LogAnalyzerConfig {
        &self.config
    }

    /// Reads `location` through `source` and analyzes it
    pub fn analyze_log(&self, source: &dyn LogSource, location: &str) -> Result<QueryStatistics> {
        let lines = source.read_lines(location)?;
        Ok(self.analyze_lines(lines))
    }

    /// Analyzes in-memory lines
    pub fn analyze_lines<I, S>(&self, lines: I) -> QueryStatistics
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cap = self.config.sample_cap;
        let mut stats = QueryStatistics::default();

        for raw in lines {
            let line = raw.as_ref().trim();
            if line.is_empty() || self.is_comment(line) {
                continue;
            }
            stats.counts.total += 1;

            if JOIN_RE.is_match(line) {
                stats.join_analysis.total += 1;
                if LEFT_JOIN_RE.is_match(line) {
                    stats.join_analysis.left += 1;
                } else if RIGHT_JOIN_RE.is_match(line) {
                    stats.join_analysis.right += 1;
                } else {
                    stats.join_analysis.inner += 1;
                }
                push_capped(&mut stats.examples.joins, line, cap);
            }
            if SELECT_RE.is_match(line) {
                stats.counts.select += 1;
                push_capped(&mut stats.examples.selects, line, cap);
            }
            if INSERT_RE.is_match(line) {
                stats.counts.insert += 1;
                push_capped(&mut stats.examples.inserts, line, cap);
            }
            if UPDATE_RE.is_match(line) {
                stats.counts.update += 1;
                push_capped(&mut stats.examples.updates, line, cap);
            }
            if DELETE_RE.is_match(line) {
                stats.counts.delete += 1;
                push_capped(&mut stats.examples.deletes, line, cap);
            }

            for capture in TABLE_REF_RE.captures_iter(line) {
                if let Some(table) = capture.get(1) {
                    *stats
                        .table_access
                        .entry(table.as_str().to_string())
                        .or_insert(0) += 1;
                }
            }
        }

        stats.read_write_ratio = QueryStatistics::compute_read_write_ratio(&stats.counts);

        tracing::info!(
            queries = stats.counts.total,
            joins = stats.join_analysis.total,
            tables = stats.table_access.len(),
            "analyzed query log"
        );
        stats
    }

    fn is_comment(&self, line: &str) -> bool {
        self.config
            .comment_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && line.starts_with(prefix.as_str()))
    }
}

fn push_capped(samples: &mut Vec<String>, line: &str, cap: usize) {
    if samples.len() < cap {
        samples.push(line.to_string());
    }
}
