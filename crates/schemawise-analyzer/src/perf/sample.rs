use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SEQ_SCAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Seq Scan on (\S+)").expect("valid regex"));
static INDEX_SCAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Index Scan using (\S+)").expect("valid regex"));
static PLANNING_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Planning Time: ([0-9.]+)").expect("valid regex"));
static EXECUTION_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Execution Time: ([0-9.]+)").expect("valid regex"));
static SQLITE_INDEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"USING (?:COVERING )?INDEX (\S+)").expect("valid regex")
});
static TABLE_ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:FROM|JOIN)\s+([A-Za-z0-9_]+)(?:\s+AS)?\s+([A-Za-z_][A-Za-z0-9_]*)")
        .expect("valid regex")
});

/// Words that can follow a table reference without being its alias
const CLAUSE_KEYWORDS: &[&str] = &[
    "AS", "WHERE", "ON", "USING", "JOIN", "INNER", "LEFT", "RIGHT", "FULL", "CROSS", "OUTER",
    "NATURAL", "GROUP", "ORDER", "LIMIT", "OFFSET", "HAVING", "WINDOW", "UNION", "EXCEPT",
    "INTERSECT", "INDEXED", "NOT", "SET", "VALUES", "RETURNING",
];

/// SQL dialect, used to pick the EXPLAIN syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplainDialect {
    Postgres,
    MySql,
    Sqlite,
    Generic,
}

impl ExplainDialect {
    /// Guesses the dialect from a connection URL
    pub fn from_url(url: &str) -> Self {
        let url = url.to_lowercase();
        if url.contains("postgres") {
            Self::Postgres
        } else if url.contains("mysql") {
            Self::MySql
        } else if url.contains("sqlite") {
            Self::Sqlite
        } else {
            Self::Generic
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgresql",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for ExplainDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the EXPLAIN statement for `query` in the given dialect
pub fn explain_command(dialect: ExplainDialect, query: &str, analyze: bool) -> String {
    match dialect {
        ExplainDialect::Postgres => {
            let options = if analyze { "ANALYZE, BUFFERS" } else { "BUFFERS" };
            format!("EXPLAIN ({}) {}", options, query)
        }
        ExplainDialect::MySql if analyze => format!("EXPLAIN ANALYZE {}", query),
        ExplainDialect::MySql => format!("EXPLAIN {}", query),
        ExplainDialect::Sqlite => format!("EXPLAIN QUERY PLAN {}", query),
        ExplainDialect::Generic => format!("EXPLAIN {}", query),
    }
}

/// Performance signals extracted from one EXPLAIN run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerfSample {
    pub query: String,
    /// Tables read with a full/sequential scan
    pub sequential_scans: Vec<String>,
    /// Indexes used for index scans
    pub index_scans: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planning_time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<f64>,
    pub hash_joins: u32,
    pub merge_joins: u32,
    pub scan_operations: u32,
    pub search_operations: u32,
}

impl PerfSample {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Marks `table` as sequentially scanned
    pub fn with_sequential_scan(mut self, table: impl Into<String>) -> Self {
        self.sequential_scans.push(table.into());
        self
    }

    pub fn with_index_scan(mut self, index: impl Into<String>) -> Self {
        self.index_scans.push(index.into());
        self
    }

    pub fn with_execution_time(mut self, ms: f64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Parses PostgreSQL text-format EXPLAIN output
    pub fn from_postgres_explain(query: impl Into<String>, output: &str) -> Self {
        let mut sample = Self::new(query);

        sample.planning_time_ms = capture_f64(&PLANNING_TIME_RE, output);
        sample.execution_time_ms = capture_f64(&EXECUTION_TIME_RE, output);
        sample.sequential_scans = capture_all(&SEQ_SCAN_RE, output);
        sample.index_scans = capture_all(&INDEX_SCAN_RE, output);
        sample.hash_joins = output.matches("Hash Join").count() as u32;
        sample.merge_joins = output.matches("Merge Join").count() as u32;
        sample.scan_operations = (sample.sequential_scans.len() + sample.index_scans.len()) as u32;

        sample
    }

    /// Parses SQLite `EXPLAIN QUERY PLAN` detail strings
    ///
    /// `SCAN t` without an index is a sequential scan of `t`; `SEARCH` rows are
    /// index lookups. SQLite names aliased tables by their alias, so aliases
    /// declared in the query are mapped back to table names.
    pub fn from_sqlite_plan<I, S>(query: impl Into<String>, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let query = query.into();
        let aliases = table_aliases(&query);
        let mut sample = Self::new(query);

        for detail in details {
            let detail = detail.as_ref().trim();
            let index = SQLITE_INDEX_RE
                .captures(detail)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string());

            if detail.contains("SCAN") {
                sample.scan_operations += 1;
                match (&index, sqlite_scan_target(detail)) {
                    (None, Some(target)) => {
                        let table = aliases.get(&target).cloned().unwrap_or(target);
                        sample.sequential_scans.push(table);
                    }
                    (Some(index), _) => sample.index_scans.push(index.clone()),
                    (None, None) => {}
                }
            }
            if detail.contains("SEARCH") {
                sample.search_operations += 1;
                if let Some(index) = index {
                    sample.index_scans.push(index);
                }
            }
        }

        sample
    }

    /// Heuristic cost in [0, 100]; lower is better
    pub fn performance_score(&self) -> u8 {
        let mut score: i64 = 50;

        if let Some(ms) = self.execution_time_ms {
            if ms < 10.0 {
                score -= 20;
            } else if ms < 50.0 {
                score -= 10;
            } else if ms > 500.0 {
                score += 30;
            }
        }

        score += self.sequential_scans.len() as i64 * 15;
        score -= self.index_scans.len() as i64 * 10;
        score += self.hash_joins as i64 * 5;
        score -= self.merge_joins as i64 * 5;

        score.clamp(0, 100) as u8
    }

    pub fn has_sequential_scans(&self) -> bool {
        !self.sequential_scans.is_empty()
    }
}

fn capture_f64(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn capture_all(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// alias -> table for every `FROM|JOIN <table> [AS] <alias>` in the query
fn table_aliases(query: &str) -> HashMap<String, String> {
    TABLE_ALIAS_RE
        .captures_iter(query)
        .filter_map(|c| {
            let table = c.get(1)?.as_str();
            let alias = c.get(2)?.as_str();
            let is_keyword = CLAUSE_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(alias));
            (!is_keyword && alias != table).then(|| (alias.to_string(), table.to_string()))
        })
        .collect()
}

/// Table named by a `SCAN [TABLE] name` step
fn sqlite_scan_target(detail: &str) -> Option<String> {
    let mut words = detail.split_whitespace().skip_while(|w| *w != "SCAN").skip(1);
    let mut target = words.next()?;
    if target == "TABLE" {
        target = words.next()?;
    }
    match target {
        "CONSTANT" | "SUBQUERY" => None,
        name => Some(name.to_string()),
    }
}
