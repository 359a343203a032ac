use schemawise_analyzer::Action;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a recommendation cannot be turned into statements
///
/// These are expected outcomes, carried inside [`SqlPlan::error`] rather than
/// returned as `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum PlanError {
    /// Unknown table, or fields the action needs are missing
    #[error("Invalid recommendation: {0}")]
    InvalidRecommendation(String),
    /// No foreign key path between the table and any related table
    #[error("Could not determine join relationships between {0}")]
    UnresolvableRelationship(String),
    #[error("No suitable date/time column found for partitioning")]
    NoPartitionKey,
}

/// Kind of generated statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    View,
    Materialized,
    CreateTable,
    AlterTable,
    DataMigration,
    Index,
    Partition,
}

impl StatementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Materialized => "materialized",
            Self::CreateTable => "create_table",
            Self::AlterTable => "alter_table",
            Self::DataMigration => "data_migration",
            Self::Index => "index",
            Self::Partition => "partition",
        }
    }
}

/// One generated SQL statement (or script)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanStatement {
    #[serde(rename = "type")]
    pub kind: StatementKind,
    pub name: String,
    pub sql: String,
    /// Tables touched by a data migration
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<String>,
}

impl PlanStatement {
    pub fn new(kind: StatementKind, name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            sql: sql.into(),
            tables: Vec::new(),
        }
    }

    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }
}

/// Concrete SQL implementing one recommendation
///
/// A plan with an `error` never carries statements or an explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlPlan {
    pub table: String,
    pub action: Action,
    #[serde(default)]
    pub statements: Vec<PlanStatement>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub caution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<PlanError>,
}

impl SqlPlan {
    /// Creates an empty plan with the given caution
    pub fn new(table: impl Into<String>, action: Action, caution: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            action,
            statements: Vec::new(),
            explanation: String::new(),
            caution: caution.into(),
            error: None,
        }
    }

    /// Creates a plan that only carries an error
    pub fn failed(table: impl Into<String>, action: Action, error: PlanError) -> Self {
        Self {
            table: table.into(),
            action,
            statements: Vec::new(),
            explanation: String::new(),
            caution: String::new(),
            error: Some(error),
        }
    }

    pub fn push(&mut self, statement: PlanStatement) {
        self.statements.push(statement);
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// True when the plan has statements and no error
    pub fn is_actionable(&self) -> bool {
        self.error.is_none() && !self.statements.is_empty()
    }

    /// All statements joined into one script
    pub fn script(&self) -> String {
        self.statements
            .iter()
            .map(|s| s.sql.trim_end())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
