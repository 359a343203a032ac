use std::fmt;
use std::str::FromStr;

use schemawise_core::SchemawiseError;
use serde::{Deserialize, Serialize};

/// Kind of schema change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Denormalize,
    Normalize,
    Index,
    Partition,
}

impl Action {
    /// All actions in rule-pass order
    pub const ALL: [Action; 4] = [
        Action::Denormalize,
        Action::Normalize,
        Action::Index,
        Action::Partition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Denormalize => "DENORMALIZE",
            Self::Normalize => "NORMALIZE",
            Self::Index => "INDEX",
            Self::Partition => "PARTITION",
        }
    }

    /// Lowercase form used in file names
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Denormalize => "denormalize",
            Self::Normalize => "normalize",
            Self::Index => "index",
            Self::Partition => "partition",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = SchemawiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SchemawiseError::ParameterValidation(format!("unknown action '{}'", s)))
    }
}

/// A proposed schema change with its confidence and rationale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub table: String,
    pub action: Action,
    /// Integer in [0, 100]
    pub confidence: u8,
    pub reason: String,
    /// Tables to fold in (DENORMALIZE)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_tables: Vec<String>,
    /// Query that exposed a sequential scan (INDEX)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_query: Option<String>,
    /// Date/time column that made the table eligible (PARTITION)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_column: Option<String>,
}

impl Recommendation {
    pub fn new(
        table: impl Into<String>,
        action: Action,
        confidence: u8,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            action,
            confidence: confidence.min(100),
            reason: reason.into(),
            related_tables: Vec::new(),
            source_query: None,
            partition_column: None,
        }
    }

    pub fn with_related_tables(mut self, tables: Vec<String>) -> Self {
        self.related_tables = tables;
        self
    }

    pub fn with_source_query(mut self, query: impl Into<String>) -> Self {
        self.source_query = Some(query.into());
        self
    }

    pub fn with_partition_column(mut self, column: impl Into<String>) -> Self {
        self.partition_column = Some(column.into());
        self
    }
}
