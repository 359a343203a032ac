//! Canonical schema model
//!
//! A [`Schema`] is an immutable snapshot of a database's structure: tables in
//! introspection order, each with ordered columns, a primary key, foreign keys
//! and indexes. Snapshots are only produced through [`SchemaBuilder`], so
//! downstream analysis can rely on the invariants it enforces (unique table
//! names, unique column names, consistent primary key flags, accurate
//! `column_count`).
//!
//! The serialized form is the introspection shape used by schema files:
//!
//! ```json
//! {
//!   "orders": {
//!     "columns": [{"name": "id", "type": "INTEGER", "nullable": false, "default": null, "is_primary_key": true}],
//!     "primary_key": {"name": "orders_pkey", "constrained_columns": ["id"]},
//!     "foreign_keys": [{"name": null, "constrained_columns": ["user_id"], "referred_table": "users", "referred_columns": ["id"]}],
//!     "indexes": [{"name": "idx_orders_user", "column_names": ["user_id"], "unique": false}],
//!     "column_count": 1
//!   }
//! }
//! ```

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Result, SchemaBuilder, SchemawiseError};

/// Structural snapshot of a database, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "IndexMap<String, TableDef>")]
pub struct Schema {
    pub(crate) tables: IndexMap<String, TableDef>,
}

impl Schema {
    /// Creates an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a schema file, running the builder's validation
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the schema in the introspection file shape
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Looks up a table by name
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    /// Returns true if the schema defines the table
    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Iterates over tables in introspection order
    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableDef)> {
        self.tables.iter().map(|(name, table)| (name.as_str(), table))
    }

    /// Table names in introspection order
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the schema has no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.tables.serialize(serializer)
    }
}

impl TryFrom<IndexMap<String, TableDef>> for Schema {
    type Error = SchemawiseError;

    fn try_from(raw: IndexMap<String, TableDef>) -> Result<Self> {
        raw.into_iter()
            .fold(SchemaBuilder::new(), |builder, (name, table)| {
                builder.add_table(name, table)
            })
            .build()
    }
}

/// Table definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    /// Columns in declaration order
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    #[serde(default)]
    pub primary_key: PrimaryKeyDef,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDef>,
    #[serde(default)]
    pub indexes: Vec<IndexDef>,
    /// Always equal to `columns.len()` once built
    #[serde(default)]
    pub column_count: usize,
}

impl TableDef {
    /// Creates an empty table definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column
    pub fn with_column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self.column_count = self.columns.len();
        self
    }

    /// Sets the primary key columns
    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key.constrained_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a foreign key
    pub fn with_foreign_key(mut self, foreign_key: ForeignKeyDef) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    /// Appends an index
    pub fn with_index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    /// Looks up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn index_count(&self) -> usize {
        self.indexes.len()
    }

    pub fn foreign_key_count(&self) -> usize {
        self.foreign_keys.len()
    }

    /// Columns that belong to the primary key, from either the key spec or
    /// the per-column flag.
    pub fn primary_key_columns(&self) -> HashSet<&str> {
        self.primary_key
            .constrained_columns
            .iter()
            .map(String::as_str)
            .chain(
                self.columns
                    .iter()
                    .filter(|c| c.is_primary_key)
                    .map(|c| c.name.as_str()),
            )
            .collect()
    }

    /// Every column that appears in at least one existing index
    pub fn indexed_columns(&self) -> HashSet<&str> {
        self.indexes
            .iter()
            .flat_map(|idx| idx.column_names.iter().map(String::as_str))
            .collect()
    }

    /// Foreign keys on this table that point at `table`
    pub fn foreign_keys_to<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = &'a ForeignKeyDef> + 'a {
        self.foreign_keys
            .iter()
            .filter(move |fk| fk.referred_table == table)
    }

    /// Date/time columns in declaration order
    pub fn temporal_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.columns.iter().filter(|c| c.is_temporal())
    }

    /// Returns true if any column has a date/time type
    pub fn has_temporal_column(&self) -> bool {
        self.temporal_columns().next().is_some()
    }

    /// First date/time column in declaration order
    pub fn first_temporal_column(&self) -> Option<&ColumnDef> {
        self.temporal_columns().next()
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    /// Declared type exactly as the database reports it
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub is_primary_key: bool,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDef {
    /// Creates a nullable column without a default
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            default: None,
            is_primary_key: false,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Marks the column as part of the primary key (and NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    /// Date/time heuristic: the declared type textually contains "date" or "time"
    pub fn is_temporal(&self) -> bool {
        let ty = self.data_type.to_lowercase();
        ty.contains("date") || ty.contains("time")
    }

    /// Character heuristic: the declared type textually contains "char"
    pub fn is_character(&self) -> bool {
        self.data_type.to_lowercase().contains("char")
    }
}

/// Primary key constraint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKeyDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub constrained_columns: Vec<String>,
}

impl PrimaryKeyDef {
    pub fn is_empty(&self) -> bool {
        self.constrained_columns.is_empty()
    }
}

/// Foreign key constraint
///
/// `referred_table` may name a table that is absent from the schema; such
/// dangling references are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub constrained_columns: Vec<String>,
    pub referred_table: String,
    #[serde(default)]
    pub referred_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_schema: Option<String>,
}

impl ForeignKeyDef {
    /// Creates a single-column foreign key
    pub fn new(
        column: impl Into<String>,
        referred_table: impl Into<String>,
        referred_column: impl Into<String>,
    ) -> Self {
        Self {
            name: None,
            constrained_columns: vec![column.into()],
            referred_table: referred_table.into(),
            referred_columns: vec![referred_column.into()],
            referred_schema: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// (constrained, referred) column pairs; extra columns on either side are ignored
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.constrained_columns
            .iter()
            .zip(self.referred_columns.iter())
            .map(|(c, r)| (c.as_str(), r.as_str()))
    }

    /// Returns true if the key names at least one column on both sides
    pub fn is_resolvable(&self) -> bool {
        !self.constrained_columns.is_empty() && !self.referred_columns.is_empty()
    }
}

/// Index definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDef {
    #[serde(default)]
    pub name: String,
    /// Expression entries reported as `null` by introspection are dropped
    #[serde(default, deserialize_with = "non_null_strings")]
    pub column_names: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

impl IndexDef {
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            column_names: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

fn non_null_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Option<String>> = Deserialize::deserialize(deserializer)?;
    Ok(raw.into_iter().flatten().collect())
}
