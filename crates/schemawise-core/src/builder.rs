//! Schema Model Builder
//!
//! Turns raw introspection results into a canonical [`Schema`]. All
//! validation happens here, once, so the analysis stages never have to
//! re-check table or column existence.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::{Result, Schema, SchemawiseError, TableDef};

/// Literal some introspection layers emit for "no default"
const NO_DEFAULT_SENTINEL: &str = "None";

/// Accumulates tables and produces a validated [`Schema`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    tables: Vec<(String, TableDef)>,
}

impl SchemaBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a table; validation is deferred to [`SchemaBuilder::build`]
    pub fn add_table(mut self, name: impl Into<String>, table: TableDef) -> Self {
        self.tables.push((name.into(), table));
        self
    }

    /// Number of queued tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Validates and normalizes every queued table
    pub fn build(self) -> Result<Schema> {
        let mut tables = IndexMap::with_capacity(self.tables.len());

        for (name, table) in self.tables {
            if name.trim().is_empty() {
                return Err(SchemawiseError::InvalidSchema(
                    "table name must not be empty".to_string(),
                ));
            }
            if tables.contains_key(&name) {
                return Err(SchemawiseError::InvalidSchema(format!(
                    "duplicate table '{}'",
                    name
                )));
            }

            let table = normalize_table(&name, table)?;
            tables.insert(name, table);
        }

        tracing::debug!(tables = tables.len(), "schema model built");
        Ok(Schema { tables })
    }
}

fn normalize_table(name: &str, mut table: TableDef) -> Result<TableDef> {
    let mut seen = HashSet::with_capacity(table.columns.len());
    for column in &table.columns {
        if column.name.trim().is_empty() {
            return Err(SchemawiseError::InvalidSchema(format!(
                "table '{}' has a column with an empty name",
                name
            )));
        }
        if !seen.insert(column.name.as_str()) {
            return Err(SchemawiseError::InvalidSchema(format!(
                "table '{}' declares column '{}' more than once",
                name, column.name
            )));
        }
    }

    // Key spec and column flags must agree in both directions.
    if table.primary_key.is_empty() {
        table.primary_key.constrained_columns = table
            .columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect();
    }
    let pk: HashSet<String> = table
        .primary_key
        .constrained_columns
        .iter()
        .cloned()
        .collect();
    for column in &mut table.columns {
        if pk.contains(&column.name) {
            column.is_primary_key = true;
        }
        if column
            .default
            .as_deref()
            .is_some_and(|d| d.trim().is_empty() || d == NO_DEFAULT_SENTINEL)
        {
            column.default = None;
        }
    }

    for fk in &table.foreign_keys {
        if fk.constrained_columns.len() != fk.referred_columns.len() {
            tracing::warn!(
                table = %name,
                referred_table = %fk.referred_table,
                constrained = fk.constrained_columns.len(),
                referred = fk.referred_columns.len(),
                "foreign key column lists differ in length; extra columns are ignored"
            );
        }
    }

    table.column_count = table.columns.len();
    Ok(table)
}
