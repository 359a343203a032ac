//! SQLite schema introspection via the `pragma_*` table-valued functions

use async_trait::async_trait;
use indexmap::IndexMap;
use rusqlite::Connection;
use schemawise_core::{
    ColumnDef, ConnectionDescriptor, ForeignKeyDef, IndexDef, Result, Schema, SchemaBuilder,
    SchemaProvider, SchemawiseError, TableDef,
};

use crate::{open_existing, sqlite_path};

/// [`SchemaProvider`] for SQLite files
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteSchemaProvider;

impl SqliteSchemaProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SchemaProvider for SqliteSchemaProvider {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn accepts(&self, descriptor: &ConnectionDescriptor) -> bool {
        matches!(
            descriptor.scheme().as_deref(),
            None | Some("sqlite") | Some("sqlite3")
        )
    }

    #[tracing::instrument(skip(self), fields(descriptor = %descriptor))]
    async fn extract_schema(&self, descriptor: &ConnectionDescriptor) -> Result<Schema> {
        let path = sqlite_path(descriptor)?;
        let conn = open_existing(&path)?;
        let schema = introspect(&conn)?;
        tracing::info!(tables = schema.len(), "extracted SQLite schema");
        Ok(schema)
    }
}

/// Reads every user table of an open connection into a validated [`Schema`]
pub fn introspect(conn: &Connection) -> Result<Schema> {
    let mut builder = SchemaBuilder::new();

    for name in list_tables(conn)? {
        tracing::trace!(table = %name, "introspecting table");
        let (columns, primary_key) = table_columns(conn, &name)?;
        let mut table = TableDef::new().with_primary_key(primary_key);
        for column in columns {
            table = table.with_column(column);
        }
        for fk in foreign_keys(conn, &name)? {
            table = table.with_foreign_key(fk);
        }
        for index in indexes(conn, &name)? {
            table = table.with_index(index);
        }
        builder = builder.add_table(name, table);
    }

    builder.build()
}

fn pragma_error(what: &str, table: &str, e: rusqlite::Error) -> SchemawiseError {
    SchemawiseError::Introspection(format!("Failed to read {} for '{}': {}", what, table, e))
}

fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let read = || -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt.query_map([], |row| row.get(0))?;
        names.collect()
    };
    read().map_err(|e| SchemawiseError::Introspection(format!("Failed to list tables: {}", e)))
}

/// Columns in declaration order plus primary key columns in key order
fn table_columns(conn: &Connection, table: &str) -> Result<(Vec<ColumnDef>, Vec<String>)> {
    let read = || -> rusqlite::Result<Vec<(ColumnDef, i64)>> {
        let mut stmt = conn.prepare(
            "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid",
        )?;
        let rows = stmt.query_map([table], |row| {
            let name: String = row.get(0)?;
            let data_type: String = row.get(1)?;
            let not_null: i64 = row.get(2)?;
            let default: Option<String> = row.get(3)?;
            let pk_position: i64 = row.get(4)?;

            let mut column = ColumnDef::new(name, data_type).with_nullable(not_null == 0);
            column.default = default;
            Ok((column, pk_position))
        })?;
        rows.collect()
    };
    let rows = read().map_err(|e| pragma_error("columns", table, e))?;

    let mut keyed: Vec<(i64, String)> = rows
        .iter()
        .filter(|(_, pk)| *pk > 0)
        .map(|(c, pk)| (*pk, c.name.clone()))
        .collect();
    keyed.sort_by_key(|(pk, _)| *pk);
    let primary_key = keyed.into_iter().map(|(_, name)| name).collect();

    Ok((rows.into_iter().map(|(c, _)| c).collect(), primary_key))
}

fn indexes(conn: &Connection, table: &str) -> Result<Vec<IndexDef>> {
    let read = || -> rusqlite::Result<Vec<IndexDef>> {
        let mut list = conn.prepare("SELECT name, \"unique\", origin FROM pragma_index_list(?1)")?;
        let entries = list
            .query_map([table], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)? == 1,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut info = conn.prepare("SELECT name FROM pragma_index_info(?1) ORDER BY seqno")?;
        let mut indexes = Vec::with_capacity(entries.len());
        for (name, unique, origin) in entries {
            // The primary key is already described by the table's key spec
            if origin == "pk" {
                continue;
            }
            let columns = info
                .query_map([&name], |row| row.get::<_, Option<String>>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let mut index = IndexDef::new(name, columns.into_iter().flatten());
            index.unique = unique;
            indexes.push(index);
        }
        Ok(indexes)
    };
    read().map_err(|e| pragma_error("indexes", table, e))
}

fn foreign_keys(conn: &Connection, table: &str) -> Result<Vec<ForeignKeyDef>> {
    let read = || -> rusqlite::Result<Vec<(i64, String, String, Option<String>)>> {
        let mut stmt = conn.prepare(
            "SELECT id, \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1) ORDER BY id, seq",
        )?;
        let rows = stmt.query_map([table], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?;
        rows.collect()
    };
    let rows = read().map_err(|e| pragma_error("foreign keys", table, e))?;

    // Composite keys arrive as several rows sharing an id
    let mut grouped: IndexMap<i64, ForeignKeyDef> = IndexMap::new();
    let mut implicit_targets: Vec<i64> = Vec::new();
    for (id, referred_table, from, to) in rows {
        let fk = grouped.entry(id).or_insert_with(|| ForeignKeyDef {
            name: None,
            constrained_columns: Vec::new(),
            referred_table: referred_table.clone(),
            referred_columns: Vec::new(),
            referred_schema: None,
        });
        fk.constrained_columns.push(from);
        match to {
            Some(to) => fk.referred_columns.push(to),
            None if !implicit_targets.contains(&id) => implicit_targets.push(id),
            None => {}
        }
    }

    // `REFERENCES parent` without columns targets the parent's primary key
    for id in implicit_targets {
        if let Some(fk) = grouped.get_mut(&id) {
            let (_, pk) = table_columns(conn, &fk.referred_table)?;
            fk.referred_columns = pk;
        }
    }

    Ok(grouped.into_values().collect())
}
