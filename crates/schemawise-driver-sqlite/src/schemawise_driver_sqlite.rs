//! SQLite collaborators for schemawise
//!
//! - [`SqliteSchemaProvider`] introspects a database file into a `Schema`
//! - [`explain_sqlite`] turns `EXPLAIN QUERY PLAN` output into a `PerfSample`
//! - [`SqliteConnectionSource`] feeds the benchmark harness

mod connection;
mod explain;
mod schema;

pub use connection::*;
pub use explain::*;
pub use schema::*;
