//! Schemawise Storage - Versioned metadata snapshots
//!
//! Schema snapshots, query analyses and recommendation sets are appended per
//! database name and never overwritten; readers get the most recent one.
//! Two backends: a single SQLite file, or one JSON file per snapshot.

mod config;
mod json;
mod sqlite;
mod store;

pub use config::*;
pub use json::*;
pub use sqlite::*;
pub use store::*;
