//! Schemawise Core - Shared schema model and collaborator traits
//!
//! This crate provides the fundamental types that every other schemawise
//! crate depends on. It defines:
//!
//! - `Schema` / `TableDef` / `ColumnDef` - the canonical structural model
//! - `SchemaBuilder` - validation boundary for raw introspection results
//! - `SchemaProvider` - trait for live database introspection
//! - `SchemawiseError` - the shared error type

mod builder;
mod error;
mod provider;
mod schema;

pub use builder::*;
pub use error::*;
pub use provider::*;
pub use schema::*;
