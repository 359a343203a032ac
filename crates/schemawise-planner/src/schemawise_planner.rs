//! Schemawise Planner - Migration scripts for schema recommendations
//!
//! This crate turns a `Recommendation` plus the `Schema` it was made against
//! into a `SqlPlan`: ordered SQL statements, an explanation and a caution, or
//! a populated error when no viable plan exists. Nothing here executes or
//! validates the generated SQL.

pub mod generator;
pub mod plan;

pub use generator::*;
pub use plan::*;
