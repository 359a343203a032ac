//! Schemawise Bench - micro-benchmarks against a live database
//!
//! A [`PerformanceBenchmark`] times a query sequentially on one connection, or
//! runs it from a fixed pool of workers until a shared deadline. Workers never
//! share mutable state; their results are only combined after every worker
//! has finished.

mod benchmark;
mod source;
mod stats;

pub use benchmark::*;
pub use source::*;
pub use stats::*;
