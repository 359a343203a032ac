//! Schemawise Analyzer - Workload analysis and schema recommendations
//!
//! This crate provides functionality for:
//! - Classifying raw query logs into `QueryStatistics`
//! - Correlating statistics with a `Schema` into per-table metrics
//! - Parsing EXPLAIN output into `PerfSample`s
//! - Ranking heuristic schema-change `Recommendation`s

pub mod correlation;
pub mod log;
pub mod perf;
pub mod recommend;

pub use correlation::*;
pub use log::*;
pub use perf::*;
pub use recommend::*;
