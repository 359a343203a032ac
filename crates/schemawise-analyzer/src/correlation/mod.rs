//! Correlation of workload statistics with schema structure

mod analyzer;

pub use analyzer::*;
