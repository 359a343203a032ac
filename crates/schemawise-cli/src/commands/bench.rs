use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use schemawise_bench::{DEFAULT_WARMUP, PerformanceBenchmark, ThroughputStats, TimingStats};
use schemawise_core::ConnectionDescriptor;
use schemawise_driver_sqlite::SqliteConnectionSource;
use serde::Serialize;

use crate::output;

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub query: String,
    pub timing: TimingStats,
    pub throughput: ThroughputStats,
}

/// Sequential timing followed by a concurrent throughput run
pub async fn run_bench(
    db_url: &str,
    query: &str,
    duration: Duration,
    workers: usize,
    iterations: usize,
) -> Result<BenchReport> {
    let descriptor = ConnectionDescriptor::parse(db_url)?;
    let source = SqliteConnectionSource::from_descriptor(&descriptor)
        .context("Benchmarks are only supported for SQLite databases")?;
    let bench = PerformanceBenchmark::new(Arc::new(source));

    let timing = bench
        .time_query(query, iterations, DEFAULT_WARMUP)
        .await
        .context("Query timing failed")?;
    let throughput = bench
        .run_throughput_test(query, duration, workers)
        .await
        .context("Throughput test failed")?;

    Ok(BenchReport {
        query: query.to_string(),
        timing,
        throughput,
    })
}

pub fn print_bench(report: &BenchReport) {
    println!("\nQuery Timing:");
    println!("{}", output::timing(&report.timing));
    println!("\nThroughput:");
    println!("{}", output::throughput(&report.throughput));
}
