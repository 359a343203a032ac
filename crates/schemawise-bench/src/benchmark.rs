use std::sync::Arc;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use schemawise_core::{Result, SchemawiseError};

use crate::stats::{mean, median};
use crate::{ConnectionSource, SchemaChangeImpact, ThroughputStats, TimingStats};

pub const DEFAULT_ITERATIONS: usize = 5;
pub const DEFAULT_WARMUP: usize = 1;
pub const DEFAULT_COMPARE_ITERATIONS: usize = 3;
pub const DEFAULT_THROUGHPUT_DURATION: Duration = Duration::from_secs(5);
pub const DEFAULT_WORKERS: usize = 5;

/// Runs timing and throughput experiments against a [`ConnectionSource`]
pub struct PerformanceBenchmark {
    source: Arc<dyn ConnectionSource>,
}

struct WorkerResult {
    queries: u64,
    latencies_ms: Vec<f64>,
}

impl PerformanceBenchmark {
    pub fn new(source: Arc<dyn ConnectionSource>) -> Self {
        Self { source }
    }

    /// Times `iterations` sequential runs on one connection after `warmup`
    /// untimed runs
    pub async fn time_query(
        &self,
        query: &str,
        iterations: usize,
        warmup: usize,
    ) -> Result<TimingStats> {
        if iterations == 0 {
            return Err(SchemawiseError::ParameterValidation(
                "iterations must be at least 1".to_string(),
            ));
        }

        tracing::info!(source = self.source.name(), iterations, warmup, "timing query");
        let conn = self.source.connect().await?;

        for _ in 0..warmup {
            conn.execute(query).await?;
        }

        let mut samples = Vec::with_capacity(iterations);
        for run in 0..iterations {
            let start = Instant::now();
            conn.execute(query).await?;
            let elapsed = elapsed_ms(start);
            tracing::debug!(run = run + 1, elapsed_ms = elapsed, "timed run");
            samples.push(elapsed);
        }

        Ok(TimingStats::from_samples(&samples))
    }

    /// Runs `query` from `workers` concurrent tasks until `duration` elapses
    ///
    /// Each worker owns its connection and checks the shared deadline only
    /// between executions, so a slow final call may overrun the duration.
    pub async fn run_throughput_test(
        &self,
        query: &str,
        duration: Duration,
        workers: usize,
    ) -> Result<ThroughputStats> {
        if workers == 0 {
            return Err(SchemawiseError::ParameterValidation(
                "workers must be at least 1".to_string(),
            ));
        }
        if duration.is_zero() {
            return Err(SchemawiseError::ParameterValidation(
                "duration must be greater than zero".to_string(),
            ));
        }

        tracing::info!(
            source = self.source.name(),
            workers,
            duration_secs = duration.as_secs_f64(),
            "running throughput test"
        );

        let deadline = Instant::now() + duration;
        let query: Arc<str> = Arc::from(query);
        let mut tasks = Vec::with_capacity(workers);

        for worker_id in 0..workers {
            let source = Arc::clone(&self.source);
            let query = Arc::clone(&query);
            tasks.push(tokio::spawn(async move {
                let conn = source.connect().await?;
                let mut result = WorkerResult {
                    queries: 0,
                    latencies_ms: Vec::new(),
                };

                while Instant::now() < deadline {
                    let start = Instant::now();
                    conn.execute(&query).await?;
                    result.latencies_ms.push(elapsed_ms(start));
                    result.queries += 1;
                }

                tracing::debug!(worker_id, queries = result.queries, "worker finished");
                Ok::<_, SchemawiseError>(result)
            }));
        }

        let mut results = Vec::with_capacity(workers);
        for (idx, task) in tasks.into_iter().enumerate() {
            let result = task
                .await
                .map_err(|e| SchemawiseError::Other(format!("worker {} panicked: {}", idx, e)))??;
            results.push(result);
        }

        Ok(aggregate(results, duration, workers))
    }

    /// Times each named query in turn, preserving input order
    pub async fn compare_queries(
        &self,
        queries: &IndexMap<String, String>,
        iterations: usize,
    ) -> Result<IndexMap<String, TimingStats>> {
        tracing::info!(count = queries.len(), "comparing queries");

        let mut comparison = IndexMap::with_capacity(queries.len());
        for (name, query) in queries {
            let stats = self.time_query(query, iterations, DEFAULT_WARMUP).await?;
            comparison.insert(name.clone(), stats);
        }
        Ok(comparison)
    }

    /// Times the same logical query against the old and new schema shape
    pub async fn benchmark_schema_change(
        &self,
        before_query: &str,
        after_query: &str,
        iterations: usize,
    ) -> Result<SchemaChangeImpact> {
        let before = self.time_query(before_query, iterations, DEFAULT_WARMUP).await?;
        let after = self.time_query(after_query, iterations, DEFAULT_WARMUP).await?;
        Ok(SchemaChangeImpact::new(before, after))
    }
}

fn aggregate(results: Vec<WorkerResult>, duration: Duration, workers: usize) -> ThroughputStats {
    let total_queries: u64 = results.iter().map(|r| r.queries).sum();
    let latencies: Vec<f64> = results.into_iter().flat_map(|r| r.latencies_ms).collect();
    let duration_seconds = duration.as_secs_f64();

    let (min, max) = if latencies.is_empty() {
        (0.0, 0.0)
    } else {
        (
            latencies.iter().copied().fold(f64::INFINITY, f64::min),
            latencies.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        )
    };

    ThroughputStats {
        queries_per_second: total_queries as f64 / duration_seconds,
        total_queries,
        workers,
        duration_seconds,
        avg_latency_ms: mean(&latencies),
        median_latency_ms: median(&latencies),
        min_latency_ms: min,
        max_latency_ms: max,
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests;
