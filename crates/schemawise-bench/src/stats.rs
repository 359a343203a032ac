//! Benchmark result records. All durations are milliseconds.

use serde::{Deserialize, Serialize};

/// Latency summary for a sequence of timed runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub median: f64,
    /// Sample standard deviation; 0 for a single run
    pub stdev: f64,
    pub iterations: usize,
}

impl TimingStats {
    /// Summarizes latencies; an empty slice yields all zeroes
    pub fn from_samples(samples_ms: &[f64]) -> Self {
        if samples_ms.is_empty() {
            return Self::default();
        }

        let avg = mean(samples_ms);
        let stdev = if samples_ms.len() > 1 {
            let variance = samples_ms.iter().map(|s| (s - avg).powi(2)).sum::<f64>()
                / (samples_ms.len() - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        Self {
            min: samples_ms.iter().copied().fold(f64::INFINITY, f64::min),
            max: samples_ms.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            avg,
            median: median(samples_ms),
            stdev,
            iterations: samples_ms.len(),
        }
    }
}

/// Aggregate of a concurrent throughput run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThroughputStats {
    /// Completed queries divided by the nominal duration
    pub queries_per_second: f64,
    pub total_queries: u64,
    pub workers: usize,
    pub duration_seconds: f64,
    pub avg_latency_ms: f64,
    pub median_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
}

/// Before/after comparison of two query shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaChangeImpact {
    pub before: TimingStats,
    pub after: TimingStats,
    /// Positive when `after` is faster; 0 when `before` averaged 0ms
    pub percent_improvement: f64,
    pub absolute_improvement_ms: f64,
}

impl SchemaChangeImpact {
    pub fn new(before: TimingStats, after: TimingStats) -> Self {
        let absolute = before.avg - after.avg;
        let percent = if before.avg > 0.0 {
            absolute / before.avg * 100.0
        } else {
            0.0
        };
        Self {
            before,
            after,
            percent_improvement: percent,
            absolute_improvement_ms: absolute,
        }
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
