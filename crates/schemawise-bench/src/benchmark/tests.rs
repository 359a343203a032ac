use super::*;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::QueryExecutor;

/// Records every executed statement; optionally sleeps or fails
#[derive(Default)]
struct MockSource {
    connects: AtomicUsize,
    executed: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    fail_on: Option<&'static str>,
}

struct MockExecutor {
    executed: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
    fail_on: Option<&'static str>,
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn execute(&self, query: &str) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on == Some(query) {
            return Err(SchemawiseError::Other("boom".to_string()));
        }
        self.executed.lock().push(query.to_string());
        Ok(())
    }
}

#[async_trait]
impl ConnectionSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn connect(&self) -> Result<Box<dyn QueryExecutor>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockExecutor {
            executed: Arc::clone(&self.executed),
            delay: self.delay,
            fail_on: self.fail_on,
        }))
    }
}

fn bench(source: MockSource) -> (Arc<MockSource>, PerformanceBenchmark) {
    let source = Arc::new(source);
    let bench = PerformanceBenchmark::new(source.clone());
    (source, bench)
}

mod time_query_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_warmup_runs_are_not_timed() {
        let (source, bench) = bench(MockSource::default());

        let stats = bench.time_query("SELECT 1", 4, 2).await.unwrap();

        assert_eq!(stats.iterations, 4);
        assert_eq!(source.executed.lock().len(), 6);
        assert_eq!(source.connects.load(Ordering::SeqCst), 1);
        assert!(stats.min <= stats.median && stats.median <= stats.max);
    }

    #[tokio::test]
    async fn test_zero_iterations_rejected() {
        let (source, bench) = bench(MockSource::default());

        let err = bench.time_query("SELECT 1", 0, 1).await.unwrap_err();

        assert!(matches!(err, SchemawiseError::ParameterValidation(_)));
        assert_eq!(source.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_executor_error_propagates() {
        let (_source, bench) = bench(MockSource {
            fail_on: Some("SELECT broken"),
            ..Default::default()
        });

        assert!(bench.time_query("SELECT broken", 3, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_compare_preserves_order() {
        let (_source, bench) = bench(MockSource::default());
        let mut queries = IndexMap::new();
        queries.insert("zeta".to_string(), "SELECT 2".to_string());
        queries.insert("alpha".to_string(), "SELECT 1".to_string());

        let comparison = bench.compare_queries(&queries, 2).await.unwrap();

        let names: Vec<&str> = comparison.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert!(comparison.values().all(|s| s.iterations == 2));
    }

    #[tokio::test]
    async fn test_schema_change_runs_both_queries() {
        let (source, bench) = bench(MockSource::default());

        let impact = bench
            .benchmark_schema_change("SELECT old", "SELECT new", 3)
            .await
            .unwrap();

        assert_eq!(impact.before.iterations, 3);
        assert_eq!(impact.after.iterations, 3);
        let executed = source.executed.lock();
        assert_eq!(executed.iter().filter(|q| *q == "SELECT old").count(), 4);
        assert_eq!(executed.iter().filter(|q| *q == "SELECT new").count(), 4);
    }
}

mod throughput_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_one_connection_per_worker() {
        let (source, bench) = bench(MockSource {
            delay: Some(Duration::from_millis(5)),
            ..Default::default()
        });

        let stats = bench
            .run_throughput_test("SELECT 1", Duration::from_millis(60), 3)
            .await
            .unwrap();

        assert_eq!(source.connects.load(Ordering::SeqCst), 3);
        assert_eq!(stats.workers, 3);
        assert!(stats.total_queries >= 3);
        assert_eq!(stats.total_queries as usize, source.executed.lock().len());
        assert_eq!(stats.queries_per_second, stats.total_queries as f64 / 0.06);
        assert!(stats.min_latency_ms <= stats.avg_latency_ms);
        assert!(stats.avg_latency_ms <= stats.max_latency_ms);
    }

    #[tokio::test]
    async fn test_slow_call_may_overrun_deadline() {
        let (_source, bench) = bench(MockSource {
            delay: Some(Duration::from_millis(80)),
            ..Default::default()
        });

        let start = Instant::now();
        let stats = bench
            .run_throughput_test("SELECT 1", Duration::from_millis(10), 2)
            .await
            .unwrap();

        assert!(start.elapsed() >= Duration::from_millis(80));
        assert_eq!(stats.total_queries, 2);
    }

    #[tokio::test]
    async fn test_invalid_parameters() {
        let (_source, bench) = bench(MockSource::default());

        let zero_workers = bench
            .run_throughput_test("SELECT 1", Duration::from_secs(1), 0)
            .await;
        let zero_duration = bench.run_throughput_test("SELECT 1", Duration::ZERO, 2).await;

        assert!(matches!(zero_workers, Err(SchemawiseError::ParameterValidation(_))));
        assert!(matches!(zero_duration, Err(SchemawiseError::ParameterValidation(_))));
    }

    #[tokio::test]
    async fn test_worker_failure_fails_run() {
        let (_source, bench) = bench(MockSource {
            fail_on: Some("SELECT 1"),
            ..Default::default()
        });

        let result = bench
            .run_throughput_test("SELECT 1", Duration::from_millis(20), 2)
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_aggregate_without_samples() {
        let stats = aggregate(Vec::new(), Duration::from_secs(2), 4);
        assert_eq!(stats.total_queries, 0);
        assert_eq!(stats.queries_per_second, 0.0);
        assert_eq!(stats.min_latency_ms, 0.0);
        assert_eq!(stats.duration_seconds, 2.0);
    }
}
