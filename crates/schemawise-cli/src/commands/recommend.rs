use std::path::Path;

use anyhow::Result;
use schemawise_analyzer::{CorrelationAnalyzer, PerfSample, QueryStatistics, Recommendation, RecommendationEngine};
use schemawise_core::Schema;

use super::{Context, write_json};
use crate::output;

pub fn run_recommend(
    ctx: &Context,
    schema: &Schema,
    statistics: &QueryStatistics,
    samples: &[PerfSample],
    output: Option<&Path>,
) -> Result<Vec<Recommendation>> {
    let report = CorrelationAnalyzer::new()
        .with_join_sample_cap(ctx.config.analyzer.sample_cap)
        .analyze(schema, statistics);

    let engine = RecommendationEngine::with_config(ctx.config.heuristics.clone())?;
    let recommendations = engine.recommend(schema, &report.table_metrics, samples);
    tracing::info!(count = recommendations.len(), "recommendations ready");

    if let Some(path) = output {
        write_json(path, &recommendations)?;
        ctx.say(format!("Recommendations saved to {}", path.display()));
    }
    if ctx.store.save_recommendations(&ctx.db_name, &recommendations) {
        ctx.say(format!("Recommendations saved to metadata store as '{}'", ctx.db_name));
    }

    Ok(recommendations)
}

pub fn print_recommendations(recommendations: &[Recommendation]) {
    println!("\nOptimization Recommendations:\n");
    if recommendations.is_empty() {
        println!("No optimization recommendations identified.");
    } else {
        println!("{}", output::recommendations(recommendations));
    }
}
