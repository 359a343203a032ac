use std::collections::HashSet;
use std::path::Path;

use anyhow::Result;
use schemawise_analyzer::{PerfSample, QueryStatistics, Recommendation};
use schemawise_core::{ConnectionDescriptor, Schema};
use schemawise_driver_sqlite::{explain_sqlite, sqlite_path};
use serde::Serialize;

use super::{
    AnalysisReport, Context, GenerateOutcome, PlanFilter, print_analysis, print_plans,
    print_recommendations, print_schema, run_analyze, run_extract, run_generate, run_recommend,
};

/// Everything the pipeline produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub db_name: String,
    pub schema: Schema,
    pub query_analysis: AnalysisReport,
    pub performance_samples: Vec<PerfSample>,
    pub recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_plans: Option<GenerateOutcome>,
}

/// extract -> analyze -> recommend -> generate
pub async fn run_full_analyze(
    ctx: &Context,
    db_url: &str,
    log_file: &Path,
    output_dir: Option<&Path>,
) -> Result<PipelineSummary> {
    let out = |name: &str| output_dir.map(|dir| dir.join(name));
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;
    }

    step(ctx, "Step 1: Extracting Database Schema");
    let schema = run_extract(ctx, db_url, out("schema.json").as_deref()).await?;
    human(ctx, || print_schema(&schema));

    step(ctx, "Step 2: Analyzing Query Patterns");
    let analysis = run_analyze(ctx, log_file, Some(&schema), out("analysis.json").as_deref())?;
    human(ctx, || print_analysis(&analysis));

    let samples = sample_queries(db_url, &analysis.statistics);

    step(ctx, "Step 3: Generating Optimization Recommendations");
    let recommendations = run_recommend(
        ctx,
        &schema,
        &analysis.statistics,
        &samples,
        out("recommendations.json").as_deref(),
    )?;
    human(ctx, || print_recommendations(&recommendations));

    let sql_plans = if recommendations.is_empty() {
        ctx.say("\nNo recommendations generated. Stopping pipeline.");
        None
    } else {
        step(ctx, "Step 4: Generating SQL Implementation Plans");
        let outcome = run_generate(
            ctx,
            &schema,
            &recommendations,
            &PlanFilter::default(),
            out("sql").as_deref(),
        )?;
        human(ctx, || print_plans(&outcome));
        Some(outcome)
    };

    let summary = PipelineSummary {
        db_name: ctx.db_name.clone(),
        schema,
        query_analysis: analysis,
        performance_samples: samples,
        recommendations,
        sql_plans,
    };

    ctx.say(format!("\n=== Analysis Pipeline Complete for '{}' ===", summary.db_name));
    ctx.say(format!("Found {} tables", summary.schema.len()));
    ctx.say(format!(
        "Analyzed {} queries",
        summary.query_analysis.statistics.counts.total
    ));
    ctx.say(format!("Generated {} recommendations", summary.recommendations.len()));
    ctx.say(format!(
        "Created {} SQL implementation plans",
        summary.sql_plans.as_ref().map_or(0, |o| o.plans.len())
    ));

    Ok(summary)
}

fn step(ctx: &Context, title: &str) {
    ctx.say(format!("\n=== {} ===\n", title));
}

fn human(ctx: &Context, print: impl FnOnce()) {
    if !ctx.json {
        print();
    }
}

/// EXPLAINs the sampled read queries; failures are logged and skipped
fn sample_queries(db_url: &str, statistics: &QueryStatistics) -> Vec<PerfSample> {
    let Ok(path) = ConnectionDescriptor::parse(db_url).and_then(|d| sqlite_path(&d)) else {
        tracing::debug!("performance sampling skipped for non-SQLite database");
        return Vec::new();
    };

    let examples = &statistics.examples;
    let mut seen = HashSet::new();
    examples
        .selects
        .iter()
        .chain(examples.joins.iter())
        .filter(|q| seen.insert(q.as_str()))
        .filter_map(|query| match explain_sqlite(&path, query) {
            Ok(sample) => Some(sample),
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "could not sample query");
                None
            }
        })
        .collect()
}
