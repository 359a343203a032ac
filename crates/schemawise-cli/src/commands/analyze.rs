use std::path::Path;

use anyhow::{Context as _, Result};
use schemawise_analyzer::{
    CorrelationAnalyzer, CorrelationReport, FileLogSource, QueryLogAnalyzer, QueryStatistics,
};
use schemawise_core::Schema;
use serde::{Deserialize, Serialize};

use super::{Context, write_json};
use crate::output;

/// Statistics plus the schema correlation when a schema was available
///
/// Serializes as the statistics object with an extra `advanced_analysis`
/// key, so the file can be read back as plain [`QueryStatistics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub statistics: QueryStatistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_analysis: Option<CorrelationReport>,
}

pub fn run_analyze(
    ctx: &Context,
    log_file: &Path,
    schema: Option<&Schema>,
    output: Option<&Path>,
) -> Result<AnalysisReport> {
    tracing::info!(log_file = %log_file.display(), "analyzing query log");

    let analyzer = QueryLogAnalyzer::with_config(ctx.config.analyzer.clone());
    let statistics = analyzer
        .analyze_log(&FileLogSource::new(), &log_file.to_string_lossy())
        .context("Query analysis failed")?;

    let advanced_analysis = schema.map(|schema| {
        CorrelationAnalyzer::new()
            .with_join_sample_cap(ctx.config.analyzer.sample_cap)
            .analyze(schema, &statistics)
    });

    let report = AnalysisReport {
        statistics,
        advanced_analysis,
    };

    if let Some(path) = output {
        write_json(path, &report)?;
        ctx.say(format!("Analysis saved to {}", path.display()));
    }
    if ctx.store.save_query_analysis(&ctx.db_name, &report.statistics) {
        ctx.say(format!("Query analysis saved to metadata store as '{}'", ctx.db_name));
    }

    Ok(report)
}

pub fn print_analysis(report: &AnalysisReport) {
    let stats = &report.statistics;
    println!("\nQuery Analysis Summary:");
    println!("Total Queries: {}", stats.counts.total);
    println!("SELECT Queries: {}", stats.counts.select);
    println!("INSERT Queries: {}", stats.counts.insert);
    println!("UPDATE Queries: {}", stats.counts.update);
    println!("DELETE Queries: {}", stats.counts.delete);

    println!("\nJoin Analysis:");
    println!("Total Joins: {}", stats.join_analysis.total);
    println!("Inner Joins: {}", stats.join_analysis.inner);
    println!("Left Joins: {}", stats.join_analysis.left);
    println!("Right Joins: {}", stats.join_analysis.right);
    println!("\nRead/Write Ratio: {:.2}", stats.read_write_ratio);

    if !stats.table_access.is_empty() {
        println!("\nTable Access Frequency:");
        println!("{}", output::table_access(stats));
    }

    if let Some(report) = &report.advanced_analysis {
        println!("\nSchema Correlation:");
        println!("{}", output::correlation(report));
    }
}
