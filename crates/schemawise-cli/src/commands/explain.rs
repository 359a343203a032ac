use std::path::Path;

use anyhow::{Context as _, Result, bail};
use schemawise_analyzer::PerfSample;
use schemawise_core::ConnectionDescriptor;
use schemawise_driver_sqlite::{explain_sqlite, sqlite_path};

use super::{Context, write_json};
use crate::output;

/// Query text from `--query` or `--query-file`
pub fn resolve_query(query: Option<&str>, query_file: Option<&Path>) -> Result<String> {
    let query = match (query, query_file) {
        (_, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read query file {}", path.display()))?,
        (Some(query), None) => query.to_string(),
        (None, None) => bail!("Either --query or --query-file must be specified"),
    };

    let query = query.trim().trim_end_matches(';').trim().to_string();
    if query.is_empty() {
        bail!("Query is empty");
    }
    Ok(query)
}

/// Runs EXPLAIN and optionally writes the sample as a one-element array,
/// the shape `recommend --perf-file` reads
pub fn run_explain(
    ctx: &Context,
    db_url: &str,
    query: &str,
    output: Option<&Path>,
) -> Result<PerfSample> {
    let descriptor = ConnectionDescriptor::parse(db_url)?;
    let path = sqlite_path(&descriptor).context("EXPLAIN is only supported for SQLite databases")?;

    tracing::info!(db_url = %descriptor, "running EXPLAIN");
    let sample = explain_sqlite(&path, query).context("EXPLAIN failed")?;

    if let Some(path) = output {
        write_json(path, std::slice::from_ref(&sample))?;
        ctx.say(format!("Performance sample saved to {}", path.display()));
    }

    Ok(sample)
}

pub fn print_explain(sample: &PerfSample) {
    println!("\nQuery Execution Plan:");
    println!("{}", output::perf_sample(sample));
}
