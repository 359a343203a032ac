//! schemawise command line entry point

mod commands;
mod config;
mod logging;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use schemawise_analyzer::Action;
use schemawise_bench::{DEFAULT_ITERATIONS, DEFAULT_THROUGHPUT_DURATION, DEFAULT_WORKERS};
use schemawise_storage::open_store;

use crate::commands::*;
use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "schemawise")]
#[command(version, about = "Workload-aware schema recommendations and migration plans", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Name the database's snapshots are stored under
    #[arg(long, global = true, default_value = "default")]
    db_name: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract database schema information
    Extract {
        /// Database connection URL
        #[arg(long)]
        db_url: String,

        /// Output file for schema (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze SQL query patterns from a log
    Analyze {
        /// SQL query log file, one statement per line
        #[arg(long)]
        log_file: PathBuf,

        /// Schema file (JSON) for correlation; defaults to the stored snapshot
        #[arg(long)]
        schema_file: Option<PathBuf>,

        /// Output file for analysis (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run EXPLAIN on a SQL query
    Explain {
        /// Database connection URL
        #[arg(long)]
        db_url: String,

        /// SQL query to explain
        #[arg(long, required_unless_present = "query_file")]
        query: Option<String>,

        /// File containing the SQL query
        #[arg(long, conflicts_with = "query")]
        query_file: Option<PathBuf>,

        /// Output file for the performance sample (JSON array)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate optimization recommendations
    Recommend {
        /// Schema file (JSON)
        #[arg(long)]
        schema_file: Option<PathBuf>,

        /// Query analysis file (JSON)
        #[arg(long)]
        analysis_file: Option<PathBuf>,

        /// Performance samples file (JSON array), e.g. from `explain -o`
        #[arg(long)]
        perf_file: Option<PathBuf>,

        /// Output file for recommendations (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate SQL implementation plans for recommendations
    Generate {
        /// Schema file (JSON)
        #[arg(long)]
        schema_file: Option<PathBuf>,

        /// Recommendations file (JSON)
        #[arg(long)]
        rec_file: Option<PathBuf>,

        /// Only plan recommendations for this table
        #[arg(long)]
        table: Option<String>,

        /// Only plan this action (denormalize, normalize, index, partition)
        #[arg(long)]
        action: Option<Action>,

        /// Directory to save SQL files
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Run the whole pipeline: extract, analyze, recommend, generate
    FullAnalyze {
        /// Database connection URL
        #[arg(long)]
        db_url: String,

        /// SQL query log file
        #[arg(long)]
        log_file: PathBuf,

        /// Directory to save output files
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Benchmark a query: sequential timing, then concurrent throughput
    Bench {
        /// Database connection URL
        #[arg(long)]
        db_url: String,

        /// SQL query to benchmark
        #[arg(long)]
        query: String,

        /// Throughput test duration in seconds
        #[arg(long, default_value_t = DEFAULT_THROUGHPUT_DURATION.as_secs())]
        duration: u64,

        /// Concurrent workers for the throughput test
        #[arg(long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,

        /// Timed iterations for the sequential test
        #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
        iterations: usize,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run(Cli::parse()).await {
        tracing::error!(error = %format!("{:#}", e), "command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let _log_guard = logging::init(&config.logging, cli.verbose)?;
    let store = open_store(&config.storage)?;

    let ctx = Context {
        config,
        store,
        db_name: cli.db_name,
        json: cli.json,
    };

    match cli.command {
        Commands::Extract { db_url, output } => {
            let schema = run_extract(&ctx, &db_url, output.as_deref()).await?;
            ctx.emit(&schema, print_schema)?;
        }

        Commands::Analyze {
            log_file,
            schema_file,
            output,
        } => {
            let schema = load_schema(&ctx, schema_file.as_deref())?;
            if schema.is_some() {
                ctx.say("\nPerforming advanced analysis with schema information...");
            }
            let report = run_analyze(&ctx, &log_file, schema.as_ref(), output.as_deref())?;
            ctx.emit(&report, print_analysis)?;
        }

        Commands::Explain {
            db_url,
            query,
            query_file,
            output,
        } => {
            let query = resolve_query(query.as_deref(), query_file.as_deref())?;
            let sample = run_explain(&ctx, &db_url, &query, output.as_deref())?;
            ctx.emit(&sample, print_explain)?;
        }

        Commands::Recommend {
            schema_file,
            analysis_file,
            perf_file,
            output,
        } => {
            let schema = require_schema(&ctx, schema_file.as_deref())?;
            let statistics = require_analysis(&ctx, analysis_file.as_deref())?;
            let samples = load_perf_samples(perf_file.as_deref())?;
            let recommendations =
                run_recommend(&ctx, &schema, &statistics, &samples, output.as_deref())?;
            ctx.emit(recommendations.as_slice(), print_recommendations)?;
        }

        Commands::Generate {
            schema_file,
            rec_file,
            table,
            action,
            output_dir,
        } => {
            let schema = require_schema(&ctx, schema_file.as_deref())?;
            let recommendations = require_recommendations(&ctx, rec_file.as_deref())?;
            let filter = PlanFilter { table, action };
            let outcome =
                run_generate(&ctx, &schema, &recommendations, &filter, output_dir.as_deref())?;
            ctx.emit(&outcome, print_plans)?;
        }

        Commands::FullAnalyze {
            db_url,
            log_file,
            output_dir,
        } => {
            let summary = run_full_analyze(&ctx, &db_url, &log_file, output_dir.as_deref()).await?;
            if ctx.json {
                output::print_json(&summary)?;
            }
        }

        Commands::Bench {
            db_url,
            query,
            duration,
            workers,
            iterations,
        } => {
            let report = run_bench(
                &db_url,
                &query,
                Duration::from_secs(duration),
                workers,
                iterations,
            )
            .await?;
            ctx.emit(&report, print_bench)?;
        }
    }

    Ok(())
}
