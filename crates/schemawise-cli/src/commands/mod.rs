//! Subcommand implementations
//!
//! Each `run_*` function does the work and returns its result so the
//! full pipeline can chain stages; printing happens through [`Context`].

mod analyze;
mod bench;
mod explain;
mod extract;
mod generate;
mod pipeline;
mod recommend;

use std::fmt::Display;
use std::path::Path;

use anyhow::{Context as _, Result, anyhow};
use schemawise_analyzer::{PerfSample, QueryStatistics, Recommendation};
use schemawise_core::{ConnectionDescriptor, Schema, SchemaProvider};
use schemawise_driver_sqlite::SqliteSchemaProvider;
use schemawise_storage::MetadataStore;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::output;

pub use analyze::*;
pub use bench::*;
pub use explain::*;
pub use extract::*;
pub use generate::*;
pub use pipeline::*;
pub use recommend::*;

/// Shared state for one invocation
pub struct Context {
    pub config: AppConfig,
    pub store: Box<dyn MetadataStore>,
    pub db_name: String,
    pub json: bool,
}

impl Context {
    /// Prints a human-readable line; silent in `--json` mode
    pub fn say(&self, message: impl Display) {
        if !self.json {
            println!("{}", message);
        }
    }

    /// Prints `value` as JSON or through `human`
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T, human: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            output::print_json(value)
        } else {
            human(value);
            Ok(())
        }
    }
}

/// Providers that can introspect a live database
fn providers() -> Vec<Box<dyn SchemaProvider>> {
    vec![Box::new(SqliteSchemaProvider::new())]
}

pub(crate) fn provider_for(descriptor: &ConnectionDescriptor) -> Result<Box<dyn SchemaProvider>> {
    providers()
        .into_iter()
        .find(|p| p.accepts(descriptor))
        .ok_or_else(|| {
            anyhow!(
                "No schema provider for '{}' (supported: sqlite)",
                descriptor.scheme().unwrap_or_default()
            )
        })
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Schema from `file`, else the latest stored snapshot
pub fn load_schema(ctx: &Context, file: Option<&Path>) -> Result<Option<Schema>> {
    match file {
        Some(path) => read_json(path).map(Some),
        None => Ok(ctx.store.load_latest_schema(&ctx.db_name)),
    }
}

pub fn require_schema(ctx: &Context, file: Option<&Path>) -> Result<Schema> {
    load_schema(ctx, file)?.ok_or_else(|| {
        anyhow!(
            "No schema found for '{}'. Provide --schema-file or run `schemawise extract` first.",
            ctx.db_name
        )
    })
}

pub fn require_analysis(ctx: &Context, file: Option<&Path>) -> Result<QueryStatistics> {
    let stats = match file {
        Some(path) => Some(read_json(path)?),
        None => ctx.store.load_latest_query_analysis(&ctx.db_name),
    };
    stats.ok_or_else(|| {
        anyhow!(
            "No query analysis found for '{}'. Provide --analysis-file or run `schemawise analyze` first.",
            ctx.db_name
        )
    })
}

pub fn require_recommendations(ctx: &Context, file: Option<&Path>) -> Result<Vec<Recommendation>> {
    let recs = match file {
        Some(path) => Some(read_json(path)?),
        None => ctx.store.load_latest_recommendations(&ctx.db_name),
    };
    recs.ok_or_else(|| {
        anyhow!(
            "No recommendations found for '{}'. Provide --rec-file or run `schemawise recommend` first.",
            ctx.db_name
        )
    })
}

/// Performance samples from a JSON array file; none when no file is given
pub fn load_perf_samples(file: Option<&Path>) -> Result<Vec<PerfSample>> {
    match file {
        Some(path) => read_json(path),
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
pub(crate) mod test_support;
