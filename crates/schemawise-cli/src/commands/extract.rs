use std::path::Path;

use anyhow::{Context as _, Result};
use schemawise_core::{ConnectionDescriptor, Schema};

use super::{Context, provider_for, write_json};
use crate::output;

/// Introspects `db_url`, optionally writes the schema file, and stores a snapshot
pub async fn run_extract(ctx: &Context, db_url: &str, output: Option<&Path>) -> Result<Schema> {
    let descriptor = ConnectionDescriptor::parse(db_url)?;
    let provider = provider_for(&descriptor)?;

    tracing::info!(provider = provider.name(), db_url = %descriptor, "extracting schema");
    let schema = provider
        .extract_schema(&descriptor)
        .await
        .context("Schema extraction failed")?;

    if let Some(path) = output {
        write_json(path, &schema)?;
        ctx.say(format!("Schema saved to {}", path.display()));
    }
    if ctx.store.save_schema(&ctx.db_name, &schema) {
        ctx.say(format!("Schema saved to metadata store as '{}'", ctx.db_name));
    }

    Ok(schema)
}

pub fn print_schema(schema: &Schema) {
    println!("\nSchema extracted successfully: {} tables found\n", schema.len());
    println!("{}", output::schema_summary(schema));
}
