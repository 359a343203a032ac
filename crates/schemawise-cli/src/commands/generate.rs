use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use schemawise_analyzer::{Action, Recommendation};
use schemawise_core::Schema;
use schemawise_planner::{PlanGenerator, SqlPlan};

use super::Context;

/// Narrows which recommendations get a plan
#[derive(Debug, Clone, Default)]
pub struct PlanFilter {
    pub table: Option<String>,
    pub action: Option<Action>,
}

impl PlanFilter {
    pub fn matches(&self, rec: &Recommendation) -> bool {
        self.table.as_deref().is_none_or(|t| rec.table == t)
            && self.action.is_none_or(|a| rec.action == a)
    }
}

/// `<table>_<action>.sql`
pub fn plan_file_name(plan: &SqlPlan) -> String {
    format!("{}_{}.sql", plan.table, plan.action.slug())
}

/// SQL file contents: header comments followed by every statement
pub fn render_plan_file(plan: &SqlPlan, generated_at: DateTime<Utc>) -> String {
    let mut out = format!(
        "-- SQL Plan: {} for table '{}'\n-- Generated on: {}\n\n-- Explanation: {}\n",
        plan.action,
        plan.table,
        generated_at.to_rfc3339(),
        plan.explanation
    );
    if !plan.caution.is_empty() {
        out.push_str(&format!("-- Caution: {}\n", plan.caution));
    }
    out.push_str("\n-- SQL Statements:\n");
    for (i, statement) in plan.statements.iter().enumerate() {
        out.push_str(&format!(
            "\n-- Statement {}: {}\n{}\n",
            i + 1,
            statement.kind.as_str(),
            statement.sql.trim_end()
        ));
    }
    out
}

/// Plans and the files written for them
#[derive(Debug, Clone, serde::Serialize)]
pub struct GenerateOutcome {
    pub plans: Vec<SqlPlan>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
}

pub fn run_generate(
    ctx: &Context,
    schema: &Schema,
    recommendations: &[Recommendation],
    filter: &PlanFilter,
    output_dir: Option<&Path>,
) -> Result<GenerateOutcome> {
    let generator = PlanGenerator::with_config(ctx.config.plan.clone());
    let generated_at = Utc::now();

    let plans: Vec<SqlPlan> = recommendations
        .iter()
        .filter(|rec| filter.matches(rec))
        .map(|rec| {
            tracing::info!(table = %rec.table, action = %rec.action, "generating SQL plan");
            generator.generate(rec, schema)
        })
        .collect();

    let mut files = Vec::new();
    if let Some(dir) = output_dir {
        for plan in plans.iter().filter(|p| !p.is_error()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
            let path = dir.join(plan_file_name(plan));
            std::fs::write(&path, render_plan_file(plan, generated_at))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            files.push(path);
        }
    }

    Ok(GenerateOutcome { plans, files })
}

pub fn print_plans(outcome: &GenerateOutcome) {
    if outcome.plans.is_empty() {
        println!("No matching recommendations found.");
        return;
    }

    let rule = "=".repeat(80);
    for plan in &outcome.plans {
        println!("\n{}", rule);
        println!("SQL PLAN: {} for table '{}'", plan.action, plan.table);
        println!("{}", rule);

        if let Some(error) = &plan.error {
            println!("Error: {}", error);
            continue;
        }

        println!("\nExplanation: {}", plan.explanation);
        if !plan.caution.is_empty() {
            println!("\nCaution: {}", plan.caution);
        }
        println!("\nSQL Statements:");
        for (i, statement) in plan.statements.iter().enumerate() {
            println!("\n-- Statement {}: {}", i + 1, statement.kind.as_str());
            println!("{}", statement.sql.trim_end());
        }
    }

    for file in &outcome.files {
        println!("\nSQL saved to {}", file.display());
    }
}
