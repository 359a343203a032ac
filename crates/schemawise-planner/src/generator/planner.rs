use schemawise_analyzer::{Action, Recommendation};
use schemawise_core::Schema;

use super::{PlanConfig, denormalize, index, normalize, partition};
use crate::{PlanError, SqlPlan};

/// Converts recommendations into SQL plans
#[derive(Debug, Clone, Default)]
pub struct PlanGenerator {
    config: PlanConfig,
}

impl PlanGenerator {
    /// Creates a generator with the default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator with a custom config
    pub fn with_config(config: PlanConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Generates the plan for one recommendation
    ///
    /// Never fails: an unknown table or an unresolvable plan yields a
    /// [`SqlPlan`] whose `error` is set.
    pub fn generate(&self, recommendation: &Recommendation, schema: &Schema) -> SqlPlan {
        let name = recommendation.table.as_str();
        let action = recommendation.action;

        let Some(table) = schema.table(name) else {
            tracing::warn!(table = %name, action = %action, "recommendation names an unknown table");
            let reason = if name.is_empty() {
                "table name is empty".to_string()
            } else {
                format!("table '{}' not found in schema", name)
            };
            return SqlPlan::failed(name, action, PlanError::InvalidRecommendation(reason));
        };

        let plan = match action {
            Action::Denormalize => {
                denormalize::generate(&self.config, name, table, &recommendation.related_tables, schema)
            }
            Action::Normalize => normalize::generate(name, table),
            Action::Index => index::generate(name, table),
            Action::Partition => partition::generate(&self.config, name, table),
        };

        match &plan.error {
            Some(error) => tracing::info!(table = %name, action = %action, %error, "no viable plan"),
            None => tracing::info!(
                table = %name,
                action = %action,
                statements = plan.statements.len(),
                "generated SQL plan"
            ),
        }
        plan
    }

    /// Generates plans for every recommendation, in order
    pub fn generate_all(&self, recommendations: &[Recommendation], schema: &Schema) -> Vec<SqlPlan> {
        recommendations
            .iter()
            .map(|rec| self.generate(rec, schema))
            .collect()
    }
}
