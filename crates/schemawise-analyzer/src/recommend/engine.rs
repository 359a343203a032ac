use std::collections::HashSet;

use indexmap::IndexMap;
use schemawise_core::{Result, Schema, TableDef};

use super::{Action, HeuristicConfig, Recommendation};
use crate::{PerfSample, TableMetrics};

/// Rule-based recommendation engine
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: HeuristicConfig,
}

impl RecommendationEngine {
    /// Creates an engine with the default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with custom thresholds, rejecting invalid ones
    pub fn with_config(config: HeuristicConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    /// Runs every rule pass and ranks the result
    ///
    /// `samples` may be empty, in which case the INDEX pass is skipped.
    pub fn recommend(
        &self,
        schema: &Schema,
        metrics: &IndexMap<String, TableMetrics>,
        samples: &[PerfSample],
    ) -> Vec<Recommendation> {
        let candidates: Vec<(&str, &TableDef, &TableMetrics)> = metrics
            .iter()
            .filter_map(|(name, m)| schema.table(name).map(|t| (name.as_str(), t, m)))
            .collect();

        let mut recommendations = Vec::new();
        self.check_denormalize(&candidates, metrics, &mut recommendations);
        self.check_normalize(&candidates, &mut recommendations);
        self.check_index(schema, samples, &mut recommendations);
        self.check_partition(&candidates, &mut recommendations);

        // Stable: equal confidences keep pass order.
        recommendations.sort_by(|a, b| b.confidence.cmp(&a.confidence));

        tracing::info!(
            recommendations = recommendations.len(),
            "generated recommendations"
        );
        recommendations
    }

    fn check_denormalize(
        &self,
        candidates: &[(&str, &TableDef, &TableMetrics)],
        metrics: &IndexMap<String, TableMetrics>,
        out: &mut Vec<Recommendation>,
    ) {
        let c = &self.config;
        for (name, table, m) in candidates {
            if !(m.join_count > c.denormalize_min_join_count
                && m.read_write_ratio > c.denormalize_min_read_write_ratio
                && m.access_count > c.denormalize_min_access_count)
            {
                continue;
            }

            let mut seen = HashSet::new();
            let related: Vec<String> = table
                .foreign_keys
                .iter()
                .map(|fk| fk.referred_table.as_str())
                .filter(|t| metrics.contains_key(*t) && seen.insert(*t))
                .map(str::to_string)
                .collect();
            if related.is_empty() {
                continue;
            }

            let raw = c.denormalize_base_confidence
                + m.join_count as f64 * c.denormalize_join_weight
                + m.read_write_ratio;
            let reason = format!(
                "Table '{}' is frequently joined ({} joins), has a high read/write ratio ({:.1}), \
                 and is commonly accessed ({} accesses). Consider denormalizing with {}.",
                name,
                m.join_count,
                m.read_write_ratio,
                m.access_count,
                related.join(", ")
            );
            out.push(
                Recommendation::new(
                    *name,
                    Action::Denormalize,
                    clamp_confidence(raw, c.denormalize_confidence_cap),
                    reason,
                )
                .with_related_tables(related),
            );
        }
    }

    fn check_normalize(
        &self,
        candidates: &[(&str, &TableDef, &TableMetrics)],
        out: &mut Vec<Recommendation>,
    ) {
        let c = &self.config;
        for (name, _, m) in candidates {
            if !(m.column_count > c.normalize_min_column_count
                && m.join_count < c.normalize_max_join_count
                && m.foreign_key_count < c.normalize_max_foreign_keys)
            {
                continue;
            }

            let raw = c.normalize_base_confidence + m.column_count as f64 * c.normalize_column_weight;
            let reason = format!(
                "Table '{}' has many columns ({}), but low join activity ({} joins) and few \
                 foreign keys ({}). Consider normalizing this table by extracting related \
                 attributes into separate tables.",
                name, m.column_count, m.join_count, m.foreign_key_count
            );
            out.push(Recommendation::new(
                *name,
                Action::Normalize,
                clamp_confidence(raw, c.normalize_confidence_cap),
                reason,
            ));
        }
    }

    fn check_index(&self, schema: &Schema, samples: &[PerfSample], out: &mut Vec<Recommendation>) {
        let mut seen = HashSet::new();
        for sample in samples {
            for table in &sample.sequential_scans {
                if !schema.contains(table) || !seen.insert(table.as_str()) {
                    continue;
                }
                let reason = format!(
                    "Table '{}' is being sequentially scanned in query: {}. \
                     Consider adding an index on relevant columns.",
                    table, sample.query
                );
                out.push(
                    Recommendation::new(
                        table.as_str(),
                        Action::Index,
                        self.config.index_confidence.min(100),
                        reason,
                    )
                    .with_source_query(&sample.query),
                );
            }
        }
    }

    fn check_partition(
        &self,
        candidates: &[(&str, &TableDef, &TableMetrics)],
        out: &mut Vec<Recommendation>,
    ) {
        let c = &self.config;
        for (name, table, m) in candidates {
            if m.access_count <= c.partition_min_access_count
                || m.read_write_ratio <= c.partition_min_read_write_ratio
            {
                continue;
            }
            let Some(column) = table.first_temporal_column() else {
                continue;
            };

            let reason = format!(
                "Table '{}' is frequently accessed ({} times) and has date/time columns. \
                 Consider partitioning this table to improve query performance on time-based data.",
                name, m.access_count
            );
            out.push(
                Recommendation::new(
                    *name,
                    Action::Partition,
                    c.partition_confidence.min(100),
                    reason,
                )
                .with_partition_column(&column.name),
            );
        }
    }
}

/// Clamps to [0, cap] and floors to an integer
fn clamp_confidence(raw: f64, cap: u8) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, f64::from(cap.min(100))).floor() as u8
}
