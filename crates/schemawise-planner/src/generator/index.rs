//! INDEX: single-column indexes on likely filter and join columns

use std::collections::HashSet;

use schemawise_analyzer::Action;
use schemawise_core::TableDef;

use crate::{PlanStatement, SqlPlan, StatementKind};

const CAUTION: &str = "Indexes improve read performance but may slow down writes.";
const NOTHING_TO_ADD: &str =
    "No additional indexes recommended. Existing indexes appear sufficient.";

const FOREIGN_KEY_REASON: &str = "Foreign key column";
const TEMPORAL_REASON: &str = "Date/time column (common in filters/sorting)";
const CATEGORY_REASON: &str = "Status/type/category column (common in filters)";

const CATEGORY_MARKERS: [&str; 3] = ["status", "type", "category"];

struct Candidate<'a> {
    column: &'a str,
    reason: &'static str,
}

pub(super) fn generate(name: &str, table: &TableDef) -> SqlPlan {
    let candidates = candidates(table);
    let mut plan = SqlPlan::new(name, Action::Index, CAUTION);

    for candidate in &candidates {
        let index_name = format!("idx_{}_{}", name, candidate.column);
        let sql = format!(
            "CREATE INDEX {} ON {} ({});\n-- {}",
            index_name, name, candidate.column, candidate.reason
        );
        plan.push(PlanStatement::new(StatementKind::Index, index_name, sql));
    }

    plan.explanation = if candidates.is_empty() {
        NOTHING_TO_ADD.to_string()
    } else {
        let lines: Vec<String> = plan
            .statements
            .iter()
            .zip(&candidates)
            .map(|(stmt, c)| format!("- {}: {} ({})", stmt.name, c.column, c.reason))
            .collect();
        format!(
            "Recommended {} new indexes for table '{}':\n{}\n\n\
             These indexes target foreign keys and columns commonly used in WHERE clauses or joins.",
            candidates.len(),
            name,
            lines.join("\n")
        )
    };
    plan
}

/// Foreign key columns, then date/time columns, then character-typed
/// status/type/category columns; already-indexed and key columns excluded,
/// first rule wins for a column
fn candidates(table: &TableDef) -> Vec<Candidate<'_>> {
    let indexed = table.indexed_columns();
    let primary = table.primary_key_columns();
    let mut taken: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();

    let foreign_key_columns = table
        .foreign_keys
        .iter()
        .flat_map(|fk| fk.constrained_columns.iter().map(String::as_str));
    let temporal_columns = table
        .columns
        .iter()
        .filter(|c| c.is_temporal())
        .map(|c| c.name.as_str());
    let category_columns = table
        .columns
        .iter()
        .filter(|c| {
            let lower = c.name.to_lowercase();
            c.is_character() && CATEGORY_MARKERS.iter().any(|m| lower.contains(m))
        })
        .map(|c| c.name.as_str());

    let ordered = foreign_key_columns
        .map(|c| (c, FOREIGN_KEY_REASON))
        .chain(temporal_columns.map(|c| (c, TEMPORAL_REASON)))
        .chain(category_columns.map(|c| (c, CATEGORY_REASON)));

    for (column, reason) in ordered {
        if indexed.contains(column) || primary.contains(column) || !taken.insert(column) {
            continue;
        }
        out.push(Candidate { column, reason });
    }
    out
}
