//! DENORMALIZE: a joined view plus a materialized snapshot

use schemawise_analyzer::Action;
use schemawise_core::{ForeignKeyDef, Schema, TableDef};

use super::PlanConfig;
use crate::{PlanError, PlanStatement, SqlPlan, StatementKind};

const CAUTION: &str =
    "Denormalization may increase storage requirements and make updates more complex.";

/// How a related table is reached from the source table
struct JoinPath<'a> {
    related: &'a str,
    /// Name the related table is referenced by; differs from `related` on a self-join
    alias: String,
    condition: String,
    /// Related-table columns that are join keys and therefore not projected
    key_columns: &'a [String],
}

pub(super) fn generate(
    config: &PlanConfig,
    name: &str,
    table: &TableDef,
    related_tables: &[String],
    schema: &Schema,
) -> SqlPlan {
    if related_tables.is_empty() {
        return SqlPlan::failed(
            name,
            Action::Denormalize,
            PlanError::InvalidRecommendation(
                "no related tables specified for denormalization".to_string(),
            ),
        );
    }

    let mut select_columns: Vec<String> = table
        .column_names()
        .map(|c| format!("{}.{}", name, c))
        .collect();
    let mut join_clauses = Vec::new();
    let mut joined: Vec<&str> = Vec::new();

    for related in related_tables {
        if joined.contains(&related.as_str()) {
            continue;
        }
        let Some(related_def) = schema.table(related) else {
            tracing::debug!(table = %name, related = %related, "related table not in schema");
            continue;
        };
        let Some(path) = resolve_join(name, table, related, related_def) else {
            tracing::debug!(table = %name, related = %related, "no foreign key path");
            continue;
        };

        let join_target = if path.alias == path.related {
            path.related.to_string()
        } else {
            format!("{} AS {}", path.related, path.alias)
        };
        join_clauses.push(format!("LEFT JOIN {} ON {}", join_target, path.condition));
        select_columns.extend(
            related_def
                .column_names()
                .filter(|c| !path.key_columns.iter().any(|k| k.as_str() == *c))
                .map(|c| format!("{}.{} AS {}_{}", path.alias, c, path.related, c)),
        );
        joined.push(path.related);
    }

    if join_clauses.is_empty() {
        return SqlPlan::failed(
            name,
            Action::Denormalize,
            PlanError::UnresolvableRelationship(format!(
                "'{}' and {}",
                name,
                related_tables.join(", ")
            )),
        );
    }

    let view_name = format!("{}_denormalized_view", name);
    let view_sql = format!(
        "CREATE OR REPLACE VIEW {view} AS\nSELECT\n    {columns}\nFROM\n    {table}\n    {joins};",
        view = view_name,
        columns = select_columns.join(",\n    "),
        table = name,
        joins = join_clauses.join("\n    "),
    );

    let materialized = format!("{}_denormalized", name);
    let index_column = &config.materialized_index_column;
    let materialized_sql = format!(
        "CREATE TABLE {mat} AS\nSELECT * FROM {view};\n\n\
         -- Create indexes on frequently queried columns\n\
         CREATE INDEX idx_{mat}_{col} ON {mat} ({col});\n",
        mat = materialized,
        view = view_name,
        col = index_column,
    );

    let mut plan = SqlPlan::new(name, Action::Denormalize, CAUTION);
    plan.push(PlanStatement::new(StatementKind::View, &view_name, view_sql));
    plan.push(PlanStatement::new(
        StatementKind::Materialized,
        &materialized,
        materialized_sql,
    ));
    plan.explanation = format!(
        "This plan creates:\n\
         1. A view ({view}) that joins {table} with {related}\n\
         2. A materialized table option ({mat}) for better query performance\n\
         3. Recommended indexes on the materialized table\n\n\
         The view preserves data integrity while the materialized table offers better read performance.",
        view = view_name,
        table = name,
        related = joined.join(", "),
        mat = materialized,
    );
    plan
}

/// Forward key (source -> related) first, then reverse (related -> source)
///
/// A table related to itself is joined under the alias `<table>_1`.
fn resolve_join<'a>(
    name: &'a str,
    table: &'a TableDef,
    related: &'a str,
    related_def: &'a TableDef,
) -> Option<JoinPath<'a>> {
    let alias = if related == name {
        format!("{}_1", related)
    } else {
        related.to_string()
    };

    if let Some(fk) = first_resolvable(table.foreign_keys_to(related)) {
        return Some(JoinPath {
            related,
            condition: join_condition(name, &alias, fk),
            alias,
            key_columns: &fk.referred_columns,
        });
    }

    let fk = first_resolvable(related_def.foreign_keys_to(name))?;
    Some(JoinPath {
        related,
        condition: join_condition(&alias, name, fk),
        alias,
        key_columns: &fk.constrained_columns,
    })
}

fn first_resolvable<'a>(
    mut keys: impl Iterator<Item = &'a ForeignKeyDef>,
) -> Option<&'a ForeignKeyDef> {
    keys.find(|fk| fk.is_resolvable())
}

/// `child.c = parent.r AND ...` over the zipped key columns
fn join_condition(child: &str, parent: &str, fk: &ForeignKeyDef) -> String {
    fk.column_pairs()
        .map(|(c, r)| format!("{}.{} = {}.{}", child, c, parent, r))
        .collect::<Vec<_>>()
        .join(" AND ")
}
