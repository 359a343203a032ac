//! NORMALIZE: extract column groups that share a name prefix

use indexmap::IndexMap;
use schemawise_analyzer::Action;
use schemawise_core::{ColumnDef, TableDef};

use crate::{PlanStatement, SqlPlan, StatementKind};

const CAUTION: &str = "Normalization requires data migration and application changes.";
const NO_CANDIDATES: &str =
    "No clear column groupings found for normalization. Consider manual schema review.";

pub(super) fn generate(name: &str, table: &TableDef) -> SqlPlan {
    let groups = candidate_groups(table);
    let mut plan = SqlPlan::new(name, Action::Normalize, CAUTION);

    for (prefix, columns) in &groups {
        let new_table = format!("{}_{}", name, prefix);
        let id_column = format!("{}_id", new_table);
        let column_names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();

        let mut column_defs = vec![format!("{} SERIAL PRIMARY KEY", id_column)];
        column_defs.extend(columns.iter().map(|c| format!("{} {}", c.name, c.data_type)));
        let create_sql = format!(
            "CREATE TABLE {} (\n    {}\n);",
            new_table,
            column_defs.join(",\n    ")
        );

        let alter_sql = format!(
            "ALTER TABLE {table}\n\
             ADD COLUMN {id} INTEGER,\n\
             ADD CONSTRAINT fk_{table}_{new}\n\
             FOREIGN KEY ({id}) REFERENCES {new}({id});",
            table = name,
            id = id_column,
            new = new_table,
        );

        let match_condition = column_names
            .iter()
            .map(|c| format!("t.{0} = nt.{0}", c))
            .collect::<Vec<_>>()
            .join(" AND ");
        let drops = column_names
            .iter()
            .map(|c| format!("DROP COLUMN {}", c))
            .collect::<Vec<_>>()
            .join(", ");
        let migration_sql = format!(
            "-- Step 1: Insert distinct combinations into new table\n\
             INSERT INTO {new} ({cols})\n\
             SELECT DISTINCT {cols} FROM {table};\n\n\
             -- Step 2: Update foreign keys in original table\n\
             UPDATE {table} t\n\
             SET {id} = nt.{id}\n\
             FROM {new} nt\n\
             WHERE {cond};\n\n\
             -- Step 3: Remove redundant columns from original table\n\
             ALTER TABLE {table}\n\
             {drops};",
            new = new_table,
            cols = column_names.join(", "),
            table = name,
            id = id_column,
            cond = match_condition,
            drops = drops,
        );

        plan.push(PlanStatement::new(StatementKind::CreateTable, &new_table, create_sql));
        plan.push(PlanStatement::new(StatementKind::AlterTable, name, alter_sql));
        plan.push(
            PlanStatement::new(StatementKind::DataMigration, &new_table, migration_sql)
                .with_tables(vec![name.to_string(), new_table.clone()]),
        );
    }

    plan.explanation = if plan.statements.is_empty() {
        NO_CANDIDATES.to_string()
    } else {
        format!(
            "The normalization plan:\n\
             1. Creates {} new tables to extract related columns\n\
             2. Adds foreign keys to the original table\n\
             3. Migrates data to maintain relationships\n\
             4. Removes redundant columns from the original table\n\n\
             This plan is based on column naming patterns suggesting related data.",
            groups.len()
        )
    };
    plan
}

/// Columns grouped by the text before their first underscore, keeping
/// only prefixes shared by at least two columns
fn candidate_groups(table: &TableDef) -> IndexMap<&str, Vec<&ColumnDef>> {
    let mut groups: IndexMap<&str, Vec<&ColumnDef>> = IndexMap::new();
    for column in &table.columns {
        match column.name.split_once('_') {
            Some((prefix, _)) if !prefix.is_empty() => {
                groups.entry(prefix).or_default().push(column)
            }
            _ => {}
        }
    }
    groups.retain(|_, columns| columns.len() >= 2);
    groups
}
