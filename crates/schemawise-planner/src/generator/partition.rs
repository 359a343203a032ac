//! PARTITION: quarterly range partitions on the first date/time column
//!
//! Emits one PostgreSQL script: partitioned copy of the table, four quarters
//! of the configured year, data migration, a rename swap, and a pg_cron job
//! that keeps creating the next quarter.

use schemawise_analyzer::Action;
use schemawise_core::{ColumnDef, TableDef};

use super::PlanConfig;
use crate::{PlanError, PlanStatement, SqlPlan, StatementKind};

const CAUTION: &str = "Partitioning requires careful planning and may need application changes.";

pub(super) fn generate(config: &PlanConfig, name: &str, table: &TableDef) -> SqlPlan {
    let Some(partition_column) = table.first_temporal_column() else {
        return SqlPlan::failed(name, Action::Partition, PlanError::NoPartitionKey);
    };
    let key = partition_column.name.as_str();
    let new_table = format!("{}_partitioned", name);

    let column_defs: Vec<String> = table.columns.iter().map(column_definition).collect();
    let sql = format!(
        "-- Step 1: Create new partitioned table\n\
         CREATE TABLE {new} (\n    {columns}\n) PARTITION BY RANGE ({key});\n\n\
         -- Step 2: Create initial partitions (adjust ranges as needed)\n\
         {partitions}\n\n\
         -- Step 3: Create indexes on partitioned table\n\
         CREATE INDEX idx_{new}_{key} ON {new} ({key});\n\n\
         -- Step 4: Migrate data from original table\n\
         INSERT INTO {new} SELECT * FROM {table};\n\n\
         -- Step 5: Rename tables to swap them\n\
         ALTER TABLE {table} RENAME TO {table}_old;\n\
         ALTER TABLE {new} RENAME TO {table};\n\n\
         -- Step 6: Create a function to manage partitions\n\
         {maintenance}\n\n\
         -- Step 7: Schedule the partition management function\n\
         CREATE EXTENSION IF NOT EXISTS pg_cron;\n\n\
         SELECT cron.schedule('{schedule}', 'SELECT manage_{table}_partitions()');\n",
        new = new_table,
        columns = column_defs.join(",\n    "),
        key = key,
        partitions = quarter_partitions(&new_table, config.partition_year),
        table = name,
        maintenance = maintenance_function(name),
        schedule = config.maintenance_schedule,
    );

    let mut plan = SqlPlan::new(name, Action::Partition, CAUTION);
    plan.push(PlanStatement::new(StatementKind::Partition, name, sql));
    plan.explanation = format!(
        "This partitioning plan:\n\
         1. Creates a new table partitioned by the '{}' column\n\
         2. Sets up initial quarterly partitions for {}\n\
         3. Migrates data from the original table\n\
         4. Renames tables to preserve the original name\n\
         5. Creates a maintenance function and schedule to automatically add future partitions\n\n\
         Partitioning works best for tables with time-series data and queries that filter on the partition column.",
        key, config.partition_year
    );
    plan
}

/// `name type NULL|NOT NULL [DEFAULT x]`
fn column_definition(column: &ColumnDef) -> String {
    let nullability = if column.nullable { "NULL" } else { "NOT NULL" };
    match &column.default {
        Some(default) => format!(
            "{} {} {} DEFAULT {}",
            column.name, column.data_type, nullability, default
        ),
        None => format!("{} {} {}", column.name, column.data_type, nullability),
    }
}

/// Half-open quarter ranges: Q1 starts Jan 1, Q4 ends Jan 1 of the next year
fn quarter_partitions(new_table: &str, year: i32) -> String {
    let bounds = [
        (format!("{}-01-01", year), format!("{}-04-01", year)),
        (format!("{}-04-01", year), format!("{}-07-01", year)),
        (format!("{}-07-01", year), format!("{}-10-01", year)),
        (format!("{}-10-01", year), format!("{}-01-01", year + 1)),
    ];

    bounds
        .iter()
        .enumerate()
        .map(|(i, (from, to))| {
            format!(
                "CREATE TABLE {new}_p{year}_q{q} PARTITION OF {new}\n    \
                 FOR VALUES FROM ('{from}') TO ('{to}');",
                new = new_table,
                year = year,
                q = i + 1,
                from = from,
                to = to,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn maintenance_function(table: &str) -> String {
    format!(
        "CREATE OR REPLACE FUNCTION manage_{table}_partitions()\n\
         RETURNS VOID AS $$\n\
         DECLARE\n\
         \x20   next_quarter DATE;\n\
         BEGIN\n\
         \x20   -- Calculate the next quarter date\n\
         \x20   SELECT date_trunc('quarter', now()) + interval '3 months' INTO next_quarter;\n\n\
         \x20   -- Create a new partition if it doesn't exist\n\
         \x20   EXECUTE format(\n\
         \x20       'CREATE TABLE IF NOT EXISTS %s_p%s PARTITION OF %s\n\
         \x20        FOR VALUES FROM (%L) TO (%L)',\n\
         \x20       '{table}',\n\
         \x20       to_char(next_quarter, 'YYYY_Q'),\n\
         \x20       '{table}',\n\
         \x20       next_quarter,\n\
         \x20       next_quarter + interval '3 months'\n\
         \x20   );\n\
         END;\n\
         $$ LANGUAGE plpgsql;",
        table = table
    )
}
