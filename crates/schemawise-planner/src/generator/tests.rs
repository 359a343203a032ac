//! Tests for plan generation

use super::*;
use crate::{PlanError, StatementKind};
use schemawise_analyzer::{Action, Recommendation};
use schemawise_core::{ColumnDef, ForeignKeyDef, IndexDef, Schema, SchemaBuilder, TableDef};

fn shop_schema() -> Schema {
    let users = TableDef::new()
        .with_column(ColumnDef::new("id", "INTEGER").primary_key())
        .with_column(ColumnDef::new("name", "TEXT"));
    let orders = TableDef::new()
        .with_column(ColumnDef::new("id", "INTEGER").primary_key())
        .with_column(ColumnDef::new("user_id", "INTEGER"))
        .with_column(ColumnDef::new("status", "VARCHAR(20)"))
        .with_column(ColumnDef::new("created_at", "TIMESTAMP").with_nullable(false))
        .with_column(ColumnDef::new("total", "NUMERIC").with_default("0"))
        .with_foreign_key(ForeignKeyDef::new("user_id", "users", "id"));
    let order_items = TableDef::new()
        .with_column(ColumnDef::new("id", "INTEGER").primary_key())
        .with_column(ColumnDef::new("order_id", "INTEGER"))
        .with_column(ColumnDef::new("sku", "TEXT"))
        .with_foreign_key(ForeignKeyDef::new("order_id", "orders", "id"));
    let tags = TableDef::new().with_column(ColumnDef::new("label", "TEXT"));

    SchemaBuilder::new()
        .add_table("users", users)
        .add_table("orders", orders)
        .add_table("order_items", order_items)
        .add_table("tags", tags)
        .build()
        .unwrap()
}

fn rec(table: &str, action: Action) -> Recommendation {
    Recommendation::new(table, action, 80, "test")
}

fn generator() -> PlanGenerator {
    PlanGenerator::with_config(PlanConfig::new().with_partition_year(2025))
}

mod dispatch_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_table_is_error_for_every_action() {
        let schema = shop_schema();
        for action in Action::ALL {
            let plan = generator().generate(&rec("ghosts", action), &schema);
            assert!(matches!(plan.error, Some(PlanError::InvalidRecommendation(_))));
            assert!(plan.statements.is_empty());
            assert_eq!(plan.action, action);
        }
    }

    #[test]
    fn test_generate_all_keeps_order() {
        let schema = shop_schema();
        let plans = generator().generate_all(
            &[rec("orders", Action::Index), rec("orders", Action::Partition)],
            &schema,
        );
        let actions: Vec<_> = plans.iter().map(|p| p.action).collect();
        assert_eq!(actions, vec![Action::Index, Action::Partition]);
    }

    #[test]
    fn test_default_config() {
        let config = PlanConfig::default();
        assert_eq!(config.maintenance_schedule, "0 0 1 * *");
        assert_eq!(config.materialized_index_column, "id");
        assert!(config.partition_year >= 2024);
    }
}

mod denormalize_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_forward_foreign_key() {
        let schema = shop_schema();
        let rec = rec("orders", Action::Denormalize).with_related_tables(vec!["users".into()]);
        let plan = generator().generate(&rec, &schema);

        assert!(plan.is_actionable());
        assert_eq!(plan.statements.len(), 2);

        let view = &plan.statements[0];
        assert_eq!(view.kind, StatementKind::View);
        assert_eq!(view.name, "orders_denormalized_view");
        assert_eq!(
            view.sql,
            "CREATE OR REPLACE VIEW orders_denormalized_view AS\n\
             SELECT\n    \
             orders.id,\n    \
             orders.user_id,\n    \
             orders.status,\n    \
             orders.created_at,\n    \
             orders.total,\n    \
             users.name AS users_name\n\
             FROM\n    \
             orders\n    \
             LEFT JOIN users ON orders.user_id = users.id;"
        );

        let materialized = &plan.statements[1];
        assert_eq!(materialized.kind, StatementKind::Materialized);
        assert_eq!(materialized.name, "orders_denormalized");
        assert!(materialized.sql.contains("CREATE TABLE orders_denormalized AS"));
        assert!(
            materialized
                .sql
                .contains("CREATE INDEX idx_orders_denormalized_id ON orders_denormalized (id);")
        );
        assert!(plan.explanation.contains("joins orders with users"));
        assert!(plan.caution.contains("storage requirements"));
    }

    #[test]
    fn test_reverse_foreign_key() {
        let schema = shop_schema();
        let rec =
            rec("orders", Action::Denormalize).with_related_tables(vec!["order_items".into()]);
        let plan = generator().generate(&rec, &schema);

        let view = &plan.statements[0].sql;
        assert!(view.contains("LEFT JOIN order_items ON order_items.order_id = orders.id"));
        assert!(view.contains("order_items.id AS order_items_id"));
        assert!(view.contains("order_items.sku AS order_items_sku"));
        assert!(!view.contains("order_items_order_id"));
    }

    #[test]
    fn test_self_reference_is_aliased() {
        let employees = TableDef::new()
            .with_column(ColumnDef::new("id", "INTEGER").primary_key())
            .with_column(ColumnDef::new("name", "TEXT"))
            .with_column(ColumnDef::new("manager_id", "INTEGER"))
            .with_foreign_key(ForeignKeyDef::new("manager_id", "employees", "id"));
        let schema = SchemaBuilder::new()
            .add_table("employees", employees)
            .build()
            .unwrap();

        let rec =
            rec("employees", Action::Denormalize).with_related_tables(vec!["employees".into()]);
        let plan = generator().generate(&rec, &schema);

        assert!(plan.is_actionable());
        let view = &plan.statements[0].sql;
        assert!(view.contains(
            "LEFT JOIN employees AS employees_1 ON employees.manager_id = employees_1.id"
        ));
        assert!(view.contains("employees_1.name AS employees_name"));
        assert!(view.contains("employees_1.manager_id AS employees_manager_id"));
        assert!(!view.contains("employees_1.id AS"));
        assert!(plan.explanation.contains("joins employees with employees"));
    }

    #[test]
    fn test_missing_related_tables_are_skipped() {
        let schema = shop_schema();
        let rec = rec("orders", Action::Denormalize)
            .with_related_tables(vec!["ghosts".into(), "users".into()]);
        let plan = generator().generate(&rec, &schema);

        assert!(plan.is_actionable());
        assert!(plan.explanation.contains("joins orders with users"));
        assert!(!plan.statements[0].sql.contains("ghosts"));
    }

    #[test]
    fn test_unresolvable_relationship() {
        let schema = shop_schema();
        let rec = rec("orders", Action::Denormalize).with_related_tables(vec!["tags".into()]);
        let plan = generator().generate(&rec, &schema);

        assert!(matches!(
            plan.error,
            Some(PlanError::UnresolvableRelationship(_))
        ));
        assert!(plan.statements.is_empty());
        assert!(plan.explanation.is_empty());
    }

    #[test]
    fn test_no_related_tables() {
        let schema = shop_schema();
        let plan = generator().generate(&rec("orders", Action::Denormalize), &schema);
        assert!(matches!(
            plan.error,
            Some(PlanError::InvalidRecommendation(_))
        ));
    }

    #[test]
    fn test_custom_materialized_index_column() {
        let schema = shop_schema();
        let generator = PlanGenerator::with_config(
            PlanConfig::new().with_materialized_index_column("user_id"),
        );
        let rec = rec("orders", Action::Denormalize).with_related_tables(vec!["users".into()]);
        let plan = generator.generate(&rec, &schema);

        assert!(plan.statements[1].sql.contains(
            "CREATE INDEX idx_orders_denormalized_user_id ON orders_denormalized (user_id);"
        ));
    }
}

mod normalize_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn customers() -> Schema {
        let table = TableDef::new()
            .with_column(ColumnDef::new("id", "INTEGER").primary_key())
            .with_column(ColumnDef::new("address_street", "VARCHAR(100)"))
            .with_column(ColumnDef::new("address_city", "VARCHAR(50)"))
            .with_column(ColumnDef::new("phone", "TEXT"))
            .with_column(ColumnDef::new("billing_name", "TEXT"))
            .with_column(ColumnDef::new("_internal_a", "TEXT"))
            .with_column(ColumnDef::new("_internal_b", "TEXT"));
        SchemaBuilder::new()
            .add_table("customers", table)
            .build()
            .unwrap()
    }

    #[test]
    fn test_prefix_group_extracted() {
        let plan = generator().generate(&rec("customers", Action::Normalize), &customers());

        let kinds: Vec<_> = plan.statements.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                StatementKind::CreateTable,
                StatementKind::AlterTable,
                StatementKind::DataMigration,
            ]
        );

        assert_eq!(
            plan.statements[0].sql,
            "CREATE TABLE customers_address (\n    \
             customers_address_id SERIAL PRIMARY KEY,\n    \
             address_street VARCHAR(100),\n    \
             address_city VARCHAR(50)\n);"
        );
        assert_eq!(plan.statements[1].name, "customers");
        assert!(plan.statements[1].sql.contains(
            "ADD CONSTRAINT fk_customers_customers_address"
        ));

        let migration = &plan.statements[2];
        assert_eq!(
            migration.tables,
            vec!["customers".to_string(), "customers_address".to_string()]
        );
        assert!(migration.sql.contains(
            "INSERT INTO customers_address (address_street, address_city)\n\
             SELECT DISTINCT address_street, address_city FROM customers;"
        ));
        assert!(migration.sql.contains(
            "WHERE t.address_street = nt.address_street AND t.address_city = nt.address_city;"
        ));
        assert!(migration.sql.contains("DROP COLUMN address_street, DROP COLUMN address_city;"));
        assert!(plan.explanation.contains("Creates 1 new tables"));
    }

    #[test]
    fn test_no_candidates_is_not_an_error() {
        let schema = shop_schema();
        let plan = generator().generate(&rec("users", Action::Normalize), &schema);

        assert!(plan.error.is_none());
        assert!(plan.statements.is_empty());
        assert_eq!(
            plan.explanation,
            "No clear column groupings found for normalization. Consider manual schema review."
        );
    }
}

mod index_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_candidates_and_reasons() {
        let schema = shop_schema();
        let plan = generator().generate(&rec("orders", Action::Index), &schema);

        let names: Vec<_> = plan.statements.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "idx_orders_user_id",
                "idx_orders_created_at",
                "idx_orders_status",
            ]
        );
        assert_eq!(
            plan.statements[0].sql,
            "CREATE INDEX idx_orders_user_id ON orders (user_id);\n-- Foreign key column"
        );
        assert!(plan.statements[1].sql.ends_with("-- Date/time column (common in filters/sorting)"));
        assert!(plan.statements[2].sql.ends_with("-- Status/type/category column (common in filters)"));
        assert!(plan.explanation.starts_with("Recommended 3 new indexes for table 'orders':"));
    }

    #[test]
    fn test_existing_and_primary_key_columns_excluded() {
        let table = TableDef::new()
            .with_column(ColumnDef::new("created_on", "DATE").primary_key())
            .with_column(ColumnDef::new("updated_at", "TIMESTAMP"))
            .with_column(ColumnDef::new("order_type", "TEXT"))
            .with_index(IndexDef::new("idx_updated", ["updated_at"]));
        let schema = SchemaBuilder::new()
            .add_table("events", table)
            .build()
            .unwrap();

        let plan = generator().generate(&rec("events", Action::Index), &schema);

        assert!(plan.error.is_none());
        assert!(plan.statements.is_empty());
        assert_eq!(
            plan.explanation,
            "No additional indexes recommended. Existing indexes appear sufficient."
        );
    }

    #[test]
    fn test_column_matching_two_rules_indexed_once() {
        let table = TableDef::new()
            .with_column(ColumnDef::new("status_time", "TIMESTAMP"))
            .with_column(ColumnDef::new("parent_id", "INTEGER"))
            .with_foreign_key(ForeignKeyDef::new("status_time", "t", "x"));
        let schema = SchemaBuilder::new().add_table("t", table).build().unwrap();

        let plan = generator().generate(&rec("t", Action::Index), &schema);
        assert_eq!(plan.statements.len(), 1);
        assert!(plan.statements[0].sql.contains("Foreign key column"));
    }
}

mod partition_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partition_script() {
        let schema = shop_schema();
        let plan = generator().generate(&rec("orders", Action::Partition), &schema);

        assert!(plan.is_actionable());
        assert_eq!(plan.statements.len(), 1);
        let stmt = &plan.statements[0];
        assert_eq!(stmt.kind, StatementKind::Partition);
        assert_eq!(stmt.name, "orders");

        let sql = &stmt.sql;
        assert!(sql.contains(
            "CREATE TABLE orders_partitioned (\n    \
             id INTEGER NOT NULL,\n    \
             user_id INTEGER NULL,\n    \
             status VARCHAR(20) NULL,\n    \
             created_at TIMESTAMP NOT NULL,\n    \
             total NUMERIC NULL DEFAULT 0\n\
             ) PARTITION BY RANGE (created_at);"
        ));
        assert!(sql.contains(
            "CREATE TABLE orders_partitioned_p2025_q1 PARTITION OF orders_partitioned\n    \
             FOR VALUES FROM ('2025-01-01') TO ('2025-04-01');"
        ));
        assert!(sql.contains("FOR VALUES FROM ('2025-10-01') TO ('2026-01-01');"));
        assert!(sql.contains(
            "CREATE INDEX idx_orders_partitioned_created_at ON orders_partitioned (created_at);"
        ));
        assert!(sql.contains("INSERT INTO orders_partitioned SELECT * FROM orders;"));
        assert!(sql.contains("ALTER TABLE orders RENAME TO orders_old;"));
        assert!(sql.contains("ALTER TABLE orders_partitioned RENAME TO orders;"));
        assert!(sql.contains("CREATE OR REPLACE FUNCTION manage_orders_partitions()"));
        assert!(sql.contains("    next_quarter DATE;"));
        assert!(sql.contains("SELECT cron.schedule('0 0 1 * *', 'SELECT manage_orders_partitions()');"));
        assert!(plan.explanation.contains("partitioned by the 'created_at' column"));
    }

    #[test]
    fn test_no_date_column() {
        let schema = shop_schema();
        let plan = generator().generate(&rec("users", Action::Partition), &schema);

        assert_eq!(plan.error, Some(PlanError::NoPartitionKey));
        assert_eq!(
            plan.error.as_ref().map(ToString::to_string).as_deref(),
            Some("No suitable date/time column found for partitioning")
        );
        assert!(plan.statements.is_empty());
    }

    #[test]
    fn test_empty_default_is_not_rendered() {
        let events = TableDef::new()
            .with_column(ColumnDef::new("id", "INTEGER").primary_key())
            .with_column(ColumnDef::new("note", "TEXT").with_nullable(false).with_default(""))
            .with_column(ColumnDef::new("happened_at", "DATE"));
        let schema = SchemaBuilder::new().add_table("events", events).build().unwrap();

        let plan = generator().generate(&rec("events", Action::Partition), &schema);

        let sql = &plan.statements[0].sql;
        assert!(sql.contains("    note TEXT NOT NULL,\n"));
        assert!(!sql.contains("DEFAULT"));
    }

    #[test]
    fn test_custom_schedule() {
        let schema = shop_schema();
        let generator = PlanGenerator::with_config(
            PlanConfig::new()
                .with_partition_year(2030)
                .with_maintenance_schedule("0 3 * * 0"),
        );
        let plan = generator.generate(&rec("orders", Action::Partition), &schema);

        assert!(plan.statements[0].sql.contains("orders_partitioned_p2030_q4"));
        assert!(plan.statements[0].sql.contains("cron.schedule('0 3 * * 0'"));
    }
}
