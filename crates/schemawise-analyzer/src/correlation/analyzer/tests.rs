//! Tests for the correlation analyzer

use super::*;
use crate::QueryLogAnalyzer;
use schemawise_core::{ColumnDef, ForeignKeyDef, IndexDef, SchemaBuilder};

fn shop_schema() -> Schema {
    let users = TableDef::new()
        .with_column(ColumnDef::new("id", "INTEGER").primary_key())
        .with_column(ColumnDef::new("email", "VARCHAR(255)"));
    let orders = TableDef::new()
        .with_column(ColumnDef::new("id", "INTEGER").primary_key())
        .with_column(ColumnDef::new("user_id", "INTEGER"))
        .with_column(ColumnDef::new("created_at", "TIMESTAMP"))
        .with_foreign_key(ForeignKeyDef::new("user_id", "users", "id"))
        .with_index(IndexDef::new("idx_orders_user", ["user_id"]));
    let order_items = TableDef::new()
        .with_column(ColumnDef::new("id", "INTEGER").primary_key())
        .with_column(ColumnDef::new("order_id", "INTEGER"));

    SchemaBuilder::new()
        .add_table("users", users)
        .add_table("orders", orders)
        .add_table("order_items", order_items)
        .build()
        .unwrap()
}

mod score_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalization_score() {
        let schema = shop_schema();
        let orders = schema.table("orders").unwrap();
        // 1 fk * 2 + 1 index - 3 / 10
        assert!((normalization_score(orders) - 2.7).abs() < 1e-9);
    }

    #[test]
    fn test_normalization_score_is_capped() {
        let mut table = TableDef::new().with_column(ColumnDef::new("id", "INTEGER"));
        for i in 0..8 {
            table = table.with_foreign_key(ForeignKeyDef::new("id", format!("t{}", i), "id"));
        }
        assert_eq!(normalization_score(&table), 10.0);
    }

    #[test]
    fn test_normalization_score_can_go_negative() {
        let mut table = TableDef::new();
        for i in 0..30 {
            table = table.with_column(ColumnDef::new(format!("c{}", i), "TEXT"));
        }
        assert_eq!(normalization_score(&table), -3.0);
    }
}

mod metrics_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_only_known_tables_get_metrics() {
        let stats = QueryLogAnalyzer::new().analyze_lines([
            "SELECT * FROM users",
            "SELECT * FROM audit_log",
            "INSERT INTO orders VALUES (1)",
        ]);
        let report = CorrelationAnalyzer::new().analyze(&shop_schema(), &stats);

        let tables: Vec<_> = report.table_metrics.keys().map(String::as_str).collect();
        assert_eq!(tables, vec!["users", "orders"]);
        assert!(report.metrics("audit_log").is_none());
        assert_eq!(report.normalized_scores.len(), 2);
    }

    #[test]
    fn test_metrics_fields() {
        let stats = QueryLogAnalyzer::new().analyze_lines([
            "SELECT * FROM orders",
            "SELECT * FROM orders WHERE id = 2",
            "UPDATE orders SET user_id = 3",
        ]);
        let report = CorrelationAnalyzer::new().analyze(&shop_schema(), &stats);
        let orders = report.metrics("orders").unwrap();

        assert_eq!(orders.access_count, 3);
        assert_eq!(orders.column_count, 3);
        assert_eq!(orders.index_count, 1);
        assert_eq!(orders.foreign_key_count, 1);
        assert_eq!(orders.join_count, 0);
        assert_eq!(orders.read_write_ratio, 2.0);
    }
}

mod join_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_join_counts_and_patterns() {
        let stats = QueryLogAnalyzer::new().analyze_lines([
            "SELECT * FROM orders JOIN users ON users.id = orders.user_id",
            "SELECT * FROM orders LEFT JOIN order_items ON order_items.order_id = orders.id",
            "SELECT * FROM users",
        ]);
        let report = CorrelationAnalyzer::new().analyze(&shop_schema(), &stats);

        assert_eq!(report.metrics("orders").unwrap().join_count, 2);
        assert_eq!(report.metrics("users").unwrap().join_count, 1);
        assert_eq!(report.metrics("order_items").unwrap().join_count, 1);

        let patterns: Vec<_> = report
            .join_patterns
            .iter()
            .map(|p| (p.table.as_str(), p.join_frequency, p.percentage))
            .collect();
        assert_eq!(
            patterns,
            vec![
                ("users", 1, 50.0),
                ("orders", 2, 100.0),
                ("order_items", 1, 50.0),
            ]
        );
    }

    #[test]
    fn test_mentions_are_whole_words() {
        assert!(mentions_table("SELECT * FROM Orders o", "orders"));
        assert!(mentions_table("JOIN orders.id", "orders"));
        assert!(!mentions_table("JOIN order_items", "orders"));
        assert!(!mentions_table("JOIN order_items", "order"));
        assert!(mentions_table("x JOIN order_items", "order_items"));
    }

    #[test]
    fn test_line_counts_once_per_table() {
        let stats = QueryLogAnalyzer::new()
            .analyze_lines(["SELECT * FROM users u1 JOIN users u2 ON u1.id = u2.id"]);
        let report = CorrelationAnalyzer::new().analyze(&shop_schema(), &stats);
        assert_eq!(report.metrics("users").unwrap().join_count, 1);
    }

    #[test]
    fn test_join_count_bounded_by_sample() {
        let lines: Vec<String> = (0..9)
            .map(|i| format!("SELECT * FROM orders JOIN users ON users.id = {}", i))
            .collect();
        let stats = QueryLogAnalyzer::new().analyze_lines(&lines);
        let report = CorrelationAnalyzer::new().analyze(&shop_schema(), &stats);

        assert_eq!(stats.join_analysis.total, 9);
        assert_eq!(report.metrics("orders").unwrap().join_count, 5);

        let narrow = CorrelationAnalyzer::new()
            .with_join_sample_cap(2)
            .analyze(&shop_schema(), &stats);
        assert_eq!(narrow.metrics("orders").unwrap().join_count, 2);
    }

    #[test]
    fn test_joined_table_without_metrics_has_no_pattern() {
        let stats = QueryLogAnalyzer::new()
            .analyze_lines(["SELECT * FROM orders o, users u WHERE o.user_id = u.id AND 1 JOIN x"]);
        let report = CorrelationAnalyzer::new().analyze(&shop_schema(), &stats);

        assert!(report.join_patterns.iter().all(|p| p.table != "order_items"));
        assert!(report.metrics("users").is_none());
        assert_eq!(report.join_patterns.len(), 1);
        assert_eq!(report.join_patterns[0].table, "orders");
    }
}
