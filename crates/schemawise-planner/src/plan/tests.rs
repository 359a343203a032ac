use super::*;
use pretty_assertions::assert_eq;
use schemawise_analyzer::Action;

#[test]
fn test_failed_plan_has_no_statements() {
    let plan = SqlPlan::failed("orders", Action::Partition, PlanError::NoPartitionKey);
    assert!(plan.is_error());
    assert!(!plan.is_actionable());
    assert!(plan.statements.is_empty());
    assert!(plan.explanation.is_empty());
    assert_eq!(
        plan.error.unwrap().to_string(),
        "No suitable date/time column found for partitioning"
    );
}

#[test]
fn test_statement_kind_serializes_under_type() {
    let stmt = PlanStatement::new(StatementKind::CreateTable, "t_addr", "CREATE TABLE t_addr ();");
    let value = serde_json::to_value(&stmt).unwrap();
    assert_eq!(value["type"], "create_table");
    assert!(value.get("tables").is_none());
}

#[test]
fn test_plan_round_trip_shape() {
    let mut plan = SqlPlan::new("orders", Action::Index, "careful");
    plan.push(PlanStatement::new(StatementKind::Index, "idx_a", "CREATE INDEX idx_a ON orders (a);"));
    plan.explanation = "one index".into();

    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value["action"], "INDEX");
    assert!(value.get("error").is_none());

    let parsed: SqlPlan = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, plan);
}

#[test]
fn test_error_serialization() {
    let plan = SqlPlan::failed(
        "x",
        Action::Denormalize,
        PlanError::UnresolvableRelationship("x and y".into()),
    );
    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value["error"]["kind"], "unresolvable_relationship");
    assert_eq!(value["error"]["message"], "x and y");
}

#[test]
fn test_script_joins_statements() {
    let mut plan = SqlPlan::new("t", Action::Index, "");
    plan.push(PlanStatement::new(StatementKind::Index, "a", "SELECT 1;\n"));
    plan.push(PlanStatement::new(StatementKind::Index, "b", "SELECT 2;"));
    assert_eq!(plan.script(), "SELECT 1;\n\nSELECT 2;");
}
