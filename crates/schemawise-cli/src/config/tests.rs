use super::*;
use pretty_assertions::assert_eq;
use schemawise_storage::StorageBackend;

#[test]
fn test_empty_file_is_default() {
    let config = AppConfig::from_toml("").unwrap();
    assert_eq!(config.heuristics, HeuristicConfig::default());
    assert_eq!(config.analyzer, LogAnalyzerConfig::default());
    assert_eq!(config.storage.backend, StorageBackend::Sqlite);
}

#[test]
fn test_partial_sections_keep_other_defaults() {
    let config = AppConfig::from_toml(
        r##"
        [analyzer]
        comment_prefixes = ["--", "#"]

        [heuristics]
        denormalize_min_join_count = 4

        [plan]
        partition_year = 2030

        [storage]
        backend = "json"
        base_dir = "/tmp/schemawise-test"

        [logging]
        json = true
        "##,
    )
    .unwrap();

    assert_eq!(config.analyzer.comment_prefixes, vec!["--", "#"]);
    assert_eq!(config.analyzer.sample_cap, 5);
    assert_eq!(config.heuristics.denormalize_min_join_count, 4);
    assert_eq!(
        config.heuristics.normalize_min_column_count,
        HeuristicConfig::default().normalize_min_column_count
    );
    assert_eq!(config.plan.partition_year, 2030);
    assert_eq!(config.plan.maintenance_schedule, "0 0 1 * *");
    assert_eq!(config.storage.backend, StorageBackend::Json);
    assert_eq!(config.storage.base_dir, PathBuf::from("/tmp/schemawise-test"));
    assert!(config.logging.json);
}

#[test]
fn test_invalid_heuristics_rejected() {
    let result = AppConfig::from_toml("[heuristics]\nindex_confidence = 150\n");
    assert!(result.is_err());
}

#[test]
fn test_zero_sample_cap_rejected() {
    assert!(AppConfig::from_toml("[analyzer]\nsample_cap = 0\n").is_err());
}

#[test]
fn test_explicit_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AppConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_load_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[plan]\nmaterialized_index_column = \"pk\"\n").unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.plan.materialized_index_column, "pk");
}

#[test]
fn test_default_path_location() {
    let path = AppConfig::default_path();
    assert!(path.ends_with("schemawise/config.toml"));
}
