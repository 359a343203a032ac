use super::*;
use chrono::TimeZone;

fn store() -> (tempfile::TempDir, SqliteMetadataStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteMetadataStore::with_path(dir.path().join("nested").join("meta.db")).unwrap();
    (dir, store)
}

#[test]
fn test_creates_parent_directories() {
    let (_dir, store) = store();
    assert!(store.path().exists());
}

#[test]
fn test_latest_by_timestamp_not_insertion_order() {
    let (_dir, store) = store();
    let newer = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let older = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    store
        .append_snapshot(SnapshotKind::Schema, "db", newer, "\"new\"")
        .unwrap();
    store
        .append_snapshot(SnapshotKind::Schema, "db", older, "\"old\"")
        .unwrap();

    let latest = store.latest_snapshot(SnapshotKind::Schema, "db").unwrap();
    assert_eq!(latest.as_deref(), Some("\"new\""));
}

#[test]
fn test_same_timestamp_prefers_last_insert() {
    let (_dir, store) = store();
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();

    store
        .append_snapshot(SnapshotKind::Recommendations, "db", at, "[1]")
        .unwrap();
    store
        .append_snapshot(SnapshotKind::Recommendations, "db", at, "[2]")
        .unwrap();

    let latest = store
        .latest_snapshot(SnapshotKind::Recommendations, "db")
        .unwrap();
    assert_eq!(latest.as_deref(), Some("[2]"));
}

#[test]
fn test_kinds_are_separate() {
    let (_dir, store) = store();
    store
        .append_snapshot(SnapshotKind::QueryAnalysis, "db", Utc::now(), "{}")
        .unwrap();

    assert!(store.latest_snapshot(SnapshotKind::Schema, "db").unwrap().is_none());
    assert!(store.try_list_databases().unwrap().is_empty());
}

#[test]
fn test_reopen_keeps_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meta.db");

    SqliteMetadataStore::with_path(path.clone())
        .unwrap()
        .append_snapshot(SnapshotKind::Schema, "db", Utc::now(), "{}")
        .unwrap();

    let reopened = SqliteMetadataStore::with_path(path).unwrap();
    assert_eq!(reopened.try_list_databases().unwrap(), vec!["db".to_string()]);
}

#[test]
fn test_corrupt_payload_loads_as_none() {
    let (_dir, store) = store();
    store
        .append_snapshot(SnapshotKind::Schema, "db", Utc::now(), "not json")
        .unwrap();
    assert!(store.load_latest_schema("db").is_none());
}
