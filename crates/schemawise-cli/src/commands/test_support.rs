use schemawise_storage::{StorageBackend, StorageConfig, open_store};

use super::Context;
use crate::config::AppConfig;

/// Quiet context backed by a JSON store under `dir`
pub fn context(dir: &std::path::Path) -> Context {
    let mut config = AppConfig::default();
    config.plan = config.plan.with_partition_year(2025);
    config.storage = StorageConfig::new()
        .with_backend(StorageBackend::Json)
        .with_base_dir(dir.join("store"));

    Context {
        store: open_store(&config.storage).unwrap(),
        config,
        db_name: "shop".to_string(),
        json: true,
    }
}
