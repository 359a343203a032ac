use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Configuration for plan generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Calendar year whose quarters seed a partitioned table
    pub partition_year: i32,
    /// pg_cron schedule for the partition maintenance routine
    pub maintenance_schedule: String,
    /// Column indexed on a materialized denormalized table
    pub materialized_index_column: String,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            partition_year: chrono::Local::now().year(),
            maintenance_schedule: "0 0 1 * *".to_string(),
            materialized_index_column: "id".to_string(),
        }
    }
}

impl PlanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the year used for the initial quarterly partitions
    pub fn with_partition_year(mut self, year: i32) -> Self {
        self.partition_year = year;
        self
    }

    /// Sets the cron schedule of the partition maintenance job
    pub fn with_maintenance_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.maintenance_schedule = schedule.into();
        self
    }

    /// Sets the column indexed on materialized tables
    pub fn with_materialized_index_column(mut self, column: impl Into<String>) -> Self {
        self.materialized_index_column = column.into();
        self
    }
}
