//! Heuristic thresholds and confidence constants

use schemawise_core::{Result, SchemawiseError};
use serde::{Deserialize, Serialize};

/// Configuration for the recommendation rules
///
/// Trigger comparisons are strict: a table with exactly
/// `denormalize_min_join_count` joins does not qualify.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub denormalize_min_join_count: u32,
    pub denormalize_min_read_write_ratio: f64,
    pub denormalize_min_access_count: u64,
    pub denormalize_base_confidence: f64,
    /// Confidence added per join
    pub denormalize_join_weight: f64,
    pub denormalize_confidence_cap: u8,

    pub normalize_min_column_count: usize,
    pub normalize_max_join_count: u32,
    pub normalize_max_foreign_keys: usize,
    pub normalize_base_confidence: f64,
    /// Confidence added per column
    pub normalize_column_weight: f64,
    pub normalize_confidence_cap: u8,

    pub index_confidence: u8,

    pub partition_min_access_count: u64,
    pub partition_min_read_write_ratio: f64,
    pub partition_confidence: u8,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            denormalize_min_join_count: 3,
            denormalize_min_read_write_ratio: 5.0,
            denormalize_min_access_count: 5,
            denormalize_base_confidence: 50.0,
            denormalize_join_weight: 5.0,
            denormalize_confidence_cap: 95,

            normalize_min_column_count: 15,
            normalize_max_join_count: 2,
            normalize_max_foreign_keys: 2,
            normalize_base_confidence: 40.0,
            normalize_column_weight: 2.0,
            normalize_confidence_cap: 90,

            index_confidence: 80,

            partition_min_access_count: 10,
            partition_min_read_write_ratio: 3.0,
            partition_confidence: 70,
        }
    }
}

impl HeuristicConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the DENORMALIZE join threshold
    pub fn with_denormalize_min_join_count(mut self, joins: u32) -> Self {
        self.denormalize_min_join_count = joins;
        self
    }

    /// Sets the DENORMALIZE read/write ratio threshold
    pub fn with_denormalize_min_read_write_ratio(mut self, ratio: f64) -> Self {
        self.denormalize_min_read_write_ratio = ratio;
        self
    }

    /// Sets the DENORMALIZE access threshold
    pub fn with_denormalize_min_access_count(mut self, accesses: u64) -> Self {
        self.denormalize_min_access_count = accesses;
        self
    }

    /// Sets the DENORMALIZE confidence cap
    pub fn with_denormalize_confidence_cap(mut self, cap: u8) -> Self {
        self.denormalize_confidence_cap = cap;
        self
    }

    /// Sets the NORMALIZE column threshold
    pub fn with_normalize_min_column_count(mut self, columns: usize) -> Self {
        self.normalize_min_column_count = columns;
        self
    }

    /// Sets the NORMALIZE confidence cap
    pub fn with_normalize_confidence_cap(mut self, cap: u8) -> Self {
        self.normalize_confidence_cap = cap;
        self
    }

    /// Sets the fixed INDEX confidence
    pub fn with_index_confidence(mut self, confidence: u8) -> Self {
        self.index_confidence = confidence;
        self
    }

    /// Sets the PARTITION access threshold
    pub fn with_partition_min_access_count(mut self, accesses: u64) -> Self {
        self.partition_min_access_count = accesses;
        self
    }

    /// Sets the PARTITION read/write ratio threshold
    pub fn with_partition_min_read_write_ratio(mut self, ratio: f64) -> Self {
        self.partition_min_read_write_ratio = ratio;
        self
    }

    /// Sets the fixed PARTITION confidence
    pub fn with_partition_confidence(mut self, confidence: u8) -> Self {
        self.partition_confidence = confidence;
        self
    }

    /// Rejects caps above 100 and non-finite weights
    pub fn validate(&self) -> Result<()> {
        let confidences = [
            ("denormalize_confidence_cap", self.denormalize_confidence_cap),
            ("normalize_confidence_cap", self.normalize_confidence_cap),
            ("index_confidence", self.index_confidence),
            ("partition_confidence", self.partition_confidence),
        ];
        for (name, value) in confidences {
            if value > 100 {
                return Err(SchemawiseError::ParameterValidation(format!(
                    "{} must be at most 100, got {}",
                    name, value
                )));
            }
        }

        let floats = [
            (
                "denormalize_min_read_write_ratio",
                self.denormalize_min_read_write_ratio,
            ),
            ("denormalize_base_confidence", self.denormalize_base_confidence),
            ("denormalize_join_weight", self.denormalize_join_weight),
            ("normalize_base_confidence", self.normalize_base_confidence),
            ("normalize_column_weight", self.normalize_column_weight),
            (
                "partition_min_read_write_ratio",
                self.partition_min_read_write_ratio,
            ),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                return Err(SchemawiseError::ParameterValidation(format!(
                    "{} must be a finite number",
                    name
                )));
            }
        }

        Ok(())
    }
}
