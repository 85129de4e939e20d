//! Drift Report
//!
//! Structured result of comparing a current dataset against a reference
//! dataset: a dataset-level verdict and a per-column breakdown.
use crate::errors::DriftError;
use crate::mapping::FeatureKind;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Drift result for one compared column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub column_name: String,
    pub column_type: FeatureKind,
    pub stattest_name: String,
    pub stattest_threshold: f64,
    /// A p-value or a distance, depending on the test.
    pub drift_score: f64,
    pub drift_detected: bool,
    pub reference_size: usize,
    pub current_size: usize,
}

/// Dataset-level summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDrift {
    pub number_of_columns: usize,
    pub number_of_drifted_columns: usize,
    pub share_of_drifted_columns: f64,
    pub drift_share: f64,
    pub dataset_drift: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub dataset: DatasetDrift,
    pub columns: Vec<ColumnDrift>,
}

impl DriftReport {
    /// Summarize column results. The dataset drifts when the share of
    /// drifted columns reaches `drift_share`; no columns means no drift.
    pub fn new(columns: Vec<ColumnDrift>, drift_share: f64) -> Self {
        let number_of_columns = columns.len();
        let number_of_drifted_columns = columns.iter().filter(|c| c.drift_detected).count();
        let share_of_drifted_columns = if number_of_columns == 0 {
            0.0
        } else {
            number_of_drifted_columns as f64 / number_of_columns as f64
        };
        DriftReport {
            dataset: DatasetDrift {
                number_of_columns,
                number_of_drifted_columns,
                share_of_drifted_columns,
                drift_share,
                dataset_drift: number_of_columns > 0 && share_of_drifted_columns >= drift_share,
            },
            columns,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDrift> {
        self.columns.iter().find(|c| c.column_name == name)
    }

    pub fn drifted_columns(&self) -> impl Iterator<Item = &ColumnDrift> {
        self.columns.iter().filter(|c| c.drift_detected)
    }

    pub fn to_json(&self) -> Result<String, DriftError> {
        serde_json::to_string_pretty(self).map_err(|e| DriftError::Output(e.to_string()))
    }

    /// Write the report as pretty JSON, creating parent directories.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), DriftError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DriftError::io(&name, e))?;
        }
        let file = File::create(path).map_err(|e| DriftError::io(&name, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| DriftError::Output(e.to_string()))
    }
}
