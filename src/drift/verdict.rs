//! Drift verdict extraction.
use crate::drift::report::DriftReport;
use crate::utils::mean;
use serde::{Deserialize, Serialize};

/// The two values published by a drift detection run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftVerdict {
    pub drift_detected: bool,
    /// Mean drift score over the columns flagged as drifted; `None` when
    /// no column drifted.
    pub p_value: Option<f64>,
}

impl DriftVerdict {
    pub fn from_report(report: &DriftReport) -> Self {
        let scores: Vec<f64> = report.drifted_columns().map(|c| c.drift_score).collect();
        DriftVerdict {
            drift_detected: report.dataset.dataset_drift,
            p_value: mean(&scores),
        }
    }
}
