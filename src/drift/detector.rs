//! Drift report generation.
//!
//! [`DriftDetector`] is the narrow seam between the jobs and the statistics:
//! datasets and a column mapping go in, a [`DriftReport`] comes out.
use crate::config::DriftOptions;
use crate::data::Dataset;
use crate::drift::report::{ColumnDrift, DriftReport};
use crate::drift::stattest::{Sample, StatTest};
use crate::errors::DriftError;
use crate::mapping::{ColumnMapping, FeatureKind};
use log::{debug, info};
use rayon::prelude::*;

const REFERENCE: &str = "reference";
const CURRENT: &str = "current";

/// Compare two datasets under a column mapping.
pub trait DriftDetector {
    fn compare(&self, reference: &Dataset, current: &Dataset, mapping: &ColumnMapping)
        -> Result<DriftReport, DriftError>;
}

/// Per-column hypothesis tests and distances, aggregated by drift share.
#[derive(Debug, Clone, Default)]
pub struct StatTestDetector {
    pub options: DriftOptions,
}

impl StatTestDetector {
    pub fn new(options: DriftOptions) -> Self {
        StatTestDetector { options }
    }

    fn column_drift(
        &self,
        reference: &Dataset,
        current: &Dataset,
        name: &str,
        kind: FeatureKind,
    ) -> Result<ColumnDrift, DriftError> {
        let sample = |data: &Dataset, label: &str| -> Result<Sample, DriftError> {
            let column = data
                .column(name)
                .ok_or_else(|| DriftError::mismatch(name, label, "column not found"))?;
            if kind == FeatureKind::Numerical && !column.column_type().is_numeric() {
                return Err(DriftError::mismatch(
                    name,
                    label,
                    format!("numerical feature has {} values", column.column_type()),
                ));
            }
            let s = Sample::from_column(column);
            if s.is_empty() {
                return Err(DriftError::mismatch(name, label, "column has no values to compare"));
            }
            Ok(s)
        };
        let r = sample(reference, REFERENCE)?;
        let c = sample(current, CURRENT)?;

        let test = self
            .options
            .stattest
            .unwrap_or_else(|| StatTest::select(kind, r.len(), r.n_unique()));
        let threshold = self.options.stattest_threshold.unwrap_or_else(|| test.default_threshold());
        let score = test.score(&r, &c).ok_or_else(|| {
            DriftError::mismatch(name, REFERENCE, format!("{} cannot be applied to this column", test))
        })?;
        let drift_detected = test.is_drift(score, threshold);
        debug!(
            "Column {}: {} = {:.6} (threshold {}), drift detected: {}",
            name, test, score, threshold, drift_detected
        );

        Ok(ColumnDrift {
            column_name: name.to_string(),
            column_type: kind,
            stattest_name: test.name().to_string(),
            stattest_threshold: threshold,
            drift_score: score,
            drift_detected,
            reference_size: r.len(),
            current_size: c.len(),
        })
    }
}

impl DriftDetector for StatTestDetector {
    fn compare(
        &self,
        reference: &Dataset,
        current: &Dataset,
        mapping: &ColumnMapping,
    ) -> Result<DriftReport, DriftError> {
        if let Some(date) = &mapping.datetime {
            for (data, label) in [(reference, REFERENCE), (current, CURRENT)] {
                if data.column(date).is_none() {
                    return Err(DriftError::mismatch(date, label, "date column not found"));
                }
            }
        }

        let features = mapping.resolve_features(reference);
        let columns: Vec<ColumnDrift> = if self.options.parallel {
            features
                .par_iter()
                .map(|&(name, kind)| self.column_drift(reference, current, name, kind))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            features
                .iter()
                .map(|&(name, kind)| self.column_drift(reference, current, name, kind))
                .collect::<Result<Vec<_>, _>>()?
        };

        let report = DriftReport::new(columns, self.options.drift_share);
        info!(
            "{} of {} columns drifted (share {:.3}, threshold {}).",
            report.dataset.number_of_drifted_columns,
            report.dataset.number_of_columns,
            report.dataset.share_of_drifted_columns,
            report.dataset.drift_share
        );
        Ok(report)
    }
}
