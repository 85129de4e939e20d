use crate::config::DetectConfig;
use crate::data::Dataset;
use crate::drift::{DriftDetector, DriftVerdict};
use crate::errors::DriftError;
use crate::mapping::ColumnMapping;
use crate::outputs::{publish_verdict, OutputSink};
use log::info;

/// Load both datasets, compare them, and publish the verdict.
pub fn run_detect<D, S>(config: &DetectConfig, detector: &D, sink: &mut S) -> Result<DriftVerdict, DriftError>
where
    D: DriftDetector + ?Sized,
    S: OutputSink + ?Sized,
{
    let reference = Dataset::from_csv(&config.data.reference, &config.columns.date)?;
    info!(
        "Loaded reference data from {} ({} rows).",
        config.data.reference.display(),
        reference.rows()
    );
    let current = Dataset::from_csv(&config.data.current, &config.columns.date)?;
    info!(
        "Loaded current data from {} ({} rows).",
        config.data.current.display(),
        current.rows()
    );

    let mapping = ColumnMapping::from_config(&config.columns);
    let report = detector.compare(&reference, &current, &mapping)?;
    if let Some(path) = &config.report {
        report.save_json(path)?;
        info!("Saved drift report to {}.", path.display());
    }

    let verdict = DriftVerdict::from_report(&report);
    if verdict.drift_detected {
        info!(
            "Detect dataset drift between {} and {}",
            config.dates.start, config.dates.end
        );
    } else {
        info!(
            "Detect no dataset drift between {} and {}",
            config.dates.start, config.dates.end
        );
    }
    if verdict.p_value.is_none() {
        info!("No column drifted, p_value is published as null.");
    }

    publish_verdict(sink, &verdict)?;
    Ok(verdict)
}
