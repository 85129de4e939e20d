//! Drift Detection Logic
//!
//! This module compares a current dataset against a reference dataset column
//! by column, aggregates a dataset-level verdict, and extracts the values a
//! drift detection run publishes.

pub mod detector;
pub mod report;
pub mod stats;
pub mod stattest;
pub mod verdict;

pub use detector::{DriftDetector, StatTestDetector};
pub use report::{ColumnDrift, DatasetDrift, DriftReport};
pub use stattest::{Sample, ScoreKind, StatTest};
pub use verdict::DriftVerdict;
