//! Errors
//!
//! Custom error types used throughout the `driftwatch` crate.
use thiserror::Error;

/// Errors that can occur while detecting drift or initializing tables.
#[derive(Debug, Error)]
pub enum DriftError {
    /// Input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// Input data could not be parsed.
    #[error("Unable to parse {path}: {reason}")]
    Parse { path: String, reason: String },
    /// A configured column is absent from a dataset, or cannot be compared.
    #[error("Column {column} does not match the {dataset} dataset: {reason}")]
    SchemaMismatch {
        column: String,
        dataset: String,
        reason: String,
    },
    /// The relational store could not be reached.
    #[error("Unable to connect to {0}")]
    Connection(String),
    /// The dataset cannot be represented in the relational store.
    #[error("Unable to write table {table}: {reason}")]
    Schema { table: String, reason: String },
    /// Configuration is missing or malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Unable to publish an output or write a report.
    #[error("Unable to write output: {0}")]
    Output(String),
    /// Any other filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl DriftError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            DriftError::FileNotFound(path.into())
        } else {
            DriftError::Io {
                path: path.into(),
                source,
            }
        }
    }

    pub(crate) fn mismatch(column: &str, dataset: &str, reason: impl Into<String>) -> Self {
        DriftError::SchemaMismatch {
            column: column.to_string(),
            dataset: dataset.to_string(),
            reason: reason.into(),
        }
    }
}
