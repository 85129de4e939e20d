//! Published Outputs
//!
//! Named key/value outputs handed to the calling workflow engine.
use crate::drift::DriftVerdict;
use crate::errors::DriftError;
use serde_json::{json, Value};
use std::io::{self, Stdout, Write};

/// Destination for named job outputs.
pub trait OutputSink {
    fn publish(&mut self, key: &str, value: Value) -> Result<(), DriftError>;
}

/// Writes outputs using the Kestra script protocol, one line per output:
/// `::{"outputs":{"key":value}}::`.
pub struct KestraOutputs<W: Write> {
    writer: W,
}

impl KestraOutputs<Stdout> {
    pub fn stdout() -> Self {
        KestraOutputs { writer: io::stdout() }
    }
}

impl<W: Write> KestraOutputs<W> {
    pub fn new(writer: W) -> Self {
        KestraOutputs { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for KestraOutputs<W> {
    fn publish(&mut self, key: &str, value: Value) -> Result<(), DriftError> {
        let message = json!({ "outputs": { key: value } });
        writeln!(self.writer, "::{}::", message)
            .and_then(|_| self.writer.flush())
            .map_err(|e| DriftError::Output(e.to_string()))
    }
}

/// Publish `drift_detected` and `p_value`; an undefined score is `null`.
/// A non-finite score is refused before anything is written.
pub fn publish_verdict<S: OutputSink + ?Sized>(sink: &mut S, verdict: &DriftVerdict) -> Result<(), DriftError> {
    if let Some(p) = verdict.p_value.filter(|p| !p.is_finite()) {
        return Err(DriftError::Output(format!("p_value {} is not a finite number", p)));
    }
    sink.publish("drift_detected", Value::Bool(verdict.drift_detected))?;
    sink.publish("p_value", json!(verdict.p_value))
}
