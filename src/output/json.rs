// src/output/json.rs
use std::io::Write;

use serde::Serialize;

use crate::extractors::section::InsightsRecord;
use crate::utils::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub error: String,
}

/// The single JSON value a run emits: either the excerpts or an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Insights(InsightsRecord),
    Error(ErrorRecord),
}

impl Report {
    pub fn error(message: impl Into<String>) -> Self {
        Report::Error(ErrorRecord { error: message.into() })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Report::Error(_))
    }
}

/// Writes the report followed by a newline. Insights are pretty-printed with
/// two-space indentation unless `compact`; errors are always on one line.
pub fn write_report<W: Write>(out: &mut W, report: &Report, compact: bool) -> Result<(), AppError> {
    let json = match report {
        Report::Insights(record) if !compact => serde_json::to_string_pretty(record)?,
        _ => serde_json::to_string(report)?,
    };
    writeln!(out, "{json}")?;
    out.flush()?;
    Ok(())
}
