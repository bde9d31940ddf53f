use crate::source::ReportKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to obtain {report} report: {reason}")]
    CommandExecution { report: ReportKind, reason: String },

    #[error("Malformed line in {report} report ({reason}): {line:?}")]
    MalformedLine {
        report: ReportKind,
        line: String,
        reason: String,
    },

    #[error("Malformed {report} report: {reason}")]
    MalformedReport { report: ReportKind, reason: String },

    #[error("Invalid numeric token: {token:?}")]
    Parse { token: String },
}

impl ExporterError {
    pub(crate) fn malformed_line(report: ReportKind, line: &str, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            report,
            line: line.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_report(report: ReportKind, reason: impl Into<String>) -> Self {
        Self::MalformedReport {
            report,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
