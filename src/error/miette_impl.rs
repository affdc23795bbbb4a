//! Miette integration for pretty error reporting.

use miette::{Diagnostic, Severity};
use thiserror::Error;

use super::{AggregateError, FileError, Phase};

/// A diagnostic wrapper for ingest errors compatible with miette.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct IngestDiagnostic {
    /// The error message
    pub message: String,

    #[source]
    /// The underlying error source
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,

    #[help]
    /// Help text for the user
    pub help: Option<String>,

    #[diagnostic(severity)]
    /// Severity level
    pub severity: Severity,
}

fn help_for(phase: Phase) -> &'static str {
    match phase {
        Phase::Open => "Check that the source exists and is readable",
        Phase::Seek => "The checkpoint may be past the end of a truncated or rotated file",
        Phase::Read => "The source failed while being read; retry or skip the file",
        Phase::Prepare => "Check the filter arguments in the pipeline configuration",
        Phase::Init => "Check the metadata supplied for this file",
        Phase::Filter => "A filter aborted the batch; inspect the filter configuration",
    }
}

impl From<FileError> for IngestDiagnostic {
    fn from(e: FileError) -> Self {
        IngestDiagnostic {
            message: format!("[{}] on '{}'", e.phase, e.target),
            help: Some(help_for(e.phase).into()),
            source: Some(e.error),
            severity: Severity::Error,
        }
    }
}

impl From<AggregateError> for IngestDiagnostic {
    fn from(agg: AggregateError) -> Self {
        match agg.errors.into_iter().next() {
            Some(e) => IngestDiagnostic::from(e),
            None => IngestDiagnostic {
                message: "Unknown ingest error".into(),
                source: None,
                help: None,
                severity: Severity::Error,
            },
        }
    }
}

impl From<AggregateError> for miette::Report {
    fn from(agg: AggregateError) -> Self {
        miette::Report::new(IngestDiagnostic::from(agg))
    }
}
