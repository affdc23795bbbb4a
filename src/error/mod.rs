//! Error types and policies for tailio.
//!
//! This module provides:
//! - `ErrorPolicy`: Controls whether per-record failures abort a chain call
//! - `Phase`: Indicates where a file-level error occurred
//! - `ReaderError`: Failures of the incremental line reader
//! - `FilterError`: Failures of filter preparation, initialization and application
//! - `FileError`: A single file-level error with context
//! - `AggregateError`: A collection of file-level errors

use std::fmt;
use std::io;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Abort the chain call at the first per-record failure
    FastFail,
    /// Report per-record failures alongside the batch and keep going
    #[default]
    Accumulate,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast_fail" | "fastfail" | "fail" => Ok(ErrorPolicy::FastFail),
            "accumulate" | "continue" => Ok(ErrorPolicy::Accumulate),
            other => Err(format!("unknown error policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Error while opening the byte source
    Open,
    Seek,
    Read,
    /// Error while preparing filter arguments
    Prepare,
    Init,
    Filter,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Open => write!(f, "Open"),
            Phase::Seek => write!(f, "Seek"),
            Phase::Read => write!(f, "Read"),
            Phase::Prepare => write!(f, "Prepare"),
            Phase::Init => write!(f, "Init"),
            Phase::Filter => write!(f, "Filter"),
        }
    }
}

/// Errors raised by [`LineReader`](crate::reader::LineReader).
///
/// All variants are fatal for the file they concern. Retrying is left to the
/// caller.
#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("source '{target}' is unavailable")]
    SourceUnavailable {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while reading '{target}'")]
    Io {
        target: String,
        #[source]
        source: io::Error,
    },

    /// Skipping failed; `position` is the last byte successfully skipped to.
    #[error("seek on '{target}' failed at byte {position}")]
    Seek {
        target: String,
        position: u64,
        #[source]
        source: io::Error,
    },

    #[error("invalid {charset} data in '{target}' at byte {offset}")]
    Decode {
        target: String,
        charset: &'static str,
        offset: u64,
    },

    #[error("reader for '{0}' is closed")]
    Closed(String),
}

/// Errors raised while building, initializing or running a filter chain.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("filter '{filter}' requires argument '{argument}'")]
    MissingArgument { filter: String, argument: String },

    #[error("filter '{filter}' has invalid argument '{argument}': {reason}")]
    InvalidArgument {
        filter: String,
        argument: String,
        reason: String,
    },

    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    #[error("stage '{stage}' failed to initialize")]
    ChainInitialization {
        stage: String,
        #[source]
        source: Box<FilterError>,
    },

    #[error("filter chain used before init")]
    NotInitialized,

    /// A failure scoped to a single record.
    #[error("filter '{filter}' rejected record: {message}")]
    Record { filter: String, message: String },

    #[error("filter '{filter}' failed: {message}")]
    Structural { filter: String, message: String },
}

impl FilterError {
    pub fn missing(filter: impl Into<String>, argument: impl Into<String>) -> Self {
        FilterError::MissingArgument {
            filter: filter.into(),
            argument: argument.into(),
        }
    }

    pub fn invalid(
        filter: impl Into<String>,
        argument: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        FilterError::InvalidArgument {
            filter: filter.into(),
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    pub fn record(filter: impl Into<String>, message: impl Into<String>) -> Self {
        FilterError::Record {
            filter: filter.into(),
            message: message.into(),
        }
    }

    /// Whether the chain may continue with the next record after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, FilterError::Record { .. })
    }
}

#[derive(Debug)]
pub struct FileError {
    /// Phase where the error occurred
    pub phase: Phase,
    /// Identifier of the source (file path, "-" for stdin, etc.)
    pub target: String,
    /// The underlying error
    pub error: Box<dyn std::error::Error + Send + Sync>,
}

impl FileError {
    pub fn new(
        phase: Phase,
        target: impl Into<String>,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            phase,
            target: target.into(),
            error: Box::new(error),
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.phase, self.target, self.error)
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}

/// An aggregate of multiple file-level errors.
///
/// Returned by the builder when several filter configurations fail to
/// prepare under `ErrorPolicy::Accumulate`.
#[derive(Debug, Error)]
pub struct AggregateError {
    /// Collection of individual errors
    pub errors: Vec<FileError>,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ingest encountered {} error(s):", self.errors.len())?;
        for (i, e) in self.errors.iter().enumerate() {
            writeln!(f, "  #{}: {}", i + 1, e)?;
        }
        Ok(())
    }
}

impl AggregateError {
    /// Create a new aggregate error with a single error.
    pub fn single(error: FileError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

impl From<FileError> for AggregateError {
    fn from(error: FileError) -> Self {
        Self::single(error)
    }
}

#[cfg(feature = "miette")]
mod miette_impl;

#[cfg(feature = "miette")]
pub use miette_impl::*;
