//! Record filters and the ordered chain that runs them.
//!
//! This module provides:
//! - `Record`: The unit flowing through a chain
//! - `RecordFilter`: The prepare/init/accept/apply/drain contract of a filter
//! - `FilterChain`: Ordered stages with flush propagation
//! - `FilterRegistry`: Maps configuration keys to filter factories
//! - Built-in filters under [`builtin`]

use std::collections::BTreeMap;
use std::fmt::Debug;

mod args;
pub mod builtin;
mod chain;
mod record;
mod registry;

pub use args::FilterArgs;
pub use builtin::Filter;
pub use chain::{ChainOutput, FilterChain, FilterStage, RecordFailure};
pub use record::{Record, Span};
pub use registry::{FilterFactory, FilterRegistry, default_registry};

use crate::error::FilterError;

/// Read-only context handed to every filter when a chain is initialized for
/// a source.
#[derive(Debug, Clone, Default)]
pub struct FileContext {
    /// Identifier of the source being ingested
    pub source: String,
    pub metadata: BTreeMap<String, String>,
}

impl FileContext {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A configured transformation over records.
///
/// Filters are built from [`FilterArgs`] by their own `prepare` constructor,
/// then initialized once per source with [`init`](RecordFilter::init).
///
/// `apply` may return zero, one or many records. A filter that buffers
/// records across calls must emit them when `has_next` is false and must hand
/// back anything still buffered from [`drain`](RecordFilter::drain).
pub trait RecordFilter: Debug + Send {
    fn name(&self) -> &str;

    /// Resolve context-dependent settings. Called before the first `apply`.
    fn init(&mut self, _context: &FileContext) -> Result<(), FilterError> {
        Ok(())
    }

    /// Whether `apply` should see this record. Rejected records skip the
    /// filter unchanged.
    fn accept(&self, _record: &Record) -> bool {
        true
    }

    fn apply(&mut self, record: Record, has_next: bool) -> Result<Vec<Record>, FilterError>;

    /// Release buffered records. Stateless filters return nothing.
    fn drain(&mut self) -> Vec<Record> {
        Vec::new()
    }
}
