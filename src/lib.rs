//! # tailio
//!
//! Incremental, offset-addressable line ingestion with ordered filter chains.
//!
//! ## Overview
//!
//! tailio provides:
//! - **Non-blocking line reading**: [`LineReader`] returns the complete lines
//!   available right now and keeps partial lines buffered across calls
//! - **Byte-exact checkpoints**: every [`TextBlock`] carries the absolute
//!   offsets it covers; a reader can seek back to any `end_offset`
//! - **Filter chains**: ordered [`RecordFilter`] stages that may drop, rewrite,
//!   fan out or buffer records, drained exactly once at end of input
//! - **Error handling**: per-record failures reported alongside the output,
//!   under a configurable [`ErrorPolicy`]
//! - **Pipeline configuration**: define reader and filters in JSON, YAML or TOML
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tailio::{FileProvider, FilterConfig, PipelineBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = FileProvider::new("app.log");
//!     let mut engine = PipelineBuilder::default()
//!         .add_filter(FilterConfig::new("drop").with_arg("contains", "DEBUG"))
//!         .open(&provider, None)?;
//!
//!     loop {
//!         let batch = engine.poll()?;
//!         for record in &batch.records {
//!             println!("{}", serde_json::to_string(record)?);
//!         }
//!         if batch.last {
//!             break;
//!         }
//!     }
//!     println!("resume at {}", engine.position());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `csv` - `delimited_row` filter (enabled by default)
//! - `yaml` - YAML pipeline configuration
//! - `toml` - TOML pipeline configuration
//! - `async` - timer-driven polling stream with Tokio
//! - `miette` - pretty error reporting with miette
//!
//! ## Line semantics
//!
//! - A line ends at `\n`, at `\r\n`, or at a `\r` followed by anything else.
//! - A `\r` that is the last byte read so far is held back until the next
//!   byte shows whether it starts a `\r\n`.
//! - When the tail is flushed (auto-flush at end of input, or
//!   [`LineReader::flush`]) a trailing `\r` counts as the terminator.
//! - `end_offset` always includes the terminator, so the `end_offset` of one
//!   block is the `start_offset` of the next.

// Core modules
pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod io;
pub mod reader;

// Async modules (feature-gated)
#[cfg(feature = "async")]
pub mod engine_async;

// Re-exports for convenience
pub use builder::PipelineBuilder;
pub use config::{FilterConfig, PipelineConfig, ReaderConfig};
pub use engine::{Batch, IngestEngine};
pub use error::{AggregateError, ErrorPolicy, FileError, FilterError, Phase, ReaderError};
pub use filter::{
    ChainOutput, FileContext, Filter, FilterArgs, FilterChain, FilterRegistry, FilterStage,
    Record, RecordFailure, RecordFilter, Span, default_registry,
};
pub use io::{ByteSource, FileProvider, MemoryProvider, SourceProvider, StdinProvider};
pub use reader::{Charset, LineReader, TextBlock};

#[cfg(feature = "async")]
pub use engine_async::follow;

/// Open an IngestEngine for `provider` from a PipelineConfig using the
/// default FilterRegistry.
pub fn open_pipeline(
    config: PipelineConfig,
    provider: &dyn SourceProvider,
    checkpoint: Option<u64>,
) -> Result<IngestEngine, AggregateError> {
    let registry = filter::default_registry();
    builder::PipelineBuilder::from_pipeline_config(config, registry)?.open(provider, checkpoint)
}

/// Like [`open_pipeline`], letting the caller customize the builder first,
/// e.g. to register custom filters referenced by the configuration.
pub fn open_pipeline_with<F>(
    config: PipelineConfig,
    provider: &dyn SourceProvider,
    checkpoint: Option<u64>,
    customize: F,
) -> Result<IngestEngine, AggregateError>
where
    F: FnOnce(FilterRegistry) -> FilterRegistry,
{
    let registry = customize(filter::default_registry());
    builder::PipelineBuilder::from_pipeline_config(config, registry)?.open(provider, checkpoint)
}

// Miette re-exports
#[cfg(feature = "miette")]
pub use error::IngestDiagnostic;
