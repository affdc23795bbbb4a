//! Configuration types for ingest pipelines.
//!
//! This module provides:
//! - `ReaderConfig`: Line reader settings
//! - `FilterConfig`: Specification for a single filter stage
//! - `PipelineConfig`: Configuration for a complete pipeline

mod pipeline;

pub use pipeline::{DEFAULT_MAX_RECORDS, FilterConfig, PipelineConfig, ReaderConfig};
