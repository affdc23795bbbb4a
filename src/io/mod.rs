//! Byte-stream abstractions consumed by the line reader.
//!
//! This module provides:
//! - `ByteSource`: Trait for non-blocking readable byte streams
//! - `SourceProvider`: Trait for opening byte sources
//! - Standard implementations for files and stdin
//! - In-memory implementations for testing

mod input;
mod memory;
mod std_io;

pub use input::{ByteSource, SourceProvider};
pub use memory::{MemoryProvider, MemorySource};
pub use std_io::{FileProvider, FileSource, StdinProvider, StreamSource};
