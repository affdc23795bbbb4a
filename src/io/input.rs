//! Byte source and source provider trait definitions.

use std::fmt::Debug;
use std::io;

/// A readable byte stream that can be polled without blocking.
///
/// The reader never calls [`read`](ByteSource::read) unless
/// [`ready`](ByteSource::ready) reported data, so implementations backed by a
/// growing file must answer `ready` from what is currently on disk.
pub trait ByteSource: Debug {
    /// Returns a unique identifier for this source, used in errors and logs.
    fn id(&self) -> &str;

    /// Whether at least one byte can be read right now.
    fn ready(&mut self) -> io::Result<bool>;

    /// Reads up to `buf.len()` currently available bytes. Zero means no data.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Skips forward by at most `n` bytes, returning how many were skipped.
    ///
    /// Returns `Ok(0)` once the end of the stream is reached.
    fn skip(&mut self, n: u64) -> io::Result<u64>;

    /// Repositions the stream at its first byte.
    fn rewind(&mut self) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("source '{}' cannot be rewound", self.id()),
        ))
    }

    /// Releases the underlying handle. Must be safe to call more than once.
    fn close(&mut self) -> io::Result<()>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn ready(&mut self) -> io::Result<bool> {
        (**self).ready()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn skip(&mut self, n: u64) -> io::Result<u64> {
        (**self).skip(n)
    }

    fn rewind(&mut self) -> io::Result<()> {
        (**self).rewind()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

/// Trait for providers that open byte sources.
///
/// Implementors provide a way to open a fresh stream from files, stdin or
/// in-memory buffers.
pub trait SourceProvider: Send + Sync + Debug {
    /// Returns a unique identifier for this provider.
    ///
    /// Convention: "-" for stdin, file path for files.
    fn id(&self) -> &str;

    /// Open and return a new byte source positioned at the beginning.
    fn open(&self) -> io::Result<Box<dyn ByteSource + Send>>;
}
