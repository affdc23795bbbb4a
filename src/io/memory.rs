//! In-memory byte sources for testing and embedding.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ByteSource, SourceProvider};

/// In-memory source provider whose contents can grow after sources are opened.
///
/// Every opened [`MemorySource`] shares the provider's buffer, so bytes passed
/// to [`append`](MemoryProvider::append) become readable on the next poll. This
/// mimics a file being written to while it is tailed.
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    id: String,
    data: Arc<Mutex<Vec<u8>>>,
    chunk_size: Option<usize>,
}

impl MemoryProvider {
    /// Create a new in-memory provider with the given data.
    pub fn new(id: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            data: Arc::new(Mutex::new(data)),
            chunk_size: None,
        }
    }

    /// Create a new in-memory provider from a string.
    pub fn from_string(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self::new(id, data.into().into_bytes())
    }

    /// Limit every read to at most `size` bytes.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = Some(size.max(1));
        self
    }

    /// Append bytes, making them visible to every open source.
    pub fn append(&self, bytes: impl AsRef<[u8]>) {
        lock(&self.data).extend_from_slice(bytes.as_ref());
    }

    /// Total number of bytes currently held.
    pub fn len(&self) -> usize {
        lock(&self.data).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SourceProvider for MemoryProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn open(&self) -> io::Result<Box<dyn ByteSource + Send>> {
        Ok(Box::new(MemorySource {
            id: self.id.clone(),
            data: self.data.clone(),
            chunk_size: self.chunk_size,
            pos: 0,
            closed: false,
        }))
    }
}

fn lock(data: &Mutex<Vec<u8>>) -> MutexGuard<'_, Vec<u8>> {
    data.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Byte source reading from a [`MemoryProvider`] buffer.
#[derive(Debug)]
pub struct MemorySource {
    id: String,
    data: Arc<Mutex<Vec<u8>>>,
    chunk_size: Option<usize>,
    pos: usize,
    closed: bool,
}

impl MemorySource {
    fn check_open(&self) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("source '{}' is closed", self.id),
            ));
        }
        Ok(())
    }
}

impl ByteSource for MemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn ready(&mut self) -> io::Result<bool> {
        Ok(!self.closed && lock(&self.data).len() > self.pos)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_open()?;
        let data = lock(&self.data);
        let available = &data[self.pos.min(data.len())..];
        let mut n = available.len().min(buf.len());
        if let Some(chunk) = self.chunk_size {
            n = n.min(chunk);
        }
        buf[..n].copy_from_slice(&available[..n]);
        drop(data);
        self.pos += n;
        Ok(n)
    }

    fn skip(&mut self, n: u64) -> io::Result<u64> {
        self.check_open()?;
        let len = lock(&self.data).len();
        let step = (len.saturating_sub(self.pos) as u64).min(n);
        self.pos += step as usize;
        Ok(step)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.check_open()?;
        self.pos = 0;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}
