//! Incremental, resumable line extraction over non-blocking byte sources.
//!
//! [`LineReader`] never waits for a line terminator. Each call to
//! [`poll`](LineReader::poll) consumes whatever bytes are available right now,
//! returns the complete lines found in them, and keeps any unterminated tail
//! buffered for the next call. This lets a scheduler interleave many files,
//! some of which may still be appended to by another writer.
//!
//! Offsets are absolute byte positions in the source. The `end_offset` of the
//! last returned block (or [`position`](LineReader::position)) is a checkpoint
//! that a later reader can [`seek`](LineReader::seek) to.

mod block;
mod charset;

pub use block::TextBlock;
pub use charset::Charset;

use tracing::{debug, error, info, trace, warn};

use crate::config::ReaderConfig;
use crate::error::ReaderError;
use crate::io::{ByteSource, SourceProvider};

pub const DEFAULT_INITIAL_CAPACITY: usize = 4096;

/// Line extractor over an exclusively owned [`ByteSource`].
pub struct LineReader<S: ByteSource = Box<dyn ByteSource + Send>> {
    source: S,
    target: String,
    charset: Charset,
    initial_capacity: usize,
    // buffer[..fill] holds bytes read but not yet attributed to a block
    buffer: Vec<u8>,
    fill: usize,
    // no terminator in buffer[..scanned]
    scanned: usize,
    position: u64,
    // bytes pulled from the source by reads and skips
    source_position: u64,
    auto_flush: bool,
    closed: bool,
}

impl<S: ByteSource> std::fmt::Debug for LineReader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineReader")
            .field("target", &self.target)
            .field("charset", &self.charset)
            .field("capacity", &self.buffer.len())
            .field("buffered", &self.fill)
            .field("position", &self.position)
            .field("auto_flush", &self.auto_flush)
            .field("closed", &self.closed)
            .finish()
    }
}

impl LineReader {
    /// Open a source from `provider` and wrap it according to `config`.
    pub fn open(provider: &dyn SourceProvider, config: &ReaderConfig) -> Result<Self, ReaderError> {
        let source = provider
            .open()
            .map_err(|source| ReaderError::SourceUnavailable {
                target: provider.id().to_string(),
                source,
            })?;
        let mut reader = LineReader::with_capacity(source, config.initial_capacity, config.charset);
        reader.set_auto_flush(config.auto_flush);
        Ok(reader)
    }
}

impl<S: ByteSource> LineReader<S> {
    pub fn new(source: S, charset: Charset) -> Self {
        Self::with_capacity(source, DEFAULT_INITIAL_CAPACITY, charset)
    }

    pub fn with_capacity(source: S, initial_capacity: usize, charset: Charset) -> Self {
        let initial_capacity = initial_capacity.max(1);
        let target = source.id().to_string();
        Self {
            source,
            target,
            charset,
            initial_capacity,
            buffer: vec![0; initial_capacity],
            fill: 0,
            scanned: 0,
            position: 0,
            source_position: 0,
            auto_flush: true,
            closed: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.target
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Absolute offset of the first byte not yet attributed to a block.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Current buffer capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// When enabled, an unterminated tail is emitted as a final block once the
    /// source has no more data.
    pub fn set_auto_flush(&mut self, enabled: bool) {
        self.auto_flush = enabled;
    }

    pub fn is_auto_flush(&self) -> bool {
        self.auto_flush
    }

    /// Whether bytes have been read that are not yet part of an emitted block.
    pub fn remaining(&self) -> bool {
        self.fill != 0
    }

    /// Whether the source reports bytes available right now.
    pub fn has_more(&mut self) -> bool {
        if self.closed {
            return false;
        }
        match self.source.ready() {
            Ok(ready) => ready,
            Err(e) => {
                error!(target = %self.target, error = %e, "error while checking for remaining bytes");
                false
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Return up to `max_records` complete lines from the bytes available now.
    ///
    /// Never waits for data. Returns an empty vector when no complete line is
    /// available; a line split across reads is returned once its terminator
    /// arrives.
    pub fn poll(&mut self, max_records: usize) -> Result<Vec<TextBlock>, ReaderError> {
        self.ensure_open()?;
        let mut blocks = Vec::new();
        if max_records == 0 {
            return Ok(blocks);
        }

        loop {
            while blocks.len() < max_records {
                match self.extract_line()? {
                    Some(block) => blocks.push(block),
                    None => break,
                }
            }
            if blocks.len() >= max_records || !self.ready()? {
                break;
            }
            if self.fill == self.buffer.len() {
                self.grow();
            }
            let n = self
                .source
                .read(&mut self.buffer[self.fill..])
                .map_err(|e| self.io_error(e))?;
            if n == 0 {
                break;
            }
            self.fill += n;
            self.source_position += n as u64;
        }

        if blocks.len() < max_records && self.auto_flush && self.fill > 0 && !self.ready()? {
            info!(target = %self.target, bytes = self.fill, "end of input reached, flushing remaining buffered bytes");
            if let Some(block) = self.flush_tail()? {
                blocks.push(block);
            }
        }
        Ok(blocks)
    }

    /// Emit every buffered byte regardless of auto-flush: first the complete
    /// lines, then the unterminated tail as a final block.
    pub fn flush(&mut self) -> Result<Vec<TextBlock>, ReaderError> {
        self.ensure_open()?;
        let mut blocks = Vec::new();
        while let Some(block) = self.extract_line()? {
            blocks.push(block);
        }
        if let Some(block) = self.flush_tail()? {
            blocks.push(block);
        }
        Ok(blocks)
    }

    /// Reposition at absolute byte `offset`, discarding buffered bytes.
    ///
    /// The source is advanced with forward skips only; if bytes past `offset`
    /// were already pulled, the source is rewound first. Returns the position
    /// actually reached, which is short of `offset` when the stream ends first.
    pub fn seek(&mut self, offset: Option<u64>) -> Result<u64, ReaderError> {
        self.ensure_open()?;
        let offset = offset.unwrap_or(0);

        self.buffer = vec![0; self.initial_capacity];
        self.fill = 0;
        self.scanned = 0;
        self.position = self.source_position;

        if self.source_position > offset {
            debug!(target = %self.target, from = self.source_position, "rewinding source");
            self.source.rewind().map_err(|source| ReaderError::Seek {
                target: self.target.clone(),
                position: self.source_position,
                source,
            })?;
            self.source_position = 0;
            self.position = 0;
        }

        if self.source_position < offset {
            debug!(target = %self.target, offset, "skipping to offset");
        }
        while self.source_position < offset {
            let skipped = match self.source.skip(offset - self.source_position) {
                Ok(n) => n,
                Err(source) => {
                    self.position = self.source_position;
                    return Err(ReaderError::Seek {
                        target: self.target.clone(),
                        position: self.source_position,
                        source,
                    });
                }
            };
            if skipped == 0 {
                warn!(
                    target = %self.target,
                    requested = offset,
                    reached = self.source_position,
                    "stream ended before seek offset"
                );
                break;
            }
            self.source_position += skipped;
        }

        self.position = self.source_position;
        Ok(self.position)
    }

    /// Close the source and drop buffered bytes. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.fill = 0;
        self.scanned = 0;
        match self.source.close() {
            Ok(()) => trace!(target = %self.target, "closed source"),
            Err(e) => error!(target = %self.target, error = %e, "failed to close source"),
        }
    }

    fn ensure_open(&self) -> Result<(), ReaderError> {
        if self.closed {
            return Err(ReaderError::Closed(self.target.clone()));
        }
        Ok(())
    }

    fn ready(&mut self) -> Result<bool, ReaderError> {
        self.source.ready().map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> ReaderError {
        ReaderError::Io {
            target: self.target.clone(),
            source,
        }
    }

    fn grow(&mut self) {
        let capacity = self.buffer.len() * 2;
        self.buffer.resize(capacity, 0);
        debug!(target = %self.target, capacity, "grew line buffer");
    }

    fn extract_line(&mut self) -> Result<Option<TextBlock>, ReaderError> {
        let Some(i) = self.buffer[self.scanned..self.fill]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .map(|p| self.scanned + p)
        else {
            self.scanned = self.fill;
            return Ok(None);
        };

        let next_start = if self.buffer[i] == b'\n' {
            i + 1
        } else if i + 1 >= self.fill {
            // a '\n' may still follow this '\r'
            self.scanned = i;
            return Ok(None);
        } else if self.buffer[i + 1] == b'\n' {
            i + 2
        } else {
            i + 1
        };

        let block = self.make_block(i, next_start)?;
        self.consume(next_start);
        Ok(Some(block))
    }

    fn flush_tail(&mut self) -> Result<Option<TextBlock>, ReaderError> {
        if self.fill == 0 {
            return Ok(None);
        }
        let until = if self.buffer[self.fill - 1] == b'\r' {
            self.fill - 1
        } else {
            self.fill
        };
        let block = self.make_block(until, self.fill)?;
        self.consume(self.fill);
        Ok(Some(block))
    }

    fn make_block(&self, until: usize, next_start: usize) -> Result<TextBlock, ReaderError> {
        let content = self
            .charset
            .decode(&self.buffer[..until])
            .ok_or_else(|| ReaderError::Decode {
                target: self.target.clone(),
                charset: self.charset.name(),
                offset: self.position,
            })?;
        Ok(TextBlock::new(
            content,
            self.position,
            self.position + next_start as u64,
            until,
        ))
    }

    fn consume(&mut self, n: usize) {
        self.buffer.copy_within(n..self.fill, 0);
        self.fill -= n;
        self.scanned = 0;
        self.position += n as u64;
    }
}

impl<S: ByteSource> Drop for LineReader<S> {
    fn drop(&mut self) {
        self.close();
    }
}
