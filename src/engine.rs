//! Per-file ingest engine binding one line reader to one filter chain.

use tracing::{debug, info, warn};

use crate::error::{FileError, Phase};
use crate::filter::{FilterChain, Record, RecordFailure};
use crate::reader::LineReader;

/// Output of one engine cycle.
#[derive(Debug, Default)]
pub struct Batch {
    pub records: Vec<Record>,
    pub failures: Vec<RecordFailure>,
    /// Checkpoint: resume offset after this batch
    pub position: u64,
    /// The chain was told no more input follows and has been drained
    pub last: bool,
}

/// Drives one source through a filter chain, one bounded poll at a time.
///
/// Created by [`PipelineBuilder::open`](crate::PipelineBuilder::open).
#[derive(Debug)]
pub struct IngestEngine {
    reader: LineReader,
    chain: FilterChain,
    max_records: usize,
    follow: bool,
    finished: bool,
    // checkpoint taken before the batch that failed
    failed_at: Option<u64>,
}

impl IngestEngine {
    pub fn new(reader: LineReader, chain: FilterChain, max_records: usize) -> Self {
        Self {
            reader,
            chain,
            max_records: max_records.max(1),
            follow: false,
            finished: false,
            failed_at: None,
        }
    }

    /// Keep the chain open when the source runs dry, for files that are
    /// still being written.
    ///
    /// A followed source has no end, so the reader never auto-flushes an
    /// unterminated tail; [`finish`](Self::finish) emits it.
    pub fn following(mut self, follow: bool) -> Self {
        self.follow = follow;
        if follow {
            self.reader.set_auto_flush(false);
        }
        self
    }

    pub fn target(&self) -> &str {
        self.reader.id()
    }

    /// Resume offset covering every line handed to the chain so far.
    ///
    /// After a failed poll this is the offset the failed batch started at,
    /// so none of its lines are lost on resume.
    pub fn position(&self) -> u64 {
        self.failed_at.unwrap_or_else(|| self.reader.position())
    }

    pub fn reader(&self) -> &LineReader {
        &self.reader
    }

    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    pub fn max_records(&self) -> usize {
        self.max_records
    }

    pub fn is_following(&self) -> bool {
        self.follow
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Read up to `max_records` newly available lines and run them through
    /// the chain.
    ///
    /// Never waits for data. When the source has nothing more and the engine
    /// is not following it, the chain is drained and the batch is marked
    /// `last`.
    ///
    /// An error stops the engine: later polls return an empty `last` batch
    /// and [`position`](Self::position) rolls back to the start of the
    /// failed batch.
    pub fn poll(&mut self) -> Result<Batch, FileError> {
        if self.finished {
            return Ok(self.batch(Vec::new(), Vec::new(), true));
        }
        let checkpoint = self.reader.position();
        let blocks = match self.reader.poll(self.max_records) {
            Ok(blocks) => blocks,
            Err(e) => return Err(self.fail(checkpoint, Phase::Read, e)),
        };
        let full = blocks.len() >= self.max_records;
        let has_next = self.follow || full || self.reader.has_more();

        let records: Vec<Record> = blocks.into_iter().map(Record::from).collect();
        debug!(target = %self.reader.id(), lines = records.len(), has_next, "polled lines");
        let output = match self.chain.apply(records, has_next) {
            Ok(output) => output,
            Err(e) => return Err(self.fail(checkpoint, Phase::Filter, e)),
        };

        Ok(self.batch(output.records, output.failures, !has_next))
    }

    /// Force out the unterminated tail, drain the chain and stop polling.
    pub fn finish(&mut self) -> Result<Batch, FileError> {
        if self.finished {
            return Ok(self.batch(Vec::new(), Vec::new(), true));
        }
        let checkpoint = self.reader.position();
        let blocks = match self.reader.flush() {
            Ok(blocks) => blocks,
            Err(e) => return Err(self.fail(checkpoint, Phase::Read, e)),
        };
        let records = blocks.into_iter().map(Record::from).collect();
        let output = match self.chain.apply(records, false) {
            Ok(output) => output,
            Err(e) => return Err(self.fail(checkpoint, Phase::Filter, e)),
        };
        self.finished = true;
        info!(target = %self.reader.id(), position = self.reader.position(), "finished ingest");

        Ok(self.batch(output.records, output.failures, true))
    }

    /// Reposition the reader at `offset`; see [`LineReader::seek`].
    ///
    /// Records buffered in the chain belong to the old position and are
    /// discarded. A stopped engine polls again after a successful seek.
    pub fn seek(&mut self, offset: Option<u64>) -> Result<u64, FileError> {
        let position = self
            .reader
            .seek(offset)
            .map_err(|e| FileError::new(Phase::Seek, self.reader.id(), e))?;
        self.chain.reset();
        self.finished = false;
        self.failed_at = None;
        Ok(position)
    }

    /// Close the underlying source. Buffered bytes are discarded.
    pub fn close(&mut self) {
        self.reader.close();
        self.finished = true;
    }

    fn fail(
        &mut self,
        checkpoint: u64,
        phase: Phase,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> FileError {
        self.finished = true;
        self.failed_at = Some(checkpoint);
        warn!(target = %self.reader.id(), checkpoint, %phase, "ingest stopped");
        FileError::new(phase, self.reader.id(), error)
    }

    fn batch(&self, records: Vec<Record>, failures: Vec<RecordFailure>, last: bool) -> Batch {
        Batch {
            records,
            failures,
            position: self.position(),
            last,
        }
    }
}
