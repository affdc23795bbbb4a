//! Ordered filter stages with depth-first record propagation.

use tracing::{debug, error, warn};

use super::{FileContext, Filter, Record, RecordFilter, Span};
use crate::error::{ErrorPolicy, FilterError};

/// One named position in a [`FilterChain`].
#[derive(Debug)]
pub struct FilterStage {
    name: String,
    filter: Filter,
    ignore_failure: bool,
}

impl FilterStage {
    pub fn new(name: impl Into<String>, filter: Filter) -> Self {
        Self {
            name: name.into(),
            filter,
            ignore_failure: false,
        }
    }

    /// Pass the original record downstream when this stage rejects it.
    pub fn with_ignore_failure(mut self, ignore: bool) -> Self {
        self.ignore_failure = ignore;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn into_filter(self) -> Filter {
        self.filter
    }
}

/// A record that a stage rejected with a recoverable error.
#[derive(Debug)]
pub struct RecordFailure {
    pub stage: String,
    pub span: Option<Span>,
    pub error: FilterError,
}

/// Result of one chain call.
#[derive(Debug, Default)]
pub struct ChainOutput {
    pub records: Vec<Record>,
    pub failures: Vec<RecordFailure>,
}

impl ChainOutput {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.failures.is_empty()
    }
}

/// Runs records through filter stages in a fixed order.
///
/// Each record is pushed depth-first: everything a stage emits for it reaches
/// the end of the chain before the next input record enters. When a call is
/// made with `has_next == false`, buffering stages are drained front to back
/// and their output continues through the stages after them.
#[derive(Debug)]
pub struct FilterChain {
    stages: Vec<FilterStage>,
    policy: ErrorPolicy,
    initialized: bool,
}

impl FilterChain {
    pub fn new(stages: Vec<FilterStage>) -> Self {
        Self {
            stages,
            policy: ErrorPolicy::default(),
            initialized: false,
        }
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(FilterStage::name).collect()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Initialize every stage in order. The first failure aborts and names
    /// the stage.
    pub fn init(&mut self, context: &FileContext) -> Result<(), FilterError> {
        for stage in &mut self.stages {
            stage
                .filter
                .init(context)
                .map_err(|e| FilterError::ChainInitialization {
                    stage: stage.name.clone(),
                    source: Box::new(e),
                })?;
        }
        self.initialized = true;
        debug!(source = %context.source, stages = self.stages.len(), "initialized filter chain");
        Ok(())
    }

    /// Run a batch of records through the chain.
    ///
    /// `has_next` tells the chain whether more input will follow this batch.
    /// Per-record failures are collected in the output under
    /// `ErrorPolicy::Accumulate` and returned as the error under
    /// `ErrorPolicy::FastFail`. Structural failures always abort the call.
    pub fn apply(&mut self, records: Vec<Record>, has_next: bool) -> Result<ChainOutput, FilterError> {
        if !self.initialized {
            return Err(FilterError::NotInitialized);
        }
        let mut output = ChainOutput::default();
        let total = records.len();
        for (i, record) in records.into_iter().enumerate() {
            self.push_through(0, record, has_next || i + 1 < total, &mut output)?;
        }
        if !has_next {
            self.drain_into(&mut output)?;
        }
        Ok(output)
    }

    /// Flush every buffering stage, propagating the flushed records through
    /// the downstream stages.
    pub fn drain(&mut self) -> Result<ChainOutput, FilterError> {
        if !self.initialized {
            return Err(FilterError::NotInitialized);
        }
        let mut output = ChainOutput::default();
        self.drain_into(&mut output)?;
        Ok(output)
    }

    /// Discard every record buffered in the stages, for example after the
    /// source was repositioned.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            let discarded = stage.filter.drain();
            if !discarded.is_empty() {
                debug!(stage = %stage.name, count = discarded.len(), "discarded buffered records");
            }
        }
    }

    fn drain_into(&mut self, output: &mut ChainOutput) -> Result<(), FilterError> {
        for index in 0..self.stages.len() {
            let flushed = self.stages[index].filter.drain();
            if flushed.is_empty() {
                continue;
            }
            debug!(stage = %self.stages[index].name, count = flushed.len(), "drained buffered records");
            let total = flushed.len();
            for (i, record) in flushed.into_iter().enumerate() {
                self.push_through(index + 1, record, i + 1 < total, output)?;
            }
        }
        Ok(())
    }

    fn push_through(
        &mut self,
        from: usize,
        record: Record,
        has_next: bool,
        output: &mut ChainOutput,
    ) -> Result<(), FilterError> {
        if from == self.stages.len() {
            output.records.push(record);
            return Ok(());
        }
        let produced = self.apply_stage(from, record, has_next, output)?;
        let total = produced.len();
        for (i, record) in produced.into_iter().enumerate() {
            self.push_through(from + 1, record, has_next || i + 1 < total, output)?;
        }
        Ok(())
    }

    fn apply_stage(
        &mut self,
        index: usize,
        record: Record,
        has_next: bool,
        output: &mut ChainOutput,
    ) -> Result<Vec<Record>, FilterError> {
        let policy = self.policy;
        let stage = &mut self.stages[index];
        if !stage.filter.accept(&record) {
            return Ok(vec![record]);
        }

        let span = record.span();
        let original = stage.ignore_failure.then(|| record.clone());
        match stage.filter.apply(record, has_next) {
            Ok(records) => Ok(records),
            Err(error) if error.is_recoverable() => {
                if let Some(original) = original {
                    debug!(stage = %stage.name, error = %error, "ignoring record failure");
                    return Ok(vec![original]);
                }
                if policy == ErrorPolicy::FastFail {
                    return Err(error);
                }
                warn!(stage = %stage.name, ?span, error = %error, "record failed");
                output.failures.push(RecordFailure {
                    stage: stage.name.clone(),
                    span,
                    error,
                });
                Ok(Vec::new())
            }
            Err(error) => {
                error!(stage = %stage.name, error = %error, "filter failed");
                Err(error)
            }
        }
    }
}
