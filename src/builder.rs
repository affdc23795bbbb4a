//! Builder for creating IngestEngine instances.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::config::{DEFAULT_MAX_RECORDS, FilterConfig, PipelineConfig, ReaderConfig};
use crate::engine::IngestEngine;
use crate::error::{AggregateError, ErrorPolicy, FileError, FilterError, Phase};
use crate::filter::{
    FileContext, FilterArgs, FilterChain, FilterRegistry, FilterStage, RecordFilter,
    default_registry,
};
use crate::io::SourceProvider;
use crate::reader::LineReader;

pub struct PipelineBuilder {
    registry: FilterRegistry,
    reader: ReaderConfig,
    filter_configs: Vec<FilterConfig>,
    stages: Vec<FilterStage>,
    error_policy: ErrorPolicy,
    max_records: usize,
    follow: bool,
    metadata: BTreeMap<String, String>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new(default_registry())
    }
}

impl PipelineBuilder {
    pub fn new(registry: FilterRegistry) -> Self {
        Self {
            registry,
            reader: ReaderConfig::default(),
            filter_configs: Vec::new(),
            stages: Vec::new(),
            error_policy: ErrorPolicy::Accumulate,
            max_records: DEFAULT_MAX_RECORDS,
            follow: false,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_custom_filter<F, T>(mut self, key: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&FilterArgs) -> Result<T, FilterError> + Send + Sync + 'static,
        T: RecordFilter + 'static,
    {
        self.registry.register_custom(key, factory);
        self
    }

    pub fn with_reader_config(mut self, config: ReaderConfig) -> Self {
        self.reader = config;
        self
    }

    /// Append a filter, prepared from the registry when the chain is built.
    pub fn add_filter(mut self, config: FilterConfig) -> Self {
        self.filter_configs.push(config);
        self
    }

    /// Append an already prepared stage. Prepared stages run before the
    /// stages added with [`add_filter`](Self::add_filter).
    pub fn add_stage(mut self, stage: FilterStage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn with_mode(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Maximum number of lines read per poll. Values below one are raised to one.
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records.max(1);
        self
    }

    /// Treat the source as live: exhausting it never drains the chain.
    pub fn following(mut self, follow: bool) -> Self {
        self.follow = follow;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Build the filter chain without opening a source.
    pub fn build_chain(mut self) -> Result<FilterChain, AggregateError> {
        let stages = self.prepare_stages()?;
        Ok(FilterChain::new(stages).with_policy(self.error_policy))
    }

    /// Prepare the chain, open the source, resume from `checkpoint` and
    /// initialize every stage for it.
    pub fn open(
        mut self,
        provider: &dyn SourceProvider,
        checkpoint: Option<u64>,
    ) -> Result<IngestEngine, AggregateError> {
        let stages = self.prepare_stages()?;
        let mut chain = FilterChain::new(stages).with_policy(self.error_policy);
        let target = provider.id().to_string();

        let mut reader = LineReader::open(provider, &self.reader)
            .map_err(|e| FileError::new(Phase::Open, &target, e))?;

        if checkpoint.is_some() {
            let position = reader
                .seek(checkpoint)
                .map_err(|e| FileError::new(Phase::Seek, &target, e))?;
            info!(target = %target, position, "resumed from checkpoint");
        }

        let context = FileContext {
            source: target.clone(),
            metadata: self.metadata,
        };
        chain
            .init(&context)
            .map_err(|e| FileError::new(Phase::Init, &target, e))?;

        Ok(IngestEngine::new(reader, chain, self.max_records).following(self.follow))
    }

    pub fn from_pipeline_config(
        config: PipelineConfig,
        registry: FilterRegistry,
    ) -> Result<Self, AggregateError> {
        let mut builder = PipelineBuilder::new(registry).with_reader_config(config.reader);

        if let Some(policy_str) = config.error_policy.as_deref() {
            let policy = policy_str.parse().unwrap_or_else(|e| {
                warn!(error = %e, "falling back to the accumulate error policy");
                ErrorPolicy::Accumulate
            });
            builder = builder.with_mode(policy);
        }
        if let Some(max_records) = config.max_records {
            builder = builder.with_max_records(max_records);
        }
        if let Some(follow) = config.follow {
            builder = builder.following(follow);
        }
        builder.metadata = config.metadata;

        builder.filter_configs = config.filters;
        let stages = builder.prepare_stages()?;
        builder.stages = stages;

        Ok(builder)
    }

    fn prepare_stages(&mut self) -> Result<Vec<FilterStage>, AggregateError> {
        let mut stages = std::mem::take(&mut self.stages);
        let mut errors = Vec::new();

        for config in std::mem::take(&mut self.filter_configs) {
            match self.registry.create(&config) {
                Ok(stage) => stages.push(stage),
                Err(e) => {
                    errors.push(FileError::new(Phase::Prepare, config.stage_name(), e));
                    if matches!(self.error_policy, ErrorPolicy::FastFail) {
                        return Err(AggregateError { errors });
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(stages)
        } else {
            Err(AggregateError { errors })
        }
    }
}
