//! Pipeline configuration for defining ingest workflows.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::reader::{Charset, DEFAULT_INITIAL_CAPACITY};

pub const DEFAULT_MAX_RECORDS: usize = 1000;

/// Configuration for an entire ingest pipeline: one reader, one filter chain.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// Line reader settings
    #[serde(default)]
    pub reader: ReaderConfig,
    /// Filters, applied in order
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
    /// Error policy: "fast_fail" or "accumulate"
    #[serde(default)]
    pub error_policy: Option<String>,
    /// Maximum number of lines returned by one poll
    #[serde(default)]
    pub max_records: Option<usize>,
    /// Keep treating the source as live once it is exhausted
    #[serde(default)]
    pub follow: Option<bool>,
    /// Context metadata handed to every filter at init
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Line reader settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Initial buffer capacity in bytes; the buffer doubles as needed
    pub initial_capacity: usize,
    pub charset: Charset,
    /// Emit an unterminated tail once the source is exhausted
    pub auto_flush: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            charset: Charset::default(),
            auto_flush: true,
        }
    }
}

impl ReaderConfig {
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn with_auto_flush(mut self, enabled: bool) -> Self {
        self.auto_flush = enabled;
        self
    }
}

/// Configuration for a single filter stage.
///
/// Every key besides `type`, `name` and `ignore_failure` is handed to the
/// filter as an argument.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// Registry key of the filter: "drop", "split", "group_row", ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Stage name used in logs and failure reports; defaults to the kind
    #[serde(default)]
    pub name: Option<String>,
    /// Pass the original record through when this stage rejects it
    #[serde(default)]
    pub ignore_failure: bool,
    #[serde(flatten)]
    pub args: Map<String, Value>,
}

impl FilterConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            ignore_failure: false,
            args: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    pub fn with_ignore_failure(mut self, ignore: bool) -> Self {
        self.ignore_failure = ignore;
        self
    }

    pub fn stage_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.kind)
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reader(mut self, reader: ReaderConfig) -> Self {
        self.reader = reader;
        self
    }

    pub fn add_filter(mut self, filter: FilterConfig) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_error_policy(mut self, policy: impl Into<String>) -> Self {
        self.error_policy = Some(policy.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(s: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
