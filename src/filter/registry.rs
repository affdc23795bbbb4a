use std::collections::BTreeMap;
use std::sync::Arc;

use super::builtin::{
    AppendFilter, DropFilter, ExcludeFilter, Filter, GroupRowFilter, JsonFilter, MultiRowFilter,
    RenameFilter, SplitFilter,
};
use super::{FilterArgs, FilterStage, RecordFilter};
use crate::config::FilterConfig;
use crate::error::FilterError;

/// Builds a filter from its configuration arguments.
pub type FilterFactory = Arc<dyn Fn(&FilterArgs) -> Result<Filter, FilterError> + Send + Sync>;

/// Registry mapping configuration keys to filter factories.
///
/// Keys are matched case-insensitively.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    factories: BTreeMap<String, FilterFactory>,
}

impl std::fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("keys", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under `key`, replacing any previous one.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&FilterArgs) -> Result<Filter, FilterError> + Send + Sync + 'static,
    {
        self.factories
            .insert(key.into().to_ascii_lowercase(), Arc::new(factory));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_filter<F>(mut self, key: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&FilterArgs) -> Result<Filter, FilterError> + Send + Sync + 'static,
    {
        self.register(key, factory);
        self
    }

    /// Register a user-defined filter type.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// registry.register_custom("upper", |args| UpperFilter::prepare(args));
    /// ```
    pub fn register_custom<F, T>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&FilterArgs) -> Result<T, FilterError> + Send + Sync + 'static,
        T: RecordFilter + 'static,
    {
        self.register(key, move |args| {
            factory(args).map(|filter| Filter::Custom(Box::new(filter)))
        });
    }

    pub fn has_filter(&self, key: &str) -> bool {
        self.factories.contains_key(&key.to_ascii_lowercase())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Prepare a chain stage from its configuration.
    pub fn create(&self, config: &FilterConfig) -> Result<FilterStage, FilterError> {
        let factory = self
            .factories
            .get(&config.kind.to_ascii_lowercase())
            .ok_or_else(|| FilterError::UnknownFilter(config.kind.clone()))?;
        let args = FilterArgs::new(config.stage_name(), config.args.clone());
        let filter = factory(&args)?;
        Ok(FilterStage::new(config.stage_name(), filter).with_ignore_failure(config.ignore_failure))
    }
}

/// Create a registry with every built-in filter enabled by crate features.
pub fn default_registry() -> FilterRegistry {
    let mut registry = FilterRegistry::new();
    registry.register(DropFilter::KEY, |args| DropFilter::prepare(args).map(Filter::Drop));
    registry.register(ExcludeFilter::KEY, |args| {
        ExcludeFilter::prepare(args).map(Filter::Exclude)
    });
    registry.register(RenameFilter::KEY, |args| {
        RenameFilter::prepare(args).map(Filter::Rename)
    });
    registry.register(AppendFilter::KEY, |args| {
        AppendFilter::prepare(args).map(Filter::Append)
    });
    registry.register(SplitFilter::KEY, |args| SplitFilter::prepare(args).map(Filter::Split));
    registry.register(JsonFilter::KEY, |args| JsonFilter::prepare(args).map(Filter::Json));
    registry.register(MultiRowFilter::KEY, |args| {
        MultiRowFilter::prepare(args).map(Filter::MultiRow)
    });
    registry.register(GroupRowFilter::KEY, |args| {
        GroupRowFilter::prepare(args).map(Filter::GroupRow)
    });

    #[cfg(feature = "csv")]
    {
        use super::builtin::DelimitedRowFilter;
        registry.register(DelimitedRowFilter::KEY, |args| {
            DelimitedRowFilter::prepare(args).map(Filter::DelimitedRow)
        });
    }

    registry
}
