use serde_json::Value;

use crate::error::FilterError;
use crate::filter::{FileContext, FilterArgs, Record, RecordFilter};

#[derive(Debug, Clone)]
enum ValueSource {
    Literal(Value),
    Metadata(String),
}

/// Sets `field` to a literal `value` or to a `metadata` entry of the source
/// context.
///
/// Without `overwrite`, an existing value is kept and the new one appended,
/// turning the field into an array.
#[derive(Debug, Clone)]
pub struct AppendFilter {
    field: String,
    source: ValueSource,
    overwrite: bool,
    resolved: Option<Value>,
}

impl AppendFilter {
    pub const KEY: &'static str = "append";

    pub fn prepare(args: &FilterArgs) -> Result<Self, FilterError> {
        let field = args.require_str("field")?;
        let source = if let Some(value) = args.get("value") {
            ValueSource::Literal(value.clone())
        } else if let Some(key) = args.str("metadata")? {
            ValueSource::Metadata(key)
        } else {
            return Err(args.missing("value"));
        };
        Ok(Self {
            field,
            source,
            overwrite: args.bool_or("overwrite", false)?,
            resolved: None,
        })
    }
}

impl RecordFilter for AppendFilter {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn init(&mut self, context: &FileContext) -> Result<(), FilterError> {
        let value = match &self.source {
            ValueSource::Literal(value) => value.clone(),
            ValueSource::Metadata(key) => context
                .metadata
                .get(key)
                .map(|v| Value::String(v.clone()))
                .ok_or_else(|| FilterError::missing(Self::KEY, format!("metadata.{key}")))?,
        };
        self.resolved = Some(value);
        Ok(())
    }

    fn apply(&mut self, mut record: Record, _has_next: bool) -> Result<Vec<Record>, FilterError> {
        let value = self.resolved.clone().ok_or(FilterError::NotInitialized)?;
        let merged = match record.remove(&self.field) {
            Some(_) if self.overwrite => value,
            Some(Value::Array(mut items)) => {
                items.push(value);
                Value::Array(items)
            }
            Some(existing) => Value::Array(vec![existing, value]),
            None => value,
        };
        record.insert(self.field.clone(), merged);
        Ok(vec![record])
    }
}
