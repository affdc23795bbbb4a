use serde_json::Value;

use crate::error::FilterError;
use crate::filter::{FilterArgs, Record, RecordFilter};

/// Parses the JSON text in `source`.
///
/// With a `target`, the parsed value is stored under it. Otherwise the value
/// must be an object whose entries are merged into the record. The source
/// field is removed unless `keep_source` is set. Malformed JSON fails only
/// the record.
#[derive(Debug, Clone)]
pub struct JsonFilter {
    source: String,
    target: Option<String>,
    keep_source: bool,
}

impl JsonFilter {
    pub const KEY: &'static str = "json";

    pub fn prepare(args: &FilterArgs) -> Result<Self, FilterError> {
        Ok(Self {
            source: args.str_or("source", Record::MESSAGE)?,
            target: args.str("target")?,
            keep_source: args.bool_or("keep_source", false)?,
        })
    }
}

impl RecordFilter for JsonFilter {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn accept(&self, record: &Record) -> bool {
        record.get_str(&self.source).is_some()
    }

    fn apply(&mut self, mut record: Record, _has_next: bool) -> Result<Vec<Record>, FilterError> {
        let text = record.get_str(&self.source).unwrap_or_default();
        let parsed: Value = serde_json::from_str(text)
            .map_err(|e| FilterError::record(Self::KEY, format!("invalid JSON: {e}")))?;

        if !self.keep_source {
            record.remove(&self.source);
        }
        match (&self.target, parsed) {
            (Some(target), value) => {
                record.insert(target.clone(), value);
            }
            (None, Value::Object(fields)) => record.fields_mut().extend(fields),
            (None, other) => {
                return Err(FilterError::record(
                    Self::KEY,
                    format!("expected a JSON object, found {other}"),
                ));
            }
        }
        Ok(vec![record])
    }
}
