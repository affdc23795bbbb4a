use serde_json::Value;

use crate::error::FilterError;
use crate::filter::{FilterArgs, Record, RecordFilter};

/// Fans a record out into one record per `separator`-delimited piece of
/// `field`. Every other field is copied to each piece.
#[derive(Debug, Clone)]
pub struct SplitFilter {
    field: String,
    separator: String,
}

impl SplitFilter {
    pub const KEY: &'static str = "split";

    pub fn prepare(args: &FilterArgs) -> Result<Self, FilterError> {
        let separator = args.require_str("separator")?;
        if separator.is_empty() {
            return Err(args.invalid("separator", "must not be empty"));
        }
        Ok(Self {
            field: args.str_or("field", Record::MESSAGE)?,
            separator,
        })
    }
}

impl RecordFilter for SplitFilter {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn accept(&self, record: &Record) -> bool {
        record.get_str(&self.field).is_some()
    }

    fn apply(&mut self, record: Record, _has_next: bool) -> Result<Vec<Record>, FilterError> {
        let Some(value) = record.get_str(&self.field) else {
            return Ok(vec![record]);
        };
        let pieces: Vec<String> = value.split(self.separator.as_str()).map(String::from).collect();
        Ok(pieces
            .into_iter()
            .map(|piece| {
                let mut copy = record.clone();
                copy.insert(self.field.clone(), Value::String(piece));
                copy
            })
            .collect())
    }
}
