use std::collections::HashMap;
use std::mem;

use serde_json::{Map, Value};

use crate::error::FilterError;
use crate::filter::{FilterArgs, Record, RecordFilter, Span};

/// Buffers records and groups them by the values of `fields`.
///
/// Each emitted record carries the key fields plus a `target` array (default
/// `records`) holding the grouped records in arrival order. Groups are
/// emitted in first-seen order when `has_next` is false, when
/// `max_buffered_records` is reached, or on drain.
#[derive(Debug, Clone)]
pub struct GroupRowFilter {
    fields: Vec<String>,
    target: String,
    max_buffered: Option<usize>,
    groups: Vec<Vec<Record>>,
    index: HashMap<String, usize>,
    buffered: usize,
}

impl GroupRowFilter {
    pub const KEY: &'static str = "group_row";

    pub fn prepare(args: &FilterArgs) -> Result<Self, FilterError> {
        let max_buffered = args.usize("max_buffered_records")?;
        if max_buffered == Some(0) {
            return Err(args.invalid("max_buffered_records", "must be at least 1"));
        }
        Ok(Self {
            fields: args.require_str_list("fields")?,
            target: args.str_or("target", "records")?,
            max_buffered,
            groups: Vec::new(),
            index: HashMap::new(),
            buffered: 0,
        })
    }

    fn key_values(&self, record: &Record) -> Vec<Value> {
        self.fields
            .iter()
            .map(|field| record.get(field).cloned().unwrap_or(Value::Null))
            .collect()
    }

    fn take_groups(&mut self) -> Vec<Record> {
        self.index.clear();
        self.buffered = 0;
        mem::take(&mut self.groups)
            .into_iter()
            .map(|group| self.merge(group))
            .collect()
    }

    fn merge(&self, group: Vec<Record>) -> Record {
        let mut fields = Map::new();
        if let Some(first) = group.first() {
            for (name, value) in self.fields.iter().zip(self.key_values(first)) {
                fields.insert(name.clone(), value);
            }
        }
        let mut span = None;
        let records = group
            .into_iter()
            .map(|record| {
                span = Span::cover_opt(span, record.span());
                Value::Object(record.into_fields())
            })
            .collect();
        fields.insert(self.target.clone(), Value::Array(records));

        let mut merged = Record::new(fields);
        merged.set_span(span);
        merged
    }
}

impl RecordFilter for GroupRowFilter {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn apply(&mut self, record: Record, has_next: bool) -> Result<Vec<Record>, FilterError> {
        let key = Value::Array(self.key_values(&record)).to_string();
        match self.index.get(&key) {
            Some(&i) => self.groups[i].push(record),
            None => {
                self.index.insert(key, self.groups.len());
                self.groups.push(vec![record]);
            }
        }
        self.buffered += 1;

        let full = self.max_buffered.is_some_and(|max| self.buffered >= max);
        if !has_next || full {
            Ok(self.take_groups())
        } else {
            Ok(Vec::new())
        }
    }

    fn drain(&mut self) -> Vec<Record> {
        self.take_groups()
    }
}
