use std::mem;

use crate::error::FilterError;
use crate::filter::{FilterArgs, Record, RecordFilter, Span};

/// Joins continuation lines onto the record that starts them.
///
/// A message is a continuation when `starts_with(pattern) != negate`. The
/// merged record keeps the first record's fields, joins the messages with
/// `separator` and covers the spans of every joined line. A group is emitted
/// when the next group starts, when `has_next` is false, or on drain. A
/// record without a message closes the pending group and follows it out.
#[derive(Debug, Clone)]
pub struct MultiRowFilter {
    pattern: String,
    negate: bool,
    separator: String,
    buffer: Vec<Record>,
}

impl MultiRowFilter {
    pub const KEY: &'static str = "multi_row";

    pub fn prepare(args: &FilterArgs) -> Result<Self, FilterError> {
        let pattern = args.require_str("pattern")?;
        if pattern.is_empty() {
            return Err(args.invalid("pattern", "must not be empty"));
        }
        Ok(Self {
            pattern,
            negate: args.bool_or("negate", false)?,
            separator: args.str_or("separator", "\n")?,
            buffer: Vec::new(),
        })
    }

    fn is_continuation(&self, record: &Record) -> bool {
        record.message().unwrap_or_default().starts_with(&self.pattern) != self.negate
    }

    fn take_group(&mut self) -> Option<Record> {
        let mut records = mem::take(&mut self.buffer).into_iter();
        let mut merged = records.next()?;
        let mut message = merged.message().unwrap_or_default().to_string();
        let mut span = merged.span();
        for record in records {
            message.push_str(&self.separator);
            message.push_str(record.message().unwrap_or_default());
            span = Span::cover_opt(span, record.span());
        }
        merged.insert(Record::MESSAGE, message);
        merged.set_span(span);
        Some(merged)
    }
}

impl RecordFilter for MultiRowFilter {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn apply(&mut self, record: Record, has_next: bool) -> Result<Vec<Record>, FilterError> {
        let mut out = Vec::new();
        if record.message().is_none() {
            out.extend(self.take_group());
            out.push(record);
            return Ok(out);
        }
        if !self.is_continuation(&record) {
            out.extend(self.take_group());
        }
        self.buffer.push(record);
        if !has_next {
            out.extend(self.take_group());
        }
        Ok(out)
    }

    fn drain(&mut self) -> Vec<Record> {
        self.take_group().into_iter().collect()
    }
}
