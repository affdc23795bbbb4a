use serde::Serialize;
use serde_json::{Map, Value};

use crate::reader::TextBlock;

/// Byte span of the source lines a record was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: u64,
    pub end: u64,
}

impl Span {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub(crate) fn cover_opt(a: Option<Span>, b: Option<Span>) -> Option<Span> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.cover(b)),
            (a, b) => a.or(b),
        }
    }
}

/// The unit flowing through a filter chain: named fields plus the span of
/// source bytes it came from.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Record {
    fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<Span>,
}

impl Record {
    /// Field holding the line text of records built from a [`TextBlock`].
    pub const MESSAGE: &'static str = "message";

    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields, span: None }
    }

    pub fn from_message(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(Self::MESSAGE.to_string(), Value::String(message.into()));
        Self::new(fields)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn set_span(&mut self, span: Option<Span>) {
        self.span = span;
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn message(&self) -> Option<&str> {
        self.get_str(Self::MESSAGE)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }
}

impl From<TextBlock> for Record {
    fn from(block: TextBlock) -> Self {
        let span = Span::new(block.start_offset(), block.end_offset());
        Record::from_message(block.into_content()).with_span(span)
    }
}
