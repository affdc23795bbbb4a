use crate::error::FilterError;
use crate::filter::{FilterArgs, Record, RecordFilter};

#[derive(Debug, Clone)]
enum Matcher {
    Equals(String),
    Contains(String),
}

/// Discards records whose field matches a condition.
///
/// Arguments: `field` (default `message`), one of `equals` / `contains`, and
/// `invert` to keep only matching records instead. Records without a string
/// `field` are not accepted and pass through.
#[derive(Debug, Clone)]
pub struct DropFilter {
    field: String,
    matcher: Matcher,
    invert: bool,
}

impl DropFilter {
    pub const KEY: &'static str = "drop";

    pub fn prepare(args: &FilterArgs) -> Result<Self, FilterError> {
        let field = args.str_or("field", Record::MESSAGE)?;
        let matcher = if let Some(value) = args.str("equals")? {
            Matcher::Equals(value)
        } else if let Some(value) = args.str("contains")? {
            Matcher::Contains(value)
        } else {
            return Err(args.missing("equals"));
        };
        Ok(Self {
            field,
            matcher,
            invert: args.bool_or("invert", false)?,
        })
    }

    fn matches(&self, value: &str) -> bool {
        match &self.matcher {
            Matcher::Equals(expected) => value == expected,
            Matcher::Contains(needle) => value.contains(needle.as_str()),
        }
    }
}

impl RecordFilter for DropFilter {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn accept(&self, record: &Record) -> bool {
        record.get_str(&self.field).is_some()
    }

    fn apply(&mut self, record: Record, _has_next: bool) -> Result<Vec<Record>, FilterError> {
        let matched = record
            .get_str(&self.field)
            .is_some_and(|value| self.matches(value));
        if matched != self.invert {
            Ok(Vec::new())
        } else {
            Ok(vec![record])
        }
    }
}
