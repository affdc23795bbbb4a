use csv::{ReaderBuilder, StringRecord, Trim};
use serde_json::Value;

use crate::error::FilterError;
use crate::filter::{FilterArgs, Record, RecordFilter};

/// Parses the message as one delimited row.
///
/// Values are named after `columns`, or `column1`, `column2`, ... when no
/// columns are configured. A row with the wrong number of values fails only
/// that record.
#[derive(Debug, Clone)]
pub struct DelimitedRowFilter {
    delimiter: u8,
    columns: Option<Vec<String>>,
    trim: bool,
}

impl DelimitedRowFilter {
    pub const KEY: &'static str = "delimited_row";

    pub fn prepare(args: &FilterArgs) -> Result<Self, FilterError> {
        let separator = args.str_or("separator", ",")?;
        let delimiter = match separator.as_bytes() {
            [b] if b.is_ascii() => *b,
            _ => {
                return Err(args.invalid("separator", "must be a single ASCII character"));
            }
        };
        Ok(Self {
            delimiter,
            columns: args.str_list("columns")?,
            trim: args.bool_or("trim", false)?,
        })
    }

    fn parse_row(&self, line: &str) -> Result<StringRecord, FilterError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .delimiter(self.delimiter)
            .trim(if self.trim { Trim::All } else { Trim::None })
            .from_reader(line.as_bytes());
        match reader.records().next() {
            Some(Ok(row)) => Ok(row),
            Some(Err(e)) => Err(FilterError::record(Self::KEY, format!("malformed row: {e}"))),
            None => Ok(StringRecord::new()),
        }
    }
}

impl RecordFilter for DelimitedRowFilter {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn accept(&self, record: &Record) -> bool {
        record.message().is_some()
    }

    fn apply(&mut self, mut record: Record, _has_next: bool) -> Result<Vec<Record>, FilterError> {
        let row = self.parse_row(record.message().unwrap_or_default())?;
        if let Some(columns) = &self.columns {
            if columns.len() != row.len() {
                return Err(FilterError::record(
                    Self::KEY,
                    format!("expected {} columns, found {}", columns.len(), row.len()),
                ));
            }
        }

        record.remove(Record::MESSAGE);
        for (i, value) in row.iter().enumerate() {
            let name = match &self.columns {
                Some(columns) => columns[i].clone(),
                None => format!("column{}", i + 1),
            };
            record.insert(name, Value::String(value.to_string()));
        }
        Ok(vec![record])
    }
}
