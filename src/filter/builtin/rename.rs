use crate::error::FilterError;
use crate::filter::{FilterArgs, Record, RecordFilter};

/// Moves the value of `field` to `target`.
///
/// A record without `field` is a record-level failure unless
/// `ignore_missing` is set.
#[derive(Debug, Clone)]
pub struct RenameFilter {
    field: String,
    target: String,
    ignore_missing: bool,
}

impl RenameFilter {
    pub const KEY: &'static str = "rename";

    pub fn prepare(args: &FilterArgs) -> Result<Self, FilterError> {
        Ok(Self {
            field: args.require_str("field")?,
            target: args.require_str("target")?,
            ignore_missing: args.bool_or("ignore_missing", false)?,
        })
    }
}

impl RecordFilter for RenameFilter {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn apply(&mut self, mut record: Record, _has_next: bool) -> Result<Vec<Record>, FilterError> {
        match record.remove(&self.field) {
            Some(value) => {
                record.insert(self.target.clone(), value);
            }
            None if self.ignore_missing => {}
            None => {
                return Err(FilterError::record(
                    Self::KEY,
                    format!("no field named '{}'", self.field),
                ));
            }
        }
        Ok(vec![record])
    }
}
