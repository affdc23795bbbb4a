use crate::error::FilterError;
use crate::filter::{FilterArgs, Record, RecordFilter};

/// Removes the listed `fields` from every record.
#[derive(Debug, Clone)]
pub struct ExcludeFilter {
    fields: Vec<String>,
}

impl ExcludeFilter {
    pub const KEY: &'static str = "exclude";

    pub fn prepare(args: &FilterArgs) -> Result<Self, FilterError> {
        Ok(Self {
            fields: args.require_str_list("fields")?,
        })
    }
}

impl RecordFilter for ExcludeFilter {
    fn name(&self) -> &str {
        Self::KEY
    }

    fn apply(&mut self, mut record: Record, _has_next: bool) -> Result<Vec<Record>, FilterError> {
        for field in &self.fields {
            record.remove(field);
        }
        Ok(vec![record])
    }
}
