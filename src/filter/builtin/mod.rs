//! Built-in filters.
//!
//! | Key | Filter |
//! |---|---|
//! | `drop` | [`DropFilter`] |
//! | `exclude` | [`ExcludeFilter`] |
//! | `rename` | [`RenameFilter`] |
//! | `append` | [`AppendFilter`] |
//! | `split` | [`SplitFilter`] |
//! | `json` | [`JsonFilter`] |
//! | `delimited_row` | `DelimitedRowFilter` (feature `csv`) |
//! | `multi_row` | [`MultiRowFilter`] |
//! | `group_row` | [`GroupRowFilter`] |

mod append;
#[cfg(feature = "csv")]
mod delimited;
mod drop;
mod exclude;
mod group_row;
mod json;
mod multi_row;
mod rename;
mod split;

pub use append::AppendFilter;
#[cfg(feature = "csv")]
pub use delimited::DelimitedRowFilter;
pub use drop::DropFilter;
pub use exclude::ExcludeFilter;
pub use group_row::GroupRowFilter;
pub use json::JsonFilter;
pub use multi_row::MultiRowFilter;
pub use rename::RenameFilter;
pub use split::SplitFilter;

use super::{FileContext, Record, RecordFilter};
use crate::error::FilterError;

/// Every filter a chain stage can hold.
#[derive(Debug)]
pub enum Filter {
    Drop(DropFilter),
    Exclude(ExcludeFilter),
    Rename(RenameFilter),
    Append(AppendFilter),
    Split(SplitFilter),
    Json(JsonFilter),
    #[cfg(feature = "csv")]
    DelimitedRow(DelimitedRowFilter),
    MultiRow(MultiRowFilter),
    GroupRow(GroupRowFilter),
    /// A filter registered with
    /// [`FilterRegistry::register_custom`](super::FilterRegistry::register_custom)
    Custom(Box<dyn RecordFilter>),
}

macro_rules! dispatch {
    ($self:expr, $f:ident => $body:expr) => {
        match $self {
            Filter::Drop($f) => $body,
            Filter::Exclude($f) => $body,
            Filter::Rename($f) => $body,
            Filter::Append($f) => $body,
            Filter::Split($f) => $body,
            Filter::Json($f) => $body,
            #[cfg(feature = "csv")]
            Filter::DelimitedRow($f) => $body,
            Filter::MultiRow($f) => $body,
            Filter::GroupRow($f) => $body,
            Filter::Custom($f) => $body,
        }
    };
}

impl RecordFilter for Filter {
    fn name(&self) -> &str {
        dispatch!(self, f => f.name())
    }

    fn init(&mut self, context: &FileContext) -> Result<(), FilterError> {
        dispatch!(self, f => f.init(context))
    }

    fn accept(&self, record: &Record) -> bool {
        dispatch!(self, f => f.accept(record))
    }

    fn apply(&mut self, record: Record, has_next: bool) -> Result<Vec<Record>, FilterError> {
        dispatch!(self, f => f.apply(record, has_next))
    }

    fn drain(&mut self) -> Vec<Record> {
        dispatch!(self, f => f.drain())
    }
}
