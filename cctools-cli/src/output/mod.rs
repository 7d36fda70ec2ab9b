//! Output formatting for CLI.

mod delimited;
mod json;
pub mod text;

pub use delimited::CsvFormatter;
pub use json::{CacheStatusOutput, JsonFormatter};
pub use text::{
    CACHE_HEADERS, HEADER_ABBREVIATIONS, INVENTORY_HEADERS, TableOptions, TextFormatter,
};

#[cfg(test)]
mod tests;

use cctools_core::Record;

/// Returns every field name used by `records`, in first-seen order.
///
/// Rows of one export share a header, but derived fields such as
/// `_n_answers` may only appear on some of them.
pub fn columns(records: &[Record]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for record in records {
        for name in record.field_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}
