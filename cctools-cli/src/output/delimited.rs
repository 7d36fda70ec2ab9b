//! CSV output formatting.

use anyhow::Result;
use cctools_core::{ObjectType, Record};
use csv::{QuoteStyle, WriterBuilder};

use super::columns;

/// CSV formatter. Always writes a header row, even when there are no rows.
#[derive(Debug, Default)]
pub struct CsvFormatter;

impl CsvFormatter {
    /// Creates a new CSV formatter.
    pub fn new() -> Self {
        Self
    }

    /// Formats records with one column per field, values as exported.
    ///
    /// Without records the header lists the type's expected fields.
    pub fn format_records(&self, object_type: ObjectType, records: &[Record]) -> Result<String> {
        let headers = if records.is_empty() {
            object_type.schema().fields.to_vec()
        } else {
            columns(records)
        };
        let rows: Vec<Vec<&str>> = records
            .iter()
            .map(|record| headers.iter().map(|h| record.value(h)).collect())
            .collect();
        self.format_table(&headers, &rows)
    }

    /// Formats a header row followed by data rows.
    pub fn format_table<S: AsRef<str>>(&self, headers: &[&str], rows: &[Vec<S>]) -> Result<String> {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Necessary)
            .from_writer(Vec::new());

        if !headers.is_empty() {
            writer.write_record(headers)?;
        }
        for row in rows {
            writer.write_record(row.iter().map(|cell| -> &str { cell.as_ref() }))?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}
