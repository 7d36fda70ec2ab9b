//! Turns raw export payloads into [`Record`]s.
//!
//! The back office exports every table as comma-separated text with a header
//! row. [`parse`] maps each data row onto the header names, canonicalizes the
//! type's boolean flags, and computes aggregates that only need the payload
//! itself. Joins that need a second object type live in [`count_children`]
//! and [`stitch_option_sets`] and are run by the caller once both sides are
//! loaded.

use std::collections::{HashMap, HashSet};

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, trace};

use crate::error::ParseError;
use crate::models::{ObjectType, Record};

/// Derived field: number of personalization answers for a product.
pub const N_ANSWERS: &str = "_n_answers";

/// Derived field: resolved option group name on an option set row.
pub const OPTION_GROUP_NAME: &str = "_option_group_name";

/// Derived field: resolved option name on an option set row.
pub const OPTION_NAME: &str = "_option_name";

const BOM: char = '\u{feff}';

// ============================================================================
// Parsing
// ============================================================================

/// Parses an export payload for `object_type`.
///
/// A payload holding only a header row yields an empty list. Rows shorter
/// than the header omit the trailing fields; cells beyond the header are
/// ignored.
///
/// # Errors
///
/// Returns [`ParseError`] if the payload has no usable header, a row lacks a
/// required field, or the text is not valid CSV.
pub fn parse(raw: &str, object_type: ObjectType) -> Result<Vec<Record>, ParseError> {
    let raw = raw.strip_prefix(BOM).unwrap_or(raw);
    if raw.trim().is_empty() {
        return Err(ParseError::MissingHeader);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());
    let mut rows = reader.records();

    let header_row = match rows.next() {
        Some(row) => row.map_err(csv_error)?,
        None => return Err(ParseError::MissingHeader),
    };
    let header = read_header(&header_row, raw)?;

    let schema = object_type.schema();
    let missing: Vec<_> = schema
        .fields
        .iter()
        .filter(|field| !header.iter().any(|name| name.as_str() == **field))
        .collect();
    if !missing.is_empty() {
        debug!(%object_type, ?missing, "Export lacks expected fields");
    }

    let mut records = Vec::new();
    for row in rows {
        let row = row.map_err(csv_error)?;
        let record = read_row(&header, &row);
        check_required(object_type, &record, &row, raw)?;
        records.push(canonicalize_booleans(object_type, record));
    }

    if object_type == ObjectType::Personalization {
        count_group_sizes(&mut records, "Product SKU", N_ANSWERS);
    }

    trace!(%object_type, count = records.len(), "Parsed export");
    Ok(records)
}

fn read_header(row: &StringRecord, raw: &str) -> Result<Vec<String>, ParseError> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(row.len());
    for cell in row {
        let name = cell.trim();
        if name.is_empty() {
            return Err(ParseError::MalformedHeader {
                reason: "empty column name".to_string(),
                fragment: raw_line(raw, row),
            });
        }
        if !seen.insert(name) {
            return Err(ParseError::MalformedHeader {
                reason: format!("duplicate column '{name}'"),
                fragment: raw_line(raw, row),
            });
        }
        names.push(name.to_string());
    }
    Ok(names)
}

fn read_row(header: &[String], row: &StringRecord) -> Record {
    header
        .iter()
        .zip(row.iter())
        .map(|(name, value)| (name.as_str(), value))
        .collect()
}

fn check_required(
    object_type: ObjectType,
    record: &Record,
    row: &StringRecord,
    raw: &str,
) -> Result<(), ParseError> {
    match object_type
        .schema()
        .required
        .iter()
        .find(|field| !record.contains(field))
    {
        Some(field) => Err(ParseError::MissingField {
            field: (*field).to_string(),
            line: row.position().map_or(0, csv::Position::line),
            fragment: raw_line(raw, row),
        }),
        None => Ok(()),
    }
}

fn canonicalize_booleans(object_type: ObjectType, mut record: Record) -> Record {
    for field in object_type.schema().booleans {
        if let Some(value) = record.get(field) {
            let flag = if value == "Y" { "Y" } else { "N" };
            record.insert(*field, flag);
        }
    }
    record
}

/// Returns the source line a row started on, for error messages.
fn raw_line(raw: &str, row: &StringRecord) -> String {
    let start = row
        .position()
        .and_then(|pos| usize::try_from(pos.byte()).ok())
        .unwrap_or(0)
        .min(raw.len());
    let rest = raw.get(start..).unwrap_or("");
    rest.lines().next().unwrap_or("").to_string()
}

fn csv_error(err: csv::Error) -> ParseError {
    ParseError::Csv {
        line: err.position().map_or(0, csv::Position::line),
        message: err.to_string(),
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// Sets `field` on every record to the number of records sharing its `key`.
fn count_group_sizes(records: &mut [Record], key: &str, field: &str) {
    let mut sizes: HashMap<String, usize> = HashMap::new();
    for record in records.iter() {
        *sizes.entry(record.value(key).to_string()).or_default() += 1;
    }
    for record in records.iter_mut() {
        let size = sizes.get(record.value(key)).copied().unwrap_or(0);
        record.insert(field, size.to_string());
    }
}

/// Sets `field` on each parent to the number of children whose `child_key`
/// equals the parent's `parent_key`, or `"0"` when there are none.
///
/// Products use this to carry `_n_answers` from their personalizations:
/// `count_children(products, "SKU", personalizations, "Product SKU", N_ANSWERS)`.
pub fn count_children(
    parents: &mut [Record],
    parent_key: &str,
    children: &[Record],
    child_key: &str,
    field: &str,
) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for child in children {
        *counts.entry(child.value(child_key)).or_default() += 1;
    }
    for parent in parents.iter_mut() {
        let count = counts.get(parent.value(parent_key)).copied().unwrap_or(0);
        parent.insert(field, count.to_string());
    }
}

/// Resolves option set references into readable names.
///
/// Adds [`OPTION_GROUP_NAME`] and [`OPTION_NAME`] to each option set row
/// whose `Option Group Id` / `Option Id` resolves; unresolved references
/// leave the derived field absent.
pub fn stitch_option_sets(option_sets: &mut [Record], option_groups: &[Record], options: &[Record]) {
    let group_names: HashMap<&str, &str> = option_groups
        .iter()
        .map(|group| (group.value("Option Group Id"), group.value("Option Group Name")))
        .collect();
    let option_names: HashMap<&str, &str> = options
        .iter()
        .map(|option| (option.value("Option Id"), option.value("Option Name")))
        .collect();

    for set in option_sets.iter_mut() {
        if let Some(name) = group_names.get(set.value("Option Group Id")).copied() {
            set.insert(OPTION_GROUP_NAME, name);
        }
        if let Some(name) = option_names.get(set.value("Option Id")).copied() {
            set.insert(OPTION_NAME, name);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
