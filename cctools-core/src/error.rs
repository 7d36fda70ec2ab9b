//! Core error types for `cctools`.

use thiserror::Error;

// ============================================================================
// Parse Error
// ============================================================================

/// Error raised when an export payload cannot be turned into records.
///
/// Every variant that points at a specific part of the payload carries the
/// offending raw fragment so the problem can be reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The payload has no header row at all.
    #[error("Export payload has no header row")]
    MissingHeader,

    /// The header row exists but cannot be used to name fields.
    #[error("Malformed header row ({reason}): {fragment:?}")]
    MalformedHeader {
        /// What is wrong with the header.
        reason: String,
        /// The raw header line.
        fragment: String,
    },

    /// A data row lacks a field that every row of this type must carry.
    #[error("Row {line} is missing required field '{field}': {fragment:?}")]
    MissingField {
        /// Name of the missing field.
        field: String,
        /// One-based line number in the payload.
        line: u64,
        /// The raw row text.
        fragment: String,
    },

    /// The payload is not valid delimited text.
    #[error("Invalid CSV at line {line}: {message}")]
    Csv {
        /// One-based line number where parsing stopped.
        line: u64,
        /// Parser message.
        message: String,
    },
}

// ============================================================================
// Lookup Error
// ============================================================================

/// Error raised by unique-prefix lookups.
///
/// These are user-input problems (a bad filter or SKU prefix), not system
/// faults, so they carry everything needed to correct the query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// More than one record matched the prefix.
    #[error("Prefix '{prefix}' is ambiguous: {count} records match in fields [{}]", .key_fields.join(", "))]
    AmbiguousMatch {
        /// The prefix that was searched for.
        prefix: String,
        /// The key fields that were searched.
        key_fields: Vec<String>,
        /// Number of distinct matching records.
        count: usize,
    },

    /// No record matched the prefix.
    #[error("No record matches prefix '{prefix}' in fields [{}]", .key_fields.join(", "))]
    NoMatch {
        /// The prefix that was searched for.
        prefix: String,
        /// The key fields that were searched.
        key_fields: Vec<String>,
    },
}

impl LookupError {
    /// Returns the prefix that failed to resolve.
    pub fn prefix(&self) -> &str {
        match self {
            Self::AmbiguousMatch { prefix, .. } | Self::NoMatch { prefix, .. } => prefix,
        }
    }
}
