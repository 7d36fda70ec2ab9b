// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # cctools Core
//!
//! Core types, schemas, and normalization rules for the `cctools` suite.
//!
//! This crate provides the foundational abstractions used across all other
//! `cctools` crates, including:
//!
//! - Domain models (records, object types, per-type schemas)
//! - The record normalizer that turns raw export tables into records
//! - Sort keys and the unique-prefix lookup used by report tools
//! - Error types
//!
//! ## Key Types
//!
//! ### Records
//! - [`Record`] - One exported row: an ordered `field -> value` mapping
//! - [`ObjectType`] - Enum of every exportable object type
//! - [`Schema`] - Static per-type field, boolean, key, and sort tables
//!
//! ### Ordering & Lookup
//! - [`SortKey`] - Comparable tuple derived from a record
//! - [`CategoryOrder`] - Category ranking used by product sort keys
//! - [`find_unique`] - Unique-prefix lookup over key fields
//!
//! ### Errors
//! - [`ParseError`] - Malformed export payloads
//! - [`LookupError`] - Ambiguous or missing prefix matches

pub mod error;
pub mod lookup;
pub mod models;
pub mod normalize;
pub mod sort;
pub mod text;

// Re-export error types
pub use error::{LookupError, ParseError};

// Re-export model types
pub use models::{ObjectType, Record, Schema};

// Re-export lookup, ordering, and presentation helpers
pub use lookup::find_unique;
pub use sort::{CategoryOrder, KeyPart, SortKey};
pub use text::html_to_plain_text;
