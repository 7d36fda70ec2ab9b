//! Browser error types.

use cctools_core::{LookupError, ObjectType, ParseError};
use cctools_fetch::FetchError;
use cctools_store::StoreError;
use thiserror::Error;

/// Errors surfaced by [`crate::CcBrowser`].
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Logging in or exporting failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// An export payload could not be normalized.
    #[error("Cannot parse {object_type} export: {source}")]
    Parse {
        /// The type whose payload failed.
        object_type: ObjectType,
        /// What was wrong with it.
        #[source]
        source: ParseError,
    },

    /// A prefix lookup did not resolve to exactly one record.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The configuration is incomplete.
    #[error(transparent)]
    Config(#[from] StoreError),
}

impl BrowserError {
    /// Returns true for errors caused by user input rather than a fault.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Lookup(_) | Self::Config(_))
    }

    /// Returns the object type involved, when there is one.
    pub fn object_type(&self) -> Option<ObjectType> {
        match self {
            Self::Fetch(err) => Some(err.object_type()),
            Self::Parse { object_type, .. } => Some(*object_type),
            Self::Lookup(_) | Self::Config(_) => None,
        }
    }
}
