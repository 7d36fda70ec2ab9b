//! Store error types.

use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Store Error
// ============================================================================

/// Errors from persistence helpers and configuration loading.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configuration file is not valid TOML for [`crate::Config`].
    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("Cannot render configuration: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    /// A required setting is missing or empty.
    #[error("Configuration error: {0}")]
    Config(String),
}

// ============================================================================
// Cache Error
// ============================================================================

/// Faults in the on-disk record cache.
///
/// These never reach callers of [`crate::RecordCache::get`]; they are logged
/// and the cache falls back to fetching or to an unpersisted result.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache file could not be read or written.
    #[error("Cache IO error at {}: {source}", path.display())]
    Io {
        /// Cache file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The cache file is not valid JSON for a cache entry.
    #[error("Corrupt cache file {}: {source}", path.display())]
    Serialization {
        /// Cache file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The cache file belongs to another site, type, or format version.
    #[error("Cache file {} does not match: {reason}", path.display())]
    Mismatch {
        /// Cache file.
        path: PathBuf,
        /// What did not match.
        reason: String,
    },
}

impl CacheError {
    /// Attaches `path` to a persistence error.
    pub(crate) fn at(path: PathBuf, err: StoreError) -> Self {
        match err {
            StoreError::Io(source) => Self::Io { path, source },
            StoreError::Serialization(source) => Self::Serialization { path, source },
            other => Self::Mismatch {
                path,
                reason: other.to_string(),
            },
        }
    }
}
