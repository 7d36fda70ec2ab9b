//! Fetch error types.

use cctools_core::ObjectType;
use thiserror::Error;

// ============================================================================
// Transport Error
// ============================================================================

/// Error raised by a single HTTP exchange with the back office.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("Request to {url} failed: {source}")]
    Request {
        /// Target URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The request exceeded the client timeout.
    #[error("Request to {url} timed out")]
    Timeout {
        /// Target URL.
        url: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Status code.
        status: u16,
        /// Target URL.
        url: String,
    },

    /// A URL could not be built from the site settings or a form action.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl TransportError {
    /// Classifies a client error for `url`.
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Request {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

// ============================================================================
// Authentication Error
// ============================================================================

/// Error raised while logging in to the back office.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// The credentials were submitted but the site did not accept them.
    #[error("Login rejected for user '{username}'")]
    Rejected {
        /// The user that tried to log in.
        username: String,
    },

    /// The admin page did not contain the expected login form.
    #[error("Login form '{form}' not found at {url}")]
    LoginFormNotFound {
        /// Expected form name.
        form: String,
        /// Page that was searched.
        url: String,
    },

    /// The login exchange failed at the transport level.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

// ============================================================================
// Fetch Error
// ============================================================================

/// Error raised while exporting one object type.
///
/// Always names the object type so callers can report which table failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Logging in failed before the export could start.
    #[error("Cannot export {object_type}: {source}")]
    Authentication {
        /// The type being exported.
        object_type: ObjectType,
        /// Why the login failed.
        #[source]
        source: AuthenticationError,
    },

    /// One of the export requests failed.
    #[error("Export of {object_type} failed: {source}")]
    Transport {
        /// The type being exported.
        object_type: ObjectType,
        /// The failing exchange.
        #[source]
        source: TransportError,
    },
}

impl FetchError {
    /// Returns the object type whose export failed.
    pub fn object_type(&self) -> ObjectType {
        match self {
            Self::Authentication { object_type, .. } | Self::Transport { object_type, .. } => {
                *object_type
            }
        }
    }

    /// Returns true if the failure happened while logging in.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
