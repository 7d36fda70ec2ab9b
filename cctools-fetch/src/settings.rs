//! Site identity and fetch settings.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::error::TransportError;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Text the admin UI shows only to logged-in users.
pub const DEFAULT_LOGIN_MARKER: &str = "Logout";

// ============================================================================
// Site Config
// ============================================================================

/// Where the back office lives and who logs in to it.
#[derive(Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Store host name, e.g. `www.example.com`.
    pub host: String,
    /// Site account name (the `~site` path component).
    pub site: String,
    /// Admin user name.
    pub username: String,
    /// Admin password.
    pub password: String,
}

impl SiteConfig {
    /// Creates a site config.
    pub fn new(
        host: impl Into<String>,
        site: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            site: site.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the admin entry point, `https://{host}/~{site}/admin/index.php`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] if host or site cannot form a URL.
    pub fn admin_url(&self) -> Result<Url, TransportError> {
        let raw = format!("https://{}/~{}/admin/index.php", self.host, self.site);
        Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")))
    }
}

impl fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteConfig")
            .field("host", &self.host)
            .field("site", &self.site)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for the session transport and export fetcher.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Timeout for each HTTP request.
    pub timeout: Duration,
    /// Case-insensitive text proving a login succeeded.
    pub login_marker: String,
    /// Directory to write raw export payloads to, for debugging.
    pub dump_dir: Option<PathBuf>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            login_marker: DEFAULT_LOGIN_MARKER.to_string(),
            dump_dir: None,
        }
    }
}

impl FetchSettings {
    /// Creates settings with a custom timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Creates settings with a custom post-login marker.
    #[must_use]
    pub fn with_login_marker(mut self, marker: impl Into<String>) -> Self {
        self.login_marker = marker.into();
        self
    }

    /// Creates settings that dump every raw export payload into `dir`.
    #[must_use]
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        warn!(
            dir = %dir.display(),
            "Export dumping enabled - raw store data will be written to disk"
        );
        self.dump_dir = Some(dir);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
