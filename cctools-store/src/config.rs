//! Configuration management.
//!
//! The configuration is a TOML file, by default at
//! `{config_dir}/cctools/cctools.toml`:
//!
//! ```toml
//! [website]
//! host = "www.example.com"
//! site = "acme"
//! username = "clerk"
//! password = "secret"
//!
//! [cache]
//! ttl_secs = 3600
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::persistence::{default_cache_dir, default_config_path};

/// Environment variable that overrides `website.password`.
pub const PASSWORD_ENV: &str = "CCTOOLS_PASSWORD";

const REDACTED: &str = "********";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Back-office site and credentials.
    #[serde(default)]
    pub website: WebsiteConfig,
    /// Record cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Back-office site and credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteConfig {
    /// Store host name.
    #[serde(default)]
    pub host: String,
    /// Site account name.
    #[serde(default)]
    pub site: String,
    /// Admin user name.
    #[serde(default)]
    pub username: String,
    /// Admin password.
    #[serde(default)]
    pub password: String,
    /// Text that proves a login succeeded (default `Logout`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_marker: Option<String>,
}

impl std::fmt::Debug for WebsiteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebsiteConfig")
            .field("host", &self.host)
            .field("site", &self.site)
            .field("username", &self.username)
            .field("password", &REDACTED)
            .field("login_marker", &self.login_marker)
            .finish()
    }
}

/// Record cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a cached export stays valid.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Cache directory (default `{cache_dir}/cctools`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn default_ttl_secs() -> u64 {
    3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            dir: None,
        }
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults. The password is taken from
    /// `CCTOOLS_PASSWORD` when that variable is set.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = Self::from_toml(&content)?;
            info!(path = %path.display(), "Loaded configuration");
            config
        } else {
            debug!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };

        config.override_password(std::env::var(PASSWORD_ENV).ok());
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, StoreError> {
        Ok(toml::from_str(content)?)
    }

    /// Replaces the password when `password` is a non-empty value.
    pub fn override_password(&mut self, password: Option<String>) {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            debug!("Using password from environment");
            self.website.password = password;
        }
    }

    /// Checks that every setting needed to log in is present.
    pub fn validate(&self) -> Result<(), StoreError> {
        let website = &self.website;
        for (name, value) in [
            ("host", &website.host),
            ("site", &website.site),
            ("username", &website.username),
            ("password", &website.password),
        ] {
            if value.trim().is_empty() {
                return Err(StoreError::Config(format!(
                    "missing website.{name} (set it in the config file{})",
                    if name == "password" {
                        format!(" or {PASSWORD_ENV}")
                    } else {
                        String::new()
                    }
                )));
            }
        }
        Ok(())
    }

    /// Returns the cache time-to-live.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    /// Returns the configured or default cache directory.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache.dir.clone().unwrap_or_else(default_cache_dir)
    }

    /// Returns the site identity used to key cache files.
    pub fn site_id(&self) -> String {
        format!("{}/~{}", self.website.host, self.website.site)
    }

    /// Returns a copy with the password masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.website.password.is_empty() {
            copy.website.password = REDACTED.to_string();
        }
        copy
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, StoreError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
        [website]
        host = "shop.example.com"
        site = "acme"
        username = "clerk"
        password = "hunter2"

        [cache]
        ttl_secs = 600
    "#;

    #[test]
    fn test_parse_sample() {
        let config = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(config.website.host, "shop.example.com");
        assert_eq!(config.website.login_marker, None);
        assert_eq!(config.ttl(), Duration::from_secs(600));
        assert_eq!(config.site_id(), "shop.example.com/~acme");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cache_section_defaults() {
        let config = Config::from_toml("[website]\nhost = \"h\"\n").unwrap();
        assert_eq!(config.cache.ttl_secs, 3600);
        assert_eq!(config.cache_dir(), default_cache_dir());
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[website\nhost=").unwrap_err();
        assert!(matches!(err, StoreError::ConfigParse(_)));
    }

    #[test]
    fn test_validate_names_missing_setting() {
        let mut config = Config::from_toml(SAMPLE).unwrap();
        config.website.password.clear();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("website.password"));
        assert!(err.contains(PASSWORD_ENV));
    }

    #[test]
    fn test_password_override() {
        let mut config = Config::from_toml(SAMPLE).unwrap();
        config.override_password(Some(String::new()));
        assert_eq!(config.website.password, "hunter2");
        config.override_password(Some("from-env".to_string()));
        assert_eq!(config.website.password, "from-env");
    }

    #[test]
    fn test_redacted_output_hides_password() {
        let config = Config::from_toml(SAMPLE).unwrap();
        let shown = config.redacted().to_toml().unwrap();
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("shop.example.com"));
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config.cache, CacheConfig::default());
        assert!(config.website.host.is_empty());
    }
}
