//! CLI command implementations.

pub mod cache;
pub mod config;
pub mod find;
pub mod inventory;
pub mod list;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use cctools_browser::CcBrowser;
use cctools_fetch::FetchSettings;
use cctools_store::Config;
use tracing::debug;

use crate::Cli;

/// Returns the configuration file selected on the command line.
pub fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(Config::default_path)
}

/// Loads the configuration selected on the command line.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let path = config_path(cli);
    Config::load_from(&path).with_context(|| format!("Cannot load {}", path.display()))
}

/// Returns the cache TTL override given on the command line, if any.
pub fn ttl_override(cli: &Cli) -> Option<Duration> {
    if cli.refresh {
        Some(Duration::ZERO)
    } else {
        cli.cache_ttl.map(Duration::from_secs)
    }
}

/// Builds a browser for the configured site.
pub fn connect(cli: &Cli) -> Result<CcBrowser> {
    let config = load_config(cli)?;
    let mut browser = CcBrowser::connect(&config, FetchSettings::default())?;
    if let Some(ttl) = ttl_override(cli) {
        debug!(ttl_secs = ttl.as_secs(), "Cache TTL overridden");
        browser = browser.with_ttl(ttl);
    }
    if cli.no_disk_cache {
        browser = browser.without_disk_cache();
    }
    Ok(browser)
}
