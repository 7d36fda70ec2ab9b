// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! cctools CLI - browse CoreCommerce back-office exports from the command line.
//!
//! # Examples
//!
//! ```bash
//! # List products, sorted by category and name
//! cctools list products
//!
//! # Keep descriptions as exported HTML
//! cctools list categories --raw-html
//!
//! # Find one product by SKU or name prefix
//! cctools find product NECK-01
//!
//! # Inventory report as CSV
//! cctools --format csv inventory --sort category
//!
//! # Ignore cached exports
//! cctools --refresh list variants
//!
//! # Inspect or drop the record cache
//! cctools cache status
//! cctools cache clear products
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use cctools_browser::BrowserError;
use cctools_store::StoreError;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{cache, config, find, inventory, list};

// ============================================================================
// CLI Definition
// ============================================================================

/// cctools CLI - CoreCommerce back-office browser.
#[derive(Parser)]
#[command(name = "cctools")]
#[command(about = "Browse and report on CoreCommerce back-office exports")]
#[command(long_about = r#"
cctools logs into a CoreCommerce store's back office, downloads its CSV
exports and caches the normalized records locally.

Object types:
  category, product, product_option, option_set, option_group,
  option, question, personalization, variant

Examples:
  cctools list products              # All products
  cctools find product NECK          # Unique prefix lookup
  cctools inventory --sort category  # Stock report
  cctools --format json list options # JSON output
  cctools cache status               # Cache freshness
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: platform config dir).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Cache time-to-live in seconds (overrides the config file).
    #[arg(long, global = true, value_name = "SECS")]
    pub cache_ttl: Option<u64>,

    /// Ignore cached exports and download fresh ones.
    #[arg(long, global = true, conflicts_with = "cache_ttl")]
    pub refresh: bool,

    /// Keep exports in memory only; neither read nor write cache files.
    #[arg(long, global = true)]
    pub no_disk_cache: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// List all records of an object type.
    #[command(visible_alias = "ls")]
    List(list::ListArgs),

    /// Find the single record whose key starts with a prefix.
    #[command(visible_alias = "f")]
    Find(find::FindArgs),

    /// Show stock levels of every available product.
    #[command(visible_alias = "inv")]
    Inventory(inventory::InventoryArgs),

    /// Inspect or clear the record cache.
    Cache(cache::CacheArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// Comma-separated values with a header row.
    Csv,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// Bad input: ambiguous or unmatched lookup, incomplete configuration.
    UserError = 2,
    /// The back office rejected the login.
    Authentication = 3,
    /// The back office could not be reached or answered with an error.
    Network = 4,
}

impl ExitCode {
    /// Classifies an error returned by a command.
    pub fn for_error(error: &anyhow::Error) -> Self {
        if error.downcast_ref::<StoreError>().is_some() {
            return Self::UserError;
        }
        match error.downcast_ref::<BrowserError>() {
            Some(e) if e.is_user_error() => Self::UserError,
            Some(BrowserError::Fetch(e)) if e.is_authentication() => Self::Authentication,
            Some(BrowserError::Fetch(_)) => Self::Network,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("cctools=debug,info")
    } else {
        EnvFilter::new("cctools=warn")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::List(args) => list::run(args, &cli).await,
        Commands::Find(args) => find::run(args, &cli).await,
        Commands::Inventory(args) => inventory::run(args, &cli).await,
        Commands::Cache(args) => cache::run(args, &cli).await,
        Commands::Config(args) => config::run(args, &cli),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cctools_core::{LookupError, ObjectType};
    use cctools_fetch::{AuthenticationError, FetchError, TransportError};

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cctools", "list", "products", "--format", "csv", "--cache-ttl", "60",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Csv);
        assert_eq!(cli.cache_ttl, Some(60));
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_refresh_conflicts_with_cache_ttl() {
        let result =
            Cli::try_parse_from(["cctools", "--refresh", "--cache-ttl", "5", "inventory"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_object_type_is_rejected() {
        assert!(Cli::try_parse_from(["cctools", "list", "widgets"]).is_err());
    }

    #[test]
    fn test_exit_code_for_errors() {
        let lookup: anyhow::Error = BrowserError::from(LookupError::NoMatch {
            prefix: "X".to_string(),
            key_fields: vec!["SKU".to_string()],
        })
        .into();
        assert_eq!(ExitCode::for_error(&lookup), ExitCode::UserError);

        let auth: anyhow::Error = BrowserError::from(FetchError::Authentication {
            object_type: ObjectType::Product,
            source: AuthenticationError::Rejected {
                username: "clerk".to_string(),
            },
        })
        .into();
        assert_eq!(ExitCode::for_error(&auth), ExitCode::Authentication);

        let transport: anyhow::Error = BrowserError::from(FetchError::Transport {
            object_type: ObjectType::Product,
            source: TransportError::Timeout {
                url: "https://shop.example.com/~acme/admin/index.php".to_string(),
            },
        })
        .into();
        assert_eq!(ExitCode::for_error(&transport), ExitCode::Network);

        let config: anyhow::Error = StoreError::Config("missing website.host".to_string()).into();
        assert_eq!(
            ExitCode::for_error(&config.context("Cannot load cctools.toml")),
            ExitCode::UserError
        );

        let other = anyhow::anyhow!("disk full");
        assert_eq!(ExitCode::for_error(&other), ExitCode::Error);
    }
}
