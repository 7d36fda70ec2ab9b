//! Cache command - inspect or clear cached exports.

use anyhow::Result;
use cctools_core::ObjectType;
use cctools_store::{Config, RecordCache};
use chrono::Utc;
use clap::{Args, Subcommand};
use tracing::info;

use crate::output::text::{format_age, freshness_label, location_label};
use crate::output::{CACHE_HEADERS, CacheStatusOutput, CsvFormatter, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the cache command.
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands.
#[derive(Subcommand)]
pub enum CacheAction {
    /// Show age and size of every cached export.
    Status,

    /// Remove cached exports (all types unless one is named).
    Clear {
        /// Object type to clear.
        object_type: Option<ObjectType>,
    },
}

/// Runs the cache command.
pub async fn run(args: &CacheArgs, cli: &Cli) -> Result<()> {
    let config = super::load_config(cli)?;
    let cache = open_cache(&config);

    match &args.action {
        CacheAction::Status => show_status(&cache, &config, cli).await,
        CacheAction::Clear { object_type } => clear(&cache, *object_type, cli).await,
    }
}

/// Opens the cache of the configured site.
///
/// Cache maintenance needs the site identity only, not credentials.
fn open_cache(config: &Config) -> RecordCache {
    RecordCache::new(Some(config.cache_dir()), config.site_id())
}

async fn show_status(cache: &RecordCache, config: &Config, cli: &Cli) -> Result<()> {
    let ttl = super::ttl_override(cli).unwrap_or_else(|| config.ttl());
    let statuses = cache.status(ttl).await;
    let now = Utc::now();

    let output = match cli.format {
        OutputFormat::Text => {
            TextFormatter::new(!cli.no_color).format_cache_status(cache.site(), &statuses, now)
        }
        OutputFormat::Csv => {
            let rows: Vec<Vec<String>> = statuses
                .iter()
                .map(|status| {
                    vec![
                        status.object_type.name().to_string(),
                        location_label(status.location).to_string(),
                        status.record_count.map(|n| n.to_string()).unwrap_or_default(),
                        status.age(now).map(format_age).unwrap_or_default(),
                        freshness_label(status).to_string(),
                    ]
                })
                .collect();
            CsvFormatter::new().format_table(&CACHE_HEADERS, &rows)?
        }
        OutputFormat::Json => {
            let outputs: Vec<CacheStatusOutput> = statuses
                .iter()
                .map(|status| CacheStatusOutput::new(status, now))
                .collect();
            JsonFormatter::new(cli.pretty).format(&outputs)?
        }
    };
    println!("{}", output.trim_end_matches('\n'));

    Ok(())
}

async fn clear(cache: &RecordCache, object_type: Option<ObjectType>, cli: &Cli) -> Result<()> {
    match object_type {
        Some(object_type) => {
            cache.invalidate(object_type).await;
            info!(%object_type, "Cache entry removed");
            if !cli.quiet {
                println!("Cleared cached {}", object_type.display_name().to_lowercase());
            }
        }
        None => {
            cache.clear().await;
            if !cli.quiet {
                println!("Cleared cache for {}", cache.site());
            }
        }
    }
    Ok(())
}
