//! Config command - inspect configuration.

use anyhow::Result;
use cctools_store::{PASSWORD_ENV, default_cache_dir};
use clap::{Args, Subcommand};

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration (password masked).
    Show,

    /// Show configuration paths.
    Path,
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_paths(cli),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let config = super::load_config(cli)?.redacted();

    match cli.format {
        OutputFormat::Text | OutputFormat::Csv => {
            println!("# {}", super::config_path(cli).display());
            print!("{}", config.to_toml()?);
            if let Err(e) = config.validate() {
                println!();
                println!("# Incomplete: {e}");
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&config)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli) -> Result<()> {
    let config_path = super::config_path(cli);
    let cache_dir = super::load_config(cli)
        .map_or_else(|_| default_cache_dir(), |config| config.cache_dir());

    match cli.format {
        OutputFormat::Text | OutputFormat::Csv => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config file: {}", config_path.display());
            println!("Cache dir:   {}", cache_dir.display());
            println!("Password:    file or {PASSWORD_ENV}");
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_file": config_path.display().to_string(),
                "cache_dir": cache_dir.display().to_string(),
                "exists": config_path.exists(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}
