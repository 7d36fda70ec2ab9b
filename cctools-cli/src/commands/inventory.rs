//! Inventory command - stock levels of every available product.

use anyhow::Result;
use cctools_browser::{InventoryItem, InventorySort};
use clap::Args;
use tracing::info;

use crate::output::{CsvFormatter, INVENTORY_HEADERS, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the inventory command.
#[derive(Args)]
pub struct InventoryArgs {
    /// Row order: sku, or category (category rank, then product name).
    #[arg(long, default_value = "sku")]
    pub sort: InventorySort,
}

/// Runs the inventory command.
pub async fn run(args: &InventoryArgs, cli: &Cli) -> Result<()> {
    let browser = super::connect(cli)?;

    info!(sort = %args.sort, "Building inventory");
    let items = browser.inventory(args.sort).await?;

    let output = match cli.format {
        OutputFormat::Text => TextFormatter::new(!cli.no_color).format_inventory(&items),
        OutputFormat::Csv => CsvFormatter::new().format_table(&INVENTORY_HEADERS, &rows(&items))?,
        OutputFormat::Json => JsonFormatter::new(cli.pretty).format(&items)?,
    };
    println!("{}", output.trim_end_matches('\n'));

    Ok(())
}

fn rows(items: &[InventoryItem]) -> Vec<Vec<&str>> {
    items
        .iter()
        .map(|item| {
            vec![
                item.sku.as_str(),
                item.level.as_str(),
                item.name.as_str(),
                item.enabled.as_str(),
            ]
        })
        .collect()
}
