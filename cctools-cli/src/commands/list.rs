//! List command - show every record of one object type.

use anyhow::Result;
use cctools_browser::CcBrowser;
use cctools_core::{ObjectType, Record};
use clap::Args;
use tracing::info;

use crate::output::{CsvFormatter, HEADER_ABBREVIATIONS, JsonFormatter, TableOptions, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Object type (category, product, option_set, variant, ...).
    pub object_type: ObjectType,

    /// Show HTML values as exported instead of as plain text.
    #[arg(long)]
    pub raw_html: bool,

    /// Show full field names as column headers.
    #[arg(long)]
    pub full_headers: bool,

    /// Longest column in text output (0 for no limit).
    #[arg(long, default_value = "40", value_name = "CHARS")]
    pub max_width: usize,
}

/// Runs the list command.
pub async fn run(args: &ListArgs, cli: &Cli) -> Result<()> {
    let browser = super::connect(cli)?;

    info!(object_type = %args.object_type, "Listing records");
    let records = sorted_records(&browser, args.object_type).await?;

    let output = match cli.format {
        OutputFormat::Text => TextFormatter::new(!cli.no_color)
            .with_options(TableOptions {
                strip_html: !args.raw_html,
                max_width: args.max_width,
                abbreviations: if args.full_headers { &[] } else { HEADER_ABBREVIATIONS },
            })
            .format_records(args.object_type, &records),
        OutputFormat::Csv => CsvFormatter::new().format_records(args.object_type, &records)?,
        OutputFormat::Json => JsonFormatter::new(cli.pretty).format(&records)?,
    };
    println!("{}", output.trim_end_matches('\n'));

    Ok(())
}

/// Loads all records of `object_type` in display order.
///
/// Products are ranked by category, then name.
pub async fn sorted_records(browser: &CcBrowser, object_type: ObjectType) -> Result<Vec<Record>> {
    let mut records = browser.get(object_type).await?;
    if object_type == ObjectType::Product {
        let order = browser.category_order().await?;
        records.sort_by_key(|p| CcBrowser::product_key_by_cat_and_name(&order, p));
    } else {
        records.sort_by_key(|r| object_type.sort_key(r));
    }
    Ok(records)
}
