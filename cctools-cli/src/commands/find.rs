//! Find command - look up one record by key prefix.

use anyhow::Result;
use cctools_core::ObjectType;
use clap::Args;
use tracing::info;

use crate::output::{CsvFormatter, JsonFormatter, TableOptions, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the find command.
#[derive(Args)]
pub struct FindArgs {
    /// Object type (category, product, option_set, variant, ...).
    pub object_type: ObjectType,

    /// Case-sensitive prefix of a key field value.
    pub prefix: String,

    /// Field to search; repeat for several (default: the type's key fields).
    #[arg(long = "field", value_name = "FIELD")]
    pub fields: Vec<String>,

    /// Show HTML values as exported instead of as plain text.
    #[arg(long)]
    pub raw_html: bool,
}

/// Runs the find command.
pub async fn run(args: &FindArgs, cli: &Cli) -> Result<()> {
    let browser = super::connect(cli)?;

    let fields: Vec<&str> = args.fields.iter().map(String::as_str).collect();
    info!(object_type = %args.object_type, prefix = %args.prefix, ?fields, "Finding record");
    let record = browser
        .find_unique(args.object_type, &args.prefix, &fields)
        .await?;

    let output = match cli.format {
        OutputFormat::Text => TextFormatter::new(!cli.no_color)
            .with_options(TableOptions {
                strip_html: !args.raw_html,
                ..TableOptions::default()
            })
            .format_record(&record),
        OutputFormat::Csv => {
            CsvFormatter::new().format_records(args.object_type, std::slice::from_ref(&record))?
        }
        OutputFormat::Json => JsonFormatter::new(cli.pretty).format(&record)?,
    };
    println!("{}", output.trim_end_matches('\n'));

    Ok(())
}
