//! Quotes command - parse quote files and print what they contain.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use meme_core::{QuoteIngestor, QuoteModel};

use super::config::load_config;

/// Arguments for the quotes command.
#[derive(Args)]
pub struct QuotesArgs {
    /// Quote files (csv, docx, pdf or txt)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of {body, author}
    Json,
    /// CSV with body and author columns
    Csv,
    /// One `"body" - author` line per quote
    Text,
}

pub fn run(args: QuotesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let ingestor = QuoteIngestor::from_config(&config.ingest);

    let quotes = ingestor.parse_all(&args.inputs)?;
    info!("Loaded {} quotes from {} files", quotes.len(), args.inputs.len());

    let output = format_quotes(&quotes, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Wrote {} quotes to {}",
            style("✓").green(),
            quotes.len(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn format_quotes(quotes: &[QuoteModel], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(quotes)? + "\n"),
        OutputFormat::Csv => format_csv(quotes),
        OutputFormat::Text => Ok(quotes.iter().map(|q| format!("{}\n", q)).collect()),
    }
}

fn format_csv(quotes: &[QuoteModel]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["body", "author"])?;
    for quote in quotes {
        wtr.write_record([quote.body(), quote.author()])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
