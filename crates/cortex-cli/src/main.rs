mod configuration;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use cortex::{parse_document_str, summarize, ParseError, Response, SampleLoader};
use std::path::PathBuf;
use tracing::Level;

use configuration::{OutputFormat, Settings};

#[derive(Parser)]
#[command(author, version, about = "Summarize recorded agent responses", long_about = None)]
struct Cli {
    /// File holding the recorded responses
    #[arg(default_value = "sample_responses")]
    file: PathBuf,

    /// Treat the file as one consolidated JSON response instead of marked samples
    #[arg(long)]
    document: bool,

    /// Line prefix that starts each sample (overrides CORTEX_SAMPLES__MARKER)
    #[arg(long)]
    marker: Option<String>,

    /// Output format (overrides CORTEX_OUTPUT__FORMAT)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Log parser decisions, including skipped lines
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let mut settings = Settings::new()?;
    if let Some(marker) = cli.marker.clone() {
        settings.samples.marker = marker;
    }
    if let Some(format) = cli.format {
        settings.output.format = format;
    }

    let responses = match load(&cli, &settings) {
        Ok(responses) => responses,
        Err(ParseError::SampleSourceMissing { path }) => {
            let source = if cli.document {
                "Response document"
            } else {
                "Sample responses file"
            };
            eprintln!(
                "{}",
                style(format!("{} not found: {}", source, path.display())).red()
            );
            std::process::exit(1);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Error parsing {}", cli.file.display()))
        }
    };
    tracing::debug!("Parsed {} responses", responses.len());

    let summaries: Vec<_> = responses.iter().map(summarize).collect();
    println!("{}", output::render(&summaries, &settings.output)?);
    Ok(())
}

fn load(cli: &Cli, settings: &Settings) -> Result<Vec<Response>, ParseError> {
    if cli.document {
        let raw = std::fs::read_to_string(&cli.file).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ParseError::SampleSourceMissing {
                path: cli.file.clone(),
            },
            _ => ParseError::Io(e),
        })?;
        return Ok(vec![parse_document_str(&raw)?]);
    }

    SampleLoader::new()
        .with_marker(settings.samples.marker.as_str())
        .load(&cli.file)
}
