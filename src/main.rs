use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod extractor;
mod fetcher;
mod pagination;
mod parser;
mod pipeline;
mod url_builder;
mod writer;

use config::SearchConfig;
use fetcher::HttpFetcher;
use pipeline::Scraper;
use writer::ListingWriter;

const DEFAULT_CONFIG: &str = "scraper.toml";

/// Scrape job search results into a delimited listings file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Search parameters (TOML). Defaults to ./scraper.toml when present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file, truncated on every run.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let output = config.output_path();

    let mut writer = ListingWriter::create(&output, config.delimiter_byte())
        .with_context(|| format!("Failed to create output file {}", output.display()))?;
    let fetcher = HttpFetcher::new()?;

    let summary = Scraper::new(&config, fetcher)
        .run(&mut writer)
        .with_context(|| format!("Scrape aborted; partial results in {}", output.display()))?;
    writer.finish()?;

    info!(
        output = %output.display(),
        listings = summary.listings_written,
        started = %summary.started_at.format("%Y-%m-%d %H:%M:%S"),
        "done"
    );
    Ok(())
}

fn load_config(args: &Args) -> anyhow::Result<SearchConfig> {
    let config = match &args.config {
        Some(path) => SearchConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG).exists() => {
            SearchConfig::load(Path::new(DEFAULT_CONFIG))
                .with_context(|| format!("Failed to load config {DEFAULT_CONFIG}"))?
        }
        None => SearchConfig::default(),
    };
    Ok(match &args.output {
        Some(output) => config.with_output(output.clone()),
        None => config,
    })
}
