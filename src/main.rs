use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use std::path::{Path, PathBuf};

use feedsnap::feed::days_before_today;
use feedsnap::{Config, FeedQuery, FeedSource, UndatedItems};

/// Get the default config file path (~/.config/feedsnap/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("feedsnap")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(
    name = "feedsnap",
    version,
    about = "Convert recent RSS feed items to JSON"
)]
struct Args {
    /// Feed URL, path to a feed file, or feed XML text
    input: String,

    /// Item field to extract (repeatable)
    #[arg(short, long = "field", value_name = "NAME")]
    fields: Vec<String>,

    /// Path to try on the same host when the URL yields no feed (repeatable)
    #[arg(short, long = "alt-path", value_name = "PATH")]
    alt_paths: Vec<String>,

    /// Keep items published on or after this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", conflicts_with = "days")]
    since: Option<NaiveDate>,

    /// Keep items from the last N days
    #[arg(long, value_name = "N")]
    days: Option<u32>,

    /// Config file (defaults to ~/.config/feedsnap/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Include items whose pubDate cannot be parsed
    #[arg(long)]
    keep_undated: bool,
}

/// URLs and existing files are taken as such; anything else is feed text.
fn source_from_input(input: &str) -> FeedSource {
    match FeedSource::detect(input) {
        FeedSource::Inline(text) if Path::new(&text).is_file() => FeedSource::file(text),
        source => source,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    config.alt_paths.extend(args.alt_paths.iter().cloned());
    if let Some(days) = args.days {
        config.lookback_days = days;
    }

    let undated = if args.keep_undated {
        UndatedItems::Keep
    } else {
        UndatedItems::Skip
    };

    let source = source_from_input(&args.input);
    tracing::debug!(source = ?source, fields = ?args.fields, "Starting feed snapshot");

    let query = FeedQuery::from_config(source, &args.fields, &config)
        .context("Failed to initialize HTTP client")?
        .with_undated_items(undated);

    let since = args
        .since
        .unwrap_or_else(|| days_before_today(config.lookback_days));
    let records = query.get(Some(since)).await;

    let json = serde_json::to_string_pretty(&records).context("Failed to serialize records")?;
    println!("{json}");

    Ok(())
}
