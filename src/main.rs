use std::env;
use std::path::PathBuf;

use anyhow::Context;
use chrono::DateTime;
use clap::Parser;
use mta_alerts::{FeedConfig, FeedSource, NON_ACTIVE_ALERTS};
use tracing_subscriber::EnvFilter;

/// Print the current MTA subway service status
#[derive(Parser, Debug)]
#[command(name = "mta-alerts", version, about)]
struct Args {
    /// Path to TOML configuration file (falls back to CONFIG_FILE, then built-in defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Evaluate alerts at this instant (epoch seconds) instead of now
    #[arg(long)]
    at: Option<i64>,

    /// Print the classification as JSON
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> anyhow::Result<FeedConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| env::var_os("CONFIG_FILE").map(PathBuf::from));

    let mut config = match path {
        Some(path) => FeedConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => FeedConfig::default(),
    };
    if config.api_key.is_none() {
        config.api_key = env::var("MTA_API_KEY").ok();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let feed = FeedSource::connect(config)
        .await
        .context("fetching alert feed")?;

    let classification = match args.at {
        Some(secs) => {
            let at = DateTime::from_timestamp(secs, 0)
                .with_context(|| format!("{secs} is out of range"))?
                .with_timezone(&feed.timezone());
            feed.classify(&at)?
        }
        None => feed.classify_now()?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&classification)?);
        return Ok(());
    }

    println!(
        "Last refresh: {}",
        feed.refreshed_at()?.format("%Y-%m-%d %H:%M:%S")
    );
    for (status, lines) in classification.items(false) {
        println!("{status} : {}", join(lines));
    }
    println!("{NON_ACTIVE_ALERTS} : {}", join(classification.non_active()));
    Ok(())
}

fn join<'a>(lines: impl IntoIterator<Item = &'a String>) -> String {
    lines
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}
