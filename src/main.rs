use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use trawl::{
    FeedError, FeedParser, IndexerResponse, IndexerUrls, IsoLanguages, ParserConfig,
    TorznabDialect, TracingSink,
};

/// Parse a fetched Torznab feed body and print the release records.
///
/// Useful for inspecting what an indexer actually returns: feed the raw
/// response body in and see either the normalized releases or the
/// classified failure the aggregation service would act on.
#[derive(Debug, Parser)]
#[command(name = "trawl", version, about)]
struct Cli {
    /// Path to the feed body, or "-" for stdin
    feed: PathBuf,

    /// Indexer base URL used to absolutize relative links
    #[arg(long, default_value = "http://localhost/")]
    base_url: String,

    /// Request URL the body was fetched from (error classification
    /// inspects its query string); defaults to the base URL
    #[arg(long)]
    request_url: Option<String>,

    /// HTTP status the body arrived with
    #[arg(long, default_value_t = 200)]
    status: u16,

    /// Declared Content-Type header
    #[arg(long)]
    content_type: Option<String>,

    /// Optional parser config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit full records as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let body = if cli.feed.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read feed body from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&cli.feed)
            .with_context(|| format!("Failed to read feed body from '{}'", cli.feed.display()))?
    };

    let config = match &cli.config {
        Some(path) => ParserConfig::load(path)
            .with_context(|| format!("Failed to load config from '{}'", path.display()))?,
        None => ParserConfig::default(),
    };

    let request_url = cli
        .request_url
        .clone()
        .unwrap_or_else(|| cli.base_url.clone());
    let mut response = IndexerResponse::new(request_url, body).with_status(cli.status);
    if let Some(content_type) = &cli.content_type {
        response = response.with_content_type(content_type.clone());
    }

    let dialect = TorznabDialect::new(
        Arc::new(IndexerUrls::new(&cli.base_url).context("Invalid base URL")?),
        Arc::new(IsoLanguages),
        Arc::new(TracingSink),
    )
    .with_config(config);
    let parser = FeedParser::new(dialect);

    match parser.parse(&response) {
        Ok(releases) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&releases)?);
            } else {
                for release in &releases {
                    println!(
                        "{:>14}  {:>5}/{:<5}  {}",
                        release.size,
                        fmt_count(release.seeders),
                        fmt_count(release.peers),
                        release.title
                    );
                }
                eprintln!("{} release(s)", releases.len());
            }
            Ok(())
        }
        Err(error) => {
            let advice = if error.is_transient() {
                "transient, back off and retry"
            } else if error.requires_reconfiguration() {
                "indexer needs reconfiguration"
            } else {
                "feed rejected"
            };
            tracing::error!(%error, advice, "Parse failed");
            // sysexits: EX_TEMPFAIL for rate limits, EX_NOPERM for auth
            std::process::exit(match error {
                FeedError::RateLimited(_) => 75,
                FeedError::Authentication(_) => 77,
                _ => 1,
            });
        }
    }
}

fn fmt_count(value: Option<i32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}
