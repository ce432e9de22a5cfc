//! Emotion photo filter binary.
//!
//! Reads photo records, classifies them through Face++ and prints the ones
//! showing any of the requested emotions as JSON on stdout.

use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use emofilter_facepp::{EmotionFilterService, FacePlusPlusConfig, FailurePolicy};
use emofilter_models::{Emotion, PhotoInfo};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "emofilter=info,emofilter_facepp=info,emofilter_models=info,warn";

/// Filter photos by the emotions on the faces they show.
#[derive(Parser, Debug)]
#[command(name = "emofilter", version)]
struct Cli {
    /// Emotions to keep (comma-separated names or ids, e.g. happiness,surprise).
    #[arg(short, long, value_delimiter = ',', required = true)]
    emotion: Vec<Emotion>,

    /// JSON file with an array of photo records (`-` for stdin).
    #[arg(short, long)]
    photos: Option<PathBuf>,

    /// Image URL to classify; may be repeated.
    #[arg(short, long)]
    url: Vec<String>,

    /// Photos classified in parallel (overrides FACEPP_MAX_CONCURRENCY).
    #[arg(long)]
    concurrency: Option<usize>,

    /// Drop photos whose classification fails instead of aborting.
    #[arg(long)]
    skip_failures: bool,
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("emofilter failed: {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(config) = FacePlusPlusConfig::from_env() else {
        bail!("Face++ is not configured: set FACEPP_API_KEY, FACEPP_API_SECRET and FACEPP_API_URL");
    };
    let config = apply_overrides(config, &cli);
    info!("Face++ config: {:?}", config);

    let photos = collect_photos(&cli)?;
    if photos.is_empty() {
        bail!("No photos given: use --photos and/or --url");
    }

    let targets: HashSet<Emotion> = cli.emotion.iter().copied().collect();
    info!(photos = photos.len(), targets = ?targets, "Starting emotion filter");

    let service = EmotionFilterService::new(config);
    let kept = service
        .filter_by_emotions(&photos, &targets)
        .await
        .context("emotion filtering failed")?;

    println!("{}", serde_json::to_string_pretty(&kept)?);
    Ok(())
}

fn apply_overrides(mut config: FacePlusPlusConfig, cli: &Cli) -> FacePlusPlusConfig {
    if let Some(concurrency) = cli.concurrency {
        config = config.with_max_concurrency(concurrency);
    }
    if cli.skip_failures {
        config = config.with_failure_policy(FailurePolicy::SkipPhoto);
    }
    config
}

fn collect_photos(cli: &Cli) -> anyhow::Result<Vec<PhotoInfo>> {
    let mut photos = match &cli.photos {
        Some(path) if path.as_os_str() == "-" => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read photos from stdin")?;
            parse_photos(&raw)?
        }
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_photos(&raw)?
        }
        None => Vec::new(),
    };

    photos.extend(cli.url.iter().map(|url| PhotoInfo::new(url.clone(), url.clone())));
    Ok(photos)
}

fn parse_photos(raw: &str) -> anyhow::Result<Vec<PhotoInfo>> {
    serde_json::from_str(raw).context("photos must be a JSON array of {id, origin_url, title?}")
}
