//! Command-line front end for the Veracity verification pipeline.
//!
//! Wires configuration into concrete clients, runs one check, and prints the
//! structured result as JSON. The HTTP service layer lives elsewhere; this
//! binary exists so the whole pipeline can be driven end to end from a shell.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use veracity_common::observability::{LogConfig, init_logging};
use veracity_config::{PlatformsConfig, VeracityConfig, VeracityConfigLoader};
use veracity_social::extractor::{PlatformExtractor, UrlExtractor};
use veracity_social::instagram::InstagramApi;
use veracity_social::tiktok::TikTokApi;
use veracity_social::youtube::YouTubeApi;
use veracity_verify::types::{CheckRequest, ConversationTurn};
use veracity_verify::{ContentChecker, VerifyApiClient};

#[derive(Parser)]
#[command(name = "veracity", version, about = "Content verification pipeline")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "veracity.yaml")]
    config: PathBuf,
    /// Duplicate log events to stderr
    #[arg(long)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Verify a chat message, optionally enriched with media URLs
    Check {
        #[arg(long)]
        message: String,
        /// May be given several times
        #[arg(long = "media-url")]
        media_urls: Vec<String>,
        /// JSON file holding prior conversation turns
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Extract a platform URL and run the full media-verification path
    Video {
        #[arg(long)]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_path = init_logging(LogConfig {
        emit_stderr: cli.verbose,
        ..LogConfig::default()
    })?;
    tracing::debug!(log_path = %log_path.display(), "logging initialised");

    let cfg: VeracityConfig = VeracityConfigLoader::new()
        .with_file(&cli.config)
        .load()
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    let extractor = Arc::new(build_extractor(&cfg.platforms)?);
    let client = VerifyApiClient::new(
        &cfg.verify.endpoint,
        cfg.verify.api_key.clone(),
        Duration::from_secs(cfg.verify.timeout_secs),
    )?;
    let checker = ContentChecker::new(extractor.clone(), Arc::new(client));

    let result = match cli.cmd {
        Cmd::Check {
            message,
            media_urls,
            history,
        } => {
            let history = match history {
                Some(path) => read_history(&path)?,
                None => Vec::new(),
            };
            checker
                .check_content(&CheckRequest {
                    message,
                    history,
                    media_urls,
                    ..Default::default()
                })
                .await?
        }
        Cmd::Video { url } => {
            let record = extractor
                .extract(&url)
                .await
                .with_context(|| format!("extracting {url}"))?;
            if !record.platform.is_social() {
                bail!("{url} is not a supported platform URL");
            }
            checker.check_video(&record).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn build_extractor(platforms: &PlatformsConfig) -> anyhow::Result<UrlExtractor> {
    let mut extractor = UrlExtractor::new();
    if let Some(tiktok) = &platforms.tiktok {
        extractor = extractor.with_tiktok(TikTokApi::new(
            tiktok.api_key.clone(),
            tiktok.api_host.clone(),
        )?);
    }
    if let Some(youtube) = &platforms.youtube {
        extractor = extractor.with_youtube(YouTubeApi::new(youtube.api_key.clone())?);
    }
    if let Some(instagram) = &platforms.instagram {
        extractor = extractor.with_instagram(InstagramApi::new(
            instagram.api_key.clone(),
            instagram.api_host.clone(),
        )?);
    }
    Ok(extractor)
}

fn read_history(path: &PathBuf) -> anyhow::Result<Vec<ConversationTurn>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading history from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing history in {}", path.display()))
}
