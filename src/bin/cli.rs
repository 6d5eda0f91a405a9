//! follownet CLI
//!
//! Runs the follower network crawl against a captured follower graph.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use follownet::{
    error::Result,
    models::{Config, RunSummary},
    network::Chunk,
    pipeline::FollowNetPipeline,
    sources::GraphSnapshot,
};
use serde::Serialize;
use tokio::sync::mpsc;

/// follownet - mutual followings of a streamer's followers
#[derive(Parser, Debug)]
#[command(
    name = "follownet",
    version,
    about = "Finds the channels a streamer's followers mutually follow"
)]

struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "follownet.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a follower graph snapshot
    Run {
        /// Snapshot JSON with subject_id, followers and followings
        snapshot: PathBuf,

        /// Override the number of worker tasks
        #[arg(long)]
        consumers: Option<usize>,

        /// Override the mutual follow threshold
        #[arg(long)]
        min_mutual: Option<u32>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the configuration file
    Validate,
}

/// Result document written by `run`.
#[derive(Serialize)]
struct RunReport {
    summary: RunSummary,
    mutual_followings: std::collections::BTreeMap<String, u32>,
    chunks: Vec<Chunk>,
}

/// Initialize logging from the verbosity flag or the configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Crawl a snapshot file and collect every released chunk.
async fn run_snapshot(config: &Config, snapshot: &Path) -> Result<RunReport> {
    config.validate()?;

    let graph = GraphSnapshot::load(snapshot)
        .await?
        .with_sample_size(config.pipeline.sample_size);
    log::info!(
        "Loaded {} followers of {} from {}",
        graph.followers.len(),
        graph.subject_id,
        snapshot.display()
    );

    let pipeline = FollowNetPipeline::from_config(config);
    let graph = Arc::new(graph);

    let (tx, mut rx) = mpsc::unbounded_channel::<Chunk>();
    let collector = tokio::spawn(async move {
        let mut chunks = Vec::new();
        while let Some(chunk) = rx.recv().await {
            log::info!("Received chunk of {} candidates", chunk.len());
            chunks.push(chunk);
        }
        chunks
    });

    let outcome = pipeline.run(graph.clone(), graph, Some(tx)).await;
    let chunks = collector.await.unwrap_or_else(|e| {
        log::error!("Chunk collector failed: {}", e);
        Vec::new()
    });

    log::info!("[SUMMARY] Follower network");
    for (key, value) in outcome.summary.items() {
        log::info!("    {}: {}", key, value);
    }

    Ok(RunReport {
        summary: outcome.summary,
        mutual_followings: outcome.mutual_followings,
        chunks,
    })
}

/// Check the configuration, logging the outcome.
fn validate_config(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!("✓ Config OK");
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging needs the configured level, so report a bad config afterwards.
    let loaded = Config::load(&cli.config);
    let mut config = loaded.as_ref().cloned().unwrap_or_default();
    init_logging(cli.verbose, &config.logging.level);
    if let Err(e) = &loaded {
        log::warn!(
            "Config load failed from {:?}: {}. Using defaults.",
            cli.config,
            e
        );
    }

    match cli.command {
        Command::Run {
            snapshot,
            consumers,
            min_mutual,
            output,
        } => {
            if let Some(n) = consumers {
                config.pipeline.n_consumers = n;
            }
            if let Some(n) = min_mutual {
                config.network.min_mutual = n;
            }

            let report = run_snapshot(&config, &snapshot).await?;
            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    log::info!("Result saved to {}", path.display());
                }
                None => println!("{json}"),
            }
        }

        Command::Validate => validate_config(&config)?,
    }

    Ok(())
}
