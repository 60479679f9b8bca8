//! congress-ingest - Congressional records aggregator
//!
//! Commands:
//! - `fetch hearings|records|votes` - checkpointed fetch into a YAML snapshot
//! - `cleanup` - merge, deduplicate and report on existing snapshots
//! - `set-key` - store the Congress.gov API key in the config file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use congress_common::config::{default_config_path, load_toml_config, TomlConfig};
use congress_ingest::cleanup::{run_cleanup, CleanupOptions};
use congress_ingest::config::{save_api_key, IngestConfig};
use congress_ingest::extractors::{CongressClient, SenateClient};
use congress_ingest::models::{DatasetKind, DateRange, Hearing, RecordIssue, Vote};
use congress_ingest::storage::{SnapshotContext, SnapshotWriter};
use congress_ingest::workflow::{
    run_fetch, FetchPlan, FetchSummary, HearingsSource, PartitionSource, RecordsSource,
    VotesSource,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for congress-ingest
#[derive(Parser, Debug)]
#[command(name = "congress-ingest")]
#[command(about = "Aggregate congressional hearings, records and votes into YAML datasets")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/congress-ingest/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Folder for snapshots and checkpoints
    #[arg(long, global = true, env = "CONGRESS_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a dataset from the upstream APIs
    Fetch {
        #[arg(value_enum)]
        kind: DatasetKind,

        #[command(flatten)]
        args: FetchArgs,
    },

    /// Merge and deduplicate existing snapshots, then print a quality report
    Cleanup {
        #[arg(long, value_enum)]
        kind: DatasetKind,

        /// Snapshot to clean
        #[arg(long)]
        input: PathBuf,

        /// Refetch snapshot merged into the input; its values win on conflicts
        #[arg(long)]
        merge: Option<PathBuf>,

        #[arg(long)]
        output: PathBuf,

        /// Skip deduplication
        #[arg(long)]
        no_dedup: bool,
    },

    /// Save a Congress.gov API key to the config file
    SetKey {
        key: String,
    },
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// Listing fields only, no per-item detail requests
    #[arg(long)]
    fast: bool,

    /// Continue from the checkpoint of an interrupted run
    #[arg(long)]
    resume: bool,

    /// Fetch a single congress
    #[arg(long)]
    congress: Option<u32>,

    /// Keep only the first N items of each partition
    #[arg(long)]
    sample: Option<usize>,

    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long)]
    checkpoint: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // set-key may be creating the config file named by --config
    let toml_config = match &cli.command {
        Command::SetKey { .. } => TomlConfig::default(),
        _ => load_toml_config(cli.config.as_deref()).context("Failed to load configuration")?,
    };

    // RUST_LOG wins over the config file's level
    let level = &toml_config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("congress_ingest={level},congress_common={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Command::Cleanup {
            kind,
            input,
            merge,
            output,
            no_dedup,
        } => {
            let options = CleanupOptions {
                input,
                merge,
                output,
                dedupe: !no_dedup,
            };
            let outcome = match kind {
                DatasetKind::Hearings => run_cleanup::<Hearing>(&options),
                DatasetKind::Records => run_cleanup::<RecordIssue>(&options),
                DatasetKind::Votes => run_cleanup::<Vote>(&options),
            }
            .context("Cleanup failed")?;

            println!("{}", outcome.report);
            println!("Output written to: {}", options.output.display());
        }

        Command::SetKey { key } => {
            let path = cli
                .config
                .or_else(default_config_path)
                .context("No config directory available; pass --config")?;
            save_api_key(&key, &path).context("Failed to save API key")?;
            println!("API key saved to {}", path.display());
        }

        Command::Fetch { kind, args } => {
            let config = IngestConfig::resolve(cli.output_dir.as_deref(), &toml_config);
            let summary = fetch(&config, kind, args).await?;
            if !summary.is_complete() {
                warn!("Snapshot left in progress; rerun with --resume to finish");
            }
        }
    }

    Ok(())
}

async fn fetch(config: &IngestConfig, kind: DatasetKind, args: FetchArgs) -> Result<FetchSummary> {
    let options = config
        .fetch_options(args.congress, args.fast, args.sample)
        .context("Invalid fetch configuration")?;

    let output = config.output_path(args.output.as_deref(), kind.default_output());
    let checkpoint = config.output_path(args.checkpoint.as_deref(), kind.default_checkpoint());

    info!(
        kind = ?kind,
        output = %output.display(),
        checkpoint = %checkpoint.display(),
        mode = if args.fast { "fast" } else { "full" },
        "Starting fetch"
    );

    let context = SnapshotContext {
        date_range: Some(DateRange {
            start: options.start_date.format("%Y-%m-%d").to_string(),
            end: options.end_date.format("%Y-%m-%d").to_string(),
        }),
        congresses: options.congresses.clone(),
        mode: Some(if args.fast { "fast" } else { "full" }.to_string()),
        source: Some(
            match kind {
                DatasetKind::Votes => "Congress.gov API (House), Senate.gov XML (Senate)",
                _ => "Congress.gov API",
            }
            .to_string(),
        ),
        ..Default::default()
    };

    let plan = FetchPlan {
        checkpoint_path: checkpoint,
        resume: args.resume,
        writer: SnapshotWriter::new(output, context),
        snapshot_every: config.fetch.snapshot_every,
    };

    let congress_api = CongressClient::new(
        config.api_key.clone(),
        config.request_spacing(),
        config.retry_policy(),
    )
    .context("Failed to build Congress.gov client")?;

    let cancel = CancellationToken::new();
    spawn_interrupt_listener(cancel.clone());

    match kind {
        DatasetKind::Hearings => {
            drive(&HearingsSource::new(congress_api, options), plan, cancel).await
        }
        DatasetKind::Records => {
            drive(&RecordsSource::new(congress_api, options), plan, cancel).await
        }
        DatasetKind::Votes => {
            let senate = SenateClient::new(config.request_spacing())
                .context("Failed to build Senate.gov client")?;
            drive(&VotesSource::new(congress_api, senate, options), plan, cancel).await
        }
    }
}

async fn drive<S: PartitionSource>(
    source: &S,
    plan: FetchPlan,
    cancel: CancellationToken,
) -> Result<FetchSummary> {
    run_fetch(source, plan, cancel)
        .await
        .with_context(|| format!("Fetch of {} failed", source.name()))
}

/// Cancel the fetch on Ctrl+C; progress is checkpointed before exit
fn spawn_interrupt_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, saving progress...");
                cancel.cancel();
            }
            Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
        }
    });
}
