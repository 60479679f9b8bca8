//! Checkpointed incremental fetch
//!
//! A fetch walks a source's partitions in order. Each partition streams its
//! records into a shared [`Accumulator`]; once a partition finishes, the
//! accumulator deduplicates, saves the checkpoint and rewrites the
//! `in_progress` snapshot. Only a run in which every partition completed
//! writes a `complete` snapshot and deletes the checkpoint.
//!
//! # Failure handling
//! - A partition that fails is logged and left uncompleted; the run goes on
//!   with the next partition and a later `--resume` retries it
//! - Cancellation saves progress once and stops
//! - Records a failed partition delivered before failing are kept; a retry
//!   merges with them through the deduplicator
//!
//! Sources:
//! - **hearings** - committee meetings per (congress, chamber)
//! - **records** - daily record issues per congress
//! - **votes** - House roll calls per congress, Senate per (congress, session)

pub mod accumulator;
pub mod hearings;
pub mod records;
pub mod votes;

pub use accumulator::{Accumulated, Accumulator};
pub use hearings::HearingsSource;
pub use records::RecordsSource;
pub use votes::VotesSource;

use crate::storage::{Checkpoint, CheckpointStore, SnapshotWriter};
use crate::types::{Entity, Partition};
use async_trait::async_trait;
use chrono::NaiveDate;
use congress_common::time::{in_date_range, years_between};
use congress_common::Result;
use std::fmt;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Receives normalized records as a source produces them
#[async_trait]
pub trait RecordSink<E: Entity>: Send + Sync {
    async fn absorb(&self, record: E);
}

/// A partitioned upstream dataset
#[async_trait]
pub trait PartitionSource: Send + Sync {
    type Entity: Entity;
    type Partition: Partition;

    /// Dataset label used in logs and snapshot metadata
    fn name(&self) -> &'static str;

    /// All partitions of the run, in fetch order
    fn partitions(&self) -> Vec<Self::Partition>;

    /// Fetch one partition, pushing records into `sink`.
    ///
    /// Item-level failures are logged and skipped inside the source. An
    /// `Err` means the partition as a whole could not be listed and must not
    /// be marked completed.
    async fn fetch_partition(
        &self,
        partition: &Self::Partition,
        sink: &dyn RecordSink<Self::Entity>,
    ) -> Result<()>;
}

/// Where a fetch keeps its state
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub checkpoint_path: PathBuf,
    pub resume: bool,
    pub writer: SnapshotWriter,
    /// Records between in-partition snapshots; zero disables them
    pub snapshot_every: usize,
}

/// Counts from a finished (or interrupted) fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub source: &'static str,
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub records: usize,
    pub duplicates: usize,
    pub interrupted: bool,
}

impl FetchSummary {
    /// True when the snapshot was written as `complete`
    pub fn is_complete(&self) -> bool {
        !self.interrupted && self.failed == 0
    }
}

impl fmt::Display for FetchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} records ({} duplicates merged), partitions {} fetched / {} resumed / {} failed",
            self.source, self.records, self.duplicates, self.completed, self.skipped, self.failed
        )?;
        if self.interrupted {
            write!(f, ", interrupted")?;
        }
        Ok(())
    }
}

/// Run a checkpointed fetch of every partition of `source`.
///
/// **Algorithm:**
/// 1. With `resume`, seed from the checkpoint and skip its completed
///    partitions; otherwise start empty
/// 2. Fetch each remaining partition, racing against `cancel`
/// 3. After each success: dedupe, save checkpoint, write `in_progress`
/// 4. Clean run: write `complete` and delete the checkpoint; else save
///    progress and keep the snapshot `in_progress`
pub async fn run_fetch<S: PartitionSource>(
    source: &S,
    plan: FetchPlan,
    cancel: CancellationToken,
) -> Result<FetchSummary> {
    let store = CheckpointStore::new(plan.checkpoint_path);

    let seed: Checkpoint<S::Entity, S::Partition> = if plan.resume {
        let seed = store.load()?;
        if !seed.completed.is_empty() {
            info!(
                source = source.name(),
                records = seed.entities.len(),
                completed = seed.completed.len(),
                "Resuming from checkpoint"
            );
        }
        seed
    } else {
        if store.exists() {
            warn!(
                path = %store.path().display(),
                "Checkpoint from an earlier run found; starting fresh (use --resume to continue it)"
            );
        }
        Checkpoint::empty()
    };

    let accumulator = Accumulator::new(seed, store, plan.writer, plan.snapshot_every);
    let mut summary = FetchSummary {
        source: source.name(),
        ..Default::default()
    };

    for partition in source.partitions() {
        if accumulator.is_completed(&partition).await {
            info!(partition = %partition, "Already completed, skipping");
            summary.skipped += 1;
            continue;
        }
        if cancel.is_cancelled() {
            summary.interrupted = true;
            break;
        }

        info!(partition = %partition, "Fetching partition");
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = source.fetch_partition(&partition, &accumulator) => Some(result),
        };

        match outcome {
            None => {
                warn!(partition = %partition, "Fetch cancelled; saving progress");
                summary.interrupted = true;
                break;
            }
            Some(Ok(())) => {
                accumulator.complete_partition(partition.clone()).await;
                summary.completed += 1;
                info!(
                    partition = %partition,
                    total = accumulator.len().await,
                    "Partition complete"
                );
            }
            Some(Err(e)) => {
                error!(partition = %partition, error = %e, "Partition failed; will retry on resume");
                summary.failed += 1;
                accumulator.flush().await;
            }
        }
    }

    let done = accumulator.finish(summary.is_complete()).await?;
    summary.records = done.records.len();
    summary.duplicates = done.duplicates;

    info!("{}", summary);
    Ok(summary)
}

/// Date-range and sampling options shared by every source
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions {
    pub congresses: Vec<u32>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Skip per-item detail requests
    pub fast: bool,
    /// Keep only the first N listed items per partition
    pub sample: Option<usize>,
    pub workers: usize,
}

impl FetchOptions {
    pub fn new(congresses: Vec<u32>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            congresses,
            start_date,
            end_date,
            fast: false,
            sample: None,
            workers: 4,
        }
    }

    pub fn in_range(&self, date: Option<&str>) -> bool {
        in_date_range(date, self.start_date, self.end_date)
    }

    /// Truncate a listing to the sample size
    pub fn sampled<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if let Some(n) = self.sample {
            items.truncate(n);
        }
        items
    }

    pub fn workers(&self) -> usize {
        self.workers.max(1)
    }

    /// Calendar years of the date window
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        years_between(self.start_date, self.end_date)
    }
}
