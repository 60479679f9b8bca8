//! Shared fetch state
//!
//! Holds every record absorbed so far together with the completed
//! partitions. All mutation happens under one lock, so a checkpoint save or
//! snapshot write always sees a consistent pair of (records, completed).

use super::RecordSink;
use crate::services::dedupe;
use crate::storage::{Checkpoint, CheckpointStore, SnapshotWriter};
use crate::types::{Entity, Partition};
use async_trait::async_trait;
use congress_common::{Error, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

struct State<E, P> {
    records: Vec<E>,
    completed: Vec<P>,
    duplicates: usize,
    since_snapshot: usize,
}

impl<E: Entity, P: Partition> State<E, P> {
    fn compact(&mut self) {
        let outcome = dedupe(std::mem::take(&mut self.records));
        self.records = outcome.records;
        self.duplicates += outcome.duplicates;
    }

    fn partition_labels(&self) -> Vec<String> {
        self.completed.iter().map(ToString::to_string).collect()
    }
}

/// Records produced by a finished accumulator
#[derive(Debug, Clone)]
pub struct Accumulated<E> {
    pub records: Vec<E>,
    pub duplicates: usize,
}

/// Deduplicating record store backed by a checkpoint and a snapshot
pub struct Accumulator<E, P> {
    state: Mutex<State<E, P>>,
    checkpoint: CheckpointStore,
    writer: SnapshotWriter,
    snapshot_every: usize,
}

impl<E: Entity, P: Partition> Accumulator<E, P> {
    /// Seed from a loaded (or empty) checkpoint
    pub fn new(
        seed: Checkpoint<E, P>,
        checkpoint: CheckpointStore,
        writer: SnapshotWriter,
        snapshot_every: usize,
    ) -> Self {
        Self {
            state: Mutex::new(State {
                records: seed.entities,
                completed: seed.completed,
                duplicates: 0,
                since_snapshot: 0,
            }),
            checkpoint,
            writer,
            snapshot_every,
        }
    }

    pub async fn is_completed(&self, partition: &P) -> bool {
        self.state.lock().await.completed.contains(partition)
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    /// Mark a partition finished, then persist checkpoint and snapshot
    pub async fn complete_partition(&self, partition: P) {
        let mut state = self.state.lock().await;
        if !state.completed.contains(&partition) {
            state.completed.push(partition);
        }
        self.persist(&mut state).await;
    }

    /// Persist current progress without completing a partition
    pub async fn flush(&self) {
        let mut state = self.state.lock().await;
        self.persist(&mut state).await;
    }

    /// Terminal write.
    ///
    /// A clean run writes a `complete` snapshot and then deletes the
    /// checkpoint. Otherwise progress is saved and the snapshot stays
    /// `in_progress`, so the next run can resume.
    pub async fn finish(self, clean: bool) -> Result<Accumulated<E>> {
        let mut state = self.state.into_inner();
        state.compact();
        let partitions = state.partition_labels();
        let State {
            records,
            completed,
            duplicates,
            ..
        } = state;
        let checkpoint = self.checkpoint;
        let writer = self.writer;

        let records = off_runtime(move || {
            if clean {
                writer.write(&records, &partitions, true)?;
                checkpoint.discard()?;
            } else {
                if let Err(e) = checkpoint.save(&records, &completed) {
                    warn!(error = %e, "Failed to save checkpoint");
                }
                writer.write(&records, &partitions, false)?;
            }
            Ok(records)
        })
        .await?;

        Ok(Accumulated {
            records,
            duplicates,
        })
    }

    /// Save the checkpoint and rewrite the `in_progress` snapshot.
    ///
    /// Failures are logged and the in-memory state is kept; the next
    /// partition retries both writes.
    async fn persist(&self, state: &mut State<E, P>) {
        state.compact();
        state.since_snapshot = 0;

        let checkpoint = self.checkpoint.clone();
        let writer = self.writer.clone();
        let records = state.records.clone();
        let completed = state.completed.clone();
        let partitions = state.partition_labels();

        let outcome = off_runtime(move || {
            let saved = checkpoint.save(&records, &completed);
            let written = writer.write(&records, &partitions, false);
            Ok((saved, written))
        })
        .await;

        let (saved, written) = match outcome {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "Progress write task failed");
                return;
            }
        };

        match saved {
            Ok(()) => debug!(
                records = state.records.len(),
                completed = state.completed.len(),
                "Checkpoint saved"
            ),
            Err(e) => warn!(error = %e, "Failed to save checkpoint; will retry at next partition"),
        }
        if let Err(e) = written {
            warn!(error = %e, "Failed to write progress snapshot");
        }
    }
}

/// Run serialization and file replacement on the blocking pool
async fn off_runtime<T, F>(job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|e| Error::Internal(format!("Write task failed: {}", e)))?
}

#[async_trait]
impl<E: Entity, P: Partition> RecordSink<E> for Accumulator<E, P> {
    async fn absorb(&self, record: E) {
        let mut state = self.state.lock().await;
        state.records.push(record);
        state.since_snapshot += 1;

        if self.snapshot_every > 0 && state.since_snapshot >= self.snapshot_every {
            state.since_snapshot = 0;
            state.compact();

            let writer = self.writer.clone();
            let records = state.records.clone();
            let partitions = state.partition_labels();
            let total = records.len();
            match off_runtime(move || writer.write(&records, &partitions, false)).await {
                Ok(()) => info!(kind = E::LABEL, total, "Progress snapshot written"),
                Err(e) => warn!(error = %e, "Failed to write progress snapshot"),
            }
        }
    }
}
