//! Checkpoint store for resumable fetches
//!
//! A checkpoint holds every record accumulated so far plus the partitions
//! whose fetch fully completed. It is overwritten after each partition and
//! deleted only once the final complete snapshot is written, so its presence
//! on disk means the last run was interrupted.
//!
//! File format (JSON):
//! ```json
//! { "entities": [...], "completed": [...], "timestamp": "...", "run_id": "..." }
//! ```

use crate::types::{Entity, Partition};
use chrono::{DateTime, Utc};
use congress_common::{fs::write_atomic, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Loaded checkpoint contents
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "E: Entity, P: Partition"))]
pub struct Checkpoint<E, P> {
    #[serde(default)]
    pub entities: Vec<E>,
    #[serde(default)]
    pub completed: Vec<P>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub run_id: Option<Uuid>,
}

impl<E, P> Checkpoint<E, P> {
    /// Starting state for a fresh run
    pub fn empty() -> Self {
        Self {
            entities: Vec::new(),
            completed: Vec::new(),
            timestamp: None,
            run_id: None,
        }
    }
}

#[derive(Serialize)]
struct CheckpointRef<'a, E, P> {
    entities: &'a [E],
    completed: &'a [P],
    timestamp: DateTime<Utc>,
    run_id: Uuid,
}

/// Durable fetch progress at a fixed path
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
    run_id: Uuid,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            run_id: Uuid::new_v4(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identifier of the run writing this checkpoint
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Overwrite the checkpoint with the full accumulated state
    pub fn save<E: Entity, P: Partition>(&self, entities: &[E], completed: &[P]) -> Result<()> {
        let doc = CheckpointRef {
            entities,
            completed,
            timestamp: congress_common::time::now(),
            run_id: self.run_id,
        };
        let bytes = serde_json::to_vec(&doc)?;
        write_atomic(&self.path, &bytes)?;

        debug!(
            path = %self.path.display(),
            records = entities.len(),
            completed = completed.len(),
            "Checkpoint saved"
        );
        Ok(())
    }

    /// Load saved progress; a missing checkpoint yields empty state.
    ///
    /// An unreadable or corrupt checkpoint is a malformed-input error so a
    /// resume never silently restarts from scratch.
    pub fn load<E: Entity, P: Partition>(&self) -> Result<Checkpoint<E, P>> {
        if !self.path.exists() {
            return Ok(Checkpoint::empty());
        }

        let content = std::fs::read(&self.path)?;
        let checkpoint: Checkpoint<E, P> = serde_json::from_slice(&content).map_err(|e| {
            Error::MalformedInput(format!(
                "Corrupt checkpoint {}: {}",
                self.path.display(),
                e
            ))
        })?;

        info!(
            path = %self.path.display(),
            records = checkpoint.entities.len(),
            completed = checkpoint.completed.len(),
            previous_run = ?checkpoint.run_id,
            "Loaded checkpoint"
        );
        Ok(checkpoint)
    }

    /// Delete the checkpoint (no-op when absent)
    pub fn discard(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Checkpoint removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
