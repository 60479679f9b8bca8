//! Durable state: checkpoints and snapshots

pub mod checkpoint;
pub mod snapshot;

pub use checkpoint::{Checkpoint, CheckpointStore};
pub use snapshot::{
    read_snapshot, read_snapshot_with_coverage, sort_by_date_desc, SnapshotContext,
    SnapshotCoverage, SnapshotWriter,
};
