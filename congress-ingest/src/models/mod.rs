//! Record models for the congressional datasets
//!
//! Each dataset is a fixed, explicit field set. Unknown fields in input
//! snapshots are ignored at the boundary rather than carried through.

pub mod common;
pub mod de;
pub mod hearing;
pub mod record_issue;
pub mod snapshot;
pub mod vote;

pub use common::{Person, SourceLink};
pub use hearing::Hearing;
pub use record_issue::{Article, ArticleSummary, RecordIssue, Section};
pub use snapshot::{
    ApiChamber, ChamberPartition, DateRange, SnapshotMetadata, SnapshotStatus, VotePartition,
};
pub use vote::{MemberVote, PartyFlipper, Vote, VoteOutcome};

/// Dataset selector for the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DatasetKind {
    Hearings,
    Records,
    Votes,
}

impl DatasetKind {
    /// Default snapshot file name
    pub fn default_output(&self) -> &'static str {
        match self {
            DatasetKind::Hearings => "congressional_hearings_2020_2026.yaml",
            DatasetKind::Records => "congressional_records_2020_2026.yaml",
            DatasetKind::Votes => "congressional_votes_2020_2026.yaml",
        }
    }

    /// Default checkpoint file name
    pub fn default_checkpoint(&self) -> &'static str {
        match self {
            DatasetKind::Hearings => "hearings_checkpoint.json",
            DatasetKind::Records => "records_checkpoint.json",
            DatasetKind::Votes => "votes_checkpoint.json",
        }
    }
}
