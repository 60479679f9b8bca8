//! Merge engine and record analysis services
//!
//! - **record_merger** - field-level merge helpers
//! - **deduplicator** - identity-key dedup and cross-snapshot merge
//! - **party_votes** - party breakdown and party-line flippers

pub mod deduplicator;
pub mod party_votes;
pub mod record_merger;

pub use deduplicator::{
    dedupe, merge_by_completeness, merge_prefer_refetch, merge_snapshots, CrossMergeOutcome,
    DedupOutcome,
};
