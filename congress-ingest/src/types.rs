//! Core trait definitions shared by the merge engine and the fetch pipelines
//!
//! Every dataset (hearings, record issues, votes) is a fixed record type
//! implementing [`Entity`]. The deduplicator, checkpoint store, snapshot
//! writer and quality report are generic over this trait, so each pipeline
//! only supplies its record shape and identity rule.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

// ============================================================================
// Entity
// ============================================================================

/// A deduplicable congressional record
///
/// # Contract
/// - `identity_key` is pure and total: missing components collapse to a
///   default (empty string, zero) instead of failing.
/// - `completeness` counts meaningfully populated fields; it is only used to
///   rank two candidates for the same key.
/// - `merge(primary, secondary)` keeps primary's populated scalars, fills
///   absent ones from secondary, and keeps the strictly longer list. It is
///   not commutative and `a.merge(&a) == a`.
pub trait Entity:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Identity tuple; equal keys denote the same real-world occurrence
    type Key: Eq + Hash + Clone + Debug + Send + Sync;

    /// Top-level list name in snapshots (`hearings`, `records`, `votes`)
    const COLLECTION: &'static str;

    /// Singular label for logs and reports
    const LABEL: &'static str;

    fn identity_key(&self) -> Self::Key;

    fn completeness(&self) -> u32;

    fn merge(&self, secondary: &Self) -> Self;

    /// Date used for snapshot ordering, `YYYY-MM-DD` when well-formed
    fn date(&self) -> Option<&str>;

    fn congress(&self) -> Option<u32>;

    /// Coverage categories for the quality report.
    ///
    /// The first entry is the headline category tallied per congress and
    /// per year.
    fn coverage(&self) -> Vec<(&'static str, bool)>;

    /// Identifying fields this record lacks (reported as warnings)
    fn missing_required(&self) -> Vec<&'static str>;

    /// Dataset-specific metadata entries added to every snapshot
    fn metadata_extras(_records: &[Self]) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::new()
    }
}

// ============================================================================
// Partition
// ============================================================================

/// Unit of fetch progress recorded in checkpoints
///
/// A partition is marked completed only after all its records were absorbed;
/// resume skips completed partitions.
pub trait Partition:
    Clone + Eq + Hash + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> Partition for T where
    T: Clone + Eq + Hash + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
}
