//! Deduplication and cross-snapshot merging
//!
//! Two merge conventions share the same field-level merger but choose
//! argument order differently:
//!
//! - **Intra-batch dedup** ([`dedupe`]): the candidate with the higher
//!   completeness score is primary, so the richer record's scalars win and
//!   the poorer one only fills gaps.
//! - **Cross-file merge** ([`merge_snapshots`]): the refetch (secondary file)
//!   record is primary, so a fresher fetch's scalars take priority over the
//!   original snapshot.
//!
//! These are kept separate on purpose; folding them into one rule would
//! change output on real data.

use crate::types::Entity;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Result of [`dedupe`]
#[derive(Debug, Clone, PartialEq)]
pub struct DedupOutcome<E> {
    /// One record per identity key, in first-occurrence order
    pub records: Vec<E>,
    /// Input records folded into an earlier occurrence
    pub duplicates: usize,
}

/// Result of [`merge_snapshots`]
#[derive(Debug, Clone, PartialEq)]
pub struct CrossMergeOutcome<E> {
    /// Primary records (merged where matched) followed by secondary-only records
    pub records: Vec<E>,
    /// Primary records that had a matching secondary record
    pub updated_from_secondary: usize,
    /// Secondary records with no primary match, appended unmerged
    pub new_from_secondary: usize,
}

/// Intra-batch convention: higher completeness is primary.
///
/// Ties keep the already-stored record as primary.
pub fn merge_by_completeness<E: Entity>(stored: &E, incoming: &E) -> E {
    if incoming.completeness() > stored.completeness() {
        incoming.merge(stored)
    } else {
        stored.merge(incoming)
    }
}

/// Cross-file convention: the refetched record is primary.
pub fn merge_prefer_refetch<E: Entity>(original: &E, refetch: &E) -> E {
    refetch.merge(original)
}

/// Collapse records sharing an identity key.
///
/// **Algorithm:**
/// 1. Walk the input once, keeping a key → slot index
/// 2. Unseen key: append the record and remember its slot
/// 3. Seen key: replace the slot with [`merge_by_completeness`] and count a
///    duplicate
///
/// Single pass with no look-ahead; a merged record can win later comparisons
/// because merging raises its completeness.
pub fn dedupe<E: Entity>(records: Vec<E>) -> DedupOutcome<E> {
    let mut index: HashMap<E::Key, usize> = HashMap::with_capacity(records.len());
    let mut unique: Vec<E> = Vec::with_capacity(records.len());
    let mut duplicates = 0;

    for record in records {
        let key = record.identity_key();
        match index.get(&key) {
            Some(&slot) => {
                let merged = merge_by_completeness(&unique[slot], &record);
                unique[slot] = merged;
                duplicates += 1;
            }
            None => {
                index.insert(key, unique.len());
                unique.push(record);
            }
        }
    }

    if duplicates > 0 {
        debug!(
            kind = E::LABEL,
            duplicates,
            remaining = unique.len(),
            "Collapsed duplicate records"
        );
    }

    DedupOutcome {
        records: unique,
        duplicates,
    }
}

/// Merge a refetch snapshot into an original snapshot.
///
/// **Algorithm:**
/// 1. Index secondary records by identity key (a later duplicate in the
///    secondary replaces an earlier one)
/// 2. Each primary record with a match becomes
///    [`merge_prefer_refetch`]`(primary, secondary)`
/// 3. Every secondary record whose key does not occur in `primary` is
///    appended unmerged, in its original order
///
/// Duplicates inside `primary` all merge against the same secondary record,
/// and duplicate secondary-only records are all appended; run [`dedupe`]
/// afterwards to collapse them.
pub fn merge_snapshots<E: Entity>(primary: Vec<E>, secondary: Vec<E>) -> CrossMergeOutcome<E> {
    let mut lookup: HashMap<E::Key, usize> = HashMap::with_capacity(secondary.len());
    for (i, record) in secondary.iter().enumerate() {
        lookup.insert(record.identity_key(), i);
    }

    let mut primary_keys: HashSet<E::Key> = HashSet::with_capacity(primary.len());
    let mut updated_from_secondary = 0;
    let mut records = Vec::with_capacity(primary.len() + secondary.len());

    for record in primary {
        let key = record.identity_key();
        match lookup.get(&key) {
            Some(&i) => {
                updated_from_secondary += 1;
                records.push(merge_prefer_refetch(&record, &secondary[i]));
            }
            None => records.push(record),
        }
        primary_keys.insert(key);
    }

    let mut new_from_secondary = 0;
    for record in secondary {
        if primary_keys.contains(&record.identity_key()) {
            continue;
        }
        new_from_secondary += 1;
        records.push(record);
    }

    debug!(
        kind = E::LABEL,
        updated_from_secondary, new_from_secondary, "Merged refetch snapshot"
    );

    CrossMergeOutcome {
        records,
        updated_from_secondary,
        new_from_secondary,
    }
}
