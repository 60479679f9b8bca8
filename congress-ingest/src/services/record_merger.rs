//! Field-level record merging
//!
//! Combines two records believed to represent the same entity. Each record
//! type implements [`Entity::merge`](crate::types::Entity::merge) by folding
//! every field of the secondary into a copy of the primary with the two
//! helpers below.
//!
//! Merge strategy:
//! - Scalars: primary's populated value is kept; an absent, null or blank
//!   primary value is filled from secondary.
//! - Lists: an absent primary list takes secondary's; otherwise the strictly
//!   longer list wins and ties keep primary's.

use crate::validators::completeness_scorer::Presence;

/// Fill `slot` from `incoming` when `slot` carries no information.
///
/// Returns `true` when the secondary value was taken.
pub fn merge_scalar<T: Presence>(slot: &mut Option<T>, incoming: Option<T>) -> bool {
    let take = match (slot.as_ref(), incoming.as_ref()) {
        (None, Some(_)) => true,
        (Some(current), Some(new)) => !current.is_present() && new.is_present(),
        _ => false,
    };

    if take {
        *slot = incoming;
    }
    take
}

/// Replace `slot` with `incoming` when absent or strictly shorter.
///
/// Returns `true` when the secondary list was taken.
pub fn merge_list<T>(slot: &mut Option<Vec<T>>, incoming: Option<Vec<T>>) -> bool {
    let take = match (slot.as_ref(), incoming.as_ref()) {
        (None, Some(_)) => true,
        (Some(current), Some(new)) => new.len() > current.len(),
        _ => false,
    };

    if take {
        *slot = incoming;
    }
    take
}
