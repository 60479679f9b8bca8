//! Party-line analysis for roll-call votes
//!
//! Members are bucketed as `D`, `R` or `I`; any other party code counts as
//! independent.

use crate::models::{MemberVote, PartyFlipper, VoteOutcome};
use std::collections::BTreeMap;

/// Display cap for key members
pub const KEY_MEMBER_LIMIT: usize = 5;

/// A normalized ballot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ballot {
    Yea,
    Nay,
    Present,
    NotVoting,
}

impl Ballot {
    pub fn classify(vote: &str) -> Self {
        match vote.trim().to_ascii_lowercase().as_str() {
            "yea" | "aye" | "yes" => Ballot::Yea,
            "nay" | "no" => Ballot::Nay,
            "present" => Ballot::Present,
            _ => Ballot::NotVoting,
        }
    }

    fn label(&self) -> Option<&'static str> {
        match self {
            Ballot::Yea => Some("Yea"),
            Ballot::Nay => Some("Nay"),
            _ => None,
        }
    }
}

/// Per-party ballot counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartyTally {
    pub yea: u32,
    pub nay: u32,
    pub present: u32,
    pub not_voting: u32,
}

impl PartyTally {
    fn add(&mut self, ballot: Ballot) {
        match ballot {
            Ballot::Yea => self.yea += 1,
            Ballot::Nay => self.nay += 1,
            Ballot::Present => self.present += 1,
            Ballot::NotVoting => self.not_voting += 1,
        }
    }

    /// `Yea`/`Nay` majority, `None` on a tie
    fn majority(&self) -> Option<&'static str> {
        if self.yea > self.nay {
            Some("Yea")
        } else if self.nay > self.yea {
            Some("Nay")
        } else {
            None
        }
    }
}

/// Party bucket for a party code
pub fn party_bucket(party: &str) -> &'static str {
    match party.trim() {
        "D" => "D",
        "R" => "R",
        _ => "I",
    }
}

/// Count ballots per party bucket; all three buckets are always present
pub fn tally_by_party(members: &[MemberVote]) -> BTreeMap<&'static str, PartyTally> {
    let mut totals: BTreeMap<&'static str, PartyTally> = ["D", "R", "I"]
        .into_iter()
        .map(|p| (p, PartyTally::default()))
        .collect();

    for member in members {
        totals
            .entry(party_bucket(&member.party))
            .or_default()
            .add(Ballot::classify(&member.vote));
    }
    totals
}

/// Members whose Yea/Nay differs from their party's majority.
///
/// Parties split evenly have no majority and produce no flippers; members
/// who did not cast Yea or Nay are never flippers.
pub fn find_party_flippers(members: &[MemberVote]) -> Vec<PartyFlipper> {
    let totals = tally_by_party(members);

    members
        .iter()
        .filter_map(|member| {
            let party = party_bucket(&member.party);
            let expected = totals.get(party)?.majority()?;
            let cast = Ballot::classify(&member.vote).label()?;
            (cast != expected).then(|| PartyFlipper {
                name: member.name.trim().to_string(),
                party: party.to_string(),
                vote: cast.to_string(),
                party_majority_vote: expected.to_string(),
            })
        })
        .collect()
}

/// Display lines for the first few flippers.
///
/// House lines include the party (`Name (R - voted Yea)`); Senate member
/// names already carry it (`Name (R-WY) (voted Yea)`).
pub fn key_members(flippers: &[PartyFlipper], with_party: bool) -> Vec<String> {
    flippers
        .iter()
        .take(KEY_MEMBER_LIMIT)
        .map(|f| {
            if with_party {
                format!("{} ({} - voted {})", f.name, f.party, f.vote)
            } else {
                format!("{} (voted {})", f.name, f.vote)
            }
        })
        .collect()
}

/// Fill the per-party fields of an outcome from member ballots
pub fn apply_party_tally(outcome: &mut VoteOutcome, members: &[MemberVote]) {
    let totals = tally_by_party(members);
    let get = |p: &str| totals.get(p).copied().unwrap_or_default();

    let (d, r, i) = (get("D"), get("R"), get("I"));
    outcome.democrat_yea = d.yea;
    outcome.democrat_nay = d.nay;
    outcome.republican_yea = r.yea;
    outcome.republican_nay = r.nay;
    outcome.independent_yea = i.yea;
    outcome.independent_nay = i.nay;
}
