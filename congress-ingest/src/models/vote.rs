//! Roll-call vote record

use super::common::SourceLink;
use super::de::opt_flex_u32;
use crate::services::record_merger::{merge_list, merge_scalar};
use crate::types::Entity;
use crate::validators::completeness_scorer::{FieldCounter, Presence};
use serde::{Deserialize, Serialize};

/// A House or Senate roll-call vote
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    /// `{congress}-{house|senate}-{session}-{roll}`
    #[serde(default)]
    pub vote_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// `House` or `Senate`
    #[serde(default)]
    pub chamber: Option<String>,
    #[serde(default, deserialize_with = "opt_flex_u32")]
    pub congress: Option<u32>,
    #[serde(default, deserialize_with = "opt_flex_u32")]
    pub session: Option<u32>,
    #[serde(default, deserialize_with = "opt_flex_u32")]
    pub roll_call_number: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub vote_type: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub bill_number: Option<String>,
    #[serde(default)]
    pub bill_title: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<SourceLink>>,
    /// Up to five party flippers, pre-formatted for display
    #[serde(default)]
    pub key_members: Option<Vec<String>>,
    #[serde(default)]
    pub outcome: Option<VoteOutcome>,
    #[serde(default)]
    pub party_flippers: Option<Vec<PartyFlipper>>,
}

/// Tally of a vote, overall and by party
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteOutcome {
    pub result: String,
    pub yea_total: u32,
    pub nay_total: u32,
    pub present: u32,
    pub not_voting: u32,
    pub democrat_yea: u32,
    pub democrat_nay: u32,
    pub republican_yea: u32,
    pub republican_nay: u32,
    pub independent_yea: u32,
    pub independent_nay: u32,
}

impl Presence for VoteOutcome {
    fn is_present(&self) -> bool {
        true
    }
}

/// A member who voted against their party's majority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyFlipper {
    pub name: String,
    /// Party bucket: `D`, `R` or `I`
    pub party: String,
    /// `Yea` or `Nay`
    pub vote: String,
    pub party_majority_vote: String,
}

/// One member's ballot, as read from an upstream roll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberVote {
    pub name: String,
    pub party: String,
    pub state: String,
    pub vote: String,
}

/// (congress, chamber, session, roll number)
pub type VoteKey = (u32, String, u32, u32);

impl Entity for Vote {
    type Key = VoteKey;

    const COLLECTION: &'static str = "votes";
    const LABEL: &'static str = "vote";

    fn identity_key(&self) -> VoteKey {
        (
            self.congress.unwrap_or(0),
            self.chamber
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_lowercase(),
            self.session.unwrap_or(0),
            self.roll_call_number.unwrap_or(0),
        )
    }

    fn completeness(&self) -> u32 {
        FieldCounter::new()
            .field(&self.vote_id)
            .field(&self.title)
            .field(&self.chamber)
            .field(&self.congress)
            .field(&self.session)
            .field(&self.roll_call_number)
            .field(&self.date)
            .field(&self.question)
            .field(&self.vote_type)
            .field(&self.result)
            .field(&self.bill_number)
            .field(&self.bill_title)
            .field(&self.sources)
            .field(&self.key_members)
            .field(&self.outcome)
            .field(&self.party_flippers)
            .finish()
    }

    fn merge(&self, secondary: &Self) -> Self {
        let Vote {
            vote_id,
            title,
            chamber,
            congress,
            session,
            roll_call_number,
            date,
            question,
            vote_type,
            result,
            bill_number,
            bill_title,
            sources,
            key_members,
            outcome,
            party_flippers,
        } = secondary.clone();

        let mut merged = self.clone();
        merge_scalar(&mut merged.vote_id, vote_id);
        merge_scalar(&mut merged.title, title);
        merge_scalar(&mut merged.chamber, chamber);
        merge_scalar(&mut merged.congress, congress);
        merge_scalar(&mut merged.session, session);
        merge_scalar(&mut merged.roll_call_number, roll_call_number);
        merge_scalar(&mut merged.date, date);
        merge_scalar(&mut merged.question, question);
        merge_scalar(&mut merged.vote_type, vote_type);
        merge_scalar(&mut merged.result, result);
        merge_scalar(&mut merged.bill_number, bill_number);
        merge_scalar(&mut merged.bill_title, bill_title);
        merge_list(&mut merged.sources, sources);
        merge_list(&mut merged.key_members, key_members);
        merge_scalar(&mut merged.outcome, outcome);
        merge_list(&mut merged.party_flippers, party_flippers);
        merged
    }

    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    fn congress(&self) -> Option<u32> {
        self.congress
    }

    fn coverage(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("party flippers", self.party_flippers.is_present()),
            ("sources", self.sources.is_present()),
            ("bill number", self.bill_number.is_present()),
            ("outcome", self.outcome.is_present()),
        ]
    }

    fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.date.is_present() {
            missing.push("date");
        }
        if !self.chamber.is_present() {
            missing.push("chamber");
        }
        if self.roll_call_number.is_none() {
            missing.push("roll_call_number");
        }
        missing
    }

    fn metadata_extras(records: &[Self]) -> serde_json::Map<String, serde_json::Value> {
        let count = |name: &str| {
            records
                .iter()
                .filter(|v| {
                    v.chamber
                        .as_deref()
                        .map_or(false, |c| c.eq_ignore_ascii_case(name))
                })
                .count()
        };

        let mut extras = serde_json::Map::new();
        extras.insert("house_votes".to_string(), count("house").into());
        extras.insert("senate_votes".to_string(), count("senate").into());
        extras
    }
}
