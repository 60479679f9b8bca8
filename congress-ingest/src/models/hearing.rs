//! Congressional hearing record

use super::common::{Person, SourceLink};
use super::de::{opt_flex_string, opt_flex_u32};
use crate::services::record_merger::{merge_list, merge_scalar};
use crate::types::Entity;
use crate::validators::completeness_scorer::{FieldCounter, Presence};
use serde::{Deserialize, Serialize};

/// A committee hearing, markup or meeting
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hearing {
    #[serde(default)]
    pub title: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "opt_flex_u32")]
    pub congress: Option<u32>,
    /// `House`, `Senate`, `Joint`
    #[serde(default)]
    pub chamber: Option<String>,
    /// `Hearing`, `Markup`, `Meeting`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub hearing_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcommittee: Option<String>,
    /// `Scheduled`, `Completed`, `Canceled`, `Postponed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<SourceLink>>,
    #[serde(default)]
    pub members: Option<Vec<Person>>,
    #[serde(default)]
    pub witnesses: Option<Vec<Person>>,
    #[serde(default)]
    pub related_bills: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "opt_flex_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub jacket_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_flex_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub event_id: Option<String>,
}

/// (title, date, congress, chamber, committee-or-subcommittee)
pub type HearingKey = (String, String, u32, String, String);

fn key_part(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

impl Entity for Hearing {
    type Key = HearingKey;

    const COLLECTION: &'static str = "hearings";
    const LABEL: &'static str = "hearing";

    fn identity_key(&self) -> HearingKey {
        let committee = if self.committee.is_present() {
            &self.committee
        } else {
            &self.subcommittee
        };

        (
            key_part(&self.title),
            key_part(&self.date),
            self.congress.unwrap_or(0),
            key_part(&self.chamber).to_lowercase(),
            key_part(committee),
        )
    }

    fn completeness(&self) -> u32 {
        FieldCounter::new()
            .field(&self.title)
            .field(&self.date)
            .field(&self.end_date)
            .field(&self.congress)
            .field(&self.chamber)
            .field(&self.hearing_type)
            .field(&self.committee)
            .field(&self.subcommittee)
            .field(&self.status)
            .field(&self.location)
            .field(&self.sources)
            .field(&self.members)
            .field(&self.witnesses)
            .field(&self.related_bills)
            .field(&self.jacket_number)
            .field(&self.event_id)
            .finish()
    }

    fn merge(&self, secondary: &Self) -> Self {
        let Hearing {
            title,
            date,
            end_date,
            congress,
            chamber,
            hearing_type,
            committee,
            subcommittee,
            status,
            location,
            sources,
            members,
            witnesses,
            related_bills,
            jacket_number,
            event_id,
        } = secondary.clone();

        let mut merged = self.clone();
        merge_scalar(&mut merged.title, title);
        merge_scalar(&mut merged.date, date);
        merge_scalar(&mut merged.end_date, end_date);
        merge_scalar(&mut merged.congress, congress);
        merge_scalar(&mut merged.chamber, chamber);
        merge_scalar(&mut merged.hearing_type, hearing_type);
        merge_scalar(&mut merged.committee, committee);
        merge_scalar(&mut merged.subcommittee, subcommittee);
        merge_scalar(&mut merged.status, status);
        merge_scalar(&mut merged.location, location);
        merge_list(&mut merged.sources, sources);
        merge_list(&mut merged.members, members);
        merge_list(&mut merged.witnesses, witnesses);
        merge_list(&mut merged.related_bills, related_bills);
        merge_scalar(&mut merged.jacket_number, jacket_number);
        merge_scalar(&mut merged.event_id, event_id);
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
            ("witnesses", self.witnesses.is_present()),
            ("members", self.members.is_present()),
            ("sources", self.sources.is_present()),
            ("related bills", self.related_bills.is_present()),
            ("location", self.location.is_present()),
        ]
    }

    fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.date.is_present() {
            missing.push("date");
        }
        if !self.title.is_present() {
            missing.push("title");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget_hearing() -> Hearing {
        Hearing {
            title: Some("Budget Hearing".to_string()),
            date: Some("2022-03-01".to_string()),
            congress: Some(117),
            chamber: Some("Senate".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_key_ignores_null_vs_blank_and_case() {
        let a = budget_hearing();
        let mut b = budget_hearing();
        b.chamber = Some(" senate ".to_string());
        b.committee = Some(String::new());

        assert_eq!(a.identity_key(), b.identity_key());
    }

    #[test]
    fn test_key_falls_back_to_subcommittee() {
        let mut h = budget_hearing();
        h.subcommittee = Some("Subcommittee on Energy".to_string());
        assert_eq!(h.identity_key().4, "Subcommittee on Energy");

        h.committee = Some("Appropriations".to_string());
        assert_eq!(h.identity_key().4, "Appropriations");
    }

    #[test]
    fn test_key_of_empty_hearing_is_defaulted() {
        let key = Hearing::default().identity_key();
        assert_eq!(
            key,
            (String::new(), String::new(), 0, String::new(), String::new())
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut h = budget_hearing();
        h.witnesses = Some(vec![Person::named("A")]);
        h.location = Some("SD-608".to_string());
        assert_eq!(h.merge(&h), h);
    }

    #[test]
    fn test_coverage_headline_is_witnesses() {
        let mut h = budget_hearing();
        h.witnesses = Some(vec![Person::named("A")]);
        assert_eq!(h.coverage()[0], ("witnesses", true));
        assert!(h.missing_required().is_empty());
        assert_eq!(Hearing::default().missing_required(), vec!["date", "title"]);
    }

    #[test]
    fn test_yaml_uses_type_key_and_reads_numeric_event_id() {
        let h: Hearing = serde_yaml::from_str(
            "title: Markup\ndate: '2023-05-01'\ncongress: 118\nchamber: House\ntype: Markup\nevent_id: 115538\nwitnesses: null\n",
        )
        .unwrap();
        assert_eq!(h.hearing_type.as_deref(), Some("Markup"));
        assert_eq!(h.event_id.as_deref(), Some("115538"));
        assert_eq!(h.witnesses, None);

        let out = serde_yaml::to_string(&h).unwrap();
        assert!(out.contains("type: Markup"));
    }
}
