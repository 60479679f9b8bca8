//! Congress.gov JSON payload shapes
//!
//! Only the fields the normalizers read are modeled. Everything is optional
//! and `null`-tolerant; the API omits fields freely between endpoints.

use crate::models::de::{default_on_null, opt_flex_string, opt_flex_u32, OneOrMany};
use serde::Deserialize;

// ============================================================================
// Committee meetings (hearings)
// ============================================================================

/// `committeeMeetings[]` list item, or the `committeeMeeting` detail body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Meeting {
    #[serde(deserialize_with = "opt_flex_string")]
    pub event_id: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    #[serde(deserialize_with = "opt_flex_u32")]
    pub congress: Option<u32>,
    pub chamber: Option<String>,
    #[serde(rename = "type")]
    pub meeting_type: Option<String>,
    pub meeting_status: Option<String>,
    #[serde(deserialize_with = "default_on_null")]
    pub committees: Vec<NamedItem>,
    pub location: Option<MeetingLocation>,
    #[serde(deserialize_with = "default_on_null")]
    pub videos: Vec<Video>,
    #[serde(deserialize_with = "default_on_null")]
    pub meeting_documents: Vec<MeetingDocument>,
    pub hearing_transcript: Option<OneOrMany<Transcript>>,
    #[serde(deserialize_with = "default_on_null")]
    pub witnesses: Vec<Witness>,
    pub related_items: Option<RelatedItems>,
}

/// `GET /committee-meeting/{congress}/{chamber}/{eventId}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeetingDetail {
    pub committee_meeting: Option<Meeting>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamedItem {
    pub name: Option<String>,
}

/// Either a structured room/building/address or free text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MeetingLocation {
    Text(String),
    Structured {
        #[serde(default)]
        room: Option<String>,
        #[serde(default)]
        building: Option<String>,
        #[serde(default)]
        address: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Video {
    pub name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MeetingDocument {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "documentType", alias = "type")]
    pub document_type: Option<String>,
    pub format: Option<String>,
    pub url: Option<String>,
    #[serde(deserialize_with = "default_on_null")]
    pub formats: Vec<Format>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Format {
    #[serde(rename = "type")]
    pub format_type: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transcript {
    #[serde(deserialize_with = "opt_flex_string")]
    pub jacket_number: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Witness {
    pub name: Option<String>,
    pub position: Option<String>,
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelatedItems {
    #[serde(deserialize_with = "default_on_null")]
    pub bills: Vec<BillRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BillRef {
    #[serde(rename = "type")]
    pub bill_type: Option<String>,
    #[serde(deserialize_with = "opt_flex_string")]
    pub number: Option<String>,
}

// ============================================================================
// Daily Congressional Record
// ============================================================================

/// `dailyCongressionalRecord[]` list item
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueSummary {
    #[serde(deserialize_with = "opt_flex_u32")]
    pub volume_number: Option<u32>,
    #[serde(deserialize_with = "opt_flex_u32")]
    pub issue_number: Option<u32>,
    #[serde(deserialize_with = "opt_flex_u32")]
    pub congress: Option<u32>,
    #[serde(deserialize_with = "opt_flex_u32")]
    pub session_number: Option<u32>,
    pub issue_date: Option<String>,
    pub update_date: Option<String>,
}

/// `GET /daily-congressional-record/{volume}/{issue}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssueDetailEnvelope {
    pub issue: Option<IssueDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueDetail {
    #[serde(deserialize_with = "default_on_null")]
    pub sections: Vec<IssueSection>,
    pub entire_issue: Option<OneOrMany<EntireIssue>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueSection {
    pub name: Option<String>,
    #[serde(deserialize_with = "opt_flex_string")]
    pub start_page: Option<String>,
    #[serde(deserialize_with = "opt_flex_string")]
    pub end_page: Option<String>,
}

/// Full-issue rendition; either a single link or a list of formats
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EntireIssue {
    #[serde(rename = "type")]
    pub format_type: Option<String>,
    pub url: Option<String>,
    #[serde(deserialize_with = "default_on_null")]
    pub formats: Vec<Format>,
}

/// `GET /daily-congressional-record/{volume}/{issue}/articles`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArticlesEnvelope {
    #[serde(deserialize_with = "default_on_null")]
    pub articles: Vec<ArticleSectionGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleSectionGroup {
    pub section: Option<String>,
    #[serde(deserialize_with = "default_on_null")]
    pub section_articles: Vec<ApiArticle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiArticle {
    pub title: Option<String>,
    #[serde(deserialize_with = "opt_flex_string")]
    pub start_page: Option<String>,
    #[serde(deserialize_with = "opt_flex_string")]
    pub end_page: Option<String>,
    #[serde(deserialize_with = "default_on_null")]
    pub text: Vec<Format>,
}

// ============================================================================
// House roll-call votes
// ============================================================================

/// `houseRollCallVotes[]` list item
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseVoteSummary {
    #[serde(deserialize_with = "opt_flex_u32")]
    pub roll_call_number: Option<u32>,
    #[serde(deserialize_with = "opt_flex_u32")]
    pub session_number: Option<u32>,
    #[serde(deserialize_with = "opt_flex_u32")]
    pub congress: Option<u32>,
    pub start_date: Option<String>,
    pub result: Option<String>,
    #[serde(rename = "sourceDataURL")]
    pub source_data_url: Option<String>,
    pub legislation_url: Option<String>,
    pub legislation_type: Option<String>,
    #[serde(deserialize_with = "opt_flex_string")]
    pub legislation_number: Option<String>,
    pub vote_type: Option<String>,
}

/// `GET /house-vote/{congress}/{session}/{roll}`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseVoteDetailEnvelope {
    pub house_roll_call_vote: Option<HouseVoteDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseVoteDetail {
    pub vote_question: Option<String>,
    pub vote_type: Option<String>,
    pub result: Option<String>,
    #[serde(deserialize_with = "default_on_null")]
    pub vote_party_total: Vec<PartyTotal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartyTotal {
    pub vote_party: Option<String>,
    #[serde(deserialize_with = "opt_flex_u32")]
    pub yea_total: Option<u32>,
    #[serde(deserialize_with = "opt_flex_u32")]
    pub nay_total: Option<u32>,
    #[serde(deserialize_with = "opt_flex_u32")]
    pub present_total: Option<u32>,
    #[serde(deserialize_with = "opt_flex_u32")]
    pub not_voting_total: Option<u32>,
}

/// `GET /house-vote/{congress}/{session}/{roll}/members`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseMembersEnvelope {
    pub house_roll_call_vote_member_votes: Option<HouseMemberVotes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HouseMemberVotes {
    #[serde(deserialize_with = "default_on_null")]
    pub results: Vec<HouseMemberResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseMemberResult {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub vote_party: Option<String>,
    pub vote_state: Option<String>,
    pub vote_cast: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_detail_decodes_mixed_shapes() {
        let json = r#"{
            "committeeMeeting": {
                "eventId": 115538,
                "title": "Budget Hearing",
                "date": "2022-03-01T14:30:00Z",
                "congress": 117,
                "chamber": "Senate",
                "committees": [{"name": "Committee on the Budget"}],
                "location": {"room": "608", "building": "Dirksen Senate Office Building"},
                "hearingTranscript": {"jacketNumber": 47123},
                "witnesses": null,
                "relatedItems": {"bills": [{"type": "S", "number": 10}]}
            }
        }"#;

        let detail: MeetingDetail = serde_json::from_str(json).unwrap();
        let meeting = detail.committee_meeting.unwrap();
        assert_eq!(meeting.event_id.as_deref(), Some("115538"));
        assert!(meeting.witnesses.is_empty());
        assert!(matches!(
            meeting.location,
            Some(MeetingLocation::Structured { .. })
        ));
        let transcripts = meeting.hearing_transcript.unwrap().into_vec();
        assert_eq!(transcripts[0].jacket_number.as_deref(), Some("47123"));
        assert_eq!(meeting.related_items.unwrap().bills[0].number.as_deref(), Some("10"));
    }

    #[test]
    fn test_text_location_and_transcript_list() {
        let json = r#"{
            "location": "Virtual",
            "hearingTranscript": [{"jacketNumber": "1"}, {"jacketNumber": "2"}]
        }"#;
        let meeting: Meeting = serde_json::from_str(json).unwrap();
        assert!(matches!(meeting.location, Some(MeetingLocation::Text(ref s)) if s == "Virtual"));
        assert_eq!(meeting.hearing_transcript.unwrap().into_vec().len(), 2);
    }

    #[test]
    fn test_issue_summary_string_numbers() {
        let json = r#"{"volumeNumber": "168", "issueNumber": 37, "congress": 117, "sessionNumber": 2, "issueDate": "2022-03-01T04:00:00Z"}"#;
        let s: IssueSummary = serde_json::from_str(json).unwrap();
        assert_eq!(s.volume_number, Some(168));
        assert_eq!(s.issue_number, Some(37));
    }
}
