//! Roll-call votes from both chambers
//!
//! House votes come from the Congress.gov `house-vote` endpoints, one
//! partition per congress. Senate votes come from the Senate.gov XML feed,
//! one partition per (congress, session); the last vote number of a session
//! is found by probing since the feed has no index.

use super::{FetchOptions, PartitionSource, RecordSink};
use crate::extractors::payloads::{
    HouseMemberResult, HouseMembersEnvelope, HouseVoteDetail, HouseVoteDetailEnvelope,
    HouseVoteSummary,
};
use crate::extractors::senate_client::{parse_count, parse_senate_date, vote_url, RollCallVote};
use crate::extractors::{CongressClient, SenateClient};
use crate::models::{ApiChamber, MemberVote, SourceLink, Vote, VoteOutcome, VotePartition};
use crate::services::party_votes::{apply_party_tally, find_party_flippers, key_members};
use async_trait::async_trait;
use congress_common::time::{congress_for_year, normalize_api_date, session_for_year};
use congress_common::{Error, Result};
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Concurrent House detail requests
pub const HOUSE_WORKERS: usize = 5;

/// Concurrent Senate XML requests; the feed throttles aggressively
pub const SENATE_WORKERS: usize = 3;

const ROLL_CALL_PAGE_BASE: &str = "https://www.congress.gov/roll-call-vote";

/// Votes fetch over the configured congresses and date window
pub struct VotesSource {
    congress_api: CongressClient,
    senate: SenateClient,
    options: FetchOptions,
}

impl VotesSource {
    pub fn new(congress_api: CongressClient, senate: SenateClient, options: FetchOptions) -> Self {
        Self {
            congress_api,
            senate,
            options,
        }
    }

    /// (congress, session) pairs in the date window, restricted to the
    /// configured congresses
    fn sessions(&self) -> BTreeSet<(u32, u32)> {
        self.options
            .years()
            .map(|year| (congress_for_year(year), session_for_year(year)))
            .filter(|(congress, _)| self.options.congresses.contains(congress))
            .collect()
    }

    async fn fetch_house(&self, congress: u32, sink: &dyn RecordSink<Vote>) -> Result<()> {
        let summaries: Vec<HouseVoteSummary> = self
            .congress_api
            .fetch_all_paginated(&format!("/house-vote/{}", congress), &[], "houseRollCallVotes")
            .await?;

        let summaries: Vec<HouseVoteSummary> = summaries
            .into_iter()
            .filter(|s| s.roll_call_number.is_some() && s.session_number.is_some())
            .filter(|s| {
                let date = s.start_date.as_deref().and_then(normalize_api_date);
                self.options.in_range(date.as_deref())
            })
            .collect();
        let summaries = self.options.sampled(summaries);

        info!(congress, votes = summaries.len(), "Listed House votes");

        let mut resolved = stream::iter(summaries)
            .map(|summary| self.resolve_house(congress, summary))
            .buffer_unordered(HOUSE_WORKERS);

        let mut kept = 0usize;
        while let Some(vote) = resolved.next().await {
            if let Some(vote) = vote {
                sink.absorb(vote).await;
                kept += 1;
            }
        }

        debug!(congress, kept, "House votes normalized");
        Ok(())
    }

    async fn resolve_house(&self, congress: u32, summary: HouseVoteSummary) -> Option<Vote> {
        if self.options.fast {
            return Some(house_vote(congress, summary, None, &[]));
        }

        let session = summary.session_number?;
        let roll = summary.roll_call_number?;
        let detail_path = format!("/house-vote/{}/{}/{}", congress, session, roll);
        let members_path = format!("{}/members", detail_path);

        let (detail, members) = tokio::join!(
            self.congress_api
                .get_json::<HouseVoteDetailEnvelope>(&detail_path, &[]),
            self.congress_api
                .get_json::<HouseMembersEnvelope>(&members_path, &[]),
        );

        let (detail, members) = match (detail, members) {
            (Ok(detail), Ok(members)) => (detail, members),
            (Err(e), _) | (_, Err(e)) => {
                warn!(congress, session, roll, error = %e, "Skipping House vote");
                return None;
            }
        };

        let members: Vec<MemberVote> = members
            .and_then(|m| m.house_roll_call_vote_member_votes)
            .map(|m| m.results.into_iter().map(house_member).collect())
            .unwrap_or_default();
        let detail = detail.and_then(|d| d.house_roll_call_vote);

        Some(house_vote(congress, summary, detail, &members))
    }

    async fn fetch_senate(
        &self,
        congress: u32,
        session: u32,
        sink: &dyn RecordSink<Vote>,
    ) -> Result<()> {
        let max_vote = self
            .senate
            .max_vote_number(congress, session)
            .await
            .map_err(Error::from)?;

        if max_vote == 0 {
            info!(congress, session, "No Senate votes published");
            return Ok(());
        }
        info!(congress, session, max_vote, "Found Senate votes");

        let numbers = self.options.sampled((1..=max_vote).collect::<Vec<u32>>());
        let mut resolved = stream::iter(numbers)
            .map(|number| async move {
                match self.senate.get_vote(congress, session, number).await {
                    Ok(Some(roll)) => Some(senate_vote(congress, session, number, &roll)),
                    Ok(None) => None,
                    Err(e) => {
                        warn!(congress, session, number, error = %e, "Skipping Senate vote");
                        None
                    }
                }
            })
            .buffer_unordered(SENATE_WORKERS);

        let mut kept = 0usize;
        while let Some(vote) = resolved.next().await {
            let Some(vote) = vote else { continue };
            if self.options.in_range(vote.date.as_deref()) {
                sink.absorb(vote).await;
                kept += 1;
            }
        }

        debug!(congress, session, kept, "Senate votes normalized");
        Ok(())
    }
}

#[async_trait]
impl PartitionSource for VotesSource {
    type Entity = Vote;
    type Partition = VotePartition;

    fn name(&self) -> &'static str {
        "votes"
    }

    fn partitions(&self) -> Vec<VotePartition> {
        let sessions = self.sessions();
        let house_congresses: BTreeSet<u32> = sessions.iter().map(|(c, _)| *c).collect();

        let house = house_congresses.into_iter().map(|congress| VotePartition {
            chamber: ApiChamber::House,
            congress,
            session: None,
        });
        let senate = sessions.into_iter().map(|(congress, session)| VotePartition {
            chamber: ApiChamber::Senate,
            congress,
            session: Some(session),
        });

        house.chain(senate).collect()
    }

    async fn fetch_partition(
        &self,
        partition: &VotePartition,
        sink: &dyn RecordSink<Vote>,
    ) -> Result<()> {
        match (partition.chamber, partition.session) {
            (ApiChamber::House, _) => self.fetch_house(partition.congress, sink).await,
            (ApiChamber::Senate, Some(session)) => {
                self.fetch_senate(partition.congress, session, sink).await
            }
            (ApiChamber::Senate, None) => Err(Error::InvalidInput(format!(
                "Senate partition {} has no session",
                partition
            ))),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn text(value: &str) -> Option<String> {
    non_empty(Some(value.to_string()))
}

fn house_member(result: HouseMemberResult) -> MemberVote {
    let name = format!(
        "{} {}",
        result.first_name.unwrap_or_default().trim(),
        result.last_name.unwrap_or_default().trim()
    );
    MemberVote {
        name: name.trim().to_string(),
        party: result.vote_party.unwrap_or_default(),
        state: result.vote_state.unwrap_or_default(),
        vote: result.vote_cast.unwrap_or_default(),
    }
}

/// Tally from the per-party totals reported by Congress.gov
fn house_outcome(detail: &HouseVoteDetail) -> VoteOutcome {
    let mut outcome = VoteOutcome {
        result: non_empty(detail.result.clone()).unwrap_or_else(|| "Unknown".to_string()),
        ..Default::default()
    };

    for total in &detail.vote_party_total {
        let yea = total.yea_total.unwrap_or(0);
        let nay = total.nay_total.unwrap_or(0);
        match total.vote_party.as_deref().map(str::trim) {
            Some("D") => {
                outcome.democrat_yea = yea;
                outcome.democrat_nay = nay;
            }
            Some("R") => {
                outcome.republican_yea = yea;
                outcome.republican_nay = nay;
            }
            Some("I") => {
                outcome.independent_yea = yea;
                outcome.independent_nay = nay;
            }
            _ => {}
        }
        outcome.present += total.present_total.unwrap_or(0);
        outcome.not_voting += total.not_voting_total.unwrap_or(0);
    }

    outcome.yea_total = outcome.democrat_yea + outcome.republican_yea + outcome.independent_yea;
    outcome.nay_total = outcome.democrat_nay + outcome.republican_nay + outcome.independent_nay;
    outcome
}

/// Normalize a House roll call. Without `detail` (fast mode) the vote keeps
/// only listing fields and has no outcome.
pub fn house_vote(
    congress: u32,
    summary: HouseVoteSummary,
    detail: Option<HouseVoteDetail>,
    members: &[MemberVote],
) -> Vote {
    let session = summary.session_number.unwrap_or(0);
    let roll = summary.roll_call_number.unwrap_or(0);

    let mut sources = Vec::new();
    if let Some(url) = non_empty(summary.source_data_url) {
        sources.push(SourceLink::new(url, "xml", "house.gov").with_description("House Clerk XML"));
    }
    sources.push(
        SourceLink::new(
            format!("{}/{}-{}/house/{}", ROLL_CALL_PAGE_BASE, congress, session, roll),
            "text",
            "congress.gov",
        )
        .with_description("Congress.gov Vote Record"),
    );
    if let Some(url) = non_empty(summary.legislation_url) {
        sources.push(
            SourceLink::new(url, "text", "congress.gov").with_description("Legislation Page"),
        );
    }

    let bill_number = match (
        non_empty(summary.legislation_type),
        non_empty(summary.legislation_number),
    ) {
        (Some(kind), Some(number)) => Some(format!("{} {}", kind, number)),
        _ => None,
    };

    let flippers = find_party_flippers(members);
    let question = detail.as_ref().and_then(|d| non_empty(d.vote_question.clone()));
    let listed_result = non_empty(summary.result);
    let result = detail
        .as_ref()
        .and_then(|d| non_empty(d.result.clone()))
        .or_else(|| listed_result.clone());

    Vote {
        vote_id: Some(format!("{}-house-{}-{}", congress, session, roll)),
        title: question
            .clone()
            .or(listed_result)
            .or_else(|| Some("Unknown".to_string())),
        chamber: Some(ApiChamber::House.title().to_string()),
        congress: Some(congress),
        session: Some(session),
        roll_call_number: Some(roll),
        date: summary.start_date.as_deref().and_then(normalize_api_date),
        question,
        vote_type: detail
            .as_ref()
            .and_then(|d| non_empty(d.vote_type.clone()))
            .or_else(|| non_empty(summary.vote_type)),
        result,
        bill_number,
        bill_title: None,
        sources: Some(sources),
        key_members: (!flippers.is_empty()).then(|| key_members(&flippers, true)),
        outcome: detail.as_ref().map(house_outcome),
        party_flippers: (!flippers.is_empty()).then_some(flippers),
    }
}

/// Normalize a Senate roll call from its XML document.
///
/// An unparseable vote date is kept verbatim so the record still passes the
/// date filter.
pub fn senate_vote(congress: u32, session: u32, number: u32, roll: &RollCallVote) -> Vote {
    let members = roll.member_votes();
    let flippers = find_party_flippers(&members);

    let count = roll.count.clone().unwrap_or_default();
    let mut outcome = VoteOutcome {
        result: text(&roll.vote_result).unwrap_or_else(|| "Unknown".to_string()),
        yea_total: parse_count(&count.yeas),
        nay_total: parse_count(&count.nays),
        present: parse_count(&count.present),
        not_voting: parse_count(&count.absent),
        ..Default::default()
    };
    apply_party_tally(&mut outcome, &members);

    let date = parse_senate_date(&roll.vote_date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .or_else(|| text(&roll.vote_date));

    let document = roll.document.clone().unwrap_or_default();
    let bill_number = match (text(&document.document_type), text(&document.document_number)) {
        (Some(kind), Some(num)) => Some(format!("{} {}", kind, num)),
        _ => None,
    };

    let question = text(&roll.vote_question_text);

    Vote {
        vote_id: Some(format!("{}-senate-{}-{}", congress, session, number)),
        title: text(&roll.vote_title)
            .or_else(|| question.clone())
            .or_else(|| Some("Unknown".to_string())),
        chamber: Some(ApiChamber::Senate.title().to_string()),
        congress: Some(congress),
        session: Some(session),
        roll_call_number: Some(number),
        date,
        question,
        vote_type: text(&roll.question),
        result: text(&roll.vote_result),
        bill_number,
        bill_title: text(&document.document_title),
        sources: Some(vec![
            SourceLink::new(vote_url(congress, session, number, "xml"), "xml", "senate.gov")
                .with_description("Senate.gov XML"),
            SourceLink::new(vote_url(congress, session, number, "htm"), "text", "senate.gov")
                .with_description("Senate.gov Vote Page"),
        ]),
        key_members: (!flippers.is_empty()).then(|| key_members(&flippers, false)),
        outcome: Some(outcome),
        party_flippers: (!flippers.is_empty()).then_some(flippers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn summary() -> HouseVoteSummary {
        serde_json::from_str(
            r#"{"rollCallNumber": 42, "sessionNumber": 1, "congress": 118,
                "startDate": "2023-02-01T12:00:00-05:00", "result": "Passed",
                "sourceDataURL": "https://clerk.house.gov/evs/2023/roll042.xml",
                "legislationType": "HR", "legislationNumber": 7}"#,
        )
        .unwrap()
    }

    fn member(name: &str, party: &str, vote: &str) -> MemberVote {
        MemberVote {
            name: name.to_string(),
            party: party.to_string(),
            state: "XX".to_string(),
            vote: vote.to_string(),
        }
    }

    #[test]
    fn test_house_vote_full_detail() {
        let detail: HouseVoteDetailEnvelope = serde_json::from_str(
            r#"{"houseRollCallVote": {
                "voteQuestion": "On Passage", "voteType": "Yea-and-Nay", "result": "Passed",
                "votePartyTotal": [
                    {"voteParty": "D", "yeaTotal": 200, "nayTotal": 10, "notVotingTotal": 2},
                    {"voteParty": "R", "yeaTotal": 20, "nayTotal": 190}
                ]
            }}"#,
        )
        .unwrap();
        let members = vec![
            member("A One", "D", "Yea"),
            member("B Two", "D", "Yea"),
            member("C Three", "D", "Nay"),
        ];

        let vote = house_vote(118, summary(), detail.house_roll_call_vote, &members);

        assert_eq!(vote.vote_id.as_deref(), Some("118-house-1-42"));
        assert_eq!(vote.title.as_deref(), Some("On Passage"));
        assert_eq!(vote.bill_number.as_deref(), Some("HR 7"));
        assert_eq!(vote.date.as_deref(), Some("2023-02-01"));

        let outcome = vote.outcome.unwrap();
        assert_eq!(outcome.yea_total, 220);
        assert_eq!(outcome.nay_total, 200);
        assert_eq!(outcome.not_voting, 2);

        assert_eq!(vote.key_members, Some(vec!["C Three (D - voted Nay)".to_string()]));
        assert_eq!(vote.sources.unwrap().len(), 2);
    }

    #[test]
    fn test_house_vote_fast_mode_uses_listing() {
        let vote = house_vote(118, summary(), None, &[]);

        assert_eq!(vote.title.as_deref(), Some("Passed"));
        assert_eq!(vote.result.as_deref(), Some("Passed"));
        assert_eq!(vote.outcome, None);
        assert_eq!(vote.party_flippers, None);
    }

    #[test]
    fn test_senate_vote_from_xml() {
        let xml = r#"<roll_call_vote>
  <congress>118</congress>
  <session>1</session>
  <vote_number>5</vote_number>
  <vote_date>January 23, 2023, 05:29 PM</vote_date>
  <vote_question_text>On the Cloture Motion PN30</vote_question_text>
  <vote_title></vote_title>
  <vote_result>Cloture Motion Agreed to</vote_result>
  <question>On the Cloture Motion</question>
  <document>
    <document_type>PN</document_type>
    <document_number>30</document_number>
    <document_title>A nomination</document_title>
  </document>
  <count><yeas>2</yeas><nays>1</nays><present></present><absent>0</absent></count>
  <members>
    <member><member_full>Alpha (D-AA)</member_full><party>D</party><state>AA</state><vote_cast>Yea</vote_cast></member>
    <member><member_full>Beta (D-BB)</member_full><party>D</party><state>BB</state><vote_cast>Yea</vote_cast></member>
    <member><member_full>Gamma (D-CC)</member_full><party>D</party><state>CC</state><vote_cast>Nay</vote_cast></member>
  </members>
</roll_call_vote>"#;
        let roll = RollCallVote::from_xml(xml).unwrap();

        let vote = senate_vote(118, 1, 5, &roll);

        assert_eq!(vote.vote_id.as_deref(), Some("118-senate-1-5"));
        assert_eq!(vote.date.as_deref(), Some("2023-01-23"));
        assert_eq!(vote.title.as_deref(), Some("On the Cloture Motion PN30"));
        assert_eq!(vote.bill_number.as_deref(), Some("PN 30"));
        let outcome = vote.outcome.unwrap();
        assert_eq!(outcome.yea_total, 2);
        assert_eq!(outcome.democrat_yea, 2);
        assert_eq!(outcome.democrat_nay, 1);
        assert_eq!(
            vote.key_members,
            Some(vec!["Gamma (D-CC) (voted Nay)".to_string()])
        );
        assert!(vote.sources.unwrap()[0].url.ends_with("vote_118_1_00005.xml"));
    }

    #[test]
    fn test_partitions_follow_date_window() {
        let mut options = FetchOptions::new(
            vec![117, 118],
            NaiveDate::from_ymd_opt(2021, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
        );
        options.workers = 2;
        let source = VotesSource::new(
            CongressClient::new("DEMO_KEY", Duration::ZERO, Default::default()).unwrap(),
            SenateClient::new(Duration::ZERO).unwrap(),
            options,
        );

        let labels: Vec<String> = source.partitions().iter().map(ToString::to_string).collect();
        assert_eq!(
            labels,
            vec![
                "house-117",
                "house-118",
                "senate-117-1",
                "senate-117-2",
                "senate-118-1"
            ]
        );
    }
}
