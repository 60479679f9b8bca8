//! Senate.gov roll-call vote XML client
//!
//! Senate votes are not in the Congress.gov API; each vote is a static XML
//! file at a predictable URL. There is no index, so the highest vote number
//! of a session is found by probing.

use crate::error::ApiError;
use crate::extractors::congress_client::{spaced_limiter, DirectRateLimiter};
use crate::models::MemberVote;
use crate::utils::RetryPolicy;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

pub const SENATE_VOTES_BASE: &str = "https://www.senate.gov/legislative/LIS/roll_call_votes";

/// Senate.gov rejects non-browser agents with 403
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Probe stride when searching for the last vote of a session
pub const PROBE_STEP: u32 = 100;

/// `<roll_call_vote>` document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RollCallVote {
    pub congress: String,
    pub session: String,
    pub vote_number: String,
    /// `January 23, 2023, 05:29 PM`
    pub vote_date: String,
    pub vote_question_text: String,
    pub vote_title: String,
    pub vote_result: String,
    pub vote_result_text: String,
    pub question: String,
    pub document: Option<VoteDocument>,
    pub count: Option<VoteCount>,
    pub members: Option<VoteMembers>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VoteDocument {
    pub document_type: String,
    pub document_number: String,
    pub document_title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VoteCount {
    pub yeas: String,
    pub nays: String,
    pub present: String,
    pub absent: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VoteMembers {
    pub member: Vec<SenateMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SenateMember {
    pub member_full: String,
    pub first_name: String,
    pub last_name: String,
    pub party: String,
    pub state: String,
    pub vote_cast: String,
}

/// Parse a count element; blank or malformed text counts as zero
pub fn parse_count(text: &str) -> u32 {
    text.trim().parse().unwrap_or(0)
}

impl RollCallVote {
    pub fn from_xml(xml: &str) -> Result<Self, ApiError> {
        quick_xml::de::from_str(xml).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Member ballots in roll order
    pub fn member_votes(&self) -> Vec<MemberVote> {
        self.members
            .as_ref()
            .map(|m| {
                m.member
                    .iter()
                    .map(|s| {
                        let name = if s.member_full.trim().is_empty() {
                            format!("{} {}", s.first_name, s.last_name)
                        } else {
                            s.member_full.clone()
                        };
                        MemberVote {
                            name: name.trim().to_string(),
                            party: s.party.clone(),
                            state: s.state.clone(),
                            vote: s.vote_cast.clone(),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Parse `January 23, 2023, 05:29 PM` to a calendar date
pub fn parse_senate_date(value: &str) -> Option<NaiveDate> {
    let mut parts = value.split(',');
    let month_day = parts.next()?.trim();
    let year = parts.next()?.trim();
    NaiveDate::parse_from_str(&format!("{}, {}", month_day, year), "%B %d, %Y").ok()
}

/// Vote XML location
pub fn vote_url(congress: u32, session: u32, number: u32, extension: &str) -> String {
    format!(
        "{}/vote{}{}/vote_{}_{}_{:05}.{}",
        SENATE_VOTES_BASE, congress, session, congress, session, number, extension
    )
}

/// Find the highest existing vote number.
///
/// **Algorithm:**
/// 1. Return 0 if vote 1 does not exist
/// 2. Step forward by `step` while votes exist
/// 3. Binary search the last gap for the exact maximum
pub async fn probe_max_vote<F, Fut>(step: u32, mut exists: F) -> Result<u32, ApiError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<bool, ApiError>>,
{
    if !exists(1).await? {
        return Ok(0);
    }

    let step = step.max(1);
    let mut low = 1;
    while exists(low + step).await? {
        low += step;
    }

    let mut high = low + step - 1;
    while low < high {
        let mid = (low + high + 1) / 2;
        if exists(mid).await? {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Ok(low)
}

/// Senate.gov vote fetcher
pub struct SenateClient {
    http: Client,
    rate_limiter: DirectRateLimiter,
    retry: RetryPolicy,
}

impl SenateClient {
    pub fn new(request_spacing: Duration) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        // The WAF answers bursts with 403; one retry after a short pause clears it
        let retry = RetryPolicy {
            max_attempts: 2,
            transient_backoff: Duration::from_secs(1),
            ..RetryPolicy::default()
        };

        Ok(Self {
            http,
            rate_limiter: spaced_limiter(request_spacing),
            retry,
        })
    }

    async fn get_once(&self, url: &str) -> Result<String, ApiError> {
        self.rate_limiter.until_ready().await;

        let response = self
            .http
            .get(url)
            .header("Accept", "application/xml,text/xml,*/*;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), url, String::new()));
        }
        Ok(response.text().await?)
    }

    /// Fetch and parse one vote; `Ok(None)` when it does not exist
    pub async fn get_vote(
        &self,
        congress: u32,
        session: u32,
        number: u32,
    ) -> Result<Option<RollCallVote>, ApiError> {
        let url = vote_url(congress, session, number, "xml");
        debug!(url = %url, "Fetching Senate vote");

        match self.retry.run("senate vote", || self.get_once(&url)).await {
            Ok(body) => RollCallVote::from_xml(&body).map(Some),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Highest vote number published for a session
    pub async fn max_vote_number(&self, congress: u32, session: u32) -> Result<u32, ApiError> {
        probe_max_vote(PROBE_STEP, |n| async move {
            Ok(self.get_vote(congress, session, n).await?.is_some())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<roll_call_vote>
  <congress>118</congress>
  <session>1</session>
  <vote_number>5</vote_number>
  <vote_date>January 23, 2023, 05:29 PM</vote_date>
  <vote_question_text>On the Cloture Motion PN30</vote_question_text>
  <vote_title>Motion to Invoke Cloture: Nomination</vote_title>
  <vote_result>Cloture Motion Agreed to</vote_result>
  <question>On the Cloture Motion</question>
  <document>
    <document_type>PN</document_type>
    <document_number>30</document_number>
    <document_title>A nomination</document_title>
  </document>
  <count>
    <yeas>51</yeas>
    <nays>45</nays>
    <present></present>
    <absent>4</absent>
  </count>
  <members>
    <member>
      <member_full>Baldwin (D-WI)</member_full>
      <last_name>Baldwin</last_name>
      <first_name>Tammy</first_name>
      <party>D</party>
      <state>WI</state>
      <vote_cast>Yea</vote_cast>
    </member>
    <member>
      <member_full>Barrasso (R-WY)</member_full>
      <last_name>Barrasso</last_name>
      <first_name>John</first_name>
      <party>R</party>
      <state>WY</state>
      <vote_cast>Nay</vote_cast>
    </member>
  </members>
</roll_call_vote>"#;

    #[test]
    fn test_parse_sample_vote() {
        let vote = RollCallVote::from_xml(SAMPLE).unwrap();
        assert_eq!(vote.vote_title, "Motion to Invoke Cloture: Nomination");
        assert_eq!(vote.document.as_ref().unwrap().document_number, "30");

        let count = vote.count.as_ref().unwrap();
        assert_eq!(parse_count(&count.yeas), 51);
        assert_eq!(parse_count(&count.present), 0);

        let members = vote.member_votes();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1].name, "Barrasso (R-WY)");
        assert_eq!(members[1].vote, "Nay");
    }

    #[test]
    fn test_parse_senate_date() {
        assert_eq!(
            parse_senate_date("January 23, 2023, 05:29 PM"),
            NaiveDate::from_ymd_opt(2023, 1, 23)
        );
        assert_eq!(parse_senate_date("sometime"), None);
    }

    #[test]
    fn test_vote_url_zero_pads() {
        assert_eq!(
            vote_url(118, 1, 5, "xml"),
            "https://www.senate.gov/legislative/LIS/roll_call_votes/vote1181/vote_118_1_00005.xml"
        );
    }

    #[tokio::test]
    async fn test_probe_finds_exact_maximum() {
        for max in [0u32, 1, 2, 99, 100, 101, 250, 731] {
            let found = probe_max_vote(PROBE_STEP, |n| async move { Ok(n <= max) })
                .await
                .unwrap();
            assert_eq!(found, max, "max {}", max);
        }
    }

    #[tokio::test]
    async fn test_probe_propagates_errors() {
        let result =
            probe_max_vote(PROBE_STEP, |_| async { Err(ApiError::Network("down".into())) }).await;
        assert!(result.is_err());
    }
}
