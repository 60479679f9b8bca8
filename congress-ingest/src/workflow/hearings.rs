//! Committee hearings from Congress.gov committee meetings
//!
//! Partitioned by (congress, chamber). Each partition lists the chamber's
//! meetings, then fetches meeting details with bounded concurrency unless
//! running in fast mode.

use super::{FetchOptions, PartitionSource, RecordSink};
use crate::extractors::payloads::{Meeting, MeetingDetail, MeetingLocation};
use crate::extractors::CongressClient;
use crate::models::{ApiChamber, ChamberPartition, Hearing, Person, SourceLink};
use async_trait::async_trait;
use congress_common::time::normalize_api_date;
use congress_common::Result;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

const GOVINFO_DETAILS: &str = "https://www.govinfo.gov/app/details";

/// Hearings fetch over the configured congresses
pub struct HearingsSource {
    client: CongressClient,
    options: FetchOptions,
}

impl HearingsSource {
    pub fn new(client: CongressClient, options: FetchOptions) -> Self {
        Self { client, options }
    }

    async fn resolve(&self, partition: &ChamberPartition, summary: Meeting) -> Meeting {
        if self.options.fast {
            return summary;
        }
        let Some(event_id) = summary.event_id.clone() else {
            return summary;
        };

        let path = format!(
            "/committee-meeting/{}/{}/{}",
            partition.congress, partition.chamber, event_id
        );
        match self.client.get_json::<MeetingDetail>(&path, &[]).await {
            Ok(Some(detail)) => detail.committee_meeting.unwrap_or(summary),
            Ok(None) => summary,
            Err(e) => {
                warn!(event_id = %event_id, error = %e, "Meeting detail unavailable; using summary");
                summary
            }
        }
    }
}

#[async_trait]
impl PartitionSource for HearingsSource {
    type Entity = Hearing;
    type Partition = ChamberPartition;

    fn name(&self) -> &'static str {
        "hearings"
    }

    fn partitions(&self) -> Vec<ChamberPartition> {
        self.options
            .congresses
            .iter()
            .flat_map(|&congress| {
                ApiChamber::ALL
                    .into_iter()
                    .map(move |chamber| ChamberPartition { congress, chamber })
            })
            .collect()
    }

    async fn fetch_partition(
        &self,
        partition: &ChamberPartition,
        sink: &dyn RecordSink<Hearing>,
    ) -> Result<()> {
        let path = format!("/committee-meeting/{}/{}", partition.congress, partition.chamber);
        let meetings: Vec<Meeting> = self
            .client
            .fetch_all_paginated(&path, &[], "committeeMeetings")
            .await?;
        let meetings = self.options.sampled(meetings);

        info!(
            partition = %partition,
            meetings = meetings.len(),
            details = !self.options.fast,
            "Listed committee meetings"
        );

        let mut resolved = stream::iter(meetings)
            .map(|meeting| self.resolve(partition, meeting))
            .buffer_unordered(self.options.workers());

        let (mut kept, mut out_of_range) = (0usize, 0usize);
        while let Some(meeting) = resolved.next().await {
            let hearing = hearing_from_meeting(meeting, partition);
            if self.options.in_range(hearing.date.as_deref()) {
                sink.absorb(hearing).await;
                kept += 1;
            } else {
                out_of_range += 1;
            }
        }

        debug!(partition = %partition, kept, out_of_range, "Hearings normalized");
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn some_if_any<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

fn join_location(location: Option<MeetingLocation>) -> Option<String> {
    match location? {
        MeetingLocation::Text(text) => non_empty(Some(text)),
        MeetingLocation::Structured {
            room,
            building,
            address,
        } => {
            let parts: Vec<String> = [room, building, address]
                .into_iter()
                .filter_map(non_empty)
                .collect();
            some_if_any(parts).map(|p| p.join(", "))
        }
    }
}

/// Normalize a committee meeting payload.
///
/// Committees whose name mentions "subcommittee" fill `subcommittee`; the
/// last other committee fills `committee`. Missing congress and chamber fall
/// back to the partition being fetched.
pub fn hearing_from_meeting(meeting: Meeting, partition: &ChamberPartition) -> Hearing {
    let congress = meeting.congress.unwrap_or(partition.congress);
    let chamber =
        non_empty(meeting.chamber).unwrap_or_else(|| partition.chamber.title().to_string());

    let mut committee = None;
    let mut subcommittee = None;
    for name in meeting.committees.into_iter().filter_map(|c| non_empty(c.name)) {
        if name.to_lowercase().contains("subcommittee") {
            subcommittee = Some(name);
        } else {
            committee = Some(name);
        }
    }

    let mut sources = Vec::new();
    for video in meeting.videos {
        if let Some(url) = non_empty(video.url) {
            let mut link = SourceLink::new(url, "video", "congress.gov");
            link.description = non_empty(video.name);
            sources.push(link);
        }
    }

    for doc in meeting.meeting_documents {
        let is_pdf = doc
            .format
            .as_deref()
            .map_or(false, |f| f.to_lowercase().contains("pdf"));
        let source_type = if is_pdf { "pdf" } else { "text" };
        let description = non_empty(doc.description).or_else(|| non_empty(doc.document_type));

        let urls = doc
            .formats
            .into_iter()
            .filter_map(|f| non_empty(f.url))
            .chain(non_empty(doc.url));
        for url in urls {
            let mut link = SourceLink::new(url, source_type, "congress.gov");
            link.description = description.clone();
            sources.push(link);
        }
    }

    let chamber_code = if chamber.eq_ignore_ascii_case("senate") {
        's'
    } else {
        'h'
    };
    let mut jacket_number = None;
    for transcript in meeting
        .hearing_transcript
        .map(|t| t.into_vec())
        .unwrap_or_default()
    {
        if let Some(jacket) = non_empty(transcript.jacket_number) {
            sources.push(
                SourceLink::new(
                    format!("{}/CHRG-{}{}hrg{}", GOVINFO_DETAILS, congress, chamber_code, jacket),
                    "text",
                    "govinfo",
                )
                .with_description("Official hearing transcript"),
            );
            jacket_number.get_or_insert(jacket);
        }
    }

    let witnesses: Vec<Person> = meeting
        .witnesses
        .into_iter()
        .map(|w| Person {
            name: non_empty(w.name).unwrap_or_else(|| "Unknown".to_string()),
            role: Some("witness".to_string()),
            title: non_empty(w.position),
            organization: non_empty(w.organization),
            ..Default::default()
        })
        .collect();

    let related_bills: Vec<String> = meeting
        .related_items
        .map(|r| r.bills)
        .unwrap_or_default()
        .into_iter()
        .map(|b| {
            format!(
                "{}{}",
                b.bill_type.unwrap_or_default().trim(),
                b.number.unwrap_or_default().trim()
            )
        })
        .filter(|b| !b.is_empty())
        .collect();

    Hearing {
        title: non_empty(meeting.title),
        date: meeting.date.as_deref().and_then(normalize_api_date),
        end_date: None,
        congress: Some(congress),
        chamber: Some(chamber),
        hearing_type: non_empty(meeting.meeting_type),
        committee,
        subcommittee,
        status: non_empty(meeting.meeting_status),
        location: join_location(meeting.location),
        sources: some_if_any(sources),
        members: None,
        witnesses: some_if_any(witnesses),
        related_bills: some_if_any(related_bills),
        jacket_number,
        event_id: non_empty(meeting.event_id),
    }
}
