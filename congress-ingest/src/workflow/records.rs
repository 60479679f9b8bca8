//! Daily Congressional Record issues
//!
//! Partitioned by congress. Full mode fetches each issue's detail (sections,
//! full-issue downloads) and its article listing; fast mode keeps only the
//! listing fields.

use super::{FetchOptions, PartitionSource, RecordSink};
use crate::extractors::payloads::{
    ArticleSectionGroup, ArticlesEnvelope, IssueDetail, IssueDetailEnvelope, IssueSummary,
};
use crate::extractors::CongressClient;
use crate::models::{Article, ArticleSummary, RecordIssue, Section, SourceLink};
use async_trait::async_trait;
use congress_common::time::normalize_api_date;
use congress_common::Result;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};

const ISSUE_PAGE_BASE: &str = "https://www.congress.gov/congressional-record";

/// Record issues fetch over the configured congresses
pub struct RecordsSource {
    client: CongressClient,
    options: FetchOptions,
}

/// Detail payloads gathered for one issue
#[derive(Debug, Default)]
pub struct IssueExtras {
    pub detail: Option<IssueDetail>,
    pub articles: Option<Vec<ArticleSectionGroup>>,
}

impl RecordsSource {
    pub fn new(client: CongressClient, options: FetchOptions) -> Self {
        Self { client, options }
    }

    async fn extras(&self, summary: &IssueSummary) -> IssueExtras {
        let (Some(volume), Some(issue)) = (summary.volume_number, summary.issue_number) else {
            return IssueExtras::default();
        };
        if self.options.fast {
            return IssueExtras::default();
        }

        let detail_path = format!("/daily-congressional-record/{}/{}", volume, issue);
        let articles_path = format!("{}/articles", detail_path);
        let (detail, articles) = tokio::join!(
            self.client.get_json::<IssueDetailEnvelope>(&detail_path, &[]),
            self.client.get_json::<ArticlesEnvelope>(&articles_path, &[]),
        );

        let detail = match detail {
            Ok(found) => found.and_then(|d| d.issue),
            Err(e) => {
                warn!(volume, issue, error = %e, "Issue detail unavailable");
                None
            }
        };
        let articles = match articles {
            Ok(found) => found.map(|a| a.articles),
            Err(e) => {
                warn!(volume, issue, error = %e, "Issue articles unavailable");
                None
            }
        };

        IssueExtras { detail, articles }
    }
}

#[async_trait]
impl PartitionSource for RecordsSource {
    type Entity = RecordIssue;
    type Partition = u32;

    fn name(&self) -> &'static str {
        "records"
    }

    fn partitions(&self) -> Vec<u32> {
        self.options.congresses.clone()
    }

    async fn fetch_partition(
        &self,
        congress: &u32,
        sink: &dyn RecordSink<RecordIssue>,
    ) -> Result<()> {
        let issues: Vec<IssueSummary> = self
            .client
            .fetch_all_paginated(
                "/daily-congressional-record",
                &[("congress", congress.to_string())],
                "dailyCongressionalRecord",
            )
            .await?;
        let issues = self.options.sampled(issues);

        info!(congress, issues = issues.len(), "Listed record issues");

        let mut resolved = stream::iter(issues)
            .map(|summary| async move {
                let extras = self.extras(&summary).await;
                record_from_issue(summary, extras)
            })
            .buffer_unordered(self.options.workers());

        let mut kept = 0usize;
        while let Some(record) = resolved.next().await {
            if self.options.in_range(record.date.as_deref()) {
                sink.absorb(record).await;
                kept += 1;
            }
        }

        debug!(congress, kept, "Record issues normalized");
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn lowercase_type(value: Option<String>, fallback: &str) -> String {
    non_empty(value)
        .map(|t| t.to_lowercase())
        .unwrap_or_else(|| fallback.to_string())
}

/// Issue page on congress.gov
pub fn issue_page_url(volume: u32, issue: u32) -> String {
    format!("{}/volume-{}/issue-{}", ISSUE_PAGE_BASE, volume, issue)
}

/// Normalize an issue listing entry plus its optional detail payloads.
///
/// Section article counts come from the article listing, matched by
/// section name. Article types are left unclassified.
pub fn record_from_issue(summary: IssueSummary, extras: IssueExtras) -> RecordIssue {
    let volume = summary.volume_number.unwrap_or(0);
    let issue = summary.issue_number.unwrap_or(0);

    let mut sources = Vec::new();
    let mut sections = Vec::new();

    if let Some(detail) = extras.detail {
        sections = detail
            .sections
            .into_iter()
            .map(|s| Section {
                name: non_empty(s.name).unwrap_or_else(|| "Unknown".to_string()),
                start_page: non_empty(s.start_page),
                end_page: non_empty(s.end_page),
                article_count: 0,
            })
            .collect();

        for entire in detail
            .entire_issue
            .map(|e| e.into_vec())
            .unwrap_or_default()
        {
            let parent_type = entire.format_type;
            for format in entire.formats {
                if let Some(url) = non_empty(format.url) {
                    let kind = lowercase_type(format.format_type.or(parent_type.clone()), "pdf");
                    sources.push(
                        SourceLink::new(url, &kind, "congress.gov").with_description("Full issue"),
                    );
                }
            }
            if let Some(url) = non_empty(entire.url) {
                let kind = lowercase_type(parent_type, "pdf");
                sources.push(
                    SourceLink::new(url, &kind, "congress.gov").with_description("Full issue"),
                );
            }
        }
    }

    sources.push(
        SourceLink::new(issue_page_url(volume, issue), "html", "congress.gov")
            .with_description("Issue page"),
    );

    let mut articles = Vec::new();
    let mut section_counts: HashMap<String, u32> = HashMap::new();
    for group in extras.articles.unwrap_or_default() {
        let section = non_empty(group.section).unwrap_or_else(|| "Unknown".to_string());
        *section_counts.entry(section.clone()).or_insert(0) += group.section_articles.len() as u32;

        for article in group.section_articles {
            let article_sources: Vec<SourceLink> = article
                .text
                .into_iter()
                .filter_map(|t| {
                    let url = non_empty(t.url)?;
                    let label = non_empty(t.format_type);
                    let kind = lowercase_type(label.clone(), "text");
                    let mut link = SourceLink::new(url, &kind, "congress.gov");
                    link.description = label;
                    Some(link)
                })
                .collect();

            articles.push(Article {
                title: non_empty(article.title).unwrap_or_else(|| "Untitled".to_string()),
                section: section.clone(),
                article_type: None,
                start_page: non_empty(article.start_page),
                end_page: non_empty(article.end_page),
                related_bills: None,
                sources: (!article_sources.is_empty()).then_some(article_sources),
            });
        }
    }

    for section in &mut sections {
        section.article_count = section_counts.get(&section.name).copied().unwrap_or(0);
    }

    RecordIssue {
        volume: summary.volume_number,
        issue: summary.issue_number,
        date: summary.issue_date.as_deref().and_then(normalize_api_date),
        congress: summary.congress,
        session: summary.session_number,
        update_date: non_empty(summary.update_date),
        sections: (!sections.is_empty()).then_some(sections),
        sources: Some(sources),
        article_summary: (!articles.is_empty()).then(|| ArticleSummary::from_articles(&articles)),
        articles: (!articles.is_empty()).then_some(articles),
    }
}
