//! Daily Congressional Record issue

use super::common::SourceLink;
use super::de::opt_flex_u32;
use crate::services::record_merger::{merge_list, merge_scalar};
use crate::types::Entity;
use crate::validators::completeness_scorer::{FieldCounter, Presence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Article type bucket used when an article carries no classification
pub const UNCLASSIFIED: &str = "other";

/// One issue of the daily Congressional Record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordIssue {
    #[serde(default, deserialize_with = "opt_flex_u32")]
    pub volume: Option<u32>,
    #[serde(default, deserialize_with = "opt_flex_u32")]
    pub issue: Option<u32>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "opt_flex_u32")]
    pub congress: Option<u32>,
    #[serde(default, deserialize_with = "opt_flex_u32")]
    pub session: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_date: Option<String>,
    #[serde(default)]
    pub sections: Option<Vec<Section>>,
    #[serde(default)]
    pub sources: Option<Vec<SourceLink>>,
    #[serde(default)]
    pub article_summary: Option<ArticleSummary>,
    #[serde(default)]
    pub articles: Option<Vec<Article>>,
}

/// A chamber section of an issue (Senate, House, Extensions of Remarks, Daily Digest)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_page: Option<String>,
    #[serde(default)]
    pub end_page: Option<String>,
    #[serde(default)]
    pub article_count: u32,
}

/// A single article within an issue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub section: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub article_type: Option<String>,
    #[serde(default)]
    pub start_page: Option<String>,
    #[serde(default)]
    pub end_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_bills: Option<Vec<String>>,
    #[serde(default)]
    pub sources: Option<Vec<SourceLink>>,
}

/// Article counts for an issue
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub total: usize,
    #[serde(default)]
    pub by_type: BTreeMap<String, usize>,
}

impl ArticleSummary {
    pub fn from_articles(articles: &[Article]) -> Self {
        let mut by_type = BTreeMap::new();
        for article in articles {
            let kind = article
                .article_type
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(UNCLASSIFIED);
            *by_type.entry(kind.to_string()).or_insert(0) += 1;
        }
        Self {
            total: articles.len(),
            by_type,
        }
    }
}

impl Presence for ArticleSummary {
    fn is_present(&self) -> bool {
        true
    }
}

impl RecordIssue {
    fn article_count(&self) -> usize {
        self.articles.as_ref().map_or(0, Vec::len)
    }
}

impl Entity for RecordIssue {
    /// (volume, issue)
    type Key = (u32, u32);

    const COLLECTION: &'static str = "records";
    const LABEL: &'static str = "record issue";

    fn identity_key(&self) -> (u32, u32) {
        (self.volume.unwrap_or(0), self.issue.unwrap_or(0))
    }

    fn completeness(&self) -> u32 {
        FieldCounter::new()
            .field(&self.volume)
            .field(&self.issue)
            .field(&self.date)
            .field(&self.congress)
            .field(&self.session)
            .field(&self.update_date)
            .field(&self.sections)
            .field(&self.sources)
            .field(&self.article_summary)
            .field(&self.articles)
            .finish()
    }

    /// The article summary always describes the article list it travels
    /// with: when secondary's articles are taken, the summary is rebuilt.
    fn merge(&self, secondary: &Self) -> Self {
        let RecordIssue {
            volume,
            issue,
            date,
            congress,
            session,
            update_date,
            sections,
            sources,
            article_summary,
            articles,
        } = secondary.clone();

        let mut merged = self.clone();
        merge_scalar(&mut merged.volume, volume);
        merge_scalar(&mut merged.issue, issue);
        merge_scalar(&mut merged.date, date);
        merge_scalar(&mut merged.congress, congress);
        merge_scalar(&mut merged.session, session);
        merge_scalar(&mut merged.update_date, update_date);
        merge_list(&mut merged.sections, sections);
        merge_list(&mut merged.sources, sources);
        merge_scalar(&mut merged.article_summary, article_summary);
        if merge_list(&mut merged.articles, articles) {
            merged.article_summary = merged
                .articles
                .as_deref()
                .map(ArticleSummary::from_articles);
        }
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
            ("articles", self.articles.is_present()),
            ("sections", self.sections.is_present()),
            ("sources", self.sources.is_present()),
        ]
    }

    fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.date.is_present() {
            missing.push("date");
        }
        if self.volume.is_none() {
            missing.push("volume");
        }
        if self.issue.is_none() {
            missing.push("issue");
        }
        missing
    }

    fn metadata_extras(records: &[Self]) -> serde_json::Map<String, serde_json::Value> {
        let mut article_types: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_articles = 0;
        for record in records {
            total_articles += record.article_count();
            if let Some(articles) = &record.articles {
                for (kind, n) in ArticleSummary::from_articles(articles).by_type {
                    *article_types.entry(kind).or_insert(0) += n;
                }
            }
        }

        let mut extras = serde_json::Map::new();
        extras.insert("total_articles".to_string(), total_articles.into());
        extras.insert(
            "article_types".to_string(),
            serde_json::to_value(article_types).unwrap_or_default(),
        );
        extras
    }
}
