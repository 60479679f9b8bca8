//! Congress.gov API client
//!
//! Rate-limited JSON client for `api.congress.gov/v3`. Requests are spaced
//! by a governor token bucket and retried through the shared
//! [`RetryPolicy`]. A 404 is not an error: detail lookups for records that
//! vanished upstream return `Ok(None)`.

use crate::error::ApiError;
use crate::utils::RetryPolicy;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::{debug, warn};

pub const CONGRESS_API_BASE: &str = "https://api.congress.gov/v3";
const USER_AGENT: &str = concat!("congress-ingest/", env!("CARGO_PKG_VERSION"));

/// Maximum page size accepted by the API
pub const PAGE_LIMIT: usize = 250;

pub(crate) type DirectRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// One request per `period`; a zero period disables spacing.
pub(crate) fn spaced_limiter(period: Duration) -> DirectRateLimiter {
    let quota = Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(NonZeroU32::MAX));
    RateLimiter::direct(quota)
}

/// Congress.gov API client
pub struct CongressClient {
    http: Client,
    base_url: String,
    api_key: String,
    rate_limiter: DirectRateLimiter,
    retry: RetryPolicy,
}

impl CongressClient {
    pub fn new(
        api_key: impl Into<String>,
        request_spacing: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: CONGRESS_API_BASE.to_string(),
            api_key: api_key.into(),
            rate_limiter: spaced_limiter(request_spacing),
            retry,
        })
    }

    /// Point the client at another host (mirrors, local fixtures)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_once(&self, url: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        self.rate_limiter.until_ready().await;

        debug!(url = %url, "Querying Congress.gov API");

        let response = self
            .http
            .get(url)
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), url, body));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn get_value(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<Value>, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        match self.retry.run(path, || self.get_once(&url, params)).await {
            Ok(value) => Ok(Some(value)),
            Err(ApiError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// GET `path` and decode the body; `Ok(None)` on 404
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, ApiError> {
        match self.get_value(path, params).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| ApiError::Parse(format!("{}: {}", path, e))),
            None => Ok(None),
        }
    }

    /// Collect every item under `item_key` across all pages.
    ///
    /// **Algorithm:**
    /// 1. Request `offset`/`limit` pages of [`PAGE_LIMIT`] items
    /// 2. Stop on an empty page, or once the accumulated count reaches
    ///    `pagination.count`
    /// 3. Items that fail to decode are skipped with a warning
    ///
    /// A page that fails after retries fails the whole listing, so the caller
    /// never mistakes a truncated list for a complete one.
    pub async fn fetch_all_paginated<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        item_key: &str,
    ) -> Result<Vec<T>, ApiError> {
        let mut items: Vec<T> = Vec::new();
        let mut offset = 0usize;

        loop {
            let mut page_params = params.to_vec();
            page_params.push(("offset", offset.to_string()));
            page_params.push(("limit", PAGE_LIMIT.to_string()));

            let Some(page) = self.get_value(path, &page_params).await? else {
                break;
            };

            let raw = match page.get(item_key).and_then(Value::as_array) {
                Some(list) if !list.is_empty() => list.clone(),
                _ => break,
            };
            let fetched = raw.len();

            for item in raw {
                match serde_json::from_value::<T>(item) {
                    Ok(parsed) => items.push(parsed),
                    Err(e) => warn!(path, error = %e, "Skipping undecodable list item"),
                }
            }

            let total = page
                .get("pagination")
                .and_then(|p| p.get("count"))
                .and_then(Value::as_u64)
                .unwrap_or(0) as usize;

            offset += fetched;
            debug!(path, fetched = offset, total, "Fetched page");

            if offset >= total {
                break;
            }
        }

        Ok(items)
    }
}
