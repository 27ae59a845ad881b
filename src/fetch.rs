//! Paginated card fetching.
//!
//! A [`CardSource`] returns one page of card records at a time; [`fetch_all`]
//! walks the pages in order and accumulates them into a [`Corpus`].
//!
//! The built-in [`HttpCardSource`] talks to the public
//! `api.magicthegathering.io` REST API:
//!
//! ```text
//! GET {base_url}/{resource}?page=N&pageSize=M
//!
//! Link: <…/cards?page=2>; rel="next", <…/cards?page=623>; rel="last"
//! Total-Count: 62295
//! Page-Size: 100
//! Ratelimit-Remaining: 4999
//!
//! {"cards": [{"name": "Ancestor's Chosen", "multiverseid": "130550", …}, …]}
//! ```
//!
//! # Termination
//!
//! The last page number comes from the `rel="last"` entry of the `Link`
//! header. If the server never sends one, fetching stops at the first page
//! shorter than its `Page-Size`, or at the first empty page. An optional
//! `max_pages` cap stops earlier.
//!
//! Pages are requested serially and a failed request aborts the run; there is
//! no retry or backoff.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use mtg_sampler_core::Record;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::models::{CardPage, Corpus, Pagination};
use crate::progress::{FetchProgressEvent, FetchProgressReporter};

/// A paginated source of card records.
///
/// Implement this trait to feed [`fetch_all`] from something other than the
/// HTTP API (a fixture, a mirror, an in-memory list in tests).
#[async_trait]
pub trait CardSource: Send + Sync {
    /// Short label used in progress output and error context (e.g. `"cards"`).
    fn name(&self) -> &str;

    /// One-line description of the source.
    fn description(&self) -> &str;

    /// Fetch page `page` (1-based).
    async fn fetch_page(&self, page: u32) -> Result<CardPage>;
}

/// Fetch every page of `source` in order.
///
/// Stops after the page announced as last, at the first short or empty
/// page, or after `max_pages` pages, whichever comes first.
pub async fn fetch_all(
    source: &dyn CardSource,
    max_pages: Option<u32>,
    reporter: &dyn FetchProgressReporter,
) -> Result<Corpus> {
    let mut corpus = Corpus::default();
    let mut last_page: Option<u32> = None;
    let mut page: u32 = 1;

    loop {
        if let Some(max) = max_pages {
            if page > max {
                if last_page.map_or(true, |last| last > max) {
                    warn!(
                        source = source.name(),
                        max_pages = max,
                        last_page = ?last_page,
                        "stopping at max_pages; corpus is truncated"
                    );
                }
                break;
            }
        }

        reporter.report(FetchProgressEvent::Fetching {
            source: source.name().to_string(),
            page,
            last_page,
        });

        let fetched = source
            .fetch_page(page)
            .await
            .with_context(|| format!("failed to fetch page {} from {}", page, source.name()))?;
        corpus.pages_fetched += 1;

        let pagination = fetched.pagination;
        if let Some(remaining) = pagination.ratelimit_remaining {
            debug!(page, remaining, "rate limit remaining");
        }
        if pagination.last_page.is_some() {
            last_page = pagination.last_page;
        }
        if corpus.total_count.is_none() {
            corpus.total_count = pagination.total_count;
        }

        if fetched.cards.is_empty() {
            debug!(page, "empty page, stopping");
            break;
        }
        let received = fetched.cards.len() as u64;
        corpus.records.extend(fetched.cards);

        match last_page {
            Some(last) if page >= last => break,
            None if pagination.page_size.is_some_and(|size| received < size) => {
                debug!(page, received, "short page without Link, stopping");
                break;
            }
            _ => {}
        }
        page += 1;
    }

    if let Some(total) = corpus.total_count {
        if max_pages.is_none() && total != corpus.records.len() as u64 {
            warn!(
                source = source.name(),
                expected = total,
                fetched = corpus.records.len(),
                "fetched record count differs from Total-Count"
            );
        }
    }

    reporter.report(FetchProgressEvent::Done {
        source: source.name().to_string(),
        pages: corpus.pages_fetched,
        records: corpus.records.len() as u64,
    });

    Ok(corpus)
}

// ============ HTTP Source ============

/// [`CardSource`] backed by the card REST API.
pub struct HttpCardSource {
    client: reqwest::Client,
    base_url: String,
    resource: String,
    page_size: u32,
}

impl HttpCardSource {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(api.user_agent.clone())
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            resource: api.resource.clone(),
            page_size: api.page_size,
        })
    }

    pub fn page_url(&self, page: u32) -> String {
        format!(
            "{}/{}?page={}&pageSize={}",
            self.base_url, self.resource, page, self.page_size
        )
    }
}

#[async_trait]
impl CardSource for HttpCardSource {
    fn name(&self) -> &str {
        &self.resource
    }

    fn description(&self) -> &str {
        "Paginated card catalogue over HTTP"
    }

    async fn fetch_page(&self, page: u32) -> Result<CardPage> {
        let url = self.page_url(page);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("GET {} returned an error status", url))?;

        let pagination = pagination_from_headers(response.headers());
        let body: serde_json::Value = response
            .json()
            .await
            .with_context(|| format!("page {} is not valid JSON", page))?;

        Ok(CardPage {
            cards: records_from_page(body, &self.resource)?,
            pagination,
        })
    }
}

/// Pull the record array stored under `key` out of a page body.
pub fn records_from_page(mut body: serde_json::Value, key: &str) -> Result<Vec<Record>> {
    let Some(items) = body.get_mut(key).map(serde_json::Value::take) else {
        bail!("page body has no '{}' field", key);
    };
    if !items.is_array() {
        bail!("page field '{}' is not an array", key);
    }
    serde_json::from_value(items).with_context(|| format!("'{}' contains a non-object entry", key))
}

pub fn pagination_from_headers(headers: &HeaderMap) -> Pagination {
    Pagination {
        total_count: header_u64(headers, "total-count"),
        page_size: header_u64(headers, "page-size"),
        last_page: headers
            .get("link")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_last_page),
        ratelimit_remaining: header_u64(headers, "ratelimit-remaining"),
    }
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Page number of the `rel="last"` entry of an RFC 8288 `Link` header.
pub fn parse_last_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_last = params.split(';').any(|p| {
            let p = p.trim();
            p == "rel=\"last\"" || p == "rel=last"
        });
        if !is_last {
            return None;
        }
        let url = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        let (_, query) = url.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == "page")
            .and_then(|(_, v)| v.parse().ok())
    })
}
