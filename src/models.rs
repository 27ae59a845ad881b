//! Data types shared by the fetch, persistence, and sampling commands.
//!
//! Card objects themselves are schema-less [`Record`]s from the core crate;
//! the types here describe how they arrive (pages) and how they are stored
//! (documents).

use chrono::{DateTime, Utc};
use mtg_sampler_core::Record;
use serde::{Deserialize, Serialize};

/// Pagination hints parsed from API response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pagination {
    /// `Total-Count`: records in the whole collection.
    pub total_count: Option<u64>,
    /// `Page-Size`: records per page as applied by the server.
    pub page_size: Option<u64>,
    /// Page number of the `rel="last"` entry in the `Link` header.
    pub last_page: Option<u32>,
    /// `Ratelimit-Remaining`: requests left in the current window.
    pub ratelimit_remaining: Option<u64>,
}

/// One page of records returned by a [`CardSource`](crate::fetch::CardSource).
#[derive(Debug, Clone, Default)]
pub struct CardPage {
    pub cards: Vec<Record>,
    pub pagination: Pagination,
}

/// Every record fetched from a source, in page order.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub records: Vec<Record>,
    /// Server-reported collection size, when the server sent one.
    pub total_count: Option<u64>,
    pub pages_fetched: u32,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// On-disk JSON document: `{"cards": [...]}`.
///
/// Used for both the full dataset and the sample. `fetched_at` is only
/// written for datasets produced by `mtgs collect`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CardDocument {
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
    pub cards: Vec<Record>,
}

/// Write-side view of a [`CardDocument`] that borrows its cards.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CardDocumentRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
    pub cards: &'a [Record],
}
