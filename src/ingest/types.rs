// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// One entry as parsed from a feed document, before any window filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl FeedEntry {
    /// Published, else updated. `None` means the entry cannot be placed in time.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.published.or(self.updated)
    }
}

/// A collected story, tagged with the category of the feed it came from.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NewsItem {
    pub category: String,
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub published_at: DateTime<Utc>,
}

/// Outcome of reading one feed URL.
#[derive(Debug, Clone)]
pub struct SourceReport {
    /// Every category that lists this URL, in declaration order.
    pub categories: Vec<String>,
    pub url: String,
    pub outcome: std::result::Result<Vec<FeedEntry>, String>,
}

impl SourceReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Failed source as surfaced to callers; the entries of healthy sources are unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    /// Every category that lists the URL; a shared URL fails once for all of them.
    pub categories: Vec<String>,
    pub url: String,
    pub reason: String,
}

#[async_trait::async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>>;
    fn name(&self) -> &'static str;
}
