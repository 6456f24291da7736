// src/ingest/providers/fixture.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::ingest::parse::parse_feed;
use crate::ingest::types::{FeedEntry, FeedFetcher};

/// Serves feed documents from memory, keyed by URL. Unknown URLs fail like an
/// unreachable host would.
#[derive(Default)]
pub struct FixtureFeedFetcher {
    feeds: HashMap<String, String>,
    calls: AtomicUsize,
}

impl FixtureFeedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, url: &str, xml: &str) -> Self {
        self.feeds.insert(url.to_string(), xml.to_string());
        self
    }

    /// Number of fetches served so far, including failures.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedFetcher for FixtureFeedFetcher {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let xml = self
            .feeds
            .get(url)
            .ok_or_else(|| anyhow!("no fixture registered for {url}"))?;
        parse_feed(xml)
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
