// src/ingest/providers/http_feed.rs
use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::BriefingConfig;
use crate::ingest::parse::parse_feed;
use crate::ingest::types::{FeedEntry, FeedFetcher};

/// Fetches feeds over HTTP and parses them as RSS or Atom.
pub struct HttpFeedFetcher {
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(cfg: &BriefingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&cfg.user_agent)
            .timeout(cfg.request_timeout())
            .build()
            .context("building feed http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>> {
        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("feed http get {url}"))?
            .error_for_status()
            .with_context(|| format!("feed http status {url}"))?
            .text()
            .await
            .context("feed http .text()")?;
        parse_feed(&body).with_context(|| format!("feed body from {url}"))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
