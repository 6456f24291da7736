// src/ingest/mod.rs
pub mod parse;
pub mod providers;
pub mod sources;
pub mod types;

use crate::ingest::sources::FeedCategory;
use crate::ingest::types::{FeedEntry, FeedFetcher, NewsItem, SourceFailure, SourceReport};
use chrono::{DateTime, Utc};
use metrics::{counter, describe_counter, describe_gauge};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// One-time metrics registration (so series show up once a recorder is installed).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "briefing_feed_errors_total",
            "Feed fetch/parse errors, one per failing URL."
        );
        describe_counter!(
            "briefing_items_collected_total",
            "Items kept inside the lookback window actually used."
        );
        describe_counter!(
            "briefing_model_attempts_total",
            "Generation calls issued, across all candidates."
        );
        describe_counter!(
            "briefing_model_failures_total",
            "Generation calls that failed and advanced the queue."
        );
        describe_counter!(
            "briefing_messages_sent_total",
            "Webhook messages delivered."
        );
        describe_counter!(
            "briefing_messages_failed_total",
            "Webhook messages that could not be delivered."
        );
        describe_gauge!("briefing_last_run_ts", "Unix ts when the pipeline last ran.");
    });
}

/// Normalize text: decode entities, strip tags, collapse whitespace, cap length.
pub fn normalize_text(s: &str, max_chars: usize) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 4) Length cap
    if out.chars().count() > max_chars {
        out = out.chars().take(max_chars).collect::<String>().trim_end().to_string();
        out.push('…');
    }

    out
}

/// Result of one collection run.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Items for `window`, in category declaration order, then feed order.
    pub items: Vec<NewsItem>,
    /// Window that produced `items`; `None` when every window came back empty.
    pub window: Option<Duration>,
    pub failures: Vec<SourceFailure>,
}

impl Collection {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Fetch every source once, then widen the lookback window until one yields items.
///
/// `windows` must be in increasing order. A failing source is reported in
/// [`Collection::failures`] and never blocks the others.
pub async fn collect(
    sources: &[FeedCategory],
    fetcher: Arc<dyn FeedFetcher>,
    windows: &[Duration],
    now: DateTime<Utc>,
    max_concurrent_fetches: usize,
) -> Collection {
    ensure_metrics_described();

    let reports = fetch_all(sources, fetcher, max_concurrent_fetches).await;

    let mut failures = Vec::new();
    let mut entries_by_url: HashMap<&str, &[FeedEntry]> = HashMap::new();
    for report in &reports {
        match &report.outcome {
            Ok(entries) => {
                tracing::debug!(url = %report.url, entries = entries.len(), "feed fetched");
                entries_by_url.insert(report.url.as_str(), entries.as_slice());
            }
            Err(reason) => {
                tracing::warn!(url = %report.url, categories = ?report.categories, error = %reason, "feed skipped");
                counter!("briefing_feed_errors_total").increment(1);
                failures.push(SourceFailure {
                    categories: report.categories.clone(),
                    url: report.url.clone(),
                    reason: reason.clone(),
                });
            }
        }
    }

    for window in windows {
        let items = select_window(sources, &entries_by_url, now, *window);
        tracing::info!(
            window_hours = window.as_secs() / 3600,
            items = items.len(),
            "lookback window evaluated"
        );
        if !items.is_empty() {
            counter!("briefing_items_collected_total").increment(items.len() as u64);
            return Collection {
                items,
                window: Some(*window),
                failures,
            };
        }
    }

    Collection {
        items: Vec::new(),
        window: None,
        failures,
    }
}

/// Items strictly newer than `now - window`, in declared category/URL order.
pub fn select_window(
    sources: &[FeedCategory],
    entries_by_url: &HashMap<&str, &[FeedEntry]>,
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<NewsItem> {
    let cutoff = chrono::Duration::from_std(window)
        .ok()
        .and_then(|w| now.checked_sub_signed(w))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let mut out = Vec::new();
    for category in sources {
        for url in &category.urls {
            let Some(entries) = entries_by_url.get(url.as_str()) else {
                continue;
            };
            for entry in entries.iter() {
                let Some(ts) = entry.timestamp() else {
                    continue;
                };
                if ts > cutoff {
                    out.push(NewsItem {
                        category: category.name.clone(),
                        title: entry.title.clone(),
                        description: entry.description.clone(),
                        link: entry.link.clone(),
                        published_at: ts,
                    });
                }
            }
        }
    }
    out
}

/// Fetch each distinct URL once, concurrently, and return reports in declared order.
async fn fetch_all(
    sources: &[FeedCategory],
    fetcher: Arc<dyn FeedFetcher>,
    max_concurrent_fetches: usize,
) -> Vec<SourceReport> {
    tracing::debug!(fetcher = fetcher.name(), "fetching feeds");
    let permits = Arc::new(Semaphore::new(max_concurrent_fetches.max(1)));
    let mut slot_by_url: HashMap<&str, usize> = HashMap::new();
    let mut handles: Vec<(Vec<String>, String, JoinHandle<anyhow::Result<Vec<FeedEntry>>>)> = Vec::new();

    for category in sources {
        for url in &category.urls {
            if let Some(&slot) = slot_by_url.get(url.as_str()) {
                let categories: &mut Vec<String> = &mut handles[slot].0;
                if !categories.contains(&category.name) {
                    categories.push(category.name.clone());
                }
                continue;
            }
            slot_by_url.insert(url.as_str(), handles.len());
            let fetcher = Arc::clone(&fetcher);
            let permits = Arc::clone(&permits);
            let task_url = url.clone();
            let handle = tokio::spawn(async move {
                let _permit = permits.acquire_owned().await;
                fetcher.fetch_entries(&task_url).await
            });
            handles.push((vec![category.name.clone()], url.clone(), handle));
        }
    }

    let mut reports = Vec::with_capacity(handles.len());
    for (categories, url, handle) in handles {
        let outcome = match handle.await {
            Ok(Ok(entries)) => Ok(entries),
            Ok(Err(e)) => Err(format!("{e:#}")),
            Err(e) => Err(format!("fetch task failed: {e}")),
        };
        reports.push(SourceReport {
            categories,
            url,
            outcome,
        });
    }
    reports
}
