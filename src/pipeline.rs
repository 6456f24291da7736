// src/pipeline.rs
//! One end-to-end briefing run: collect -> prompt -> generate -> deliver.

use chrono::{DateTime, Utc};
use metrics::gauge;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::BriefingConfig;
use crate::generate::{self, Generated, GenerationService, MISSING_API_KEY};
use crate::ingest::{self, sources::FeedCategory, types::FeedFetcher, types::SourceFailure};
use crate::notify::{self, DeliveryOptions, DeliveryReport, WebhookTransport};
use crate::prompt::{build_prompt, no_news_message, PromptTemplate};

/// What the generation stage ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BriefingOutcome {
    /// Nothing collected; the no-news notice was sent and the generator never called.
    NoNews,
    /// No API key; a placeholder was sent.
    MissingApiKey,
    Generated(Generated),
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub items_collected: usize,
    pub window_used: Option<Duration>,
    pub source_failures: Vec<SourceFailure>,
    pub outcome: BriefingOutcome,
    pub delivery: DeliveryReport,
}

/// Collaborators for one run. `generator` and `transport` are absent when the
/// matching credential is missing.
pub struct Collaborators<'a> {
    pub fetcher: Arc<dyn FeedFetcher>,
    pub generator: Option<&'a dyn GenerationService>,
    pub transport: Option<&'a dyn WebhookTransport>,
}

pub async fn run_once(
    cfg: &BriefingConfig,
    sources: &[FeedCategory],
    deps: Collaborators<'_>,
    now: DateTime<Utc>,
) -> RunReport {
    ingest::ensure_metrics_described();
    let windows = cfg.lookback_windows();

    let collection = ingest::collect(
        sources,
        deps.fetcher,
        &windows,
        now,
        cfg.max_concurrent_fetches,
    )
    .await;
    info!(
        items = collection.items.len(),
        failed_sources = collection.failures.len(),
        "collection finished"
    );

    let template = PromptTemplate::from_sources(sources, cfg.stories_per_section);
    let (outcome, content) = match build_prompt(&collection.items, &template) {
        None => (
            BriefingOutcome::NoNews,
            no_news_message(windows.last().copied()),
        ),
        Some(prompt) => match deps.generator {
            None => (BriefingOutcome::MissingApiKey, MISSING_API_KEY.to_string()),
            Some(service) => {
                let generated =
                    generate::generate_briefing(service, &prompt, &cfg.model_preference).await;
                let content = generated.clone().into_content();
                (BriefingOutcome::Generated(generated), content)
            }
        },
    };

    let opts = DeliveryOptions {
        username: cfg.username.clone(),
        max_message_chars: cfg.max_message_chars,
    };
    let delivery = notify::deliver(&content, deps.transport, &opts).await;

    gauge!("briefing_last_run_ts").set(now.timestamp() as f64);
    info!(
        sent = delivery.sent,
        failed = delivery.failed,
        truncated = delivery.truncated,
        "delivery finished"
    );

    RunReport {
        items_collected: collection.items.len(),
        window_used: collection.window,
        source_failures: collection.failures,
        outcome,
        delivery,
    }
}
