//! Daily news briefing: collect feeds, write the briefing, post it to the webhook.
//! Runs once and exits; schedule it externally (cron, CI).

use std::sync::Arc;

use anyhow::Result;
use news_briefing::generate::{GeminiClient, GenerationService};
use news_briefing::ingest::providers::HttpFeedFetcher;
use news_briefing::ingest::sources::default_sources;
use news_briefing::notify::{DiscordWebhook, WebhookTransport};
use news_briefing::{
    init_tracing, run_once, BriefingConfig, BriefingOutcome, Collaborators, Credentials,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env locally; no-op when the file is absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(e) = run().await {
        error!(error = ?e, "briefing run failed");
        return Err(e);
    }
    Ok(())
}

async fn run() -> Result<()> {
    let cfg = BriefingConfig::load_default()?;
    let creds = Credentials::from_env();
    info!(credentials = ?creds, windows = ?cfg.lookback_hours, "starting briefing run");

    let fetcher = Arc::new(HttpFeedFetcher::new(&cfg)?);
    let generator = match creds.api_key {
        Some(key) => Some(GeminiClient::new(key, &cfg)?),
        None => None,
    };
    let transport = creds
        .webhook_url
        .map(|url| DiscordWebhook::new(url).with_timeout(cfg.request_timeout()));

    let report = run_once(
        &cfg,
        &default_sources(),
        Collaborators {
            fetcher,
            generator: generator.as_ref().map(|g| g as &dyn GenerationService),
            transport: transport.as_ref().map(|t| t as &dyn WebhookTransport),
        },
        chrono::Utc::now(),
    )
    .await;

    let outcome = match &report.outcome {
        BriefingOutcome::NoNews => "no-news",
        BriefingOutcome::MissingApiKey => "missing-api-key",
        BriefingOutcome::Generated(g) => g.model().unwrap_or("fallback-message"),
    };
    info!(
        items = report.items_collected,
        failed_sources = report.source_failures.len(),
        outcome,
        sent = report.delivery.sent,
        "briefing run finished"
    );
    Ok(())
}
