//! Collects the feeds and prints the prompt that would be sent, without calling
//! the generator or the webhook.

use std::sync::Arc;

use news_briefing::ingest::providers::HttpFeedFetcher;
use news_briefing::ingest::{collect, sources::default_sources};
use news_briefing::prompt::{build_prompt, no_news_message, PromptTemplate};
use news_briefing::{init_tracing, BriefingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = BriefingConfig::load_default()?;
    let sources = default_sources();
    let windows = cfg.lookback_windows();
    let fetcher = Arc::new(HttpFeedFetcher::new(&cfg)?);

    let collection = collect(
        &sources,
        fetcher,
        &windows,
        chrono::Utc::now(),
        cfg.max_concurrent_fetches,
    )
    .await;

    for failure in &collection.failures {
        eprintln!(
            "skipped [{}] {}: {}",
            failure.categories.join(", "),
            failure.url,
            failure.reason
        );
    }

    let template = PromptTemplate::from_sources(&sources, cfg.stories_per_section);
    match build_prompt(&collection.items, &template) {
        Some(prompt) => println!("{prompt}"),
        None => println!("{}", no_news_message(windows.last().copied())),
    }
    Ok(())
}
