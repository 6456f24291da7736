mod common;

use std::sync::Arc;

use common::{hours, now, ATOM_BLOG, BROKEN, RDF_FEED, RSS_36H, RSS_DC_DATE, RSS_RECENT};
use news_briefing::ingest::collect;
use news_briefing::ingest::providers::FixtureFeedFetcher;
use news_briefing::ingest::sources::FeedCategory;
use news_briefing::sections::SectionTag;

fn titles(items: &[news_briefing::ingest::types::NewsItem]) -> Vec<&str> {
    items.iter().map(|i| i.title.as_str()).collect()
}

#[tokio::test]
async fn item_36h_old_is_found_after_widening_to_48h() {
    let fetcher = Arc::new(FixtureFeedFetcher::new().with_feed("https://world.example/rss", RSS_36H));
    let sources = vec![FeedCategory::new(
        "General News",
        SectionTag::General,
        &["https://world.example/rss"],
    )];

    let out = collect(&sources, fetcher, &[hours(24), hours(48)], now(), 4).await;

    assert_eq!(titles(&out.items), vec!["Central bank holds rates steady"]);
    assert_eq!(out.window, Some(hours(48)));
    assert!(out.failures.is_empty());
}

#[tokio::test]
async fn narrowest_non_empty_window_wins() {
    let fetcher = Arc::new(FixtureFeedFetcher::new().with_feed("https://tech.example/rss", RSS_RECENT));
    let sources = vec![FeedCategory::new(
        "IT/Tech",
        SectionTag::Tech,
        &["https://tech.example/rss"],
    )];

    let out = collect(&sources, fetcher, &[hours(24), hours(48)], now(), 4).await;

    // the 36h-old post-mortem would only appear in the 48h window
    assert_eq!(titles(&out.items), vec!["Chipmaker unveils 2nm roadmap"]);
    assert_eq!(out.window, Some(hours(24)));
    let item = &out.items[0];
    assert_eq!(item.category, "IT/Tech");
    assert_eq!(item.link, "https://tech.example/chips-2nm");
    assert_eq!(
        item.description.as_deref(),
        Some("The company said volume production starts next year.")
    );
}

#[tokio::test]
async fn undated_entries_never_appear_in_any_window() {
    let fetcher = Arc::new(
        FixtureFeedFetcher::new()
            .with_feed("https://tech.example/rss", RSS_RECENT)
            .with_feed("https://world.example/rss", RSS_36H),
    );
    let sources = vec![FeedCategory::new(
        "Mixed",
        SectionTag::General,
        &["https://tech.example/rss", "https://world.example/rss"],
    )];

    // a single very wide window
    let out = collect(&sources, fetcher, &[hours(24 * 3650)], now(), 4).await;

    assert_eq!(out.items.len(), 3);
    assert!(out.items.iter().all(|i| !i.title.starts_with("Undated")));
}

#[tokio::test]
async fn atom_updated_timestamp_is_used_when_published_is_missing() {
    let fetcher = Arc::new(FixtureFeedFetcher::new().with_feed("https://lab.example/feed.xml", ATOM_BLOG));
    let sources = vec![FeedCategory::new(
        "AI News",
        SectionTag::Tech,
        &["https://lab.example/feed.xml"],
    )];

    let out = collect(&sources, fetcher, &[hours(24), hours(48)], now(), 4).await;

    assert_eq!(titles(&out.items), vec!["New open-weights model released"]);
    assert_eq!(out.items[0].link, "https://lab.example/posts/open-weights");
    assert_eq!(out.items[0].published_at.to_rfc3339(), "2025-10-14T07:00:00+00:00");
}

#[tokio::test]
async fn rss_items_dated_only_by_dc_date_are_collected() {
    let fetcher = Arc::new(FixtureFeedFetcher::new().with_feed("https://daily.example/rss", RSS_DC_DATE));
    let sources = vec![FeedCategory::new(
        "General News",
        SectionTag::General,
        &["https://daily.example/rss"],
    )];

    let out = collect(&sources, fetcher, &[hours(24), hours(48)], now(), 4).await;

    // 06:30Z today fits 24h; the strike story (11:00Z two days ago) needs more than 48h
    assert_eq!(titles(&out.items), vec!["Assembly passes budget bill"]);
    assert_eq!(out.window, Some(hours(24)));
    let item = &out.items[0];
    assert_eq!(item.link, "https://daily.example/politics/1001");
    assert_eq!(item.published_at.to_rfc3339(), "2025-10-14T06:30:00+00:00");
    assert!(out.failures.is_empty());
}

#[tokio::test]
async fn namespaced_item_links_keep_every_entry() {
    let fetcher = Arc::new(FixtureFeedFetcher::new().with_feed("https://daily.example/rss", RSS_DC_DATE));
    let sources = vec![FeedCategory::new(
        "General News",
        SectionTag::General,
        &["https://daily.example/rss"],
    )];

    let out = collect(&sources, fetcher, &[hours(24 * 7)], now(), 4).await;

    let links: Vec<_> = out.items.iter().map(|i| i.link.as_str()).collect();
    assert_eq!(
        links,
        vec![
            "https://daily.example/politics/1001",
            "https://daily.example/economy/1002"
        ]
    );
    assert_eq!(out.items[0].title, "Assembly passes budget bill");
}

#[tokio::test]
async fn rss_1_0_feeds_are_collected() {
    let fetcher = Arc::new(FixtureFeedFetcher::new().with_feed("https://science.example/rss", RDF_FEED));
    let sources = vec![FeedCategory::new(
        "IT/Tech",
        SectionTag::Tech,
        &["https://science.example/rss"],
    )];

    let out = collect(&sources, fetcher, &[hours(24), hours(48)], now(), 4).await;

    assert_eq!(titles(&out.items), vec!["Fusion test sets energy record"]);
    assert_eq!(
        out.items[0].description.as_deref(),
        Some("The reactor held plasma for six minutes.")
    );
    assert!(out.failures.is_empty());
}

#[tokio::test]
async fn failing_sources_are_reported_and_do_not_block_others() {
    let fetcher = Arc::new(
        FixtureFeedFetcher::new()
            .with_feed("https://broken.example/rss", BROKEN)
            .with_feed("https://tech.example/rss", RSS_RECENT),
    );
    let sources = vec![
        FeedCategory::new(
            "General News",
            SectionTag::General,
            &["https://down.example/rss", "https://broken.example/rss"],
        ),
        FeedCategory::new("IT/Tech", SectionTag::Tech, &["https://tech.example/rss"]),
    ];

    let out = collect(&sources, fetcher, &[hours(24), hours(48)], now(), 2).await;

    assert_eq!(titles(&out.items), vec!["Chipmaker unveils 2nm roadmap"]);
    let failed: Vec<_> = out.failures.iter().map(|f| f.url.as_str()).collect();
    assert_eq!(
        failed,
        vec!["https://down.example/rss", "https://broken.example/rss"]
    );
    assert!(out
        .failures
        .iter()
        .all(|f| f.categories == vec!["General News".to_string()]));
    assert!(out.failures[0].reason.contains("no fixture"));
}

#[tokio::test]
async fn everything_unreachable_is_an_empty_result_not_an_error() {
    let fetcher = Arc::new(FixtureFeedFetcher::new());
    let sources = vec![FeedCategory::new(
        "General News",
        SectionTag::General,
        &["https://a.example/rss", "https://b.example/rss"],
    )];

    let out = collect(&sources, fetcher, &[hours(24), hours(48)], now(), 4).await;

    assert!(out.is_empty());
    assert_eq!(out.window, None);
    assert_eq!(out.failures.len(), 2);
}

#[tokio::test]
async fn shared_url_is_fetched_once_and_listed_under_each_category_in_order() {
    let fetcher = Arc::new(FixtureFeedFetcher::new().with_feed("https://tech.example/rss", RSS_RECENT));
    let sources = vec![
        FeedCategory::new("AI News", SectionTag::Tech, &["https://tech.example/rss"]),
        FeedCategory::new("IT/Tech", SectionTag::Tech, &["https://tech.example/rss"]),
    ];

    let out = collect(&sources, fetcher.clone(), &[hours(24)], now(), 4).await;

    assert_eq!(fetcher.calls(), 1);
    let cats: Vec<_> = out.items.iter().map(|i| i.category.as_str()).collect();
    assert_eq!(cats, vec!["AI News", "IT/Tech"]);
}

#[tokio::test]
async fn failure_of_a_shared_url_names_every_category() {
    let fetcher = Arc::new(FixtureFeedFetcher::new());
    let sources = vec![
        FeedCategory::new("AI News", SectionTag::Tech, &["https://gone.example/rss"]),
        FeedCategory::new("IT/Tech", SectionTag::Tech, &["https://gone.example/rss"]),
    ];

    let out = collect(&sources, fetcher.clone(), &[hours(24)], now(), 4).await;

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(out.failures.len(), 1);
    assert_eq!(out.failures[0].categories, vec!["AI News", "IT/Tech"]);
}
