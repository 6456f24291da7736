pub mod fixture;
pub mod http_feed;

pub use fixture::FixtureFeedFetcher;
pub use http_feed::HttpFeedFetcher;
