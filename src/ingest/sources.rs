// src/ingest/sources.rs
//! Built-in feed taxonomy. Categories are listed in the order stories should
//! appear in the prompt.

use crate::sections::SectionTag;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedCategory {
    pub name: String,
    /// Briefing section this category's stories belong to.
    pub section: SectionTag,
    pub urls: Vec<String>,
}

impl FeedCategory {
    pub fn new(name: &str, section: SectionTag, urls: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            section,
            urls: urls.iter().map(|u| u.to_string()).collect(),
        }
    }
}

pub fn default_sources() -> Vec<FeedCategory> {
    vec![
        FeedCategory::new(
            "AI News",
            SectionTag::Tech,
            &[
                "https://openai.com/news/rss.xml",
                "https://deepmind.google/blog/rss.xml",
                "https://machinelearning.apple.com/rss.xml",
                "https://techcrunch.com/category/artificial-intelligence/feed/",
                "https://www.theverge.com/ai-artificial-intelligence/rss/index.xml",
            ],
        ),
        FeedCategory::new(
            "IT/Tech",
            SectionTag::Tech,
            &[
                "https://m.etnews.com/news/section_rss.html?id1=20",
                "https://www.zdnet.co.kr/rss/all.xml",
                "https://feeds.feedburner.com/TheHackersNews",
            ],
        ),
        FeedCategory::new(
            "General News",
            SectionTag::General,
            &[
                "https://fs.jtbc.co.kr/RSS/newsflash.xml",
                "https://www.hani.co.kr/rss/",
                "https://www.reutersagency.com/feed/?best-topics=top-news&post_type=best",
            ],
        ),
    ]
}
