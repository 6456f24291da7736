// src/prompt.rs
//! Prompt construction for the briefing generator.

use std::fmt::Write as _;
use std::time::Duration;

use crate::ingest::sources::FeedCategory;
use crate::ingest::types::NewsItem;
use crate::sections::SectionTag;

/// Fixed instruction parameters. The item listing is appended per run.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub stories_per_section: usize,
    /// Advertised sections with the categories that feed them.
    pub sections: Vec<(SectionTag, Vec<String>)>,
}

impl PromptTemplate {
    pub fn from_sources(sources: &[FeedCategory], stories_per_section: usize) -> Self {
        let sections = SectionTag::ADVERTISED
            .into_iter()
            .map(|tag| {
                let categories = sources
                    .iter()
                    .filter(|c| c.section == tag)
                    .map(|c| c.name.clone())
                    .collect();
                (tag, categories)
            })
            .collect();
        Self {
            stories_per_section,
            sections,
        }
    }

    fn instructions(&self) -> String {
        let mut out = String::new();
        out.push_str(
            "You are a news editor writing a daily briefing for a chat channel.\n\
             Use ONLY the news items listed below. Do not add facts from outside the list.\n\n",
        );
        let _ = writeln!(
            out,
            "Write one section per category group below. Pick at most {} of the most important stories for each section.",
            self.stories_per_section
        );
        out.push_str(
            "Start every section with its delimiter line, exactly as written, on a line of its own:\n",
        );
        for (tag, categories) in &self.sections {
            let _ = writeln!(
                out,
                "{}  -> {} (categories: {})",
                tag.delimiter(),
                tag.title(),
                if categories.is_empty() {
                    "none".to_string()
                } else {
                    categories.join(", ")
                }
            );
        }
        out.push_str(
            "\nRules:\n\
             - Skip a section entirely (no delimiter) if it has no stories.\n\
             - One bullet per story: a bold headline, then one or two neutral sentences.\n\
             - Cite every story inline as [source title](link) using the link given for it.\n\
             - Keep each section under 1500 characters. No preamble, no sign-off.\n\n\
             News items:\n",
        );
        out
    }
}

/// Render the full prompt. `None` when there is nothing to brief on; the caller
/// sends [`no_news_message`] instead of calling the generator.
pub fn build_prompt(items: &[NewsItem], template: &PromptTemplate) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let mut out = template.instructions();
    for item in items {
        let _ = writeln!(out, "- [{}] {} (link: {})", item.category, item.title, item.link);
    }
    Some(out)
}

pub fn no_news_message(widest_window: Option<Duration>) -> String {
    let hours = widest_window.map(|w| w.as_secs() / 3600).unwrap_or(24);
    format!("No new stories were published in the last {hours} hours. Nothing to brief today.")
}
