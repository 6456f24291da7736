// src/ingest/parse.rs
//! RSS 0.9x/2.0, RSS 1.0 (RDF) and Atom parsing on top of quick-xml's serde support.
//!
//! quick-xml matches element names without their namespace prefix, so
//! `<dc:date>` arrives as `date` and `<atom:link>` as `link`. Fields that
//! extension namespaces commonly repeat are read as lists.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::ingest::normalize_text;
use crate::ingest::types::FeedEntry;

const DESCRIPTION_MAX_CHARS: usize = 600;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<RssItem>,
}

/// RSS 1.0: items are siblings of `<channel>` under `<rdf:RDF>`.
#[derive(Debug, Deserialize)]
struct RdfFeed {
    #[serde(rename = "item", default)]
    item: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    #[serde(default)]
    title: Vec<RssText>,
    #[serde(default)]
    link: Vec<RssText>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    /// `<dc:date>`, W3C-DTF (RFC 3339 profile).
    #[serde(rename = "date", default)]
    dc_date: Vec<String>,
    #[serde(default)]
    description: Vec<RssText>,
}

/// Text element that may also be an empty namespaced element such as
/// `<atom:link href=".." rel="self"/>` or `<media:title>`.
#[derive(Debug, Deserialize)]
struct RssText {
    #[serde(rename = "$text", default)]
    value: Option<String>,
    #[serde(rename = "@href", default)]
    href: Option<String>,
    #[serde(rename = "@rel", default)]
    rel: Option<String>,
}

impl RssItem {
    fn first_text(list: &[RssText]) -> Option<&str> {
        list.iter()
            .filter_map(|t| t.value.as_deref())
            .map(str::trim)
            .find(|v| !v.is_empty())
    }

    /// Plain `<link>` text first, then an alternate `href`; `rel="self"` never wins.
    fn item_link(&self) -> Option<String> {
        Self::first_text(&self.link)
            .map(str::to_string)
            .or_else(|| {
                self.link
                    .iter()
                    .filter(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
                    .find_map(|l| l.href.as_deref().map(str::trim).filter(|h| !h.is_empty()))
                    .map(str::to_string)
            })
    }
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(default)]
    title: Vec<AtomText>,
    #[serde(rename = "link", default)]
    link: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
    #[serde(default)]
    summary: Vec<AtomText>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl AtomEntry {
    /// `rel="alternate"` (or no rel) wins over other link relations.
    fn alternate_link(&self) -> Option<String> {
        self.link
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| self.link.first())
            .and_then(|l| l.href.clone())
    }
}

/// Parse an RSS (0.9x, 1.0 or 2.0) or Atom document into entries.
///
/// Entries without a title or link are skipped; entries without timestamps are
/// kept here and filtered by the collector.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let xml_clean = scrub_html_entities_for_xml(xml);
    let root = root_element(&xml_clean).ok_or_else(|| anyhow!("empty or non-XML feed body"))?;

    let raw: Vec<FeedEntry> = match root.as_str() {
        "rss" => {
            let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;
            rss.channel.item.into_iter().filter_map(rss_entry).collect()
        }
        "RDF" => {
            let rdf: RdfFeed = from_str(&xml_clean).context("parsing rdf xml")?;
            rdf.item.into_iter().filter_map(rss_entry).collect()
        }
        "feed" => {
            let atom: AtomFeed = from_str(&xml_clean).context("parsing atom xml")?;
            atom.entry.into_iter().filter_map(atom_entry).collect()
        }
        other => return Err(anyhow!("unsupported feed root element <{other}>")),
    };
    Ok(raw)
}

fn rss_entry(it: RssItem) -> Option<FeedEntry> {
    let title = normalize_text(RssItem::first_text(&it.title)?, usize::MAX);
    let link = it.item_link()?;
    if title.is_empty() {
        return None;
    }
    Some(FeedEntry {
        title,
        description: clean_description(RssItem::first_text(&it.description)),
        link,
        published: it.pub_date.as_deref().and_then(parse_timestamp),
        updated: it.dc_date.iter().find_map(|d| parse_timestamp(d)),
    })
}

fn atom_entry(it: AtomEntry) -> Option<FeedEntry> {
    let link = it.alternate_link()?.trim().to_string();
    let title = normalize_text(&it.title.first()?.value, usize::MAX);
    if title.is_empty() || link.is_empty() {
        return None;
    }
    Some(FeedEntry {
        title,
        description: clean_description(it.summary.first().map(|s| s.value.as_str())),
        link,
        published: it.published.as_deref().and_then(parse_timestamp),
        updated: it.updated.as_deref().and_then(parse_timestamp),
    })
}

fn clean_description(raw: Option<&str>) -> Option<String> {
    raw.map(|d| normalize_text(d, DESCRIPTION_MAX_CHARS))
        .filter(|d| !d.is_empty())
}

/// Accepts RFC 2822 (RSS) and RFC 3339 (Atom) in either field; always returns UTC.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    let parsed = OffsetDateTime::parse(ts, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .ok();
    match parsed {
        Some(dt) => DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), dt.nanosecond()),
        // legacy zone names such as "GMT" or "EST"
        None => DateTime::parse_from_rfc2822(ts)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
    }
}

fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned())
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

// HTML entities that feeds leak into XML and quick-xml rejects.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&hellip;", "...")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&middot;", "·")
}
