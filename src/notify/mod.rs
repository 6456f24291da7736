// src/notify/mod.rs
//! Delivery splitter: one webhook message per briefing section.

pub mod discord;

use anyhow::Result;
use metrics::counter;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::sections::{split_sections, BriefingSection};

pub use discord::DiscordWebhook;

/// Appended when a section had to be cut to fit the message ceiling.
pub const TRUNCATION_MARKER: &str = "\n\n…(truncated, message too long)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub content: String,
    pub username: String,
}

#[async_trait::async_trait]
pub trait WebhookTransport: Send + Sync {
    async fn post(&self, payload: &WebhookPayload) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct DeliveryOptions {
    pub username: String,
    pub max_message_chars: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
    pub truncated: usize,
}

/// `header` + blank line + `body`, cut so the result never exceeds `max_chars`.
///
/// Returns the message and whether the body was truncated.
pub fn fit_message(header: &str, body: &str, max_chars: usize) -> (String, bool) {
    let full = format!("{header}\n\n{body}");
    if full.chars().count() <= max_chars {
        return (full, false);
    }

    let marker_len = TRUNCATION_MARKER.chars().count();
    let fixed = header.chars().count() + 2 + marker_len;
    if fixed > max_chars {
        // no room for any body: shorten the header so the marker survives whole
        let header_budget = max_chars.saturating_sub(2 + marker_len);
        let short: String = header.chars().take(header_budget).collect();
        let msg = format!("{short}\n\n{TRUNCATION_MARKER}");
        // only a ceiling below the marker itself cuts into it
        return (msg.chars().take(max_chars).collect(), true);
    }

    let kept: String = body.chars().take(max_chars - fixed).collect();
    (format!("{header}\n\n{}{TRUNCATION_MARKER}", kept.trim_end()), true)
}

/// Render the sections of `text` into ready-to-send payloads, in source order.
pub fn render_messages(text: &str, opts: &DeliveryOptions) -> (Vec<(BriefingSection, WebhookPayload)>, usize) {
    let mut truncated = 0;
    let mut out = Vec::new();
    for section in split_sections(text) {
        let (content, was_cut) =
            fit_message(section.tag.header(), &section.body, opts.max_message_chars);
        if was_cut {
            truncated += 1;
            debug!(section = %section.name, "section truncated to fit message ceiling");
        }
        out.push((
            section,
            WebhookPayload {
                content,
                username: opts.username.clone(),
            },
        ));
    }
    (out, truncated)
}

/// Best effort: every section is attempted even if earlier ones fail. Errors are
/// logged and counted, never returned.
pub async fn deliver(
    text: &str,
    transport: Option<&dyn WebhookTransport>,
    opts: &DeliveryOptions,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    if text.trim().is_empty() {
        debug!("nothing to deliver");
        return report;
    }
    let Some(transport) = transport else {
        warn!("no webhook configured; briefing not delivered");
        return report;
    };

    let (messages, truncated) = render_messages(text, opts);
    report.truncated = truncated;

    for (section, payload) in &messages {
        match transport.post(payload).await {
            Ok(()) => {
                report.sent += 1;
                counter!("briefing_messages_sent_total").increment(1);
                info!(section = %section.name, chars = payload.content.chars().count(), "section delivered");
            }
            Err(e) => {
                report.failed += 1;
                counter!("briefing_messages_failed_total").increment(1);
                warn!(section = %section.name, error = ?e, "section delivery failed");
            }
        }
    }
    report
}
