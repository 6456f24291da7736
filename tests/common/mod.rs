#![allow(dead_code)]
// Shared test doubles for the integration tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use news_briefing::generate::{AvailableModel, GenerationService};
use news_briefing::notify::{WebhookPayload, WebhookTransport};

pub const RSS_RECENT: &str = include_str!("../fixtures/rss_recent.xml");
pub const RSS_36H: &str = include_str!("../fixtures/rss_36h.xml");
pub const ATOM_BLOG: &str = include_str!("../fixtures/atom_blog.xml");
pub const RSS_DC_DATE: &str = include_str!("../fixtures/rss_dc_date.xml");
pub const RDF_FEED: &str = include_str!("../fixtures/rdf_feed.xml");
pub const BROKEN: &str = include_str!("../fixtures/broken.xml");

/// Fixed clock the fixtures are dated against.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 14, 12, 0, 0).unwrap()
}

pub fn hours(h: u64) -> Duration {
    Duration::from_secs(h * 3600)
}

pub fn text_model(id: &str) -> AvailableModel {
    AvailableModel {
        id: id.to_string(),
        generation_methods: vec!["generateContent".to_string(), "countTokens".to_string()],
    }
}

/// Generation double: fails for the listed models, echoes a fixed reply otherwise.
pub struct ScriptedGenerator {
    pub models: Vec<AvailableModel>,
    pub failing: HashSet<String>,
    pub list_error: Option<String>,
    pub reply: String,
    pub list_calls: Mutex<usize>,
    pub generate_calls: Mutex<Vec<String>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(models: &[&str], reply: &str) -> Self {
        Self {
            models: models.iter().map(|m| text_model(m)).collect(),
            failing: HashSet::new(),
            list_error: None,
            reply: reply.to_string(),
            list_calls: Mutex::new(0),
            generate_calls: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, models: &[&str]) -> Self {
        self.failing = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_list_error(mut self, reason: &str) -> Self {
        self.list_error = Some(reason.to_string());
        self
    }

    pub fn attempted(&self) -> Vec<String> {
        self.generate_calls.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        *self.list_calls.lock().unwrap() + self.generate_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerator {
    async fn list_models(&self) -> Result<Vec<AvailableModel>> {
        *self.list_calls.lock().unwrap() += 1;
        match &self.list_error {
            Some(reason) => Err(anyhow!("{reason}")),
            None => Ok(self.models.clone()),
        }
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self.generate_calls.lock().unwrap().push(model.to_string());
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.failing.contains(model) {
            return Err(anyhow!("{model}: 429 resource exhausted"));
        }
        Ok(self.reply.clone())
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Webhook double that records every payload; posts whose index is in `fail_at` fail.
#[derive(Default)]
pub struct RecordingWebhook {
    pub posts: Mutex<Vec<WebhookPayload>>,
    pub fail_at: HashSet<usize>,
    attempts: Mutex<usize>,
}

impl RecordingWebhook {
    pub fn failing_at(indices: &[usize]) -> Self {
        Self {
            fail_at: indices.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn delivered(&self) -> Vec<WebhookPayload> {
        self.posts.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl WebhookTransport for RecordingWebhook {
    async fn post(&self, payload: &WebhookPayload) -> Result<()> {
        let idx = {
            let mut a = self.attempts.lock().unwrap();
            *a += 1;
            *a - 1
        };
        if self.fail_at.contains(&idx) {
            return Err(anyhow!("webhook returned 500 Internal Server Error"));
        }
        self.posts.lock().unwrap().push(payload.clone());
        Ok(())
    }
}
