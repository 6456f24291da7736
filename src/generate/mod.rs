//! Generation dispatcher: ordered model fallback against a generation service.
//!
//! Candidates are tried strictly one after another; the first success wins.
//! There is no backoff and nothing is remembered between runs.

pub mod gemini;

use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;
use std::collections::HashSet;
use tracing::{info, warn};

pub use gemini::GeminiClient;

/// Method name a model must advertise to be a candidate.
pub const TEXT_GENERATION_METHOD: &str = "generateContent";

/// Delivered when every candidate failed. Treated as ordinary content downstream.
pub const ALL_MODELS_FAILED: &str =
    "⚠️ Could not write today's briefing: every available model failed. Check the API quota and logs.";

/// Delivered instead of a briefing when no API key is configured.
pub const MISSING_API_KEY: &str =
    "⚠️ Could not write today's briefing: GEMINI_API_KEY is not set.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableModel {
    pub id: String,
    pub generation_methods: Vec<String>,
}

impl AvailableModel {
    pub fn supports_text_generation(&self) -> bool {
        self.generation_methods
            .iter()
            .any(|m| m == TEXT_GENERATION_METHOD)
    }
}

#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Models the service currently offers, in the order it reports them.
    async fn list_models(&self) -> Result<Vec<AvailableModel>>;
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
    fn provider_name(&self) -> &'static str;
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    Text { model: String, text: String },
    AllModelsFailed { attempted: Vec<String> },
    /// Listing models failed; carries the reason.
    ListFailed(String),
}

impl Generated {
    /// Text to hand to the delivery stage.
    pub fn into_content(self) -> String {
        match self {
            Generated::Text { text, .. } => text,
            Generated::AllModelsFailed { .. } => ALL_MODELS_FAILED.to_string(),
            Generated::ListFailed(reason) => {
                format!("⚠️ Could not list available models: {reason}")
            }
        }
    }

    pub fn model(&self) -> Option<&str> {
        match self {
            Generated::Text { model, .. } => Some(model),
            _ => None,
        }
    }
}

/// Preferred models that are available, in preference order, then every other
/// available model in reported order. Each id appears once.
pub fn candidate_queue(available: &[String], preference: &[String]) -> Vec<String> {
    let offered: HashSet<&str> = available.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue = Vec::with_capacity(available.len());

    for model in preference {
        if offered.contains(model.as_str()) && seen.insert(model.as_str()) {
            queue.push(model.clone());
        }
    }
    for model in available {
        if seen.insert(model.as_str()) {
            queue.push(model.clone());
        }
    }
    queue
}

/// List models, build the candidate queue, and try each candidate until one succeeds.
pub async fn generate_briefing(
    service: &dyn GenerationService,
    prompt: &str,
    preference: &[String],
) -> Generated {
    let models = match service.list_models().await {
        Ok(models) => models,
        Err(e) => {
            warn!(provider = service.provider_name(), error = ?e, "listing models failed");
            return Generated::ListFailed(format!("{e:#}"));
        }
    };

    let available: Vec<String> = models
        .into_iter()
        .filter(AvailableModel::supports_text_generation)
        .map(|m| m.id)
        .collect();
    let queue = candidate_queue(&available, preference);
    info!(candidates = ?queue, "model candidate queue");

    let mut attempted = Vec::with_capacity(queue.len());
    for model in queue {
        counter!("briefing_model_attempts_total").increment(1);
        match service.generate(&model, prompt).await {
            Ok(text) => {
                info!(model = %model, chars = text.chars().count(), "briefing generated");
                return Generated::Text { model, text };
            }
            Err(e) => {
                counter!("briefing_model_failures_total").increment(1);
                warn!(model = %model, error = ?e, "model failed, trying next candidate");
                attempted.push(model);
            }
        }
    }

    warn!(attempted = ?attempted, "every model candidate failed");
    Generated::AllModelsFailed { attempted }
}
