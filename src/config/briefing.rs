// src/config/briefing.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "BRIEFING_CONFIG_PATH";
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_WEBHOOK_URL: &str = "DISCORD_WEBHOOK_URL";

/// Hard per-message ceiling of the chat transport.
pub const TRANSPORT_MESSAGE_LIMIT: usize = 2000;

fn default_lookback_hours() -> Vec<u64> {
    vec![24, 48]
}
fn default_model_preference() -> Vec<String> {
    [
        "gemini-2.5-flash",
        "gemini-2.0-flash",
        "gemini-1.5-flash",
        "gemini-1.5-pro",
        "gemini-pro",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_stories_per_section() -> usize {
    5
}
fn default_username() -> String {
    "News Briefing".to_string()
}
fn default_max_message_chars() -> usize {
    1900
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_concurrent_fetches() -> usize {
    8
}
fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_user_agent() -> String {
    "news-briefing/0.1".to_string()
}

/// Run settings. Built once at startup and passed by reference into each stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BriefingConfig {
    /// Lookback windows tried in order until one yields items.
    pub lookback_hours: Vec<u64>,
    /// Preferred models, best first. Models the service does not offer are skipped.
    pub model_preference: Vec<String>,
    pub stories_per_section: usize,
    /// Display name used for webhook posts.
    pub username: String,
    /// Per-message ceiling including header; clamped to [`TRANSPORT_MESSAGE_LIMIT`].
    pub max_message_chars: usize,
    /// Applied to every HTTP call: feeds, model listing, generation, webhook.
    pub request_timeout_secs: u64,
    pub max_concurrent_fetches: usize,
    pub generation_base_url: String,
    pub user_agent: String,
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            lookback_hours: default_lookback_hours(),
            model_preference: default_model_preference(),
            stories_per_section: default_stories_per_section(),
            username: default_username(),
            max_message_chars: default_max_message_chars(),
            request_timeout_secs: default_timeout_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            generation_base_url: default_generation_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl BriefingConfig {
    /// Load from an explicit path. Supports TOML or JSON (by extension, then by content).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading briefing config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, &ext)
            .with_context(|| format!("parsing briefing config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $BRIEFING_CONFIG_PATH
    /// 2) config/briefing.toml
    /// 3) config/briefing.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        let toml_p = PathBuf::from("config/briefing.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/briefing.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::default())
    }

    /// Lookback windows in increasing order.
    pub fn lookback_windows(&self) -> Vec<Duration> {
        self.lookback_hours
            .iter()
            .map(|h| Duration::from_secs(h * 3600))
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn sanitized(mut self) -> Self {
        self.lookback_hours.retain(|h| *h > 0);
        self.lookback_hours.sort_unstable();
        self.lookback_hours.dedup();
        if self.lookback_hours.is_empty() {
            self.lookback_hours = default_lookback_hours();
        }

        // keep first occurrence of each preferred model
        let mut seen = std::collections::HashSet::new();
        self.model_preference
            .retain(|m| !m.trim().is_empty() && seen.insert(m.clone()));

        if self.max_message_chars == 0 || self.max_message_chars > TRANSPORT_MESSAGE_LIMIT {
            self.max_message_chars = default_max_message_chars();
        }
        if self.stories_per_section == 0 {
            self.stories_per_section = default_stories_per_section();
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_timeout_secs();
        }
        self.max_concurrent_fetches = self.max_concurrent_fetches.max(1);
        if self.username.trim().is_empty() {
            self.username = default_username();
        }
        self.generation_base_url = self.generation_base_url.trim_end_matches('/').to_string();
        self
    }
}

fn parse_config(s: &str, hint_ext: &str) -> Result<BriefingConfig> {
    match hint_ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => {
            if let Ok(v) = toml::from_str(s) {
                return Ok(v);
            }
            serde_json::from_str(s).map_err(|_| anyhow!("unsupported briefing config format"))
        }
    }
}

/// Secrets read from the environment. Either may be absent; the pipeline degrades
/// instead of failing.
#[derive(Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub webhook_url: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            api_key: non_empty_env(ENV_API_KEY),
            webhook_url: non_empty_env(ENV_WEBHOOK_URL),
        }
    }
}

// Keep secrets out of debug logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key_len", &self.api_key.as_ref().map(|k| k.len()))
            .field("webhook_set", &self.webhook_url.is_some())
            .finish()
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
