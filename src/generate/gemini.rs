// src/generate/gemini.rs
//! Google Generative Language REST client.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AvailableModel, GenerationService};
use crate::config::BriefingConfig;

const PAGE_SIZE: &str = "1000";
// A broken page token must not loop forever.
const MAX_PAGES: usize = 20;

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, cfg: &BriefingConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&cfg.user_agent)
            .timeout(cfg.request_timeout())
            .build()
            .context("building generation http client")?;
        Ok(Self {
            http,
            api_key,
            base_url: cfg.generation_base_url.clone(),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}
#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}
#[derive(Serialize)]
struct GenerateReq<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResp {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<RespContent>,
    finish_reason: Option<String>,
}
#[derive(Deserialize)]
struct RespContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}
#[derive(Deserialize)]
struct RespPart {
    text: Option<String>,
}
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// `models/gemini-pro` -> `gemini-pro`.
pub fn strip_model_prefix(name: &str) -> &str {
    name.strip_prefix("models/").unwrap_or(name)
}

/// Concatenated text of the first candidate; an error when the service returned none.
fn extract_text(resp: GenerateResp) -> Result<String> {
    if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
        bail!("prompt blocked: {reason}");
    }
    let first = resp
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no candidates returned"))?;
    let text: String = first
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        bail!(
            "empty text (finish reason: {})",
            first.finish_reason.as_deref().unwrap_or("unknown")
        );
    }
    Ok(text)
}

async fn error_body(resp: reqwest::Response) -> String {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(300).collect();
    format!("HTTP {status}: {snippet}")
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn list_models(&self) -> Result<Vec<AvailableModel>> {
        let url = format!("{}/models", self.base_url);
        let mut out = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut req = self
                .http
                .get(&url)
                .header("x-goog-api-key", &self.api_key)
                .query(&[("pageSize", PAGE_SIZE)]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token.as_str())]);
            }
            let resp = req.send().await.context("list models request")?;
            if !resp.status().is_success() {
                bail!("list models failed: {}", error_body(resp).await);
            }
            let page: ModelList = resp.json().await.context("list models body")?;
            out.extend(page.models.into_iter().map(|m| AvailableModel {
                id: strip_model_prefix(&m.name).to_string(),
                generation_methods: m.supported_generation_methods,
            }));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(out)
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let req = GenerateReq {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .with_context(|| format!("generate request ({model})"))?;
        if !resp.status().is_success() {
            bail!("generate failed ({model}): {}", error_body(resp).await);
        }
        let body: GenerateResp = resp
            .json()
            .await
            .with_context(|| format!("generate body ({model})"))?;
        extract_text(body).with_context(|| format!("model {model}"))
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_prefix_is_stripped_once() {
        assert_eq!(strip_model_prefix("models/gemini-pro"), "gemini-pro");
        assert_eq!(strip_model_prefix("custom-x"), "custom-x");
    }

    #[test]
    fn model_list_reads_capabilities() {
        let json = r#"{"models":[
            {"name":"models/gemini-2.0-flash","supportedGenerationMethods":["generateContent","countTokens"]},
            {"name":"models/text-embedding-004","supportedGenerationMethods":["embedContent"]}
        ],"nextPageToken":""}"#;
        let list: ModelList = serde_json::from_str(json).unwrap();
        assert_eq!(list.models.len(), 2);
        assert_eq!(list.models[1].supported_generation_methods, vec!["embedContent"]);
        assert_eq!(list.next_page_token.as_deref(), Some(""));
    }

    #[test]
    fn text_parts_are_joined() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"---SECTION: GENERAL---\n"},{"text":"A"}]},"finishReason":"STOP"}]}"#;
        let resp: GenerateResp = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(resp).unwrap(), "---SECTION: GENERAL---\nA");
    }

    #[test]
    fn blocked_or_empty_responses_are_errors() {
        let blocked: GenerateResp =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(extract_text(blocked).unwrap_err().to_string().contains("SAFETY"));

        let empty: GenerateResp = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[]},"finishReason":"MAX_TOKENS"}]}"#,
        )
        .unwrap();
        assert!(extract_text(empty).unwrap_err().to_string().contains("MAX_TOKENS"));
    }
}
