use super::{WebhookPayload, WebhookTransport};
use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Discord-compatible webhook. Success is one specific status (204 by default,
/// which Discord returns when `?wait` is not set).
#[derive(Clone)]
pub struct DiscordWebhook {
    webhook: String,
    client: Client,
    timeout: Duration,
    max_attempts: u8,
    expected_status: StatusCode,
}

impl DiscordWebhook {
    pub fn new(webhook: String) -> Self {
        Self {
            webhook,
            client: Client::new(),
            timeout: Duration::from_secs(30),
            max_attempts: 1,
            expected_status: StatusCode::NO_CONTENT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Total attempts per message, including the first. Zero is treated as one.
    pub fn with_attempts(mut self, attempts: u8) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_expected_status(mut self, status: StatusCode) -> Self {
        self.expected_status = status;
        self
    }
}

/// Delay after failed attempt `attempt` (1-based): 500ms doubling, capped at 32s.
fn retry_delay(attempt: u8) -> Duration {
    let shift = attempt.saturating_sub(1).min(6);
    Duration::from_millis(500u64 << shift)
}

#[async_trait::async_trait]
impl WebhookTransport for DiscordWebhook {
    async fn post(&self, payload: &WebhookPayload) -> Result<()> {
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let res = self
                .client
                .post(&self.webhook)
                .timeout(self.timeout)
                .json(payload)
                .send()
                .await;

            let err = match res {
                Ok(rsp) if rsp.status() == self.expected_status => return Ok(()),
                Ok(rsp) => {
                    let status = rsp.status();
                    let body = rsp.text().await.unwrap_or_default();
                    anyhow!("webhook returned {status}: {}", body.chars().take(200).collect::<String>())
                }
                Err(e) => anyhow::Error::new(e).context("webhook request failed"),
            };

            if attempt < self.max_attempts {
                tokio::time::sleep(retry_delay(attempt)).await;
                continue;
            }
            return Err(err).context(format!("webhook post after {attempt} attempt(s)"));
        }
    }
}
