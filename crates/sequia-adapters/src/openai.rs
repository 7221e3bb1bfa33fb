// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Sequia.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! OpenAI-compatible chat completion client implementing the core
//! [`CompletionProvider`] seam. Per-attempt timeout with a bounded retry
//! budget and exponential backoff with jitter.

use crate::errors::SourceError;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use sequia_core::parameterize::{CompletionError, CompletionProvider};
use sequia_types::AppConfig;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const PER_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    policy: RetryPolicy,
}

impl OpenAiClient {
    /// Build from configuration; `None` when no key is configured or demo
    /// mode is on.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        if !config.ai_enabled() {
            return None;
        }
        let api_key = config.openai_api_key.clone()?;
        Self::new(
            &api_key,
            &config.openai_model,
            config.openai_max_tokens,
            config.openai_temperature,
            config.openai_max_retries,
            Duration::from_secs_f64(config.openai_retry_delay_seconds),
        )
        .ok()
    }

    pub fn new(
        api_key: &str,
        model: &str,
        max_tokens: u32,
        temperature: f64,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Result<Self, SourceError> {
        Self::with_base_url(
            DEFAULT_BASE_URL,
            api_key,
            model,
            max_tokens,
            temperature,
            max_retries,
            retry_delay,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        model: &str,
        max_tokens: u32,
        temperature: f64,
        max_retries: u32,
        retry_delay: Duration,
    ) -> Result<Self, SourceError> {
        if api_key.is_empty() {
            return Err(SourceError::Config("OpenAI API key is required".to_owned()));
        }
        let client = reqwest::Client::builder()
            .timeout(PER_ATTEMPT_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            model: model.to_owned(),
            max_tokens,
            temperature,
            policy: RetryPolicy::new(max_retries.max(1), retry_delay),
        })
    }

    async fn attempt(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CompletionError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
        });

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::Unreachable(e.to_string())
                }
            })?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(CompletionError::RateLimited(
                resp.text().await.unwrap_or_default(),
            ));
        }
        if !status.is_success() {
            return Err(CompletionError::Other(format!(
                "status {}: {}",
                status,
                resp.text().await.unwrap_or_default()
            )));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| CompletionError::Other(format!("malformed response: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CompletionError::Other("empty completion".to_owned()))
    }
}

fn is_transient(error: &CompletionError) -> bool {
    matches!(
        error,
        CompletionError::Unreachable(_) | CompletionError::RateLimited(_) | CompletionError::Timeout
    )
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, CompletionError> {
        self.policy
            .run("openai", is_transient, || {
                self.attempt(system_prompt, user_prompt)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> OpenAiClient {
        OpenAiClient::with_base_url(
            base_url,
            "sk-test",
            "gpt-4o-mini",
            1000,
            0.3,
            2,
            Duration::from_millis(1),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(
                r#"{"choices": [{"message": {"role": "assistant", "content": "{\"parameters\": {}}"}}]}"#,
            )
            .create_async()
            .await;

        let content = client(&server.url())
            .complete("system", "user")
            .await
            .unwrap();
        assert_eq!(content, "{\"parameters\": {}}");
    }

    #[tokio::test]
    async fn rate_limits_exhaust_the_retry_budget() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("slow down")
            .expect(2)
            .create_async()
            .await;

        let err = client(&server.url()).complete("s", "u").await;
        assert!(matches!(err, Err(CompletionError::RateLimited(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_retryable_status_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(400)
            .with_body("bad request")
            .create_async()
            .await;

        let err = client(&server.url()).complete("s", "u").await;
        assert!(matches!(err, Err(CompletionError::Other(_))));
    }

    #[test]
    fn demo_mode_disables_the_client() {
        let mut config = AppConfig {
            openai_api_key: Some("sk-test".to_owned()),
            ..AppConfig::default()
        };
        assert!(OpenAiClient::from_config(&config).is_some());
        config.demo_mode = true;
        assert!(OpenAiClient::from_config(&config).is_none());
    }
}
