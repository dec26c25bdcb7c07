use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::LlmConfig;
use crate::error::AppError;

// Fixed invocation parameters; only the model identifier is configurable.
const MAX_OUTPUT_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.8;
const CANDIDATE_COUNT: u32 = 1;

/// Failure classes of the remote completion service, kept distinguishable
/// so the caller can render an appropriate message for each.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion service rejected the API credential (status {status})")]
    Auth { status: u16 },

    #[error("completion service rate limit or quota exhausted")]
    Quota,

    #[error("completion service error (status {status})")]
    Service { status: u16 },

    #[error("network failure reaching completion service: {0}")]
    Network(String),

    #[error("completion service returned an undecodable payload: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    n: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

/// Client for the chat-completions endpoint. The credential and endpoint
/// are injected through [`LlmConfig`]; nothing here touches the process
/// environment.
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Send one prompt and return the raw completion text.
    ///
    /// A single attempt by default; when `max_retries > 1` is configured,
    /// quota and server-error failures are retried with exponential
    /// backoff. Auth and malformed-payload failures never retry.
    pub async fn complete(&self, system: &str, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            max_tokens: MAX_OUTPUT_TOKENS,
            n: CANDIDATE_COUNT,
            temperature: TEMPERATURE,
        };

        let max_attempts = self.config.max_retries.max(1);
        let mut last_error = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let delay = self.config.retry_delay_ms * 2_u64.pow(attempt.saturating_sub(1));
                tokio::time::sleep(Duration::from_millis(delay)).await;
                tracing::warn!(attempt = attempt + 1, max_attempts, "retrying completion request");
            }

            match self.send_request(&request).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    if Self::is_retryable(&e) {
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| CompletionError::Network("request failed after all retries".into())))
    }

    async fn send_request(&self, request: &ChatRequest<'_>) -> Result<String, CompletionError> {
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| CompletionError::Network(e.to_string()))?;

        let status = response.status();

        if status.is_success() {
            let payload: ChatResponse = response
                .json()
                .await
                .map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

            let choice = payload.choices.into_iter().next().ok_or_else(|| {
                CompletionError::MalformedResponse("response contained no choices".into())
            })?;

            Ok(choice.message.content)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(CompletionError::Auth { status: status.as_u16() })
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Err(CompletionError::Quota)
        } else {
            Err(CompletionError::Service { status: status.as_u16() })
        }
    }

    fn is_retryable(error: &CompletionError) -> bool {
        matches!(
            error,
            CompletionError::Quota | CompletionError::Service { status: 500..=599 }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(api_url: String, max_retries: u32) -> LlmConfig {
        LlmConfig {
            api_key: "fake-key".to_string(),
            api_url,
            model: "gpt-3.5-turbo".to_string(),
            max_retries,
            retry_delay_ms: 1,
            timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn complete_returns_the_message_content() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"Title: Plants\n\nIntro\nWarm-up."}}]}"#,
            )
            .create_async()
            .await;

        let client = LlmClient::new(test_config(server.url(), 1)).unwrap();
        let text = client.complete("system", "prompt").await.unwrap();
        assert_eq!(text, "Title: Plants\n\nIntro\nWarm-up.");
    }

    #[tokio::test]
    async fn unauthorized_maps_to_auth_and_does_not_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/").with_status(401).expect(1).create_async().await;

        let client = LlmClient::new(test_config(server.url(), 3)).unwrap();
        let result = client.complete("system", "prompt").await;
        assert!(matches!(result, Err(CompletionError::Auth { status: 401 })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn quota_maps_to_quota_with_a_single_default_attempt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/").with_status(429).expect(1).create_async().await;

        let client = LlmClient::new(test_config(server.url(), 1)).unwrap();
        let result = client.complete("system", "prompt").await;
        assert!(matches!(result, Err(CompletionError::Quota)));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_errors_retry_when_configured() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/").with_status(500).expect(3).create_async().await;

        let client = LlmClient::new(test_config(server.url(), 3)).unwrap();
        let result = client.complete("system", "prompt").await;
        assert!(matches!(result, Err(CompletionError::Service { status: 500 })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn garbage_payload_maps_to_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = LlmClient::new(test_config(server.url(), 1)).unwrap();
        let result = client.complete("system", "prompt").await;
        assert!(matches!(result, Err(CompletionError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn empty_choice_list_maps_to_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = LlmClient::new(test_config(server.url(), 1)).unwrap();
        let result = client.complete("system", "prompt").await;
        assert!(matches!(result, Err(CompletionError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn request_body_carries_the_fixed_parameters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "max_tokens": 2000,
                "n": 1,
                "messages": [{"role": "system"}, {"role": "user"}],
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#)
            .create_async()
            .await;

        let client = LlmClient::new(test_config(server.url(), 1)).unwrap();
        client.complete("system", "prompt").await.unwrap();
        mock.assert_async().await;
    }
}
