//! Completion-provider implementations.
//!
//! One implementation matters: `HttpCompletionProvider`, speaking the
//! OpenAI-compatible `/chat/completions` wire format, which covers OpenAI,
//! OpenRouter, Ollama, vLLM, and friends. The orchestrator treats whichever
//! provider it is handed as opaque and converts every `ProviderError` into a
//! scripted reply, so nothing here needs to be clever about recovery.

use async_trait::async_trait;
use devchest_config::ProviderSection;
use devchest_core::error::ProviderError;
use devchest_core::message::{Message, Role};
use devchest_core::provider::{Completion, CompletionProvider, Usage};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// An OpenAI-compatible completion provider.
pub struct HttpCompletionProvider {
    settings: ProviderSection,
    client: reqwest::Client,
}

impl HttpCompletionProvider {
    pub fn new(settings: ProviderSection) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;
        Ok(Self { settings, client })
    }

    fn to_api_messages(messages: &[Message]) -> Vec<serde_json::Value> {
        messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": match m.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                        Role::System => "system",
                    },
                    "content": m.content,
                })
            })
            .collect()
    }

    async fn post(&self, messages: &[Message]) -> Result<Completion, ProviderError> {
        let mut body = serde_json::json!({
            "model": self.settings.model,
            "messages": Self::to_api_messages(messages),
            "temperature": self.settings.temperature,
            "stream": false,
        });
        if let Some(max_tokens) = self.settings.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(model = %self.settings.model, "Sending completion request");

        let mut request = self
            .client
            .post(&self.settings.endpoint)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(api_key) = &self.settings.api_key {
            request = request.header("Authorization", format!("Bearer {api_key}"));
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedResponse("no choices in response".into()))?;

        Ok(Completion {
            message: choice.message.content.unwrap_or_default(),
            model: api_response.model.unwrap_or_else(|| self.settings.model.clone()),
            usage: api_response.usage.map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

#[async_trait]
impl CompletionProvider for HttpCompletionProvider {
    fn name(&self) -> &str {
        "openai-compat"
    }

    /// Send a message window, bounded by the configured timeout. A timeout
    /// is a `ProviderError` like any other — the caller's fallback path
    /// handles it.
    async fn send(&self, messages: &[Message]) -> Result<Completion, ProviderError> {
        let timeout = Duration::from_secs(self.settings.timeout_secs);
        match tokio::time::timeout(timeout, self.post(messages)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                timeout_secs: self.settings.timeout_secs,
            }),
        }
    }
}

// --- wire format ---

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
