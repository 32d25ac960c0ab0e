//! CompletionProvider trait — the abstraction over the external completion
//! collaborator.
//!
//! The orchestrator only ever calls `send` with a message window and treats
//! the collaborator as opaque: endpoint, model, and credentials are the
//! implementation's business. Every failure is a `ProviderError` the caller
//! is expected to catch and convert into a scripted reply — provider trouble
//! must never surface to the end user as an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// Token usage information, when the provider reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    /// The generated reply text.
    pub message: String,

    /// Which model actually responded.
    pub model: String,

    /// Token usage, if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// The completion collaborator.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai-compat").
    fn name(&self) -> &str;

    /// Send a message window and get a completion back.
    async fn send(&self, messages: &[Message])
        -> std::result::Result<Completion, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_serialization() {
        let completion = Completion {
            message: "Here's how base64 works…".into(),
            model: "test-model".into(),
            usage: Some(Usage {
                prompt_tokens: 12,
                completion_tokens: 30,
                total_tokens: 42,
            }),
        };
        let json = serde_json::to_string(&completion).unwrap();
        assert!(json.contains("test-model"));
        assert!(json.contains("42"));
    }
}
