//! Configuration loading and validation for the devchest assistant.
//!
//! Loads from a TOML file with `DEVCHEST_*` environment-variable overrides,
//! and works with pure defaults when no file exists. Everything is validated
//! before the assistant is constructed.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Completion-provider settings
    #[serde(default)]
    pub provider: ProviderSection,

    /// Knowledge cache sizing
    #[serde(default)]
    pub cache: CacheSection,

    /// Orchestrator limits
    #[serde(default)]
    pub orchestrator: OrchestratorSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSection {
    /// OpenAI-compatible chat endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key; usually supplied via DEVCHEST_API_KEY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model to request
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            timeout_secs: default_provider_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSection {
    /// Maximum cached search results
    #[serde(default = "default_cache_entries")]
    pub max_entries: usize,

    /// Search-result TTL in seconds
    #[serde(default = "default_search_ttl")]
    pub search_ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_cache_entries(),
            search_ttl_secs: default_search_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorSection {
    /// How many recent turns are sent to the provider
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Knowledge-context budget in characters
    #[serde(default = "default_context_max_len")]
    pub context_max_len: usize,

    /// Per-tool-execution timeout in seconds
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            context_max_len: default_context_max_len(),
            tool_timeout_secs: default_tool_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_provider_timeout() -> u64 {
    30
}
fn default_cache_entries() -> usize {
    100
}
fn default_search_ttl() -> u64 {
    300
}
fn default_history_window() -> usize {
    10
}
fn default_context_max_len() -> usize {
    4000
}
fn default_tool_timeout() -> u64 {
    30
}

impl AssistantConfig {
    /// Load from a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: AssistantConfig = toml::from_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides — for hosts without a config file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("DEVCHEST_API_KEY") {
            if !v.is_empty() {
                self.provider.api_key = Some(v);
            }
        }
        if let Ok(v) = std::env::var("DEVCHEST_ENDPOINT") {
            if !v.is_empty() {
                self.provider.endpoint = v;
            }
        }
        if let Ok(v) = std::env::var("DEVCHEST_MODEL") {
            if !v.is_empty() {
                self.provider.model = v;
            }
        }
        if let Ok(v) = std::env::var("DEVCHEST_PROVIDER_TIMEOUT_SECS") {
            if let Ok(secs) = v.parse() {
                self.provider.timeout_secs = secs;
            }
        }
    }

    /// Reject configurations the assistant cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.provider.endpoint.is_empty() {
            problems.push("provider.endpoint must not be empty".to_string());
        }
        if self.provider.model.is_empty() {
            problems.push("provider.model must not be empty".to_string());
        }
        if self.provider.timeout_secs == 0 {
            problems.push("provider.timeout_secs must be at least 1".to_string());
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            problems.push("provider.temperature must be within 0.0..=2.0".to_string());
        }
        if self.cache.max_entries == 0 {
            problems.push("cache.max_entries must be at least 1".to_string());
        }
        if self.orchestrator.history_window == 0 {
            problems.push("orchestrator.history_window must be at least 1".to_string());
        }
        if self.orchestrator.context_max_len == 0 {
            problems.push("orchestrator.context_max_len must be at least 1".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }
}
