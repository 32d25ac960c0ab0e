//! Tool domain types — the invocable capabilities the assistant dispatches to.
//!
//! A tool is either *executable* (carries a handler function), *navigable*
//! (carries only a UI route the host should open), or both. The kind is a
//! tagged variant and every dispatch site matches it exhaustively — there is
//! no probing of optional fields, and navigation is a first-class outcome
//! rather than a specially-formatted error string.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ToolError;

/// Static description of a tool: identity, discoverability text, and an
/// optional JSON Schema for its parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique id within a registry instance (e.g., "uuid-generator").
    pub id: String,

    /// Human-readable name (e.g., "UUID Generator").
    pub name: String,

    /// What this tool does; also feeds fuzzy matching.
    pub description: String,

    /// Category label for grouping in help output (e.g., "generators").
    pub category: String,

    /// JSON Schema describing the tool's parameters, if it takes any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,
}

/// How a tool can be invoked.
///
/// Dispatch over this enum is always an exhaustive `match`.
#[derive(Clone)]
pub enum ToolKind {
    /// A pure capability: invoked with parameters, returns output.
    Executable(Arc<dyn ToolHandler>),

    /// A UI screen: the only sensible "execution" is navigating to it.
    Navigable { route: String },

    /// Both a capability and a screen (e.g., a codec that also has a page).
    Both {
        route: String,
        handler: Arc<dyn ToolHandler>,
    },
}

impl ToolKind {
    /// The route to open for this tool, if it has one.
    pub fn route(&self) -> Option<&str> {
        match self {
            ToolKind::Executable(_) => None,
            ToolKind::Navigable { route } | ToolKind::Both { route, .. } => Some(route),
        }
    }

    /// The handler for this tool, if it has one.
    pub fn handler(&self) -> Option<&Arc<dyn ToolHandler>> {
        match self {
            ToolKind::Executable(handler) | ToolKind::Both { handler, .. } => Some(handler),
            ToolKind::Navigable { .. } => None,
        }
    }
}

impl std::fmt::Debug for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolKind::Executable(_) => write!(f, "Executable"),
            ToolKind::Navigable { route } => write!(f, "Navigable({route})"),
            ToolKind::Both { route, .. } => write!(f, "Both({route})"),
        }
    }
}

/// The capability behind an executable tool.
///
/// Handlers are registered once at startup and invoked many times. They may
/// fail with `ToolError`; the registry converts every failure into a
/// structured invocation record, so errors never cross the registry boundary.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn run(&self, params: serde_json::Value) -> std::result::Result<ToolOutput, ToolError>;
}

/// Successful output of a tool handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// User-visible result text (e.g., "UUID: 123e4567-…").
    pub message: String,

    /// Optional structured payload for the host UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolOutput {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

/// What an invocation resolved to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// The handler ran and produced output.
    Completed(ToolOutput),

    /// The handler failed, was unknown, or timed out. `error` is never empty.
    Failed { error: String },

    /// The tool is a screen, not a capability: the host should navigate.
    NavigationRequested { route: String },
}

/// The record of a single tool invocation.
///
/// Produced by the registry for every `execute` call, including unknown ids —
/// the registry never returns `Err` and never lets a handler panic escape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invocation {
    #[serde(flatten)]
    pub outcome: InvocationOutcome,

    /// Wall-clock time spent in the handler (zero for unknown ids).
    pub execution_time_ms: u64,

    /// When the invocation finished.
    pub timestamp: DateTime<Utc>,
}

impl Invocation {
    pub fn completed(output: ToolOutput, execution_time_ms: u64) -> Self {
        Self {
            outcome: InvocationOutcome::Completed(output),
            execution_time_ms,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(error: impl Into<String>, execution_time_ms: u64) -> Self {
        Self {
            outcome: InvocationOutcome::Failed {
                error: error.into(),
            },
            execution_time_ms,
            timestamp: Utc::now(),
        }
    }

    pub fn navigation(route: impl Into<String>) -> Self {
        Self {
            outcome: InvocationOutcome::NavigationRequested {
                route: route.into(),
            },
            execution_time_ms: 0,
            timestamp: Utc::now(),
        }
    }

    /// Whether the invocation completed with output.
    pub fn success(&self) -> bool {
        matches!(self.outcome, InvocationOutcome::Completed(_))
    }

    /// The failure message, if this invocation failed.
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            InvocationOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// The result text, if this invocation completed.
    pub fn message(&self) -> Option<&str> {
        match &self.outcome {
            InvocationOutcome::Completed(output) => Some(&output.message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_route_and_handler_accessors() {
        let kind = ToolKind::Navigable {
            route: "/json-formatter".into(),
        };
        assert_eq!(kind.route(), Some("/json-formatter"));
        assert!(kind.handler().is_none());
    }

    #[test]
    fn failed_invocation_has_error_and_timestamp() {
        let inv = Invocation::failed("no such tool", 0);
        assert!(!inv.success());
        assert!(!inv.error().unwrap().is_empty());
        assert!(inv.timestamp <= Utc::now());
    }

    #[test]
    fn invocation_serializes_with_tagged_outcome() {
        let inv = Invocation::navigation("/color-picker");
        let json = serde_json::to_string(&inv).unwrap();
        assert!(json.contains("navigation_requested"));
        assert!(json.contains("/color-picker"));
    }

    #[test]
    fn completed_invocation_exposes_message() {
        let inv = Invocation::completed(ToolOutput::text("UUID: 123"), 4);
        assert!(inv.success());
        assert_eq!(inv.message(), Some("UUID: 123"));
        assert!(inv.error().is_none());
    }
}
