//! Intent domain types — the parser's classification of a user utterance.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Confidence at or above which a tool-execution attempt is authorized.
pub const EXEC_CONFIDENCE: u8 = 40;

/// Confidence below which the orchestrator uses the low-confidence fallback
/// phrasing instead of pretending it understood.
pub const LOW_CONFIDENCE: u8 = 20;

/// What the user appears to want.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    Encode,
    Decode,
    Generate,
    Convert,
    Hash,
    Navigate,
    Question,
    Help,
    Unknown,
}

impl IntentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentLabel::Encode => "encode",
            IntentLabel::Decode => "decode",
            IntentLabel::Generate => "generate",
            IntentLabel::Convert => "convert",
            IntentLabel::Hash => "hash",
            IntentLabel::Navigate => "navigate",
            IntentLabel::Question => "question",
            IntentLabel::Help => "help",
            IntentLabel::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parsed form of a user utterance.
///
/// Parsing is infallible: an utterance that matches nothing yields
/// `IntentLabel::Unknown` with low confidence, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    /// The original utterance, untouched.
    pub raw_query: String,

    /// The classified purpose.
    pub label: IntentLabel,

    /// Extracted parameters keyed by entity name
    /// ("quantity", "length", "url", "value").
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub entities: HashMap<String, String>,

    /// Heuristic certainty, 0–100.
    pub confidence: u8,

    /// Tool id the parser believes should handle this, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_tool: Option<String>,
}

impl Intent {
    /// A minimal unknown-intent value for utterances nothing matched.
    pub fn unknown(raw_query: impl Into<String>) -> Self {
        Self {
            raw_query: raw_query.into(),
            label: IntentLabel::Unknown,
            entities: HashMap::new(),
            confidence: 0,
            suggested_tool: None,
        }
    }

    /// Whether confidence authorizes a tool-execution attempt.
    pub fn authorizes_execution(&self) -> bool {
        self.confidence >= EXEC_CONFIDENCE
    }

    /// Whether this parse is too weak to act on at all.
    pub fn is_low_confidence(&self) -> bool {
        self.confidence < LOW_CONFIDENCE
    }
}
