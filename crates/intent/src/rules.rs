//! The declarative rule table.
//!
//! Order matters: rules earlier in the table win equal-score, equal-
//! specificity ties. Keywords are matched as substrings of the lowercased
//! utterance, so multi-word phrases ("base64 decode") are more specific than
//! their parts and out-score them via the longest-keyword tie-break.

use devchest_core::intent::IntentLabel;

pub struct Rule {
    pub label: IntentLabel,
    pub keywords: &'static [&'static str],
    /// Added to the confidence score once per keyword hit.
    pub weight: u8,
    pub suggested_tool: Option<&'static str>,
}

pub const RULES: &[Rule] = &[
    Rule {
        label: IntentLabel::Navigate,
        keywords: &["navigate to", "take me to", "go to", "navigate", "open"],
        weight: 25,
        suggested_tool: None,
    },
    Rule {
        label: IntentLabel::Decode,
        keywords: &["base64 decode", "decode base64", "decode"],
        weight: 25,
        suggested_tool: Some("base64-decode"),
    },
    Rule {
        label: IntentLabel::Encode,
        keywords: &["base64 encode", "encode base64", "base64", "encode"],
        weight: 25,
        suggested_tool: Some("base64-encode"),
    },
    Rule {
        label: IntentLabel::Encode,
        keywords: &["url encode", "urlencode", "percent encode"],
        weight: 30,
        suggested_tool: Some("url-encode"),
    },
    Rule {
        label: IntentLabel::Decode,
        keywords: &["url decode", "urldecode"],
        weight: 30,
        suggested_tool: Some("url-decode"),
    },
    Rule {
        label: IntentLabel::Hash,
        keywords: &["sha-256", "sha256", "checksum", "digest", "hash"],
        weight: 25,
        suggested_tool: Some("hash-sha256"),
    },
    Rule {
        label: IntentLabel::Generate,
        keywords: &["uuid", "guid"],
        weight: 30,
        suggested_tool: Some("uuid-generator"),
    },
    Rule {
        label: IntentLabel::Generate,
        keywords: &["generate", "create", "make me"],
        weight: 20,
        suggested_tool: None,
    },
    Rule {
        label: IntentLabel::Convert,
        keywords: &["unix time", "timestamp", "epoch"],
        weight: 30,
        suggested_tool: Some("timestamp-converter"),
    },
    Rule {
        label: IntentLabel::Convert,
        keywords: &["convert"],
        weight: 20,
        suggested_tool: None,
    },
    Rule {
        label: IntentLabel::Question,
        keywords: &["what is", "what's", "how do", "how to", "why", "explain"],
        weight: 15,
        suggested_tool: None,
    },
];
