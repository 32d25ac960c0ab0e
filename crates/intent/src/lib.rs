//! Keyword-rule intent parser.
//!
//! Classification is deliberately shallow: a declarative rule table is
//! evaluated in order over the lowercased utterance, each keyword hit adds
//! its rule's weight to the confidence score, and the best-scoring rule
//! supplies the label. There is no grammar, no embeddings, and no error
//! path — an utterance that matches nothing is a valid low-confidence
//! `Unknown` intent.
//!
//! Tie-breaking is fixed: the rule with the highest score wins; equal scores
//! go to the rule whose longest matched keyword is longer (more specific);
//! still equal goes to the rule declared first.

mod entities;
mod rules;

pub use entities::extract_entities;

use devchest_core::intent::{Intent, IntentLabel};
use rules::{Rule, RULES};
use tracing::debug;

/// Whether the utterance is asking what the assistant can do.
///
/// Checked by the orchestrator before parsing; a help request short-circuits
/// the whole pipeline.
pub fn is_help_request(text: &str) -> bool {
    let t = text.trim().to_lowercase();
    if t == "help" || t == "?" || t.starts_with("help ") {
        return true;
    }
    const HELP_PHRASES: &[&str] = &[
        "what can you do",
        "what tools",
        "list tools",
        "list the tools",
        "show me what you can",
        "what are your capabilities",
    ];
    HELP_PHRASES.iter().any(|p| t.contains(p))
}

/// Parse a free-text utterance into an `Intent`. Never fails.
pub fn parse(raw_query: &str) -> Intent {
    let query = raw_query.trim();
    if query.is_empty() {
        return Intent::unknown(raw_query);
    }

    if is_help_request(query) {
        let mut intent = Intent::unknown(raw_query);
        intent.label = IntentLabel::Help;
        intent.confidence = 90;
        return intent;
    }

    let lowered = query.to_lowercase();

    // Evaluate every rule; remember the best one and accumulate confidence
    // across all hits.
    let mut total_score: u32 = 0;
    let mut best: Option<RuleMatch<'_>> = None;

    for rule in RULES {
        let Some(hit) = score_rule(rule, &lowered) else {
            continue;
        };
        total_score += hit.score;

        let better = match &best {
            None => true,
            Some(current) => {
                hit.score > current.score
                    || (hit.score == current.score
                        && hit.longest_keyword.len() > current.longest_keyword.len())
            }
        };
        if better {
            best = Some(hit);
        }
    }

    let entities = extract_entities(query, &lowered, best.as_ref().map(|b| b.longest_keyword));

    // Entity hits add a little certainty: the utterance carries parameters
    // that fit the matched domain.
    let confidence = (total_score + 5 * entities.len() as u32).min(100) as u8;

    let intent = match best {
        Some(hit) => Intent {
            raw_query: raw_query.to_string(),
            label: hit.rule.label,
            entities,
            confidence,
            suggested_tool: hit.rule.suggested_tool.map(str::to_string),
        },
        None => Intent {
            raw_query: raw_query.to_string(),
            label: IntentLabel::Unknown,
            entities,
            confidence,
            suggested_tool: None,
        },
    };

    debug!(
        label = %intent.label,
        confidence = intent.confidence,
        suggested_tool = ?intent.suggested_tool,
        "Parsed intent"
    );
    intent
}

/// A rule that matched, with its accumulated score and most specific keyword.
struct RuleMatch<'a> {
    rule: &'a Rule,
    score: u32,
    longest_keyword: &'a str,
}

fn score_rule<'a>(rule: &'a Rule, lowered: &str) -> Option<RuleMatch<'a>> {
    let mut score = 0u32;
    let mut longest: Option<&'a str> = None;

    for keyword in rule.keywords {
        if lowered.contains(keyword) {
            score += rule.weight as u32;
            if longest.is_none_or(|l| keyword.len() > l.len()) {
                longest = Some(keyword);
            }
        }
    }

    longest.map(|longest_keyword| RuleMatch {
        rule,
        score,
        longest_keyword,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_predicate_matches_bare_and_phrased_forms() {
        assert!(is_help_request("help"));
        assert!(is_help_request("  HELP  "));
        assert!(is_help_request("help me out"));
        assert!(is_help_request("so, what can you do?"));
        assert!(!is_help_request("encode hello"));
    }

    #[test]
    fn generate_uuid_resolves_generate_with_suggestion() {
        let intent = parse("generate a uuid");
        assert_eq!(intent.label, IntentLabel::Generate);
        assert_eq!(intent.suggested_tool.as_deref(), Some("uuid-generator"));
        assert!(intent.authorizes_execution());
    }

    #[test]
    fn base64_decode_beats_encode_on_specificity() {
        // "base64 decode" hits both the decode rule and the bare "base64"
        // encode keyword; the longer keyword must win.
        let intent = parse("base64 decode aGVsbG8=");
        assert_eq!(intent.label, IntentLabel::Decode);
        assert_eq!(intent.suggested_tool.as_deref(), Some("base64-decode"));
    }

    #[test]
    fn gibberish_is_unknown_and_low_confidence() {
        let intent = parse("xyzzy plugh frobnicate");
        assert_eq!(intent.label, IntentLabel::Unknown);
        assert!(intent.is_low_confidence());
        assert!(intent.suggested_tool.is_none());
    }

    #[test]
    fn empty_input_is_unknown() {
        let intent = parse("   ");
        assert_eq!(intent.label, IntentLabel::Unknown);
        assert_eq!(intent.confidence, 0);
    }

    #[test]
    fn navigate_with_target() {
        let intent = parse("open the json formatter");
        assert_eq!(intent.label, IntentLabel::Navigate);
    }

    #[test]
    fn parse_never_panics_on_oddities() {
        for q in ["", "🦀🦀🦀", "a", "\0", "encode", "???!!!"] {
            let _ = parse(q);
        }
    }
}
