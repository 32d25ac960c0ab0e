//! Deterministic replies for when the provider is unavailable or silent.
//!
//! These are the floor under the "never return nothing" guarantee: pure
//! functions of the parsed intent, no I/O, no way to fail.

use devchest_core::intent::{Intent, IntentLabel};

/// A canned reply matching the parsed intent. Low-confidence parses get an
/// honest "didn't catch that" instead of a guess dressed up as an answer.
pub fn templated_reply(intent: &Intent) -> String {
    if intent.is_low_confidence() {
        return "I didn't quite catch that. Try rephrasing, or type 'help' to see what I can do."
            .to_string();
    }

    match intent.label {
        IntentLabel::Encode => {
            "It looks like you want to encode something. Try the Base64 or URL encoder — \
             e.g. \"encode hello in base64\"."
                .to_string()
        }
        IntentLabel::Decode => {
            "It looks like you want to decode something. Try \"decode <value> from base64\" \
             or \"url decode <value>\"."
                .to_string()
        }
        IntentLabel::Generate => {
            "It looks like you want to generate something. Try \"generate a uuid\" or \
             \"generate 5 uuids\"."
                .to_string()
        }
        IntentLabel::Convert => {
            "It looks like you want to convert something. Try \"convert 1700000000 to a date\" \
             to turn a Unix timestamp into a readable time."
                .to_string()
        }
        IntentLabel::Hash => {
            "It looks like you want to hash something. Try \"sha256 hash of <your text>\"."
                .to_string()
        }
        IntentLabel::Navigate => {
            "I couldn't find that screen. Type 'help' to see the available tools and where \
             they live."
                .to_string()
        }
        IntentLabel::Question => {
            "I can't reach the AI service right now, so I can't answer free-form questions. \
             The built-in tools still work — type 'help' to see them."
                .to_string()
        }
        IntentLabel::Help | IntentLabel::Unknown => {
            "I'm not sure what you're after. Type 'help' to see everything I can do."
                .to_string()
        }
    }
}
