//! Entity extraction — pattern scanning, no regex.
//!
//! Entities are open-keyed: the map carries whichever of `quantity`,
//! `length`, `url`, and `value` the utterance yields. All scanning works on
//! whitespace tokens with surrounding punctuation trimmed, except `value`,
//! which preserves the original casing of the operand.

use std::collections::HashMap;

/// Words that never form the start of a meaningful operand.
const FILLER: &[&str] = &["the", "a", "an", "this", "for", "me", "my", "please", "of", "to"];

/// Extract entities from an utterance.
///
/// `matched_keyword` is the most specific rule keyword that hit (if any);
/// the `value` operand is taken from the text that follows it.
pub fn extract_entities(
    raw: &str,
    lowered: &str,
    matched_keyword: Option<&str>,
) -> HashMap<String, String> {
    let mut entities = HashMap::new();

    let tokens: Vec<&str> = lowered.split_whitespace().collect();

    // url: first token that looks like one
    for token in raw.split_whitespace() {
        let t = token.trim_matches(|c: char| c == '"' || c == '\'' || c == ',' || c == '.');
        let tl = t.to_lowercase();
        if tl.starts_with("http://") || tl.starts_with("https://") || tl.starts_with("www.") {
            entities.insert("url".into(), t.to_string());
            break;
        }
    }

    // length: a number adjacent to a length word ("32 characters", "length 16")
    // quantity: the first standalone number that isn't a length
    for (i, token) in tokens.iter().enumerate() {
        // Only standalone numbers count; "aGVsbG8=" must not yield an 8.
        let cleaned = token.trim_matches(|c: char| c.is_ascii_punctuation());
        if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let next_is_length_word = tokens
            .get(i + 1)
            .is_some_and(|t| is_length_word(t.trim_matches(|c: char| !c.is_alphanumeric())));
        let prev_is_length_word = i > 0 && is_length_word(tokens[i - 1]);

        if (next_is_length_word || prev_is_length_word) && !entities.contains_key("length") {
            entities.insert("length".into(), cleaned.to_string());
        } else if !entities.contains_key("quantity") {
            entities.insert("quantity".into(), cleaned.to_string());
        }
    }

    // value: a quoted span wins; otherwise the operand after the matched
    // action keyword.
    if let Some(quoted) = quoted_span(raw) {
        entities.insert("value".into(), quoted);
    } else if let Some(keyword) = matched_keyword {
        if let Some(operand) = trailing_operand(raw, lowered, keyword) {
            entities.insert("value".into(), operand);
        }
    }

    entities
}

fn is_length_word(token: &str) -> bool {
    matches!(token, "character" | "characters" | "chars" | "char" | "length" | "digits" | "bytes")
}

/// The contents of the first single- or double-quoted span, if any.
fn quoted_span(raw: &str) -> Option<String> {
    for quote in ['"', '\''] {
        let mut parts = raw.splitn(3, quote);
        let _before = parts.next()?;
        if let (Some(inside), Some(_after)) = (parts.next(), parts.next()) {
            if !inside.trim().is_empty() {
                return Some(inside.to_string());
            }
        }
    }
    None
}

/// The text after the matched keyword, with leading filler words stripped.
/// Preserves original casing — a base64 payload is case-sensitive.
fn trailing_operand(raw: &str, lowered: &str, keyword: &str) -> Option<String> {
    let start = keyword_end(lowered, keyword)?;
    let mut rest = raw.get(start..)?.trim();

    loop {
        let first_word = rest.split_whitespace().next()?;
        if FILLER.contains(&first_word.to_lowercase().as_str()) {
            rest = rest[first_word.len()..].trim_start();
        } else {
            break;
        }
    }

    let rest = rest.trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

/// Byte offset just past an occurrence of `keyword` that ends on a token
/// boundary. "uuid" inside "uuids" does not count; the scan moves on to the
/// next occurrence.
fn keyword_end(lowered: &str, keyword: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(pos) = lowered[from..].find(keyword) {
        let end = from + pos + keyword.len();
        let at_boundary = lowered[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if at_boundary {
            return Some(end);
        }
        // Rule keywords are ASCII, so stepping one byte past the occurrence
        // start stays on a char boundary.
        from = from + pos + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(raw: &str, keyword: Option<&str>) -> HashMap<String, String> {
        let lowered = raw.to_lowercase();
        extract_entities(raw, &lowered, keyword)
    }

    #[test]
    fn quantity_from_standalone_number() {
        let e = extract("generate 5 uuids", Some("uuid"));
        assert_eq!(e.get("quantity").map(String::as_str), Some("5"));
    }

    #[test]
    fn length_from_adjacent_length_word() {
        let e = extract("generate a password 32 characters long", None);
        assert_eq!(e.get("length").map(String::as_str), Some("32"));
        assert!(!e.contains_key("quantity"));
    }

    #[test]
    fn url_detected() {
        let e = extract("encode https://example.com/a?b=c", Some("encode"));
        assert_eq!(
            e.get("url").map(String::as_str),
            Some("https://example.com/a?b=c")
        );
    }

    #[test]
    fn quoted_value_preserves_case() {
        let e = extract("encode \"Hello World\"", Some("encode"));
        assert_eq!(e.get("value").map(String::as_str), Some("Hello World"));
    }

    #[test]
    fn trailing_operand_strips_filler() {
        let e = extract("encode the secret payload", Some("encode"));
        assert_eq!(e.get("value").map(String::as_str), Some("secret payload"));
    }

    #[test]
    fn keyword_inside_a_longer_word_yields_no_operand() {
        // "uuid" matches inside "uuids"; the stray trailing "s" must not
        // become a value entity.
        let e = extract("generate 5 uuids", Some("uuid"));
        assert!(!e.contains_key("value"));
        assert_eq!(e.get("quantity").map(String::as_str), Some("5"));
    }

    #[test]
    fn operand_taken_from_a_boundary_occurrence() {
        // The first "hash" sits inside "hashing"; the standalone one later
        // in the utterance supplies the operand.
        let e = extract("hashing: hash somepayload", Some("hash"));
        assert_eq!(e.get("value").map(String::as_str), Some("somepayload"));
    }

    #[test]
    fn no_entities_from_plain_text() {
        let e = extract("hello there", None);
        assert!(e.is_empty());
    }
}
