//! Keyword derivation shared by document indexing and query scoring.

/// Cap on derived keywords per document.
pub const MAX_KEYWORDS: usize = 20;

/// Common English tokens that carry no retrieval signal.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had",
    "her", "was", "one", "our", "out", "has", "have", "been", "were", "they",
    "their", "this", "that", "these", "those", "with", "from", "will", "would",
    "there", "what", "when", "where", "which", "while", "about", "into",
    "than", "then", "them", "some", "such", "only", "also", "other", "more",
    "most", "over", "very", "your", "its", "his", "she", "him", "how", "why",
    "who", "whom", "does", "did", "doing", "being",
];

/// Lowercased alphanumeric tokens of length > 2, stop words removed,
/// first-seen order preserved, capped at `max`.
pub fn derive_keywords(text: &str, max: usize) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for raw in text.split(|c: char| !c.is_alphanumeric()) {
        if keywords.len() >= max {
            break;
        }
        let token = raw.to_lowercase();
        if token.len() <= 2 || STOP_WORDS.contains(&token.as_str()) {
            continue;
        }
        if !keywords.contains(&token) {
            keywords.push(token);
        }
    }
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_short_tokens_and_stop_words() {
        let kw = derive_keywords("the cat sat on a red mat", MAX_KEYWORDS);
        assert_eq!(kw, vec!["cat", "sat", "red", "mat"]);
    }

    #[test]
    fn dedupes_preserving_first_seen_order() {
        let kw = derive_keywords("rust tooling rust tooling rust", MAX_KEYWORDS);
        assert_eq!(kw, vec!["rust", "tooling"]);
    }

    #[test]
    fn caps_at_max() {
        let text = (0..40).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        let kw = derive_keywords(&text, MAX_KEYWORDS);
        assert_eq!(kw.len(), MAX_KEYWORDS);
    }

    #[test]
    fn splits_on_punctuation() {
        let kw = derive_keywords("base64-encoded, obviously!", MAX_KEYWORDS);
        assert_eq!(kw, vec!["base64", "encoded", "obviously"]);
    }
}
