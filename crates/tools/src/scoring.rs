//! Fuzzy-match scoring, behind a trait so the algorithm is replaceable and
//! independently testable.

use devchest_core::tool::ToolSpec;

/// How a query is scored against a tool's discoverability text.
pub trait ScoringStrategy: Send + Sync {
    /// Relevance of `spec` for `query`; higher is better.
    fn score(&self, query: &str, spec: &ToolSpec) -> u32;

    /// Scores below this never match.
    fn minimum(&self) -> u32 {
        1
    }
}

/// Default strategy: token overlap between the query and the tool's id,
/// name, category, and description, weighted by how identifying each field
/// is.
pub struct TokenOverlapScorer {
    pub name_weight: u32,
    pub id_weight: u32,
    pub category_weight: u32,
    pub description_weight: u32,
    pub min_score: u32,
}

impl Default for TokenOverlapScorer {
    fn default() -> Self {
        Self {
            name_weight: 3,
            id_weight: 3,
            category_weight: 2,
            description_weight: 1,
            min_score: 2,
        }
    }
}

impl ScoringStrategy for TokenOverlapScorer {
    fn score(&self, query: &str, spec: &ToolSpec) -> u32 {
        let name = spec.name.to_lowercase();
        let id = spec.id.to_lowercase();
        let category = spec.category.to_lowercase();
        let description = spec.description.to_lowercase();

        let mut score = 0;
        for token in tokens(query) {
            if name.contains(&token) {
                score += self.name_weight;
            }
            if id.contains(&token) {
                score += self.id_weight;
            }
            if category == token {
                score += self.category_weight;
            }
            if description.contains(&token) {
                score += self.description_weight;
            }
        }
        score
    }

    fn minimum(&self) -> u32 {
        self.min_score
    }
}

/// Lowercased alphanumeric tokens of length > 2 — short glue words ("a",
/// "my", "to") would otherwise match inside almost every description.
fn tokens(query: &str) -> impl Iterator<Item = String> + '_ {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, name: &str, description: &str, category: &str) -> ToolSpec {
        ToolSpec {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            input_schema: None,
        }
    }

    #[test]
    fn overlapping_tokens_accumulate() {
        let scorer = TokenOverlapScorer::default();
        let uuid = spec(
            "uuid-generator",
            "UUID Generator",
            "Generate random v4 UUIDs",
            "generators",
        );
        // "uuid" hits id, name, and description.
        assert!(scorer.score("generate a uuid", &uuid) >= 7);
    }

    #[test]
    fn unrelated_query_scores_below_minimum() {
        let scorer = TokenOverlapScorer::default();
        let uuid = spec("uuid-generator", "UUID Generator", "Generate UUIDs", "generators");
        assert!(scorer.score("weather tomorrow", &uuid) < scorer.minimum());
    }

    #[test]
    fn short_tokens_are_ignored() {
        let scorer = TokenOverlapScorer::default();
        let s = spec("base64-encode", "Base64 Encode", "Encode text as base64", "encoders");
        assert_eq!(scorer.score("a an to of", &s), 0);
    }
}
