//! Cache-augmented knowledge base (CAG).
//!
//! Documents are scored by plain keyword overlap; identical queries are
//! served from a bounded TTL cache instead of re-scoring the corpus. The
//! "semantic" search method is a keyword-path fallback — a documented
//! limitation of this subsystem, not an oversight.

pub mod cache;
pub mod keywords;

pub use cache::{CacheStats, TtlCache, DEFAULT_MAX_ENTRIES};
pub use keywords::{derive_keywords, MAX_KEYWORDS};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

/// How long a search result stays cached.
pub const SEARCH_CACHE_TTL: Duration = Duration::from_secs(300);

/// Metadata attached to an uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", rename = "type")]
    pub doc_type: Option<String>,

    pub uploaded_at: DateTime<Utc>,

    /// Derived at upload time, capped at 20.
    pub keywords: Vec<String>,
}

/// A document in the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDocument {
    pub id: String,
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl KnowledgeDocument {
    /// Display name for context blocks: filename, else the id.
    pub fn display_name(&self) -> &str {
        self.metadata.filename.as_deref().unwrap_or(&self.id)
    }
}

/// A scored search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: KnowledgeDocument,
    pub score: u32,
}

/// Which search path to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    Keyword,
    /// Currently degrades to the keyword path. Kept as a distinct method so
    /// cache keys and call sites don't churn when a real implementation
    /// lands.
    Semantic,
}

impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMethod::Keyword => "keyword",
            SearchMethod::Semantic => "semantic",
        }
    }
}

/// Sizing and counters for the whole knowledge subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeStats {
    pub documents: usize,
    pub total_content_bytes: usize,
    pub cache: CacheStats,
}

/// The document store plus its result cache.
pub struct KnowledgeBase {
    docs: RwLock<Vec<KnowledgeDocument>>,
    cache: TtlCache<Vec<SearchHit>>,
    search_ttl: Duration,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::with_cache_size(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_cache_size(max_cache_entries: usize) -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
            cache: TtlCache::new(max_cache_entries),
            search_ttl: SEARCH_CACHE_TTL,
        }
    }

    /// Override the search-result TTL (tests mostly).
    pub fn with_search_ttl(mut self, ttl: Duration) -> Self {
        self.search_ttl = ttl;
        self
    }

    /// Add a document, deriving its keywords. Returns the generated id.
    pub fn add_document(
        &self,
        content: impl Into<String>,
        filename: Option<String>,
        doc_type: Option<String>,
    ) -> String {
        let content = content.into();
        let doc = KnowledgeDocument {
            id: Uuid::new_v4().to_string(),
            metadata: DocumentMetadata {
                filename,
                doc_type,
                uploaded_at: Utc::now(),
                keywords: derive_keywords(&content, MAX_KEYWORDS),
            },
            content,
        };
        let id = doc.id.clone();
        self.write_docs().push(doc);
        debug!(document_id = %id, "Added knowledge document");
        id
    }

    /// Remove a document by id. Returns whether it existed.
    pub fn remove_document(&self, id: &str) -> bool {
        let mut docs = self.write_docs();
        let before = docs.len();
        docs.retain(|d| d.id != id);
        docs.len() < before
    }

    /// Drop every document and the result cache.
    pub fn clear(&self) {
        self.write_docs().clear();
        self.cache.clear();
    }

    pub fn get_document(&self, id: &str) -> Option<KnowledgeDocument> {
        self.read_docs().iter().find(|d| d.id == id).cloned()
    }

    pub fn document_count(&self) -> usize {
        self.read_docs().len()
    }

    /// Cache-through search. Results for identical `(method, query)` pairs
    /// are served from the cache for five minutes.
    pub fn search(&self, query: &str, method: SearchMethod, limit: usize) -> Vec<SearchHit> {
        let cache_key = format!("{}:{}", method.as_str(), query);
        if let Some(hits) = self.cache.get(&cache_key) {
            debug!(key = %cache_key, "Search cache hit");
            return hits;
        }

        let hits = match method {
            SearchMethod::Keyword => self.keyword_search(query, limit),
            SearchMethod::Semantic => {
                // No embedding backend; the keyword path stands in.
                debug!("Semantic search degrades to keyword path");
                self.keyword_search(query, limit)
            }
        };

        self.cache.set(cache_key, hits.clone(), Some(self.search_ttl));
        hits
    }

    /// Score every document against the query's keywords.
    ///
    /// Per query keyword: +2 when it is one of the document's derived
    /// keywords, +1 per occurrence in the lowercased content. Ranked
    /// descending; equal scores keep insertion order.
    pub fn keyword_search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let query_keywords = derive_keywords(query, MAX_KEYWORDS);
        if query_keywords.is_empty() {
            return Vec::new();
        }

        let docs = self.read_docs();
        let mut hits: Vec<SearchHit> = docs
            .iter()
            .filter_map(|doc| {
                let content_lower = doc.content.to_lowercase();
                let mut score = 0u32;
                for kw in &query_keywords {
                    if doc.metadata.keywords.contains(kw) {
                        score += 2;
                    }
                    score += content_lower.matches(kw.as_str()).count() as u32;
                }
                (score > 0).then(|| SearchHit {
                    document: doc.clone(),
                    score,
                })
            })
            .collect();

        // Stable sort: ties keep insertion order.
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(limit);
        hits
    }

    /// Exact-match conjunction over metadata fields.
    ///
    /// Supported filter keys: `filename`, `type`. Every filter must match;
    /// an unknown key matches nothing.
    pub fn metadata_search(
        &self,
        filters: &HashMap<String, String>,
        limit: usize,
    ) -> Vec<KnowledgeDocument> {
        if filters.is_empty() {
            return Vec::new();
        }
        let docs = self.read_docs();
        docs.iter()
            .filter(|doc| {
                filters.iter().all(|(key, want)| match key.as_str() {
                    "filename" => doc.metadata.filename.as_deref() == Some(want.as_str()),
                    "type" => doc.metadata.doc_type.as_deref() == Some(want.as_str()),
                    _ => false,
                })
            })
            .take(limit)
            .cloned()
            .collect()
    }

    /// Concatenate documents into a prompt-context block, bounded by
    /// `max_len` characters.
    ///
    /// Documents are emitted in input order as `"[name]\ncontent\n\n"`.
    /// When the next block would push past `max_len` it is truncated with an
    /// ellipsis and iteration stops — only the last included document is ever
    /// cut. `include_full` skips bounding entirely.
    pub fn build_context(
        docs: &[KnowledgeDocument],
        max_len: usize,
        include_full: bool,
    ) -> String {
        let mut context = String::new();

        for doc in docs {
            let block = format!("[{}]\n{}\n\n", doc.display_name(), doc.content);

            if include_full {
                context.push_str(&block);
                continue;
            }

            if context.len() + block.len() <= max_len {
                context.push_str(&block);
                continue;
            }

            // Truncate this block to the remaining room and stop.
            let remaining = max_len.saturating_sub(context.len());
            if remaining > 3 {
                let room = remaining - 3;
                // max_len is a byte bound but cuts must land on char
                // boundaries, so shrink char-wise until the bytes fit.
                let mut cut: String = block.chars().take(room).collect();
                while cut.len() > room {
                    cut.pop();
                }
                context.push_str(&cut);
                context.push_str("...");
            }
            break;
        }

        context
    }

    /// Whether the user asked for untruncated documents
    /// ("show me the full document", "the entire data").
    pub fn wants_full_context(text: &str) -> bool {
        let t = text.to_lowercase();
        let full = ["full", "complete", "entire"].iter().any(|w| t.contains(w));
        let subject = ["document", "data"].iter().any(|w| t.contains(w));
        full && subject
    }

    pub fn stats(&self) -> KnowledgeStats {
        let docs = self.read_docs();
        KnowledgeStats {
            documents: docs.len(),
            total_content_bytes: docs.iter().map(|d| d.content.len()).sum(),
            cache: self.cache.stats(),
        }
    }

    /// Direct access to the result cache (exposed for stats and tests).
    pub fn cache(&self) -> &TtlCache<Vec<SearchHit>> {
        &self.cache
    }

    fn read_docs(&self) -> std::sync::RwLockReadGuard<'_, Vec<KnowledgeDocument>> {
        match self.docs.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_docs(&self) -> std::sync::RwLockWriteGuard<'_, Vec<KnowledgeDocument>> {
        match self.docs.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_with(docs: &[&str]) -> KnowledgeBase {
        let kb = KnowledgeBase::new();
        for (i, content) in docs.iter().enumerate() {
            kb.add_document(*content, Some(format!("doc{i}.txt")), None);
        }
        kb
    }

    #[test]
    fn add_and_remove_document() {
        let kb = KnowledgeBase::new();
        let id = kb.add_document("regex syntax cheatsheet", Some("regex.md".into()), None);
        assert_eq!(kb.document_count(), 1);
        assert!(kb.get_document(&id).is_some());

        assert!(kb.remove_document(&id));
        assert!(!kb.remove_document(&id));
        assert_eq!(kb.document_count(), 0);
    }

    #[test]
    fn repeated_keyword_outranks_single_occurrence() {
        let kb = base_with(&[
            "tokio spawns tasks. tokio schedules tasks. tokio runs tasks.",
            "tokio is an async runtime for writing network applications.",
        ]);
        let hits = kb.keyword_search("tokio", 10);
        assert_eq!(hits.len(), 2);
        assert!(hits[0].score > hits[1].score);
        assert!(hits[0].document.content.contains("spawns"));
    }

    #[test]
    fn ties_preserve_insertion_order() {
        let kb = base_with(&["serde basics here", "serde basics there"]);
        let hits = kb.keyword_search("serde basics", 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.display_name(), "doc0.txt");
    }

    #[test]
    fn search_is_cached_per_method_and_query() {
        let kb = base_with(&["cargo workspace layout"]);
        kb.search("cargo", SearchMethod::Keyword, 5);
        assert_eq!(kb.cache().stats().entries, 1);

        // Same query, different method: a distinct cache entry.
        kb.search("cargo", SearchMethod::Semantic, 5);
        assert_eq!(kb.cache().stats().entries, 2);

        // Second identical search is a hit.
        kb.search("cargo", SearchMethod::Keyword, 5);
        assert_eq!(kb.cache().stats().hits, 1);
    }

    #[test]
    fn semantic_method_returns_keyword_results() {
        let kb = base_with(&["git rebase workflow notes"]);
        let keyword = kb.search("rebase", SearchMethod::Keyword, 5);
        let semantic = kb.search("rebase", SearchMethod::Semantic, 5);
        assert_eq!(keyword.len(), semantic.len());
        assert_eq!(keyword[0].document.id, semantic[0].document.id);
    }

    #[test]
    fn metadata_search_is_exact_conjunction() {
        let kb = KnowledgeBase::new();
        kb.add_document("alpha", Some("a.txt".into()), Some("note".into()));
        kb.add_document("beta", Some("b.txt".into()), Some("note".into()));

        let mut filters = HashMap::new();
        filters.insert("type".to_string(), "note".to_string());
        assert_eq!(kb.metadata_search(&filters, 10).len(), 2);

        filters.insert("filename".to_string(), "a.txt".to_string());
        let hits = kb.metadata_search(&filters, 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "alpha");

        filters.insert("nonsense".to_string(), "x".to_string());
        assert!(kb.metadata_search(&filters, 10).is_empty());
    }

    #[test]
    fn build_context_never_exceeds_max_len() {
        let kb = base_with(&["0123456789".repeat(20).as_str(), "abcdef"]);
        let docs: Vec<_> = kb.read_docs().clone();
        for max_len in [10, 50, 120, 500] {
            let ctx = KnowledgeBase::build_context(&docs, max_len, false);
            assert!(ctx.len() <= max_len, "len {} > max {}", ctx.len(), max_len);
        }
    }

    #[test]
    fn build_context_includes_all_names_when_under_budget() {
        let kb = base_with(&["short one", "short two"]);
        let docs: Vec<_> = kb.read_docs().clone();
        let ctx = KnowledgeBase::build_context(&docs, 1000, false);
        assert!(ctx.contains("[doc0.txt]"));
        assert!(ctx.contains("[doc1.txt]"));
        assert!(ctx.contains("short one"));
        assert!(ctx.contains("short two"));
    }

    #[test]
    fn build_context_truncates_only_last_document() {
        let kb = base_with(&["first fits fine", "x".repeat(300).as_str()]);
        let docs: Vec<_> = kb.read_docs().clone();
        let ctx = KnowledgeBase::build_context(&docs, 80, false);
        assert!(ctx.contains("first fits fine"));
        assert!(ctx.ends_with("..."));
        assert!(ctx.len() <= 80);
    }

    #[test]
    fn truncation_of_multibyte_content_keeps_the_ellipsis() {
        // Five 4-byte chars: a char-count cut overshoots the byte bound, and
        // the block must still end with the ellipsis after shrinking.
        let kb = base_with(&["🦀🦀🦀🦀🦀"]);
        let docs: Vec<_> = kb.read_docs().clone();
        let ctx = KnowledgeBase::build_context(&docs, 18, false);
        assert!(ctx.len() <= 18, "len {} > 18", ctx.len());
        assert!(ctx.ends_with("..."));
    }

    #[test]
    fn include_full_skips_truncation() {
        let kb = base_with(&["y".repeat(500).as_str()]);
        let docs: Vec<_> = kb.read_docs().clone();
        let ctx = KnowledgeBase::build_context(&docs, 50, true);
        assert!(ctx.len() > 500);
    }

    #[test]
    fn wants_full_context_needs_both_signals() {
        assert!(KnowledgeBase::wants_full_context("show the full document"));
        assert!(KnowledgeBase::wants_full_context("give me the ENTIRE data"));
        assert!(!KnowledgeBase::wants_full_context("full speed ahead"));
        assert!(!KnowledgeBase::wants_full_context("open the document"));
    }

    #[test]
    fn clear_drops_documents_and_cache() {
        let kb = base_with(&["something searchable"]);
        kb.search("searchable", SearchMethod::Keyword, 5);
        kb.clear();
        assert_eq!(kb.document_count(), 0);
        assert_eq!(kb.cache().stats().entries, 0);
    }

    #[test]
    fn stats_reports_sizes() {
        let kb = base_with(&["abc", "defgh"]);
        let stats = kb.stats();
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.total_content_bytes, 8);
    }
}
