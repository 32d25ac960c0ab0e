//! The tool registry: catalog, fuzzy lookup, and guarded execution.
//!
//! Registration order is significant — it is the tie-break for fuzzy
//! matching — so tools live in a `Vec` with a side index by id.
//!
//! `execute` is the one hard guarantee of this module: it returns an
//! `Invocation` for every input. Unknown ids, handler errors, and timeouts
//! all become `InvocationOutcome::Failed`; a navigable-only tool becomes
//! `InvocationOutcome::NavigationRequested`. No error type crosses this
//! boundary.

use devchest_core::error::ToolError;
use devchest_core::tool::{Invocation, ToolKind, ToolSpec};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::scoring::{ScoringStrategy, TokenOverlapScorer};

const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// A spec plus its invocation kind, as held by the registry.
#[derive(Clone)]
pub struct RegisteredTool {
    pub spec: ToolSpec,
    pub kind: ToolKind,
}

/// The catalog of invocable capabilities.
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    by_id: HashMap<String, usize>,
    scorer: Box<dyn ScoringStrategy>,
    timeout: Duration,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            by_id: HashMap::new(),
            scorer: Box::new(TokenOverlapScorer::default()),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Swap the fuzzy-matching strategy.
    pub fn with_scorer(mut self, scorer: Box<dyn ScoringStrategy>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Change the per-execution timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a tool. Re-registering an existing id replaces the tool in
    /// its original order slot.
    pub fn register(&mut self, spec: ToolSpec, kind: ToolKind) {
        let id = spec.id.clone();
        let tool = RegisteredTool { spec, kind };
        match self.by_id.get(&id) {
            Some(&idx) => {
                debug!(tool_id = %id, "Replacing registered tool");
                self.tools[idx] = tool;
            }
            None => {
                self.by_id.insert(id, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    /// Get a tool by id.
    pub fn get(&self, id: &str) -> Option<&RegisteredTool> {
        self.by_id.get(id).map(|&idx| &self.tools[idx])
    }

    /// All registered tool ids, in registration order.
    pub fn ids(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.spec.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by id. Always returns an `Invocation`; see module docs.
    pub async fn execute(&self, id: &str, params: serde_json::Value) -> Invocation {
        let Some(tool) = self.get(id) else {
            warn!(tool_id = %id, "Execution requested for unknown tool");
            return Invocation::failed(ToolError::NotFound(id.to_string()).to_string(), 0);
        };

        // Exhaustive over the kind: navigable-only tools cannot run, they
        // redirect.
        let handler = match &tool.kind {
            ToolKind::Navigable { route } => {
                debug!(tool_id = %id, route = %route, "Tool is a screen; requesting navigation");
                return Invocation::navigation(route.clone());
            }
            ToolKind::Executable(handler) => handler,
            ToolKind::Both { handler, .. } => handler,
        };

        let start = Instant::now();
        let result = tokio::time::timeout(self.timeout, handler.run(params)).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(output)) => {
                debug!(tool_id = %id, elapsed_ms, "Tool completed");
                Invocation::completed(output, elapsed_ms)
            }
            Ok(Err(e)) => {
                warn!(tool_id = %id, error = %e, "Tool failed");
                Invocation::failed(e.to_string(), elapsed_ms)
            }
            Err(_) => {
                let e = ToolError::Timeout {
                    tool_id: id.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                };
                warn!(tool_id = %id, "Tool timed out");
                Invocation::failed(e.to_string(), elapsed_ms)
            }
        }
    }

    /// The single best fuzzy match for a query, or `None` when nothing
    /// clears the scorer's minimum. Ties go to the earliest-registered tool.
    pub fn find_best_match(&self, query: &str) -> Option<&RegisteredTool> {
        let mut best: Option<(&RegisteredTool, u32)> = None;
        for tool in &self.tools {
            let score = self.scorer.score(query, &tool.spec);
            if score < self.scorer.minimum() {
                continue;
            }
            // Strictly greater: earlier registration wins ties.
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((tool, score));
            }
        }
        best.map(|(tool, _)| tool)
    }

    /// All tools in a category, registration order.
    pub fn get_by_category(&self, category: &str) -> Vec<&RegisteredTool> {
        self.tools
            .iter()
            .filter(|t| t.spec.category == category)
            .collect()
    }

    /// Category labels with per-category tool counts, sorted by label.
    pub fn categories(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tool in &self.tools {
            *counts.entry(tool.spec.category.as_str()).or_default() += 1;
        }
        let mut out: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(cat, n)| (cat.to_string(), n))
            .collect();
        out.sort();
        out
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
