//! The assistant orchestrator.
//!
//! One entry point: [`Assistant::process_message`]. Each incoming utterance
//! walks a fixed pipeline — help short-circuit, intent parse, navigation,
//! tool execution, AI fallback, templated fallback — and **every** path
//! terminates in a non-empty user-visible reply. Provider outages, tool
//! failures, and unparseable input degrade the answer, never the
//! availability.
//!
//! Concurrency contract: one `process_message` at a time per instance
//! (`&mut self` enforces this for direct owners). Overlapping calls for the
//! same conversation would interleave history and are not supported.

mod fallback;
mod help;

pub use fallback::templated_reply;

use devchest_config::AssistantConfig;
use devchest_conversations::ConversationStore;
use devchest_core::error::Error;
use devchest_core::intent::{Intent, IntentLabel};
use devchest_core::message::{Message, Role};
use devchest_core::provider::CompletionProvider;
use devchest_core::storage::MemoryStore;
use devchest_core::tool::{Invocation, InvocationOutcome};
use devchest_knowledge::{KnowledgeBase, SearchMethod};
use devchest_providers::HttpCompletionProvider;
use devchest_tools::{default_registry, RegisteredTool, ToolRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const SYSTEM_PROMPT: &str = "You are the devchest assistant, a concise helper embedded in a \
developer-utilities toolkit. Answer briefly and practically. When a question maps to one of \
the toolkit's utilities, point the user at it.";

/// What a processed message resolves to.
///
/// `text` is always present and non-empty; the rest depends on the path the
/// pipeline took.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<Invocation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssistantResponse {
    fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_result: None,
            intent: None,
            suggestions: None,
            navigate_to: None,
            error: None,
        }
    }
}

/// The explicit context object composing every collaborator.
///
/// There is no global state anywhere in this system: construct one
/// `Assistant` per session and pass it by reference. Tests construct
/// isolated instances freely.
pub struct Assistant {
    registry: Arc<ToolRegistry>,
    knowledge: Arc<KnowledgeBase>,
    provider: Arc<dyn CompletionProvider>,
    conversations: ConversationStore,
    conversation_id: String,
    config: AssistantConfig,
    system_prompt: String,
}

impl Assistant {
    /// Compose an assistant from explicit collaborators.
    pub fn new(
        registry: Arc<ToolRegistry>,
        knowledge: Arc<KnowledgeBase>,
        provider: Arc<dyn CompletionProvider>,
        conversations: ConversationStore,
        config: AssistantConfig,
    ) -> Self {
        let conversation = conversations.create(
            "New conversation",
            Some(provider.name().to_string()),
            Some(config.provider.model.clone()),
        );
        Self {
            registry,
            knowledge,
            provider,
            conversations,
            conversation_id: conversation.id,
            config,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    /// Build a fully wired assistant from configuration: built-in tools,
    /// empty knowledge base, HTTP completion provider, in-memory
    /// persistence.
    pub fn from_config(config: AssistantConfig) -> Result<Self, Error> {
        config
            .validate()
            .map_err(|e| Error::Config { message: e.to_string() })?;

        let registry = default_registry()
            .with_timeout(Duration::from_secs(config.orchestrator.tool_timeout_secs));
        let knowledge = KnowledgeBase::with_cache_size(config.cache.max_entries)
            .with_search_ttl(Duration::from_secs(config.cache.search_ttl_secs));
        let provider = HttpCompletionProvider::new(config.provider.clone())?;
        let conversations = ConversationStore::new(Box::new(MemoryStore::new()));

        Ok(Self::new(
            Arc::new(registry),
            Arc::new(knowledge),
            Arc::new(provider),
            conversations,
            config,
        ))
    }

    /// Override the fallback system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }

    /// Drop the current transcript and start a fresh conversation. History
    /// is only ever cleared through this explicit call.
    pub fn clear_history(&mut self) {
        let conversation = self.conversations.create(
            "New conversation",
            Some(self.provider.name().to_string()),
            Some(self.config.provider.model.clone()),
        );
        info!(conversation_id = %conversation.id, "History cleared");
        self.conversation_id = conversation.id;
    }

    /// Process one user utterance into a reply.
    pub async fn process_message(&mut self, text: &str) -> AssistantResponse {
        info!(conversation_id = %self.conversation_id, "Processing message");
        self.record(Role::User, text, None);

        let response = self.run_pipeline(text).await;

        let payload = response
            .tool_result
            .as_ref()
            .and_then(|inv| serde_json::to_value(inv).ok());
        self.record(Role::Assistant, &response.text, payload);
        response
    }

    async fn run_pipeline(&mut self, text: &str) -> AssistantResponse {
        // 1. Help short-circuits everything, provider untouched.
        if devchest_intent::is_help_request(text) {
            debug!("Help request, returning capability listing");
            return help::help_response(&self.registry);
        }

        // 2. Parse. Infallible; low confidence is data, not an error.
        let intent = devchest_intent::parse(text);

        // 3. Pure navigation: the user asked to go somewhere.
        if intent.label == IntentLabel::Navigate {
            if let Some(tool) = self.resolve_tool(&intent, text) {
                if let Some(route) = tool.kind.route() {
                    debug!(tool_id = %tool.spec.id, route = %route, "Navigation intent");
                    return AssistantResponse {
                        text: format!("Opening {}.", tool.spec.name),
                        navigate_to: Some(route.to_string()),
                        intent: Some(intent),
                        tool_result: None,
                        suggestions: None,
                        error: None,
                    };
                }
            }
        }

        // 4. Tool execution. A resolved tool (explicit suggestion or fuzzy
        // match) is executed outright; with no tool but decent confidence
        // there is nothing to run, so both cases fall through to the
        // provider.
        let mut tool_error = None;
        if let Some(tool) = self.resolve_tool(&intent, text) {
            let tool_id = tool.spec.id.clone();
            let tool_name = tool.spec.name.clone();
            let params = params_from(&intent);
            let invocation = self.registry.execute(&tool_id, params).await;

            match &invocation.outcome {
                InvocationOutcome::Completed(output) => {
                    return AssistantResponse {
                        text: output.message.clone(),
                        tool_result: Some(invocation),
                        intent: Some(intent),
                        suggestions: None,
                        navigate_to: None,
                        error: None,
                    };
                }
                InvocationOutcome::NavigationRequested { route } => {
                    // The "tool" is a screen: redirect instead.
                    return AssistantResponse {
                        text: format!("Opening {tool_name}."),
                        navigate_to: Some(route.clone()),
                        intent: Some(intent),
                        tool_result: None,
                        suggestions: None,
                        error: None,
                    };
                }
                InvocationOutcome::Failed { error } => {
                    warn!(tool_id = %tool_id, error = %error, "Tool failed, falling back");
                    tool_error = Some(error.clone());
                }
            }
        } else if intent.authorizes_execution() {
            debug!(
                confidence = intent.confidence,
                "Confidence authorizes execution but no tool resolved"
            );
        }

        // 5. AI fallback, then the deterministic template when the provider
        // is down too.
        self.ai_fallback(text, intent, tool_error).await
    }

    /// The tool this intent points at: an explicit suggestion that exists in
    /// the registry wins; otherwise the best fuzzy match for the raw query.
    fn resolve_tool(&self, intent: &Intent, text: &str) -> Option<RegisteredTool> {
        if let Some(suggested) = &intent.suggested_tool {
            if let Some(tool) = self.registry.get(suggested) {
                return Some(tool.clone());
            }
            debug!(tool_id = %suggested, "Suggested tool not registered, trying fuzzy match");
        }
        self.registry.find_best_match(text).cloned()
    }

    async fn ai_fallback(
        &mut self,
        text: &str,
        intent: Intent,
        tool_error: Option<String>,
    ) -> AssistantResponse {
        let window = self.provider_window(text);

        match self.provider.send(&window).await {
            Ok(completion) if !completion.message.trim().is_empty() => {
                debug!(model = %completion.model, "Provider reply");
                AssistantResponse {
                    text: completion.message,
                    intent: Some(intent),
                    tool_result: None,
                    suggestions: None,
                    navigate_to: None,
                    error: tool_error,
                }
            }
            Ok(_) => {
                warn!("Provider returned an empty reply, using templated fallback");
                self.templated(intent, tool_error, None)
            }
            Err(e) => {
                warn!(error = %e, "Provider failed, using templated fallback");
                let provider_error = e.to_string();
                self.templated(intent, tool_error, Some(provider_error))
            }
        }
    }

    fn templated(
        &self,
        intent: Intent,
        tool_error: Option<String>,
        provider_error: Option<String>,
    ) -> AssistantResponse {
        let text = templated_reply(&intent);
        let suggestions = help::suggestions(&self.registry);
        AssistantResponse {
            text,
            intent: Some(intent),
            tool_result: None,
            suggestions: Some(suggestions),
            navigate_to: None,
            error: provider_error.or(tool_error),
        }
    }

    /// System prompt (+ knowledge context when the corpus has anything
    /// relevant) followed by the last N turns, current message included.
    fn provider_window(&self, text: &str) -> Vec<Message> {
        let mut system = self.system_prompt.clone();

        let hits = self
            .knowledge
            .search(text, SearchMethod::Keyword, 3);
        if !hits.is_empty() {
            let docs: Vec<_> = hits.into_iter().map(|h| h.document).collect();
            let include_full = KnowledgeBase::wants_full_context(text);
            let context = KnowledgeBase::build_context(
                &docs,
                self.config.orchestrator.context_max_len,
                include_full,
            );
            if !context.is_empty() {
                system.push_str("\n\nRelevant notes from the user's documents:\n");
                system.push_str(&context);
            }
        }

        let mut window = vec![Message::system(system)];
        if let Some(conv) = self.conversations.get(&self.conversation_id) {
            window.extend(
                conv.last_turns(self.config.orchestrator.history_window)
                    .iter()
                    .cloned(),
            );
        }
        window
    }

    fn record(&self, role: Role, content: &str, tool_payload: Option<serde_json::Value>) {
        let mut message = match role {
            Role::User => Message::user(content),
            Role::Assistant => Message::assistant(content),
            Role::System => Message::system(content),
        };
        if let Some(payload) = tool_payload {
            message = message.with_tool_result(payload);
        }
        if self
            .conversations
            .append(&self.conversation_id, message)
            .is_none()
        {
            warn!(conversation_id = %self.conversation_id, "Active conversation missing; turn not recorded");
        }
    }
}

/// Tool parameters from the parsed entities: a flat JSON object of the
/// extracted strings. Tools coerce their own types, so "quantity" may stay a
/// numeric string here.
fn params_from(intent: &Intent) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (key, value) in &intent.entities {
        map.insert(key.clone(), serde_json::Value::String(value.clone()));
    }
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use devchest_core::error::ProviderError;
    use devchest_core::provider::Completion;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A scripted provider: replies with a fixed message, or fails when
    /// constructed with `down()`. Counts calls so tests can assert the
    /// provider was (not) consulted.
    struct MockProvider {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn down() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CompletionProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn send(&self, _messages: &[Message]) -> Result<Completion, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(reply) => Ok(Completion {
                    message: reply.clone(),
                    model: "mock-model".into(),
                    usage: None,
                }),
                None => Err(ProviderError::Network("connection refused".into())),
            }
        }
    }

    fn assistant_with(provider: Arc<dyn CompletionProvider>) -> Assistant {
        Assistant::new(
            Arc::new(default_registry()),
            Arc::new(KnowledgeBase::new()),
            provider,
            ConversationStore::new(Box::new(MemoryStore::new())),
            AssistantConfig::default(),
        )
    }

    #[tokio::test]
    async fn help_skips_the_provider() {
        let provider = Arc::new(MockProvider::replying("should not appear"));
        let mut assistant = assistant_with(provider.clone());

        let response = assistant.process_message("help").await;
        assert!(response.text.contains("generators"));
        assert!(response.suggestions.is_some());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn suggested_tool_executes() {
        let mut assistant = assistant_with(Arc::new(MockProvider::down()));
        let response = assistant.process_message("generate a uuid").await;
        assert!(response.text.starts_with("UUID: "));
        assert!(response.tool_result.as_ref().unwrap().success());
        assert_eq!(
            response.intent.as_ref().unwrap().label,
            IntentLabel::Generate
        );
    }

    #[tokio::test]
    async fn navigation_intent_returns_route() {
        let mut assistant = assistant_with(Arc::new(MockProvider::down()));
        let response = assistant.process_message("open the json formatter").await;
        assert_eq!(response.navigate_to.as_deref(), Some("/json-formatter"));
        assert!(response.text.contains("JSON Formatter"));
    }

    #[tokio::test]
    async fn question_goes_to_the_provider() {
        let mut assistant =
            assistant_with(Arc::new(MockProvider::replying("It decouples construction.")));
        let response = assistant
            .process_message("what is dependency injection about")
            .await;
        assert_eq!(response.text, "It decouples construction.");
        assert!(response.tool_result.is_none());
    }

    #[tokio::test]
    async fn provider_outage_yields_templated_reply() {
        let mut assistant = assistant_with(Arc::new(MockProvider::down()));
        let response = assistant.process_message("why is the sky blue today").await;
        assert!(!response.text.is_empty());
        assert!(response.suggestions.is_some());
        assert!(response.error.is_some());
    }

    #[tokio::test]
    async fn gibberish_still_gets_a_reply() {
        let mut assistant = assistant_with(Arc::new(MockProvider::down()));
        let response = assistant.process_message("xqzt vvpl mnor").await;
        assert!(!response.text.is_empty());
    }

    #[tokio::test]
    async fn turns_are_recorded_in_the_conversation() {
        let mut assistant = assistant_with(Arc::new(MockProvider::replying("hi there")));
        assistant.process_message("hello how are you doing").await;

        let conv = assistant
            .conversations()
            .get(assistant.conversation_id())
            .unwrap();
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[0].role, Role::User);
        assert_eq!(conv.messages[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn tool_invocations_are_attached_to_the_transcript() {
        let mut assistant = assistant_with(Arc::new(MockProvider::down()));
        assistant.process_message("generate a uuid").await;

        let conv = assistant
            .conversations()
            .get(assistant.conversation_id())
            .unwrap();
        let reply = &conv.messages[1];
        assert!(reply.tool_result.is_some());
    }

    #[tokio::test]
    async fn clear_history_starts_a_fresh_conversation() {
        let mut assistant = assistant_with(Arc::new(MockProvider::replying("ok")));
        assistant.process_message("hello there friend").await;
        let old_id = assistant.conversation_id().to_string();

        assistant.clear_history();
        assert_ne!(assistant.conversation_id(), old_id);
        let conv = assistant
            .conversations()
            .get(assistant.conversation_id())
            .unwrap();
        assert!(conv.messages.is_empty());
    }

    #[test]
    fn params_carry_entities_through() {
        let mut intent = Intent::unknown("generate 3 uuids");
        intent.entities.insert("quantity".into(), "3".into());
        let params = params_from(&intent);
        assert_eq!(params["quantity"], "3");
    }
}
