//! Multi-conversation store.
//!
//! Holds every conversation in memory and mirrors each mutation to the
//! host's key-value store. Persistence is best-effort: a storage failure is
//! logged and swallowed, and the store keeps serving from memory — the
//! availability of the assistant never depends on the durability layer.
//!
//! Lookup misses are values, not errors: `add_message` on an unknown id
//! returns `None`, `import` of malformed JSON returns `None`.

use chrono::{DateTime, Utc};
use devchest_core::message::{Conversation, Message, Role};
use devchest_core::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

const INDEX_KEY: &str = "conversations:index";

fn conversation_key(id: &str) -> String {
    format!("conversations:{id}")
}

/// Fields `update` may merge. The conversation id is deliberately absent:
/// it cannot be changed by construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Lenient import shape: `{id, name, messages[]}` is the minimum; timestamps
/// and provider metadata are salvaged when present.
#[derive(Deserialize)]
struct ImportDocument {
    // Present in any well-formed export; its value is discarded — imports
    // always get a fresh id to avoid collisions.
    #[allow(dead_code)]
    id: String,
    name: String,
    messages: Vec<Message>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

/// The conversation store: in-memory state of record, persisted best-effort.
pub struct ConversationStore {
    conversations: RwLock<Vec<Conversation>>,
    storage: Box<dyn KeyValueStore>,
}

impl ConversationStore {
    /// Open a store over the given persistence collaborator, loading any
    /// previously persisted conversations. Corrupt or unreadable entries are
    /// skipped with a warning.
    pub fn new(storage: Box<dyn KeyValueStore>) -> Self {
        let mut conversations = Vec::new();

        match storage.get(INDEX_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(ids) => {
                    for id in ids {
                        match storage.get(&conversation_key(&id)) {
                            Ok(Some(doc)) => match serde_json::from_str::<Conversation>(&doc) {
                                Ok(conv) => conversations.push(conv),
                                Err(e) => {
                                    warn!(conversation_id = %id, error = %e, "Skipping corrupt conversation")
                                }
                            },
                            Ok(None) => {}
                            Err(e) => warn!(conversation_id = %id, error = %e, "Storage read failed"),
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Corrupt conversation index, starting empty"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Storage unavailable, starting in-memory only"),
        }

        Self {
            conversations: RwLock::new(conversations),
            storage,
        }
    }

    /// Create a conversation with a fresh id and empty message list.
    pub fn create(
        &self,
        name: impl Into<String>,
        provider: Option<String>,
        model: Option<String>,
    ) -> Conversation {
        let mut conv = Conversation::new(name);
        conv.provider = provider;
        conv.model = model;

        let snapshot = conv.clone();
        {
            let mut conversations = self.write();
            conversations.push(conv);
        }
        self.persist(&snapshot);
        self.persist_index();
        debug!(conversation_id = %snapshot.id, "Created conversation");
        snapshot
    }

    pub fn get(&self, id: &str) -> Option<Conversation> {
        self.read().iter().find(|c| c.id == id).cloned()
    }

    /// All conversations, most recently updated first.
    pub fn list(&self) -> Vec<Conversation> {
        let mut all: Vec<Conversation> = self.read().clone();
        all.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        all
    }

    /// Append a message. Returns the stored message, or `None` when the
    /// conversation id is unknown — never an error.
    pub fn add_message(&self, id: &str, role: Role, content: impl Into<String>) -> Option<Message> {
        let message = Message {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            tool_result: None,
        };
        self.append(id, message)
    }

    /// Append a pre-built message (used when a turn carries a tool payload).
    pub fn append(&self, id: &str, message: Message) -> Option<Message> {
        let snapshot = {
            let mut conversations = self.write();
            let conv = conversations.iter_mut().find(|c| c.id == id)?;
            conv.push(message.clone());
            conv.clone()
        };
        self.persist(&snapshot);
        Some(message)
    }

    /// Merge patch fields into a conversation. The id is never altered.
    pub fn update(&self, id: &str, patch: ConversationPatch) -> Option<Conversation> {
        let snapshot = {
            let mut conversations = self.write();
            let conv = conversations.iter_mut().find(|c| c.id == id)?;
            if let Some(name) = patch.name {
                conv.name = name;
            }
            if let Some(provider) = patch.provider {
                conv.provider = Some(provider);
            }
            if let Some(model) = patch.model {
                conv.model = Some(model);
            }
            conv.updated_at = Utc::now();
            conv.clone()
        };
        self.persist(&snapshot);
        Some(snapshot)
    }

    pub fn rename(&self, id: &str, name: impl Into<String>) -> bool {
        self.update(
            id,
            ConversationPatch {
                name: Some(name.into()),
                ..Default::default()
            },
        )
        .is_some()
    }

    pub fn delete(&self, id: &str) -> bool {
        let removed = {
            let mut conversations = self.write();
            let before = conversations.len();
            conversations.retain(|c| c.id != id);
            conversations.len() < before
        };
        if removed {
            if let Err(e) = self.storage.remove(&conversation_key(id)) {
                warn!(conversation_id = %id, error = %e, "Failed to remove persisted conversation");
            }
            self.persist_index();
        }
        removed
    }

    /// Serialize a conversation to a pretty JSON document.
    pub fn export(&self, id: &str) -> Option<String> {
        let conv = self.get(id)?;
        serde_json::to_string_pretty(&conv).ok()
    }

    /// Render a conversation as a Markdown transcript.
    pub fn export_markdown(&self, id: &str) -> Option<String> {
        let conv = self.get(id)?;
        let mut out = format!("# {}\n\n", conv.name);

        if let Some(provider) = &conv.provider {
            out.push_str(&format!("- Provider: {provider}\n"));
        }
        if let Some(model) = &conv.model {
            out.push_str(&format!("- Model: {model}\n"));
        }
        out.push_str(&format!(
            "- Created: {}\n\n---\n\n",
            conv.created_at.to_rfc3339()
        ));

        for msg in &conv.messages {
            out.push_str(&format!(
                "**{}** ({}):\n\n{}\n\n",
                msg.role.as_str(),
                msg.timestamp.to_rfc3339(),
                msg.content
            ));
        }
        Some(out)
    }

    /// Import a previously exported conversation.
    ///
    /// Validates the minimal `{id, name, messages[]}` shape and **always
    /// regenerates the id** so an import can never collide with an existing
    /// conversation. Malformed input yields `None`.
    pub fn import(&self, json: &str) -> Option<Conversation> {
        let doc: ImportDocument = match serde_json::from_str(json) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "Rejected malformed conversation import");
                return None;
            }
        };

        let now = Utc::now();
        let conv = Conversation {
            id: Uuid::new_v4().to_string(),
            name: doc.name,
            messages: doc.messages,
            created_at: doc.created_at.unwrap_or(now),
            updated_at: doc.updated_at.unwrap_or(now),
            provider: doc.provider,
            model: doc.model,
        };

        let snapshot = conv.clone();
        self.write().push(conv);
        self.persist(&snapshot);
        self.persist_index();
        debug!(conversation_id = %snapshot.id, "Imported conversation");
        Some(snapshot)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- persistence (best-effort) ---

    fn persist(&self, conv: &Conversation) {
        let doc = match serde_json::to_string(conv) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(conversation_id = %conv.id, error = %e, "Failed to serialize conversation");
                return;
            }
        };
        if let Err(e) = self.storage.set(&conversation_key(&conv.id), &doc) {
            warn!(conversation_id = %conv.id, error = %e, "Failed to persist conversation");
        }
    }

    fn persist_index(&self) {
        let ids: Vec<String> = self.read().iter().map(|c| c.id.clone()).collect();
        let doc = match serde_json::to_string(&ids) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "Failed to serialize conversation index");
                return;
            }
        };
        if let Err(e) = self.storage.set(INDEX_KEY, &doc) {
            warn!(error = %e, "Failed to persist conversation index");
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Conversation>> {
        match self.conversations.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Conversation>> {
        match self.conversations.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devchest_core::error::StorageError;
    use devchest_core::storage::MemoryStore;

    fn store() -> ConversationStore {
        ConversationStore::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn create_and_get() {
        let s = store();
        let conv = s.create("scratch", None, None);
        assert!(conv.messages.is_empty());

        let fetched = s.get(&conv.id).unwrap();
        assert_eq!(fetched.name, "scratch");
    }

    #[test]
    fn add_message_to_unknown_id_is_none() {
        let s = store();
        assert!(s.add_message("no-such-id", Role::User, "hi").is_none());
    }

    #[test]
    fn add_message_bumps_updated_at() {
        let s = store();
        let conv = s.create("scratch", None, None);
        let before = conv.updated_at;

        let msg = s.add_message(&conv.id, Role::User, "hello").unwrap();
        assert!(!msg.id.is_empty());

        let after = s.get(&conv.id).unwrap();
        assert_eq!(after.messages.len(), 1);
        assert!(after.updated_at >= before);
    }

    #[test]
    fn update_merges_but_never_touches_id() {
        let s = store();
        let conv = s.create("old name", None, None);

        let updated = s
            .update(
                &conv.id,
                ConversationPatch {
                    name: Some("new name".into()),
                    model: Some("test-model".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id, conv.id);
        assert_eq!(updated.name, "new name");
        assert_eq!(updated.model.as_deref(), Some("test-model"));
    }

    #[test]
    fn rename_and_delete_return_booleans() {
        let s = store();
        let conv = s.create("temp", None, None);
        assert!(s.rename(&conv.id, "renamed"));
        assert!(!s.rename("missing", "x"));

        assert!(s.delete(&conv.id));
        assert!(!s.delete(&conv.id));
    }

    #[test]
    fn list_orders_by_recent_update() {
        let s = store();
        let a = s.create("a", None, None);
        let b = s.create("b", None, None);
        s.add_message(&a.id, Role::User, "ping");

        let list = s.list();
        assert_eq!(list[0].id, a.id);
        assert_eq!(list[1].id, b.id);
    }

    #[test]
    fn export_import_roundtrip_regenerates_id() {
        let s = store();
        let conv = s.create("roundtrip", Some("openai-compat".into()), Some("m1".into()));
        s.add_message(&conv.id, Role::User, "question");
        s.add_message(&conv.id, Role::Assistant, "answer");

        let json = s.export(&conv.id).unwrap();
        let imported = s.import(&json).unwrap();

        assert_ne!(imported.id, conv.id);
        assert_eq!(imported.name, "roundtrip");
        assert_eq!(imported.messages.len(), 2);
        assert_eq!(imported.messages[0].content, "question");
        assert_eq!(imported.messages[1].content, "answer");
    }

    #[test]
    fn import_rejects_malformed_json() {
        let s = store();
        assert!(s.import("not json at all").is_none());
        assert!(s.import("{\"name\": \"missing fields\"}").is_none());
        assert!(s.import("{\"id\": 5, \"name\": \"x\", \"messages\": []}").is_none());
    }

    #[test]
    fn markdown_export_has_header_and_roles() {
        let s = store();
        let conv = s.create("md", Some("openai-compat".into()), Some("m1".into()));
        s.add_message(&conv.id, Role::User, "hi there");
        s.add_message(&conv.id, Role::Assistant, "hello!");

        let md = s.export_markdown(&conv.id).unwrap();
        assert!(md.starts_with("# md\n"));
        assert!(md.contains("- Provider: openai-compat"));
        assert!(md.contains("- Model: m1"));
        assert!(md.contains("**user**"));
        assert!(md.contains("**assistant**"));
        assert!(md.contains("hi there"));
    }

    #[test]
    fn survives_broken_storage() {
        struct BrokenStore;
        impl KeyValueStore for BrokenStore {
            fn get(&self, _: &str) -> Result<Option<String>, StorageError> {
                Err(StorageError::Unavailable("offline".into()))
            }
            fn set(&self, key: &str, _: &str) -> Result<(), StorageError> {
                Err(StorageError::QuotaExceeded(key.into()))
            }
            fn remove(&self, _: &str) -> Result<(), StorageError> {
                Err(StorageError::Unavailable("offline".into()))
            }
        }

        let s = ConversationStore::new(Box::new(BrokenStore));
        let conv = s.create("volatile", None, None);
        assert!(s.add_message(&conv.id, Role::User, "still works").is_some());
        assert_eq!(s.get(&conv.id).unwrap().messages.len(), 1);
        assert!(s.delete(&conv.id));
    }

    #[test]
    fn reloads_persisted_conversations() {
        let storage = std::sync::Arc::new(MemoryStore::new());

        struct SharedStore(std::sync::Arc<MemoryStore>);
        impl KeyValueStore for SharedStore {
            fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
                self.0.get(key)
            }
            fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
                self.0.set(key, value)
            }
            fn remove(&self, key: &str) -> Result<(), StorageError> {
                self.0.remove(key)
            }
        }

        let id = {
            let s = ConversationStore::new(Box::new(SharedStore(storage.clone())));
            let conv = s.create("persistent", None, None);
            s.add_message(&conv.id, Role::User, "remember me");
            conv.id
        };

        let reopened = ConversationStore::new(Box::new(SharedStore(storage)));
        let conv = reopened.get(&id).unwrap();
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.messages[0].content, "remember me");
    }
}
