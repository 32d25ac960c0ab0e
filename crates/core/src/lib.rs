//! # devchest Core
//!
//! Domain types, traits, and error definitions for the devchest assistant
//! subsystem. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator the assistant talks to is defined as a trait here:
//! tool handlers, the completion provider, key-value persistence.
//! Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod intent;
pub mod message;
pub mod provider;
pub mod storage;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{ConversationError, Error, ProviderError, Result, StorageError, ToolError};
pub use intent::{Intent, IntentLabel, EXEC_CONFIDENCE, LOW_CONFIDENCE};
pub use message::{Conversation, Message, Role};
pub use provider::{Completion, CompletionProvider, Usage};
pub use storage::{KeyValueStore, MemoryStore};
pub use tool::{
    Invocation, InvocationOutcome, ToolHandler, ToolKind, ToolOutput, ToolSpec,
};
