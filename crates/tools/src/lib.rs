//! Tool registry and built-in tools for the devchest assistant.
//!
//! Tools come in three kinds: executable capabilities (pure transforms like
//! the base64 codec), navigable screens (UI pages the assistant can send the
//! user to), and tools that are both. The registry owns lookup, fuzzy
//! matching, and guarded execution; the modules below are the built-in
//! capabilities the assistant ships with.

pub mod base64_codec;
pub mod hash_digest;
pub mod registry;
pub mod scoring;
pub mod timestamp;
pub mod url_codec;
pub mod uuid_gen;

pub use registry::{RegisteredTool, ToolRegistry};
pub use scoring::{ScoringStrategy, TokenOverlapScorer};

use devchest_core::tool::{ToolKind, ToolSpec};

/// Create a registry with every built-in tool registered.
///
/// Executable tools cover the transforms the assistant can answer inline;
/// the navigable-only entries are utility screens in the host UI the
/// assistant can redirect to.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(uuid_gen::UuidGenerator::spec(), uuid_gen::UuidGenerator::kind());
    registry.register(base64_codec::Base64Encode::spec(), base64_codec::Base64Encode::kind());
    registry.register(base64_codec::Base64Decode::spec(), base64_codec::Base64Decode::kind());
    registry.register(url_codec::UrlEncode::spec(), url_codec::UrlEncode::kind());
    registry.register(url_codec::UrlDecode::spec(), url_codec::UrlDecode::kind());
    registry.register(hash_digest::Sha256Digest::spec(), hash_digest::Sha256Digest::kind());
    registry.register(
        timestamp::TimestampConverter::spec(),
        timestamp::TimestampConverter::kind(),
    );

    // Screens without an inline capability.
    registry.register(
        screen("json-formatter", "JSON Formatter", "Format and validate JSON documents", "formatters"),
        ToolKind::Navigable { route: "/json-formatter".into() },
    );
    registry.register(
        screen("color-picker", "Color Picker", "Pick colors and convert between hex, RGB, and HSL", "design"),
        ToolKind::Navigable { route: "/color-picker".into() },
    );
    registry.register(
        screen("regex-tester", "Regex Tester", "Test regular expressions against sample text", "testing"),
        ToolKind::Navigable { route: "/regex-tester".into() },
    );

    registry
}

fn screen(id: &str, name: &str, description: &str, category: &str) -> ToolSpec {
    ToolSpec {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        category: category.into(),
        input_schema: None,
    }
}
