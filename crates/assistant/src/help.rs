//! The help short-circuit: a capability listing built straight from the
//! registry, so it never goes stale as tools are added or removed.

use crate::AssistantResponse;
use devchest_tools::ToolRegistry;

/// Render the full capability listing for a help request.
pub(crate) fn help_response(registry: &ToolRegistry) -> AssistantResponse {
    let mut text = String::from("Here's what I can do:\n");

    for (category, count) in registry.categories() {
        let label = if count == 1 { "tool" } else { "tools" };
        text.push_str(&format!("\n**{category}** ({count} {label})\n"));
        for tool in registry.get_by_category(&category) {
            text.push_str(&format!("- {}: {}\n", tool.spec.name, tool.spec.description));
        }
    }

    text.push_str("\nAsk in plain words, e.g. \"generate 3 uuids\" or \"encode hello in base64\".");

    AssistantResponse {
        text,
        suggestions: Some(suggestions(registry)),
        tool_result: None,
        intent: None,
        navigate_to: None,
        error: None,
    }
}

/// Example actions to surface when the assistant could not do better. One
/// entry per registered capability it has a canned phrasing for, plus a
/// generic closer.
pub(crate) fn suggestions(registry: &ToolRegistry) -> Vec<String> {
    const EXAMPLES: &[(&str, &str)] = &[
        ("uuid-generator", "generate a uuid"),
        ("base64-encode", "encode hello in base64"),
        ("hash-sha256", "hash my text with sha256"),
        ("timestamp-converter", "convert 1700000000 to a date"),
        ("url-encode", "url encode a query string"),
        ("json-formatter", "open the json formatter"),
    ];

    let mut out: Vec<String> = EXAMPLES
        .iter()
        .filter(|(id, _)| registry.get(id).is_some())
        .map(|(_, example)| example.to_string())
        .collect();
    out.push("type 'help' to see everything".to_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use devchest_tools::default_registry;

    #[test]
    fn help_lists_every_category() {
        let registry = default_registry();
        let response = help_response(&registry);
        for (category, _) in registry.categories() {
            assert!(
                response.text.contains(&category),
                "missing category {category}"
            );
        }
        assert!(!response.suggestions.as_ref().unwrap().is_empty());
    }

    #[test]
    fn suggestions_track_registered_tools() {
        let empty = ToolRegistry::new();
        // Only the generic closer survives an empty registry.
        assert_eq!(suggestions(&empty).len(), 1);

        let full = default_registry();
        assert!(suggestions(&full).len() > 3);
    }
}
