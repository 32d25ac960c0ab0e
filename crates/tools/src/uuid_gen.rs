//! UUID generator tool.

use async_trait::async_trait;
use devchest_core::error::ToolError;
use devchest_core::tool::{ToolHandler, ToolKind, ToolOutput, ToolSpec};
use std::sync::Arc;
use uuid::Uuid;

/// Most the tool will generate in one call, whatever the query asked for.
const MAX_QUANTITY: u64 = 100;

pub struct UuidGenerator;

impl UuidGenerator {
    pub fn spec() -> ToolSpec {
        ToolSpec {
            id: "uuid-generator".into(),
            name: "UUID Generator".into(),
            description: "Generate random v4 UUIDs".into(),
            category: "generators".into(),
            input_schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "quantity": {
                        "type": "integer",
                        "description": "How many UUIDs to generate (default 1, max 100)"
                    }
                }
            })),
        }
    }

    pub fn kind() -> ToolKind {
        ToolKind::Executable(Arc::new(Self))
    }
}

#[async_trait]
impl ToolHandler for UuidGenerator {
    async fn run(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let quantity = match &params["quantity"] {
            serde_json::Value::Null => 1,
            v => v
                .as_u64()
                .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
                .ok_or_else(|| ToolError::InvalidParams("'quantity' must be a number".into()))?,
        }
        .clamp(1, MAX_QUANTITY);

        let uuids: Vec<String> = (0..quantity).map(|_| Uuid::new_v4().to_string()).collect();

        let message = if uuids.len() == 1 {
            format!("UUID: {}", uuids[0])
        } else {
            format!("Generated {} UUIDs:\n{}", uuids.len(), uuids.join("\n"))
        };

        Ok(ToolOutput::with_data(
            message,
            serde_json::json!({ "uuids": uuids }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generates_one_by_default() {
        let out = UuidGenerator.run(serde_json::json!({})).await.unwrap();
        assert!(out.message.starts_with("UUID: "));
        // 36 chars of uuid after the prefix
        assert_eq!(out.message.len(), 6 + 36);
    }

    #[tokio::test]
    async fn honors_quantity_and_caps_it() {
        let out = UuidGenerator
            .run(serde_json::json!({"quantity": 3}))
            .await
            .unwrap();
        assert!(out.message.contains("3 UUIDs"));

        let out = UuidGenerator
            .run(serde_json::json!({"quantity": 5000}))
            .await
            .unwrap();
        assert!(out.message.contains("100 UUIDs"));
    }

    #[tokio::test]
    async fn string_quantity_is_accepted() {
        let out = UuidGenerator
            .run(serde_json::json!({"quantity": "2"}))
            .await
            .unwrap();
        assert!(out.message.contains("2 UUIDs"));
    }

    #[tokio::test]
    async fn garbage_quantity_is_invalid_params() {
        let err = UuidGenerator
            .run(serde_json::json!({"quantity": "many"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }
}
