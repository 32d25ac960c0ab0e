//! SHA-256 digest tool.

use async_trait::async_trait;
use devchest_core::error::ToolError;
use devchest_core::tool::{ToolHandler, ToolKind, ToolOutput, ToolSpec};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::sync::Arc;

pub struct Sha256Digest;

impl Sha256Digest {
    pub fn spec() -> ToolSpec {
        ToolSpec {
            id: "hash-sha256".into(),
            name: "SHA-256 Hash".into(),
            description: "Compute the SHA-256 digest of text".into(),
            category: "hashing".into(),
            input_schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "value": { "type": "string", "description": "The text to hash" }
                },
                "required": ["value"]
            })),
        }
    }

    pub fn kind() -> ToolKind {
        ToolKind::Executable(Arc::new(Self))
    }
}

#[async_trait]
impl ToolHandler for Sha256Digest {
    async fn run(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let value = params["value"]
            .as_str()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ToolError::InvalidParams("Missing 'value' to hash".into()))?;

        let digest = Sha256::digest(value.as_bytes());
        let mut hex = String::with_capacity(64);
        for byte in digest {
            let _ = write!(hex, "{byte:02x}");
        }

        Ok(ToolOutput::with_data(
            format!("SHA-256: {hex}"),
            serde_json::json!({ "sha256": hex }),
        ))
    }
}
