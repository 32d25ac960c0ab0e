//! Base64 encode/decode tools.
//!
//! Both are `Both`-kind tools: they execute inline and also have a dedicated
//! screen in the host UI.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use devchest_core::error::ToolError;
use devchest_core::tool::{ToolHandler, ToolKind, ToolOutput, ToolSpec};
use std::sync::Arc;

fn value_param(params: &serde_json::Value) -> Result<&str, ToolError> {
    params["value"]
        .as_str()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ToolError::InvalidParams("Missing 'value' to process".into()))
}

fn text_schema(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "value": { "type": "string", "description": description }
        },
        "required": ["value"]
    })
}

pub struct Base64Encode;

impl Base64Encode {
    pub fn spec() -> ToolSpec {
        ToolSpec {
            id: "base64-encode".into(),
            name: "Base64 Encode".into(),
            description: "Encode text as base64".into(),
            category: "encoders".into(),
            input_schema: Some(text_schema("The text to encode")),
        }
    }

    pub fn kind() -> ToolKind {
        ToolKind::Both {
            route: "/base64".into(),
            handler: Arc::new(Self),
        }
    }
}

#[async_trait]
impl ToolHandler for Base64Encode {
    async fn run(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let value = value_param(&params)?;
        let encoded = STANDARD.encode(value.as_bytes());
        Ok(ToolOutput::with_data(
            format!("Base64: {encoded}"),
            serde_json::json!({ "encoded": encoded }),
        ))
    }
}

pub struct Base64Decode;

impl Base64Decode {
    pub fn spec() -> ToolSpec {
        ToolSpec {
            id: "base64-decode".into(),
            name: "Base64 Decode".into(),
            description: "Decode a base64 string back to text".into(),
            category: "encoders".into(),
            input_schema: Some(text_schema("The base64 string to decode")),
        }
    }

    pub fn kind() -> ToolKind {
        ToolKind::Both {
            route: "/base64".into(),
            handler: Arc::new(Self),
        }
    }
}

#[async_trait]
impl ToolHandler for Base64Decode {
    async fn run(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let value = value_param(&params)?;
        let bytes = STANDARD.decode(value.trim()).map_err(|e| {
            ToolError::ExecutionFailed {
                tool_id: "base64-decode".into(),
                reason: format!("not valid base64: {e}"),
            }
        })?;
        let decoded = String::from_utf8(bytes).map_err(|_| ToolError::ExecutionFailed {
            tool_id: "base64-decode".into(),
            reason: "decoded bytes are not valid UTF-8".into(),
        })?;
        Ok(ToolOutput::with_data(
            format!("Decoded: {decoded}"),
            serde_json::json!({ "decoded": decoded }),
        ))
    }
}
