//! Percent-encoding tools (RFC 3986).
//!
//! Hand-rolled codec over std — unreserved characters pass through, every
//! other byte becomes `%XX`.

use async_trait::async_trait;
use devchest_core::error::ToolError;
use devchest_core::tool::{ToolHandler, ToolKind, ToolOutput, ToolSpec};
use std::sync::Arc;

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

/// Percent-encode every byte outside the RFC 3986 unreserved set.
pub fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else {
            out.push('%');
            out.push_str(&format!("{byte:02X}"));
        }
    }
    out
}

/// Decode `%XX` sequences (and `+` as space). Fails on truncated or
/// non-hex escapes and on non-UTF-8 results.
pub fn percent_decode(input: &str) -> Result<String, String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .ok_or_else(|| "truncated % escape".to_string())?;
                let hex = std::str::from_utf8(hex).map_err(|_| "invalid % escape".to_string())?;
                let byte =
                    u8::from_str_radix(hex, 16).map_err(|_| format!("invalid escape %{hex}"))?;
                out.push(byte);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| "decoded bytes are not valid UTF-8".to_string())
}

fn value_param(params: &serde_json::Value) -> Result<&str, ToolError> {
    params["value"]
        .as_str()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ToolError::InvalidParams("Missing 'value' to process".into()))
}

fn url_schema(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "value": { "type": "string", "description": description }
        },
        "required": ["value"]
    })
}

pub struct UrlEncode;

impl UrlEncode {
    pub fn spec() -> ToolSpec {
        ToolSpec {
            id: "url-encode".into(),
            name: "URL Encode".into(),
            description: "Percent-encode text for safe use in URLs".into(),
            category: "encoders".into(),
            input_schema: Some(url_schema("The text to percent-encode")),
        }
    }

    pub fn kind() -> ToolKind {
        ToolKind::Both {
            route: "/url-codec".into(),
            handler: Arc::new(Self),
        }
    }
}

#[async_trait]
impl ToolHandler for UrlEncode {
    async fn run(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let value = value_param(&params)?;
        let encoded = percent_encode(value);
        Ok(ToolOutput::with_data(
            format!("Encoded: {encoded}"),
            serde_json::json!({ "encoded": encoded }),
        ))
    }
}

pub struct UrlDecode;

impl UrlDecode {
    pub fn spec() -> ToolSpec {
        ToolSpec {
            id: "url-decode".into(),
            name: "URL Decode".into(),
            description: "Decode percent-encoded text".into(),
            category: "encoders".into(),
            input_schema: Some(url_schema("The percent-encoded text to decode")),
        }
    }

    pub fn kind() -> ToolKind {
        ToolKind::Both {
            route: "/url-codec".into(),
            handler: Arc::new(Self),
        }
    }
}

#[async_trait]
impl ToolHandler for UrlDecode {
    async fn run(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        let value = value_param(&params)?;
        let decoded = percent_decode(value).map_err(|reason| ToolError::ExecutionFailed {
            tool_id: "url-decode".into(),
            reason,
        })?;
        Ok(ToolOutput::with_data(
            format!("Decoded: {decoded}"),
            serde_json::json!({ "decoded": decoded }),
        ))
    }
}
