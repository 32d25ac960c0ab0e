//! Unix-timestamp converter tool.
//!
//! Three modes, picked from the parameter shape:
//! - no `value`: the current unix timestamp
//! - numeric `value`: epoch seconds → RFC 3339
//! - string `value`: RFC 3339 → epoch seconds

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use devchest_core::error::ToolError;
use devchest_core::tool::{ToolHandler, ToolKind, ToolOutput, ToolSpec};
use std::sync::Arc;

pub struct TimestampConverter;

impl TimestampConverter {
    pub fn spec() -> ToolSpec {
        ToolSpec {
            id: "timestamp-converter".into(),
            name: "Timestamp Converter".into(),
            description: "Convert between unix timestamps and RFC 3339 dates".into(),
            category: "converters".into(),
            input_schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "value": {
                        "description": "Epoch seconds (number) or an RFC 3339 date (string); omit for now"
                    }
                }
            })),
        }
    }

    pub fn kind() -> ToolKind {
        ToolKind::Both {
            route: "/timestamp".into(),
            handler: Arc::new(Self),
        }
    }
}

#[async_trait]
impl ToolHandler for TimestampConverter {
    async fn run(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError> {
        match &params["value"] {
            serde_json::Value::Null => {
                let now = Utc::now();
                Ok(ToolOutput::with_data(
                    format!("Current unix timestamp: {}", now.timestamp()),
                    serde_json::json!({ "epoch": now.timestamp(), "rfc3339": now.to_rfc3339() }),
                ))
            }
            v if v.is_number() => {
                let secs = v.as_i64().ok_or_else(|| {
                    ToolError::InvalidParams("'value' out of range for epoch seconds".into())
                })?;
                let dt = DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| {
                    ToolError::InvalidParams(format!("{secs} is not a valid epoch timestamp"))
                })?;
                Ok(ToolOutput::with_data(
                    format!("{secs} = {}", dt.to_rfc3339()),
                    serde_json::json!({ "epoch": secs, "rfc3339": dt.to_rfc3339() }),
                ))
            }
            serde_json::Value::String(s) => {
                // A numeric string counts as epoch seconds too.
                if let Ok(secs) = s.trim().parse::<i64>() {
                    let dt = DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| {
                        ToolError::InvalidParams(format!("{secs} is not a valid epoch timestamp"))
                    })?;
                    return Ok(ToolOutput::with_data(
                        format!("{secs} = {}", dt.to_rfc3339()),
                        serde_json::json!({ "epoch": secs, "rfc3339": dt.to_rfc3339() }),
                    ));
                }
                let dt = DateTime::parse_from_rfc3339(s.trim()).map_err(|e| {
                    ToolError::InvalidParams(format!("'{s}' is neither epoch seconds nor RFC 3339: {e}"))
                })?;
                Ok(ToolOutput::with_data(
                    format!("{} = {}", s.trim(), dt.timestamp()),
                    serde_json::json!({ "epoch": dt.timestamp(), "rfc3339": s.trim() }),
                ))
            }
            _ => Err(ToolError::InvalidParams(
                "'value' must be a number or a string".into(),
            )),
        }
    }
}
