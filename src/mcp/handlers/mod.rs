//! Tool handlers for the MCP server.

use rmcp::{ErrorData as McpError, model::JsonObject};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod convert;
pub mod search;
pub mod upload;

/// Parse structured arguments supplied to a tool invocation.
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    arguments: Option<JsonObject>,
) -> Result<T, McpError> {
    let value = arguments
        .map(Value::Object)
        .unwrap_or_else(|| Value::Object(JsonObject::new()));
    serde_json::from_value(value)
        .map_err(|err| McpError::invalid_params(format!("Invalid arguments: {err}"), None))
}

/// Reject blank string arguments with `INVALID_PARAMS`.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), McpError> {
    if value.trim().is_empty() {
        return Err(McpError::invalid_params(
            format!("`{field}` must not be empty"),
            None,
        ));
    }
    Ok(())
}

/// Serialize a tool envelope into structured content.
pub(crate) fn structured<T: serde::Serialize>(
    payload: &T,
) -> Result<rmcp::model::CallToolResult, McpError> {
    let value = serde_json::to_value(payload)
        .map_err(|err| McpError::internal_error(err.to_string(), None))?;
    Ok(rmcp::model::CallToolResult::structured(value))
}
