//! Handler for the `search_source_documents` tool.

use std::sync::Arc;

use crate::tools::DocumentTools;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::Deserialize;

use super::{parse_arguments, require_non_empty, structured};

/// Request payload for the `search_source_documents` tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchRequest {
    /// Account whose documents are searched.
    pub(crate) account_name: String,
    /// Query text forwarded verbatim.
    pub(crate) query: String,
}

/// Forward a query to the private-document search service.
pub(crate) async fn handle_search(
    tools: &Arc<DocumentTools>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: SearchRequest = parse_arguments(arguments)?;
    require_non_empty("accountName", &args.account_name)?;
    require_non_empty("query", &args.query)?;

    let results = tools
        .search_source_documents(&args.account_name, &args.query)
        .await;
    structured(&results)
}
