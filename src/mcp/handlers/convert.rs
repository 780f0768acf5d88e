//! Handler for the `convert_and_upload_to_gcs` tool.

use std::{path::Path, sync::Arc};

use crate::tools::DocumentTools;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::Deserialize;

use super::{parse_arguments, require_non_empty, structured};

/// Request payload for the `convert_and_upload_to_gcs` tool.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConvertRequest {
    /// Local path of the text file to convert.
    pub(crate) file_path: String,
    /// Optional bucket override.
    #[serde(default, alias = "bucket")]
    pub(crate) bucket_name: Option<String>,
}

/// Render a text file as a PDF and upload it.
pub(crate) async fn handle_convert(
    tools: &Arc<DocumentTools>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: ConvertRequest = parse_arguments(arguments)?;
    require_non_empty("file_path", &args.file_path)?;

    let result = tools
        .convert_and_upload(Path::new(&args.file_path), args.bucket_name.as_deref())
        .await;
    structured(&result)
}
