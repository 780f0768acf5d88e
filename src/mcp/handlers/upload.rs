//! Handler for the `upload_and_process_document` tool.

use std::{path::Path, sync::Arc};

use crate::tools::DocumentTools;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, JsonObject},
};
use serde::Deserialize;

use super::{parse_arguments, require_non_empty, structured};

/// Request payload for the `upload_and_process_document` tool.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct UploadRequest {
    /// Local path of the file to upload.
    pub(crate) file_path: String,
}

/// Upload a local file into the intake bucket.
pub(crate) async fn handle_upload(
    tools: &Arc<DocumentTools>,
    arguments: Option<JsonObject>,
) -> Result<CallToolResult, McpError> {
    let args: UploadRequest = parse_arguments(arguments)?;
    require_non_empty("file_path", &args.file_path)?;

    let result = tools.upload_document(Path::new(&args.file_path)).await;
    tracing::info!(
        file = %args.file_path,
        status = ?result.status,
        "upload_and_process_document completed"
    );
    structured(&result)
}
