//! Agent-facing document tools.
//!
//! The tools never fail at the call boundary: every outcome is folded into a [`ToolResult`]
//! envelope (`{"status": "success" | "error", "message"?, "gcs_path"?}`) so that agents and
//! HTTP callers can branch on `status` alone. Typed [`ToolError`]s exist for logging and for
//! composing the message text.
//!
//! - [`DocumentTools::upload_document`] pushes a local file into the intake bucket, which in
//!   turn triggers the intake pipeline.
//! - [`DocumentTools::convert_and_upload`] renders a text file as a PDF first.
//! - [`DocumentTools::search_source_documents`] forwards a query to the private search service.

mod convert;
mod search;
mod upload;

pub use convert::{pdf_object_name, render_text_pdf};

use crate::config::{GcpConfig, ToolConfig};
use crate::storage::{StorageClient, StorageError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised inside a tool before they are folded into a [`ToolResult`].
#[derive(Debug, Error)]
pub enum ToolError {
    /// No bucket is configured and none was supplied.
    #[error("STORAGE_BUCKET_NAME environment variable is not set.")]
    MissingBucket,
    /// Local input file does not exist.
    #[error("File not found at: {}", .0.display())]
    FileNotFound(PathBuf),
    /// Local input file exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Path has no usable file name component.
    #[error("Path has no file name: {}", .0.display())]
    InvalidPath(PathBuf),
    /// PDF rendering failed.
    #[error("Failed to render PDF: {0}")]
    Render(String),
    /// Object upload failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Search request could not be completed.
    #[error("Search request failed: {0}")]
    Search(#[from] reqwest::Error),
    /// Search service answered with a non-success status.
    #[error("Search service returned {status}: {body}")]
    SearchStatus {
        /// HTTP status returned by the search service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Outcome label carried by every [`ToolResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    /// The tool completed its work.
    Success,
    /// The tool stopped early; `message` explains why.
    Error,
}

/// Envelope returned by the upload and conversion tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool succeeded.
    pub status: ToolStatus,
    /// Human-readable detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Locator of the uploaded object on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcs_path: Option<String>,
}

impl ToolResult {
    /// Successful result pointing at an uploaded object.
    pub fn success(gcs_path: impl Into<String>, message: Option<String>) -> Self {
        Self {
            status: ToolStatus::Success,
            message,
            gcs_path: Some(gcs_path.into()),
        }
    }

    /// Failed result carrying a message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            message: Some(message.into()),
            gcs_path: None,
        }
    }

    /// Whether the result reports success.
    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}

impl From<ToolError> for ToolResult {
    fn from(error: ToolError) -> Self {
        Self::error(error.to_string())
    }
}

/// Upload, conversion, and search tools sharing one storage client and one HTTP client.
pub struct DocumentTools {
    config: ToolConfig,
    storage: StorageClient,
    client: Client,
}

impl DocumentTools {
    /// Assemble the tools from explicit collaborators.
    pub fn new(config: ToolConfig, storage: StorageClient, client: Client) -> Self {
        Self {
            config,
            storage,
            client,
        }
    }

    /// Wire the tools from configuration, connecting the storage client.
    pub async fn connect(
        tools: &ToolConfig,
        gcp: &GcpConfig,
        client: Client,
    ) -> Result<Self, StorageError> {
        let storage = StorageClient::connect(gcp).await?;
        Ok(Self::new(tools.clone(), storage, client))
    }

    /// Pick the explicit bucket when one is given, else the configured one.
    ///
    /// Only the stdio MCP host and the CLI pass an explicit bucket; the HTTP tool routes never do.
    fn resolve_bucket<'a>(&'a self, bucket: Option<&'a str>) -> Result<&'a str, ToolError> {
        bucket
            .filter(|name| !name.trim().is_empty())
            .or(self.config.bucket.as_deref())
            .ok_or(ToolError::MissingBucket)
    }
}

async fn read_input(path: &Path) -> Result<Vec<u8>, ToolError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            Err(ToolError::FileNotFound(path.to_path_buf()))
        }
        Err(source) => Err(ToolError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn file_name(path: &Path) -> Result<String, ToolError> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| ToolError::InvalidPath(path.to_path_buf()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub use crate::storage::test_support::object_resource;

    pub fn tools_for(base_url: &str, bucket: Option<&str>) -> DocumentTools {
        let config = ToolConfig {
            bucket: bucket.map(str::to_string),
            search_endpoint: format!("{base_url}/api/searchDocuments"),
        };
        DocumentTools::new(config, StorageClient::anonymous(base_url), Client::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_omits_absent_fields() {
        assert_eq!(
            serde_json::to_value(ToolResult::error("boom")).unwrap(),
            json!({ "status": "error", "message": "boom" })
        );
        assert_eq!(
            serde_json::to_value(ToolResult::success("gs://b/o.pdf", None)).unwrap(),
            json!({ "status": "success", "gcs_path": "gs://b/o.pdf" })
        );
    }

    #[test]
    fn missing_bucket_message_names_the_variable() {
        let result = ToolResult::from(ToolError::MissingBucket);
        assert_eq!(
            result.message.as_deref(),
            Some("STORAGE_BUCKET_NAME environment variable is not set.")
        );
    }

    #[test]
    fn explicit_bucket_overrides_configured_one() {
        let tools = test_support::tools_for("http://127.0.0.1:1", Some("configured"));
        assert_eq!(tools.resolve_bucket(Some("other")).unwrap(), "other");
        assert_eq!(tools.resolve_bucket(Some("  ")).unwrap(), "configured");
        assert_eq!(tools.resolve_bucket(None).unwrap(), "configured");

        let unconfigured = test_support::tools_for("http://127.0.0.1:1", None);
        assert!(matches!(
            unconfigured.resolve_bucket(None),
            Err(ToolError::MissingBucket)
        ));
    }
}
