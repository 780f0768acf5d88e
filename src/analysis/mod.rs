//! Document analysis: OCR and entity extraction delegated to an external service.

mod documentai;

pub use documentai::DocumentAiClient;

use crate::auth::AuthError;
use crate::http::is_retryable_status;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// MIME type sent with every intake request.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Errors raised by analysis backends.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Access token could not be obtained.
    #[error("Failed to authorize analysis request: {0}")]
    Auth(#[from] AuthError),
    /// HTTP layer failed before a complete response arrived.
    #[error("Analysis request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Service answered with a non-success status.
    #[error("Unexpected analysis response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Service answered successfully but without a document.
    #[error("Analysis response did not contain a document")]
    MissingDocument,
    /// Configured endpoint could not be turned into a request URL.
    #[error("Invalid analysis endpoint: {0}")]
    InvalidEndpoint(String),
}

impl AnalysisError {
    /// Whether redelivering the same event could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Auth(_) | Self::Http(_) => true,
            Self::UnexpectedStatus { status, .. } => is_retryable_status(*status),
            Self::MissingDocument | Self::InvalidEndpoint(_) => false,
        }
    }
}

/// Object handed to the analysis service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Fully-qualified storage locator, e.g. `gs://bucket/object`.
    pub uri: String,
    /// MIME type declared for the object.
    pub mime_type: String,
}

/// Response envelope returned by the process endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    /// Analysed document; absent on malformed responses.
    #[serde(default)]
    pub document: Option<AnalyzedDocument>,
}

/// Text and entities extracted from a document.
///
/// Empty fields are omitted on the wire, so every field defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedDocument {
    /// Full plain text recognised in the document.
    #[serde(default)]
    pub text: String,
    /// Top-level entities in the order the service reported them.
    #[serde(default)]
    pub entities: Vec<AnalyzedEntity>,
}

/// Single entity reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedEntity {
    /// Entity type tag, e.g. `PERSON` or `invoice_id`.
    #[serde(rename = "type", default)]
    pub entity_type: String,
    /// Text span the entity was recognised from.
    #[serde(default)]
    pub mention_text: Option<String>,
}

/// Interface implemented by analysis backends.
#[async_trait]
pub trait DocumentAnalyzer {
    /// Run OCR and entity extraction over a stored document.
    async fn analyze(&self, source: &SourceDocument) -> Result<AnalyzedDocument, AnalysisError>;
}
