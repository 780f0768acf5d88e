//! Persistence of extracted records in the document database.

mod firestore;

pub use firestore::{FirestoreClient, encode_fields, encode_value};

use crate::auth::AuthError;
use crate::http::is_retryable_status;
use crate::intake::ExtractedDocumentRecord;
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned while writing records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Access token could not be obtained.
    #[error("Failed to authorize database write: {0}")]
    Auth(#[from] AuthError),
    /// HTTP layer failed before a complete response arrived.
    #[error("Database request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Database answered with a non-success status.
    #[error("Unexpected database response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the database.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Record could not be converted into the database's value format.
    #[error("Failed to encode record: {0}")]
    Encoding(String),
    /// Configured endpoint or document path could not be turned into a URL.
    #[error("Invalid database endpoint: {0}")]
    InvalidEndpoint(String),
}

impl StoreError {
    /// Whether redelivering the same event could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Auth(_) | Self::Http(_) => true,
            Self::UnexpectedStatus { status, .. } => is_retryable_status(*status),
            Self::Encoding(_) | Self::InvalidEndpoint(_) => false,
        }
    }
}

/// Interface implemented by record stores.
#[async_trait]
pub trait RecordStore {
    /// Create or fully replace the record stored under `key` in `collection`.
    async fn put(
        &self,
        collection: &str,
        key: &str,
        record: &ExtractedDocumentRecord,
    ) -> Result<(), StoreError>;
}
