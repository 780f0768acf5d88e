//! Data carried through the intake pipeline and its error taxonomy.

use crate::analysis::{AnalysisError, AnalyzedDocument};
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Object-created notification emitted by the storage bucket.
///
/// Notifications carry many more fields (size, generation, timestamps); only the two needed to
/// locate the object are decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct IntakeEvent {
    /// Bucket holding the new object.
    pub bucket: String,
    /// Object name within the bucket.
    pub name: String,
}

impl IntakeEvent {
    /// Decode a raw notification body without ever failing.
    ///
    /// Fields that are absent, `null`, or not strings come back empty, and a body that is not
    /// JSON yields an empty event. Validation in the intake service then rejects it as an
    /// invalid event, which the trigger reports under its failure mode.
    pub fn from_payload(body: &[u8]) -> Self {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            bucket: field("bucket"),
            name: field("name"),
        }
    }
}

/// Entity persisted with a record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractedEntity {
    /// Entity type tag reported by the analysis service.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Mention text the entity was recognised from.
    pub text: String,
}

/// Structured record written to the document database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExtractedDocumentRecord {
    /// Full recognised text.
    pub text: String,
    /// Entities in the order the service reported them.
    pub entities: Vec<ExtractedEntity>,
    /// Storage locator of the source object.
    #[serde(rename = "gcs_path")]
    pub source_locator: String,
}

impl ExtractedDocumentRecord {
    /// Build the persisted record from an analysis result.
    pub fn from_analysis(document: AnalyzedDocument, source_locator: String) -> Self {
        let entities = document
            .entities
            .into_iter()
            .map(|entity| ExtractedEntity {
                entity_type: entity.entity_type,
                text: entity.mention_text.unwrap_or_default(),
            })
            .collect();
        Self {
            text: document.text,
            entities,
            source_locator,
        }
    }
}

/// Summary of a successfully processed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntakeOutcome {
    /// Database key the record was written under.
    pub record_key: String,
    /// Storage locator of the processed object.
    pub source_locator: String,
    /// Number of entities persisted.
    pub entity_count: usize,
    /// Length of the recognised text in characters.
    pub text_chars: usize,
}

/// Errors that end an intake attempt without a write.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Event was missing data needed to locate or key the document.
    #[error("Invalid intake event: {0}")]
    InvalidEvent(String),
    /// Analysis service call or response handling failed.
    #[error("Document analysis failed: {0}")]
    Analysis(#[from] AnalysisError),
    /// Record could not be written.
    #[error("Record write failed: {0}")]
    Store(#[from] StoreError),
}

impl IntakeError {
    /// Stable label for the failure class, used in logs and response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidEvent(_) => "invalid_event",
            Self::Analysis(_) => "analysis",
            Self::Store(_) => "store",
        }
    }

    /// Whether redelivering the same event could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidEvent(_) => false,
            Self::Analysis(error) => error.is_retryable(),
            Self::Store(error) => error.is_retryable(),
        }
    }
}
