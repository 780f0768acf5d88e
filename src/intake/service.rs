//! Intake service turning storage notifications into persisted records.

use crate::{
    analysis::{AnalysisError, DocumentAiClient, DocumentAnalyzer, PDF_MIME_TYPE, SourceDocument},
    auth::GcpAuth,
    config::{GcpConfig, IntakeConfig},
    intake::{
        keys::{record_key, source_locator},
        types::{ExtractedDocumentRecord, IntakeError, IntakeEvent, IntakeOutcome},
    },
    metrics::{IntakeMetrics, MetricsSnapshot},
    store::{FirestoreClient, RecordStore},
};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Coordinates one intake: analysis call, record construction, database write.
///
/// Holds no per-event state, so one instance serves concurrent invocations. Construct it once
/// at startup and share it through an `Arc`.
pub struct IntakeService {
    analyzer: Box<dyn DocumentAnalyzer + Send + Sync>,
    store: Box<dyn RecordStore + Send + Sync>,
    collection: String,
    metrics: Arc<IntakeMetrics>,
}

/// Abstraction over the intake pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait IntakeApi: Send + Sync {
    /// Process one storage event, returning a typed outcome.
    async fn process(&self, event: &IntakeEvent) -> Result<IntakeOutcome, IntakeError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl IntakeService {
    /// Assemble a service from explicit collaborators.
    pub fn new(
        analyzer: Box<dyn DocumentAnalyzer + Send + Sync>,
        store: Box<dyn RecordStore + Send + Sync>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            analyzer,
            store,
            collection: collection.into(),
            metrics: Arc::new(IntakeMetrics::new()),
        }
    }

    /// Wire Document AI and Firestore clients from configuration.
    pub fn from_config(
        intake: &IntakeConfig,
        gcp: &GcpConfig,
        client: Client,
        auth: Arc<GcpAuth>,
    ) -> Result<Self, AnalysisError> {
        tracing::info!(
            project = %intake.project_id,
            location = %intake.location,
            collection = %intake.collection,
            "Initializing intake service"
        );
        let analyzer = DocumentAiClient::new(intake, gcp, client.clone(), auth.clone())?;
        let store = FirestoreClient::new(intake, gcp, client, auth);
        Ok(Self::new(
            Box::new(analyzer),
            Box::new(store),
            intake.collection.clone(),
        ))
    }

    /// Process one event and report the result as a typed outcome.
    ///
    /// Analysis failures never reach the store. Every failure is logged with its kind and
    /// retryability before being returned.
    pub async fn process(&self, event: &IntakeEvent) -> Result<IntakeOutcome, IntakeError> {
        let span = tracing::info_span!(
            "intake",
            invocation = %Uuid::new_v4(),
            bucket = %event.bucket,
            object = %event.name
        );
        async {
            self.metrics.record_event();
            let result = self.run(event).await;
            match &result {
                Ok(outcome) => {
                    self.metrics.record_written(outcome.entity_count as u64);
                    tracing::info!(
                        collection = %self.collection,
                        record_key = %outcome.record_key,
                        entities = outcome.entity_count,
                        text_chars = outcome.text_chars,
                        "Record saved"
                    );
                }
                Err(error) => {
                    self.metrics.record_failure();
                    tracing::error!(
                        source = %source_locator(&event.bucket, &event.name),
                        kind = error.kind(),
                        retryable = error.is_retryable(),
                        error = %error,
                        "Document intake failed"
                    );
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Process one event and discard the result.
    ///
    /// Failures are only visible in the logs and the failure counter; nothing is retried. Batch
    /// replays use this so one bad object does not stop the rest.
    pub async fn process_logged(&self, event: &IntakeEvent) {
        let _ = self.process(event).await;
    }

    /// Return the current intake metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn run(&self, event: &IntakeEvent) -> Result<IntakeOutcome, IntakeError> {
        if event.bucket.is_empty() {
            return Err(IntakeError::InvalidEvent("`bucket` must not be empty".into()));
        }
        if event.name.is_empty() {
            return Err(IntakeError::InvalidEvent("`name` must not be empty".into()));
        }
        let key = record_key(&event.name);
        if key.is_empty() {
            return Err(IntakeError::InvalidEvent(format!(
                "object name `{}` yields an empty record key",
                event.name
            )));
        }

        let source = SourceDocument {
            uri: source_locator(&event.bucket, &event.name),
            mime_type: PDF_MIME_TYPE.to_string(),
        };
        tracing::info!(source = %source.uri, "Processing document");
        let document = self.analyzer.analyze(&source).await?;

        let record = ExtractedDocumentRecord::from_analysis(document, source.uri);
        self.store.put(&self.collection, key, &record).await?;

        Ok(IntakeOutcome {
            record_key: key.to_string(),
            text_chars: record.text.chars().count(),
            entity_count: record.entities.len(),
            source_locator: record.source_locator,
        })
    }
}

#[async_trait]
impl IntakeApi for IntakeService {
    async fn process(&self, event: &IntakeEvent) -> Result<IntakeOutcome, IntakeError> {
        IntakeService::process(self, event).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        IntakeService::metrics_snapshot(self)
    }
}
