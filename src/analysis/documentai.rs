//! Document AI REST client.

use super::{AnalysisError, AnalyzedDocument, DocumentAnalyzer, ProcessResponse, SourceDocument};
use crate::auth::GcpAuth;
use crate::config::{GcpConfig, IntakeConfig};
use crate::http::endpoint_url;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use std::sync::Arc;

/// Client for a single Document AI processor.
pub struct DocumentAiClient {
    client: Client,
    auth: Arc<GcpAuth>,
    process_url: Url,
    processor_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest<'a> {
    gcs_document: GcsDocument<'a>,
    skip_human_review: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GcsDocument<'a> {
    gcs_uri: &'a str,
    mime_type: &'a str,
}

impl DocumentAiClient {
    /// Build a client for the processor named by the intake configuration.
    ///
    /// The regional endpoint `https://{location}-documentai.googleapis.com` is used unless
    /// `DOCAI_ENDPOINT` overrides it.
    pub fn new(
        intake: &IntakeConfig,
        gcp: &GcpConfig,
        client: Client,
        auth: Arc<GcpAuth>,
    ) -> Result<Self, AnalysisError> {
        let endpoint = gcp
            .documentai_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://{}-documentai.googleapis.com", intake.location));
        let processor_name = format!(
            "projects/{}/locations/{}/processors/{}",
            intake.project_id, intake.location, intake.processor_id
        );
        let process = format!("{}:process", intake.processor_id);
        let process_url = endpoint_url(
            &endpoint,
            &[
                "v1",
                "projects",
                &intake.project_id,
                "locations",
                &intake.location,
                "processors",
                &process,
            ],
        )
        .map_err(AnalysisError::InvalidEndpoint)?;

        tracing::debug!(url = %process_url, processor = %processor_name, "Initialized Document AI client");

        Ok(Self {
            client,
            auth,
            process_url,
            processor_name,
        })
    }

    /// Fully-qualified processor resource name.
    pub fn processor_name(&self) -> &str {
        &self.processor_name
    }
}

#[async_trait]
impl DocumentAnalyzer for DocumentAiClient {
    async fn analyze(&self, source: &SourceDocument) -> Result<AnalyzedDocument, AnalysisError> {
        let body = ProcessRequest {
            gcs_document: GcsDocument {
                gcs_uri: &source.uri,
                mime_type: &source.mime_type,
            },
            skip_human_review: true,
        };

        tracing::debug!(source = %source.uri, processor = %self.processor_name, "Sending document for analysis");
        let request = self.client.post(self.process_url.clone()).json(&body);
        let response = self.auth.authorize(request).await?.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = AnalysisError::UnexpectedStatus { status, body };
            tracing::error!(source = %source.uri, error = %error, "Document analysis failed");
            return Err(error);
        }

        let payload: ProcessResponse = response.json().await?;
        let document = payload.document.ok_or(AnalysisError::MissingDocument)?;
        tracing::debug!(
            source = %source.uri,
            text_chars = document.text.chars().count(),
            entities = document.entities.len(),
            "Document analysis succeeded"
        );
        Ok(document)
    }
}
