//! Firestore REST client and typed-value encoding.

use super::{RecordStore, StoreError};
use crate::auth::GcpAuth;
use crate::config::{GcpConfig, IntakeConfig};
use crate::http::endpoint_url;
use crate::intake::ExtractedDocumentRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Document writer for one Firestore database.
pub struct FirestoreClient {
    client: Client,
    auth: Arc<GcpAuth>,
    endpoint: String,
    project_id: String,
    database: String,
}

impl FirestoreClient {
    /// Build a client for the project and database named by the intake configuration.
    pub fn new(intake: &IntakeConfig, gcp: &GcpConfig, client: Client, auth: Arc<GcpAuth>) -> Self {
        tracing::debug!(
            endpoint = %gcp.firestore_endpoint,
            project = %intake.project_id,
            database = %intake.database,
            "Initialized Firestore client"
        );
        Self {
            client,
            auth,
            endpoint: gcp.firestore_endpoint.clone(),
            project_id: intake.project_id.clone(),
            database: intake.database.clone(),
        }
    }

    fn document_url(&self, collection: &str, key: &str) -> Result<reqwest::Url, StoreError> {
        endpoint_url(
            &self.endpoint,
            &[
                "v1",
                "projects",
                &self.project_id,
                "databases",
                &self.database,
                "documents",
                collection,
                key,
            ],
        )
        .map_err(StoreError::InvalidEndpoint)
    }
}

#[async_trait]
impl RecordStore for FirestoreClient {
    async fn put(
        &self,
        collection: &str,
        key: &str,
        record: &ExtractedDocumentRecord,
    ) -> Result<(), StoreError> {
        let value =
            serde_json::to_value(record).map_err(|err| StoreError::Encoding(err.to_string()))?;
        let fields = encode_fields(&value)?;
        let url = self.document_url(collection, key)?;

        // Without an update mask the PATCH replaces the whole document.
        let request = self.client.patch(url).json(&json!({ "fields": fields }));
        let response = self.auth.authorize(request).await?.send().await?;

        if response.status().is_success() {
            tracing::debug!(collection, key, "Record written");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = StoreError::UnexpectedStatus { status, body };
            tracing::error!(collection, key, error = %error, "Record write failed");
            Err(error)
        }
    }
}

/// Encode a JSON object as a Firestore `fields` map.
pub fn encode_fields(value: &Value) -> Result<Map<String, Value>, StoreError> {
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect()),
        other => Err(StoreError::Encoding(format!(
            "expected a JSON object at the document root, found {other}"
        ))),
    }
}

/// Encode a JSON value as a Firestore typed `Value`.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => match number.as_i64() {
            // int64 travels as a decimal string in proto3 JSON
            Some(integer) => json!({ "integerValue": integer.to_string() }),
            None => json!({ "doubleValue": number.as_f64() }),
        },
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields: Map<String, Value> = map
                .iter()
                .map(|(key, value)| (key.clone(), encode_value(value)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}
