//! Cloud Storage uploads through `google-cloud-storage`.

use crate::config::GcpConfig;
use google_cloud_storage::client::{Client as GcsClient, ClientConfig};
use google_cloud_storage::http::objects::upload::{Media, UploadObjectRequest, UploadType};
use thiserror::Error;

/// Errors returned while uploading objects.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Application Default Credentials could not be resolved.
    #[error("Failed to create storage client: {0}")]
    Credentials(#[from] google_cloud_auth::error::Error),
    /// Cloud Storage rejected the upload or could not be reached.
    #[error("Upload failed: {0}")]
    Upload(#[from] google_cloud_storage::http::Error),
}

/// Uploader for objects in any bucket the credentials can write to.
pub struct StorageClient {
    client: GcsClient,
}

impl StorageClient {
    /// Connect with Application Default Credentials, or anonymously to a configured emulator.
    pub async fn connect(gcp: &GcpConfig) -> Result<Self, StorageError> {
        if let Some(endpoint) = &gcp.storage_emulator {
            tracing::info!(endpoint = %endpoint, "Using storage emulator");
            return Ok(Self::anonymous(endpoint));
        }
        let config = ClientConfig::default().with_auth().await?;
        Ok(Self {
            client: GcsClient::new(config),
        })
    }

    /// Client that sends unauthenticated requests to `endpoint`.
    pub fn anonymous(endpoint: &str) -> Self {
        let mut config = ClientConfig::default().anonymous();
        config.storage_endpoint = endpoint.trim_end_matches('/').to_string();
        Self {
            client: GcsClient::new(config),
        }
    }

    /// Upload `bytes` as `bucket/object` and return the object's `gs://` locator.
    ///
    /// Existing objects with the same name are replaced.
    pub async fn upload(
        &self,
        bucket: &str,
        object: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let size = bytes.len();
        let mut media = Media::new(object.to_string());
        media.content_type = content_type.to_string().into();

        let request = UploadObjectRequest {
            bucket: bucket.to_string(),
            ..Default::default()
        };
        if let Err(error) = self
            .client
            .upload_object(&request, bytes, &UploadType::Simple(media))
            .await
        {
            tracing::error!(bucket, object, error = %error, "Upload failed");
            return Err(error.into());
        }

        tracing::info!(bucket, object, content_type, bytes = size, "Object uploaded");
        Ok(format!("gs://{bucket}/{object}"))
    }
}
