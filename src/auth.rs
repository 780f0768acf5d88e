//! Bearer-token source for Google Cloud REST calls.
//!
//! Tokens come either from configuration (`GCP_ACCESS_TOKEN`) or from Application Default
//! Credentials resolved by `google-cloud-auth`: a service-account key named by
//! `GOOGLE_APPLICATION_CREDENTIALS`, gcloud user credentials, or the compute metadata server
//! on Cloud Functions, Cloud Run, and GCE. The credential source caches tokens and refreshes
//! them before they expire.

use crate::config::GcpConfig;
use google_cloud_auth::project::{Config as CredentialConfig, create_token_source};
use google_cloud_auth::token_source::TokenSource as CredentialSource;
use reqwest::RequestBuilder;
use thiserror::Error;

const SCOPES: [&str; 1] = ["https://www.googleapis.com/auth/cloud-platform"];

/// Errors raised while obtaining an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Credentials could not be discovered or refused to mint a token.
    #[error("Failed to obtain Google credentials: {0}")]
    Credentials(#[from] google_cloud_auth::error::Error),
}

/// Access-token provider shared by the Document AI and Firestore clients.
pub struct GcpAuth {
    source: TokenSource,
}

enum TokenSource {
    Static(String),
    Credentials(Box<dyn CredentialSource>),
}

impl GcpAuth {
    /// Pick the token source described by configuration.
    pub async fn from_config(config: &GcpConfig) -> Result<Self, AuthError> {
        match &config.access_token {
            Some(token) => Ok(Self::fixed(token.clone())),
            None => Self::application_default().await,
        }
    }

    /// Always hand out the same token.
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Static(token.into()),
        }
    }

    /// Resolve Application Default Credentials with the cloud-platform scope.
    pub async fn application_default() -> Result<Self, AuthError> {
        let source = create_token_source(CredentialConfig::default().with_scopes(&SCOPES)).await?;
        tracing::debug!("Resolved application default credentials");
        Ok(Self {
            source: TokenSource::Credentials(source),
        })
    }

    /// Return a valid access token.
    pub async fn token(&self) -> Result<String, AuthError> {
        match &self.source {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Credentials(source) => {
                let token = source.token().await.map_err(|error| {
                    tracing::error!(error = %error, "Token refresh failed");
                    AuthError::Credentials(error)
                })?;
                Ok(token.access_token)
            }
        }
    }

    /// Attach an `Authorization: Bearer` header to an outgoing request.
    pub(crate) async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, AuthError> {
        let token = self.token().await?;
        Ok(request.bearer_auth(token))
    }
}
