//! Shared HTTP plumbing for the Google Cloud REST clients.

use reqwest::{Client, StatusCode, Url};

const USER_AGENT: &str = concat!("docintake/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by every outbound integration.
pub fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder().user_agent(USER_AGENT).build()
}

/// Append percent-encoded path segments to a base endpoint.
///
/// Each segment is encoded on its own, so a `/` inside a segment never creates a new level.
pub(crate) fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, String> {
    let mut url = Url::parse(base).map_err(|err| format!("{base}: {err}"))?;
    url.path_segments_mut()
        .map_err(|()| format!("{base}: cannot be used as a base URL"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Whether a failed response is worth redelivering.
pub(crate) fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}
