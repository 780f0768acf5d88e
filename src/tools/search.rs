use super::{DocumentTools, ToolError, ToolResult};
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    account_name: &'a str,
    query: &'a str,
}

impl DocumentTools {
    /// Query the private-document search service for an account.
    ///
    /// Returns the service's JSON unchanged, or an error envelope when the call fails.
    pub async fn search_source_documents(&self, account_name: &str, query: &str) -> Value {
        match self.try_search(account_name, query).await {
            Ok(results) => results,
            Err(error) => {
                tracing::warn!(account = account_name, error = %error, "Search tool failed");
                serde_json::to_value(ToolResult::from(error)).unwrap_or(Value::Null)
            }
        }
    }

    async fn try_search(&self, account_name: &str, query: &str) -> Result<Value, ToolError> {
        let response = self
            .client
            .post(&self.config.search_endpoint)
            .json(&SearchRequest {
                account_name,
                query,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::SearchStatus { status, body });
        }

        Ok(response.json().await?)
    }
}
