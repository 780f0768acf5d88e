use super::{DocumentTools, ToolError, ToolResult, file_name, read_input};
use std::path::Path;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

impl DocumentTools {
    /// Upload a local file to the intake bucket under its base name.
    ///
    /// The bucket is checked before the file is touched, so a missing bucket never produces a
    /// network call. Intake starts on its own once the object lands.
    pub async fn upload_document(&self, path: &Path) -> ToolResult {
        match self.try_upload(path).await {
            Ok((name, gcs_path)) => ToolResult::success(
                gcs_path,
                Some(format!(
                    "File '{name}' uploaded to GCS. Processing will start automatically."
                )),
            ),
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "Upload tool failed");
                error.into()
            }
        }
    }

    async fn try_upload(&self, path: &Path) -> Result<(String, String), ToolError> {
        let bucket = self.resolve_bucket(None)?;
        let bytes = read_input(path).await?;
        let name = file_name(path)?;
        let content_type = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        let gcs_path = self
            .storage
            .upload(bucket, &name, content_type, bytes)
            .await?;
        Ok((name, gcs_path))
    }
}

#[cfg(test)]
mod tests {
    use super::super::{
        ToolStatus,
        test_support::{object_resource, tools_for},
    };
    use httpmock::{Method::POST, MockServer};
    use std::io::Write;

    #[tokio::test]
    async fn missing_bucket_short_circuits_without_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200);
            })
            .await;
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "contents").expect("write");

        let result = tools_for(&server.base_url(), None)
            .upload_document(file.path())
            .await;

        assert_eq!(result.status, ToolStatus::Error);
        assert_eq!(
            result.message.as_deref(),
            Some("STORAGE_BUCKET_NAME environment variable is not set.")
        );
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn missing_file_is_reported_with_its_path() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("absent.pdf");

        let result = tools_for(&server.base_url(), Some("inbox"))
            .upload_document(&path)
            .await;

        assert_eq!(result.status, ToolStatus::Error);
        assert_eq!(
            result.message,
            Some(format!("File not found at: {}", path.display()))
        );
    }

    #[tokio::test]
    async fn uploads_under_base_name_with_guessed_type() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/upload/storage/v1/b/inbox/o")
                    .query_param("name", "invoice.pdf")
                    .header("content-type", "application/pdf")
                    .body("%PDF-fake");
                then.status(200)
                    .json_body(object_resource("inbox", "invoice.pdf", "application/pdf", 9));
            })
            .await;
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, "%PDF-fake").expect("write");

        let result = tools_for(&server.base_url(), Some("inbox"))
            .upload_document(&path)
            .await;

        mock.assert_async().await;
        assert!(result.is_success());
        assert_eq!(result.gcs_path.as_deref(), Some("gs://inbox/invoice.pdf"));
        assert_eq!(
            result.message.as_deref(),
            Some("File 'invoice.pdf' uploaded to GCS. Processing will start automatically.")
        );
    }

    #[tokio::test]
    async fn unknown_extension_falls_back_to_octet_stream() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .query_param("name", "blob.zzzunknown")
                    .header("content-type", "application/octet-stream");
                then.status(200).json_body(object_resource(
                    "inbox",
                    "blob.zzzunknown",
                    "application/octet-stream",
                    3,
                ));
            })
            .await;
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("blob.zzzunknown");
        std::fs::write(&path, [0u8, 1, 2]).expect("write");

        let result = tools_for(&server.base_url(), Some("inbox"))
            .upload_document(&path)
            .await;

        mock.assert_async().await;
        assert!(result.is_success());
    }
}
