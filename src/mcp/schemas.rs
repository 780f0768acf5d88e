//! JSON schema builders for MCP tools.

use serde_json::{Map, Value, json};

/// Build the schema describing the `upload_and_process_document` tool input.
pub(crate) fn upload_input_schema() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "file_path".into(),
        string_schema("Local path of the document to upload (PDF, image, or any other file)"),
    );

    finalize_object_schema(properties, &["file_path"])
}

/// Build the schema describing the `convert_and_upload_to_gcs` tool input.
pub(crate) fn convert_input_schema() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "file_path".into(),
        string_schema("Local path of the plain-text file to render as a PDF"),
    );
    properties.insert(
        "bucket_name".into(),
        string_schema("Optional bucket override; defaults to STORAGE_BUCKET_NAME"),
    );

    finalize_object_schema(properties, &["file_path"])
}

/// Build the schema describing the `search_source_documents` tool input.
pub(crate) fn search_input_schema() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "accountName".into(),
        string_schema("Account whose source documents should be searched"),
    );
    properties.insert(
        "query".into(),
        string_schema("Natural language query text"),
    );

    let mut schema = finalize_object_schema(properties, &["accountName", "query"]);
    schema.insert(
        "examples".into(),
        Value::Array(vec![json!({
            "accountName": "acme",
            "query": "When does the support contract renew?"
        })]),
    );
    schema
}

fn string_schema(description: &str) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("string".into()));
    schema.insert("description".into(), Value::String(description.into()));
    Value::Object(schema)
}

fn finalize_object_schema(properties: Map<String, Value>, required: &[&str]) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("object".into()));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert(
            "required".into(),
            Value::Array(
                required
                    .iter()
                    .map(|&key| Value::String(key.into()))
                    .collect(),
            ),
        );
    }
    schema.insert("additionalProperties".into(), Value::Bool(false));
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemas_mark_required_fields() {
        assert_eq!(upload_input_schema()["required"], json!(["file_path"]));
        assert_eq!(convert_input_schema()["required"], json!(["file_path"]));
        assert_eq!(
            search_input_schema()["required"],
            json!(["accountName", "query"])
        );
        assert_eq!(convert_input_schema()["additionalProperties"], false);
    }
}
