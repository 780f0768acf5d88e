//! End-to-end intake against mocked Document AI and Firestore endpoints.

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use docintake::{
    api,
    auth::GcpAuth,
    config::{FailureMode, GcpConfig, IntakeConfig},
    intake::{IntakeEvent, IntakeService},
};
use httpmock::{
    Method::{PATCH, POST},
    MockServer,
};
use serde_json::json;
use tower::ServiceExt;

const PROCESS_PATH: &str = "/v1/projects/proj/locations/us/processors/abc123:process";

fn intake_config(failure_mode: FailureMode) -> IntakeConfig {
    IntakeConfig {
        project_id: "proj".into(),
        location: "us".into(),
        processor_id: "abc123".into(),
        collection: "documents".into(),
        database: "(default)".into(),
        failure_mode,
    }
}

fn gcp_config(server: &MockServer) -> GcpConfig {
    GcpConfig {
        access_token: Some("test-token".into()),
        documentai_endpoint: Some(server.base_url()),
        firestore_endpoint: server.base_url(),
        storage_emulator: Some(server.base_url()),
    }
}

fn service_for(server: &MockServer) -> IntakeService {
    IntakeService::from_config(
        &intake_config(FailureMode::Acknowledge),
        &gcp_config(server),
        reqwest::Client::new(),
        Arc::new(GcpAuth::fixed("test-token")),
    )
    .expect("intake service")
}

fn event(name: &str) -> IntakeEvent {
    IntakeEvent {
        bucket: "inbox".into(),
        name: name.into(),
    }
}

#[tokio::test]
async fn analyzed_document_is_written_under_record_key() {
    let server = MockServer::start_async().await;
    let process = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PROCESS_PATH)
                .header("authorization", "Bearer test-token")
                .json_body(json!({
                    "gcsDocument": {
                        "gcsUri": "gs://inbox/invoice.pdf",
                        "mimeType": "application/pdf"
                    },
                    "skipHumanReview": true
                }));
            then.status(200).json_body(json!({
                "document": {
                    "text": "Invoice for Jane Doe, due 2024-05-01",
                    "entities": [
                        { "type": "PERSON", "mentionText": "Jane Doe" },
                        { "type": "DATE", "mentionText": "2024-05-01" }
                    ]
                }
            }));
        })
        .await;
    let write = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/v1/projects/proj/databases/(default)/documents/documents/invoice")
                .json_body(json!({
                    "fields": {
                        "text": { "stringValue": "Invoice for Jane Doe, due 2024-05-01" },
                        "entities": { "arrayValue": { "values": [
                            { "mapValue": { "fields": {
                                "type": { "stringValue": "PERSON" },
                                "text": { "stringValue": "Jane Doe" }
                            } } },
                            { "mapValue": { "fields": {
                                "type": { "stringValue": "DATE" },
                                "text": { "stringValue": "2024-05-01" }
                            } } }
                        ] } },
                        "gcs_path": { "stringValue": "gs://inbox/invoice.pdf" }
                    }
                }));
            then.status(200).json_body(json!({ "name": "invoice" }));
        })
        .await;

    let service = service_for(&server);
    let outcome = service.process(&event("invoice.pdf")).await.expect("outcome");

    process.assert_async().await;
    write.assert_async().await;
    assert_eq!(outcome.record_key, "invoice");
    assert_eq!(outcome.entity_count, 2);
    let metrics = service.metrics_snapshot();
    assert_eq!(metrics.records_written, 1);
    assert_eq!(metrics.entities_extracted, 2);
}

#[tokio::test]
async fn analysis_failure_skips_the_write_and_is_only_logged() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PROCESS_PATH);
            then.status(500).body("processor exploded");
        })
        .await;
    let write = server
        .mock_async(|when, then| {
            when.method(PATCH);
            then.status(200);
        })
        .await;

    let service = service_for(&server);
    service.process_logged(&event("broken.pdf")).await;

    write.assert_hits_async(0).await;
    let metrics = service.metrics_snapshot();
    assert_eq!(metrics.events_received, 1);
    assert_eq!(metrics.failures, 1);
    assert_eq!(metrics.records_written, 0);
}

#[tokio::test]
async fn reprocessing_replaces_the_same_record() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PROCESS_PATH);
            then.status(200)
                .json_body(json!({ "document": { "text": "second pass" } }));
        })
        .await;
    let write = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/v1/projects/proj/databases/(default)/documents/documents/report");
            then.status(200);
        })
        .await;

    let service = service_for(&server);
    service.process(&event("report.pdf")).await.expect("first");
    service.process(&event("report.pdf")).await.expect("second");

    write.assert_hits_async(2).await;
}

#[tokio::test]
async fn storage_route_runs_the_real_pipeline() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(PROCESS_PATH);
            then.status(200).json_body(json!({
                "document": {
                    "text": "Hello",
                    "entities": [{ "type": "GREETING" }]
                }
            }));
        })
        .await;
    let write = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/v1/projects/proj/databases/(default)/documents/documents/hello");
            then.status(200);
        })
        .await;

    let app = api::create_router(Arc::new(service_for(&server)), FailureMode::Acknowledge);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/events/storage")
                .header("content-type", "application/json")
                .body(Body::from(
                    json!({
                        "bucket": "inbox",
                        "name": "hello.pdf",
                        "metageneration": "1",
                        "timeCreated": "2024-05-01T10:00:00Z"
                    })
                    .to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["record_key"], "hello");
    assert_eq!(json["source"], "gs://inbox/hello.pdf");
    assert_eq!(json["entities"], 1);
    assert_eq!(json["text_chars"], 5);
    write.assert_async().await;
}

#[tokio::test]
async fn null_object_name_is_acknowledged_without_analysis() {
    let server = MockServer::start_async().await;
    let process = server
        .mock_async(|when, then| {
            when.method(POST);
            then.status(200).json_body(json!({ "document": { "text": "" } }));
        })
        .await;
    let write = server
        .mock_async(|when, then| {
            when.method(PATCH);
            then.status(200);
        })
        .await;

    let service = Arc::new(service_for(&server));
    let app = api::create_router(service.clone(), FailureMode::Acknowledge);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/events/storage")
                .body(Body::from(r#"{"bucket":"inbox","name":null}"#))
                .expect("request"),
        )
        .await
        .expect("router response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["status"], "error");
    assert_eq!(json["kind"], "invalid_event");
    process.assert_hits_async(0).await;
    write.assert_hits_async(0).await;
    assert_eq!(service.metrics_snapshot().failures, 1);
}
