//! HTTP surface for docintake.
//!
//! Two routers are built here. The public intake router is what the storage trigger calls:
//!
//! - `POST /events/storage` – Run intake for an object-created notification (`bucket`, `name`;
//!   other notification fields are ignored). Returns the record key and counters on success.
//! - `GET /metrics` – Observe intake counters.
//! - `GET /health` – Liveness probe.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! The tool router reads local files, so the server binds it to loopback only. It carries no
//! CORS layer and refuses any request that declares an `Origin`:
//!
//! - `POST /tools/upload` – Upload a local file into the intake bucket.
//! - `POST /tools/convert` – Render a local text file as a PDF and upload it to the intake bucket.
//! - `POST /tools/search` – Forward a query to the private-document search service.
//!
//! Intake failures are reported according to the configured [`FailureMode`]: in `acknowledge`
//! mode every event is answered with `200` so the delivery system never redelivers; in
//! `surface` mode retryable failures answer `503` so the event comes back. The intake router's
//! CORS policy is open to any origin, method, and header.

use crate::config::FailureMode;
use crate::intake::{IntakeApi, IntakeError, IntakeEvent};
use crate::metrics::MetricsSnapshot;
use crate::tools::{DocumentTools, ToolResult};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Request, State},
    http::{StatusCode, header::ORIGIN},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared handler state for the intake router.
struct AppState<S> {
    intake: Arc<S>,
    failure_mode: FailureMode,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            intake: Arc::clone(&self.intake),
            failure_mode: self.failure_mode,
        }
    }
}

/// Build the public router exposing the intake trigger, metrics, and discovery endpoints.
pub fn create_router<S>(intake: Arc<S>, failure_mode: FailureMode) -> Router
where
    S: IntakeApi + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/events/storage", post(handle_storage_event::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/health", get(health))
        .route("/commands", get(get_commands))
        .with_state(AppState {
            intake,
            failure_mode,
        })
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Build the router for the document tools. Serve it on a loopback listener only.
pub fn create_tool_router(tools: Arc<DocumentTools>) -> Router {
    Router::new()
        .route("/tools/upload", post(upload_document))
        .route("/tools/convert", post(convert_document))
        .route("/tools/search", post(search_documents))
        .with_state(tools)
        .layer(middleware::from_fn(reject_cross_origin))
        .layer(TraceLayer::new_for_http())
}

/// Refuse browser-originated calls; the tools act on the host's filesystem.
async fn reject_cross_origin(request: Request, next: Next) -> Response {
    if let Some(origin) = request.headers().get(ORIGIN) {
        tracing::warn!(
            origin = ?origin,
            path = %request.uri().path(),
            "Refusing tool request carrying an Origin header"
        );
        return (
            StatusCode::FORBIDDEN,
            Json(ToolResult::error(
                "Tool endpoints do not accept cross-origin requests.",
            )),
        )
            .into_response();
    }
    next.run(request).await
}

/// Success response for `POST /events/storage`.
#[derive(Serialize)]
struct IntakeResponse {
    status: &'static str,
    record_key: String,
    source: String,
    entities: usize,
    text_chars: usize,
}

/// Run intake for one storage notification.
///
/// The body is decoded leniently so that a malformed notification reaches validation and is
/// reported under the failure mode instead of being rejected by the extractor.
async fn handle_storage_event<S>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Response, AppError>
where
    S: IntakeApi,
{
    let event = IntakeEvent::from_payload(&body);
    match state.intake.process(&event).await {
        Ok(outcome) => Ok(Json(IntakeResponse {
            status: "ok",
            record_key: outcome.record_key,
            source: outcome.source_locator,
            entities: outcome.entity_count,
            text_chars: outcome.text_chars,
        })
        .into_response()),
        Err(error) if state.failure_mode == FailureMode::Surface && error.is_retryable() => {
            Err(AppError(error))
        }
        Err(error) => {
            tracing::warn!(
                bucket = %event.bucket,
                object = %event.name,
                kind = error.kind(),
                "Acknowledging failed storage event"
            );
            Ok((StatusCode::OK, Json(error_body(&error))).into_response())
        }
    }
}

/// Request body for `POST /tools/upload`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UploadRequest {
    /// Local path of the file to upload.
    file_path: PathBuf,
}

async fn upload_document(
    State(tools): State<Arc<DocumentTools>>,
    Json(request): Json<UploadRequest>,
) -> Json<ToolResult> {
    Json(tools.upload_document(&request.file_path).await)
}

/// Request body for `POST /tools/convert`. The target is always the configured bucket.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConvertRequest {
    /// Local path of the text file to convert.
    file_path: PathBuf,
}

async fn convert_document(
    State(tools): State<Arc<DocumentTools>>,
    Json(request): Json<ConvertRequest>,
) -> Json<ToolResult> {
    Json(tools.convert_and_upload(&request.file_path, None).await)
}

/// Request body for `POST /tools/search`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest {
    account_name: String,
    query: String,
}

async fn search_documents(
    State(tools): State<Arc<DocumentTools>>,
    Json(request): Json<SearchRequest>,
) -> Json<serde_json::Value> {
    Json(
        tools
            .search_source_documents(&request.account_name, &request.query)
            .await,
    )
}

/// Return the intake counters.
async fn get_metrics<S>(State(state): State<AppState<S>>) -> Json<MetricsSnapshot>
where
    S: IntakeApi,
{
    Json(state.intake.metrics_snapshot())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "storage_event",
                method: "POST",
                path: "/events/storage",
                description: "Extract text and entities from a newly stored PDF and save the record under the object name without its .pdf suffix. Response returns { \"status\": \"ok\", \"record_key\": string, \"source\": string, \"entities\": number, \"text_chars\": number }.",
                request_example: Some(json!({
                    "bucket": "my-intake-bucket",
                    "name": "invoices/2024-001.pdf"
                })),
            },
            CommandDescriptor {
                name: "upload_document",
                method: "POST",
                path: "/tools/upload",
                description: "Loopback tool listener only. Upload a local file to the intake bucket; processing starts automatically.",
                request_example: Some(json!({ "file_path": "/data/contract.pdf" })),
            },
            CommandDescriptor {
                name: "convert_document",
                method: "POST",
                path: "/tools/convert",
                description: "Loopback tool listener only. Render a local text file as a PDF and upload it to the intake bucket.",
                request_example: Some(json!({ "file_path": "/data/notes.txt" })),
            },
            CommandDescriptor {
                name: "search_documents",
                method: "POST",
                path: "/tools/search",
                description: "Loopback tool listener only. Search an account's private source documents.",
                request_example: Some(json!({
                    "accountName": "acme",
                    "query": "renewal terms"
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return intake counters useful for observability dashboards.",
                request_example: None,
            },
            CommandDescriptor {
                name: "health",
                method: "GET",
                path: "/health",
                description: "Liveness probe.",
                request_example: None,
            },
        ],
    })
}

fn error_body(error: &IntakeError) -> serde_json::Value {
    json!({
        "status": "error",
        "kind": error.kind(),
        "retryable": error.is_retryable(),
        "message": error.to_string(),
    })
}

struct AppError(IntakeError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.is_retryable() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(error_body(&self.0))).into_response()
    }
}
