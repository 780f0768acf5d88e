#![deny(missing_docs)]

//! Core library for docintake: storage-triggered OCR and entity extraction persisted to a
//! document database, plus the agent-facing upload, conversion, and search tools.

/// Document analysis (OCR and entity extraction) clients.
pub mod analysis;
/// HTTP routing and REST handlers.
pub mod api;
/// Bearer-token sources for Google Cloud REST APIs.
pub mod auth;
/// Environment-driven configuration management.
pub mod config;
/// Shared HTTP client helpers.
pub mod http;
/// Storage-triggered document intake pipeline.
pub mod intake;
/// Structured logging and tracing setup.
pub mod logging;
/// Model Context Protocol server implementation.
pub mod mcp;
/// Intake metrics helpers.
pub mod metrics;
/// Object storage uploads.
pub mod storage;
/// Document database persistence.
pub mod store;
/// Agent-facing document tools.
pub mod tools;
