//! Model Context Protocol (MCP) integration for docintake.
//!
//! This module exposes the document tools to agent hosts over stdio:
//!
//! - `upload_and_process_document`: upload a local file into the intake bucket.
//! - `convert_and_upload_to_gcs`: render a local text file as a PDF and upload it.
//! - `search_source_documents`: query an account's private source documents.
//!
//! Results are returned as structured content carrying the tool envelope
//! (`{"status": "success" | "error", ...}`); malformed arguments are rejected with
//! `INVALID_PARAMS`. Intake itself is not hosted here: uploads trigger it through the bucket.

pub mod handlers;
mod registry;
mod schemas;
mod server;

pub use server::DocIntakeMcpServer;
