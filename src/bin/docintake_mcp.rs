//! MCP server entrypoint (stdio transport).
//!
//! Launches an MCP server that exposes the document upload, conversion, and search tools over
//! stdio for agent hosts. Only the tool and Google Cloud settings are read; intake identifiers
//! are not required here. Logs go to stderr because stdout carries the protocol.
use anyhow::{Context, Result};
use docintake::{
    config::{GcpConfig, ToolConfig},
    http, logging,
    mcp::DocIntakeMcpServer,
    tools::DocumentTools,
};
use rmcp::{service::ServiceExt, transport::stdio};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing(logging::ConsoleTarget::Stderr);

    let gcp = GcpConfig::from_env();
    let tool_config = ToolConfig::from_env();
    let client = http::build_client().context("failed to build HTTP client")?;
    let tools = DocumentTools::connect(&tool_config, &gcp, client)
        .await
        .context("failed to initialize document tools")?;
    let server = DocIntakeMcpServer::new(Arc::new(tools));

    let service = server
        .serve(stdio())
        .await
        .context("failed to start MCP server over stdio")?;

    service
        .waiting()
        .await
        .context("MCP server terminated unexpectedly")?;

    Ok(())
}
