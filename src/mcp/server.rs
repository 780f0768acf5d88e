//! MCP server bootstrap and request dispatch.

use std::{borrow::Cow, sync::Arc};

use crate::{
    mcp::{
        handlers::{
            convert::handle_convert, search::handle_search, upload::handle_upload,
        },
        registry, schemas,
    },
    tools::DocumentTools,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, ListToolsResult, ServerCapabilities, ServerInfo,
        Tool, ToolAnnotations,
    },
};

const UPLOAD_TOOL: &str = "upload_and_process_document";
const CONVERT_TOOL: &str = "convert_and_upload_to_gcs";
const SEARCH_TOOL: &str = "search_source_documents";

/// MCP server implementation exposing the document tools.
#[derive(Clone)]
pub struct DocIntakeMcpServer {
    tools: Arc<DocumentTools>,
    registry: Arc<registry::Registry>,
}

impl DocIntakeMcpServer {
    /// Create a new MCP server backed by the supplied tools.
    pub fn new(tools: Arc<DocumentTools>) -> Self {
        let mut registry = registry::Registry::new();
        registry.register_tool(UPLOAD_TOOL, tool_upload);
        registry.register_tool(CONVERT_TOOL, tool_convert);
        registry.register_tool(SEARCH_TOOL, tool_search);

        Self {
            tools,
            registry: Arc::new(registry),
        }
    }

    fn describe_tools(&self) -> Vec<Tool> {
        vec![
            Tool {
                name: Cow::Borrowed(UPLOAD_TOOL),
                title: Some("Upload Document".to_string()),
                description: Some(Cow::Borrowed(
                    "Upload a local document to the intake bucket; text and entity extraction start automatically once it lands.",
                )),
                input_schema: Arc::new(schemas::upload_input_schema()),
                output_schema: None,
                annotations: Some(
                    ToolAnnotations::with_title("Upload Document")
                        .destructive(false)
                        .idempotent(true)
                        .open_world(true),
                ),
                icons: None,
            },
            Tool {
                name: Cow::Borrowed(CONVERT_TOOL),
                title: Some("Convert Text to PDF and Upload".to_string()),
                description: Some(Cow::Borrowed(
                    "Render a plain-text file as a PDF and upload it so it goes through document intake.",
                )),
                input_schema: Arc::new(schemas::convert_input_schema()),
                output_schema: None,
                annotations: Some(
                    ToolAnnotations::with_title("Convert Text to PDF and Upload")
                        .destructive(false)
                        .idempotent(true)
                        .open_world(true),
                ),
                icons: None,
            },
            Tool {
                name: Cow::Borrowed(SEARCH_TOOL),
                title: Some("Search Source Documents".to_string()),
                description: Some(Cow::Borrowed(
                    "Search an account's private source documents to ground answers in uploaded material.",
                )),
                input_schema: Arc::new(schemas::search_input_schema()),
                output_schema: None,
                annotations: Some(
                    ToolAnnotations::with_title("Search Source Documents")
                        .read_only(true)
                        .idempotent(true)
                        .open_world(true),
                ),
                icons: None,
            },
        ]
    }
}

fn tool_upload(server: &DocIntakeMcpServer, request: CallToolRequestParam) -> registry::ToolFuture {
    let tools = server.tools.clone();
    Box::pin(async move { handle_upload(&tools, request.arguments).await })
}

fn tool_convert(
    server: &DocIntakeMcpServer,
    request: CallToolRequestParam,
) -> registry::ToolFuture {
    let tools = server.tools.clone();
    Box::pin(async move { handle_convert(&tools, request.arguments).await })
}

fn tool_search(server: &DocIntakeMcpServer, request: CallToolRequestParam) -> registry::ToolFuture {
    let tools = server.tools.clone();
    Box::pin(async move { handle_search(&tools, request.arguments).await })
}

impl ServerHandler for DocIntakeMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mut implementation = rmcp::model::Implementation::from_build_env();
        implementation.name = "docintake".to_string();
        implementation.title = Some("Document Intake MCP".to_string());
        implementation.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: implementation,
            instructions: Some(
                "Use this server to get documents into the intake pipeline and to search them. Upload PDFs or images directly, convert plain-text notes to PDF first, then search an account's source documents once processing has finished.".into(),
            ),
            ..ServerInfo::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.describe_tools();
        std::future::ready(Ok(ListToolsResult::with_all_items(tools)))
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            if let Some(handler) = self.registry.tools.get(request.name.as_ref()) {
                return handler(self, request).await;
            }

            Err(McpError::invalid_params(
                format!("Unknown tool: {}", request.name),
                None,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::tools_for;

    #[test]
    fn every_described_tool_has_a_handler() {
        let server = DocIntakeMcpServer::new(Arc::new(tools_for("http://127.0.0.1:1", None)));
        let tools = server.describe_tools();
        assert_eq!(tools.len(), 3);
        for tool in tools {
            assert!(
                server.registry.tools.contains_key(tool.name.as_ref()),
                "missing handler for {}",
                tool.name
            );
        }
    }

    #[test]
    fn server_info_advertises_tools_only() {
        let server = DocIntakeMcpServer::new(Arc::new(tools_for("http://127.0.0.1:1", None)));
        let info = server.get_info();
        assert_eq!(info.server_info.name, "docintake");
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
    }
}
