//! PublisherMcpServer: rmcp ServerHandler backed by PublisherTools.
//!
//! Tool listing and tool calls are delegated to a shared `PublisherTools`.
//! The registry inside it is immutable, so clones handed out per session by
//! the HTTP transport need no locking.

use std::sync::Arc;

use rmcp::ErrorData as McpError;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, ListToolsResult, PaginatedRequestParams,
    ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};

use crate::config::PublisherConfig;
use crate::gateway::ApiGateway;
use crate::registry::AccountRegistry;
use crate::tools::PublisherTools;

/// Server name reported during the MCP handshake.
pub const SERVER_NAME: &str = "substack-publisher-mcp";

/// MCP server exposing the publisher tools.
#[derive(Clone)]
pub struct PublisherMcpServer {
    tools: Arc<PublisherTools>,
}

impl PublisherMcpServer {
    /// Create a server around an existing tool set.
    pub fn new(tools: PublisherTools) -> Self {
        Self {
            tools: Arc::new(tools),
        }
    }

    /// Build registry and gateway from config, then wrap them.
    pub fn from_config(config: &PublisherConfig) -> crate::Result<Self> {
        let registry = AccountRegistry::from_config(config)?;
        let gateway = ApiGateway::new(config.api_base_url.clone())?;
        Ok(Self::new(PublisherTools::new(registry, gateway)))
    }

    /// Number of configured publications.
    pub fn publication_count(&self) -> usize {
        self.tools.registry().len()
    }

    pub fn tools(&self) -> &PublisherTools {
        &self.tools
    }
}

impl ServerHandler for PublisherMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: SERVER_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only access to the Substack Publisher API. Call list_publications first; \
                 pass its names as the 'publication' parameter when several are configured."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tools.tools(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.tools.call(&request.name, request.arguments).await
    }
}
