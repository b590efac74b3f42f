//! An initialized MCP session over any transport.

use serde_json::Value;

use sb_domain::tool::ToolDescriptor;

use crate::error::McpError;
use crate::protocol::{self, InitializeResult, ToolCallResult, ToolsListResult};
use crate::transport::{McpTransport, TransportError};

/// Upper bound on `tools/list` pages followed via `nextCursor`.
const MAX_TOOL_PAGES: usize = 64;

/// A live MCP session: the release handle owned by a [`Connection`].
///
/// [`Connection`]: crate::connection::Connection
pub struct McpSession {
    transport: Box<dyn McpTransport>,
    server_info: Option<protocol::ServerInfo>,
}

impl std::fmt::Debug for McpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpSession")
            .field("server_info", &self.server_info)
            .field("alive", &self.transport.is_alive())
            .finish()
    }
}

impl McpSession {
    /// Wrap a transport. No messages are exchanged until [`Self::initialize`].
    pub fn new(transport: Box<dyn McpTransport>) -> Self {
        Self {
            transport,
            server_info: None,
        }
    }

    /// Perform the MCP handshake: `initialize`, then `notifications/initialized`.
    pub async fn initialize(&mut self) -> Result<InitializeResult, McpError> {
        let params = serde_json::to_value(protocol::initialize_params()).map_err(|e| {
            McpError::Protocol(format!("failed to serialize initialize params: {e}"))
        })?;

        let result = self
            .transport
            .send_request("initialize", Some(params))
            .await?
            .into_result()?;

        let init: InitializeResult = serde_json::from_value(result)
            .map_err(|e| McpError::Protocol(format!("failed to parse initialize result: {e}")))?;

        tracing::debug!(
            server = %init.server_info.name,
            protocol_version = %init.protocol_version,
            "MCP initialize response received"
        );

        self.transport
            .send_notification("notifications/initialized")
            .await?;

        self.server_info = Some(init.server_info.clone());
        Ok(init)
    }

    /// Discover tools via `tools/list`, following pagination cursors.
    pub async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_TOOL_PAGES {
            let params = cursor
                .as_ref()
                .map(|c| serde_json::json!({ "cursor": c }));
            let result = self
                .transport
                .send_request("tools/list", params)
                .await?
                .into_result()?;

            let page: ToolsListResult = serde_json::from_value(result)
                .map_err(|e| McpError::Protocol(format!("failed to parse tools/list result: {e}")))?;

            tools.extend(protocol::normalize_tools(page.tools));

            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => return Ok(tools),
            }
        }

        tracing::warn!(
            pages = MAX_TOOL_PAGES,
            tool_count = tools.len(),
            "tools/list pagination limit reached, keeping tools seen so far"
        );
        Ok(tools)
    }

    /// Call a tool on this server.
    pub async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<ToolCallResult, McpError> {
        if !self.transport.is_alive() {
            return Err(McpError::NotConnected(self.server_name().to_owned()));
        }

        let params = serde_json::json!({
            "name": tool_name,
            "arguments": arguments
        });

        let result = self
            .transport
            .send_request("tools/call", Some(params))
            .await?
            .into_result()?;

        serde_json::from_value::<ToolCallResult>(result)
            .map_err(|e| McpError::Protocol(format!("failed to parse tools/call result: {e}")))
    }

    /// Name reported by the server during `initialize` (empty before).
    pub fn server_name(&self) -> &str {
        self.server_info.as_ref().map_or("", |info| info.name.as_str())
    }

    /// Release the transport. Consumes the session so it cannot be closed twice.
    pub async fn close(self) -> Result<(), TransportError> {
        self.transport.shutdown().await
    }
}
