//! MCP manager: holds every server connection and orchestrates discovery,
//! tool listing, dispatch and shutdown.

use std::sync::Arc;

use serde_json::Value;

use sb_domain::config::ServerDescriptor;
use sb_domain::tool::{ToolDefinition, ToolDescriptor};

use crate::connection::{Connection, ConnectionStatus};
use crate::dispatcher::Dispatcher;
use crate::error::McpError;
use crate::lifecycle;
use crate::protocol::ToolCallResult;

/// How [`McpManager::discover`] walks the descriptor list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// Connect to every server at once.
    #[default]
    Concurrent,
    /// One server after another, in file order.
    Sequential,
}

/// Manager that holds all MCP server connections.
///
/// Connections are kept in descriptor order, one per descriptor, whether
/// or not they connected.
pub struct McpManager {
    dispatcher: Dispatcher,
    connections: Vec<Connection>,
}

impl McpManager {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            connections: Vec::new(),
        }
    }

    /// Create an empty manager (no MCP servers configured).
    pub fn empty() -> Self {
        Self::new(Dispatcher::default())
    }

    /// Connect to every descriptor and keep the results.
    ///
    /// A failing server never stops the others. Calling this again replaces
    /// the previous connections after releasing them.
    pub async fn discover(&mut self, descriptors: Vec<ServerDescriptor>, mode: DiscoveryMode) -> &[Connection] {
        if !self.connections.is_empty() {
            self.shutdown().await;
        }

        let descriptors: Vec<Arc<ServerDescriptor>> = descriptors.into_iter().map(Arc::new).collect();
        tracing::info!(
            count = descriptors.len(),
            mode = ?mode,
            connect_timeout = ?self.dispatcher.connect_timeout(),
            "discovering MCP servers"
        );

        let connections = match mode {
            DiscoveryMode::Concurrent => {
                let attempts = descriptors
                    .into_iter()
                    .map(|server| self.dispatcher.connect(server));
                futures_util::future::join_all(attempts).await
            }
            DiscoveryMode::Sequential => {
                let mut connections = Vec::with_capacity(descriptors.len());
                for server in descriptors {
                    connections.push(self.dispatcher.connect(server).await);
                }
                connections
            }
        };

        self.connections = connections;
        tracing::info!(
            configured = self.connections.len(),
            connected = self.connected_count(),
            tools = self.tool_count(),
            "MCP discovery complete"
        );
        &self.connections
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// All discovered tools across connected servers, as `(server, tool)`.
    pub fn list_tools(&self) -> Vec<(&str, &ToolDescriptor)> {
        self.connections
            .iter()
            .filter(|c| c.is_connected())
            .flat_map(|c| c.tools().iter().map(move |tool| (c.name(), tool)))
            .collect()
    }

    /// Tool definitions named `mcp:{server}:{tool}`, ready to hand to a model.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.list_tools()
            .into_iter()
            .map(|(server, tool)| ToolDefinition::from_mcp(server, tool))
            .collect()
    }

    /// Call a tool on a named server.
    ///
    /// When several descriptors share a name the first connected one wins.
    pub async fn call_tool(
        &self,
        server: &str,
        tool_name: &str,
        arguments: Value,
    ) -> Result<ToolCallResult, McpError> {
        let mut named = self.connections.iter().filter(|c| c.name() == server).peekable();
        if named.peek().is_none() {
            return Err(McpError::ServerNotFound(server.to_owned()));
        }

        let connection = named
            .find(|c| c.is_connected())
            .ok_or_else(|| McpError::NotConnected(server.to_owned()))?;

        tracing::debug!(server = %server, tool = %tool_name, "calling MCP tool");
        connection.call_tool(tool_name, arguments).await
    }

    /// Number of servers currently connected.
    pub fn connected_count(&self) -> usize {
        self.connections.iter().filter(|c| c.is_connected()).count()
    }

    /// Total number of discovered tools across connected servers.
    pub fn tool_count(&self) -> usize {
        self.connections
            .iter()
            .filter(|c| c.is_connected())
            .map(|c| c.tools().len())
            .sum()
    }

    /// Check if there are any configured servers.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Number of connections in the given state.
    pub fn count_status(&self, status: ConnectionStatus) -> usize {
        self.connections.iter().filter(|c| c.status() == status).count()
    }

    /// One status line per descriptor, in descriptor order.
    pub fn status_lines(&self) -> Vec<String> {
        self.connections.iter().map(Connection::status_line).collect()
    }

    /// Release every connection concurrently. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        if self.connections.iter().any(Connection::has_release_handle) {
            tracing::info!(count = self.connected_count(), "shutting down MCP servers");
        }
        lifecycle::release_all(&mut self.connections).await;
    }
}

impl Default for McpManager {
    fn default() -> Self {
        Self::empty()
    }
}
