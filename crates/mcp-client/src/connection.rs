//! The outcome of attempting to reach one server.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use sb_domain::config::ServerDescriptor;
use sb_domain::tool::ToolDescriptor;

use crate::error::McpError;
use crate::protocol::ToolCallResult;
use crate::session::McpSession;

/// A live or failed connection to one MCP server.
///
/// A connection is either fully connected (tools populated, session held)
/// or disconnected (no tools, no session). There is no partial state.
pub struct Connection {
    server: Arc<ServerDescriptor>,
    tools: Vec<ToolDescriptor>,
    connected: bool,
    session: Option<McpSession>,
    /// Why the attempt failed, for status output. `None` when skipped.
    error: Option<String>,
}

/// Coarse state for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    /// The descriptor is disabled; nothing was attempted.
    Disabled,
    /// The attempt failed or the transport kind is unknown.
    Failed,
    /// Previously connected, now released.
    Closed,
}

impl Connection {
    pub fn connected(server: Arc<ServerDescriptor>, tools: Vec<ToolDescriptor>, session: McpSession) -> Self {
        Self {
            server,
            tools,
            connected: true,
            session: Some(session),
            error: None,
        }
    }

    pub fn disconnected(server: Arc<ServerDescriptor>) -> Self {
        Self {
            server,
            tools: Vec::new(),
            connected: false,
            session: None,
            error: None,
        }
    }

    pub fn failed(server: Arc<ServerDescriptor>, reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::disconnected(server)
        }
    }

    pub fn server(&self) -> &ServerDescriptor {
        &self.server
    }

    pub fn name(&self) -> &str {
        &self.server.name
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether a release handle is still held.
    pub fn has_release_handle(&self) -> bool {
        self.session.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> ConnectionStatus {
        if self.connected {
            ConnectionStatus::Connected
        } else if !self.server.enabled {
            ConnectionStatus::Disabled
        } else if self.error.is_some() {
            ConnectionStatus::Failed
        } else {
            ConnectionStatus::Closed
        }
    }

    /// One human-readable status line.
    pub fn status_line(&self) -> String {
        let kind = &self.server.transport_kind;
        match self.status() {
            ConnectionStatus::Connected => {
                format!("✓ {} ({kind}): {} tools", self.name(), self.tools.len())
            }
            ConnectionStatus::Disabled => format!("- {} ({kind}): disabled", self.name()),
            ConnectionStatus::Failed => format!(
                "✗ {} ({kind}): {}",
                self.name(),
                self.error.as_deref().unwrap_or("connection failed")
            ),
            ConnectionStatus::Closed => format!("· {} ({kind}): closed", self.name()),
        }
    }

    /// Invoke a tool over this connection, whatever its transport.
    pub async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<ToolCallResult, McpError> {
        match &self.session {
            Some(session) if self.connected => session.call_tool(tool_name, arguments).await,
            _ => Err(McpError::NotConnected(self.server.name.clone())),
        }
    }

    /// Take the release handle out; later calls return `None`.
    pub(crate) fn take_session(&mut self) -> Option<McpSession> {
        self.session.take()
    }

    /// Final state after release: disconnected with no tools.
    pub(crate) fn mark_released(&mut self) {
        self.connected = false;
        self.tools.clear();
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("server", &self.server.name)
            .field("transport_kind", &self.server.transport_kind)
            .field("connected", &self.connected)
            .field("tool_count", &self.tools.len())
            .field("has_release_handle", &self.session.is_some())
            .field("error", &self.error)
            .finish()
    }
}
