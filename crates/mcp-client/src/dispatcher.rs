//! Single entry point for connecting a descriptor.
//!
//! The dispatcher never fails: disabled servers, unknown transport kinds,
//! connector errors and timeouts all come back as a disconnected
//! [`Connection`], so callers check one flag whatever the cause.

use std::sync::Arc;
use std::time::Duration;

use sb_domain::config::{ServerDescriptor, TransportKind};

use crate::connection::Connection;
use crate::connector::{Connector, HttpConnector, StdioConnector};
use crate::toolset::{McpToolset, Toolset};

/// Routes descriptors to the connector for their transport kind.
pub struct Dispatcher {
    stdio: Arc<dyn Connector>,
    http: Arc<dyn Connector>,
    connect_timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(stdio: Arc<dyn Connector>, http: Arc<dyn Connector>) -> Self {
        Self {
            stdio,
            http,
            connect_timeout: None,
        }
    }

    /// Stdio and HTTP connectors sharing one toolset.
    pub fn with_toolset(toolset: Arc<dyn Toolset>) -> Self {
        Self::new(
            Arc::new(StdioConnector::new(Arc::clone(&toolset))),
            Arc::new(HttpConnector::new(toolset)),
        )
    }

    /// Bound each connect attempt; an attempt that runs over is dropped and
    /// reported as disconnected.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub async fn connect(&self, server: Arc<ServerDescriptor>) -> Connection {
        if !server.enabled {
            tracing::info!(server = %server.name, "skipping disabled MCP server");
            return Connection::disconnected(server);
        }

        let connector = match &server.transport_kind {
            TransportKind::Stdio => &self.stdio,
            TransportKind::Http | TransportKind::StreamableHttp | TransportKind::Sse => &self.http,
            TransportKind::Unknown(kind) => {
                tracing::warn!(server = %server.name, kind = %kind, "unknown MCP server type");
                let reason = format!("unknown server type `{kind}`");
                return Connection::failed(server, reason);
            }
        };

        let attempt = connector.connect(Arc::clone(&server));
        let outcome = match self.connect_timeout {
            Some(limit) => match tokio::time::timeout(limit, attempt).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(
                        server = %server.name,
                        timeout_ms = limit.as_millis() as u64,
                        "MCP connection attempt timed out"
                    );
                    return Connection::failed(server, format!("timed out after {limit:?}"));
                }
            },
            None => attempt.await,
        };

        match outcome {
            Ok(connection) => connection,
            Err(e) => {
                tracing::debug!(server = %server.name, error = %e, "marking MCP server disconnected");
                Connection::failed(server, e.to_string())
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_toolset(Arc::new(McpToolset))
    }
}
