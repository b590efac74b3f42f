//! Transport connectors: one descriptor in, one connection (or error) out.

use std::sync::Arc;

use async_trait::async_trait;

use sb_domain::config::{ServerDescriptor, TransportKind};
use sb_domain::tool::ToolDescriptor;

use crate::connection::Connection;
use crate::error::ConnectError;
use crate::session::McpSession;
use crate::toolset::{process_env, ConnectionParams, HttpEndpoint, StdioLaunch, Toolset};

/// Builds a live connection for descriptors of one transport family.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, server: Arc<ServerDescriptor>) -> Result<Connection, ConnectError>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Stdio
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Spawns the server as a child process and speaks MCP over its stdio.
pub struct StdioConnector {
    toolset: Arc<dyn Toolset>,
}

impl StdioConnector {
    pub fn new(toolset: Arc<dyn Toolset>) -> Self {
        Self { toolset }
    }
}

#[async_trait]
impl Connector for StdioConnector {
    async fn connect(&self, server: Arc<ServerDescriptor>) -> Result<Connection, ConnectError> {
        if server.transport_kind != TransportKind::Stdio {
            return Err(ConnectError::WrongTransport {
                server: server.name.clone(),
                kind: server.transport_kind.to_string(),
            });
        }
        if server.command.is_empty() {
            return Err(ConnectError::MissingParameter {
                server: server.name.clone(),
                kind: server.transport_kind.to_string(),
                field: "command",
            });
        }

        let launch = StdioLaunch::from_descriptor(&server, process_env());
        tracing::info!(
            server = %server.name,
            command = %launch.command_line(),
            env_overrides = server.env.len(),
            "connecting to stdio MCP server"
        );

        let outcome = self.toolset.from_server(ConnectionParams::Stdio(launch)).await;
        finish(server, outcome)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HTTP family
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connects `http`, `streamableHttp` and `sse` servers using only their URL.
pub struct HttpConnector {
    toolset: Arc<dyn Toolset>,
}

impl HttpConnector {
    pub fn new(toolset: Arc<dyn Toolset>) -> Self {
        Self { toolset }
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, server: Arc<ServerDescriptor>) -> Result<Connection, ConnectError> {
        if !server.transport_kind.is_http_family() {
            return Err(ConnectError::WrongTransport {
                server: server.name.clone(),
                kind: server.transport_kind.to_string(),
            });
        }
        if server.url.is_empty() {
            return Err(ConnectError::MissingParameter {
                server: server.name.clone(),
                kind: server.transport_kind.to_string(),
                field: "url",
            });
        }

        tracing::info!(
            server = %server.name,
            url = %server.url,
            transport = %server.transport_kind,
            "connecting to HTTP MCP server"
        );

        let params = ConnectionParams::Http(HttpEndpoint {
            url: server.url.clone(),
        });
        let outcome = self.toolset.from_server(params).await;
        finish(server, outcome)
    }
}

/// Log the outcome and wrap it into a [`Connection`].
fn finish(
    server: Arc<ServerDescriptor>,
    outcome: Result<(Vec<ToolDescriptor>, McpSession), crate::error::McpError>,
) -> Result<Connection, ConnectError> {
    match outcome {
        Ok((tools, session)) => {
            tracing::info!(
                server = %server.name,
                tool_count = tools.len(),
                "MCP server connected"
            );
            for tool in &tools {
                tracing::info!(server = %server.name, tool = %tool.name, "discovered tool");
            }
            Ok(Connection::connected(server, tools, session))
        }
        Err(e) => {
            tracing::warn!(server = %server.name, error = %e, "MCP connection failed");
            Err(ConnectError::Failed {
                server: server.name.clone(),
                source: e,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::McpError;
    use std::sync::Mutex;

    /// Records the parameters it was called with and always fails.
    #[derive(Default)]
    struct RecordingToolset {
        calls: Mutex<Vec<ConnectionParams>>,
    }

    #[async_trait]
    impl Toolset for RecordingToolset {
        async fn from_server(
            &self,
            params: ConnectionParams,
        ) -> Result<(Vec<ToolDescriptor>, McpSession), McpError> {
            self.calls.lock().unwrap().push(params);
            Err(McpError::Protocol("recorded".into()))
        }
    }

    #[tokio::test]
    async fn stdio_passes_overlaid_environment() {
        let toolset = Arc::new(RecordingToolset::default());
        let connector = StdioConnector::new(toolset.clone());

        let mut server = ServerDescriptor::stdio("db", "mock-db", ["--fixtures", "demo"]);
        server.env.insert("PATH".into(), "/opt/mock/bin".into());
        server.env.insert("DB_MODE".into(), "fixture".into());

        let err = connector.connect(Arc::new(server)).await.unwrap_err();
        assert_eq!(err.server(), "db");

        let calls = toolset.calls.lock().unwrap();
        let ConnectionParams::Stdio(launch) = &calls[0] else {
            panic!("expected stdio params, got {:?}", calls[0]);
        };
        assert_eq!(launch.command, "mock-db");
        assert_eq!(launch.args, vec!["--fixtures", "demo"]);
        assert_eq!(launch.env["PATH"], "/opt/mock/bin");
        assert_eq!(launch.env["DB_MODE"], "fixture");
        for (key, value) in process_env() {
            if key != "PATH" && key != "DB_MODE" {
                assert_eq!(launch.env.get(&key), Some(&value), "{key} not inherited");
            }
        }
    }

    #[tokio::test]
    async fn http_family_uses_url_only() {
        let toolset = Arc::new(RecordingToolset::default());
        let connector = HttpConnector::new(toolset.clone());

        for kind in [TransportKind::Http, TransportKind::StreamableHttp, TransportKind::Sse] {
            let mut server = ServerDescriptor::http("remote", "http://localhost:9999/mcp");
            server.transport_kind = kind;
            server.command = "ignored".into();
            let _ = connector.connect(Arc::new(server)).await;
        }

        let calls = toolset.calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        for params in calls.iter() {
            assert_eq!(
                params,
                &ConnectionParams::Http(HttpEndpoint {
                    url: "http://localhost:9999/mcp".into()
                })
            );
        }
    }

    #[tokio::test]
    async fn connectors_reject_other_kinds() {
        let toolset = Arc::new(RecordingToolset::default());

        let err = StdioConnector::new(toolset.clone())
            .connect(Arc::new(ServerDescriptor::http("remote", "http://localhost:1")))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectError::WrongTransport { .. }));

        let err = HttpConnector::new(toolset.clone())
            .connect(Arc::new(ServerDescriptor::stdio("db", "mock-db", Vec::<String>::new())))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectError::WrongTransport { .. }));

        assert!(toolset.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_parameters_fail_before_toolset() {
        let toolset = Arc::new(RecordingToolset::default());

        let err = StdioConnector::new(toolset.clone())
            .connect(Arc::new(ServerDescriptor::new("no-command")))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectError::MissingParameter { field: "command", .. }));

        let err = HttpConnector::new(toolset.clone())
            .connect(Arc::new(ServerDescriptor::http("no-url", "")))
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectError::MissingParameter { field: "url", .. }));

        assert!(toolset.calls.lock().unwrap().is_empty());
    }
}
