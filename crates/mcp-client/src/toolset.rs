//! The protocol toolset: turns connection parameters into discovered tools
//! plus a live session.
//!
//! Connectors talk to a [`Toolset`] rather than to transports directly, so
//! the connect/dispatch logic can be exercised with a fake toolset.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Url;

use sb_domain::config::ServerDescriptor;
use sb_domain::tool::ToolDescriptor;

use crate::error::McpError;
use crate::session::McpSession;
use crate::transport::{HttpTransport, McpTransport, StdioTransport};

/// How to launch a stdio server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StdioLaunch {
    pub command: String,
    pub args: Vec<String>,
    /// Complete environment for the child.
    pub env: HashMap<String, String>,
}

impl StdioLaunch {
    /// Launch parameters for `server` with its `env` overlaid on `base`.
    pub fn from_descriptor(
        server: &ServerDescriptor,
        base: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            command: server.command.clone(),
            args: server.args.clone(),
            env: overlay_env(base, &server.env),
        }
    }

    /// `command arg1 arg2 ...` for logging.
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Endpoint descriptor for an HTTP-family server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEndpoint {
    pub url: String,
}

/// Parameters handed to [`Toolset::from_server`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionParams {
    Stdio(StdioLaunch),
    Http(HttpEndpoint),
}

/// Copy `base` and overlay `overrides`; override keys win on collision.
pub fn overlay_env(
    base: impl IntoIterator<Item = (String, String)>,
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut env: HashMap<String, String> = base.into_iter().collect();
    env.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    env
}

/// Snapshot of the current process environment.
///
/// Variables that are not valid UTF-8 are left out.
pub fn process_env() -> Vec<(String, String)> {
    std::env::vars_os()
        .filter_map(|(k, v)| match (k.into_string(), v.into_string()) {
            (Ok(k), Ok(v)) => Some((k, v)),
            (k, _) => {
                tracing::debug!(key = ?k, "skipping non-UTF-8 environment variable");
                None
            }
        })
        .collect()
}

/// The MCP client capability used by connectors.
#[async_trait]
pub trait Toolset: Send + Sync {
    /// Connect, handshake and discover tools.
    ///
    /// On success the caller owns the returned session and must release it.
    /// On failure nothing is left running.
    async fn from_server(
        &self,
        params: ConnectionParams,
    ) -> Result<(Vec<ToolDescriptor>, McpSession), McpError>;
}

/// [`Toolset`] backed by this crate's stdio and HTTP transports.
#[derive(Debug, Clone, Copy, Default)]
pub struct McpToolset;

impl McpToolset {
    fn open(params: &ConnectionParams) -> Result<Box<dyn McpTransport>, McpError> {
        match params {
            ConnectionParams::Stdio(launch) => Ok(Box::new(StdioTransport::spawn(launch)?)),
            ConnectionParams::Http(endpoint) => {
                let url = Url::parse(&endpoint.url).map_err(|e| McpError::InvalidEndpoint {
                    url: endpoint.url.clone(),
                    reason: e.to_string(),
                })?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(McpError::InvalidEndpoint {
                        url: endpoint.url.clone(),
                        reason: format!("unsupported scheme `{}`", url.scheme()),
                    });
                }
                Ok(Box::new(HttpTransport::new(url)?))
            }
        }
    }
}

#[async_trait]
impl Toolset for McpToolset {
    async fn from_server(
        &self,
        params: ConnectionParams,
    ) -> Result<(Vec<ToolDescriptor>, McpSession), McpError> {
        let mut session = McpSession::new(Self::open(&params)?);

        let discovered: Result<Vec<ToolDescriptor>, McpError> = async {
            let init = session.initialize().await?;
            if !init.supports_tools() {
                tracing::debug!(
                    server = %init.server_info.name,
                    "server does not advertise tools, skipping tools/list"
                );
                return Ok(Vec::new());
            }
            session.list_tools().await
        }
        .await;

        match discovered {
            Ok(tools) => Ok((tools, session)),
            Err(e) => {
                if let Err(close_err) = session.close().await {
                    tracing::debug!(error = %close_err, "error releasing failed MCP session");
                }
                Err(e)
            }
        }
    }
}
