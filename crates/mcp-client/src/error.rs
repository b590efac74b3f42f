use crate::protocol::JsonRpcError;
use crate::transport::TransportError;

/// Errors specific to MCP operations.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("MCP transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("MCP protocol error: {0}")]
    Protocol(String),

    #[error("MCP server returned {0}")]
    Rpc(#[from] JsonRpcError),

    #[error("invalid MCP endpoint `{url}`: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("MCP server not found: {0}")]
    ServerNotFound(String),

    #[error("MCP server is not connected: {0}")]
    NotConnected(String),
}

impl From<McpError> for sb_domain::error::Error {
    fn from(e: McpError) -> Self {
        sb_domain::error::Error::Other(e.to_string())
    }
}

/// Why a connector could not produce a live connection.
///
/// The message omits the server name; use [`ConnectError::server`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("{source}")]
    Failed {
        server: String,
        #[source]
        source: McpError,
    },

    #[error("missing `{field}` for {kind} transport")]
    MissingParameter {
        server: String,
        kind: String,
        field: &'static str,
    },

    #[error("connector does not handle `{kind}` servers")]
    WrongTransport { server: String, kind: String },
}

impl ConnectError {
    /// Name of the server the attempt was for.
    pub fn server(&self) -> &str {
        match self {
            Self::Failed { server, .. }
            | Self::MissingParameter { server, .. }
            | Self::WrongTransport { server, .. } => server,
        }
    }
}
