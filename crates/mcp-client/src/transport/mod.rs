//! MCP transport layer.
//!
//! Each MCP server communicates over a transport:
//! - **Stdio**: spawn a child process, send JSON-RPC over stdin/stdout.
//! - **Http**: POST JSON-RPC to an endpoint; the server answers with either
//!   a JSON body or a `text/event-stream` carrying the response. Used for
//!   the `http`, `streamableHttp` and `sse` transport kinds alike.

mod http;
mod stdio;

pub use http::HttpTransport;
pub use stdio::StdioTransport;

use async_trait::async_trait;
use serde_json::Value;

use crate::protocol::JsonRpcResponse;

/// How long to wait for the response to a single request.
pub(crate) const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Trait for MCP server transports.
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Send a JSON-RPC request and wait for the corresponding response.
    async fn send_request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<JsonRpcResponse, TransportError>;

    /// Send a JSON-RPC notification (no response expected).
    async fn send_notification(&self, method: &str) -> Result<(), TransportError>;

    /// Check if the transport is still alive.
    fn is_alive(&self) -> bool;

    /// Release the underlying process or session.
    ///
    /// Callers invoke this at most once; see [`crate::lifecycle`].
    async fn shutdown(&self) -> Result<(), TransportError>;
}

/// Errors that can occur during transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("MCP server process has exited")]
    ProcessExited,

    #[error("response id {got} does not match request id {expected}")]
    UnexpectedId { expected: u64, got: u64 },

    #[error("timeout waiting for response")]
    Timeout,

    #[error("transport not supported: {0}")]
    Unsupported(String),
}
