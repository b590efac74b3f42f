//! `sb-mcp-client`: MCP (Model Context Protocol) client for Switchboard.
//!
//! This crate provides:
//! - A YAML discovery loader that reads the list of configured servers.
//! - JSON-RPC 2.0 protocol types for talking to MCP servers.
//! - Stdio and streamable HTTP transports.
//! - Per-transport connectors behind a [`Dispatcher`] that turns every
//!   failure into a disconnected [`Connection`].
//! - An [`McpManager`] that discovers servers, dispatches tool calls and
//!   releases everything on shutdown.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sb_mcp_client::{config, DiscoveryMode, McpManager};
//!
//! let descriptors = config::load_descriptors(None)?;
//! let mut manager = McpManager::empty();
//! manager.discover(descriptors, DiscoveryMode::Concurrent).await;
//!
//! for line in manager.status_lines() {
//!     println!("{line}");
//! }
//!
//! let result = manager
//!     .call_tool("database", "get_customer", json!({"email": "user@email.com"}))
//!     .await?;
//!
//! manager.shutdown().await;
//! ```

pub mod config;
pub mod connection;
pub mod connector;
pub mod dispatcher;
pub mod error;
pub mod lifecycle;
pub mod manager;
pub mod protocol;
pub mod session;
pub mod toolset;
pub mod transport;

// Re-exports for convenience.
pub use config::{McpConfig, ServerDescriptor, TransportKind};
pub use connection::{Connection, ConnectionStatus};
pub use connector::{Connector, HttpConnector, StdioConnector};
pub use dispatcher::Dispatcher;
pub use error::{ConnectError, McpError};
pub use manager::{DiscoveryMode, McpManager};
pub use session::McpSession;
pub use toolset::{ConnectionParams, HttpEndpoint, McpToolset, StdioLaunch, Toolset};
