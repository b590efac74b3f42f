//! `sb-domain`: types shared by every Switchboard crate.
//!
//! - [`config`]: the MCP server configuration document and [`ServerDescriptor`].
//! - [`tool`]: tool descriptors discovered from MCP servers.
//! - [`error`]: the shared [`Error`] type.
//!
//! [`ServerDescriptor`]: config::ServerDescriptor
//! [`Error`]: error::Error

pub mod config;
pub mod error;
pub mod tool;
