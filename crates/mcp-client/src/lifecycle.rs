//! Releasing connections.
//!
//! Release takes the session out of the connection before closing it, so a
//! second call finds nothing to close. Errors are logged, never returned,
//! and the connection always ends up disconnected.

use crate::connection::Connection;

/// Release one connection's transport resources.
pub async fn release(connection: &mut Connection) {
    if let Some(session) = connection.take_session() {
        match session.close().await {
            Ok(()) => {
                tracing::info!(server = %connection.name(), "disconnected from MCP server");
            }
            Err(e) => {
                tracing::warn!(
                    server = %connection.name(),
                    error = %e,
                    "error disconnecting from MCP server"
                );
            }
        }
    }
    connection.mark_released();
}

/// Release every connection concurrently.
pub async fn release_all(connections: &mut [Connection]) {
    futures_util::future::join_all(connections.iter_mut().map(release)).await;
}
