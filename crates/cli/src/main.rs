use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sb_mcp_client::config::{self, CONFIG_ENV};
use sb_mcp_client::{DiscoveryMode, Dispatcher, McpManager};

/// Optional per-server bound on connect attempts, in seconds.
const CONNECT_TIMEOUT_ENV: &str = "SB_CONNECT_TIMEOUT_SECS";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_cli_tracing();

    let config_path = config::resolve_config_path(None, std::env::var(CONFIG_ENV).ok());
    let descriptors = config::load_descriptors(Some(&config_path))
        .with_context(|| format!("loading {}", config_path.display()))?;

    let mut dispatcher = Dispatcher::default();
    if let Some(timeout) = connect_timeout(std::env::var(CONNECT_TIMEOUT_ENV).ok()) {
        dispatcher = dispatcher.with_connect_timeout(timeout);
    }

    let mut manager = McpManager::new(dispatcher);
    manager.discover(descriptors, DiscoveryMode::Concurrent).await;

    if manager.is_empty() {
        println!("no MCP servers configured ({})", config_path.display());
        return Ok(());
    }

    for connection in manager.connections() {
        println!("{}", connection.status_line());
        for tool in connection.tools() {
            println!("    {}", tool.name);
        }
    }
    println!(
        "{}/{} servers connected, {} tools",
        manager.connected_count(),
        manager.connections().len(),
        manager.tool_count()
    );

    manager.shutdown().await;
    Ok(())
}

/// Compact logs on stderr so stdout carries only status output.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn connect_timeout(raw: Option<String>) -> Option<Duration> {
    let raw = raw?;
    match raw.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            tracing::warn!(value = %raw, error = %e, "ignoring invalid {CONNECT_TIMEOUT_ENV}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_timeout_parsing() {
        assert_eq!(connect_timeout(None), None);
        assert_eq!(connect_timeout(Some("15".into())), Some(Duration::from_secs(15)));
        assert_eq!(connect_timeout(Some(" 3 ".into())), Some(Duration::from_secs(3)));
        assert_eq!(connect_timeout(Some("0".into())), None);
        assert_eq!(connect_timeout(Some("soon".into())), None);
    }
}
