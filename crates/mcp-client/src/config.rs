//! Discovery loader: reads the MCP server list from a YAML file.
//!
//! The descriptor types live in `sb_domain::config` so that other crates
//! can use them without depending on the full MCP client.

pub use sb_domain::config::{McpConfig, ServerDescriptor, TransportKind};

use std::path::{Path, PathBuf};

use sb_domain::error::{Error, Result};

/// Environment variable that overrides the default config location.
pub const CONFIG_ENV: &str = "SB_MCP_CONFIG";

/// Config file used when neither a path nor [`CONFIG_ENV`] is given.
pub const DEFAULT_CONFIG_FILE: &str = "mcp_config.yaml";

/// Resolve the config path: explicit path, then `$SB_MCP_CONFIG`, then
/// `mcp_config.yaml` in the working directory.
pub fn resolve_config_path(explicit: Option<&Path>, env_value: Option<String>) -> PathBuf {
    match (explicit, env_value) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(from_env)) if !from_env.trim().is_empty() => PathBuf::from(from_env),
        _ => PathBuf::from(DEFAULT_CONFIG_FILE),
    }
}

/// Load server descriptors.
///
/// A missing file, an empty file and a file without `mcp_servers` all
/// yield an empty list. Only unreadable or unparseable files are errors.
pub fn load_descriptors(path: Option<&Path>) -> Result<Vec<ServerDescriptor>> {
    let path = resolve_config_path(path, std::env::var(CONFIG_ENV).ok());

    if !path.exists() {
        tracing::info!(path = %path.display(), "MCP config not found, no servers configured");
        return Ok(Vec::new());
    }

    tracing::info!(path = %path.display(), "loading MCP config");
    let raw = std::fs::read_to_string(&path)?;

    if raw.trim().is_empty() {
        tracing::info!(path = %path.display(), "MCP config is empty");
        return Ok(Vec::new());
    }

    let config = sb_domain::config::parse_yaml(&raw).map_err(|e| match e {
        Error::Config(msg) => Error::Config(format!("parsing {}: {msg}", path.display())),
        other => other,
    })?;

    log_summary(&config.mcp_servers);
    Ok(config.mcp_servers)
}

fn log_summary(servers: &[ServerDescriptor]) {
    tracing::info!(count = servers.len(), "found MCP servers");
    for server in servers {
        tracing::info!(
            server = %server.name,
            transport = %server.transport_kind,
            enabled = server.enabled,
            description = %server.description,
            "{} {}",
            if server.enabled { "enabled" } else { "disabled" },
            server.name,
        );
    }
}
