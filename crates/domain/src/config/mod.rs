mod mcp;

pub use mcp::*;

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Document parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parse a YAML configuration document.
///
/// Only syntactically invalid YAML is an error. A blank document, a
/// document that is not a mapping, or one without an `mcp_servers` key all
/// produce an empty [`McpConfig`].
pub fn parse_yaml(raw: &str) -> Result<McpConfig> {
    if raw.trim().is_empty() {
        return Ok(McpConfig::default());
    }

    let doc: serde_yaml::Value =
        serde_yaml::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;

    Ok(McpConfig::from_document(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_document_is_empty() {
        assert!(parse_yaml("").unwrap().mcp_servers.is_empty());
        assert!(parse_yaml("   \n\n").unwrap().mcp_servers.is_empty());
    }

    #[test]
    fn comment_only_document_is_empty() {
        let cfg = parse_yaml("# nothing configured yet\n").unwrap();
        assert!(cfg.mcp_servers.is_empty());
    }

    #[test]
    fn invalid_yaml_is_config_error() {
        let err = parse_yaml("mcp_servers: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn non_mapping_document_is_empty() {
        let cfg = parse_yaml("- just\n- a list\n").unwrap();
        assert!(cfg.mcp_servers.is_empty());
    }
}
