use serde::{Deserialize, Serialize};

/// A tool discovered on an MCP server.
///
/// `name` is always present; entries without one are dropped when the
/// `tools/list` response is read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JSON Schema for the tool's arguments, when the server provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<serde_json::Value>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input_schema: None,
        }
    }
}

/// Tool definition exposed to an agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's parameters.
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Namespaced definition `mcp:{server}:{tool}` for a discovered tool.
    pub fn from_mcp(server: &str, tool: &ToolDescriptor) -> Self {
        Self {
            name: format!("mcp:{server}:{}", tool.name),
            description: tool.description.clone(),
            parameters: tool
                .input_schema
                .clone()
                .unwrap_or_else(|| serde_json::json!({ "type": "object", "properties": {} })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaced_definition() {
        let tool = ToolDescriptor {
            name: "get_customer".into(),
            description: "Look up a customer".into(),
            input_schema: Some(serde_json::json!({
                "type": "object",
                "properties": { "email": { "type": "string" } },
                "required": ["email"]
            })),
        };
        let def = ToolDefinition::from_mcp("database", &tool);
        assert_eq!(def.name, "mcp:database:get_customer");
        assert_eq!(def.description, "Look up a customer");
        assert_eq!(def.parameters["required"][0], "email");
    }

    #[test]
    fn missing_schema_becomes_empty_object() {
        let def = ToolDefinition::from_mcp("email", &ToolDescriptor::new("ping"));
        assert_eq!(def.parameters["type"], "object");
        assert!(def.parameters["properties"].as_object().unwrap().is_empty());
    }
}
