//! JSON-RPC 2.0 types for the MCP protocol.
//!
//! Over stdio each message is a single line of JSON (newline-delimited).
//! Over HTTP each message is the body of a POST.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sb_domain::tool::ToolDescriptor;

/// MCP protocol revision sent in `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Requests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A JSON-RPC 2.0 request (has an `id`, expects a response).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 notification (no `id`, fire-and-forget).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params: None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Responses
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Check if the response represents an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Extract the result value, returning an error if the response is an error.
    pub fn into_result(self) -> Result<Value, JsonRpcError> {
        if let Some(err) = self.error {
            Err(err)
        } else {
            Ok(self.result.unwrap_or(Value::Null))
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// MCP-specific payloads
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Client info sent during `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// Parameters for the `initialize` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    pub capabilities: Value,
    pub client_info: ClientInfo,
}

/// Server identity returned by `initialize`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// The result payload from `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    #[serde(default)]
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    #[serde(default)]
    pub server_info: ServerInfo,
}

impl InitializeResult {
    /// Whether the server advertised the `tools` capability.
    pub fn supports_tools(&self) -> bool {
        self.capabilities.get("tools").is_some_and(|t| !t.is_null())
    }
}

/// The result payload from `tools/list`.
///
/// Entries are kept as raw JSON so that a single malformed tool does not
/// hide the rest; see [`normalize_tools`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsListResult {
    #[serde(default)]
    pub tools: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Convert raw `tools/list` entries into [`ToolDescriptor`]s.
///
/// Entries without a string `name` are dropped with a warning.
pub fn normalize_tools(raw: Vec<Value>) -> Vec<ToolDescriptor> {
    raw.into_iter()
        .filter_map(|entry| {
            let Some(name) = entry.get("name").and_then(Value::as_str) else {
                tracing::warn!(entry = %entry, "dropping tool without a name");
                return None;
            };
            Some(ToolDescriptor {
                name: name.to_owned(),
                description: entry
                    .get("description")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned(),
                input_schema: entry.get("inputSchema").filter(|v| !v.is_null()).cloned(),
            })
        })
        .collect()
}

/// A single content item in a `tools/call` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallContent {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: String,
}

/// The result payload from `tools/call`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallResult {
    #[serde(default)]
    pub content: Vec<ToolCallContent>,
    #[serde(default)]
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Concatenated text of every `text` content item.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter(|c| c.content_type == "text")
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse the text content as JSON (tool servers commonly return a
    /// JSON-serialized mapping as their single text item).
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.text()).ok()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helper constructors
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build the `initialize` request parameters.
pub fn initialize_params() -> InitializeParams {
    InitializeParams {
        protocol_version: PROTOCOL_VERSION.into(),
        capabilities: serde_json::json!({}),
        client_info: ClientInfo {
            name: "switchboard".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        },
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_request() {
        let req = JsonRpcRequest::new(
            1,
            "initialize",
            Some(serde_json::json!({ "protocolVersion": PROTOCOL_VERSION })),
        );
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"method\":\"initialize\""));
    }

    #[test]
    fn serialize_request_without_params() {
        let req = JsonRpcRequest::new(2, "tools/list", None);
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("params"));
    }

    #[test]
    fn serialize_notification() {
        let notif = JsonRpcNotification::new("notifications/initialized");
        let json = serde_json::to_string(&notif).unwrap();
        assert!(json.contains("\"method\":\"notifications/initialized\""));
        assert!(!json.contains("\"id\""));
    }

    #[test]
    fn deserialize_error_response() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"Method not found"}}"#;
        let resp: JsonRpcResponse = serde_json::from_str(raw).unwrap();
        assert!(resp.is_error());
        let err = resp.into_result().unwrap_err();
        assert_eq!(err.code, -32601);
        assert_eq!(format!("{err}"), "JSON-RPC error -32601: Method not found");
    }

    #[test]
    fn initialize_result_capabilities() {
        let raw = r#"{
            "protocolVersion": "2024-11-05",
            "capabilities": { "tools": {} },
            "serverInfo": { "name": "mock-database-server", "version": "1.0" }
        }"#;
        let init: InitializeResult = serde_json::from_str(raw).unwrap();
        assert!(init.supports_tools());
        assert_eq!(init.server_info.name, "mock-database-server");

        let bare: InitializeResult =
            serde_json::from_str(r#"{ "capabilities": { "prompts": {} } }"#).unwrap();
        assert!(!bare.supports_tools());
    }

    #[test]
    fn normalize_drops_nameless_tools() {
        let raw = r#"{
            "tools": [
                {
                    "name": "get_customer",
                    "description": "Lookup a customer by email address.",
                    "inputSchema": {
                        "type": "object",
                        "properties": { "email": { "type": "string" } },
                        "required": ["email"]
                    }
                },
                { "description": "no name here" },
                { "name": 42 },
                { "name": "ping" }
            ],
            "nextCursor": "page-2"
        }"#;
        let result: ToolsListResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.next_cursor.as_deref(), Some("page-2"));

        let tools = normalize_tools(result.tools);
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "get_customer");
        assert_eq!(tools[0].input_schema.as_ref().unwrap()["required"][0], "email");
        assert_eq!(tools[1].name, "ping");
        assert_eq!(tools[1].description, "");
        assert!(tools[1].input_schema.is_none());
    }

    #[test]
    fn tool_call_result_text_and_json() {
        let raw = r#"{
            "content": [{ "type": "text", "text": "{\"success\": true, \"customer_id\": \"C001\"}" }]
        }"#;
        let result: ToolCallResult = serde_json::from_str(raw).unwrap();
        assert!(!result.is_error);
        let json = result.json().unwrap();
        assert_eq!(json["customer_id"], "C001");
    }

    #[test]
    fn tool_call_result_with_error() {
        let raw = r#"{
            "content": [{ "type": "text", "text": "unknown tool: refund_everything" }],
            "isError": true
        }"#;
        let result: ToolCallResult = serde_json::from_str(raw).unwrap();
        assert!(result.is_error);
        assert_eq!(result.text(), "unknown tool: refund_everything");
        assert!(result.json().is_none());
    }

    #[test]
    fn initialize_params_identify_client() {
        let params = initialize_params();
        assert_eq!(params.protocol_version, "2024-11-05");
        assert_eq!(params.client_info.name, "switchboard");
    }
}
