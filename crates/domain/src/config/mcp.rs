//! MCP (Model Context Protocol) server descriptors.
//!
//! A descriptor is the static recipe for reaching one tool server. The
//! `sb-mcp-client` crate turns descriptors into live connections.
//!
//! Descriptors are built leniently from a YAML document: missing keys take
//! their defaults, unknown keys are ignored and a value of the wrong shape
//! falls back to the default with a warning. Only the document itself being
//! unparseable is an error (see [`super::parse_yaml`]).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Name used for entries that do not declare one.
pub const UNNAMED_SERVER: &str = "unknown";

/// Top-level MCP configuration document.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct McpConfig {
    /// Server descriptors in document order. Duplicate names are kept.
    #[serde(default)]
    pub mcp_servers: Vec<ServerDescriptor>,
}

/// Configuration for a single MCP server connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerDescriptor {
    /// Human-readable identifier, used as the join key in logs and status output.
    pub name: String,

    /// How the server is reached.
    #[serde(rename = "type", default)]
    pub transport_kind: TransportKind,

    #[serde(default)]
    pub description: String,

    #[serde(default = "d_true")]
    pub enabled: bool,

    /// Executable to spawn (stdio only).
    #[serde(default)]
    pub command: String,

    /// Arguments passed to `command` (stdio only).
    #[serde(default)]
    pub args: Vec<String>,

    /// Variables overlaid on the current environment (stdio only).
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Endpoint address (http, streamableHttp, sse).
    #[serde(default)]
    pub url: String,
}

fn d_true() -> bool {
    true
}

impl ServerDescriptor {
    /// A descriptor with every field at its default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transport_kind: TransportKind::Stdio,
            description: String::new(),
            enabled: true,
            command: String::new(),
            args: Vec::new(),
            env: HashMap::new(),
            url: String::new(),
        }
    }

    /// Stdio descriptor for `command args...`.
    pub fn stdio(
        name: impl Into<String>,
        command: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            ..Self::new(name)
        }
    }

    /// HTTP-family descriptor for `url`.
    pub fn http(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            transport_kind: TransportKind::Http,
            url: url.into(),
            ..Self::new(name)
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Transport kind
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Transport kind for connecting to an MCP server.
///
/// Unrecognised values are preserved in [`TransportKind::Unknown`] so a
/// typo in one entry never fails the whole load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransportKind {
    #[default]
    Stdio,
    Http,
    StreamableHttp,
    Sse,
    Unknown(String),
}

impl TransportKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
            Self::StreamableHttp => "streamableHttp",
            Self::Sse => "sse",
            Self::Unknown(raw) => raw,
        }
    }

    /// `http`, `streamableHttp` and `sse` share one connection behavior.
    pub fn is_http_family(&self) -> bool {
        matches!(self, Self::Http | Self::StreamableHttp | Self::Sse)
    }
}

impl From<String> for TransportKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "stdio" => Self::Stdio,
            "http" => Self::Http,
            "streamableHttp" | "streamable_http" | "streamable-http" => Self::StreamableHttp,
            "sse" => Self::Sse,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<&str> for TransportKind {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_owned())
    }
}

impl From<TransportKind> for String {
    fn from(kind: TransportKind) -> Self {
        match kind {
            TransportKind::Unknown(raw) => raw,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Lenient construction from YAML
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

impl McpConfig {
    /// Build the config from an already-parsed YAML document.
    pub fn from_document(doc: &Value) -> Self {
        let servers = match doc.get("mcp_servers") {
            None | Some(Value::Null) => return Self::default(),
            Some(Value::Sequence(entries)) => entries,
            Some(other) => {
                tracing::warn!(
                    found = value_kind(other),
                    "`mcp_servers` is not a list, no servers loaded"
                );
                return Self::default();
            }
        };

        let mcp_servers = servers
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match entry.as_mapping() {
                Some(map) => Some(ServerDescriptor::from_mapping(map)),
                None => {
                    tracing::warn!(
                        index,
                        found = value_kind(entry),
                        "skipping MCP server entry that is not a mapping"
                    );
                    None
                }
            })
            .collect();

        Self { mcp_servers }
    }
}

impl ServerDescriptor {
    /// Build a descriptor from one `mcp_servers` entry, defaulting anything
    /// that is missing or malformed.
    pub fn from_mapping(map: &Mapping) -> Self {
        let field = |key: &str| map.get(key).filter(|v| !v.is_null());

        let name = match field("name") {
            None => UNNAMED_SERVER.to_owned(),
            Some(v) => scalar_string(v).unwrap_or_else(|| {
                tracing::warn!(found = value_kind(v), "server `name` is not a scalar, using default");
                UNNAMED_SERVER.to_owned()
            }),
        };

        let string_field = |key: &str| -> String {
            match field(key) {
                None => String::new(),
                Some(v) => scalar_string(v).unwrap_or_else(|| {
                    tracing::warn!(server = %name, key, found = value_kind(v), "ignoring non-scalar value");
                    String::new()
                }),
            }
        };

        let transport_kind = match field("type") {
            None => TransportKind::Stdio,
            Some(v) => match scalar_string(v) {
                Some(raw) => TransportKind::from(raw),
                None => {
                    tracing::warn!(server = %name, found = value_kind(v), "server `type` is not a scalar, using stdio");
                    TransportKind::Stdio
                }
            },
        };

        let enabled = match field("enabled") {
            None => true,
            Some(v) => v.as_bool().unwrap_or_else(|| {
                tracing::warn!(server = %name, found = value_kind(v), "server `enabled` is not a boolean, using true");
                true
            }),
        };

        let args = match field("args") {
            None => Vec::new(),
            Some(Value::Sequence(items)) => items
                .iter()
                .filter_map(|item| {
                    let arg = scalar_string(item);
                    if arg.is_none() {
                        tracing::warn!(server = %name, found = value_kind(item), "dropping non-scalar argument");
                    }
                    arg
                })
                .collect(),
            Some(v) => {
                tracing::warn!(server = %name, found = value_kind(v), "server `args` is not a list, ignoring");
                Vec::new()
            }
        };

        let env = match field("env") {
            None => HashMap::new(),
            Some(Value::Mapping(vars)) => vars
                .iter()
                .filter_map(|(k, v)| match (scalar_string(k), scalar_string(v)) {
                    (Some(k), Some(v)) => Some((k, v)),
                    _ => {
                        tracing::warn!(server = %name, "dropping non-scalar environment entry");
                        None
                    }
                })
                .collect(),
            Some(v) => {
                tracing::warn!(server = %name, found = value_kind(v), "server `env` is not a mapping, ignoring");
                HashMap::new()
            }
        };

        Self {
            description: string_field("description"),
            command: string_field("command"),
            url: string_field("url"),
            name,
            transport_kind,
            enabled,
            args,
            env,
        }
    }
}

/// Stringify a YAML scalar. Numbers and booleans are accepted so that
/// `PORT: 8080` works as an environment value.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
