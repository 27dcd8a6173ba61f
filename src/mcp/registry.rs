//! Tool registry and built-in tool behaviours.
//!
//! The registry is an immutable, ordered catalog of tool descriptors built
//! once at startup, plus the mapping from tool name to executable behaviour.
//! It is shared read-only across sessions, so concurrent WebSocket
//! connections need no locking.
//!
//! Tool failures are expressed as [`ToolError`] values; no panic inside a
//! tool body ever crosses the registry boundary.

use chrono::Local;
use serde::Serialize;
use serde_json::{json, Map, Number, Value};
use thiserror::Error;

/// A tool descriptor for the tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Content item in a tool call result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

impl ToolContent {
    /// Creates a text content block.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Failure of a tool invocation.
///
/// Each variant maps onto one member of the wire error taxonomy at the
/// dispatcher boundary.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool is not in the catalog.
    #[error("unknown tool: {name}")]
    NotFound {
        /// The name that failed to resolve.
        name: String,
    },

    /// A required argument was missing or malformed.
    #[error("{0}")]
    InvalidParams(String),

    /// The tool body failed while executing.
    #[error("{0}")]
    Execution(String),
}

/// The closed set of built-in tool behaviours.
///
/// Adding a tool means adding a variant here and an entry to the catalog in
/// [`ToolRegistry::builtin`]; unknown names resolve to
/// [`ToolError::NotFound`] rather than falling through a string match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuiltinTool {
    /// Echoes the `text` argument back.
    Echo,
    /// Adds the `a` and `b` arguments.
    Add,
    /// Reports the current local time.
    GetTime,
    /// Formatted search result embedding the `query` argument.
    WebsocketSearch,
    /// Formatted timestamp result.
    WebsocketTime,
}

impl BuiltinTool {
    /// Executes the tool against the given arguments.
    fn invoke(self, arguments: &Map<String, Value>) -> Result<Vec<ToolContent>, ToolError> {
        match self {
            Self::Echo => {
                let text = text_argument(arguments, "text");
                Ok(vec![ToolContent::text(format!("Echo: {text}"))])
            }
            Self::Add => {
                let a = number_argument(arguments, "a")?;
                let b = number_argument(arguments, "b")?;
                Ok(vec![ToolContent::text(format!(
                    "Result: {}",
                    format_sum(&a, &b)
                ))])
            }
            Self::GetTime => {
                let now = Local::now().format("%Y-%m-%dT%H:%M:%S%.6f");
                Ok(vec![ToolContent::text(format!("Current time: {now}"))])
            }
            Self::WebsocketSearch => {
                let query = match arguments.get("query") {
                    Some(Value::String(q)) if !q.is_empty() => q,
                    _ => {
                        return Err(ToolError::InvalidParams(
                            "Invalid parameters: 'query' is required for websocket_search"
                                .to_string(),
                        ))
                    }
                };
                Ok(vec![ToolContent::text(format!(
                    "\u{1f50d} WEBSOCKET MCP SEARCH for '{query}': Found comprehensive results \
                     via WebSocket connection. Server located relevant information about {query} \
                     from distributed sources. [Response from WebSocket MCP Server]"
                ))])
            }
            Self::WebsocketTime => {
                let now = Local::now().format("%Y-%m-%d %H:%M:%S");
                Ok(vec![ToolContent::text(format!(
                    "\u{23f0} WEBSOCKET MCP TIME: {now} [Timestamp from WebSocket MCP Server]"
                ))])
            }
        }
    }
}

/// Reads a string argument, mirroring the reference default of `""`.
///
/// Non-string values are rendered in their JSON form so the tool still
/// never fails.
fn text_argument(arguments: &Map<String, Value>, key: &str) -> String {
    match arguments.get(key) {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Reads a numeric argument, defaulting to 0 when absent.
fn number_argument(arguments: &Map<String, Value>, key: &str) -> Result<Number, ToolError> {
    match arguments.get(key) {
        None => Ok(Number::from(0)),
        Some(Value::Number(n)) => Ok(n.clone()),
        Some(_) => Err(ToolError::Execution(format!(
            "argument '{key}' is not a number"
        ))),
    }
}

/// Formats `a + b` using the host's default numeric formatting.
///
/// Integer inputs stay in integer arithmetic so large values don't pick up
/// a fractional representation.
fn format_sum(a: &Number, b: &Number) -> String {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(sum) = x.checked_add(y) {
            return sum.to_string();
        }
    }
    let sum = a.as_f64().unwrap_or(0.0) + b.as_f64().unwrap_or(0.0);
    sum.to_string()
}

/// A catalog entry pairing a descriptor with its behaviour.
#[derive(Debug, Clone)]
struct RegisteredTool {
    definition: ToolDefinition,
    behaviour: BuiltinTool,
}

/// The immutable tool catalog.
///
/// Built once at startup; `list` returns the descriptors in a stable,
/// deterministic order unaffected by call history.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    /// Builds the fixed catalog of built-in tools.
    #[must_use]
    pub fn builtin() -> Self {
        let tools = vec![
            RegisteredTool {
                definition: ToolDefinition {
                    name: "echo".to_string(),
                    description: "Echo back the input text".to_string(),
                    input_schema: json!({
                        "type": "object",
                        "properties": {
                            "text": {
                                "type": "string",
                                "description": "Text to echo back"
                            }
                        },
                        "required": ["text"]
                    }),
                },
                behaviour: BuiltinTool::Echo,
            },
            RegisteredTool {
                definition: ToolDefinition {
                    name: "add".to_string(),
                    description: "Add two numbers together".to_string(),
                    input_schema: json!({
                        "type": "object",
                        "properties": {
                            "a": {
                                "type": "number",
                                "description": "First number"
                            },
                            "b": {
                                "type": "number",
                                "description": "Second number"
                            }
                        },
                        "required": ["a", "b"]
                    }),
                },
                behaviour: BuiltinTool::Add,
            },
            RegisteredTool {
                definition: ToolDefinition {
                    name: "get_time".to_string(),
                    description: "Get the current time".to_string(),
                    input_schema: json!({
                        "type": "object",
                        "properties": {},
                        "additionalProperties": false
                    }),
                },
                behaviour: BuiltinTool::GetTime,
            },
            RegisteredTool {
                definition: ToolDefinition {
                    name: "websocket_search".to_string(),
                    description: "Search for information via WebSocket MCP server".to_string(),
                    input_schema: json!({
                        "type": "object",
                        "properties": {
                            "query": {
                                "type": "string",
                                "description": "The search query"
                            }
                        },
                        "required": ["query"],
                        "additionalProperties": false
                    }),
                },
                behaviour: BuiltinTool::WebsocketSearch,
            },
            RegisteredTool {
                definition: ToolDefinition {
                    name: "websocket_time".to_string(),
                    description: "Get current time from WebSocket server".to_string(),
                    input_schema: json!({
                        "type": "object",
                        "properties": {},
                        "additionalProperties": false
                    }),
                },
                behaviour: BuiltinTool::WebsocketTime,
            },
        ];

        debug_assert!(
            {
                let mut names: Vec<_> = tools.iter().map(|t| t.definition.name.as_str()).collect();
                names.sort_unstable();
                names.windows(2).all(|w| w[0] != w[1])
            },
            "tool names must be unique"
        );

        Self { tools }
    }

    /// Returns the ordered tool descriptors.
    #[must_use]
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.tools.iter().map(|t| &t.definition).collect()
    }

    /// Invokes a tool by name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::NotFound`] for an unrecognised name, or the
    /// tool's own [`ToolError`] on failure.
    pub fn invoke(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<Vec<ToolContent>, ToolError> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.definition.name == name)
            .ok_or_else(|| ToolError::NotFound {
                name: name.to_string(),
            })?;

        tool.behaviour.invoke(arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(json: Value) -> Map<String, Value> {
        json.as_object().cloned().unwrap()
    }

    fn invoke_text(name: &str, arguments: &Map<String, Value>) -> String {
        let content = ToolRegistry::builtin().invoke(name, arguments).unwrap();
        assert!(!content.is_empty(), "tool result must carry content");
        let ToolContent::Text { text } = &content[0];
        text.clone()
    }

    #[test]
    fn catalog_order_is_stable() {
        let registry = ToolRegistry::builtin();
        let names: Vec<_> = registry.list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "echo",
                "add",
                "get_time",
                "websocket_search",
                "websocket_time"
            ]
        );

        // A second listing is identical, call history notwithstanding.
        let _ = registry.invoke("echo", &Map::new());
        let again: Vec<_> = registry.list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, again);
    }

    #[test]
    fn echo_formats_text() {
        assert_eq!(invoke_text("echo", &args(json!({"text": "hi"}))), "Echo: hi");
    }

    #[test]
    fn echo_defaults_to_empty_string() {
        assert_eq!(invoke_text("echo", &Map::new()), "Echo: ");
    }

    #[test]
    fn echo_renders_non_string_values() {
        assert_eq!(invoke_text("echo", &args(json!({"text": 5}))), "Echo: 5");
    }

    #[test]
    fn add_integers() {
        assert_eq!(
            invoke_text("add", &args(json!({"a": 2, "b": 3}))),
            "Result: 5"
        );
    }

    #[test]
    fn add_mixed_numbers() {
        assert_eq!(
            invoke_text("add", &args(json!({"a": 2, "b": 3.5}))),
            "Result: 5.5"
        );
    }

    #[test]
    fn add_negative_numbers() {
        assert_eq!(
            invoke_text("add", &args(json!({"a": -2, "b": -3.25}))),
            "Result: -5.25"
        );
    }

    #[test]
    fn add_defaults_missing_arguments_to_zero() {
        assert_eq!(invoke_text("add", &args(json!({"a": 7}))), "Result: 7");
        assert_eq!(invoke_text("add", &Map::new()), "Result: 0");
    }

    #[test]
    fn add_rejects_non_numeric_argument() {
        let err = ToolRegistry::builtin()
            .invoke("add", &args(json!({"a": "two", "b": 3})))
            .unwrap_err();
        let ToolError::Execution(detail) = err else {
            panic!("Expected Execution error");
        };
        assert!(detail.contains("'a'"));
    }

    #[test]
    fn get_time_has_expected_prefix() {
        let text = invoke_text("get_time", &Map::new());
        assert!(text.starts_with("Current time: "));
    }

    #[test]
    fn websocket_search_embeds_query() {
        let text = invoke_text("websocket_search", &args(json!({"query": "rust"})));
        assert!(text.contains("WEBSOCKET MCP SEARCH for 'rust'"));
        assert!(text.ends_with("[Response from WebSocket MCP Server]"));
    }

    #[test]
    fn websocket_search_requires_query() {
        let registry = ToolRegistry::builtin();

        for arguments in [args(json!({})), args(json!({"query": ""}))] {
            let err = registry.invoke("websocket_search", &arguments).unwrap_err();
            let ToolError::InvalidParams(message) = err else {
                panic!("Expected InvalidParams error");
            };
            assert!(message.contains("'query'"));
        }
    }

    #[test]
    fn websocket_time_has_expected_format() {
        let text = invoke_text("websocket_time", &Map::new());
        assert!(text.starts_with("\u{23f0} WEBSOCKET MCP TIME: "));
        assert!(text.ends_with("[Timestamp from WebSocket MCP Server]"));
    }

    #[test]
    fn unknown_tool_is_not_found() {
        let err = ToolRegistry::builtin()
            .invoke("missing_tool", &Map::new())
            .unwrap_err();
        let ToolError::NotFound { name } = err else {
            panic!("Expected NotFound error");
        };
        assert_eq!(name, "missing_tool");
    }
}
