//! Stateless request dispatcher.
//!
//! The dispatcher is a pure function of one raw message unit plus an
//! immutable [`ServerContext`]: it parses the unit, routes by method name,
//! and produces either one serialised response unit or no output at all.
//! Session state (if any) lives in the session loop, never here, which is
//! what lets one dispatcher instance serve many concurrent connections.

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::mcp::protocol::{
    parse_message, ErrorCode, IncomingMessage, JsonRpcError, JsonRpcErrorData, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, RequestId,
};
use crate::mcp::registry::{ToolError, ToolRegistry};

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolCapabilities>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Some(ToolCapabilities::default()),
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session. The catalog is
    /// fixed at startup, so this is never advertised.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for the initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

/// Immutable per-process negotiation payload and tool catalog.
///
/// Constructed once at startup and shared by reference into every session;
/// no field is ever mutated afterwards.
#[derive(Debug, Clone)]
pub struct ServerContext {
    /// Protocol version advertised by `initialize`.
    pub protocol_version: String,
    /// Static server identification.
    pub server_info: ServerInfo,
    /// Static capability set.
    pub capabilities: ServerCapabilities,
    /// The tool catalog.
    pub registry: ToolRegistry,
}

impl ServerContext {
    /// Creates the context for one deployment.
    #[must_use]
    pub fn new(protocol_version: impl Into<String>, server_name: impl Into<String>) -> Self {
        Self {
            protocol_version: protocol_version.into(),
            server_info: ServerInfo {
                name: server_name.into(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities::default(),
            registry: ToolRegistry::builtin(),
        }
    }
}

/// Routes raw message units to handlers and renders the reply, if any.
#[derive(Debug)]
pub struct Dispatcher {
    context: ServerContext,
}

impl Dispatcher {
    /// Creates a dispatcher over an immutable context.
    #[must_use]
    pub fn new(context: ServerContext) -> Self {
        Self { context }
    }

    /// Returns the context this dispatcher serves.
    #[must_use]
    pub const fn context(&self) -> &ServerContext {
        &self.context
    }

    /// Processes one raw message unit.
    ///
    /// Returns the serialised response unit, or `None` when the input was a
    /// notification (which is never answered, whatever its outcome).
    #[must_use]
    pub fn dispatch(&self, raw: &str) -> Option<String> {
        match parse_message(raw) {
            // The one case where unclassifiable input still gets a reply.
            Err(error) => Some(serialise_error(error)),
            Ok(IncomingMessage::Request(req)) => self.handle_request(req),
            Ok(IncomingMessage::Notification(notif)) => {
                Self::handle_notification(&notif);
                None
            }
        }
    }

    /// Handles a request carrying an id.
    fn handle_request(&self, req: JsonRpcRequest) -> Option<String> {
        // The notifications/* family is never answered, id or not.
        if req.method.starts_with("notifications/") {
            tracing::debug!(method = %req.method, "Suppressing reply to notification-family request");
            return None;
        }

        let outcome = match req.method.as_str() {
            "initialize" => Ok(self.handle_initialize(&req)),
            "tools/list" => Ok(self.handle_tools_list(&req)),
            "tools/call" => self.handle_tools_call(&req),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        Some(match outcome {
            Ok(response) => serialise_response(response),
            Err(error) => serialise_error(error),
        })
    }

    /// Handles an incoming notification. Nothing here may produce output.
    fn handle_notification(notif: &JsonRpcNotification) {
        tracing::debug!(method = %notif.method, "Received notification");
    }

    /// Handles the initialize request.
    ///
    /// Always succeeds once parsing succeeded; client params are not
    /// validated, matching the reference behaviour.
    fn handle_initialize(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(
            req.id.clone(),
            json!({
                "protocolVersion": self.context.protocol_version,
                "capabilities": self.context.capabilities,
                "serverInfo": self.context.server_info,
            }),
        )
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(
            req.id.clone(),
            json!({
                "tools": self.context.registry.list(),
            }),
        )
    }

    /// Handles the tools/call request.
    fn handle_tools_call(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        let params = req.params.as_ref().and_then(Value::as_object);

        let name = match params.and_then(|p| p.get("name")) {
            Some(Value::String(name)) => name.clone(),
            _ => {
                return Err(JsonRpcError::invalid_params(
                    req.id.clone(),
                    "Invalid parameters: 'name' is required for tools/call",
                ))
            }
        };

        let arguments = match params.and_then(|p| p.get("arguments")) {
            None => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(JsonRpcError::invalid_params(
                    req.id.clone(),
                    "Invalid parameters: arguments must be a JSON object",
                ))
            }
        };

        match self.context.registry.invoke(&name, &arguments) {
            Ok(content) => Ok(JsonRpcResponse::success(
                req.id.clone(),
                json!({ "content": content }),
            )),
            Err(ToolError::NotFound { name }) => {
                Err(JsonRpcError::unknown_tool(req.id.clone(), &name))
            }
            Err(ToolError::InvalidParams(message)) => {
                Err(JsonRpcError::invalid_params(req.id.clone(), message))
            }
            Err(error @ ToolError::Execution(_)) => {
                Err(JsonRpcError::tool_execution_error(req.id.clone(), error))
            }
        }
    }
}

/// Serialises a success response to one wire unit.
fn serialise_response(response: JsonRpcResponse) -> String {
    serde_json::to_string(&response).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialise response");
        fallback_error(response.id)
    })
}

/// Serialises an error response to one wire unit.
fn serialise_error(error: JsonRpcError) -> String {
    serde_json::to_string(&error).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialise error response");
        fallback_error(error.id)
    })
}

/// Last-resort internal error built from plain strings, whose serialisation
/// cannot fail.
fn fallback_error(id: RequestId) -> String {
    let error = JsonRpcError::new(
        id,
        JsonRpcErrorData::with_message(
            ErrorCode::InternalError,
            "Internal error: failed to serialise response",
        ),
    );
    serde_json::to_string(&error).unwrap_or_default()
}
