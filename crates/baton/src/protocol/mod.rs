//! MCP Protocol Dispatch
//!
//! Routes JSON-RPC methods to a [`Handler`].
//!
//! Spans follow the OpenTelemetry JSON-RPC semantic conventions.
//! See: https://opentelemetry.io/docs/specs/semconv/rpc/json-rpc/

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::Instrument;

use crate::types::error::ErrorData;
use crate::types::jsonrpc::{JsonRpcMessage, JsonRpcReply};
use crate::types::prompt::{GetPromptParams, GetPromptResult, ListPromptsResult, Prompt};
use crate::types::protocol::{
    Implementation, InitializeParams, InitializeResult, ServerCapabilities,
};
use crate::types::resource::{
    ListResourcesResult, ReadResourceParams, ReadResourceResult, Resource,
};
use crate::types::tool::{CallToolParams, CallToolResult, ListToolsResult, Tool};

/// Handler trait for MCP server implementations.
///
/// Implement this to expose tools, resources, and prompts. Only tools are
/// required; resources and prompts default to empty.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Name and version reported from `initialize`.
    fn server_info(&self) -> Implementation;

    /// Free-form usage notes for the client.
    fn instructions(&self) -> Option<String> {
        None
    }

    async fn list_tools(&self) -> Vec<Tool>;

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<CallToolResult, ErrorData>;

    async fn list_resources(&self) -> Vec<Resource> {
        Vec::new()
    }

    async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ErrorData> {
        Err(ErrorData::resource_not_found(format!(
            "Resource not found: {}",
            uri
        )))
    }

    async fn list_prompts(&self) -> Vec<Prompt> {
        Vec::new()
    }

    async fn get_prompt(
        &self,
        name: &str,
        _arguments: Option<HashMap<String, String>>,
    ) -> Result<GetPromptResult, ErrorData> {
        Err(ErrorData::prompt_not_found(format!(
            "Prompt not found: {}",
            name
        )))
    }

    /// Capabilities advertised from `initialize`.
    async fn capabilities(&self) -> ServerCapabilities {
        let mut caps = ServerCapabilities::default().enable_tools();

        if !self.list_resources().await.is_empty() {
            caps = caps.enable_resources();
        }

        if !self.list_prompts().await.is_empty() {
            caps = caps.enable_prompts();
        }

        caps
    }
}

/// Handle one incoming message and produce the reply, if any.
///
/// Notifications never produce a reply, even when dispatch fails.
pub async fn handle_message<H: Handler>(handler: &H, message: &JsonRpcMessage) -> Option<JsonRpcReply> {
    let result = dispatch(handler, message).await;

    if message.is_notification() {
        if let Err(error) = result {
            tracing::debug!(method = %message.method, %error, "notification dispatch failed");
        }
        return None;
    }

    Some(JsonRpcReply::from_result(message.id.clone(), result))
}

/// Parse raw JSON text into a message, or the error reply to send back.
pub fn parse_message(raw: &str) -> Result<JsonRpcMessage, JsonRpcReply> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| JsonRpcReply::failure(None, ErrorData::parse_error(format!("Parse error: {}", e))))?;

    parse_value(value)
}

/// Interpret an already-decoded JSON value as a message.
pub fn parse_value(value: Value) -> Result<JsonRpcMessage, JsonRpcReply> {
    let id = value
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value(id).ok());

    serde_json::from_value(value).map_err(|e| {
        JsonRpcReply::failure(
            id,
            ErrorData::invalid_request(format!("Invalid JSON-RPC message: {}", e)),
        )
    })
}

/// Dispatch a JSON-RPC message to the appropriate handler method.
///
/// Span fields:
/// - `rpc.system` = "jsonrpc"
/// - `rpc.method` = the JSON-RPC method name
/// - `rpc.jsonrpc.request_id` = the request id, if any
pub async fn dispatch<H: Handler>(handler: &H, message: &JsonRpcMessage) -> Result<Value, ErrorData> {
    let request_id = message
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();

    let span = tracing::info_span!(
        "mcp.dispatch",
        rpc.system = "jsonrpc",
        rpc.method = %message.method,
        rpc.jsonrpc.version = "2.0",
        rpc.jsonrpc.request_id = %request_id,
        error.type = tracing::field::Empty,
        rpc.jsonrpc.error_code = tracing::field::Empty,
        rpc.jsonrpc.error_message = tracing::field::Empty,
    );

    async {
        let result = dispatch_inner(handler, message).await;

        if let Err(ref error) = result {
            let span = tracing::Span::current();
            span.record("error.type", error.kind());
            span.record("rpc.jsonrpc.error_code", error.code);
            span.record("rpc.jsonrpc.error_message", error.message.as_str());
        }

        result
    }
    .instrument(span)
    .await
}

async fn dispatch_inner<H: Handler>(handler: &H, message: &JsonRpcMessage) -> Result<Value, ErrorData> {
    match message.method.as_str() {
        // Lifecycle
        "initialize" => handle_initialize(handler, message).await,
        "notifications/initialized" | "notifications/cancelled" => Ok(Value::Null),
        "ping" => Ok(serde_json::json!({})),

        // Tools
        "tools/list" => to_result(&ListToolsResult::all(handler.list_tools().await)),
        "tools/call" => handle_call_tool(handler, message).await,

        // Resources
        "resources/list" => to_result(&ListResourcesResult::all(handler.list_resources().await)),
        "resources/read" => handle_read_resource(handler, message).await,

        // Prompts
        "prompts/list" => to_result(&ListPromptsResult::all(handler.list_prompts().await)),
        "prompts/get" => handle_get_prompt(handler, message).await,

        _ => Err(ErrorData::method_not_found(&message.method)),
    }
}

fn params<T: DeserializeOwned>(message: &JsonRpcMessage, what: &str) -> Result<T, ErrorData> {
    let params = message
        .params
        .clone()
        .ok_or_else(|| ErrorData::invalid_params(format!("Missing {} params", what)))?;

    serde_json::from_value(params)
        .map_err(|e| ErrorData::invalid_params(format!("Invalid {} params: {}", what, e)))
}

fn to_result<T: Serialize>(result: &T) -> Result<Value, ErrorData> {
    serde_json::to_value(result)
        .map_err(|e| ErrorData::internal_error(format!("Failed to serialize result: {}", e)))
}

async fn handle_initialize<H: Handler>(handler: &H, message: &JsonRpcMessage) -> Result<Value, ErrorData> {
    let params: InitializeParams = match message.params {
        Some(_) => params(message, "initialize")?,
        None => InitializeParams::default(),
    };

    if let Some(client) = &params.client_info {
        tracing::info!(
            client.name = %client.name,
            client.version = %client.version,
            protocol_version = ?params.protocol_version,
            "MCP client initializing"
        );
    }

    let mut result = InitializeResult::new(handler.server_info(), handler.capabilities().await);
    if let Some(instructions) = handler.instructions() {
        result = result.with_instructions(instructions);
    }

    to_result(&result)
}

async fn handle_call_tool<H: Handler>(handler: &H, message: &JsonRpcMessage) -> Result<Value, ErrorData> {
    let params: CallToolParams = params(message, "call")?;
    let arguments = params.arguments.unwrap_or_default();

    let tool_span = tracing::info_span!("mcp.tool.call", mcp.tool.name = %params.name);

    async {
        let result = handler.call_tool(&params.name, arguments).await?;
        to_result(&result)
    }
    .instrument(tool_span)
    .await
}

async fn handle_read_resource<H: Handler>(handler: &H, message: &JsonRpcMessage) -> Result<Value, ErrorData> {
    let params: ReadResourceParams = params(message, "read")?;

    let resource_span = tracing::info_span!("mcp.resource.read", mcp.resource.uri = %params.uri);

    async {
        let result = handler.read_resource(&params.uri).await?;
        to_result(&result)
    }
    .instrument(resource_span)
    .await
}

async fn handle_get_prompt<H: Handler>(handler: &H, message: &JsonRpcMessage) -> Result<Value, ErrorData> {
    let params: GetPromptParams = params(message, "get")?;

    let prompt_span = tracing::info_span!("mcp.prompt.get", mcp.prompt.name = %params.name);

    async {
        let result = handler.get_prompt(&params.name, params.arguments).await?;
        to_result(&result)
    }
    .instrument(prompt_span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::content::Content;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl Handler for Echo {
        fn server_info(&self) -> Implementation {
            Implementation::new("echo", "0.0.1")
        }

        async fn list_tools(&self) -> Vec<Tool> {
            vec![Tool::new("echo", "Echo the text argument")]
        }

        async fn call_tool(
            &self,
            name: &str,
            arguments: Map<String, Value>,
        ) -> Result<CallToolResult, ErrorData> {
            match name {
                "echo" => {
                    let text = arguments
                        .get("text")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    Ok(CallToolResult::success(vec![Content::text(text)]))
                }
                other => Err(ErrorData::invalid_params(format!("no tool {}", other))),
            }
        }
    }

    fn request(method: &str, params: Value) -> JsonRpcMessage {
        JsonRpcMessage::request(1, method, params)
    }

    #[tokio::test]
    async fn initialize_reports_server_info_and_tools_only() {
        let result = dispatch(&Echo, &request("initialize", json!({}))).await.unwrap();

        assert_eq!(result["serverInfo"]["name"], json!("echo"));
        assert!(result["capabilities"].get("tools").is_some());
        assert!(result["capabilities"].get("resources").is_none());
    }

    #[tokio::test]
    async fn initialize_without_params_is_accepted() {
        let message = JsonRpcMessage {
            params: None,
            ..request("initialize", Value::Null)
        };
        assert!(dispatch(&Echo, &message).await.is_ok());
    }

    #[tokio::test]
    async fn call_tool_routes_arguments() {
        let result = dispatch(
            &Echo,
            &request("tools/call", json!({"name": "echo", "arguments": {"text": "hey"}})),
        )
        .await
        .unwrap();

        assert_eq!(result["content"][0]["text"], json!("hey"));
    }

    #[tokio::test]
    async fn missing_call_params_are_invalid() {
        let message = JsonRpcMessage {
            params: None,
            ..request("tools/call", Value::Null)
        };
        let err = dispatch(&Echo, &message).await.unwrap_err();
        assert_eq!(err.code, ErrorData::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn default_resource_read_is_an_error() {
        let err = dispatch(&Echo, &request("resources/read", json!({"uri": "x://y"})))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorData::INVALID_PARAMS);
        assert!(err.message.contains("x://y"));
    }

    #[tokio::test]
    async fn unknown_method() {
        let err = dispatch(&Echo, &request("bogus", json!({}))).await.unwrap_err();
        assert_eq!(err.code, ErrorData::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn notifications_get_no_reply() {
        let note = JsonRpcMessage::notification("notifications/initialized");
        assert!(handle_message(&Echo, &note).await.is_none());
    }

    #[test]
    fn garbage_input_is_a_parse_error() {
        let reply = parse_message("{not json").unwrap_err();
        assert_eq!(reply.error.unwrap().code, ErrorData::PARSE_ERROR);
        assert!(reply.id.is_none());
    }

    #[test]
    fn missing_method_keeps_request_id() {
        let reply = parse_message(r#"{"jsonrpc":"2.0","id":7}"#).unwrap_err();
        assert_eq!(reply.id, Some(7.into()));
        assert_eq!(reply.error.unwrap().code, ErrorData::INVALID_REQUEST);
    }
}
