//! Initialize handshake and capability negotiation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol revision this crate speaks.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Name and version of a client or server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Implementation {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Implementation {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Parameters of `initialize`.
///
/// Every field is optional here; clients differ in what they send and the
/// server only logs it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub capabilities: Option<Value>,
    #[serde(default)]
    pub client_info: Option<Implementation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl InitializeResult {
    pub fn new(server_info: Implementation, capabilities: ServerCapabilities) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities,
            server_info,
            instructions: None,
        }
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// Capabilities advertised by the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ListChanged>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ListChanged>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<ListChanged>,
}

/// Capability body; this server's lists never change at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListChanged {
    pub list_changed: bool,
}

impl ServerCapabilities {
    pub fn enable_tools(mut self) -> Self {
        self.tools = Some(ListChanged::default());
        self
    }

    pub fn enable_resources(mut self) -> Self {
        self.resources = Some(ListChanged::default());
        self
    }

    pub fn enable_prompts(mut self) -> Self {
        self.prompts = Some(ListChanged::default());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initialize_result_shape() {
        let result = InitializeResult::new(
            Implementation::new("demo", "0.1.0"),
            ServerCapabilities::default().enable_tools(),
        )
        .with_instructions("be nice");

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["protocolVersion"], json!(PROTOCOL_VERSION));
        assert_eq!(value["serverInfo"]["name"], json!("demo"));
        assert_eq!(value["capabilities"]["tools"], json!({"listChanged": false}));
        assert!(value["capabilities"].get("prompts").is_none());
        assert_eq!(value["instructions"], json!("be nice"));
    }

    #[test]
    fn initialize_params_tolerate_sparse_clients() {
        let params: InitializeParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.client_info.is_none());
    }
}
