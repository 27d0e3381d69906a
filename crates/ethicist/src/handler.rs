//! MCP handler over the ethicist service.

use async_trait::async_trait;
use baton::{
    CallToolResult, ErrorData, GetPromptResult, Handler, Implementation, Prompt, PromptMessage,
    ReadResourceResult, Resource, ResourceContents, Tool,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::resources::ResourceError;
use crate::service::Ethicist;

const INSTRUCTIONS: &str = "Ethical analysis for AI systems and decisions. \
Tools run an LLM-backed analysis and always answer with text, including a \
warning when a required argument is missing. Resources expose the framework \
and guideline knowledge base as JSON. Prompts return structured templates \
for decision-making, stakeholder analysis and AI risk assessment.";

#[async_trait]
impl Handler for Ethicist {
    fn server_info(&self) -> Implementation {
        Implementation::new("ethicist", env!("CARGO_PKG_VERSION")).with_title("Ethicist")
    }

    fn instructions(&self) -> Option<String> {
        Some(INSTRUCTIONS.to_string())
    }

    async fn list_tools(&self) -> Vec<Tool> {
        Ethicist::list_tools(self).await
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<CallToolResult, ErrorData> {
        let outcome = Ethicist::call_tool(self, name, arguments).await;
        Ok(CallToolResult::text(outcome.into_text()))
    }

    async fn list_resources(&self) -> Vec<Resource> {
        Ethicist::list_resources(self).await
    }

    async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ErrorData> {
        let json = Ethicist::read_resource(self, uri)
            .await
            .map_err(|e| match e {
                ResourceError::Serialize { .. } => ErrorData::internal_error(e.to_string()),
                _ => ErrorData::resource_not_found(e.to_string()).with_data(json!({ "uri": uri })),
            })?;

        Ok(ReadResourceResult::single(ResourceContents::text_with_mime(
            uri,
            json,
            "application/json",
        )))
    }

    async fn list_prompts(&self) -> Vec<Prompt> {
        Ethicist::list_prompts(self).await
    }

    async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> Result<GetPromptResult, ErrorData> {
        let rendered = Ethicist::get_prompt(self, name, arguments.as_ref())
            .await
            .map_err(|e| ErrorData::prompt_not_found(e.to_string()).with_data(json!({ "name": name })))?;

        Ok(GetPromptResult::new(vec![PromptMessage::user_text(rendered.text)])
            .with_description(rendered.description))
    }
}
