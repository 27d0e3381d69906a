//! The ethicist service: six entry points over the dispatcher, resolver and
//! prompt templates.
//!
//! Tool calls always produce text. Resource reads and prompt lookups fail
//! hard on unknown names; the MCP handler turns those failures into
//! JSON-RPC errors.

use baton::{Prompt, Resource, Tool};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::config::LlmConfig;
use crate::dispatch::{Dispatcher, RegistryError, ToolOutcome};
use crate::gateway::{CompletionGateway, GatewaySettings};
use crate::prompts::{self, PromptError, RenderedPrompt};
use crate::registry::{resource_definitions, PROMPTS};
use crate::resources::{self, ResourceError};

pub struct Ethicist {
    dispatcher: Dispatcher,
}

impl Ethicist {
    pub fn new(gateway: CompletionGateway) -> Result<Self, RegistryError> {
        Ok(Self {
            dispatcher: Dispatcher::new(gateway)?,
        })
    }

    /// Service whose gateway reads its credential from the environment on
    /// first tool call.
    pub fn from_config(config: &LlmConfig) -> Result<Self, RegistryError> {
        Self::new(CompletionGateway::new(GatewaySettings::from_config(config)))
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn list_tools(&self) -> Vec<Tool> {
        self.dispatcher
            .definitions()
            .iter()
            .map(|definition| definition.to_tool())
            .collect()
    }

    pub async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> ToolOutcome {
        self.dispatcher.call(name, arguments).await
    }

    pub async fn list_resources(&self) -> Vec<Resource> {
        resource_definitions()
            .iter()
            .map(|definition| definition.to_resource())
            .collect()
    }

    pub async fn read_resource(&self, uri: &str) -> Result<String, ResourceError> {
        resources::read(uri)
    }

    pub async fn list_prompts(&self) -> Vec<Prompt> {
        PROMPTS.iter().map(|definition| definition.to_prompt()).collect()
    }

    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<&HashMap<String, String>>,
    ) -> Result<RenderedPrompt, PromptError> {
        prompts::render(name, arguments)
    }
}
