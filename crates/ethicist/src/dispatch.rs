//! Tool dispatch: validation, defaults, composition, completion.
//!
//! Nothing on this path returns an error. Unknown tools, missing arguments
//! and upstream failures all come back as text the caller can read.

use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::composer::{self, ToolHandler};
use crate::gateway::{Completion, CompletionGateway};
use crate::registry::{ToolDefinition, TOOLS};

/// The handler table does not line up with the declared tools.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' is declared but has no handler")]
    MissingHandler(&'static str),

    #[error("handler registered for undeclared tool '{0}'")]
    UndeclaredHandler(&'static str),

    #[error("tool '{0}' has more than one handler")]
    DuplicateHandler(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Completed(Completion),
    MissingArgument { tool: &'static str, argument: &'static str },
    InvalidArguments { tool: &'static str, reason: String },
    UnknownTool(String),
}

impl ToolOutcome {
    pub fn into_text(self) -> String {
        match self {
            ToolOutcome::Completed(completion) => completion.text,
            ToolOutcome::MissingArgument { tool, argument } => format!(
                "Warning: missing required argument '{}' for {}. Provide '{}' and try again.",
                argument, tool, argument
            ),
            ToolOutcome::InvalidArguments { tool, reason } => {
                format!("Warning: invalid arguments for {}: {}", tool, reason)
            }
            ToolOutcome::UnknownTool(name) => format!("Unknown tool: {}", name),
        }
    }
}

pub struct Dispatcher {
    definitions: &'static [ToolDefinition],
    handlers: HashMap<&'static str, ToolHandler>,
    gateway: CompletionGateway,
}

impl Dispatcher {
    /// Dispatcher over the built-in tools.
    pub fn new(gateway: CompletionGateway) -> Result<Self, RegistryError> {
        Self::build(TOOLS, composer::handlers(), gateway)
    }

    /// Pair definitions with handlers, requiring exactly one handler per tool.
    pub fn build(
        definitions: &'static [ToolDefinition],
        handlers: Vec<(&'static str, ToolHandler)>,
        gateway: CompletionGateway,
    ) -> Result<Self, RegistryError> {
        let mut table = HashMap::with_capacity(handlers.len());
        for (name, handler) in handlers {
            if !definitions.iter().any(|d| d.name == name) {
                return Err(RegistryError::UndeclaredHandler(name));
            }
            if table.insert(name, handler).is_some() {
                return Err(RegistryError::DuplicateHandler(name));
            }
        }

        if let Some(missing) = definitions.iter().find(|d| !table.contains_key(d.name)) {
            return Err(RegistryError::MissingHandler(missing.name));
        }

        Ok(Self {
            definitions,
            handlers: table,
            gateway,
        })
    }

    pub fn definitions(&self) -> &'static [ToolDefinition] {
        self.definitions
    }

    pub fn accepts(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn gateway(&self) -> &CompletionGateway {
        &self.gateway
    }

    pub async fn call(&self, name: &str, mut arguments: Map<String, Value>) -> ToolOutcome {
        let Some((definition, handler)) = self
            .definitions
            .iter()
            .find(|d| d.name == name)
            .and_then(|d| self.handlers.get(d.name).map(|h| (d, h)))
        else {
            warn!(tool = %name, "unknown tool requested");
            return ToolOutcome::UnknownTool(name.to_string());
        };

        if let Some(param) = definition
            .required_params()
            .find(|p| is_blank(arguments.get(p.name)))
        {
            warn!(tool = %definition.name, argument = %param.name, "missing required argument");
            return ToolOutcome::MissingArgument {
                tool: definition.name,
                argument: param.name,
            };
        }

        apply_defaults(definition, &mut arguments);

        let request = match handler(arguments) {
            Ok(request) => request,
            Err(e) => {
                warn!(tool = %definition.name, error = %e, "arguments did not match input schema");
                return ToolOutcome::InvalidArguments {
                    tool: definition.name,
                    reason: e.to_string(),
                };
            }
        };

        info!(tool = %definition.name, subject = %request.subject, "running analysis");
        let completion = self.gateway.complete(&request).await;
        info!(tool = %definition.name, outcome = ?completion.outcome, chars = completion.text.len(), "analysis finished");

        ToolOutcome::Completed(completion)
    }
}

/// Absent, null, blank text, and empty lists all count as not provided.
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

fn apply_defaults(definition: &ToolDefinition, arguments: &mut Map<String, Value>) {
    for param in definition.params {
        let Some(default) = param.default else {
            continue;
        };
        if matches!(arguments.get(param.name), None | Some(Value::Null)) {
            arguments.insert(param.name.to_string(), default.to_value());
        }
    }
}
