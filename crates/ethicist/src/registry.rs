//! Declared tools, resources, and prompts.
//!
//! Definitions are fixed at compile time (resources are derived from the
//! knowledge base) and listing them has no side effects.

use baton::{Prompt, Resource, Tool, ToolAnnotations, ToolSchema};
use serde_json::{json, Value};

use crate::knowledge::{ETHICAL_FRAMEWORKS, RESPONSIBLE_AI_FRAMEWORKS};

pub const ANALYZE_ETHICAL_SCENARIO: &str = "analyze_ethical_scenario";
pub const EVALUATE_AI_SYSTEM: &str = "evaluate_ai_system";
pub const CHECK_BIAS: &str = "check_bias";
pub const GENERATE_ETHICAL_GUIDELINES: &str = "generate_ethical_guidelines";
pub const ASSESS_TRANSPARENCY: &str = "assess_transparency";

pub const FRAMEWORKS_ALL_URI: &str = "ethicist://frameworks/all";
pub const GUIDELINES_URI: &str = "ethicist://guidelines/ai-ethics";
pub const FRAMEWORK_URI_PREFIX: &str = "ethicist://frameworks/";

const JSON_MIME: &str = "application/json";

const FRAMEWORK_KEYS: &[&str] = &["utilitarian", "deontological", "virtue", "care"];
const BIAS_KEYS: &[&str] = &[
    "selection",
    "confirmation",
    "algorithmic",
    "representation",
    "measurement",
];
const RISK_LEVELS: &[&str] = &["low", "medium", "high", "critical"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Text,
    TextList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    Text(&'static str),
    TextList(&'static [&'static str]),
}

impl ParamDefault {
    pub fn to_value(self) -> Value {
        match self {
            ParamDefault::Text(text) => json!(text),
            ParamDefault::TextList(items) => json!(items),
        }
    }
}

/// One named input of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub required: bool,
    pub allowed: Option<&'static [&'static str]>,
    pub default: Option<ParamDefault>,
}

impl ParamSpec {
    const fn required_text(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Text,
            description,
            required: true,
            allowed: None,
            default: None,
        }
    }

    const fn list(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::TextList,
            description,
            required: false,
            allowed: None,
            default: Some(ParamDefault::TextList(&[])),
        }
    }

    /// JSON Schema fragment for this parameter.
    pub fn schema(&self) -> Value {
        let mut schema = match (self.kind, self.allowed) {
            (ParamKind::Text, None) => json!({"type": "string"}),
            (ParamKind::Text, Some(allowed)) => json!({"type": "string", "enum": allowed}),
            (ParamKind::TextList, None) => json!({"type": "array", "items": {"type": "string"}}),
            (ParamKind::TextList, Some(allowed)) => {
                json!({"type": "array", "items": {"type": "string", "enum": allowed}})
            }
        };

        schema["description"] = json!(self.description);
        if let Some(default) = self.default {
            schema["default"] = default.to_value();
        }
        schema
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolDefinition {
    pub fn input_schema(&self) -> ToolSchema {
        self.params.iter().fold(ToolSchema::empty(), |schema, param| {
            let schema = schema.property(param.name, param.schema());
            if param.required {
                schema.require(param.name)
            } else {
                schema
            }
        })
    }

    pub fn to_tool(&self) -> Tool {
        Tool::new(self.name, self.description)
            .with_input_schema(self.input_schema())
            .with_annotations(
                ToolAnnotations::default()
                    .with_read_only(true)
                    .with_open_world(true),
            )
    }

    pub fn required_params(&self) -> impl Iterator<Item = &'static ParamSpec> {
        self.params.iter().filter(|p| p.required)
    }
}

pub static TOOLS: &[ToolDefinition] = &[
    ToolDefinition {
        name: ANALYZE_ETHICAL_SCENARIO,
        description: "Analyze an ethical scenario using multiple ethical frameworks and provide comprehensive guidance",
        params: &[
            ParamSpec::required_text("scenario", "The ethical scenario or dilemma to analyze"),
            ParamSpec {
                name: "frameworks",
                kind: ParamKind::TextList,
                description: "Ethical frameworks to apply (default: all)",
                required: false,
                allowed: Some(FRAMEWORK_KEYS),
                default: Some(ParamDefault::TextList(FRAMEWORK_KEYS)),
            },
        ],
    },
    ToolDefinition {
        name: EVALUATE_AI_SYSTEM,
        description: "Evaluate an AI system against ethical guidelines and principles",
        params: &[
            ParamSpec::required_text("system_description", "Description of the AI system to evaluate"),
            ParamSpec::required_text("use_case", "The intended use case or application domain"),
            ParamSpec::list("stakeholders", "List of stakeholder groups affected by the system"),
        ],
    },
    ToolDefinition {
        name: CHECK_BIAS,
        description: "Check for potential biases in AI system design, data, or decision-making",
        params: &[
            ParamSpec::required_text("context", "Context or description of where bias might occur"),
            ParamSpec {
                name: "bias_types",
                kind: ParamKind::TextList,
                description: "Types of bias to check for (default: all)",
                required: false,
                allowed: Some(BIAS_KEYS),
                default: Some(ParamDefault::TextList(BIAS_KEYS)),
            },
        ],
    },
    ToolDefinition {
        name: GENERATE_ETHICAL_GUIDELINES,
        description: "Generate customized ethical guidelines for a specific AI project or use case",
        params: &[
            ParamSpec::required_text(
                "project_type",
                "Type of AI project (e.g., healthcare, finance, education)",
            ),
            ParamSpec {
                name: "risk_level",
                kind: ParamKind::Text,
                description: "Risk level of the project",
                required: false,
                allowed: Some(RISK_LEVELS),
                default: Some(ParamDefault::Text("medium")),
            },
            ParamSpec::list(
                "regulations",
                "Applicable regulations or standards (e.g., GDPR, HIPAA)",
            ),
        ],
    },
    ToolDefinition {
        name: ASSESS_TRANSPARENCY,
        description: "Assess the transparency and explainability of an AI system",
        params: &[
            ParamSpec::required_text(
                "system_type",
                "Type of AI system (e.g., neural network, decision tree, LLM)",
            ),
            ParamSpec {
                name: "explanation_method",
                kind: ParamKind::Text,
                description: "Method used for explaining decisions (if any)",
                required: false,
                allowed: None,
                default: Some(ParamDefault::Text("None specified")),
            },
            ParamSpec::list(
                "stakeholder_needs",
                "Different stakeholder groups needing explanations",
            ),
        ],
    },
];

pub fn tool_definition(name: &str) -> Option<&'static ToolDefinition> {
    TOOLS.iter().find(|t| t.name == name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDefinition {
    pub uri: String,
    pub name: &'static str,
    pub description: String,
    pub mime_type: &'static str,
}

impl ResourceDefinition {
    pub fn to_resource(&self) -> Resource {
        Resource::new(&self.uri, self.name)
            .with_description(&self.description)
            .with_mime_type(self.mime_type)
    }
}

/// The two aggregate resources, then one per framework in both maps.
pub fn resource_definitions() -> Vec<ResourceDefinition> {
    let aggregates = [
        ResourceDefinition {
            uri: FRAMEWORKS_ALL_URI.to_string(),
            name: "Ethical Frameworks",
            description: "Complete database of major ethical frameworks and their principles".to_string(),
            mime_type: JSON_MIME,
        },
        ResourceDefinition {
            uri: GUIDELINES_URI.to_string(),
            name: "AI Ethics Guidelines",
            description: "Comprehensive AI ethics guidelines and principles".to_string(),
            mime_type: JSON_MIME,
        },
    ];

    let frameworks = ETHICAL_FRAMEWORKS
        .iter()
        .chain(RESPONSIBLE_AI_FRAMEWORKS)
        .map(|f| ResourceDefinition {
            uri: format!("{}{}", FRAMEWORK_URI_PREFIX, f.key),
            name: f.name,
            description: format!("{} framework details", f.name),
            mime_type: JSON_MIME,
        });

    aggregates.into_iter().chain(frameworks).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptArgSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: &'static [PromptArgSpec],
}

impl PromptDefinition {
    pub fn to_prompt(&self) -> Prompt {
        self.arguments.iter().fold(
            Prompt::new(self.name).with_description(self.description),
            |prompt, arg| prompt.argument(arg.name, arg.description, arg.required),
        )
    }
}

pub const ETHICAL_DECISION_MAKING: &str = "ethical_decision_making";
pub const STAKEHOLDER_ANALYSIS: &str = "stakeholder_analysis";
pub const AI_RISK_ASSESSMENT: &str = "ai_risk_assessment";

pub static PROMPTS: &[PromptDefinition] = &[
    PromptDefinition {
        name: ETHICAL_DECISION_MAKING,
        description: "Guide users through a structured ethical decision-making process",
        arguments: &[PromptArgSpec {
            name: "situation",
            description: "The ethical situation or decision to be made",
            required: true,
        }],
    },
    PromptDefinition {
        name: STAKEHOLDER_ANALYSIS,
        description: "Help analyze and consider all stakeholders affected by a decision",
        arguments: &[PromptArgSpec {
            name: "decision",
            description: "The decision or action being considered",
            required: true,
        }],
    },
    PromptDefinition {
        name: AI_RISK_ASSESSMENT,
        description: "Assess potential ethical risks of an AI system",
        arguments: &[
            PromptArgSpec {
                name: "system_description",
                description: "Description of the AI system",
                required: true,
            },
            PromptArgSpec {
                name: "deployment_context",
                description: "Where and how the system will be deployed",
                required: false,
            },
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tool_names_are_unique() {
        let names: HashSet<_> = TOOLS.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), TOOLS.len());
    }

    #[test]
    fn enumerated_list_schema_puts_enum_under_items() {
        let schema = tool_definition(CHECK_BIAS).unwrap().input_schema();
        let bias = &schema.properties["bias_types"];
        assert_eq!(bias["type"], json!("array"));
        assert_eq!(bias["items"]["enum"].as_array().unwrap().len(), 5);
        assert_eq!(bias["default"], json!(BIAS_KEYS));
        assert_eq!(schema.required, vec!["context".to_string()]);
    }

    #[test]
    fn evaluate_requires_two_fields() {
        let schema = tool_definition(EVALUATE_AI_SYSTEM).unwrap().input_schema();
        assert_eq!(schema.required, vec!["system_description", "use_case"]);
    }

    #[test]
    fn risk_level_defaults_to_medium() {
        let schema = tool_definition(GENERATE_ETHICAL_GUIDELINES).unwrap().input_schema();
        assert_eq!(schema.properties["risk_level"]["default"], json!("medium"));
        assert_eq!(schema.properties["risk_level"]["enum"], json!(RISK_LEVELS));
    }

    #[test]
    fn resource_uris_are_unique_and_start_with_aggregates() {
        let resources = resource_definitions();
        assert_eq!(resources[0].uri, FRAMEWORKS_ALL_URI);
        assert_eq!(resources[1].uri, GUIDELINES_URI);

        let uris: HashSet<_> = resources.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris.len(), resources.len());
        assert!(resources.iter().all(|r| r.mime_type == "application/json"));
    }

    #[test]
    fn framework_selector_enum_matches_knowledge_base() {
        let keys: Vec<_> = ETHICAL_FRAMEWORKS.iter().map(|f| f.key).collect();
        assert_eq!(keys, FRAMEWORK_KEYS);
    }
}
