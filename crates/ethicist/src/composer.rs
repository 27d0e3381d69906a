//! Prompt composition, one function per tool.
//!
//! Each composer merges the caller's arguments with knowledge-base excerpts
//! and ends with the list of sections the answer must contain. Selector
//! keys the knowledge base does not know are skipped without comment.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::gateway::CompletionRequest;
use crate::knowledge::{
    self, Framework, AI_ETHICS_GUIDELINES, ESCALATED_CHECKLIST, GENERIC_DOMAIN_ADVICE,
    IMPLEMENTATION_CHECKLIST, RESPONSIBLE_AI_FRAMEWORKS, STAKEHOLDER_GUIDANCE,
};
use crate::registry::{
    ANALYZE_ETHICAL_SCENARIO, ASSESS_TRANSPARENCY, CHECK_BIAS, EVALUATE_AI_SYSTEM,
    GENERATE_ETHICAL_GUIDELINES,
};

/// Decodes defaulted arguments and builds the completion request for one tool.
pub type ToolHandler = fn(Map<String, Value>) -> Result<CompletionRequest, serde_json::Error>;

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioArgs {
    pub scenario: String,
    #[serde(default)]
    pub frameworks: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemEvaluationArgs {
    pub system_description: String,
    pub use_case: String,
    #[serde(default)]
    pub stakeholders: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BiasCheckArgs {
    pub context: String,
    #[serde(default)]
    pub bias_types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuidelineArgs {
    pub project_type: String,
    pub risk_level: String,
    #[serde(default)]
    pub regulations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransparencyArgs {
    pub system_type: String,
    pub explanation_method: String,
    #[serde(default)]
    pub stakeholder_needs: Vec<String>,
}

fn decode<T: DeserializeOwned>(arguments: Map<String, Value>) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(arguments))
}

fn scenario_handler(args: Map<String, Value>) -> Result<CompletionRequest, serde_json::Error> {
    decode::<ScenarioArgs>(args).map(|a| analyze_ethical_scenario(&a))
}

fn evaluation_handler(args: Map<String, Value>) -> Result<CompletionRequest, serde_json::Error> {
    decode::<SystemEvaluationArgs>(args).map(|a| evaluate_ai_system(&a))
}

fn bias_handler(args: Map<String, Value>) -> Result<CompletionRequest, serde_json::Error> {
    decode::<BiasCheckArgs>(args).map(|a| check_bias(&a))
}

fn guideline_handler(args: Map<String, Value>) -> Result<CompletionRequest, serde_json::Error> {
    decode::<GuidelineArgs>(args).map(|a| generate_ethical_guidelines(&a))
}

fn transparency_handler(args: Map<String, Value>) -> Result<CompletionRequest, serde_json::Error> {
    decode::<TransparencyArgs>(args).map(|a| assess_transparency(&a))
}

/// Handler for every tool, keyed by tool name.
pub fn handlers() -> Vec<(&'static str, ToolHandler)> {
    vec![
        (ANALYZE_ETHICAL_SCENARIO, scenario_handler as ToolHandler),
        (EVALUATE_AI_SYSTEM, evaluation_handler as ToolHandler),
        (CHECK_BIAS, bias_handler as ToolHandler),
        (GENERATE_ETHICAL_GUIDELINES, guideline_handler as ToolHandler),
        (ASSESS_TRANSPARENCY, transparency_handler as ToolHandler),
    ]
}

/// Ordered, de-duplicated lookups of the caller's selector keys.
fn select<T>(keys: &[String], lookup: impl Fn(&str) -> Option<&'static T>) -> Vec<&'static T> {
    let mut selected: Vec<&'static T> = Vec::new();
    for key in keys {
        if let Some(entry) = lookup(key.trim()) {
            if !selected.iter().any(|s| std::ptr::eq(*s, entry)) {
                selected.push(entry);
            }
        }
    }
    selected
}

fn framework_lines(lines: &mut Vec<String>, heading: &str, framework: &Framework) {
    lines.push(format!("{} {}", heading, framework.name));
    lines.push(framework.description.to_string());
    lines.push("Key principles:".to_string());
    lines.extend(framework.key_principles.iter().map(|p| format!("- {}", p)));
    lines.push(String::new());
}

fn list_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// Closing instruction naming the required answer sections.
fn sections(lines: &mut Vec<String>, sections: &[String]) {
    lines.push("Structure your response with exactly these Markdown sections, in this order:".to_string());
    lines.extend(sections.iter().map(|s| format!("- {}", s)));
}

pub fn analyze_ethical_scenario(args: &ScenarioArgs) -> CompletionRequest {
    let frameworks = select(&args.frameworks, knowledge::ethical_framework);

    let mut lines = vec![
        "Analyze the following ethical scenario.".to_string(),
        String::new(),
        "Scenario:".to_string(),
        args.scenario.clone(),
        String::new(),
    ];

    if frameworks.is_empty() {
        lines.push("No recognized framework was selected. Reason from general ethical principles.".to_string());
        lines.push(String::new());
    } else {
        lines.push("Apply each of these ethical frameworks:".to_string());
        lines.push(String::new());
        for framework in &frameworks {
            framework_lines(&mut lines, "###", framework);
        }
    }

    lines.push("For each framework, say what it recommends and why, citing its principles.".to_string());
    lines.push("Then weigh the frameworks against each other, naming where they agree and conflict.".to_string());
    lines.push(String::new());

    let mut required: Vec<String> = frameworks
        .iter()
        .map(|f| format!("## {} Analysis", f.name))
        .collect();
    required.extend(
        ["## Synthesis", "## Key Risks", "## Recommendations"]
            .iter()
            .map(|s| s.to_string()),
    );
    sections(&mut lines, &required);

    CompletionRequest {
        subject: format!("Ethical analysis of: {}", args.scenario),
        prompt: lines.join("\n"),
        temperature: 0.4,
    }
}

pub fn evaluate_ai_system(args: &SystemEvaluationArgs) -> CompletionRequest {
    let mut lines = vec![
        "Evaluate the following AI system against established AI ethics guidelines.".to_string(),
        String::new(),
        format!("System: {}", args.system_description),
        format!("Use case: {}", args.use_case),
        format!("Stakeholders: {}", list_or(&args.stakeholders, "Not specified; identify them")),
        String::new(),
        "Guidelines and assessment questions:".to_string(),
        String::new(),
    ];

    for guideline in AI_ETHICS_GUIDELINES {
        lines.push(format!("### {}", guideline.title));
        lines.push(guideline.explanation.to_string());
        lines.extend(guideline.questions.iter().map(|q| format!("- {}", q)));
        lines.push(String::new());
    }

    lines.push("Reference standards:".to_string());
    lines.push(String::new());
    for framework in RESPONSIBLE_AI_FRAMEWORKS {
        framework_lines(&mut lines, "###", framework);
    }

    lines.push("Rate the system against each guideline as Strong, Adequate, Weak, or Unknown, with a one-line justification.".to_string());
    lines.push(String::new());

    sections(
        &mut lines,
        &[
            "## Executive Summary".to_string(),
            "## Guideline Assessment".to_string(),
            "## Stakeholder Impact".to_string(),
            "## Risk Register".to_string(),
            "## Recommendations".to_string(),
        ],
    );

    CompletionRequest {
        subject: format!("AI system evaluation of: {}", args.system_description),
        prompt: lines.join("\n"),
        temperature: 0.3,
    }
}

pub fn check_bias(args: &BiasCheckArgs) -> CompletionRequest {
    let bias_types = select(&args.bias_types, knowledge::bias_type);

    let mut lines = vec![
        "Assess the following context for potential bias.".to_string(),
        String::new(),
        "Context:".to_string(),
        args.context.clone(),
        String::new(),
        "Bias types to check:".to_string(),
        String::new(),
    ];

    for bias in &bias_types {
        lines.push(format!("### {} Bias", bias.title));
        lines.push(bias.description.to_string());
        lines.push("Known mitigations:".to_string());
        lines.extend(bias.mitigations.iter().map(|m| format!("- {}", m)));
        lines.push(String::new());
    }

    lines.push("For each bias type, rate the likelihood (Low, Medium, High), point to what in the context suggests it, and give context-specific mitigations.".to_string());
    lines.push(String::new());

    let mut required = vec!["## Bias Risk Summary".to_string()];
    required.extend(bias_types.iter().map(|b| format!("### {} Bias", b.title)));
    required.push("## Detection Metrics".to_string());
    required.push("## Action Items".to_string());
    sections(&mut lines, &required);

    CompletionRequest {
        subject: format!("Bias assessment of: {}", args.context),
        prompt: lines.join("\n"),
        temperature: 0.3,
    }
}

pub fn generate_ethical_guidelines(args: &GuidelineArgs) -> CompletionRequest {
    let risk = args.risk_level.trim().to_lowercase();
    let escalated = matches!(risk.as_str(), "high" | "critical");

    let mut lines = vec![
        "Draft ethical guidelines for the following AI project.".to_string(),
        String::new(),
        format!("Project type: {}", args.project_type),
        format!("Risk level: {}", risk.to_uppercase()),
        format!("Applicable regulations: {}", list_or(&args.regulations, "None specified")),
        String::new(),
        "Core principles:".to_string(),
    ];

    lines.extend(
        AI_ETHICS_GUIDELINES
            .iter()
            .enumerate()
            .map(|(i, g)| format!("{}. {}: {}", i + 1, g.title, g.explanation)),
    );
    lines.push(String::new());

    match knowledge::domain_for(&args.project_type) {
        Some(domain) => {
            lines.push(format!("Known {} considerations:", domain.domain));
            lines.extend(domain.considerations.iter().map(|c| format!("- {}", c)));
        }
        None => {
            lines.push("No domain profile matches this project. Start from:".to_string());
            lines.extend(GENERIC_DOMAIN_ADVICE.iter().map(|c| format!("- {}", c)));
        }
    }
    lines.push(String::new());

    lines.push("Baseline implementation checklist:".to_string());
    lines.extend(IMPLEMENTATION_CHECKLIST.iter().map(|c| format!("- [ ] {}", c)));
    if escalated {
        lines.extend(ESCALATED_CHECKLIST.iter().map(|c| format!("- [ ] {}", c)));
        lines.push(String::new());
        lines.push("This is a high-risk project: the governance section must require independent audit, public reporting, and external advisory oversight.".to_string());
    }
    lines.push(String::new());

    if !args.regulations.is_empty() {
        lines.push("Map each guideline to the specific obligations of the listed regulations.".to_string());
        lines.push(String::new());
    }

    sections(
        &mut lines,
        &[
            "## Core Principles".to_string(),
            "## Domain-Specific Guidelines".to_string(),
            "## Regulatory Alignment".to_string(),
            "## Implementation Checklist".to_string(),
            "## Governance and Oversight".to_string(),
        ],
    );

    CompletionRequest {
        subject: format!("Ethical guidelines for: {}", args.project_type),
        prompt: lines.join("\n"),
        temperature: 0.5,
    }
}

pub fn assess_transparency(args: &TransparencyArgs) -> CompletionRequest {
    let mut lines = vec![
        "Assess the transparency and explainability of the following AI system.".to_string(),
        String::new(),
        format!("System type: {}", args.system_type),
        format!("Explanation method: {}", args.explanation_method),
        format!("Stakeholder groups: {}", list_or(&args.stakeholder_needs, "Not specified")),
        String::new(),
        "Transparency dimensions to cover:".to_string(),
        "- Input: what data is collected, how it is preprocessed, whether sources are disclosed".to_string(),
        "- Process: whether decisions can be explained, steps documented, architecture understood".to_string(),
        "- Output: confidence levels, justification of predictions, alternative outcomes".to_string(),
        "- Performance: disclosed accuracy metrics, stated limitations, documented failure modes".to_string(),
        String::new(),
    ];

    match knowledge::explainability_for(&args.system_type) {
        Some(family) => {
            lines.push(format!("Techniques suited to {} systems:", family.family));
            lines.extend(family.techniques.iter().map(|t| format!("- {}", t)));
        }
        None => {
            lines.push("No technique profile matches this system type; recommend model-agnostic methods.".to_string());
        }
    }
    lines.push(String::new());

    lines.push("Stakeholder needs:".to_string());
    if args.stakeholder_needs.is_empty() {
        lines.extend(
            STAKEHOLDER_GUIDANCE
                .iter()
                .map(|g| format!("- {}: {}", g.title, g.recommendation)),
        );
    } else {
        for stakeholder in &args.stakeholder_needs {
            if let Some(guidance) = knowledge::guidance_for(stakeholder) {
                lines.push(format!("- {}: {}", stakeholder, guidance.recommendation));
            }
        }
    }
    lines.push(String::new());

    lines.push("Score overall transparency from 1 (opaque) to 5 (fully transparent) and justify the score.".to_string());
    lines.push(String::new());

    sections(
        &mut lines,
        &[
            "## Transparency Dimensions".to_string(),
            "## Explainability Techniques".to_string(),
            "## Stakeholder-Specific Recommendations".to_string(),
            "## Transparency Score".to_string(),
            "## Action Items".to_string(),
        ],
    );

    CompletionRequest {
        subject: format!("Transparency assessment of: {}", args.system_type),
        prompt: lines.join("\n"),
        temperature: 0.3,
    }
}
