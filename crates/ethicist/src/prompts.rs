//! Prompt templates returned verbatim to the caller.

use std::collections::HashMap;
use tracing::debug;

use crate::registry::{AI_RISK_ASSESSMENT, ETHICAL_DECISION_MAKING, STAKEHOLDER_ANALYSIS};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),
}

/// A filled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub description: &'static str,
    pub text: String,
}

/// Argument value, or `placeholder` when absent or blank.
fn arg<'a>(arguments: Option<&'a HashMap<String, String>>, name: &str, placeholder: &'a str) -> &'a str {
    arguments
        .and_then(|args| args.get(name))
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(placeholder)
}

pub fn render(name: &str, arguments: Option<&HashMap<String, String>>) -> Result<RenderedPrompt, PromptError> {
    debug!(%name, ?arguments, "rendering prompt");

    match name {
        ETHICAL_DECISION_MAKING => Ok(RenderedPrompt {
            description: "Structured ethical decision-making process",
            text: ethical_decision_making(arg(arguments, "situation", "a difficult choice")),
        }),
        STAKEHOLDER_ANALYSIS => Ok(RenderedPrompt {
            description: "Comprehensive stakeholder analysis",
            text: stakeholder_analysis(arg(arguments, "decision", "this decision")),
        }),
        AI_RISK_ASSESSMENT => Ok(RenderedPrompt {
            description: "AI ethical risk assessment",
            text: ai_risk_assessment(
                arg(arguments, "system_description", "an AI system"),
                arg(arguments, "deployment_context", "various contexts"),
            ),
        }),
        _ => Err(PromptError::UnknownPrompt(name.to_string())),
    }
}

fn ethical_decision_making(situation: &str) -> String {
    format!(
        "I need help thinking through an ethical decision: {situation}

Please help me analyze this using a structured approach:

1. **Clarify the Situation**
   - What are the key facts?
   - What is the core ethical question?
   - What is at stake?

2. **Identify Stakeholders**
   - Who will be affected by this decision?
   - What are their interests and concerns?
   - Who has power and who is vulnerable?

3. **Consider Multiple Perspectives**
   - Utilitarian: What produces the greatest good?
   - Deontological: What are my duties and obligations?
   - Virtue Ethics: What would a person of good character do?
   - Care Ethics: How can I maintain relationships and care for those affected?

4. **Evaluate Options**
   - What are the possible courses of action?
   - What are the likely consequences of each?
   - Which aligns best with ethical principles?

5. **Make a Decision**
   - What is the most ethical choice?
   - How will I implement it?
   - How will I monitor the outcome?

Please guide me through this process."
    )
}

fn stakeholder_analysis(decision: &str) -> String {
    format!(
        "I need to analyze stakeholders for: {decision}

Help me identify and analyze all stakeholders:

1. **Direct Stakeholders** (immediately affected)
   - Who benefits directly from this decision?
   - Who might be harmed directly?
   - What are their rights and interests?

2. **Indirect Stakeholders** (secondarily affected)
   - Who else might be impacted?
   - What are the ripple effects?
   - Are there future generations to consider?

3. **Power Analysis**
   - Who has decision-making power?
   - Who is vulnerable or powerless?
   - How can we ensure fair representation?

4. **Stakeholder Engagement**
   - Who should be consulted?
   - How can we gather their input?
   - How do we balance competing interests?

5. **Equity Considerations**
   - Are any groups disproportionately affected?
   - How can we ensure fairness?
   - What are the implications for social justice?

Please help me work through each of these areas."
    )
}

fn ai_risk_assessment(system_description: &str, deployment_context: &str) -> String {
    format!(
        "I need to assess ethical risks for: {system_description}
Deployment context: {deployment_context}

Please help me evaluate:

1. **Fairness Risks**
   - Could the system discriminate against protected groups?
   - Is the training data representative?
   - Are there historical biases to consider?
   - How will we measure and ensure fairness?

2. **Transparency Risks**
   - Can users understand how decisions are made?
   - Is the system's logic explainable?
   - Are there \"black box\" concerns?
   - What documentation is needed?

3. **Privacy Risks**
   - What personal data is collected?
   - How is data protected?
   - Are privacy regulations followed?
   - Could data be misused?

4. **Safety and Security Risks**
   - What could go wrong?
   - How are errors handled?
   - Could the system be manipulated?
   - What are the failure modes?

5. **Autonomy and Control Risks**
   - Does the system preserve human agency?
   - Can decisions be appealed?
   - Is there appropriate human oversight?
   - Could it create dependency?

6. **Social Impact Risks**
   - How might this affect employment?
   - Could it increase inequality?
   - What are the environmental impacts?
   - Are there unintended consequences?

Please help me assess each risk category and recommend mitigations."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn rendering_is_idempotent() {
        let arguments = args(&[("situation", "X")]);
        let first = render(ETHICAL_DECISION_MAKING, Some(&arguments)).unwrap();
        let second = render(ETHICAL_DECISION_MAKING, Some(&arguments)).unwrap();
        assert_eq!(first, second);
        assert!(first.text.starts_with("I need help thinking through an ethical decision: X\n"));
    }

    #[test]
    fn missing_or_blank_arguments_use_placeholders() {
        let none = render(STAKEHOLDER_ANALYSIS, None).unwrap();
        assert!(none.text.contains("stakeholders for: this decision"));

        let blank = args(&[("decision", "   ")]);
        let blank = render(STAKEHOLDER_ANALYSIS, Some(&blank)).unwrap();
        assert_eq!(blank, none);
    }

    #[test]
    fn arguments_are_substituted_as_given() {
        let padded = args(&[("situation", "  X  ")]);
        let rendered = render(ETHICAL_DECISION_MAKING, Some(&padded)).unwrap();
        assert!(rendered
            .text
            .starts_with("I need help thinking through an ethical decision:   X  \n"));
    }

    #[test]
    fn risk_assessment_fills_both_slots() {
        let only_system = args(&[("system_description", "a triage model")]);
        let rendered = render(AI_RISK_ASSESSMENT, Some(&only_system)).unwrap();
        assert!(rendered.text.contains("ethical risks for: a triage model\nDeployment context: various contexts"));
        assert!(rendered.text.contains("6. **Social Impact Risks**"));
        assert_eq!(rendered.description, "AI ethical risk assessment");
    }

    #[test]
    fn unknown_prompt_is_an_error() {
        assert_eq!(
            render("haiku", None).unwrap_err(),
            PromptError::UnknownPrompt("haiku".into())
        );
    }
}
