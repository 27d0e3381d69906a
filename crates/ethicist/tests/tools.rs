//! Every tool end to end with no credential configured.

use ethicist::gateway::{CompletionGateway, CompletionOutcome, CredentialSource, GatewaySettings};
use ethicist::{Ethicist, ToolOutcome};
use serde_json::{json, Map, Value};

fn service() -> Ethicist {
    let settings = GatewaySettings {
        credential: CredentialSource::Env("ETHICIST_TEST_NEVER_SET_KEY".to_string()),
        model_env: None,
        model: "gpt-4o-mini".to_string(),
        base_url: None,
    };
    Ethicist::new(CompletionGateway::new(settings)).unwrap()
}

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("arguments must be an object"),
    }
}

#[tokio::test]
async fn each_tool_reports_missing_credential_with_its_subject() {
    let service = service();
    let cases = [
        (
            "analyze_ethical_scenario",
            json!({ "scenario": "Releasing a model trained on scraped data" }),
            "Ethical analysis of: Releasing a model trained on scraped data",
        ),
        (
            "evaluate_ai_system",
            json!({ "system_description": "Resume screener", "use_case": "hiring" }),
            "AI system evaluation of: Resume screener",
        ),
        (
            "check_bias",
            json!({ "context": "Historical hiring data", "bias_types": ["selection"] }),
            "Bias assessment of: Historical hiring data",
        ),
        (
            "generate_ethical_guidelines",
            json!({ "project_type": "healthcare triage", "risk_level": "high" }),
            "Ethical guidelines for: healthcare triage",
        ),
        (
            "assess_transparency",
            json!({ "system_type": "LLM" }),
            "Transparency assessment of: LLM",
        ),
    ];

    for (tool, arguments, subject) in cases {
        match service.call_tool(tool, args(arguments)).await {
            ToolOutcome::Completed(completion) => {
                assert_eq!(completion.outcome, CompletionOutcome::NoCredential, "{tool}");
                assert_eq!(
                    completion.text,
                    format!(
                        "LLM analysis for {subject} is unavailable: no API key is configured. \
                         Set ETHICIST_TEST_NEVER_SET_KEY to enable AI-generated analysis."
                    )
                );
            }
            other => panic!("{tool}: unexpected outcome {other:?}"),
        }
    }
}

#[tokio::test]
async fn blank_required_argument_is_a_warning() {
    let text = service()
        .call_tool("evaluate_ai_system", args(json!({ "system_description": "Chatbot", "use_case": "  " })))
        .await
        .into_text();

    assert_eq!(
        text,
        "Warning: missing required argument 'use_case' for evaluate_ai_system. Provide 'use_case' and try again."
    );
}

#[tokio::test]
async fn wrongly_typed_argument_is_a_warning() {
    let text = service()
        .call_tool(
            "analyze_ethical_scenario",
            args(json!({ "scenario": "Layoffs by algorithm", "frameworks": "virtue" })),
        )
        .await
        .into_text();

    assert!(text.starts_with("Warning: invalid arguments for analyze_ethical_scenario: "), "{text}");
}

#[tokio::test]
async fn unknown_tool_is_text_not_error() {
    let text = service().call_tool("summon_oracle", Map::new()).await.into_text();
    assert_eq!(text, "Unknown tool: summon_oracle");
}
