//! MCP round trips over stdio framing and Streamable HTTP.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use ethicist::gateway::{CompletionGateway, CredentialSource, GatewaySettings};
use ethicist::Ethicist;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tower::ServiceExt;

fn service() -> Arc<Ethicist> {
    let settings = GatewaySettings {
        credential: CredentialSource::Fixed(None),
        model_env: None,
        model: "gpt-4o-mini".to_string(),
        base_url: None,
    };
    Arc::new(Ethicist::new(CompletionGateway::new(settings)).unwrap())
}

async fn run_stdio(requests: &[Value]) -> Vec<Value> {
    let input: String = requests.iter().map(|r| format!("{}\n", r)).collect();

    let (out_w, mut out_r) = tokio::io::duplex(1024 * 1024);
    baton::serve_stream(service(), input.as_bytes(), out_w)
        .await
        .unwrap();

    let mut output = String::new();
    out_r.read_to_string(&mut output).await.unwrap();
    let mut replies: Vec<Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    replies.sort_by_key(|r| r["id"].as_i64());
    replies
}

#[tokio::test]
async fn stdio_session() {
    let replies = run_stdio(&[
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
            "protocolVersion": "2025-06-18",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "1"}
        }}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
            "name": "check_bias",
            "arguments": {"context": "Historical hiring data"}
        }}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "resources/read", "params": {
            "uri": "ethicist://frameworks/stoicism"
        }}),
        json!({"jsonrpc": "2.0", "id": 5, "method": "prompts/get", "params": {
            "name": "stakeholder_analysis",
            "arguments": {"decision": "Closing the rural clinic"}
        }}),
    ])
    .await;

    assert_eq!(replies.len(), 5);

    let init = &replies[0]["result"];
    assert_eq!(init["serverInfo"]["name"], "ethicist");
    assert!(init["capabilities"]["tools"].is_object());
    assert!(init["capabilities"]["resources"].is_object());
    assert!(init["capabilities"]["prompts"].is_object());

    let tools = replies[1]["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 5);
    let bias = tools.iter().find(|t| t["name"] == "check_bias").unwrap();
    assert_eq!(bias["inputSchema"]["required"], json!(["context"]));

    let content = replies[2]["result"]["content"].as_array().unwrap();
    assert_eq!(content.len(), 1);
    let text = content[0]["text"].as_str().unwrap();
    assert!(text.contains("Historical hiring data"));
    assert!(text.contains("no API key"));

    let error = &replies[3]["error"];
    assert_eq!(error["code"], -32602);
    assert_eq!(
        error["message"],
        "Unknown framework 'stoicism' (ethicist://frameworks/stoicism)"
    );
    assert_eq!(error["data"]["uri"], "ethicist://frameworks/stoicism");

    let messages = replies[4]["result"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "user");
    assert!(messages[0]["content"]["text"]
        .as_str()
        .unwrap()
        .contains("Closing the rural clinic"));
}

#[tokio::test]
async fn unknown_prompt_names_itself_in_error_data() {
    let replies = run_stdio(&[json!({"jsonrpc": "2.0", "id": 1, "method": "prompts/get", "params": {
        "name": "haiku"
    }})])
    .await;

    let error = &replies[0]["error"];
    assert_eq!(error["code"], -32602);
    assert_eq!(error["message"], "Unknown prompt: haiku");
    assert_eq!(error["data"]["name"], "haiku");
}

#[tokio::test]
async fn framework_resource_is_json() {
    let replies = run_stdio(&[json!({"jsonrpc": "2.0", "id": 1, "method": "resources/read", "params": {
        "uri": "ethicist://frameworks/nist_ai_rmf"
    }})])
    .await;

    let contents = &replies[0]["result"]["contents"][0];
    assert_eq!(contents["mimeType"], "application/json");
    let framework: Value = serde_json::from_str(contents["text"].as_str().unwrap()).unwrap();
    assert!(framework["name"].as_str().unwrap().contains("NIST"));
    assert!(framework["key_principles"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
async fn http_tools_list() {
    let app = ethicist::serve::router(service());

    let request = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"jsonrpc": "2.0", "id": 7, "method": "tools/list"}).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("mcp-session-id"));

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let reply: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(reply["id"], 7);
    assert_eq!(reply["result"]["tools"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn health_reports_version() {
    let app = ethicist::serve::router(service());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
}
