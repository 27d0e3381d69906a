//! Streamable HTTP Transport
//!
//! One JSON-RPC message per POST. Requests get the response in the body,
//! notifications get 202 with no body. The server keeps no per-session
//! state; the Mcp-Session-Id header is minted on first contact and echoed
//! back so clients that require it are satisfied.

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::protocol::{handle_message, parse_value};
use crate::Handler;

pub const SESSION_HEADER: &str = "mcp-session-id";

#[tracing::instrument(skip(handler, headers, body), fields(session_id = tracing::field::Empty))]
pub async fn streamable_handler<H: Handler>(
    State(handler): State<Arc<H>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let session_id = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    tracing::Span::current().record("session_id", session_id.as_str());

    let message = match parse_value(body) {
        Ok(message) => message,
        Err(reply) => return with_session(StatusCode::BAD_REQUEST, &session_id, Json(reply)),
    };

    match handle_message(handler.as_ref(), &message).await {
        Some(reply) => with_session(StatusCode::OK, &session_id, Json(reply)),
        None => {
            tracing::debug!(method = %message.method, "notification accepted");
            with_session(StatusCode::ACCEPTED, &session_id, ())
        }
    }
}

fn with_session<T: IntoResponse>(status: StatusCode, session_id: &str, body: T) -> Response {
    let mut response = body.into_response();
    *response.status_mut() = status;

    if let Ok(value) = HeaderValue::from_str(session_id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }

    response
}
