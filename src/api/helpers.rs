//! Response builders shared by both handlers.
//!
//! Responses use the API Gateway proxy shape: a status code, headers and a
//! JSON-encoded body string.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::error;

use crate::core::models::ErrorResponse;
use crate::errors::HandlerError;

fn response(status_code: u16, body: &str) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "Content-Type": "application/json" },
        "body": body
    })
}

/// Returns a 200 OK response with `payload` as the JSON body.
#[must_use]
pub fn ok_json<T: Serialize>(payload: &T) -> Value {
    match serde_json::to_string(payload) {
        Ok(body) => response(200, &body),
        Err(e) => {
            error!("Failed to serialise response body: {}", e);
            err_response(500, &format!("Failed to serialise response: {e}"))
        }
    }
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    let payload = ErrorResponse {
        error: message.to_string(),
    };
    let body = serde_json::to_string(&payload)
        .unwrap_or_else(|_| json!({ "error": message }).to_string());
    response(status_code, &body)
}

/// Maps a handler error onto its status code and `{error}` body.
#[must_use]
pub fn error_to_response(err: &HandlerError) -> Value {
    err_response(err.status_code(), &err.to_string())
}
