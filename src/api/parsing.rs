use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::error;

use crate::errors::HandlerError;

pub const INVALID_JSON: &str = "Invalid JSON in request body";

fn invalid_json() -> HandlerError {
    HandlerError::InvalidRequest(INVALID_JSON.to_string())
}

/// Extracts the decoded request body from an invocation payload.
///
/// Proxy events carry the request in `body`, either as a JSON string (optionally
/// base64-encoded) or as an already-decoded object. Direct invocations pass the
/// request object itself.
///
/// # Errors
///
/// Returns `InvalidRequest` when the body is not a JSON object.
pub fn extract_body(payload: &Value) -> Result<Map<String, Value>, HandlerError> {
    let Some(body) = payload.get("body") else {
        return match payload {
            Value::Object(map) => Ok(map.clone()),
            Value::Null => Ok(Map::new()),
            _ => Err(invalid_json()),
        };
    };

    match body {
        Value::Null => Ok(Map::new()),
        Value::Object(map) => Ok(map.clone()),
        Value::String(raw) => {
            let is_base64 = payload
                .get("isBase64Encoded")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let text = if is_base64 {
                let bytes = STANDARD.decode(raw.trim()).map_err(|e| {
                    error!("Failed to decode base64 request body: {}", e);
                    invalid_json()
                })?;
                String::from_utf8(bytes).map_err(|e| {
                    error!("Request body is not UTF-8: {}", e);
                    invalid_json()
                })?
            } else {
                raw.clone()
            };
            parse_object(&text)
        }
        _ => Err(invalid_json()),
    }
}

fn parse_object(text: &str) -> Result<Map<String, Value>, HandlerError> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => {
            error!("Request body is not a JSON object");
            Err(invalid_json())
        }
        Err(e) => {
            error!("Failed to parse request body as JSON: {}", e);
            Err(invalid_json())
        }
    }
}

/// Deserialises a request type from a decoded body.
///
/// # Errors
///
/// Returns `InvalidRequest` when a field has the wrong type.
pub fn parse_request<T: DeserializeOwned>(body: Map<String, Value>) -> Result<T, HandlerError> {
    serde_json::from_value(Value::Object(body))
        .map_err(|e| HandlerError::InvalidRequest(format!("Invalid request body: {e}")))
}
