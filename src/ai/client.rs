//! Gemini (generative language) API client
//!
//! Sends a single prompt with a response schema and returns the raw JSON text
//! the model produced.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::core::config::QuizConfig;
use crate::errors::HandlerError;

/// One structured generation call: a model, a user prompt and the schema the
/// answer must follow.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub model: String,
    pub prompt: String,
    pub response_schema: Value,
}

/// Capability: generate content constrained to a JSON schema.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Returns the model output text, expected to be JSON matching the schema.
    ///
    /// # Errors
    ///
    /// `UpstreamUnavailable` for transient failures, `UpstreamFailure` otherwise.
    async fn generate_structured(&self, request: &StructuredRequest)
    -> Result<String, HandlerError>;
}

pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: &str, config: &QuizConfig) -> Result<Self, HandlerError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                HandlerError::Unexpected(format!("Failed to build Gemini HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            base_url: config.gemini_base_url.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[must_use]
pub fn build_request_body(request: &StructuredRequest) -> Value {
    json!({
        "contents": [
            {
                "role": "user",
                "parts": [ { "text": request.prompt } ]
            }
        ],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": request.response_schema
        }
    })
}

/// Pull the concatenated text parts out of the first candidate.
///
/// # Errors
///
/// Fails when the prompt was blocked or the response carries no text.
pub fn extract_text(response: &Value) -> Result<String, HandlerError> {
    if let Some(reason) = response
        .get("promptFeedback")
        .and_then(|f| f.get("blockReason"))
        .and_then(Value::as_str)
    {
        return Err(HandlerError::UpstreamFailure(format!(
            "prompt blocked: {reason}"
        )));
    }

    let parts = response
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array);

    let text: String = parts
        .into_iter()
        .flatten()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        let finish_reason = response
            .pointer("/candidates/0/finishReason")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        return Err(HandlerError::UpstreamFailure(format!(
            "response contained no text (finish reason: {finish_reason})"
        )));
    }

    Ok(text)
}

fn classify_status(status: StatusCode, body: &str) -> HandlerError {
    let message = format!("status {status}: {body}");
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        HandlerError::UpstreamUnavailable(message)
    } else {
        HandlerError::UpstreamFailure(message)
    }
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    async fn generate_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<String, HandlerError> {
        #[cfg(feature = "debug-logs")]
        info!("Using Gemini prompt:\n{}", request.prompt);

        #[cfg(not(feature = "debug-logs"))]
        info!(
            model = %request.model,
            prompt_chars = request.prompt.chars().count(),
            "Requesting structured content from Gemini"
        );

        let response = self
            .http
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                format!("Failed to read error response body (status {status}): {e}")
            });
            warn!(%status, "Gemini request failed");
            return Err(classify_status(status, &error_text));
        }

        let body: Value = response.json().await?;
        let text = extract_text(&body)?;
        debug!(chars = text.len(), "Gemini response received");

        #[cfg(feature = "debug-logs")]
        info!("Gemini response text:\n{}", text);

        Ok(text)
    }
}
