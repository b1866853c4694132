//! Quiz Lambda: asks Gemini for verification questions suited to a profile and
//! returns a random subset of them.

use lambda_runtime::{Error, LambdaEvent};
use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::Value;
use tracing::{error, info, warn};

use super::{helpers, parsing};
use crate::ai::prompt::{build_quiz_prompt, quiz_response_schema, sanitize_profession};
use crate::ai::{ContentGenerator, GeminiClient, StructuredRequest};
use crate::core::config::QuizConfig;
use crate::core::models::{QuizQuestion, QuizRequest, QuizResponse};
use crate::errors::HandlerError;

pub use self::function_handler as handler;

pub const PROFESSION_REQUIRED: &str = "profession is required";
pub const QUIZ_LIST_EMPTY: &str = "Quiz list is empty";

/// Number of questions returned to the client.
pub const QUIZ_SIZE: usize = 5;

/// Parses the model output as a question list.
///
/// # Errors
///
/// Returns `UpstreamFailure` when the text is not a JSON array of questions.
pub fn parse_questions(text: &str) -> Result<Vec<QuizQuestion>, HandlerError> {
    Ok(serde_json::from_str(text)?)
}

/// Drops malformed questions, then samples `QUIZ_SIZE` of them without
/// replacement when there are enough; otherwise returns them all.
///
/// # Errors
///
/// Returns `EmptyResult` when no usable question remains.
pub fn select_questions<R: Rng + ?Sized>(
    questions: Vec<QuizQuestion>,
    rng: &mut R,
) -> Result<Vec<QuizQuestion>, HandlerError> {
    let received = questions.len();
    let usable: Vec<QuizQuestion> = questions
        .into_iter()
        .filter(QuizQuestion::is_well_formed)
        .collect();

    if usable.len() < received {
        warn!(
            dropped = received - usable.len(),
            "Dropped blank questions or ones whose answer is not among the options"
        );
    }

    if usable.is_empty() {
        return Err(HandlerError::EmptyResult(QUIZ_LIST_EMPTY.to_string()));
    }

    if usable.len() >= QUIZ_SIZE {
        Ok(usable.choose_multiple(rng, QUIZ_SIZE).cloned().collect())
    } else {
        Ok(usable)
    }
}

pub struct QuizHandler<F> {
    config: QuizConfig,
    connect: F,
}

impl<F, G> QuizHandler<F>
where
    F: Fn(&str, &QuizConfig) -> Result<G, HandlerError> + Send + Sync,
    G: ContentGenerator,
{
    /// `connect` builds the generator once the API key has been checked.
    pub fn new(config: QuizConfig, connect: F) -> Self {
        Self { config, connect }
    }

    /// Handles one invocation payload and always produces a response object.
    pub async fn handle(&self, payload: &Value) -> Value {
        info!("Beam quiz generation running");

        match self.generate(payload).await {
            Ok(response) => {
                info!(questions = response.questions.len(), "Quiz generated");
                helpers::ok_json(&response)
            }
            Err(e) => {
                if e.status_code() >= 500 {
                    error!(retryable = e.is_retryable(), "Error generating quiz: {}", e);
                } else {
                    warn!("Rejected quiz request: {}", e);
                }
                helpers::error_to_response(&e)
            }
        }
    }

    /// # Errors
    ///
    /// `InvalidRequest` for a bad body, `Configuration` for a missing key,
    /// upstream errors from the generator and `EmptyResult` when nothing usable
    /// came back.
    pub async fn generate(&self, payload: &Value) -> Result<QuizResponse, HandlerError> {
        let body = parsing::extract_body(payload)?;
        let request: QuizRequest = parsing::parse_request(body)?;
        // Checked after sanitising so control-only input counts as missing.
        let profession = request
            .profession
            .as_deref()
            .map(sanitize_profession)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| HandlerError::InvalidRequest(PROFESSION_REQUIRED.to_string()))?;

        let api_key = self.config.api_key()?;
        let generator = (self.connect)(api_key, &self.config)?;

        let structured = StructuredRequest {
            model: self.config.gemini_model.clone(),
            prompt: build_quiz_prompt(&profession, request.experience),
            response_schema: quiz_response_schema(),
        };
        let text = generator.generate_structured(&structured).await?;
        let questions = parse_questions(&text)?;
        info!(received = questions.len(), "Parsed quiz questions");

        let selected = select_questions(questions, &mut rand::thread_rng())?;
        Ok(QuizResponse {
            questions: selected,
        })
    }
}

/// Lambda handler for the quiz entrypoint.
///
/// # Errors
///
/// Never fails for request-level problems; those become error responses.
#[tracing::instrument(level = "info", skip(event), fields(request_id = %event.context.request_id))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = match QuizConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Config error: {}", e);
            return Ok(helpers::err_response(500, &format!("Configuration error: {e}")));
        }
    };

    let handler = QuizHandler::new(config, GeminiClient::new);
    Ok(handler.handle(&event.payload).await)
}
