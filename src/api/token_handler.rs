//! Agora token Lambda: validates the request, computes the privilege expiry and
//! returns a signed publisher token for the channel.

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info, warn};

use super::{helpers, parsing};
use crate::agora::{AgoraSigner, Role, SigningRequest, TokenSigner};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::TokenConfig;
use crate::core::models::{TokenRequest, TokenResponse};
use crate::errors::HandlerError;

pub use self::function_handler as handler;

pub const CHANNEL_NAME_REQUIRED: &str = "channelName is required";

/// Agora rejects channel names longer than this.
pub const MAX_CHANNEL_NAME_BYTES: usize = 64;

pub fn validate_channel_name(channel_name: Option<&str>) -> Result<&str, HandlerError> {
    let channel_name = channel_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| HandlerError::InvalidRequest(CHANNEL_NAME_REQUIRED.to_string()))?;

    if channel_name.len() > MAX_CHANNEL_NAME_BYTES {
        return Err(HandlerError::InvalidRequest(format!(
            "channelName must be at most {MAX_CHANNEL_NAME_BYTES} bytes"
        )));
    }

    Ok(channel_name)
}

pub struct TokenHandler<S, C> {
    config: TokenConfig,
    signer: S,
    clock: C,
}

impl<S: TokenSigner, C: Clock> TokenHandler<S, C> {
    pub fn new(config: TokenConfig, signer: S, clock: C) -> Self {
        Self {
            config,
            signer,
            clock,
        }
    }

    pub const fn signer(&self) -> &S {
        &self.signer
    }

    /// Handles one invocation payload and always produces a response object.
    pub fn handle(&self, payload: &Value) -> Value {
        info!("Agora token generator executing");

        match self.generate(payload) {
            Ok(response) => helpers::ok_json(&response),
            Err(e) => {
                if e.status_code() >= 500 {
                    error!("Error generating token: {}", e);
                } else {
                    warn!("Rejected token request: {}", e);
                }
                helpers::error_to_response(&e)
            }
        }
    }

    /// # Errors
    ///
    /// `InvalidRequest` for a bad body, `Configuration` for missing credentials,
    /// or whatever the signer reports.
    pub fn generate(&self, payload: &Value) -> Result<TokenResponse, HandlerError> {
        let body = parsing::extract_body(payload)?;
        let request: TokenRequest = parsing::parse_request(body)?;
        let channel_name = validate_channel_name(request.channel_name.as_deref())?;

        let credentials = self.config.credentials()?;

        let privilege_expired_ts = self
            .clock
            .now_unix()
            .checked_add(u64::from(request.expire_time))
            .and_then(|ts| u32::try_from(ts).ok())
            .ok_or_else(|| HandlerError::InvalidRequest("expireTime is out of range".to_string()))?;

        let token = self.signer.sign(&SigningRequest {
            app_id: credentials.app_id,
            app_certificate: credentials.app_certificate,
            channel_name,
            uid: request.uid,
            role: Role::Publisher,
            privilege_expired_ts,
        })?;

        info!(
            channel = %channel_name,
            uid = request.uid,
            expires_at = privilege_expired_ts,
            "Token generated successfully"
        );

        Ok(TokenResponse { token })
    }
}

/// Lambda handler for the token entrypoint.
///
/// # Errors
///
/// Never fails for request-level problems; those become error responses.
#[tracing::instrument(level = "info", skip(event), fields(request_id = %event.context.request_id))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let handler = TokenHandler::new(TokenConfig::from_env(), AgoraSigner::new(), SystemClock);
    Ok(handler.handle(&event.payload))
}
