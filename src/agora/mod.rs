//! Agora RTC token signing

pub mod access_token;

use rand::Rng;
use tracing::debug;

use crate::core::clock::{Clock, SystemClock};
use crate::errors::HandlerError;

pub use access_token::{AccessToken, DecodedToken, Privilege, Role, build_token_with_uid};

/// Everything the signing primitive needs for one token.
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    pub app_id: &'a str,
    pub app_certificate: &'a str,
    pub channel_name: &'a str,
    pub uid: u32,
    pub role: Role,
    pub privilege_expired_ts: u32,
}

/// Capability: turn a signing request into an opaque token string.
pub trait TokenSigner: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the token cannot be produced.
    fn sign(&self, request: &SigningRequest<'_>) -> Result<String, HandlerError>;
}

/// Signs `006` access tokens with a random salt.
#[derive(Debug, Clone, Default)]
pub struct AgoraSigner<C = SystemClock> {
    clock: C,
}

impl AgoraSigner {
    #[must_use]
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> AgoraSigner<C> {
    pub const fn with_clock(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> TokenSigner for AgoraSigner<C> {
    fn sign(&self, request: &SigningRequest<'_>) -> Result<String, HandlerError> {
        let issued_at = u32::try_from(self.clock.now_unix())
            .map_err(|e| HandlerError::Unexpected(format!("Clock out of range: {e}")))?;
        let salt = rand::thread_rng().gen_range(1..=access_token::MAX_SALT);
        debug!(channel = %request.channel_name, uid = request.uid, "Signing access token");

        Ok(build_token_with_uid(request, issued_at, salt)?)
    }
}
