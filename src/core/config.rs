use std::env;
use std::time::Duration;

use crate::errors::HandlerError;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-04-17";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 30;

const AGORA_CREDENTIALS_MISSING: &str = "Agora credentials are not set";
const GEMINI_CREDENTIALS_MISSING: &str = "Gemini credentials are not set";

/// Empty values count as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default)]
pub struct TokenConfig {
    pub app_id: Option<String>,
    pub app_certificate: Option<String>,
}

/// Borrowed view of a complete set of Agora credentials.
#[derive(Debug, Clone, Copy)]
pub struct AgoraCredentials<'a> {
    pub app_id: &'a str,
    pub app_certificate: &'a str,
}

impl TokenConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            app_id: non_empty(lookup("AGORA_APP_ID")),
            app_certificate: non_empty(lookup("AGORA_APP_CERTIFICATE")),
        }
    }

    /// # Errors
    ///
    /// Returns `HandlerError::Configuration` unless both values are set.
    pub fn credentials(&self) -> Result<AgoraCredentials<'_>, HandlerError> {
        match (self.app_id.as_deref(), self.app_certificate.as_deref()) {
            (Some(app_id), Some(app_certificate)) => Ok(AgoraCredentials {
                app_id,
                app_certificate,
            }),
            _ => Err(HandlerError::Configuration(
                AGORA_CREDENTIALS_MISSING.to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub request_timeout: Duration,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_GEMINI_TIMEOUT_SECS),
        }
    }
}

impl QuizConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let request_timeout = match non_empty(lookup("GEMINI_TIMEOUT_SECS")) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| format!("GEMINI_TIMEOUT_SECS: {}", e))?,
            None => Duration::from_secs(DEFAULT_GEMINI_TIMEOUT_SECS),
        };

        Ok(Self {
            gemini_api_key: non_empty(lookup("GEMINI_API_KEY")),
            gemini_model: non_empty(lookup("GEMINI_MODEL"))
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: non_empty(lookup("GEMINI_BASE_URL"))
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            request_timeout,
        })
    }

    /// # Errors
    ///
    /// Returns `HandlerError::Configuration` when no API key is configured.
    pub fn api_key(&self) -> Result<&str, HandlerError> {
        self.gemini_api_key
            .as_deref()
            .ok_or_else(|| HandlerError::Configuration(GEMINI_CREDENTIALS_MISSING.to_string()))
    }
}
