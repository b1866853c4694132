//! Beam functions - serverless handlers backing the Beam professional networking app.
//!
//! This crate builds two independent Lambda functions:
//! 1. A token Lambda that signs Agora RTC access tokens for a channel and uid
//! 2. A quiz Lambda that asks Gemini for verification questions suited to a
//!    profession and experience level, then returns a random subset
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda for serverless execution
//! - An in-crate Agora `006` token builder (HMAC-SHA256)
//! - reqwest for the Gemini `generateContent` API
//! - Tokio for async runtime
//!
//! Credentials are loaded into `TokenConfig` / `QuizConfig` and injected into
//! the handlers, together with the signing and generation capabilities.
//!
//! # Example
//!
//! ```
//! use beam::agora::AgoraSigner;
//! use beam::api::TokenHandler;
//! use beam::core::clock::FixedClock;
//! use beam::core::config::TokenConfig;
//!
//! let config = TokenConfig {
//!     app_id: Some("0123456789abcdef0123456789abcdef".to_string()),
//!     app_certificate: Some("fedcba9876543210fedcba9876543210".to_string()),
//! };
//! let handler = TokenHandler::new(config, AgoraSigner::new(), FixedClock(1_700_000_000));
//!
//! let response = handler.handle(&serde_json::json!({
//!     "body": "{\"channelName\":\"room1\",\"uid\":42}"
//! }));
//! assert_eq!(response["statusCode"], 200);
//! ```

// Module declarations
pub mod agora;
pub mod ai;
pub mod api;
pub mod core;
pub mod errors;

pub use errors::HandlerError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// This sets up tracing-subscriber with a JSON formatter suitable for
/// `CloudWatch` Logs integration. The level comes from `RUST_LOG` and defaults
/// to `info`. Calling it more than once is harmless.
///
/// # Example
///
/// ```
/// beam::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
