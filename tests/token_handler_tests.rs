use std::sync::Mutex;

use beam::agora::{AgoraSigner, DecodedToken, Privilege, Role, SigningRequest, TokenSigner};
use beam::api::TokenHandler;
use beam::core::clock::FixedClock;
use beam::core::config::TokenConfig;
use beam::errors::HandlerError;
use serde_json::{Value, json};

const APP_ID: &str = "0123456789abcdef0123456789abcdef";
const APP_CERT: &str = "fedcba9876543210fedcba9876543210";
const NOW: u64 = 1_700_000_000;

/// Records every signing request and returns a fixed token.
#[derive(Default)]
struct RecordingSigner {
    calls: Mutex<Vec<(String, String, String, u32, Role, u32)>>,
}

impl TokenSigner for RecordingSigner {
    fn sign(&self, request: &SigningRequest<'_>) -> Result<String, HandlerError> {
        self.calls.lock().unwrap().push((
            request.app_id.to_string(),
            request.app_certificate.to_string(),
            request.channel_name.to_string(),
            request.uid,
            request.role,
            request.privilege_expired_ts,
        ));
        Ok("signed-token".to_string())
    }
}

struct FailingSigner;

impl TokenSigner for FailingSigner {
    fn sign(&self, _request: &SigningRequest<'_>) -> Result<String, HandlerError> {
        Err(HandlerError::Unexpected("signing backend exploded".to_string()))
    }
}

fn configured() -> TokenConfig {
    TokenConfig {
        app_id: Some(APP_ID.to_string()),
        app_certificate: Some(APP_CERT.to_string()),
    }
}

fn proxy_event(body: &Value) -> Value {
    json!({ "body": body.to_string() })
}

fn body_of(response: &Value) -> Value {
    serde_json::from_str(response["body"].as_str().expect("body string")).expect("json body")
}

#[test]
fn test_valid_request_returns_token() {
    let handler = TokenHandler::new(configured(), RecordingSigner::default(), FixedClock(NOW));

    let response = handler.handle(&proxy_event(&json!({ "channelName": "room1" })));

    assert_eq!(response["statusCode"], 200);
    let body = body_of(&response);
    assert_eq!(body["token"], "signed-token");
    assert!(body.get("error").is_none());
}

#[test]
fn test_expiration_is_clock_plus_expire_time() {
    let signer = RecordingSigner::default();
    let handler = TokenHandler::new(configured(), signer, FixedClock(NOW));

    let response = handler.handle(&proxy_event(
        &json!({ "channelName": "room1", "uid": 42, "expireTime": 60 }),
    ));
    assert_eq!(response["statusCode"], 200);

    let calls = handler_signer_calls(&handler);
    assert_eq!(calls.len(), 1);
    let (app_id, cert, channel, uid, role, expire) = calls[0].clone();
    assert_eq!(app_id, APP_ID);
    assert_eq!(cert, APP_CERT);
    assert_eq!(channel, "room1");
    assert_eq!(uid, 42);
    assert_eq!(role, Role::Publisher);
    assert_eq!(u64::from(expire), NOW + 60);
}

#[test]
fn test_defaults_uid_zero_and_one_hour() {
    let handler = TokenHandler::new(configured(), RecordingSigner::default(), FixedClock(NOW));

    handler.handle(&proxy_event(&json!({ "channelName": "room1" })));

    let calls = handler_signer_calls(&handler);
    assert_eq!(calls[0].3, 0);
    assert_eq!(u64::from(calls[0].5), NOW + 3600);
}

#[test]
fn test_missing_channel_name_is_400() {
    let handler = TokenHandler::new(configured(), RecordingSigner::default(), FixedClock(NOW));

    for payload in [
        proxy_event(&json!({ "uid": 1 })),
        proxy_event(&json!({ "channelName": "" })),
        proxy_event(&json!({ "channelName": null })),
        json!({ "body": "" }),
        json!({}),
    ] {
        let response = handler.handle(&payload);
        assert_eq!(response["statusCode"], 400);
        assert_eq!(body_of(&response), json!({ "error": "channelName is required" }));
    }
}

#[test]
fn test_invalid_json_is_400() {
    let handler = TokenHandler::new(configured(), RecordingSigner::default(), FixedClock(NOW));

    let response = handler.handle(&json!({ "body": "{\"channelName\": " }));

    assert_eq!(response["statusCode"], 400);
    assert_eq!(body_of(&response)["error"], "Invalid JSON in request body");
}

#[test]
fn test_wrong_field_type_is_400() {
    let handler = TokenHandler::new(configured(), RecordingSigner::default(), FixedClock(NOW));

    let response = handler.handle(&proxy_event(&json!({ "channelName": "room1", "uid": -5 })));

    assert_eq!(response["statusCode"], 400);
    let error = body_of(&response)["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Invalid request body"));
}

#[test]
fn test_missing_credentials_is_500() {
    let partial = [
        TokenConfig::default(),
        TokenConfig {
            app_id: Some(APP_ID.to_string()),
            app_certificate: None,
        },
        TokenConfig {
            app_id: None,
            app_certificate: Some(APP_CERT.to_string()),
        },
    ];

    for config in partial {
        let handler = TokenHandler::new(config, RecordingSigner::default(), FixedClock(NOW));
        let response = handler.handle(&proxy_event(&json!({ "channelName": "room1" })));

        assert_eq!(response["statusCode"], 500);
        assert_eq!(
            body_of(&response),
            json!({ "error": "Agora credentials are not set" })
        );
        assert!(handler_signer_calls(&handler).is_empty());
    }
}

#[test]
fn test_channel_name_checked_before_credentials() {
    let handler = TokenHandler::new(
        TokenConfig::default(),
        RecordingSigner::default(),
        FixedClock(NOW),
    );

    let response = handler.handle(&proxy_event(&json!({})));

    assert_eq!(response["statusCode"], 400);
}

#[test]
fn test_expiration_overflow_is_400() {
    let handler = TokenHandler::new(
        configured(),
        RecordingSigner::default(),
        FixedClock(u64::from(u32::MAX) - 10),
    );

    let response = handler.handle(&proxy_event(&json!({ "channelName": "room1" })));

    assert_eq!(response["statusCode"], 400);
    assert_eq!(body_of(&response)["error"], "expireTime is out of range");
}

#[test]
fn test_signer_failure_is_500() {
    let handler = TokenHandler::new(configured(), FailingSigner, FixedClock(NOW));

    let response = handler.handle(&proxy_event(&json!({ "channelName": "room1" })));

    assert_eq!(response["statusCode"], 500);
    assert_eq!(body_of(&response)["error"], "signing backend exploded");
}

#[test]
fn test_direct_invocation_with_real_signer() {
    let handler = TokenHandler::new(
        configured(),
        AgoraSigner::with_clock(FixedClock(NOW)),
        FixedClock(NOW),
    );

    let response = handler.handle(&json!({ "channelName": "room1", "uid": 42, "expireTime": 60 }));

    assert_eq!(response["statusCode"], 200);
    let token = body_of(&response)["token"].as_str().unwrap().to_string();
    let decoded = DecodedToken::parse(&token).unwrap();
    assert!(decoded.verify(APP_CERT, "room1", 42));
    assert_eq!(
        decoded.expiry_of(Privilege::JoinChannel).map(u64::from),
        Some(NOW + 60)
    );
    assert_eq!(
        decoded.expiry_of(Privilege::PublishVideoStream).map(u64::from),
        Some(NOW + 60)
    );
}

fn handler_signer_calls(
    handler: &TokenHandler<RecordingSigner, FixedClock>,
) -> Vec<(String, String, String, u32, Role, u32)> {
    handler.signer().calls.lock().unwrap().clone()
}
