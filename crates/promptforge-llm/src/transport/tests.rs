//! Tests for transport module

use super::*;
use crate::capability::{lookup, CapabilityRecord};
use crate::providers::adapter_for;
use crate::request::CanonicalRequest;
use std::time::Duration;

fn fast_config() -> TransportConfig {
    TransportConfig::default()
        .with_max_attempts(3)
        .with_backoff(Duration::from_millis(1), Duration::from_millis(5))
}

fn endpoints() -> Endpoints {
    Endpoints::default()
        .with_openai(ProviderEndpoint::new("sk-test-openai-key", "https://api.test/v1/"))
        .with_google(ProviderEndpoint::new("AIza-test-google-key", "https://gemini.test/v1beta"))
        .with_openrouter(
            ProviderEndpoint::new("sk-or-test-key-123", "https://router.test/api/v1")
                .with_app_name("PromptForge")
                .with_site_url("https://promptforge.dev"),
        )
}

fn payload(provider: &str, model: &str) -> ProviderPayload {
    let entry = lookup(provider, model).unwrap();
    let capability = CapabilityRecord::from_whitelist(provider, model, entry);
    let request = CanonicalRequest::new(provider, model, "sys", "question");
    adapter_for(provider, model)
        .unwrap()
        .translate(&request, &capability)
        .unwrap()
}

#[tokio::test]
async fn test_success_on_first_attempt() {
    let mut exchange = MockHttpExchange::new();
    exchange
        .expect_post()
        .times(1)
        .returning(|_| Ok(HttpReply::new(200, r#"{"ok":true}"#)));

    let client = TransportClient::with_exchange(exchange, endpoints(), fast_config());
    let raw = client.send(payload("openai", "gpt-5")).await.unwrap();

    assert_eq!(raw.status, 200);
    assert_eq!(raw.body, r#"{"ok":true}"#);
    assert_eq!(raw.attempts, 1);
}

#[test]
fn test_reply_from_bytes_keeps_invalid_utf8() {
    let valid = HttpReply::from_bytes(200, Vec::new(), br#"{"ok":true}"#.to_vec());
    assert_eq!(valid.body, r#"{"ok":true}"#);
    assert!(valid.raw_bytes.is_none());

    let bytes = b"caf\xe9 ok".to_vec();
    let invalid = HttpReply::from_bytes(200, Vec::new(), bytes.clone());
    assert_eq!(invalid.body, "caf\u{fffd} ok");
    assert_eq!(invalid.raw_bytes.as_deref(), Some(bytes.as_slice()));
}

#[tokio::test]
async fn test_undecodable_body_reaches_raw_response() {
    let bytes = b"{\"text\":\"caf\xe9\"}".to_vec();
    let reply = HttpReply::from_bytes(200, Vec::new(), bytes.clone());
    let mut exchange = MockHttpExchange::new();
    exchange
        .expect_post()
        .times(1)
        .returning(move |_| Ok(reply.clone()));

    let client = TransportClient::with_exchange(exchange, endpoints(), fast_config());
    let raw = client.send(payload("openai", "gpt-5")).await.unwrap();

    assert_eq!(raw.body_bytes(), bytes.as_slice());
    assert!(raw.body.contains('\u{fffd}'));
    assert_eq!(RawResponse::new(200, "plain").body_bytes(), b"plain");
}

#[tokio::test]
async fn test_three_timeouts_exhaust_retries() {
    let mut exchange = MockHttpExchange::new();
    exchange
        .expect_post()
        .times(3)
        .returning(|_| Err(ExchangeError::timeout("operation timed out")));

    let client = TransportClient::with_exchange(exchange, endpoints(), fast_config());
    let err = client.send(payload("openai", "gpt-5")).await.unwrap_err();

    assert_eq!(err.kind, TransportErrorKind::Timeout);
    assert_eq!(err.attempts, 3);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_send_counted_tracks_every_attempt() {
    let mut exchange = MockHttpExchange::new();
    exchange
        .expect_post()
        .times(2)
        .returning(|_| Err(ExchangeError::timeout("operation timed out")));

    let client = TransportClient::with_exchange(
        exchange,
        endpoints(),
        fast_config().with_max_attempts(2),
    );
    let attempts = std::sync::atomic::AtomicU32::new(0);
    let err = client
        .send_counted(payload("openai", "gpt-5"), &attempts)
        .await
        .unwrap_err();

    assert_eq!(err.attempts, 2);
    assert_eq!(attempts.load(std::sync::atomic::Ordering::Relaxed), 2);
}

#[test]
fn test_worst_case_covers_all_attempts() {
    let config = TransportConfig::default();
    assert_eq!(config.worst_case(), Duration::from_secs(3 * 600 + 2 * 30));

    let single = TransportConfig::default().with_max_attempts(1);
    assert_eq!(single.worst_case(), single.timeout);
}

#[tokio::test]
async fn test_server_error_then_success() {
    let mut exchange = MockHttpExchange::new();
    let mut seq = mockall::Sequence::new();
    exchange
        .expect_post()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(HttpReply::new(503, "upstream unavailable")));
    exchange
        .expect_post()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(HttpReply::new(200, "{}")));

    let client = TransportClient::with_exchange(exchange, endpoints(), fast_config());
    let raw = client.send(payload("google", "gemini-2.5-pro")).await.unwrap();

    assert_eq!(raw.status, 200);
    assert_eq!(raw.attempts, 2);
}

#[tokio::test]
async fn test_exhausted_server_errors_return_last_response() {
    let mut exchange = MockHttpExchange::new();
    exchange
        .expect_post()
        .times(3)
        .returning(|_| Ok(HttpReply::new(502, r#"{"error":{"message":"bad gateway"}}"#)));

    let client = TransportClient::with_exchange(exchange, endpoints(), fast_config());
    let raw = client.send(payload("openai", "gpt-5")).await.unwrap();

    assert_eq!(raw.status, 502);
    assert_eq!(raw.attempts, 3);
    assert!(raw.body.contains("bad gateway"));
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let mut exchange = MockHttpExchange::new();
    let mut seq = mockall::Sequence::new();
    exchange
        .expect_post()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(HttpReply::new(429, "slow down")));
    exchange
        .expect_post()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(HttpReply::new(200, "{}")));

    let client = TransportClient::with_exchange(exchange, endpoints(), fast_config());
    let raw = client.send(payload("openrouter", "openai/gpt-5")).await.unwrap();
    assert_eq!(raw.attempts, 2);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mut exchange = MockHttpExchange::new();
    exchange
        .expect_post()
        .times(1)
        .returning(|_| Ok(HttpReply::new(400, r#"{"error":{"message":"bad tool"}}"#)));

    let client = TransportClient::with_exchange(exchange, endpoints(), fast_config());
    let raw = client.send(payload("openai", "gpt-5")).await.unwrap();

    assert_eq!(raw.status, 400);
    assert_eq!(raw.attempts, 1);
}

#[tokio::test]
async fn test_non_transient_exchange_error_is_not_retried() {
    let mut exchange = MockHttpExchange::new();
    exchange
        .expect_post()
        .times(1)
        .returning(|_| Err(ExchangeError::other("error decoding response body")));

    let client = TransportClient::with_exchange(exchange, endpoints(), fast_config());
    let err = client.send(payload("openai", "gpt-5")).await.unwrap_err();

    assert_eq!(err.kind, TransportErrorKind::Other);
    assert_eq!(err.attempts, 1);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_openai_auth_and_url() {
    let mut exchange = MockHttpExchange::new();
    exchange
        .expect_post()
        .withf(|request| {
            request.url == "https://api.test/v1/responses"
                && request.header("authorization") == Some("Bearer sk-test-openai-key")
                && request.header("x-goog-api-key").is_none()
        })
        .times(1)
        .returning(|_| Ok(HttpReply::new(200, "{}")));

    let client = TransportClient::with_exchange(exchange, endpoints(), fast_config());
    client.send(payload("openai", "gpt-5")).await.unwrap();
}

#[tokio::test]
async fn test_gemini_auth_header() {
    let mut exchange = MockHttpExchange::new();
    exchange
        .expect_post()
        .withf(|request| {
            request.url == "https://gemini.test/v1beta/models/gemini-2.5-pro:generateContent"
                && request.header("x-goog-api-key") == Some("AIza-test-google-key")
                && request.header("authorization").is_none()
        })
        .times(1)
        .returning(|_| Ok(HttpReply::new(200, "{}")));

    let client = TransportClient::with_exchange(exchange, endpoints(), fast_config());
    client.send(payload("google", "gemini-2.5-pro")).await.unwrap();
}

#[tokio::test]
async fn test_openrouter_attribution_headers() {
    let mut exchange = MockHttpExchange::new();
    exchange
        .expect_post()
        .withf(|request| {
            request.url == "https://router.test/api/v1/chat/completions"
                && request.header("HTTP-Referer") == Some("https://promptforge.dev")
                && request.header("X-Title") == Some("PromptForge")
                && request.header("Authorization") == Some("Bearer sk-or-test-key-123")
        })
        .times(1)
        .returning(|_| Ok(HttpReply::new(200, "{}")));

    let client = TransportClient::with_exchange(exchange, endpoints(), fast_config());
    client.send(payload("openrouter", "openai/gpt-5")).await.unwrap();
}

#[tokio::test]
async fn test_missing_endpoint_makes_no_attempt() {
    let mut exchange = MockHttpExchange::new();
    exchange.expect_post().times(0);

    let client = TransportClient::with_exchange(exchange, Endpoints::default(), fast_config());
    let err = client.send(payload("openai", "gpt-5")).await.unwrap_err();

    assert_eq!(err.kind, TransportErrorKind::NotConfigured);
    assert_eq!(err.attempts, 0);
}

#[test]
fn test_endpoints_from_lookup() {
    let endpoints = Endpoints::from_lookup(|name| match name {
        "GEMINI_API_KEY" => Some("AIza-from-env-1234".to_string()),
        "OPENROUTER_API_KEY" => Some("sk-or-from-env-1234".to_string()),
        "OPENAI_API_KEY" => Some("  ".to_string()),
        _ => None,
    });

    assert!(endpoints.openai.is_none());
    assert_eq!(endpoints.configured(), vec!["google", "openrouter"]);
    let google = endpoints.get("gemini").unwrap();
    assert_eq!(google.base_url, config::GEMINI_BASE_URL);
    let openrouter = endpoints.get("openrouter").unwrap();
    assert_eq!(openrouter.app_name.as_deref(), Some(config::DEFAULT_APP_NAME));
}

#[test]
fn test_endpoint_debug_masks_key() {
    let endpoint = ProviderEndpoint::new("sk-1234567890abcdefghij", "https://api.test");
    let debug = format!("{endpoint:?}");
    assert!(debug.contains("sk-1...ghij"));
    assert!(!debug.contains("567890"));
}

#[test]
fn test_raw_response_redacts_secret_headers() {
    let raw = RawResponse::new(200, "{}").with_headers(vec![
        ("set-cookie".to_string(), "session=abc".to_string()),
        ("x-request-id".to_string(), "req_1".to_string()),
    ]);
    let redacted = raw.redacted_headers();
    assert_eq!(redacted[0].1, "[REDACTED]");
    assert_eq!(redacted[1].1, "req_1");
}
