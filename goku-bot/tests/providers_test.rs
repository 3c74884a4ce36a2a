//! Gemini and Google Translation providers against mock HTTP servers.

use goku_bot::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use goku_bot::services::providers::google_translate::{GoogleTranslateBackend, ServiceAccountKey};
use goku_bot::services::providers::{Generation, GenerationParams, ProviderError, TextProvider, TranslationBackend};
use secrecy::Secret;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL: &str = "gemini-2.5-flash-lite";
const TEST_KEY_PEM: &str = include_str!("fixtures/test_rsa_key.pem");

fn gemini_for(server: &MockServer) -> GeminiTextProvider {
    let mut config = GeminiConfig::new(Secret::new("test-api-key".to_string()), MODEL);
    config.base_url = server.uri();
    GeminiTextProvider::new(config).unwrap()
}

fn generate_path() -> String {
    format!("/models/{}:generateContent", MODEL)
}

#[tokio::test]
async fn gemini_single_part_is_plain_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(header("x-goog-api-key", "test-api-key"))
        .and(body_partial_json(json!({ "generationConfig": { "maxOutputTokens": 5 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "french" }] },
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let params = GenerationParams {
        temperature: Some(0.0),
        max_tokens: Some(5),
    };
    let generation = gemini_for(&server).generate("Bonjour", &params).await.unwrap();

    assert_eq!(generation, Generation::PlainText("french".to_string()));
}

#[tokio::test]
async fn gemini_multiple_parts_are_structured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "مرحبا، " }, { "text": "كيف حالك؟" }] }
            }]
        })))
        .mount(&server)
        .await;

    let generation = gemini_for(&server)
        .generate("Bonjour", &GenerationParams::default())
        .await
        .unwrap();

    assert_eq!(
        generation,
        Generation::StructuredParts(vec!["مرحبا، ".to_string(), "كيف حالك؟".to_string()])
    );
    assert_eq!(generation.into_text(), "مرحبا، كيف حالك؟");
}

#[tokio::test]
async fn gemini_rate_limit_and_safety_are_distinguished() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(body_string_contains("limited"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(body_string_contains("blocked"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [],
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(generate_path()))
        .and(body_string_contains("empty"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let provider = gemini_for(&server);
    let params = GenerationParams::default();

    assert!(matches!(
        provider.generate("limited", &params).await,
        Err(ProviderError::RateLimited)
    ));
    assert!(matches!(
        provider.generate("blocked", &params).await,
        Err(ProviderError::ContentFiltered)
    ));
    assert!(matches!(
        provider.generate("empty", &params).await,
        Err(ProviderError::ApiError(_))
    ));
}

fn translate_backend_for(server: &MockServer) -> GoogleTranslateBackend {
    let key = ServiceAccountKey {
        client_email: "goku@test-project.iam.gserviceaccount.com".to_string(),
        private_key: Secret::new(TEST_KEY_PEM.to_string()),
        token_uri: format!("{}/token", server.uri()),
    };
    GoogleTranslateBackend::new(key, &format!("{}/language/translate/v2", server.uri())).unwrap()
}

async fn mount_token(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.test-token",
            "expires_in": 3600,
            "token_type": "Bearer"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn google_translate_exchanges_token_once_and_translates() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/language/translate/v2"))
        .and(header("authorization", "Bearer ya29.test-token"))
        .and(body_partial_json(json!({ "q": "Bonjour", "source": "fr", "target": "ar", "format": "text" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "translations": [{ "translatedText": "مرحبا" }] }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let backend = translate_backend_for(&server);

    assert_eq!(backend.translate("Bonjour", "fr", "ar").await.unwrap(), "مرحبا");
    // Second call reuses the cached token
    assert_eq!(backend.translate("Bonjour", "fr", "ar").await.unwrap(), "مرحبا");
}

#[tokio::test]
async fn google_detect_picks_most_confident_language() {
    let server = MockServer::start().await;
    mount_token(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/language/translate/v2/detect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "detections": [[
                { "language": "fr", "confidence": 0.4 },
                { "language": "ar", "confidence": 0.9 }
            ]] }
        })))
        .mount(&server)
        .await;

    let backend = translate_backend_for(&server);

    assert_eq!(backend.detect_language("مرحبا").await.unwrap(), "ar");
}

#[tokio::test]
async fn google_token_failure_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })))
        .mount(&server)
        .await;

    let backend = translate_backend_for(&server);

    assert!(matches!(
        backend.translate("Bonjour", "fr", "ar").await,
        Err(ProviderError::Auth(_))
    ));
}

#[test]
fn invalid_private_key_is_not_configured() {
    let key = ServiceAccountKey {
        client_email: "goku@test-project.iam.gserviceaccount.com".to_string(),
        private_key: Secret::new("not a pem".to_string()),
        token_uri: "http://localhost/token".to_string(),
    };

    assert!(matches!(
        GoogleTranslateBackend::new(key, "http://localhost"),
        Err(ProviderError::NotConfigured(_))
    ));
}
