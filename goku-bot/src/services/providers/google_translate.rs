//! Google Cloud Translation (v2) backend.
//!
//! Authenticates with a service-account key file: a signed RS256 assertion
//! is exchanged for an OAuth access token, cached until shortly before it
//! expires.

use super::{ProviderError, TranslationBackend};
use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

/// Translation API base URL.
pub const TRANSLATE_API_BASE: &str = "https://translation.googleapis.com/language/translate/v2";

const TOKEN_SCOPE: &str = "https://www.googleapis.com/auth/cloud-translation";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: u64 = 3600;
/// Refresh this long before the token actually expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// The fields of a service-account JSON key that the backend needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: Secret<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, ProviderError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::NotConfigured(format!(
                "Cannot read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            ProviderError::NotConfigured(format!(
                "Invalid credentials file {}: {}",
                path.display(),
                e
            ))
        })
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

struct CachedToken {
    value: Secret<String>,
    expires_at: Instant,
}

/// Google Cloud Translation client.
pub struct GoogleTranslateBackend {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    base_url: String,
    client: Client,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleTranslateBackend {
    /// Load credentials from the service-account file at `path`.
    pub fn from_credentials_file(path: &Path) -> Result<Self, ProviderError> {
        Self::new(ServiceAccountKey::from_file(path)?, TRANSLATE_API_BASE)
    }

    pub fn new(key: ServiceAccountKey, base_url: &str) -> Result<Self, ProviderError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.expose_secret().as_bytes())
            .map_err(|e| ProviderError::NotConfigured(format!("Invalid private key: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            key,
            encoding_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: Mutex::new(None),
        })
    }

    fn signed_assertion(&self) -> Result<String, ProviderError> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: TOKEN_SCOPE,
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| ProviderError::Auth(format!("Failed to sign assertion: {}", e)))
    }

    /// Return a valid access token, exchanging a fresh assertion when needed.
    async fn access_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.expose_secret().clone());
            }
        }

        let assertion = self.signed_assertion()?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Auth(format!(
                "Token exchange failed {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Auth(format!("Failed to parse token response: {}", e)))?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        let value = token.access_token;
        *cached = Some(CachedToken {
            value: Secret::new(value.clone()),
            expires_at: Instant::now() + lifetime,
        });

        tracing::debug!(lifetime_secs = lifetime.as_secs(), "Refreshed translation access token");

        Ok(value)
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<R, ProviderError> {
        let token = self.access_token().await?;

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Translation API error {}: {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslateBackend {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        let request = TranslateRequest {
            q: text,
            source: source_lang,
            target: target_lang,
            format: "text",
        };

        let response: ApiEnvelope<TranslationsData> = self.post(&self.base_url, &request).await?;

        response
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| ProviderError::ApiError("No translations in response".to_string()))
    }

    async fn detect_language(&self, text: &str) -> Result<String, ProviderError> {
        let url = format!("{}/detect", self.base_url);
        let response: ApiEnvelope<DetectionsData> = self.post(&url, &DetectRequest { q: text }).await?;

        response
            .data
            .detections
            .into_iter()
            .flatten()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .map(|d| d.language)
            .ok_or_else(|| ProviderError::ApiError("No detections in response".to_string()))
    }
}

// ============================================================================
// Translation API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct TranslationsData {
    #[serde(default)]
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedText {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct DetectionsData {
    #[serde(default)]
    detections: Vec<Vec<Detection>>,
}

#[derive(Debug, Deserialize)]
struct Detection {
    language: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}
