//! AI backend abstractions and implementations.
//!
//! Two boundaries: a generative model (`TextProvider`, Gemini) and a
//! dedicated machine-translation service (`TranslationBackend`, Google Cloud
//! Translation). Mocks live alongside for tests.

pub mod gemini;
pub mod google_translate;
pub mod mock;

use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Output of a generative call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// A single text part.
    PlainText(String),

    /// Several text parts, in the order the model produced them.
    StructuredParts(Vec<String>),
}

impl Generation {
    /// Normalize to plain text; parts are concatenated in order.
    pub fn into_text(self) -> String {
        match self {
            Generation::PlainText(text) => text,
            Generation::StructuredParts(parts) => parts.concat(),
        }
    }
}

/// Generation parameters for AI requests.
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    /// Temperature (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Maximum output tokens.
    pub max_tokens: Option<i32>,
}

/// Trait for text generation providers (e.g., Gemini).
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate a response for a single prompt.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Generation, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Trait for machine-translation services.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate `text` between two ISO 639-1 codes.
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError>;

    /// Detect the language of `text`, returning an ISO 639-1 code.
    async fn detect_language(&self, text: &str) -> Result<String, ProviderError>;
}
