//! Translation dispatch.
//!
//! Resolves a direction from the detected language, calls the configured
//! backend, post-processes the output and records usage on success.

use super::metrics;
use super::providers::{GenerationParams, ProviderError, TextProvider, TranslationBackend};
use super::text::{truncate_for_log, unescape_entities};
use super::usage::UsageTracker;
use crate::models::{DetectedLanguage, Direction, Language, TranslationJob, UserId, UNDETERMINED_LABEL};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Which backend performs translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationEngine {
    /// Prompted translation through the generative model.
    Gemini,
    /// Dedicated machine-translation service.
    Google,
}

impl TranslationEngine {
    fn backend_name(&self) -> &'static str {
        match self {
            TranslationEngine::Gemini => "gemini_translate",
            TranslationEngine::Google => "google_translate",
        }
    }
}

impl std::str::FromStr for TranslationEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "google" => Ok(Self::Google),
            other => Err(format!("unknown translation engine '{}'", other)),
        }
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no translation direction for {0} input")]
    UnsupportedDirection(DetectedLanguage),

    #[error("translation backend unavailable")]
    BackendUnavailable,

    #[error("translation backend returned an empty result")]
    EmptyResult,

    #[error("translation backend error: {0}")]
    BackendError(String),
}

impl DispatchError {
    /// Short Arabic message shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            DispatchError::UnsupportedDirection(_) => {
                "⚠️ لم أتمكن من تحديد لغة النص. يرجى إعادة إرساله بالعربية أو الفرنسية."
            }
            DispatchError::BackendUnavailable => "⚠️ خدمة الترجمة غير متوفرة حالياً، حاول لاحقاً.",
            DispatchError::EmptyResult => "❌ لم أحصل على ترجمة، حاول مرة أخرى.",
            DispatchError::BackendError(_) => "❌ حدث خطأ في الترجمة، حاول مرة أخرى.",
        }
    }

    fn status(&self) -> &'static str {
        match self {
            DispatchError::UnsupportedDirection(_) => "undetermined",
            DispatchError::BackendUnavailable => "unavailable",
            DispatchError::EmptyResult => "empty",
            DispatchError::BackendError(_) => "error",
        }
    }
}

impl From<ProviderError> for DispatchError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(_) => DispatchError::BackendUnavailable,
            other => DispatchError::BackendError(truncate_for_log(&other.to_string(), 200)),
        }
    }
}

/// Result of one dispatch. Failures are values, never propagated.
#[derive(Debug)]
pub enum TranslationOutcome {
    Translated { text: String, direction: Direction },
    Failed(DispatchError),
}

impl TranslationOutcome {
    /// `(result text, direction label)`; failures carry the sentinel label.
    pub fn text_and_label(&self) -> (String, String) {
        match self {
            TranslationOutcome::Translated { text, direction } => (text.clone(), direction.label()),
            TranslationOutcome::Failed(err) => {
                (err.user_message().to_string(), UNDETERMINED_LABEL.to_string())
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TranslationOutcome::Translated { .. })
    }
}

pub struct TranslationDispatcher {
    engine: TranslationEngine,
    text_provider: Option<Arc<dyn TextProvider>>,
    translation_backend: Option<Arc<dyn TranslationBackend>>,
    usage: UsageTracker,
}

impl TranslationDispatcher {
    pub fn new(
        engine: TranslationEngine,
        text_provider: Option<Arc<dyn TextProvider>>,
        translation_backend: Option<Arc<dyn TranslationBackend>>,
        usage: UsageTracker,
    ) -> Self {
        Self {
            engine,
            text_provider,
            translation_backend,
            usage,
        }
    }

    /// Translate `text` according to `detected`, on behalf of `user_id`.
    pub async fn translate(
        &self,
        text: &str,
        detected: DetectedLanguage,
        user_id: UserId,
    ) -> TranslationOutcome {
        let Some(direction) = Direction::for_detected(detected) else {
            metrics::record_translation("none", "undetermined");
            tracing::info!(user_id, language = %detected, "Could not resolve translation direction");
            return TranslationOutcome::Failed(DispatchError::UnsupportedDirection(detected));
        };

        if matches!(detected, DetectedLanguage::English | DetectedLanguage::Mixed) {
            tracing::debug!(user_id, language = %detected, "Best-effort French to Arabic translation");
        }

        let job = TranslationJob {
            source_text: text.to_string(),
            direction,
            user_id,
        };

        match self.run(&job).await {
            Ok(translated) => {
                let chars = job.source_text.chars().count();
                self.usage.record(user_id, chars);
                metrics::record_translation(&direction.key(), "ok");
                tracing::info!(user_id, direction = %direction.key(), chars, "Translation succeeded");

                TranslationOutcome::Translated {
                    text: translated,
                    direction,
                }
            }
            Err(err) => {
                metrics::record_translation(&direction.key(), err.status());
                tracing::warn!(user_id, direction = %direction.key(), error = %err, "Translation failed");
                TranslationOutcome::Failed(err)
            }
        }
    }

    async fn run(&self, job: &TranslationJob) -> Result<String, DispatchError> {
        let backend = self.engine.backend_name();

        let raw = match self.engine {
            TranslationEngine::Gemini => {
                let provider = self
                    .text_provider
                    .as_ref()
                    .ok_or(DispatchError::BackendUnavailable)?;
                let params = GenerationParams {
                    temperature: Some(0.2),
                    max_tokens: None,
                };

                provider
                    .generate(&build_prompt(job.direction, &job.source_text), &params)
                    .await
                    .map(|generation| generation.into_text())
            }
            TranslationEngine::Google => {
                let service = self
                    .translation_backend
                    .as_ref()
                    .ok_or(DispatchError::BackendUnavailable)?;

                service
                    .translate(
                        &job.source_text,
                        job.direction.source.code(),
                        job.direction.target.code(),
                    )
                    .await
            }
        };

        let raw = raw.map_err(|e| {
            metrics::record_backend_call(backend, "error");
            DispatchError::from(e)
        })?;
        metrics::record_backend_call(backend, "ok");

        let cleaned = unescape_entities(raw.trim());
        if cleaned.trim().is_empty() {
            return Err(DispatchError::EmptyResult);
        }

        Ok(cleaned)
    }
}

/// Instruction for the generative model: fix, then translate, text only.
pub fn build_prompt(direction: Direction, text: &str) -> String {
    let source = direction.source.name();
    let target = direction.target.name();

    let role_note = match direction.source {
        Language::Arabic => {
            "The source may be Modern Standard Arabic or a Maghrebi dialect (Darija), \
             possibly mixed with French words."
        }
        Language::French => {
            "Write the translation in clear Modern Standard Arabic understood across North Africa."
        }
    };

    format!(
        "You are a professional {source}-to-{target} translator. {role_note}\n\
         1. Silently correct any spelling and grammar mistakes in the {source} text.\n\
         2. Translate the corrected text into {target}.\n\
         Rules:\n\
         - Keep proper names, numbers, dates and brand names exactly as written.\n\
         - Preserve the original tone and register.\n\
         - Return only the {target} translation, with no explanations, notes, quotes or transliteration.\n\n\
         Text:\n{text}"
    )
}
