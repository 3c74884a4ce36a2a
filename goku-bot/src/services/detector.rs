//! Language detection.
//!
//! The primary path asks a backend for a single label. Any failure drops to a
//! character-class heuristic, so `detect` always returns a value.

use super::metrics;
use super::providers::{GenerationParams, TextProvider, TranslationBackend};
use super::text::truncate_for_log;
use crate::models::DetectedLanguage;
use serde::Deserialize;
use std::sync::Arc;

/// Longest input sent to a backend for classification.
const MAX_DETECTION_SAMPLE_CHARS: usize = 500;

/// Which backend, if any, is asked before the heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionStrategy {
    /// Constrained classification prompt to the generative model.
    Gemini,
    /// `detect` call on the translation service.
    Google,
    /// Character counting only.
    Heuristic,
}

impl std::str::FromStr for DetectionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "ai" | "true" => Ok(Self::Gemini),
            "google" => Ok(Self::Google),
            "heuristic" | "false" => Ok(Self::Heuristic),
            other => Err(format!("unknown detection strategy '{}'", other)),
        }
    }
}

/// Label tokens in several scripts and spellings, checked in order.
const LABEL_TOKENS: &[(DetectedLanguage, &[&str])] = &[
    (DetectedLanguage::Mixed, &["mixed", "mixte", "مختلط", "مزيج"]),
    (DetectedLanguage::Unknown, &["unknown", "inconnu", "غير معروف"]),
    (DetectedLanguage::Arabic, &["arabic", "arabe", "عرب"]),
    (DetectedLanguage::French, &["french", "français", "francais", "فرنس"]),
    (DetectedLanguage::English, &["english", "anglais", "نجليز", "إنكليز"]),
];

pub struct LanguageDetector {
    strategy: DetectionStrategy,
    text_provider: Option<Arc<dyn TextProvider>>,
    translation_backend: Option<Arc<dyn TranslationBackend>>,
}

impl LanguageDetector {
    pub fn new(
        strategy: DetectionStrategy,
        text_provider: Option<Arc<dyn TextProvider>>,
        translation_backend: Option<Arc<dyn TranslationBackend>>,
    ) -> Self {
        Self {
            strategy,
            text_provider,
            translation_backend,
        }
    }

    /// Detector that never calls a backend.
    pub fn heuristic_only() -> Self {
        Self::new(DetectionStrategy::Heuristic, None, None)
    }

    /// Classify `text`. Never fails.
    pub async fn detect(&self, text: &str) -> DetectedLanguage {
        let primary = match self.strategy {
            DetectionStrategy::Gemini => self.detect_with_model(text).await,
            DetectionStrategy::Google => self.detect_with_translation_service(text).await,
            DetectionStrategy::Heuristic => None,
        };

        match primary {
            Some(lang) => lang,
            None => {
                let lang = heuristic(text);
                tracing::debug!(language = %lang, "Heuristic language detection");
                lang
            }
        }
    }

    async fn detect_with_model(&self, text: &str) -> Option<DetectedLanguage> {
        let provider = self.text_provider.as_ref()?;
        let params = GenerationParams {
            temperature: Some(0.0),
            max_tokens: Some(5),
        };

        match provider.generate(&detection_prompt(text), &params).await {
            Ok(generation) => {
                metrics::record_backend_call("gemini_detect", "ok");
                let reply = generation.into_text();
                if reply.trim().is_empty() {
                    tracing::warn!("Empty language label from model, using heuristic");
                    return None;
                }
                let lang = normalize_label(&reply);
                tracing::debug!(language = %lang, raw = %truncate_for_log(&reply, 40), "Model language detection");
                Some(lang)
            }
            Err(e) => {
                metrics::record_backend_call("gemini_detect", "error");
                tracing::warn!(error = %truncate_for_log(&e.to_string(), 200), "Model language detection failed, using heuristic");
                None
            }
        }
    }

    async fn detect_with_translation_service(&self, text: &str) -> Option<DetectedLanguage> {
        let backend = self.translation_backend.as_ref()?;

        match backend.detect_language(&sample(text)).await {
            Ok(code) => {
                metrics::record_backend_call("google_detect", "ok");
                Some(from_language_code(&code))
            }
            Err(e) => {
                metrics::record_backend_call("google_detect", "error");
                tracing::warn!(error = %truncate_for_log(&e.to_string(), 200), "Translation service detection failed, using heuristic");
                None
            }
        }
    }
}

fn sample(text: &str) -> String {
    text.chars().take(MAX_DETECTION_SAMPLE_CHARS).collect()
}

fn detection_prompt(text: &str) -> String {
    format!(
        "Identify the language of the text below. Answer with exactly one word from this list \
         and nothing else: arabic, french, english, mixed, other.\n\
         Use \"arabic\" for Modern Standard Arabic and Arabic dialects written in Arabic script, \
         \"mixed\" when several languages are combined.\n\nText:\n{}",
        sample(text)
    )
}

/// Map a free-form model reply onto a label by substring matching.
pub fn normalize_label(reply: &str) -> DetectedLanguage {
    let lowered = reply.trim().to_lowercase();

    LABEL_TOKENS
        .iter()
        .find(|(_, tokens)| tokens.iter().any(|token| lowered.contains(token)))
        .map(|(lang, _)| *lang)
        .unwrap_or(DetectedLanguage::Other)
}

fn from_language_code(code: &str) -> DetectedLanguage {
    match code.trim().to_lowercase().as_str() {
        "ar" => DetectedLanguage::Arabic,
        "fr" => DetectedLanguage::French,
        "en" => DetectedLanguage::English,
        "und" | "" => DetectedLanguage::Unknown,
        _ => DetectedLanguage::Other,
    }
}

fn is_arabic(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06FF}'
        | '\u{0750}'..='\u{077F}'
        | '\u{08A0}'..='\u{08FF}'
        | '\u{FB50}'..='\u{FDFF}'
        | '\u{FE70}'..='\u{FEFC}')
}

fn is_latin(c: char) -> bool {
    c.is_ascii_alphabetic() || (matches!(c, '\u{00C0}'..='\u{024F}') && c != '×' && c != '÷')
}

/// Count Arabic against Latin characters. Latin majority reads as French.
pub fn heuristic(text: &str) -> DetectedLanguage {
    let (arabic, latin) = text.chars().fold((0usize, 0usize), |(a, l), c| {
        if is_arabic(c) {
            (a + 1, l)
        } else if is_latin(c) {
            (a, l + 1)
        } else {
            (a, l)
        }
    });

    match arabic.cmp(&latin) {
        std::cmp::Ordering::Greater => DetectedLanguage::Arabic,
        std::cmp::Ordering::Less => DetectedLanguage::French,
        std::cmp::Ordering::Equal => DetectedLanguage::Unknown,
    }
}
