//! Shared helpers for integration tests.
#![allow(dead_code)]

use goku_bot::config::BotConfig;
use goku_bot::handlers::MessagePipeline;
use goku_bot::services::detector;
use goku_bot::services::providers::mock::{MockTextProvider, MockTranslationBackend};
use goku_bot::services::providers::{Generation, TextProvider, TranslationBackend};
use goku_bot::startup::build_pipeline;
use service_core::config::Config;
use std::collections::HashMap;
use std::sync::Arc;

pub const ARABIC_TRANSLATION: &str = "مرحبا، كيف حالك؟";
pub const FRENCH_TRANSLATION: &str = "Bonjour, comment vas-tu ?";

/// Config with the required variables set, plus `overrides`.
pub fn test_config(overrides: &[(&str, &str)]) -> BotConfig {
    let mut vars: HashMap<String, String> = [
        ("TELEGRAM_BOT_TOKEN", "123456:test-token"),
        ("GOOGLE_API_KEY", "test-api-key"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    BotConfig::from_lookup(Config { port: 0 }, |key| vars.get(key).cloned())
        .expect("test config should load")
}

/// Gemini stand-in: labels languages with the heuristic, translates to fixed
/// strings and answers questions with an HTML-escaped sentence.
pub fn scripted_gemini() -> Arc<MockTextProvider> {
    Arc::new(MockTextProvider::new(|prompt| {
        if prompt.starts_with("Identify the language") {
            let text = prompt.rsplit("Text:\n").next().unwrap_or(prompt);
            return Ok(Generation::PlainText(
                detector::heuristic(text).as_str().to_string(),
            ));
        }

        if prompt.contains("French-to-Arabic translator") {
            return Ok(Generation::StructuredParts(vec![
                "مرحبا، ".to_string(),
                "كيف حالك؟".to_string(),
            ]));
        }

        if prompt.contains("Arabic-to-French translator") {
            return Ok(Generation::PlainText(FRENCH_TRANSLATION.to_string()));
        }

        Ok(Generation::PlainText("It&#39;s a systems language &amp; more.".to_string()))
    }))
}

pub struct TestPipeline {
    pub pipeline: MessagePipeline,
    pub gemini: Arc<MockTextProvider>,
    pub translator: Arc<MockTranslationBackend>,
}

/// Pipeline over mock backends.
pub fn spawn_pipeline(
    overrides: &[(&str, &str)],
    gemini: Arc<MockTextProvider>,
    translator: Arc<MockTranslationBackend>,
) -> TestPipeline {
    let config = test_config(overrides);
    let text_provider: Arc<dyn TextProvider> = gemini.clone();
    let translation_backend: Arc<dyn TranslationBackend> = translator.clone();

    let pipeline = build_pipeline(&config, Some(text_provider), Some(translation_backend))
        .expect("pipeline should build");

    TestPipeline {
        pipeline,
        gemini,
        translator,
    }
}

pub fn default_pipeline() -> TestPipeline {
    spawn_pipeline(
        &[],
        scripted_gemini(),
        Arc::new(MockTranslationBackend::new()),
    )
}
