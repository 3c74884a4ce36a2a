//! Per-message pipeline: rate limit, classify, then answer or translate.
//!
//! Transport-independent; the update loop hands in text and gets a [`Reply`].

use crate::models::{Classification, Reply, UserId};
use crate::services::classifier::{IntentClassifier, CREATOR_REPLY};
use crate::services::detector::LanguageDetector;
use crate::services::dispatcher::TranslationDispatcher;
use crate::services::formatter;
use crate::services::metrics;
use crate::services::providers::{GenerationParams, TextProvider};
use crate::services::rate_limiter::{RateLimited, RateLimiter};
use crate::services::text::{truncate_for_log, unescape_entities};
use crate::services::usage::UsageTracker;
use std::sync::Arc;
use std::time::Duration;

pub const AI_FAILURE_REPLY: &str = "❌ لم أتمكن من الإجابة حالياً.";

#[derive(Debug, Clone, Copy)]
pub struct PipelineLimits {
    pub max_input_chars: usize,
    pub max_chunk_chars: usize,
}

impl Default for PipelineLimits {
    fn default() -> Self {
        Self {
            max_input_chars: 4000,
            max_chunk_chars: 4000,
        }
    }
}

pub struct MessagePipeline {
    classifier: IntentClassifier,
    detector: LanguageDetector,
    dispatcher: TranslationDispatcher,
    text_provider: Option<Arc<dyn TextProvider>>,
    rate_limiter: RateLimiter,
    usage: UsageTracker,
    limits: PipelineLimits,
}

impl MessagePipeline {
    pub fn new(
        classifier: IntentClassifier,
        detector: LanguageDetector,
        dispatcher: TranslationDispatcher,
        text_provider: Option<Arc<dyn TextProvider>>,
        rate_limiter: RateLimiter,
        usage: UsageTracker,
        limits: PipelineLimits,
    ) -> Self {
        Self {
            classifier,
            detector,
            dispatcher,
            text_provider,
            rate_limiter,
            usage,
            limits,
        }
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    /// Handle one text message from `user_id`.
    pub async fn handle_text(&self, user_id: UserId, display_name: &str, text: &str) -> Reply {
        let guarded = self
            .rate_limiter
            .guard(user_id, || self.process(user_id, display_name, text))
            .await;

        match guarded {
            Ok(reply) => reply,
            Err(RateLimited { retry_after }) => {
                metrics::record_rate_limited();
                tracing::info!(user_id, retry_after_secs = retry_after.as_secs(), "Rate limited");
                Reply::text(rate_limit_message(retry_after))
            }
        }
    }

    async fn process(&self, user_id: UserId, display_name: &str, text: &str) -> Reply {
        let length = text.chars().count();
        if length > self.limits.max_input_chars {
            metrics::record_message("too_long");
            tracing::info!(user_id, length, "Input too long");
            return Reply::text(format!(
                "⚠️ النص طويل جداً ({} حرف). الحد الأقصى هو {} حرف.",
                length, self.limits.max_input_chars
            ));
        }

        let classification = self.classifier.classify(text, display_name);
        metrics::record_message(classification.kind());
        tracing::debug!(user_id, kind = classification.kind(), "Classified message");

        match classification {
            Classification::CreatorQuestion => Reply::text(CREATOR_REPLY),
            Classification::Greeting(reply) => Reply::text(reply).with_keyboard(),
            Classification::AiQuestion(question) => self.answer(user_id, &question).await,
            Classification::TranslationRequest(source) => self.translate(user_id, &source).await,
        }
    }

    async fn answer(&self, user_id: UserId, question: &str) -> Reply {
        let Some(provider) = self.text_provider.as_ref() else {
            tracing::warn!(user_id, "Question received but no generative backend is configured");
            return Reply::text(AI_FAILURE_REPLY);
        };

        match provider.generate(question, &GenerationParams::default()).await {
            Ok(generation) => {
                metrics::record_backend_call("gemini_answer", "ok");
                let answer = unescape_entities(generation.into_text().trim());
                if answer.trim().is_empty() {
                    tracing::warn!(user_id, "Empty answer from generative backend");
                    return Reply::text(AI_FAILURE_REPLY);
                }
                Reply::chunks(formatter::format(&answer, "", self.limits.max_chunk_chars))
            }
            Err(e) => {
                metrics::record_backend_call("gemini_answer", "error");
                tracing::error!(user_id, error = %truncate_for_log(&e.to_string(), 200), "Gemini answer failed");
                Reply::text(AI_FAILURE_REPLY)
            }
        }
    }

    async fn translate(&self, user_id: UserId, source: &str) -> Reply {
        let detected = self.detector.detect(source).await;
        let outcome = self.dispatcher.translate(source, detected, user_id).await;
        let (text, label) = outcome.text_and_label();

        Reply::chunks(formatter::format(&text, &label, self.limits.max_chunk_chars))
    }
}

fn rate_limit_message(retry_after: Duration) -> String {
    let secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
    format!(
        "⏳ لقد أرسلت رسائل كثيرة. يرجى الانتظار {} ثانية ثم المحاولة مجدداً.",
        secs
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_message_rounds_up() {
        assert!(rate_limit_message(Duration::from_millis(1500)).contains(" 2 "));
        assert!(rate_limit_message(Duration::ZERO).contains(" 1 "));
        assert!(rate_limit_message(Duration::from_secs(60)).contains(" 60 "));
    }
}
