//! Mock provider implementations for testing.

use super::{Generation, GenerationParams, ProviderError, TextProvider, TranslationBackend};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

type Responder = dyn Fn(&str) -> Result<Generation, ProviderError> + Send + Sync;

/// Mock text provider for testing. Records every prompt it receives.
pub struct MockTextProvider {
    responder: Box<Responder>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockTextProvider {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<Generation, ProviderError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with the same text.
    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(Generation::PlainText(text.clone())))
    }

    /// Always fails with a network error.
    pub fn failing() -> Self {
        Self::new(|_| Err(ProviderError::NetworkError("mock backend down".to_string())))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<Generation, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(prompt.to_string());

        (self.responder)(prompt)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Mock translation backend that tags text with the target code.
pub struct MockTranslationBackend {
    fail: bool,
    calls: AtomicUsize,
}

impl MockTranslationBackend {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockTranslationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationBackend for MockTranslationBackend {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(ProviderError::ApiError("mock translation failure".to_string()));
        }

        Ok(format!("[{}->{}] {}", source_lang, target_lang, text))
    }

    async fn detect_language(&self, text: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(ProviderError::ApiError("mock detection failure".to_string()));
        }

        let arabic = text.chars().any(|c| ('\u{0600}'..='\u{06FF}').contains(&c));
        Ok(if arabic { "ar" } else { "fr" }.to_string())
    }
}
