//! Application startup and lifecycle management.
//!
//! Wires the providers and services into the message pipeline, validates the
//! bot token, then runs the health server next to the polling loop.

use crate::config::BotConfig;
use crate::handlers::{health, MessagePipeline, PipelineLimits, UpdateHandler};
use crate::services::classifier::IntentClassifier;
use crate::services::detector::LanguageDetector;
use crate::services::dispatcher::TranslationDispatcher;
use crate::services::metrics;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::google_translate::GoogleTranslateBackend;
use crate::services::providers::{TextProvider, TranslationBackend};
use crate::services::rate_limiter::RateLimiter;
use crate::services::telegram::{TelegramClient, TelegramConfig};
use crate::services::usage::UsageTracker;
use service_core::error::AppError;
use service_core::retry::{retry_async, RetryConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Pause before the single startup retry of `getMe`.
const STARTUP_RETRY_BACKOFF: Duration = Duration::from_secs(5);

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    handler: UpdateHandler,
    poll_timeout_secs: u64,
}

impl Application {
    /// Build the application with the real backends.
    pub async fn build(config: BotConfig) -> Result<Self, AppError> {
        let gemini = GeminiTextProvider::new(GeminiConfig::new(
            config.gemini.api_key.clone(),
            config.gemini.model.clone(),
        ))
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Gemini provider: {}", e)))?;
        let text_provider: Arc<dyn TextProvider> = Arc::new(gemini);

        match text_provider.health_check().await {
            Ok(()) => tracing::info!(model = %config.gemini.model, "Initialized Gemini text provider"),
            Err(e) => tracing::warn!(model = %config.gemini.model, error = %e, "Gemini health check failed"),
        }

        let translation_backend: Option<Arc<dyn TranslationBackend>> =
            match &config.translation.credentials_path {
                Some(path) => match GoogleTranslateBackend::from_credentials_file(path) {
                    Ok(backend) => {
                        tracing::info!("Initialized Google translation backend");
                        Some(Arc::new(backend))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Google translation backend unavailable");
                        None
                    }
                },
                None => {
                    tracing::info!("GOOGLE_APPLICATION_CREDENTIALS not set, translation service disabled");
                    None
                }
            };

        let telegram = TelegramClient::new(TelegramConfig::new(config.telegram.token.clone()))
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Telegram client: {}", e)))?;

        Self::build_with_providers(
            config,
            telegram,
            Some(text_provider),
            translation_backend,
            RetryConfig::once(STARTUP_RETRY_BACKOFF),
        )
        .await
    }

    /// Build with injected collaborators. Validates the token with `getMe`.
    pub async fn build_with_providers(
        config: BotConfig,
        telegram: TelegramClient,
        text_provider: Option<Arc<dyn TextProvider>>,
        translation_backend: Option<Arc<dyn TranslationBackend>>,
        startup_retry: RetryConfig,
    ) -> Result<Self, AppError> {
        metrics::init_metrics();

        let me = retry_async(&startup_retry, "telegram_get_me", || telegram.get_me())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Telegram token validation failed");
                AppError::BadGateway(format!("Telegram getMe failed: {}", e))
            })?;

        tracing::info!(
            bot_id = me.id,
            username = me.username.as_deref().unwrap_or("-"),
            "Connected to Telegram"
        );

        let pipeline = build_pipeline(&config, text_provider, translation_backend)?;
        let handler = UpdateHandler::new(telegram, Arc::new(pipeline));

        // Port 0 picks a random port for tests
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Goku bot: health endpoint on port {}", port);

        Ok(Self {
            port,
            listener,
            handler,
            poll_timeout_secs: config.telegram.poll_timeout_secs,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the health server and the polling loop until either stops.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let polling = self.handler.run_polling(self.poll_timeout_secs);

        tokio::select! {
            result = axum::serve(self.listener, health::router()) => {
                if let Err(e) = result {
                    tracing::error!("HTTP server error: {}", e);
                    return Err(std::io::Error::other(format!("HTTP server error: {}", e)));
                }
            }
            _ = polling => {
                tracing::warn!("Polling loop exited");
            }
        }

        Ok(())
    }
}

/// Assemble the message pipeline from configuration and backends.
pub fn build_pipeline(
    config: &BotConfig,
    text_provider: Option<Arc<dyn TextProvider>>,
    translation_backend: Option<Arc<dyn TranslationBackend>>,
) -> Result<MessagePipeline, AppError> {
    let keywords = config.keyword_table()?;
    tracing::info!(
        keywords = keywords.len(),
        names = config.assistant_names.len(),
        "Loaded intent keywords"
    );

    let usage = UsageTracker::new();
    let classifier = IntentClassifier::new(config.assistant_names.clone(), keywords);
    let detector = LanguageDetector::new(
        config.translation.detection,
        text_provider.clone(),
        translation_backend.clone(),
    );
    let dispatcher = TranslationDispatcher::new(
        config.translation.engine,
        text_provider.clone(),
        translation_backend,
        usage.clone(),
    );

    Ok(MessagePipeline::new(
        classifier,
        detector,
        dispatcher,
        text_provider,
        RateLimiter::new(config.limits.rate_limit_per_minute),
        usage,
        PipelineLimits {
            max_input_chars: config.limits.max_input_chars,
            max_chunk_chars: config.limits.max_chunk_chars,
        },
    ))
}
