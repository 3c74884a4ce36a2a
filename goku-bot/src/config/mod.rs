use crate::services::classifier::{KeywordTable, DEFAULT_ASSISTANT_NAMES};
use crate::services::detector::DetectionStrategy;
use crate::services::dispatcher::TranslationEngine;
use crate::services::rate_limiter::DEFAULT_CEILING;
use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";
const DEFAULT_MAX_INPUT_CHARS: usize = 4000;
/// Telegram caps messages at 4096 characters; the rest is room for labels.
const DEFAULT_MAX_CHUNK_CHARS: usize = 4000;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub telegram: TelegramSettings,
    pub gemini: GeminiSettings,
    pub translation: TranslationSettings,
    pub limits: LimitSettings,
    pub assistant_names: Vec<String>,
    pub keywords_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    pub token: Secret<String>,
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    pub api_key: Secret<String>,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranslationSettings {
    pub engine: TranslationEngine,
    pub detection: DetectionStrategy,
    /// Service-account JSON for the translation service. Optional.
    pub credentials_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitSettings {
    pub rate_limit_per_minute: u32,
    pub max_input_chars: usize,
    pub max_chunk_chars: usize,
}

impl BotConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_lookup(common, |key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_env = |key: &str, default: Option<&str>| -> Result<String, AppError> {
            match lookup(key).filter(|v| !v.trim().is_empty()) {
                Some(val) => Ok(val),
                None => default.map(str::to_string).ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!("{} is required but not set", key))
                }),
            }
        };

        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let assistant_names = match optional("ASSISTANT_NAMES") {
            Some(raw) => raw
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
            None => DEFAULT_ASSISTANT_NAMES.iter().map(|n| n.to_string()).collect(),
        };

        Ok(BotConfig {
            common,
            telegram: TelegramSettings {
                token: Secret::new(get_env("TELEGRAM_BOT_TOKEN", None)?),
                poll_timeout_secs: parse(
                    "POLL_TIMEOUT_SECS",
                    &get_env("POLL_TIMEOUT_SECS", Some(&DEFAULT_POLL_TIMEOUT_SECS.to_string()))?,
                )?,
            },
            gemini: GeminiSettings {
                api_key: Secret::new(get_env("GOOGLE_API_KEY", None)?),
                model: get_env("GEMINI_MODEL", Some(DEFAULT_GEMINI_MODEL))?,
            },
            translation: TranslationSettings {
                engine: parse("TRANSLATION_ENGINE", &get_env("TRANSLATION_ENGINE", Some("gemini"))?)?,
                detection: parse("LANGUAGE_DETECTION", &get_env("LANGUAGE_DETECTION", Some("gemini"))?)?,
                credentials_path: optional("GOOGLE_APPLICATION_CREDENTIALS").map(PathBuf::from),
            },
            limits: LimitSettings {
                rate_limit_per_minute: parse(
                    "RATE_LIMIT_PER_MINUTE",
                    &get_env("RATE_LIMIT_PER_MINUTE", Some(&DEFAULT_CEILING.to_string()))?,
                )?,
                max_input_chars: parse(
                    "MAX_INPUT_CHARS",
                    &get_env("MAX_INPUT_CHARS", Some(&DEFAULT_MAX_INPUT_CHARS.to_string()))?,
                )?,
                max_chunk_chars: parse(
                    "MAX_CHUNK_CHARS",
                    &get_env("MAX_CHUNK_CHARS", Some(&DEFAULT_MAX_CHUNK_CHARS.to_string()))?,
                )?,
            },
            assistant_names,
            keywords_file: optional("KEYWORDS_FILE").map(PathBuf::from),
        })
    }

    /// Keyword table from `KEYWORDS_FILE`, or the built-in one.
    pub fn keyword_table(&self) -> Result<KeywordTable, AppError> {
        match &self.keywords_file {
            Some(path) => KeywordTable::from_json_file(path).map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "Failed to load keywords from {}: {}",
                    path.display(),
                    e
                ))
            }),
            None => Ok(KeywordTable::builtin()),
        }
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has an invalid value '{}': {}", key, raw, e))
    })
}
