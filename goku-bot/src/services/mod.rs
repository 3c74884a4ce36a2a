pub mod classifier;
pub mod detector;
pub mod dispatcher;
pub mod formatter;
pub mod metrics;
pub mod providers;
pub mod rate_limiter;
pub mod telegram;
pub mod text;
pub mod usage;

pub use classifier::{IntentClassifier, KeywordTable};
pub use detector::{DetectionStrategy, LanguageDetector};
pub use dispatcher::{DispatchError, TranslationDispatcher, TranslationEngine, TranslationOutcome};
pub use rate_limiter::{RateLimited, RateLimiter};
pub use telegram::{BotError, TelegramClient, TelegramConfig};
pub use usage::UsageTracker;
