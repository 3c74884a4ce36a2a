pub mod intent;
pub mod language;
pub mod reply;
pub mod session;

pub use intent::Classification;
pub use language::{DetectedLanguage, Direction, Language, TranslationJob, UNDETERMINED_LABEL};
pub use reply::Reply;
pub use session::{RateWindow, UserSession};

/// Opaque user identifier assigned by the messaging platform.
pub type UserId = i64;
