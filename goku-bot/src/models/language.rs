//! Language labels and translation directions.

use super::UserId;
use serde::Serialize;
use std::fmt;

/// Label shown when no direction could be resolved.
pub const UNDETERMINED_LABEL: &str = "❓";

/// Outcome of language detection. Exactly one value per input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedLanguage {
    Arabic,
    French,
    English,
    Mixed,
    Other,
    Unknown,
}

impl DetectedLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectedLanguage::Arabic => "arabic",
            DetectedLanguage::French => "french",
            DetectedLanguage::English => "english",
            DetectedLanguage::Mixed => "mixed",
            DetectedLanguage::Other => "other",
            DetectedLanguage::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DetectedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A language the bot can translate from or into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Arabic,
    French,
}

impl Language {
    /// ISO 639-1 code, as expected by the translation backend.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::French => "fr",
        }
    }

    /// English name used inside model prompts.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Arabic => "Arabic",
            Language::French => "French",
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            Language::Arabic => "🇩🇿",
            Language::French => "🇫🇷",
        }
    }
}

/// Source and target of one translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    pub source: Language,
    pub target: Language,
}

impl Direction {
    pub const FRENCH_TO_ARABIC: Direction = Direction {
        source: Language::French,
        target: Language::Arabic,
    };

    pub const ARABIC_TO_FRENCH: Direction = Direction {
        source: Language::Arabic,
        target: Language::French,
    };

    /// Resolve the direction for a detected language.
    ///
    /// English and mixed input are sent through the French to Arabic path.
    /// `None` means the language could not be determined.
    pub fn for_detected(lang: DetectedLanguage) -> Option<Direction> {
        match lang {
            DetectedLanguage::French | DetectedLanguage::English | DetectedLanguage::Mixed => {
                Some(Direction::FRENCH_TO_ARABIC)
            }
            DetectedLanguage::Arabic => Some(Direction::ARABIC_TO_FRENCH),
            DetectedLanguage::Other | DetectedLanguage::Unknown => None,
        }
    }

    /// Flag pair such as `🇫🇷 → 🇩🇿`.
    pub fn label(&self) -> String {
        format!("{} → {}", self.source.flag(), self.target.flag())
    }

    /// Stable identifier for metrics, e.g. `fr-ar`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.source.code(), self.target.code())
    }
}

/// One translation request travelling through the dispatcher.
#[derive(Debug, Clone)]
pub struct TranslationJob {
    pub source_text: String,
    pub direction: Direction,
    pub user_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_mapping() {
        assert_eq!(
            Direction::for_detected(DetectedLanguage::French),
            Some(Direction::FRENCH_TO_ARABIC)
        );
        assert_eq!(
            Direction::for_detected(DetectedLanguage::Arabic),
            Some(Direction::ARABIC_TO_FRENCH)
        );
        assert_eq!(
            Direction::for_detected(DetectedLanguage::English),
            Some(Direction::FRENCH_TO_ARABIC)
        );
        assert_eq!(
            Direction::for_detected(DetectedLanguage::Mixed),
            Some(Direction::FRENCH_TO_ARABIC)
        );
        assert_eq!(Direction::for_detected(DetectedLanguage::Other), None);
        assert_eq!(Direction::for_detected(DetectedLanguage::Unknown), None);
    }

    #[test]
    fn test_label_reflects_pairing() {
        assert_eq!(Direction::FRENCH_TO_ARABIC.label(), "🇫🇷 → 🇩🇿");
        assert_eq!(Direction::ARABIC_TO_FRENCH.label(), "🇩🇿 → 🇫🇷");
        assert_eq!(Direction::ARABIC_TO_FRENCH.key(), "ar-fr");
    }
}
