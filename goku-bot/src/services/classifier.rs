//! Intent classification.
//!
//! Decides whether a message addresses the assistant directly, asks a
//! question, or is plain text to translate. Pure: no I/O, no state.

use crate::models::Classification;
use serde::Deserialize;
use std::path::Path;

/// Fixed answer for creator-identity questions.
pub const CREATOR_REPLY: &str = "صنعني المبرمج anes_miiih19@";

/// Default spellings used to address the assistant.
pub const DEFAULT_ASSISTANT_NAMES: &[&str] = &[
    "قوكو", "غوكو", "ڨوكو", "غوغو", "goku", "gukou", "gogo", "gougou",
];

const QUESTION_MARKS: &[char] = &['?', '؟', '？'];
const STRIPPED_PUNCTUATION: &[char] = &['؟', '?', '!', '.', '…', ',', '،', ':', ';', '؛'];
const LEADING_SEPARATORS: &[char] = &[',', '،', ':', ';', '؛', '-', '!'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordCategory {
    Creator,
    Greeting,
}

/// One row of the keyword table.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordEntry {
    pub phrase: String,
    pub category: KeywordCategory,
    /// Reply template for greetings; `{name}` is replaced by the user's name.
    #[serde(default)]
    pub reply: Option<String>,
}

/// `{phrase → category}` table, matched by case-insensitive containment.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    entries: Vec<KeywordEntry>,
}

impl KeywordTable {
    pub fn new(entries: Vec<KeywordEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| KeywordEntry {
                phrase: normalize(&entry.phrase),
                ..entry
            })
            .filter(|entry| !entry.phrase.is_empty())
            .collect();

        Self { entries }
    }

    /// Load a JSON array of entries from disk.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<KeywordEntry> = serde_json::from_str(&raw)?;
        Ok(Self::new(entries))
    }

    /// Creator and greeting phrases in Arabic, French and English.
    pub fn builtin() -> Self {
        let creator = [
            "من الذي صنعك",
            "من صنعك",
            "من خالقك",
            "من مبرمجك",
            "من انشأك",
            "من أنشأك",
            "من طورك",
            "من الذي طورك",
            "من الذي انشأك",
            "من برمجك",
            "qui t'a créé",
            "qui t a créé",
            "qui t'a cree",
            "qui t'a fait",
            "qui est ton créateur",
            "qui est ton programmeur",
            "qui t'a développé",
            "qui t'a programmé",
            "who created you",
            "who made you",
            "who built you",
            "who is your creator",
            "who programmed you",
        ];

        let greetings = [
            ("السلام عليكم", "وعليكم السلام يا {name} 👋 أرسل لي نصاً لأترجمه."),
            ("مرحبا", "مرحباً بك يا {name} 👋 أرسل لي نصاً لأترجمه."),
            ("أهلا", "أهلاً يا {name} 👋 كيف يمكنني مساعدتك؟"),
            ("اهلا", "أهلاً يا {name} 👋 كيف يمكنني مساعدتك؟"),
            ("صباح الخير", "صباح النور يا {name} ☀️"),
            ("مساء الخير", "مساء النور يا {name} 🌙"),
            ("bonjour", "Bonjour {name} ! 👋 Envoie-moi un texte à traduire."),
            ("bonsoir", "Bonsoir {name} ! 🌙"),
            ("salut", "Salut {name} ! 👋"),
            ("hello", "Hello {name}! 👋 Send me some text to translate."),
        ];

        let mut entries: Vec<KeywordEntry> = creator
            .iter()
            .map(|phrase| KeywordEntry {
                phrase: phrase.to_string(),
                category: KeywordCategory::Creator,
                reply: None,
            })
            .collect();

        entries.extend(greetings.iter().map(|(phrase, reply)| KeywordEntry {
            phrase: phrase.to_string(),
            category: KeywordCategory::Greeting,
            reply: Some(reply.to_string()),
        }));

        Self::new(entries)
    }

    /// First entry of `category` contained in already-normalized text.
    fn find(&self, normalized: &str, category: KeywordCategory) -> Option<&KeywordEntry> {
        self.entries
            .iter()
            .find(|entry| entry.category == category && normalized.contains(&entry.phrase))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Classifies raw message text.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    assistant_names: Vec<String>,
    keywords: KeywordTable,
}

impl IntentClassifier {
    pub fn new(assistant_names: Vec<String>, keywords: KeywordTable) -> Self {
        let assistant_names = assistant_names
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        Self {
            assistant_names,
            keywords,
        }
    }

    /// Classify `text`. `display_name` personalises greeting replies.
    pub fn classify(&self, text: &str, display_name: &str) -> Classification {
        if let Some(remainder) = self.strip_assistant_name(text) {
            let remainder = remainder
                .trim()
                .trim_start_matches(LEADING_SEPARATORS)
                .trim();

            if !remainder.is_empty() {
                let normalized = normalize(remainder);

                if self
                    .keywords
                    .find(&normalized, KeywordCategory::Creator)
                    .is_some()
                {
                    return Classification::CreatorQuestion;
                }

                if let Some(entry) = self.keywords.find(&normalized, KeywordCategory::Greeting) {
                    return Classification::Greeting(greeting_reply(entry, display_name));
                }

                return Classification::AiQuestion(remainder.to_string());
            }
        }

        if text.trim_end().ends_with(QUESTION_MARKS) {
            return Classification::AiQuestion(text.to_string());
        }

        Classification::TranslationRequest(text.to_string())
    }

    /// Remove the earliest assistant-name occurrence; longest name wins ties.
    fn strip_assistant_name(&self, text: &str) -> Option<String> {
        let (start, end) = self
            .assistant_names
            .iter()
            .filter_map(|name| find_ignore_case(text, name))
            .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))?;

        let mut remainder = String::with_capacity(text.len());
        remainder.push_str(&text[..start]);
        remainder.push(' ');
        remainder.push_str(&text[end..]);
        Some(remainder)
    }
}

fn greeting_reply(entry: &KeywordEntry, display_name: &str) -> String {
    let name = if display_name.trim().is_empty() {
        "صديقي"
    } else {
        display_name.trim()
    };

    entry
        .reply
        .as_deref()
        .unwrap_or("👋 {name}")
        .replace("{name}", name)
}

/// Lowercase, unify apostrophes, drop punctuation and collapse whitespace.
fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| if c == '’' || c == 'ʼ' { '\'' } else { c })
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte range of the first case-insensitive occurrence of `needle`.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    let needle: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }

    'outer: for (start, _) in haystack.char_indices() {
        let mut matched = 0;

        for (offset, c) in haystack[start..].char_indices() {
            for lower in c.to_lowercase() {
                if matched >= needle.len() || needle[matched] != lower {
                    continue 'outer;
                }
                matched += 1;
            }

            if matched == needle.len() {
                return Some((start, start + offset + c.len_utf8()));
            }
        }
    }

    None
}
