//! Result of inspecting an incoming message for special markers.

/// Mutually exclusive handling paths for one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Free-form question for the generative model.
    AiQuestion(String),

    /// "Who made you?" in any supported language.
    CreatorQuestion,

    /// Greeting addressed to the assistant, carrying the canned reply.
    Greeting(String),

    /// Plain text to translate.
    TranslationRequest(String),
}

impl Classification {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Classification::AiQuestion(_) => "ai_question",
            Classification::CreatorQuestion => "creator_question",
            Classification::Greeting(_) => "greeting",
            Classification::TranslationRequest(_) => "translation",
        }
    }
}
