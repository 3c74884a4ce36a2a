/// What the bot sends back for one incoming message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Ordered messages; long outputs arrive already chunked.
    pub messages: Vec<String>,

    /// Attach the shortcut keyboard to the last message.
    pub keyboard: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            messages: vec![text.into()],
            keyboard: false,
        }
    }

    pub fn chunks(messages: Vec<String>) -> Self {
        Self {
            messages,
            keyboard: false,
        }
    }

    pub fn with_keyboard(mut self) -> Self {
        self.keyboard = true;
        self
    }

    /// All messages joined, for assertions and logging.
    pub fn joined(&self) -> String {
        self.messages.join("\n")
    }
}
