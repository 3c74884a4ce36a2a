//! Slash commands and the inline shortcut keyboard.

use crate::models::{Reply, UserId};
use crate::services::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::services::usage::UsageTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Stats,
    Languages,
    About,
}

impl Command {
    /// Parse `/name` or `/name@botname`, ignoring any arguments.
    pub fn parse(text: &str) -> Option<Command> {
        let token = text.split_whitespace().next()?.strip_prefix('/')?;
        let name = token.split('@').next().unwrap_or(token);
        Self::from_name(&name.to_lowercase())
    }

    /// Map inline-button callback data onto a command.
    pub fn from_callback(data: &str) -> Option<Command> {
        Self::from_name(data.trim())
    }

    fn from_name(name: &str) -> Option<Command> {
        match name {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "stats" => Some(Command::Stats),
            "languages" => Some(Command::Languages),
            "about" => Some(Command::About),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Stats => "stats",
            Command::Languages => "languages",
            Command::About => "about",
        }
    }
}

/// Two-column keyboard offering the help/stats/languages/about shortcuts.
pub fn main_keyboard() -> InlineKeyboardMarkup {
    let buttons = [
        ("📖 المساعدة", Command::Help),
        ("📊 إحصائياتي", Command::Stats),
        ("🌐 اللغات", Command::Languages),
        ("ℹ️ حول البوت", Command::About),
    ];

    InlineKeyboardMarkup {
        inline_keyboard: buttons
            .chunks(2)
            .map(|row| {
                row.iter()
                    .map(|(text, command)| InlineKeyboardButton {
                        text: text.to_string(),
                        callback_data: command.name().to_string(),
                    })
                    .collect()
            })
            .collect(),
    }
}

/// Build the reply for `command`.
pub fn respond(command: Command, user_id: UserId, display_name: &str, usage: &UsageTracker) -> Reply {
    match command {
        Command::Start => Reply::text(format!(
            "🤖 أهلاً {}!\nأرسل نصاً بالعربية أو الفرنسية لأترجمه، أو ابدأ رسالتك بـ 'قوكو' لطرح سؤال.",
            display_name
        ))
        .with_keyboard(),
        Command::Help => Reply::text(
            "📖 طريقة الاستخدام:\n\
             • أرسل نصاً بالعربية فأترجمه إلى الفرنسية 🇩🇿 → 🇫🇷\n\
             • أرسل نصاً بالفرنسية فأترجمه إلى العربية 🇫🇷 → 🇩🇿\n\
             • ابدأ الرسالة بـ 'قوكو' أو اختمها بعلامة استفهام لطرح سؤال ذكاء اصطناعي.\n\n\
             الأوامر: /start /help /stats /languages /about",
        )
        .with_keyboard(),
        Command::Stats => Reply::text(stats_text(user_id, usage)),
        Command::Languages => Reply::text(
            "🌐 اللغات المدعومة:\n\
             🇩🇿 العربية (الفصحى والدارجة) → 🇫🇷 الفرنسية\n\
             🇫🇷 الفرنسية → 🇩🇿 العربية\n\
             النصوص الإنجليزية أو المختلطة تترجم إلى العربية.",
        ),
        Command::About => Reply::text(format!(
            "ℹ️ قوكو بوت الإصدار {}\nمترجم عربي فرنسي ومساعد ذكي.\nصنعني المبرمج anes_miiih19@",
            env!("CARGO_PKG_VERSION")
        )),
    }
}

fn stats_text(user_id: UserId, usage: &UsageTracker) -> String {
    match usage.report(user_id) {
        Some(session) => format!(
            "📊 إحصائياتك:\n\
             • عدد الترجمات: {}\n\
             • عدد الأحرف المترجمة: {}\n\
             • أول استخدام: {}\n\
             • آخر استخدام: {}",
            session.translation_count,
            session.characters_translated,
            session.first_seen.format("%Y-%m-%d %H:%M UTC"),
            session.last_seen.format("%Y-%m-%d %H:%M UTC"),
        ),
        None => "📊 لم تقم بأي ترجمة بعد. أرسل نصاً لتبدأ!".to_string(),
    }
}
