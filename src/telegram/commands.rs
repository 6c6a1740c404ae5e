//! Telegram slash commands.
//!
//! `/start` and `/menu` are routed to the dialogue engine; everything the
//! bot answers directly is returned as an HTML string.

use crate::telegram::ui::escape_html;

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    /// Restart onboarding keeping the name.
    Start,
    /// Show the main menu.
    Menu,
    /// List commands.
    Help,
    /// Anything else, without the leading slash.
    Unknown(String),
}

impl SlashCommand {
    /// Parse `/name[@bot] [args]`. Returns `None` for non-command text.
    pub fn parse(text: &str) -> Option<Self> {
        let without_slash = text.trim().strip_prefix('/')?;
        let full_command = without_slash
            .split_whitespace()
            .next()
            .unwrap_or(without_slash);
        // Strip @bot_name suffix if present
        let command = full_command.split('@').next().unwrap_or(full_command);

        Some(match command {
            "start" => Self::Start,
            "menu" => Self::Menu,
            "help" => Self::Help,
            other => Self::Unknown(other.to_owned()),
        })
    }
}

/// List all available commands.
pub fn handle_help() -> String {
    [
        "<b>Доступные команды:</b>",
        "",
        "/start \u{2014} заполнить анкету заново",
        "/menu \u{2014} главное меню",
        "/help \u{2014} показать это сообщение",
    ]
    .join("\n")
}

/// Reply to an unrecognised command.
pub fn handle_unknown(command: &str) -> String {
    format!(
        "Неизвестная команда /{}. Список команд: /help",
        escape_html(command)
    )
}
