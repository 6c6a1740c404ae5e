//! HTML formatting, message splitting and reply keyboards.
//!
//! All output uses HTML parse mode (never MarkdownV2).

use regex::Regex;
use teloxide::types::{KeyboardButton, KeyboardMarkup};

use crate::dialogue::Keyboard;

/// Escape special HTML characters in user-provided text.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape `text` and turn `**bold**` markers into `<b>` tags.
pub fn to_html(text: &str) -> String {
    let escaped = escape_html(text);
    match Regex::new(r"\*\*(.+?)\*\*") {
        Ok(bold) => bold.replace_all(&escaped, "<b>$1</b>").into_owned(),
        Err(_) => escaped,
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Prefers to cut before a `День` heading, then at a paragraph break, and
/// only then mid-text. Chunks are trimmed; empty chunks are dropped.
pub fn split_for_telegram(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while let Some((limit, _)) = rest.char_indices().nth(max_chars) {
        let window = &rest[..limit];
        let cut = ["\n\nДень ", "\n\n**День", "\n\n"]
            .iter()
            .find_map(|sep| window.rfind(sep).filter(|&at| at > 0))
            .unwrap_or(limit);

        let (head, tail) = rest.split_at(cut);
        push_trimmed(&mut chunks, head);
        rest = tail;
    }
    push_trimmed(&mut chunks, rest);
    chunks
}

fn push_trimmed(chunks: &mut Vec<String>, chunk: &str) {
    let chunk = chunk.trim();
    if !chunk.is_empty() {
        chunks.push(chunk.to_owned());
    }
}

/// Render a dialogue keyboard as a Telegram reply keyboard.
///
/// Only the main menu stays open after a press.
pub fn keyboard(kind: Keyboard) -> KeyboardMarkup {
    let rows: Vec<Vec<KeyboardButton>> = kind
        .rows()
        .into_iter()
        .map(|row| row.into_iter().map(KeyboardButton::new).collect())
        .collect();

    let markup = KeyboardMarkup::new(rows).resize_keyboard();
    if kind.is_persistent() {
        markup
    } else {
        markup.one_time_keyboard()
    }
}
