//! Telegram adapter: UI formatting, slash commands, and bot dispatcher.
//!
//! Inbound messages are handed to the [`DialogueEngine`]; its replies arrive
//! on an mpsc channel and are delivered by a dedicated sender task.

use std::sync::Arc;

use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dialogue::{DialogueEngine, Outbound, Reply};

pub mod commands;
pub mod ui;

use commands::SlashCommand;

// ---------------------------------------------------------------------------
// Shared state for handler injection
// ---------------------------------------------------------------------------

/// Shared dependencies injected into teloxide handlers via `dptree::deps!`.
#[derive(Clone)]
struct SharedState {
    engine: Arc<DialogueEngine>,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Run the Telegram bot adapter.
///
/// Starts two concurrent tasks:
/// 1. **Inbound handler** -- receives messages and drives the dialogue
/// 2. **Outbound sender** -- delivers dialogue replies back to Telegram
///
/// Blocks until the bot is stopped (Ctrl+C).
pub async fn run_telegram(
    bot_token: &str,
    engine: Arc<DialogueEngine>,
    mut outbound_rx: mpsc::Receiver<Outbound>,
    max_message_len: usize,
) -> anyhow::Result<()> {
    let bot = Bot::new(bot_token);

    // Spawn outbound sender task
    let outbound_bot = bot.clone();
    let _outbound_handle = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            deliver(&outbound_bot, msg, max_message_len).await;
        }
    });

    let shared = SharedState { engine };

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    info!("telegram dispatcher starting");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![shared])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

// ---------------------------------------------------------------------------
// Outbound delivery
// ---------------------------------------------------------------------------

/// Send one dialogue reply, splitting long texts.
///
/// The keyboard is attached to the last chunk. A chunk Telegram rejects as
/// HTML is retried once as plain text.
async fn deliver(bot: &Bot, msg: Outbound, max_message_len: usize) {
    let chat_id = ChatId(msg.user_id);

    match msg.reply {
        Reply::Text { text, keyboard } => {
            let chunks = ui::split_for_telegram(&text, max_message_len);
            let last = chunks.len().saturating_sub(1);

            for (i, chunk) in chunks.iter().enumerate() {
                let markup = keyboard.filter(|_| i == last).map(ui::keyboard);

                let mut req = bot
                    .send_message(chat_id, ui::to_html(chunk))
                    .parse_mode(ParseMode::Html);
                if let Some(ref markup) = markup {
                    req = req.reply_markup(markup.clone());
                }

                if let Err(e) = req.await {
                    warn!(user_id = msg.user_id, error = %e, "html send failed, retrying as plain text");
                    let mut plain = bot.send_message(chat_id, chunk.replace("**", ""));
                    if let Some(markup) = markup {
                        plain = plain.reply_markup(markup);
                    }
                    if let Err(e) = plain.await {
                        warn!(user_id = msg.user_id, error = %e, "failed to send telegram message");
                    }
                }
            }
        }
        Reply::Document { path, caption } => {
            let name = crate::profile::export::file_name(&path);
            let input_file = InputFile::file(path).file_name(name);
            if let Err(e) = bot
                .send_document(chat_id, input_file)
                .caption(caption)
                .await
            {
                warn!(user_id = msg.user_id, error = %e, "failed to send telegram file");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Message handler
// ---------------------------------------------------------------------------

/// Handle an incoming Telegram message.
///
/// Slash commands are dispatched here; every other text goes to the
/// dialogue engine. Non-text messages are ignored.
async fn handle_message(bot: Bot, msg: Message, state: SharedState) -> ResponseResult<()> {
    let user_id = match msg.from {
        Some(ref user) => match i64::try_from(user.id.0) {
            Ok(id) => id,
            Err(_) => return Ok(()),
        },
        None => return Ok(()),
    };

    let Some(text) = msg.text() else {
        debug!(user_id, "unsupported message type, ignoring");
        return Ok(());
    };

    debug!(user_id, "telegram message received");

    match SlashCommand::parse(text) {
        Some(SlashCommand::Start) => state.engine.handle_start(user_id).await,
        Some(SlashCommand::Menu) => state.engine.handle_menu(user_id).await,
        Some(SlashCommand::Help) => {
            bot.send_message(msg.chat.id, commands::handle_help())
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Some(SlashCommand::Unknown(command)) => {
            bot.send_message(msg.chat.id, commands::handle_unknown(&command))
                .parse_mode(ParseMode::Html)
                .await?;
        }
        None => state.engine.handle_text(user_id, text).await,
    }

    Ok(())
}
