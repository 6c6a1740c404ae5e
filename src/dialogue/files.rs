//! Exporting the last reply and re-sending saved exports.

use tracing::{info, warn};

use crate::profile::export::{export_caption, list_exports, write_export};

use super::session::Session;
use super::{DialogueEngine, Reply};

impl DialogueEngine {
    pub(super) async fn save_last_reply(&self, user_id: i64, session: &Session) {
        let text = session
            .last_reply
            .clone()
            .or_else(|| self.store.last_reply(user_id))
            .filter(|t| !t.trim().is_empty());

        let Some(text) = text else {
            self.say(
                user_id,
                "Сначала сгенерируй программу (кнопкой «\u{1F195} Другая программа»).",
                None,
            )
            .await;
            return;
        };

        let now = chrono::Utc::now().timestamp();
        match write_export(self.store.users_dir(), user_id, &text, now) {
            Ok(path) => {
                info!(user_id, path = %path.display(), "reply exported");
                self.send(
                    user_id,
                    Reply::Document {
                        path,
                        caption: "Вот файл с твоим последним запросом \u{1F44C}\u{1F3FC}"
                            .to_owned(),
                    },
                )
                .await;
            }
            Err(e) => {
                warn!(user_id, error = %e, "failed to write export");
                self.say(
                    user_id,
                    "\u{274C} Не удалось сохранить файл. Попробуй позже.",
                    None,
                )
                .await;
            }
        }
    }

    pub(super) async fn send_saved_exports(&self, user_id: i64) {
        let exports = match list_exports(self.store.users_dir(), user_id) {
            Ok(exports) => exports,
            Err(e) => {
                warn!(user_id, error = %e, "failed to list exports");
                Vec::new()
            }
        };

        if exports.is_empty() {
            self.say(
                user_id,
                "У тебя пока нет сохранённых запросов.\n\n\
                 Используй кнопку «\u{1F4BE} Сохранить в файл» после генерации ответа.",
                None,
            )
            .await;
            return;
        }

        let sending = exports.len().min(self.saved_history_limit);
        self.say(
            user_id,
            format!(
                "\u{1F4D1} Найдено сохранённых ответов: {}\n\nОтправляю последние {sending}...",
                exports.len()
            ),
            None,
        )
        .await;

        for path in exports.into_iter().take(sending) {
            let caption = export_caption(&path);
            self.send(user_id, Reply::Document { path, caption }).await;
        }
    }
}
