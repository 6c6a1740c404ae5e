//! Program generation and Q&A through the coach.

use tokio::time::Instant;
use tracing::{info, warn};

use crate::profile::UserProfile;
use crate::providers::{FailureKind, ProviderError};

use super::command::{Keyboard, Variation};
use super::format::sanitize_reply;
use super::session::Session;
use super::state::DialogueState;
use super::{DialogueEngine, WHATS_NEXT};

const READY: &str = "\u{2728} Программа готова!";
const DETAIL_CHARS: usize = 100;

/// Where a generation was requested from; selects the failure wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FailureContext {
    /// Style button or free text from the main menu.
    Program,
    /// Question in Q&A mode.
    Answer,
    /// Program right after onboarding.
    FirstProgram,
}

/// User-facing text for a failed coach call.
pub(super) fn failure_message(context: FailureContext, error: &ProviderError) -> String {
    let kind = error.kind();
    match context {
        FailureContext::Program => {
            let detail = match kind {
                FailureKind::Timeout => {
                    "\u{23F1}\u{FE0F} Сервер не ответил вовремя. Попробуй ещё раз через минуту."
                        .to_owned()
                }
                FailureKind::Connection => {
                    "\u{1F310} Проблемы с подключением к серверу. Попробуй позже.".to_owned()
                }
                FailureKind::Unauthorized => {
                    "\u{1F512} Проблема с авторизацией. Свяжись с администратором.".to_owned()
                }
                FailureKind::Other => {
                    let technical: String = error.to_string().chars().take(DETAIL_CHARS).collect();
                    format!("Попробуй ещё раз позже.\n\nТехническая информация: {technical}")
                }
            };
            format!("\u{274C} Не получилось сгенерировать программу.\n\n{detail}")
        }
        FailureContext::Answer => {
            let detail = match kind {
                FailureKind::Timeout => {
                    "\u{23F1}\u{FE0F} Сервер не ответил вовремя. Попробуй переформулировать вопрос."
                }
                FailureKind::Connection => "\u{1F310} Проблемы с подключением. Попробуй позже.",
                _ => "Попробуй задать вопрос ещё раз.",
            };
            format!("\u{274C} Не удалось получить ответ.\n\n{detail}")
        }
        FailureContext::FirstProgram => {
            let detail = match kind {
                FailureKind::Timeout => {
                    "\u{23F1}\u{FE0F} Сервер не ответил вовремя. Используй кнопку «\u{1F195} Другая программа» чтобы попробовать снова."
                }
                FailureKind::Connection => {
                    "\u{1F310} Проблемы с подключением. Попробуй через минуту кнопкой «\u{1F195} Другая программа»."
                }
                _ => "Попробуй через кнопку «\u{1F195} Другая программа» в главном меню.",
            };
            format!("\u{274C} Не удалось сгенерировать программу.\n\n{detail}")
        }
    }
}

impl DialogueEngine {
    /// Whether the cooldown blocks a generation; tells the user if so.
    async fn cooldown_blocks(&self, user_id: i64, session: &Session) -> bool {
        let Some(remaining) = self.cooldown.remaining(session.last_generation) else {
            return false;
        };
        let secs = remaining.as_secs().saturating_add(u64::from(remaining.subsec_nanos() > 0));
        info!(user_id, wait_secs = secs, "generation throttled");
        self.say(
            user_id,
            format!(
                "\u{23F3} Подожди ещё {secs} секунд перед следующей генерацией.\n\nЭто защита от перегрузки \u{1F60A}"
            ),
            None,
        )
        .await;
        true
    }

    /// Send a finished program followed by the main menu.
    async fn deliver_program(&self, user_id: i64, session: &mut Session, raw: &str) {
        let program = sanitize_reply(raw);
        self.remember_reply(user_id, session, &program);
        self.say(user_id, program, None).await;
        self.say(user_id, WHATS_NEXT, Some(Keyboard::Main)).await;
    }

    pub(super) async fn generate_variation(
        &self,
        user_id: i64,
        session: &mut Session,
        profile: &UserProfile,
        variation: Variation,
    ) {
        if self.cooldown_blocks(user_id, session).await {
            return;
        }

        let muscle = match &session.state {
            Some(DialogueState::ChoosingVariation { muscle }) => *muscle,
            _ => None,
        };
        let preferences = variation.preferences(muscle);

        self.say(user_id, "\u{23F3} Генерирую программу...", None).await;
        let started = Instant::now();
        info!(user_id, variation = ?variation, muscle = ?muscle, "generating program");

        match self
            .coach
            .get_program(&profile.physical_data, &preferences)
            .await
        {
            Ok(program) => {
                session.last_generation = Some(started);
                session.state = None;
                self.say(user_id, READY, None).await;
                self.deliver_program(user_id, session, &program).await;
            }
            Err(e) => {
                warn!(user_id, error = %e, "program generation failed");
                self.say(
                    user_id,
                    failure_message(FailureContext::Program, &e),
                    Some(Keyboard::Main),
                )
                .await;
            }
        }
    }

    pub(super) async fn first_program(
        &self,
        user_id: i64,
        session: &mut Session,
        profile: &UserProfile,
    ) {
        session.state = None;
        self.say(
            user_id,
            "\u{23F3} Спасибо! Формирую твою персональную программу\u{2026}",
            None,
        )
        .await;

        match self.coach.get_program(&profile.physical_data, "").await {
            Ok(program) => {
                session.last_generation = Some(Instant::now());
                self.say(user_id, READY, None).await;
                self.deliver_program(user_id, session, &program).await;
            }
            Err(e) => {
                warn!(user_id, error = %e, "first program generation failed");
                self.say(
                    user_id,
                    failure_message(FailureContext::FirstProgram, &e),
                    None,
                )
                .await;
                self.say(user_id, WHATS_NEXT, Some(Keyboard::Main)).await;
            }
        }
    }

    pub(super) async fn answer_question(
        &self,
        user_id: i64,
        session: &mut Session,
        profile: &UserProfile,
        question: &str,
    ) {
        self.say(user_id, "\u{23F3} Думаю над ответом...", None).await;
        info!(user_id, "answering question");

        match self
            .coach
            .get_answer(&profile.physical_data, question)
            .await
        {
            Ok(answer) => {
                let answer = sanitize_reply(&answer);
                self.remember_reply(user_id, session, &answer);
                self.say(user_id, answer, None).await;
            }
            Err(e) => {
                warn!(user_id, error = %e, "answer generation failed");
                self.say(user_id, failure_message(FailureContext::Answer, &e), None)
                    .await;
            }
        }
    }

    /// Free text from the main menu is taken as program preferences.
    pub(super) async fn program_from_text(
        &self,
        user_id: i64,
        session: &mut Session,
        profile: &UserProfile,
        text: &str,
    ) {
        if self.cooldown_blocks(user_id, session).await {
            return;
        }

        let started = Instant::now();
        info!(user_id, "generating program from free text");
        match self.coach.get_program(&profile.physical_data, text).await {
            Ok(program) => {
                session.last_generation = Some(started);
                session.state = None;
                self.deliver_program(user_id, session, &program).await;
            }
            Err(e) => {
                warn!(user_id, error = %e, "program generation failed");
                self.say(
                    user_id,
                    "Не получилось сгенерировать программу. Попробуй ещё раз.",
                    Some(Keyboard::Main),
                )
                .await;
            }
        }
    }
}
