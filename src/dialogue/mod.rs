//! Scripted onboarding dialogue and post-onboarding menu.
//!
//! [`DialogueEngine`] receives every inbound text for a user, decodes button
//! captions into [`Command`]s, advances the user's [`DialogueState`] and
//! pushes [`Outbound`] replies onto a channel consumed by the Telegram layer.
//!
//! Dispatch order matters: menu commands that work in any stage come first,
//! then incomplete profiles are steered back into onboarding, then the
//! current stage handles the text. A completed user with no active stage gets
//! a program generated from the free text.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::DialogueConfig;
use crate::profile::{ProfileStore, UserProfile};
use crate::providers::FitnessCoach;

pub mod command;
pub mod cooldown;
mod editing;
mod files;
pub mod format;
mod generation;
mod onboarding;
pub mod session;
pub mod state;

pub use command::{Command, EditableField, Keyboard, Variation};
pub use cooldown::GenerationCooldown;
pub use session::{Session, SessionStore};
pub use state::DialogueState;

/// Prompt shown with the main menu after a generation.
pub const WHATS_NEXT: &str = "Что дальше? Выбери действие в меню \u{2B07}\u{FE0F}";

/// Session count above which idle sessions are dropped.
const SESSION_PRUNE_THRESHOLD: usize = 1024;

const PROFILE_REQUIRED: &str =
    "Сначала нужно заполнить анкету. Используй кнопку «\u{1F501} Начать заново» для заполнения.";

// ---------------------------------------------------------------------------
// Outbound messages
// ---------------------------------------------------------------------------

/// A message for the Telegram layer to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    /// Recipient (private chat id equals user id).
    pub user_id: i64,
    /// What to send.
    pub reply: Reply,
}

/// Payload of an outbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Text with optional `**bold**` markup and an optional reply keyboard.
    Text {
        /// Message body; may exceed one Telegram message.
        text: String,
        /// Keyboard to attach.
        keyboard: Option<Keyboard>,
    },
    /// A file sent as a document.
    Document {
        /// File on disk.
        path: PathBuf,
        /// Caption shown under the document.
        caption: String,
    },
}

impl Reply {
    /// Text body, if this is a text reply.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Document { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Drives every user's conversation.
pub struct DialogueEngine {
    store: ProfileStore,
    sessions: SessionStore,
    coach: Arc<dyn FitnessCoach>,
    cooldown: GenerationCooldown,
    saved_history_limit: usize,
    outbound: mpsc::Sender<Outbound>,
}

impl DialogueEngine {
    /// Create an engine sending replies to `outbound`.
    pub fn new(
        store: ProfileStore,
        coach: Arc<dyn FitnessCoach>,
        settings: &DialogueConfig,
        outbound: mpsc::Sender<Outbound>,
    ) -> Self {
        Self {
            store,
            sessions: SessionStore::new(),
            coach,
            cooldown: GenerationCooldown::new(Duration::from_secs(
                settings.generation_cooldown_secs,
            )),
            saved_history_limit: settings.saved_history_limit,
            outbound,
        }
    }

    /// Profile store used by the engine.
    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Current stage of a user, for diagnostics and tests.
    pub async fn state_of(&self, user_id: i64) -> Option<DialogueState> {
        let handle = self.sessions.session(user_id).await;
        let session = handle.lock().await;
        session.state.clone()
    }

    /// `/start`: soft reset keeping the stored name.
    ///
    /// Clears physical data except the name, history, the completion flag
    /// and the last reply, then asks for the goal (or the name if unknown).
    pub async fn handle_start(&self, user_id: i64) {
        let handle = self.sessions.session(user_id).await;
        let mut session = handle.lock().await;

        let name = match self.store.reset(user_id, true) {
            Ok(profile) => profile.physical_data.name,
            Err(e) => {
                warn!(user_id, error = %e, "failed to persist soft reset");
                self.store.name(user_id)
            }
        };
        session.state = None;
        session.last_reply = None;
        info!(user_id, has_name = name.is_some(), "onboarding restarted via /start");

        match name {
            None => {
                session.state = Some(DialogueState::AwaitingName);
                self.say(
                    user_id,
                    "Привет! Я твой персональный фитнес-тренер GymAiMentor \u{1F4AA}\u{1F3FC}\n\
                     Помогу составить для тебя программу тренировок и отвечу на любые вопросы.\n\
                     Let's get it started \u{1F680} Как тебя зовут?",
                    None,
                )
                .await;
            }
            Some(name) => self.ask_goal(user_id, &mut session, name).await,
        }
    }

    /// `/menu`: main menu for completed profiles, onboarding otherwise.
    pub async fn handle_menu(&self, user_id: i64) {
        let handle = self.sessions.session(user_id).await;
        let mut session = handle.lock().await;
        let profile = self.store.load(user_id);

        session.state = None;
        if profile.physical_data_completed {
            self.say(user_id, "Главное меню \u{2B07}\u{FE0F}", Some(Keyboard::Main))
                .await;
        } else {
            self.resume_onboarding(user_id, &mut session, &profile).await;
        }
    }

    /// Handle one inbound text message.
    pub async fn handle_text(&self, user_id: i64, text: &str) {
        if self.sessions.len().await >= SESSION_PRUNE_THRESHOLD {
            let pruned = self.sessions.prune_idle(self.cooldown.window()).await;
            debug!(pruned, "idle sessions pruned");
        }

        let handle = self.sessions.session(user_id).await;
        let mut session = handle.lock().await;

        let text = text.trim();
        let profile = self.store.load(user_id);
        let completed = profile.physical_data_completed;
        let command = Command::parse(text);

        debug!(
            user_id,
            state = session.state.as_ref().map_or("idle", DialogueState::label),
            completed,
            command = ?command,
            "message received"
        );

        // Commands available in any stage.
        match command {
            Some(Command::SaveToFile) => {
                self.save_last_reply(user_id, &session).await;
                return;
            }
            Some(Command::SavedAnswers) => {
                self.send_saved_exports(user_id).await;
                return;
            }
            Some(Command::MyProfile) => {
                if !completed {
                    self.say(user_id, PROFILE_REQUIRED, Some(Keyboard::Main)).await;
                    return;
                }
                info!(user_id, "viewing profile");
                let text = crate::profile::render::profile_text(&profile.physical_data);
                self.say(user_id, text, None).await;
                return;
            }
            Some(Command::EditParams) => {
                if !completed {
                    self.say(user_id, PROFILE_REQUIRED, Some(Keyboard::Main)).await;
                    return;
                }
                self.say(
                    user_id,
                    "Выбери параметр для изменения \u{2B07}\u{FE0F}",
                    Some(Keyboard::EditParams),
                )
                .await;
                return;
            }
            Some(Command::BackToMenu) => {
                session.state = None;
                self.say(user_id, "Главное меню \u{2B07}\u{FE0F}", Some(Keyboard::Main))
                    .await;
                return;
            }
            Some(Command::ChangeGoal) => {
                if !completed {
                    self.say(user_id, PROFILE_REQUIRED, Some(Keyboard::Main)).await;
                    return;
                }
                info!(user_id, current = ?profile.physical_data.target, "changing goal");
                session.state = Some(DialogueState::ChangingGoal);
                let current = profile
                    .physical_data
                    .target
                    .as_deref()
                    .unwrap_or("не указана");
                self.say(
                    user_id,
                    format!(
                        "Текущая цель: {current}\n\nВыбери новую цель тренировок \u{2B07}\u{FE0F}"
                    ),
                    Some(Keyboard::Goal),
                )
                .await;
                return;
            }
            Some(Command::AnotherProgram) => {
                if !completed {
                    self.say(user_id, PROFILE_REQUIRED, Some(Keyboard::Main)).await;
                    return;
                }
                self.say(
                    user_id,
                    "Выбери акцент программы на группу мышц \u{2B07}\u{FE0F}",
                    Some(Keyboard::MuscleGroups),
                )
                .await;
                return;
            }
            Some(Command::Muscle(focus))
                if completed
                    && session.state
                        != Some(DialogueState::Editing(EditableField::MuscleGroup)) =>
            {
                session.state = Some(DialogueState::ChoosingVariation {
                    muscle: Some(focus),
                });
                self.say(
                    user_id,
                    format!(
                        "Супер! Программа с акцентом на {}.\n\nТеперь выбери стиль тренировок \u{2B07}\u{FE0F}",
                        focus.emphasis_phrase()
                    ),
                    Some(Keyboard::Variations),
                )
                .await;
                return;
            }
            Some(Command::Variation(variation)) if completed => {
                self.generate_variation(user_id, &mut session, &profile, variation)
                    .await;
                return;
            }
            Some(Command::Restart) => {
                self.restart(user_id, &mut session).await;
                return;
            }
            _ => {}
        }

        if !completed && session.state.is_none() {
            self.resume_onboarding(user_id, &mut session, &profile).await;
            return;
        }

        if command == Some(Command::AskCoach) && completed {
            session.state = Some(DialogueState::Qa);
            info!(user_id, "entered Q&A mode");
            self.say(
                user_id,
                "Задай вопрос по тренировкам/питанию \u{270D}\u{1F3FC}",
                None,
            )
            .await;
            return;
        }

        let state = match (session.state.take(), command) {
            (Some(DialogueState::Qa), _) => {
                session.state = Some(DialogueState::Qa);
                self.answer_question(user_id, &mut session, &profile, text)
                    .await;
                return;
            }
            (Some(DialogueState::AwaitingName), _) => {
                self.on_name(user_id, &mut session, text).await;
                return;
            }
            (Some(DialogueState::AwaitingGoal { name }), _) => {
                self.on_goal(user_id, &mut session, name, command, text)
                    .await;
                return;
            }
            (_, Some(Command::Edit(field))) if completed => {
                self.begin_edit(user_id, &mut session, &profile, field).await;
                return;
            }
            (state, _) => state,
        };

        match state {
            Some(DialogueState::ChangingGoal) => {
                self.on_new_goal(user_id, &mut session, command, text).await;
            }
            Some(DialogueState::Editing(field)) => {
                self.on_edit_value(user_id, &mut session, field, command, text)
                    .await;
            }
            Some(DialogueState::AwaitingGender { name, goal }) => {
                self.on_gender(user_id, &mut session, name, goal, command, text)
                    .await;
            }
            Some(DialogueState::Survey {
                basics,
                answers,
                step,
            }) => {
                self.on_survey_answer(user_id, &mut session, basics, answers, step, text)
                    .await;
            }
            Some(DialogueState::AwaitingLevel {
                basics,
                measurements,
            }) => {
                self.on_level(user_id, &mut session, basics, measurements, command)
                    .await;
            }
            Some(DialogueState::AwaitingMuscleGroup {
                basics,
                measurements,
                level,
            }) => {
                self.on_muscle_group(
                    user_id,
                    &mut session,
                    (basics, measurements, level),
                    command,
                )
                .await;
            }
            other => {
                session.state = other;
                if completed {
                    self.program_from_text(user_id, &mut session, &profile, text)
                        .await;
                } else {
                    session.state = Some(DialogueState::AwaitingName);
                    self.say(user_id, "Как тебя зовут?", None).await;
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Shared helpers
    // -----------------------------------------------------------------------

    /// Queue a reply for delivery.
    async fn send(&self, user_id: i64, reply: Reply) {
        if let Err(e) = self.outbound.send(Outbound { user_id, reply }).await {
            warn!(user_id, error = %e, "outbound channel closed, reply dropped");
        }
    }

    /// Queue a text reply.
    async fn say(&self, user_id: i64, text: impl Into<String>, keyboard: Option<Keyboard>) {
        self.send(
            user_id,
            Reply::Text {
                text: text.into(),
                keyboard,
            },
        )
        .await;
    }

    /// Steer an incomplete, idle user back into onboarding.
    async fn resume_onboarding(
        &self,
        user_id: i64,
        session: &mut Session,
        profile: &UserProfile,
    ) {
        match profile.physical_data.name.clone() {
            None => {
                session.state = Some(DialogueState::AwaitingName);
                self.say(user_id, "Как тебя зовут?", None).await;
            }
            Some(name) => self.ask_goal(user_id, session, name).await,
        }
    }

    async fn ask_goal(&self, user_id: i64, session: &mut Session, name: String) {
        let prompt = format!("{name}, выбери свою цель тренировок \u{2B07}\u{FE0F}");
        session.state = Some(DialogueState::AwaitingGoal { name });
        self.say(user_id, prompt, Some(Keyboard::Goal)).await;
    }

    /// Full reset including the name.
    async fn restart(&self, user_id: i64, session: &mut Session) {
        info!(user_id, "restarting registration");
        if let Err(e) = self.store.reset(user_id, false) {
            warn!(user_id, error = %e, "failed to persist full reset");
        }
        session.last_reply = None;
        session.state = Some(DialogueState::AwaitingName);
        self.say(
            user_id,
            "Заполним анкету заново \u{1F4DD} Как тебя зовут?",
            None,
        )
        .await;
    }

    /// Cache and persist the latest generated text.
    fn remember_reply(&self, user_id: i64, session: &mut Session, text: &str) {
        session.last_reply = Some(text.to_owned());
        if let Err(e) = self.store.set_last_reply(user_id, Some(text)) {
            warn!(user_id, error = %e, "failed to persist last reply");
        }
    }
}
