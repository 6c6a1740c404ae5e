//! Single-field edits and goal changes for completed profiles.

use tracing::{info, warn};

use crate::profile::render::{format_kg, muscle_label};
use crate::profile::validate::{validate_age, validate_schedule, validate_weight};
use crate::profile::{normalize_name, FieldValue, Goal, ProfileError, UserProfile};

use super::command::{goal_caption, muscle_caption, Command, EditableField, Keyboard};
use super::session::Session;
use super::state::{parse_restrictions, DialogueState};
use super::DialogueEngine;

const RETRY: &str = "\n\nПопробуй ещё раз:";

impl DialogueEngine {
    pub(super) async fn begin_edit(
        &self,
        user_id: i64,
        session: &mut Session,
        profile: &UserProfile,
        field: EditableField,
    ) {
        let data = &profile.physical_data;
        let or = |v: Option<String>, placeholder: &str| v.unwrap_or_else(|| placeholder.to_owned());

        let (prompt, keyboard) = match field {
            EditableField::Name => (
                format!(
                    "Текущее имя: {}\n\nВведи новое имя:",
                    or(data.name.clone(), "не указано")
                ),
                None,
            ),
            EditableField::Age => (
                format!(
                    "Текущий возраст: {} лет\n\nВведи новый возраст (10-100 лет):",
                    or(data.age.map(|a| a.to_string()), "не указан")
                ),
                None,
            ),
            EditableField::Weight => (
                format!(
                    "Текущий вес: {} кг\n\nВведи новый текущий вес в килограммах (например: 75 или 75.5):",
                    or(data.weight.map(format_kg), "не указан")
                ),
                None,
            ),
            EditableField::GoalWeight => (
                format!(
                    "Желаемый вес: {} кг\n\nВведи новый желаемый вес в килограммах (например: 70 или 70.5):",
                    or(data.goal.map(format_kg), "не указан")
                ),
                None,
            ),
            EditableField::Schedule => (
                format!(
                    "Текущая частота: {} раз/неделю\n\nСколько раз в неделю сможешь посещать зал (1-7)?",
                    or(data.schedule.map(|s| s.to_string()), "не указана")
                ),
                None,
            ),
            EditableField::Restrictions => (
                format!(
                    "Текущие ограничения: {}\n\nОпиши новые ограничения по здоровью или предпочтения в тренировках (или напиши 'нет'):",
                    or(data.restrictions.clone().filter(|r| !r.is_empty()), "нет")
                ),
                None,
            ),
            EditableField::Level => (
                format!(
                    "Текущий уровень: {}\n\nВыбери новый уровень подготовки:",
                    or(data.level.clone(), "не указан")
                ),
                Some(Keyboard::Level),
            ),
            EditableField::MuscleGroup => (
                format!(
                    "Текущий акцент: {}\n\nВыбери новый акцент на группу мышц:",
                    or(muscle_label(data.preferred_muscle_group.as_deref()), "не указан")
                ),
                Some(Keyboard::MuscleGroups),
            ),
        };

        info!(user_id, field = field.field().key(), "editing field");
        session.state = Some(DialogueState::Editing(field));
        self.say(user_id, prompt, keyboard).await;
    }

    pub(super) async fn on_edit_value(
        &self,
        user_id: i64,
        session: &mut Session,
        field: EditableField,
        command: Option<Command>,
        text: &str,
    ) {
        let parsed: Result<(Option<FieldValue>, String), String> = match field {
            EditableField::Name => match normalize_name(text) {
                Some(name) => Ok((
                    Some(FieldValue::text(name.clone())),
                    format!("\u{2705} Имя успешно обновлено: {name}"),
                )),
                None => Err("\u{274C} Имя не может быть пустым.".to_owned()),
            },
            EditableField::Age => validate_age(text)
                .map(|age| {
                    (
                        Some(FieldValue::Integer(age)),
                        format!("\u{2705} Возраст успешно обновлён: {age} лет"),
                    )
                })
                .map_err(|e| format!("\u{274C} {e}")),
            EditableField::Weight => validate_weight(text)
                .map(|kg| {
                    (
                        Some(FieldValue::Decimal(kg)),
                        format!("\u{2705} Текущий вес успешно обновлён: {} кг", format_kg(kg)),
                    )
                })
                .map_err(|e| format!("\u{274C} {e}")),
            EditableField::GoalWeight => validate_weight(text)
                .map(|kg| {
                    (
                        Some(FieldValue::Decimal(kg)),
                        format!("\u{2705} Желаемый вес успешно обновлён: {} кг", format_kg(kg)),
                    )
                })
                .map_err(|e| format!("\u{274C} {e}")),
            EditableField::Schedule => validate_schedule(text)
                .map(|n| {
                    (
                        Some(FieldValue::Integer(n)),
                        format!("\u{2705} Частота тренировок успешно обновлена: {n} раз/неделю"),
                    )
                })
                .map_err(|e| format!("\u{274C} {e}")),
            EditableField::Restrictions => {
                let restrictions = parse_restrictions(text);
                let shown = restrictions.clone().unwrap_or_else(|| "нет".to_owned());
                Ok((
                    restrictions.map(FieldValue::text),
                    format!("\u{2705} Ограничения / предпочтения успешно обновлены: {shown}"),
                ))
            }
            EditableField::Level => match command {
                Some(Command::Level(level)) => Ok((
                    Some(level.into()),
                    format!(
                        "\u{2705} Уровень подготовки успешно обновлён: {}",
                        level.as_str()
                    ),
                )),
                _ => {
                    session.state = Some(DialogueState::Editing(field));
                    self.say(
                        user_id,
                        "Пожалуйста, выбери уровень кнопкой ниже:",
                        Some(Keyboard::Level),
                    )
                    .await;
                    return;
                }
            },
            EditableField::MuscleGroup => match command {
                Some(Command::Muscle(focus)) => Ok((
                    Some(focus.into()),
                    format!(
                        "\u{2705} Акцент на мышцы успешно обновлён: {}",
                        muscle_caption(focus)
                    ),
                )),
                _ => {
                    session.state = Some(DialogueState::Editing(field));
                    self.say(
                        user_id,
                        "Пожалуйста, выбери группу мышц кнопкой ниже:",
                        Some(Keyboard::MuscleGroups),
                    )
                    .await;
                    return;
                }
            },
        };

        let (value, confirmation) = match parsed {
            Ok(ok) => ok,
            Err(message) => {
                session.state = Some(DialogueState::Editing(field));
                self.say(user_id, format!("{message}{RETRY}"), None).await;
                return;
            }
        };

        if let Err(e) = self.store.update_field(user_id, field.field(), value) {
            self.report_save_failure(user_id, session, field, &e).await;
            return;
        }

        info!(user_id, field = field.field().key(), "field updated");
        session.state = None;
        self.say(user_id, confirmation, Some(Keyboard::Main)).await;
    }

    pub(super) async fn on_new_goal(
        &self,
        user_id: i64,
        session: &mut Session,
        command: Option<Command>,
        text: &str,
    ) {
        let goal = match command {
            Some(Command::Goal(goal)) => Some(goal),
            Some(_) => None,
            None => Goal::recognize(text),
        };

        let Some(goal) = goal else {
            session.state = Some(DialogueState::ChangingGoal);
            self.say(
                user_id,
                "Пожалуйста, выбери цель кнопкой ниже:",
                Some(Keyboard::Goal),
            )
            .await;
            return;
        };

        session.state = None;
        if let Err(e) = self.store.set_goal(user_id, goal) {
            warn!(user_id, error = %e, "failed to persist new goal");
            self.say(
                user_id,
                "\u{274C} Не удалось сохранить изменения. Попробуй позже.",
                Some(Keyboard::Main),
            )
            .await;
            return;
        }

        info!(user_id, goal = goal.as_str(), "goal changed");
        self.say(
            user_id,
            format!(
                "\u{2705} Цель успешно изменена на: {}\n\nТеперь твои программы тренировок будут адаптированы под новую цель.",
                goal_caption(goal)
            ),
            Some(Keyboard::Main),
        )
        .await;
    }

    async fn report_save_failure(
        &self,
        user_id: i64,
        session: &mut Session,
        field: EditableField,
        error: &ProfileError,
    ) {
        warn!(user_id, field = field.field().key(), error = %error, "failed to persist field");
        session.state = None;
        self.say(
            user_id,
            "\u{274C} Не удалось сохранить изменения. Попробуй позже.",
            Some(Keyboard::Main),
        )
        .await;
    }
}
