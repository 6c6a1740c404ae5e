//! Onboarding stages: name, goal, gender, survey, level, muscle emphasis.

use tracing::{error, info, warn};

use crate::profile::validate::{
    validate_age, validate_height, validate_schedule, validate_weight, ValidationError,
};
use crate::profile::{normalize_name, Gender, Goal, Level, MuscleFocus};

use super::command::{Command, Keyboard};
use super::session::Session;
use super::state::{parse_restrictions, Basics, DialogueState, Measurements, SurveyAnswers, SurveyStep};
use super::DialogueEngine;

impl DialogueEngine {
    pub(super) async fn on_name(&self, user_id: i64, session: &mut Session, text: &str) {
        let Some(name) = normalize_name(text) else {
            session.state = Some(DialogueState::AwaitingName);
            self.say(user_id, "Напиши, пожалуйста, имя.", None).await;
            return;
        };

        if let Err(e) = self.store.set_name(user_id, Some(&name)) {
            warn!(user_id, error = %e, "failed to persist name");
        }
        info!(user_id, "name collected");
        self.ask_goal(user_id, session, name).await;
    }

    pub(super) async fn on_goal(
        &self,
        user_id: i64,
        session: &mut Session,
        name: String,
        command: Option<Command>,
        text: &str,
    ) {
        let goal = match command {
            Some(Command::Goal(goal)) => Some(goal),
            Some(_) => None,
            None => Goal::recognize(text),
        };

        match goal {
            Some(goal) => {
                info!(user_id, goal = goal.as_str(), "goal selected");
                session.state = Some(DialogueState::AwaitingGender { name, goal });
                self.say(user_id, "Укажи свой пол:", Some(Keyboard::Gender))
                    .await;
            }
            None => {
                session.state = Some(DialogueState::AwaitingGoal { name });
                self.say(
                    user_id,
                    "Пожалуйста, выбери цель кнопкой ниже:",
                    Some(Keyboard::Goal),
                )
                .await;
            }
        }
    }

    pub(super) async fn on_gender(
        &self,
        user_id: i64,
        session: &mut Session,
        name: String,
        goal: Goal,
        command: Option<Command>,
        text: &str,
    ) {
        let gender = match command {
            Some(Command::Gender(gender)) => Some(gender),
            Some(_) => None,
            None => Gender::recognize(text),
        };

        let Some(gender) = gender else {
            session.state = Some(DialogueState::AwaitingGender { name, goal });
            self.say(
                user_id,
                "Пожалуйста, выбери пол кнопкой ниже:",
                Some(Keyboard::Gender),
            )
            .await;
            return;
        };

        session.state = Some(DialogueState::Survey {
            basics: Basics { name, goal, gender },
            answers: SurveyAnswers::default(),
            step: SurveyStep::Age,
        });
        self.say(user_id, SurveyStep::Age.question(), None).await;
    }

    pub(super) async fn on_survey_answer(
        &self,
        user_id: i64,
        session: &mut Session,
        basics: Basics,
        mut answers: SurveyAnswers,
        step: SurveyStep,
        text: &str,
    ) {
        let accepted: Result<Option<u32>, ValidationError> = match step {
            SurveyStep::Age => validate_age(text).map(|v| {
                answers.age = Some(v);
                None
            }),
            SurveyStep::Height => validate_height(text).map(|v| {
                answers.height = Some(v);
                None
            }),
            SurveyStep::Weight => validate_weight(text).map(|v| {
                answers.weight = Some(v);
                None
            }),
            SurveyStep::GoalWeight => validate_weight(text).map(|v| {
                answers.goal_weight = Some(v);
                None
            }),
            SurveyStep::Restrictions => {
                answers.restrictions = parse_restrictions(text);
                Ok(None)
            }
            SurveyStep::Schedule => validate_schedule(text).map(Some),
        };

        let schedule = match accepted {
            Ok(schedule) => schedule,
            Err(e) => {
                session.state = Some(DialogueState::Survey {
                    basics,
                    answers,
                    step,
                });
                self.say(user_id, format!("\u{274C} {e}\n\nПопробуй ещё раз:"), None)
                    .await;
                return;
            }
        };

        if let Some(next) = step.next() {
            session.state = Some(DialogueState::Survey {
                basics,
                answers,
                step: next,
            });
            self.say(user_id, next.question(), None).await;
            return;
        }

        let finished = schedule.and_then(|s| answers.finish(s));
        match finished {
            Some(measurements) => {
                session.state = Some(DialogueState::AwaitingLevel {
                    basics,
                    measurements,
                });
                self.say(
                    user_id,
                    "Выбери свой уровень подготовки:",
                    Some(Keyboard::Level),
                )
                .await;
            }
            None => {
                warn!(user_id, "survey finished with missing answers, restarting survey");
                session.state = Some(DialogueState::Survey {
                    basics,
                    answers: SurveyAnswers::default(),
                    step: SurveyStep::Age,
                });
                self.say(user_id, SurveyStep::Age.question(), None).await;
            }
        }
    }

    pub(super) async fn on_level(
        &self,
        user_id: i64,
        session: &mut Session,
        basics: Basics,
        measurements: Measurements,
        command: Option<Command>,
    ) {
        let Some(Command::Level(level)) = command else {
            session.state = Some(DialogueState::AwaitingLevel {
                basics,
                measurements,
            });
            self.say(
                user_id,
                "Пожалуйста, выбери уровень кнопкой ниже:",
                Some(Keyboard::Level),
            )
            .await;
            return;
        };

        session.state = Some(DialogueState::AwaitingMuscleGroup {
            basics,
            measurements,
            level,
        });
        self.say(
            user_id,
            "Отлично! Теперь выбери, на какую группу мышц хочешь сделать акцент в тренировках \u{2B07}\u{FE0F}",
            Some(Keyboard::MuscleGroups),
        )
        .await;
    }

    pub(super) async fn on_muscle_group(
        &self,
        user_id: i64,
        session: &mut Session,
        collected: (Basics, Measurements, Level),
        command: Option<Command>,
    ) {
        let (basics, measurements, level) = collected;
        let Some(Command::Muscle(focus)) = command else {
            session.state = Some(DialogueState::AwaitingMuscleGroup {
                basics,
                measurements,
                level,
            });
            self.say(
                user_id,
                "Пожалуйста, выбери группу мышц кнопкой ниже:",
                Some(Keyboard::MuscleGroups),
            )
            .await;
            return;
        };

        let profile = self.complete_profile(user_id, basics, measurements, level, focus);
        info!(user_id, muscle = focus.as_str(), "onboarding completed");
        self.first_program(user_id, session, &profile).await;
    }

    /// Merge every onboarding answer into the stored profile and mark it
    /// complete.
    fn complete_profile(
        &self,
        user_id: i64,
        basics: Basics,
        measurements: Measurements,
        level: Level,
        focus: MuscleFocus,
    ) -> crate::profile::UserProfile {
        let mut profile = self.store.load(user_id);
        let data = &mut profile.physical_data;
        data.name = Some(basics.name);
        data.target = Some(basics.goal.as_str().to_owned());
        data.gender = Some(basics.gender.as_str().to_owned());
        data.age = Some(measurements.age);
        data.height = Some(measurements.height);
        data.weight = Some(measurements.weight);
        data.goal = Some(measurements.goal_weight);
        data.restrictions = measurements.restrictions;
        data.schedule = Some(measurements.schedule);
        data.level = Some(level.as_str().to_owned());
        data.preferred_muscle_group = Some(focus.as_str().to_owned());
        profile.physical_data_completed = true;

        if let Err(e) = self.store.save(user_id, &profile) {
            error!(user_id, error = %e, "failed to save completed profile");
        }
        profile
    }
}
