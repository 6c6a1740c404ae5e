//! Per-user dialogue stage.
//!
//! Each variant carries exactly the answers collected so far, so a later
//! stage can never read an answer that was not given.

use crate::profile::{Gender, Goal, Level, MuscleFocus};

use super::command::EditableField;

/// Current stage of a user's conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogueState {
    /// Waiting for the user's name.
    AwaitingName,
    /// Name known, waiting for a goal button.
    AwaitingGoal {
        /// Normalized name.
        name: String,
    },
    /// Waiting for gender.
    AwaitingGender {
        /// Normalized name.
        name: String,
        /// Chosen goal.
        goal: Goal,
    },
    /// Numeric survey; `step` is the question currently shown.
    Survey {
        /// Name, goal and gender.
        basics: Basics,
        /// Answers validated so far.
        answers: SurveyAnswers,
        /// Question awaiting an answer.
        step: SurveyStep,
    },
    /// Survey complete, waiting for a level button.
    AwaitingLevel {
        /// Name, goal and gender.
        basics: Basics,
        /// All survey answers.
        measurements: Measurements,
    },
    /// Level chosen, waiting for a muscle emphasis button.
    AwaitingMuscleGroup {
        /// Name, goal and gender.
        basics: Basics,
        /// All survey answers.
        measurements: Measurements,
        /// Chosen level.
        level: Level,
    },
    /// Editing a single field of a completed profile.
    Editing(EditableField),
    /// Choosing a new goal for a completed profile.
    ChangingGoal,
    /// Every message is a question for the coach.
    Qa,
    /// Choosing a program style, optionally with a muscle emphasis.
    ChoosingVariation {
        /// Emphasis picked on the previous screen.
        muscle: Option<MuscleFocus>,
    },
}

impl DialogueState {
    /// Short stage name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AwaitingName => "awaiting_name",
            Self::AwaitingGoal { .. } => "awaiting_goal",
            Self::AwaitingGender { .. } => "awaiting_gender",
            Self::Survey { .. } => "survey",
            Self::AwaitingLevel { .. } => "awaiting_level",
            Self::AwaitingMuscleGroup { .. } => "awaiting_muscle_group",
            Self::Editing(_) => "editing",
            Self::ChangingGoal => "changing_goal",
            Self::Qa => "qa",
            Self::ChoosingVariation { .. } => "choosing_variation",
        }
    }
}

/// Answers collected before the survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basics {
    /// Normalized name.
    pub name: String,
    /// Training goal.
    pub goal: Goal,
    /// Gender.
    pub gender: Gender,
}

/// Survey questions, in the order they are asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyStep {
    /// Age in years.
    Age,
    /// Height in centimetres.
    Height,
    /// Current weight.
    Weight,
    /// Desired weight.
    GoalWeight,
    /// Restrictions or preferences.
    Restrictions,
    /// Sessions per week.
    Schedule,
}

impl SurveyStep {
    /// The question shown to the user.
    pub fn question(self) -> &'static str {
        match self {
            Self::Age => "Сколько тебе лет?",
            Self::Height => "Твой рост в сантиметрах?",
            Self::Weight => "Твой текущий вес в килограммах?",
            Self::GoalWeight => "Желаемый вес в килограммах?",
            Self::Restrictions => {
                "Есть ли ограничения по здоровью или предпочтения в тренировках?"
            }
            Self::Schedule => "Сколько раз в неделю можешь посещать тренажёрный зал?",
        }
    }

    /// The following question, or `None` after the last one.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Age => Some(Self::Height),
            Self::Height => Some(Self::Weight),
            Self::Weight => Some(Self::GoalWeight),
            Self::GoalWeight => Some(Self::Restrictions),
            Self::Restrictions => Some(Self::Schedule),
            Self::Schedule => None,
        }
    }
}

/// Survey answers validated so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurveyAnswers {
    /// Age in years.
    pub age: Option<u32>,
    /// Height in centimetres.
    pub height: Option<u32>,
    /// Current weight in kilograms.
    pub weight: Option<f64>,
    /// Desired weight in kilograms.
    pub goal_weight: Option<f64>,
    /// Restrictions; `None` also when the user has none.
    pub restrictions: Option<String>,
}

impl SurveyAnswers {
    /// Combine with the final answer into a full set of measurements.
    ///
    /// Returns `None` if a numeric answer is missing.
    pub fn finish(self, schedule: u32) -> Option<Measurements> {
        Some(Measurements {
            age: self.age?,
            height: self.height?,
            weight: self.weight?,
            goal_weight: self.goal_weight?,
            restrictions: self.restrictions,
            schedule,
        })
    }
}

/// All survey answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurements {
    /// Age in years.
    pub age: u32,
    /// Height in centimetres.
    pub height: u32,
    /// Current weight in kilograms.
    pub weight: f64,
    /// Desired weight in kilograms.
    pub goal_weight: f64,
    /// Restrictions, if any.
    pub restrictions: Option<String>,
    /// Sessions per week.
    pub schedule: u32,
}

/// Interpret a restrictions answer; `нет`, `no` and `-` mean none.
pub fn parse_restrictions(text: &str) -> Option<String> {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();
    if trimmed.is_empty() || matches!(lower.as_str(), "нет" | "no" | "-") {
        None
    } else {
        Some(trimmed.to_owned())
    }
}
