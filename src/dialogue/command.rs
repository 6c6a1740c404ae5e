//! Button captions decoded into typed commands.
//!
//! Captions are the only place display strings meet dialogue logic; the
//! engine matches on [`Command`] and the Telegram layer renders [`Keyboard`].

use crate::profile::{Gender, Goal, Level, MuscleFocus, ProfileField};

/// Main menu: ask the coach.
pub const ASK_COACH: &str = "\u{2753} Задать вопрос AI-тренеру";
/// Main menu: another program.
pub const ANOTHER_PROGRAM: &str = "\u{1F195} Другая программа";
/// Main menu: change goal.
pub const CHANGE_GOAL: &str = "\u{1F3AF} Изменить цель";
/// Main menu: show profile.
pub const MY_PROFILE: &str = "\u{1F4CB} Моя анкета";
/// Main menu: edit parameters.
pub const EDIT_PARAMS: &str = "\u{2699}\u{FE0F} Изменить параметры";
/// Main menu: export last reply.
pub const SAVE_TO_FILE: &str = "\u{1F4BE} Сохранить в файл";
/// Main menu: list exports.
pub const SAVED_ANSWERS: &str = "\u{1F4D1} История ответов";
/// Main menu: full restart.
pub const RESTART: &str = "\u{1F501} Начать заново";
/// Back to the main menu.
pub const BACK_TO_MENU: &str = "\u{25C0}\u{FE0F} Назад в меню";

/// A decoded button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Enter Q&A mode.
    AskCoach,
    /// Pick a muscle emphasis for a new program.
    AnotherProgram,
    /// Change the training goal.
    ChangeGoal,
    /// Show the stored profile.
    MyProfile,
    /// Open the edit-parameters menu.
    EditParams,
    /// Export the last reply to a file.
    SaveToFile,
    /// Send saved exports.
    SavedAnswers,
    /// Full reset including the name.
    Restart,
    /// Clear the current stage and show the main menu.
    BackToMenu,
    /// A goal button.
    Goal(Goal),
    /// A gender button.
    Gender(Gender),
    /// A level button.
    Level(Level),
    /// A muscle emphasis button.
    Muscle(MuscleFocus),
    /// A program style button.
    Variation(Variation),
    /// An edit-parameter button.
    Edit(EditableField),
}

impl Command {
    /// Decode an exact caption. Anything else is free text.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let simple = match text {
            ASK_COACH => Some(Self::AskCoach),
            ANOTHER_PROGRAM => Some(Self::AnotherProgram),
            CHANGE_GOAL => Some(Self::ChangeGoal),
            MY_PROFILE => Some(Self::MyProfile),
            EDIT_PARAMS => Some(Self::EditParams),
            SAVE_TO_FILE => Some(Self::SaveToFile),
            SAVED_ANSWERS => Some(Self::SavedAnswers),
            RESTART => Some(Self::Restart),
            BACK_TO_MENU => Some(Self::BackToMenu),
            _ => None,
        };
        simple
            .or_else(|| {
                Goal::ALL
                    .into_iter()
                    .find(|g| goal_caption(*g) == text)
                    .map(Self::Goal)
            })
            .or_else(|| {
                [Gender::Female, Gender::Male]
                    .into_iter()
                    .find(|g| gender_caption(*g) == text)
                    .map(Self::Gender)
            })
            .or_else(|| {
                [Level::Beginner, Level::Experienced]
                    .into_iter()
                    .find(|l| level_caption(*l) == text)
                    .map(Self::Level)
            })
            .or_else(|| {
                MuscleFocus::ALL
                    .into_iter()
                    .find(|m| muscle_caption(*m) == text)
                    .map(Self::Muscle)
            })
            .or_else(|| {
                Variation::ALL
                    .into_iter()
                    .find(|v| v.caption() == text)
                    .map(Self::Variation)
            })
            .or_else(|| {
                EditableField::ALL
                    .into_iter()
                    .find(|f| f.caption() == text)
                    .map(Self::Edit)
            })
    }
}

/// Caption of a goal button.
pub fn goal_caption(goal: Goal) -> &'static str {
    match goal {
        Goal::MassGain => "\u{1F3CB}\u{FE0F}\u{200D}\u{2642}\u{FE0F} Набрать массу",
        Goal::WeightLoss => "\u{1F3C3}\u{200D}\u{2642}\u{FE0F} Похудеть",
        Goal::Maintenance => "\u{1F9D8} Поддерживать форму",
    }
}

/// Caption of a gender button.
pub fn gender_caption(gender: Gender) -> &'static str {
    match gender {
        Gender::Female => "\u{1F469} Женский",
        Gender::Male => "\u{1F468} Мужской",
    }
}

/// Caption of a level button.
pub fn level_caption(level: Level) -> &'static str {
    match level {
        Level::Beginner => "\u{1F680} Начинающий",
        Level::Experienced => "\u{1F525} Опытный",
    }
}

/// Caption of a muscle emphasis button.
pub fn muscle_caption(focus: MuscleFocus) -> &'static str {
    match focus {
        MuscleFocus::Legs => "\u{1F9B5} Упор на ноги",
        MuscleFocus::Glutes => "\u{1F351} Упор на ягодицы",
        MuscleFocus::Back => "\u{1F519} Упор на спину",
        MuscleFocus::ShouldersArms => "\u{1F4AA} Упор на плечи и руки",
        MuscleFocus::Balanced => "\u{1F3B2} Сбалансированная программа",
    }
}

/// Program style requested from the coach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variation {
    /// Compound lifts.
    MoreCompound,
    /// Isolation work.
    MoreIsolation,
    /// Strength: low reps, heavy weights.
    Strength,
    /// Endurance: high reps, short rest.
    Endurance,
    /// Unusual exercise choice.
    Random,
}

impl Variation {
    /// Every variation, in keyboard order.
    pub const ALL: [Variation; 5] = [
        Variation::MoreCompound,
        Variation::MoreIsolation,
        Variation::Strength,
        Variation::Endurance,
        Variation::Random,
    ];

    /// Button caption.
    pub fn caption(self) -> &'static str {
        match self {
            Self::MoreCompound => "\u{1F4AA} Больше базовых",
            Self::MoreIsolation => "\u{1F3AF} Больше изоляции",
            Self::Strength => "\u{1F3CB}\u{FE0F} Акцент на силу",
            Self::Endurance => "\u{26A1} Акцент на выносливость",
            Self::Random => "\u{1F3B2} Случайная вариация",
        }
    }

    /// Instruction passed to the coach as preferences.
    pub fn instruction(self) -> &'static str {
        match self {
            Self::MoreCompound => {
                "Сделай акцент на базовые многосуставные упражнения (приседания, становая, \
                 жимы, подтягивания и тому подобные базовые силовые упражнения для тренажерного зала)."
            }
            Self::MoreIsolation => {
                "Добавь больше изолирующих упражнений для проработки отдельных мышечных групп."
            }
            Self::Strength => {
                "Программа с акцентом на развитие силы: меньше повторений (4-6), больше отдыха, \
                 тяжелые веса."
            }
            Self::Endurance => {
                "Программа с акцентом на выносливость: больше повторений (15-20), меньше отдыха, \
                 умеренные веса."
            }
            Self::Random => {
                "Сделай максимально разнообразную и нестандартную программу, используй \
                 креативные упражнения."
            }
        }
    }

    /// Preferences text, with a muscle emphasis sentence when one was chosen.
    pub fn preferences(self, muscle: Option<MuscleFocus>) -> String {
        let mut text = self.instruction().to_owned();
        if let Some(focus) = muscle {
            text.push_str(&format!(
                " Сделай ОСОБЫЙ АКЦЕНТ на {}. Включи больше упражнений для этой группы мышц.",
                focus.emphasis_phrase()
            ));
        }
        text
    }
}

/// A field reachable from the edit-parameters menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditableField {
    /// Name.
    Name,
    /// Age.
    Age,
    /// Current weight.
    Weight,
    /// Desired weight.
    GoalWeight,
    /// Sessions per week.
    Schedule,
    /// Experience level.
    Level,
    /// Muscle emphasis.
    MuscleGroup,
    /// Restrictions or preferences.
    Restrictions,
}

impl EditableField {
    /// Every editable field, in keyboard order.
    pub const ALL: [EditableField; 8] = [
        EditableField::Name,
        EditableField::Age,
        EditableField::Weight,
        EditableField::GoalWeight,
        EditableField::Schedule,
        EditableField::Level,
        EditableField::MuscleGroup,
        EditableField::Restrictions,
    ];

    /// Button caption.
    pub fn caption(self) -> &'static str {
        match self {
            Self::Name => "\u{1F464} Имя",
            Self::Age => "\u{1F522} Возраст",
            Self::Weight => "\u{2696}\u{FE0F} Текущий вес",
            Self::GoalWeight => "\u{1F3AF} Желаемый вес",
            Self::Schedule => "\u{1F4C8} Частота тренировок",
            Self::Level => "\u{1F3CB}\u{FE0F} Уровень подготовки",
            Self::MuscleGroup => "\u{1F4AA} Акцент на мышцы",
            Self::Restrictions => "\u{26A0}\u{FE0F} Ограничения / предпочтения",
        }
    }

    /// Stored profile field.
    pub fn field(self) -> ProfileField {
        match self {
            Self::Name => ProfileField::Name,
            Self::Age => ProfileField::Age,
            Self::Weight => ProfileField::Weight,
            Self::GoalWeight => ProfileField::GoalWeight,
            Self::Schedule => ProfileField::Schedule,
            Self::Level => ProfileField::Level,
            Self::MuscleGroup => ProfileField::PreferredMuscleGroup,
            Self::Restrictions => ProfileField::Restrictions,
        }
    }
}

/// Reply keyboard attached to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// Main menu.
    Main,
    /// Goal selection.
    Goal,
    /// Gender selection.
    Gender,
    /// Level selection.
    Level,
    /// Muscle emphasis selection.
    MuscleGroups,
    /// Program style selection.
    Variations,
    /// Edit-parameters menu.
    EditParams,
}

impl Keyboard {
    /// Button captions, row by row.
    pub fn rows(self) -> Vec<Vec<&'static str>> {
        match self {
            Self::Main => vec![
                vec![ASK_COACH],
                vec![ANOTHER_PROGRAM, CHANGE_GOAL],
                vec![MY_PROFILE, EDIT_PARAMS],
                vec![SAVE_TO_FILE, SAVED_ANSWERS],
                vec![RESTART],
            ],
            Self::Goal => vec![Goal::ALL.into_iter().map(goal_caption).collect()],
            Self::Gender => vec![vec![
                gender_caption(Gender::Female),
                gender_caption(Gender::Male),
            ]],
            Self::Level => vec![vec![
                level_caption(Level::Beginner),
                level_caption(Level::Experienced),
            ]],
            Self::MuscleGroups => vec![
                vec![
                    muscle_caption(MuscleFocus::Legs),
                    muscle_caption(MuscleFocus::Glutes),
                ],
                vec![
                    muscle_caption(MuscleFocus::Back),
                    muscle_caption(MuscleFocus::ShouldersArms),
                ],
                vec![muscle_caption(MuscleFocus::Balanced)],
                vec![BACK_TO_MENU],
            ],
            Self::Variations => vec![
                vec![
                    Variation::MoreCompound.caption(),
                    Variation::MoreIsolation.caption(),
                ],
                vec![Variation::Strength.caption(), Variation::Endurance.caption()],
                vec![Variation::Random.caption()],
                vec![BACK_TO_MENU],
            ],
            Self::EditParams => vec![
                vec![EditableField::Name.caption(), EditableField::Age.caption()],
                vec![
                    EditableField::Weight.caption(),
                    EditableField::GoalWeight.caption(),
                ],
                vec![
                    EditableField::Schedule.caption(),
                    EditableField::Level.caption(),
                ],
                vec![EditableField::MuscleGroup.caption()],
                vec![EditableField::Restrictions.caption()],
                vec![BACK_TO_MENU],
            ],
        }
    }

    /// Whether the keyboard stays visible after a press.
    pub fn is_persistent(self) -> bool {
        matches!(self, Self::Main)
    }
}
