//! Typed profile fields and the fixed vocabularies stored in them.
//!
//! Stored values stay in the Russian wording the bot has always written to
//! disk, so existing user files keep loading without migration.

use std::fmt;

/// Training goal (persisted as `physical_data.target`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Goal {
    /// Lose weight.
    WeightLoss,
    /// Gain muscle mass.
    MassGain,
    /// Keep current shape.
    Maintenance,
}

impl Goal {
    /// Every goal, in keyboard order.
    pub const ALL: [Goal; 3] = [Goal::MassGain, Goal::WeightLoss, Goal::Maintenance];

    /// Value written to the profile document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WeightLoss => "похудение",
            Self::MassGain => "набор массы",
            Self::Maintenance => "поддержание формы",
        }
    }

    /// Icon shown next to the goal in the profile text.
    pub fn icon(self) -> &'static str {
        match self {
            Self::WeightLoss => "\u{1F3C3}\u{200D}\u{2642}\u{FE0F}",
            Self::MassGain => "\u{1F3CB}\u{FE0F}\u{200D}\u{2642}\u{FE0F}",
            Self::Maintenance => "\u{1F9D8}",
        }
    }

    /// Parse a stored profile value.
    pub fn from_stored(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == value)
    }

    /// Recognise a goal in free text by word stems.
    pub fn recognize(text: &str) -> Option<Self> {
        let t = text.to_lowercase();
        if ["похуд", "сброс", "жир"].iter().any(|w| t.contains(w)) {
            return Some(Self::WeightLoss);
        }
        if ["набра", "мас", "мышц"].iter().any(|w| t.contains(w)) {
            return Some(Self::MassGain);
        }
        if ["поддерж", "форма", "тони", "укреп"].iter().any(|w| t.contains(w)) {
            return Some(Self::Maintenance);
        }
        None
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender as stored in the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    /// Female.
    Female,
    /// Male.
    Male,
}

impl Gender {
    /// Value written to the profile document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Female => "женский",
            Self::Male => "мужской",
        }
    }

    /// Recognise a gender from a button caption or free text.
    pub fn recognize(text: &str) -> Option<Self> {
        let t = text.to_lowercase();
        if t.contains("жен") || t.contains('\u{1F469}') {
            return Some(Self::Female);
        }
        if t.contains("муж") || t.contains('\u{1F468}') {
            return Some(Self::Male);
        }
        None
    }
}

/// Training experience level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// New to the gym.
    Beginner,
    /// Has training experience.
    Experienced,
}

impl Level {
    /// Value written to the profile document.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "начинающий",
            Self::Experienced => "опытный",
        }
    }
}

/// Muscle group the user wants programs to emphasise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MuscleFocus {
    /// Legs.
    Legs,
    /// Glutes.
    Glutes,
    /// Back.
    Back,
    /// Shoulders and arms.
    ShouldersArms,
    /// No particular emphasis.
    Balanced,
}

impl MuscleFocus {
    /// Every focus, in keyboard order.
    pub const ALL: [MuscleFocus; 5] = [
        MuscleFocus::Legs,
        MuscleFocus::Glutes,
        MuscleFocus::Back,
        MuscleFocus::ShouldersArms,
        MuscleFocus::Balanced,
    ];

    /// Value written to `physical_data.preferred_muscle_group`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Legs => "ноги",
            Self::Glutes => "ягодицы",
            Self::Back => "спина",
            Self::ShouldersArms => "плечи и руки",
            Self::Balanced => "сбалансированно",
        }
    }

    /// Phrase inserted into a program request ("акцент на ...").
    pub fn emphasis_phrase(self) -> &'static str {
        match self {
            Self::Balanced => "все группы мышц сбалансированно",
            other => other.as_str(),
        }
    }

    /// Label with icon used in the profile text.
    pub fn display_label(self) -> &'static str {
        match self {
            Self::Legs => "\u{1F9B5} Ноги",
            Self::Glutes => "\u{1F351} Ягодицы",
            Self::Back => "\u{1F519} Спина",
            Self::ShouldersArms => "\u{1F4AA} Плечи и руки",
            Self::Balanced => "\u{1F3B2} Сбалансированно",
        }
    }

    /// Parse a stored profile value.
    pub fn from_stored(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == value)
    }
}

/// Storage kind of a profile field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free or enumerated text.
    Text,
    /// Whole number.
    Integer,
    /// Number with one decimal place.
    Decimal,
}

/// One of the fixed keys of `physical_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    /// Display name.
    Name,
    /// Gender.
    Gender,
    /// Age in years.
    Age,
    /// Height in centimetres.
    Height,
    /// Current weight in kilograms.
    Weight,
    /// Desired weight in kilograms (stored under `goal`).
    GoalWeight,
    /// Health restrictions or training preferences.
    Restrictions,
    /// Experience level.
    Level,
    /// Sessions per week (stored under `schedule`).
    Schedule,
    /// Training goal (stored under `target`).
    Target,
    /// Muscle group emphasis.
    PreferredMuscleGroup,
}

impl ProfileField {
    /// Every field, in document order.
    pub const ALL: [ProfileField; 11] = [
        ProfileField::Name,
        ProfileField::Gender,
        ProfileField::Age,
        ProfileField::Height,
        ProfileField::Weight,
        ProfileField::GoalWeight,
        ProfileField::Restrictions,
        ProfileField::Level,
        ProfileField::Schedule,
        ProfileField::Target,
        ProfileField::PreferredMuscleGroup,
    ];

    /// Fields older documents kept at the root instead of in `physical_data`.
    pub const LEGACY_ROOT: [ProfileField; 3] =
        [ProfileField::Schedule, ProfileField::Level, ProfileField::Target];

    /// JSON key inside `physical_data`.
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::GoalWeight => "goal",
            Self::Restrictions => "restrictions",
            Self::Level => "level",
            Self::Schedule => "schedule",
            Self::Target => "target",
            Self::PreferredMuscleGroup => "preferred_muscle_group",
        }
    }

    /// How the value is stored.
    pub fn kind(self) -> FieldKind {
        match self {
            Self::Age | Self::Height | Self::Schedule => FieldKind::Integer,
            Self::Weight | Self::GoalWeight => FieldKind::Decimal,
            _ => FieldKind::Text,
        }
    }

    /// Label used in history entries ("Изменение: <label>").
    pub fn history_label(self) -> &'static str {
        match self {
            Self::Name => "\u{1F464} имя",
            Self::Age => "\u{1F522} возраст",
            Self::Weight => "\u{2696}\u{FE0F} текущий вес",
            Self::GoalWeight => "\u{1F3AF} желаемый вес",
            Self::Schedule => "\u{1F4C8} частоту тренировок",
            Self::Restrictions => "\u{26A0}\u{FE0F} ограничения",
            Self::Level => "\u{1F3CB}\u{FE0F} уровень подготовки",
            Self::Height => "\u{1F4CF} рост",
            Self::PreferredMuscleGroup => "\u{1F4AA} акцент на мышцы",
            other => other.key(),
        }
    }
}

/// A value held by a profile field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text value.
    Text(String),
    /// Whole number.
    Integer(u32),
    /// Decimal number.
    Decimal(f64),
}

impl FieldValue {
    /// Shorthand for a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// The storage kind of this value.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Integer(_) => FieldKind::Integer,
            Self::Decimal(_) => FieldKind::Decimal,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(t) => f.write_str(t),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Decimal(d) => write!(f, "{d:.1}"),
        }
    }
}

impl From<Goal> for FieldValue {
    fn from(goal: Goal) -> Self {
        Self::text(goal.as_str())
    }
}

impl From<Gender> for FieldValue {
    fn from(gender: Gender) -> Self {
        Self::text(gender.as_str())
    }
}

impl From<Level> for FieldValue {
    fn from(level: Level) -> Self {
        Self::text(level.as_str())
    }
}

impl From<MuscleFocus> for FieldValue {
    fn from(focus: MuscleFocus) -> Self {
        Self::text(focus.as_str())
    }
}
