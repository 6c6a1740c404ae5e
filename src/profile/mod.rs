//! Per-user profile documents.
//!
//! A profile is one pretty-printed JSON file per user (`<user_id>.json`).
//! Every read goes through [`normalize`], so malformed or legacy documents
//! are coerced to the current schema instead of failing, and every write is
//! an atomic tmp-file + rename.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub mod export;
pub mod fields;
mod normalize;
pub mod render;
pub mod store;
pub mod validate;

pub use fields::{FieldKind, FieldValue, Gender, Goal, Level, MuscleFocus, ProfileField};
pub use normalize::normalize;
pub use store::ProfileStore;

/// Maximum number of entries kept in a lift's history.
pub const LIFT_HISTORY_LIMIT: usize = 50;

/// Maximum length of a stored name, in characters.
pub const NAME_MAX_CHARS: usize = 80;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// The persisted per-user document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Append-only audit log of profile edits.
    pub history: Vec<HistoryEntry>,
    /// Physical attributes and training preferences.
    pub physical_data: PhysicalData,
    /// Per-exercise lift records.
    pub lifts: BTreeMap<String, LiftRecord>,
    /// Last text produced by any generation.
    pub last_reply: Option<String>,
    /// Last generated program.
    pub last_program: Option<String>,
    /// Whether onboarding produced every required field.
    pub physical_data_completed: bool,
    /// Reserved.
    pub programs: Vec<serde_json::Value>,
}

/// One `(label, result)` pair of the profile history.
///
/// Serialized as a two-element JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry(pub String, pub String);

impl HistoryEntry {
    /// Build an entry from its label and result text.
    pub fn new(label: impl Into<String>, result: impl Into<String>) -> Self {
        Self(label.into(), result.into())
    }

    /// The prompt label.
    pub fn label(&self) -> &str {
        &self.0
    }

    /// The result text.
    pub fn result(&self) -> &str {
        &self.1
    }
}

/// The fixed set of physical attributes.
///
/// Absent values serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalData {
    /// Display name.
    pub name: Option<String>,
    /// `женский` or `мужской`.
    pub gender: Option<String>,
    /// Age in years.
    pub age: Option<u32>,
    /// Height in centimetres.
    pub height: Option<u32>,
    /// Current weight in kilograms.
    pub weight: Option<f64>,
    /// Desired weight in kilograms.
    pub goal: Option<f64>,
    /// Health restrictions or training preferences.
    pub restrictions: Option<String>,
    /// `начинающий` or `опытный`.
    pub level: Option<String>,
    /// Sessions per week.
    pub schedule: Option<u32>,
    /// Training goal, see [`Goal`].
    pub target: Option<String>,
    /// Muscle group emphasis, see [`MuscleFocus`].
    pub preferred_muscle_group: Option<String>,
}

impl PhysicalData {
    /// Current value of `field`.
    pub fn get(&self, field: ProfileField) -> Option<FieldValue> {
        let text = |v: &Option<String>| v.clone().map(FieldValue::Text);
        match field {
            ProfileField::Name => text(&self.name),
            ProfileField::Gender => text(&self.gender),
            ProfileField::Age => self.age.map(FieldValue::Integer),
            ProfileField::Height => self.height.map(FieldValue::Integer),
            ProfileField::Weight => self.weight.map(FieldValue::Decimal),
            ProfileField::GoalWeight => self.goal.map(FieldValue::Decimal),
            ProfileField::Restrictions => text(&self.restrictions),
            ProfileField::Level => text(&self.level),
            ProfileField::Schedule => self.schedule.map(FieldValue::Integer),
            ProfileField::Target => text(&self.target),
            ProfileField::PreferredMuscleGroup => text(&self.preferred_muscle_group),
        }
    }

    /// Replace the value of `field`.
    ///
    /// Integers are accepted for decimal fields.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::FieldType`] when the value kind does not match
    /// the field.
    pub fn set(
        &mut self,
        field: ProfileField,
        value: Option<FieldValue>,
    ) -> Result<(), ProfileError> {
        let mismatch = |value: &FieldValue| ProfileError::FieldType {
            field: field.key(),
            found: value.kind(),
        };

        match field.kind() {
            FieldKind::Text => {
                let slot = match field {
                    ProfileField::Name => &mut self.name,
                    ProfileField::Gender => &mut self.gender,
                    ProfileField::Restrictions => &mut self.restrictions,
                    ProfileField::Level => &mut self.level,
                    ProfileField::Target => &mut self.target,
                    _ => &mut self.preferred_muscle_group,
                };
                *slot = match value {
                    None => None,
                    Some(FieldValue::Text(t)) => Some(t),
                    Some(other) => return Err(mismatch(&other)),
                };
            }
            FieldKind::Integer => {
                let slot = match field {
                    ProfileField::Age => &mut self.age,
                    ProfileField::Height => &mut self.height,
                    _ => &mut self.schedule,
                };
                *slot = match value {
                    None => None,
                    Some(FieldValue::Integer(n)) => Some(n),
                    Some(other) => return Err(mismatch(&other)),
                };
            }
            FieldKind::Decimal => {
                let slot = match field {
                    ProfileField::Weight => &mut self.weight,
                    _ => &mut self.goal,
                };
                *slot = match value {
                    None => None,
                    Some(FieldValue::Decimal(d)) => Some(d),
                    Some(FieldValue::Integer(n)) => Some(f64::from(n)),
                    Some(other) => return Err(mismatch(&other)),
                };
            }
        }
        Ok(())
    }

    /// Stored training goal, if it is one of the known values.
    pub fn goal_kind(&self) -> Option<Goal> {
        self.target.as_deref().and_then(Goal::from_stored)
    }

    /// Stored muscle emphasis, if it is one of the known values.
    pub fn muscle_focus(&self) -> Option<MuscleFocus> {
        self.preferred_muscle_group
            .as_deref()
            .and_then(MuscleFocus::from_stored)
    }
}

/// Latest lift numbers for one exercise plus a bounded history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiftRecord {
    /// Weight of the latest set.
    #[serde(default)]
    pub last_weight: Option<f64>,
    /// Repetitions of the latest set.
    #[serde(default)]
    pub reps: Option<u32>,
    /// Reps in reserve of the latest set.
    #[serde(default)]
    pub rir: Option<u32>,
    /// Most recent entries, oldest first.
    #[serde(default)]
    pub history: Vec<LiftEntry>,
}

/// One recorded set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiftEntry {
    /// Unix timestamp in seconds.
    pub ts: i64,
    /// Weight lifted.
    pub last_weight: f64,
    /// Repetitions.
    pub reps: u32,
    /// Reps in reserve.
    pub rir: Option<u32>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from profile persistence.
#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    /// Filesystem failure.
    #[error("profile io error at {}: {source}", path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Serialization failure.
    #[error("profile serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    /// A value of the wrong kind was given for a field.
    #[error("field {field} does not accept a {found:?} value")]
    FieldType {
        /// JSON key of the field.
        field: &'static str,
        /// Kind of the rejected value.
        found: FieldKind,
    },
}

/// Trim a name and cap it at [`NAME_MAX_CHARS`]. Empty names become `None`.
pub fn normalize_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(NAME_MAX_CHARS).collect())
}
