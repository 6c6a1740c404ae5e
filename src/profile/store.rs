//! File-backed profile store with atomic writes.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::{
    normalize, normalize_name, render, FieldValue, Goal, HistoryEntry, LiftEntry, LiftRecord,
    ProfileError, ProfileField, UserProfile, LIFT_HISTORY_LIMIT,
};

/// Loads and saves `<user_id>.json` documents under one directory.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    users_dir: PathBuf,
}

impl ProfileStore {
    /// Create a store rooted at `users_dir`. The directory is created lazily.
    pub fn new(users_dir: impl Into<PathBuf>) -> Self {
        Self {
            users_dir: users_dir.into(),
        }
    }

    /// Directory holding profile and export files.
    pub fn users_dir(&self) -> &Path {
        &self.users_dir
    }

    /// Path of a user's profile document.
    pub fn path_for(&self, user_id: i64) -> PathBuf {
        self.users_dir.join(format!("{user_id}.json"))
    }

    /// Load a user's profile.
    ///
    /// A missing or unreadable file yields the default document.
    pub fn load(&self, user_id: i64) -> UserProfile {
        let path = self.path_for(user_id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return UserProfile::default();
            }
            Err(e) => {
                warn!(user_id, path = %path.display(), error = %e, "failed to read profile, using defaults");
                return UserProfile::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => normalize(value),
            Err(e) => {
                warn!(user_id, error = %e, "profile is not valid JSON, using defaults");
                UserProfile::default()
            }
        }
    }

    /// Normalize and atomically write a user's profile.
    ///
    /// The document is written to `<user_id>.json.tmp` and renamed over the
    /// destination, so readers never observe a partial file. The temporary
    /// file is removed if any step fails.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] if serialization or any filesystem step fails.
    pub fn save(&self, user_id: i64, profile: &UserProfile) -> Result<(), ProfileError> {
        fs::create_dir_all(&self.users_dir).map_err(|source| ProfileError::Io {
            path: self.users_dir.clone(),
            source,
        })?;

        let normalized = normalize(serde_json::to_value(profile)?);
        let bytes = to_pretty_json(&normalized)?;

        let path = self.path_for(user_id);
        let tmp_path = path.with_extension("json.tmp");

        let result = write_file(&tmp_path, &bytes).and_then(|()| {
            fs::rename(&tmp_path, &path).map_err(|source| ProfileError::Io {
                path: path.clone(),
                source,
            })
        });

        if result.is_err() && tmp_path.exists() {
            if let Err(e) = fs::remove_file(&tmp_path) {
                debug!(path = %tmp_path.display(), error = %e, "failed to remove temporary profile");
            }
        }
        result
    }

    /// Change one physical-data field and persist.
    ///
    /// A history entry is appended only when the value actually changes.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::FieldType`] for a value of the wrong kind, or
    /// a persistence error from [`Self::save`].
    pub fn update_field(
        &self,
        user_id: i64,
        field: ProfileField,
        value: Option<FieldValue>,
    ) -> Result<UserProfile, ProfileError> {
        let mut profile = self.load(user_id);
        let old = profile.physical_data.get(field);
        profile.physical_data.set(field, value.clone())?;

        if old != value {
            let new_text = value.as_ref().map_or_else(|| "нет".to_owned(), ToString::to_string);
            let mut result = format!("Новое значение: {new_text}");
            if let Some(old) = old.filter(is_truthy) {
                result.push_str(&format!(" (было: {old})"));
            }
            profile.history.push(HistoryEntry::new(
                format!("\u{270F}\u{FE0F} Изменение: {}", field.history_label()),
                result,
            ));
        }

        self.save(user_id, &profile)?;
        Ok(profile)
    }

    /// Change the training goal and persist.
    ///
    /// A history entry is appended only when a previous goal existed and
    /// differs from the new one.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from [`Self::save`].
    pub fn set_goal(&self, user_id: i64, goal: Goal) -> Result<UserProfile, ProfileError> {
        let mut profile = self.load(user_id);
        let old = profile.physical_data.target.replace(goal.as_str().to_owned());

        if let Some(old) = old.filter(|o| !o.is_empty() && o != goal.as_str()) {
            profile.history.push(HistoryEntry::new(
                format!("\u{1F3AF} Изменение цели с '{old}' на '{goal}'"),
                format!("\u{2705} Цель успешно изменена. Новая цель: {goal}"),
            ));
        }

        self.save(user_id, &profile)?;
        Ok(profile)
    }

    /// Stored name, if any.
    pub fn name(&self, user_id: i64) -> Option<String> {
        self.load(user_id).physical_data.name
    }

    /// Set or clear the stored name without recording history.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from [`Self::save`].
    pub fn set_name(&self, user_id: i64, name: Option<&str>) -> Result<UserProfile, ProfileError> {
        let mut profile = self.load(user_id);
        profile.physical_data.name = name.and_then(normalize_name);
        self.save(user_id, &profile)?;
        Ok(profile)
    }

    /// Last generated text.
    pub fn last_reply(&self, user_id: i64) -> Option<String> {
        self.load(user_id).last_reply
    }

    /// Store the last generated text.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from [`Self::save`].
    pub fn set_last_reply(&self, user_id: i64, text: Option<&str>) -> Result<(), ProfileError> {
        let mut profile = self.load(user_id);
        profile.last_reply = text.map(str::to_owned);
        self.save(user_id, &profile)
    }

    /// Last generated program.
    pub fn last_program(&self, user_id: i64) -> Option<String> {
        self.load(user_id).last_program
    }

    /// Store the last generated program.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from [`Self::save`].
    pub fn set_last_program(&self, user_id: i64, text: Option<&str>) -> Result<(), ProfileError> {
        let mut profile = self.load(user_id);
        profile.last_program = text.map(str::to_owned);
        self.save(user_id, &profile)
    }

    /// Lift record for one exercise.
    pub fn lift(&self, user_id: i64, lift_key: &str) -> Option<LiftRecord> {
        self.load(user_id).lifts.remove(lift_key)
    }

    /// Record a set for one exercise, keeping the last
    /// [`LIFT_HISTORY_LIMIT`] entries.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from [`Self::save`].
    pub fn record_lift(
        &self,
        user_id: i64,
        lift_key: &str,
        weight: f64,
        reps: u32,
        rir: Option<u32>,
    ) -> Result<LiftRecord, ProfileError> {
        let mut profile = self.load(user_id);
        let entry = LiftEntry {
            ts: chrono::Utc::now().timestamp(),
            last_weight: weight,
            reps,
            rir,
        };

        let record = profile.lifts.entry(lift_key.to_owned()).or_default();
        record.last_weight = Some(weight);
        record.reps = Some(reps);
        record.rir = rir;
        record.history.push(entry);
        let excess = record.history.len().saturating_sub(LIFT_HISTORY_LIMIT);
        record.history.drain(..excess);
        let record = record.clone();

        self.save(user_id, &profile)?;
        Ok(record)
    }

    /// Reset onboarding.
    ///
    /// Clears physical data, history, the completion flag and the last
    /// reply/program. With `keep_name` the stored name survives.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from [`Self::save`].
    pub fn reset(&self, user_id: i64, keep_name: bool) -> Result<UserProfile, ProfileError> {
        let mut profile = self.load(user_id);
        let name = profile.physical_data.name.take().filter(|_| keep_name);

        profile.physical_data = super::PhysicalData {
            name,
            ..Default::default()
        };
        profile.physical_data_completed = false;
        profile.history.clear();
        profile.last_reply = None;
        profile.last_program = None;

        self.save(user_id, &profile)?;
        Ok(profile)
    }

    /// Rendered profile summary for a user.
    pub fn render_profile_text(&self, user_id: i64) -> String {
        render::profile_text(&self.load(user_id).physical_data)
    }
}

/// Whether a previous value is worth mentioning as "было".
fn is_truthy(value: &FieldValue) -> bool {
    match value {
        FieldValue::Text(t) => !t.is_empty(),
        FieldValue::Integer(n) => *n != 0,
        FieldValue::Decimal(d) => *d != 0.0,
    }
}

fn to_pretty_json(profile: &UserProfile) -> Result<Vec<u8>, ProfileError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    profile.serialize(&mut ser)?;
    Ok(buf)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), ProfileError> {
    let io_err = |source| ProfileError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs::File::create(path).map_err(io_err)?;
    file.write_all(bytes).map_err(io_err)?;
    file.sync_all().map_err(io_err)
}
