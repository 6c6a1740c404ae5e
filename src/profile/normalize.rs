//! Lenient coercion of stored documents to the current [`UserProfile`] schema.

use serde_json::{Map, Value};
use tracing::debug;

use super::{
    FieldKind, FieldValue, HistoryEntry, LiftEntry, LiftRecord, PhysicalData, ProfileField,
    UserProfile, LIFT_HISTORY_LIMIT,
};

/// Coerce any JSON value into a [`UserProfile`].
///
/// Never fails: unknown keys are dropped, values of the wrong shape fall back
/// to their defaults, and the legacy root-level `schedule`, `level` and
/// `target` keys are moved into `physical_data` when it has no value for them.
pub fn normalize(raw: Value) -> UserProfile {
    let mut profile = UserProfile::default();

    let Value::Object(root) = raw else {
        debug!("profile document is not an object, using defaults");
        return profile;
    };

    if let Some(Value::Array(items)) = root.get("history") {
        profile.history = items.iter().filter_map(history_entry).collect();
    }

    if let Some(Value::Object(physical)) = root.get("physical_data") {
        profile.physical_data = physical_data(physical);
    }

    for field in ProfileField::LEGACY_ROOT {
        if profile.physical_data.get(field).is_some() {
            continue;
        }
        if let Some(value) = root.get(field.key()).and_then(|v| coerce(field, v)) {
            // Coerced values always match the field kind.
            let _ = profile.physical_data.set(field, Some(value));
        }
    }

    if let Some(Value::Bool(done)) = root.get("physical_data_completed") {
        profile.physical_data_completed = *done;
    }

    if let Some(Value::String(reply)) = root.get("last_reply") {
        profile.last_reply = Some(reply.clone());
    }
    if let Some(Value::String(program)) = root.get("last_program") {
        profile.last_program = Some(program.clone());
    }

    if let Some(Value::Object(lifts)) = root.get("lifts") {
        for (key, value) in lifts {
            match lift_record(value) {
                Some(record) => {
                    profile.lifts.insert(key.clone(), record);
                }
                None => debug!(lift = %key, "dropping malformed lift record"),
            }
        }
    }

    if let Some(Value::Array(programs)) = root.get("programs") {
        profile.programs = programs.clone();
    }

    profile
}

/// Lift record with its fields coerced one by one; bad history entries are
/// skipped instead of discarding the whole record.
fn lift_record(value: &Value) -> Option<LiftRecord> {
    let Value::Object(map) = value else {
        return None;
    };
    let count = |key: &str| {
        map.get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    };

    let mut history: Vec<LiftEntry> = match map.get("history") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    };
    let excess = history.len().saturating_sub(LIFT_HISTORY_LIMIT);
    history.drain(..excess);

    Some(LiftRecord {
        last_weight: map.get("last_weight").and_then(Value::as_f64),
        reps: count("reps"),
        rir: count("rir"),
        history,
    })
}

fn history_entry(value: &Value) -> Option<HistoryEntry> {
    let Value::Array(pair) = value else {
        return None;
    };
    match pair.as_slice() {
        [label, result] => Some(HistoryEntry::new(text_of(label)?, text_of(result)?)),
        _ => None,
    }
}

fn physical_data(map: &Map<String, Value>) -> PhysicalData {
    let mut data = PhysicalData::default();
    for field in ProfileField::ALL {
        if let Some(value) = map.get(field.key()).and_then(|v| coerce(field, v)) {
            let _ = data.set(field, Some(value));
        }
    }
    data
}

/// Convert a raw JSON value into the kind `field` stores, if possible.
fn coerce(field: ProfileField, value: &Value) -> Option<FieldValue> {
    match field.kind() {
        FieldKind::Text => text_of(value).map(FieldValue::Text),
        FieldKind::Integer => integer_of(value).map(FieldValue::Integer),
        FieldKind::Decimal => decimal_of(value).map(FieldValue::Decimal),
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn integer_of(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn decimal_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
    .filter(|d: &f64| d.is_finite())
}
