//! Profile store persistence tests.

use std::fs;

use gym_mentor::profile::{FieldValue, Goal, ProfileField, ProfileStore, UserProfile};

fn temp_store() -> (tempfile::TempDir, ProfileStore) {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("tempdir should be created: {err}"),
    };
    let store = ProfileStore::new(dir.path().join("users"));
    (dir, store)
}

#[test]
fn missing_profile_loads_defaults() {
    let (_dir, store) = temp_store();
    let profile = store.load(42);
    assert_eq!(profile, UserProfile::default());
    assert!(!profile.physical_data_completed);
}

#[test]
fn save_then_load_preserves_profile() {
    let (_dir, store) = temp_store();
    let mut profile = UserProfile::default();
    profile.physical_data.name = Some("Аня".to_owned());
    profile.physical_data.age = Some(28);
    profile.physical_data.weight = Some(61.5);
    profile.physical_data_completed = true;

    let saved = store.save(7, &profile);
    assert!(saved.is_ok());

    let loaded = store.load(7);
    assert_eq!(loaded, profile);
}

#[test]
fn save_writes_pretty_json_without_leftover_tmp() {
    let (_dir, store) = temp_store();
    let saved = store.save(7, &UserProfile::default());
    assert!(saved.is_ok());

    let path = store.path_for(7);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) => panic!("profile should be written to {}: {err}", path.display()),
    };
    assert!(raw.contains("\n    \"history\""));
    assert!(raw.contains("\"physical_data_completed\": false"));
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn failed_rename_removes_tmp_and_keeps_destination() {
    let (_dir, store) = temp_store();
    let path = store.path_for(5);
    assert!(fs::create_dir_all(path.join("occupied")).is_ok());

    let mut profile = UserProfile::default();
    profile.physical_data.name = Some("Аня".to_owned());
    assert!(store.save(5, &profile).is_err());

    assert!(!path.with_extension("json.tmp").exists());
    assert!(path.is_dir());
    assert!(path.join("occupied").is_dir());
}

#[test]
fn malformed_file_loads_defaults() {
    let (_dir, store) = temp_store();
    assert!(fs::create_dir_all(store.users_dir()).is_ok());
    assert!(fs::write(store.path_for(3), "{not json").is_ok());

    assert_eq!(store.load(3), UserProfile::default());
}

#[test]
fn update_field_records_history_with_previous_value() {
    let (_dir, store) = temp_store();
    assert!(store
        .update_field(5, ProfileField::Age, Some(FieldValue::Integer(30)))
        .is_ok());
    let profile = match store.update_field(5, ProfileField::Age, Some(FieldValue::Integer(31))) {
        Ok(profile) => profile,
        Err(err) => panic!("update should succeed: {err}"),
    };

    assert_eq!(profile.physical_data.age, Some(31));
    assert_eq!(profile.history.len(), 2);
    assert_eq!(profile.history[0].result(), "Новое значение: 30");
    assert_eq!(profile.history[1].label(), "\u{270F}\u{FE0F} Изменение: \u{1F522} возраст");
    assert_eq!(profile.history[1].result(), "Новое значение: 31 (было: 30)");
}

#[test]
fn update_field_with_same_value_adds_no_history() {
    let (_dir, store) = temp_store();
    let value = Some(FieldValue::Decimal(70.0));
    assert!(store.update_field(5, ProfileField::Weight, value.clone()).is_ok());
    let profile = match store.update_field(5, ProfileField::Weight, value) {
        Ok(profile) => profile,
        Err(err) => panic!("update should succeed: {err}"),
    };
    assert_eq!(profile.history.len(), 1);
}

#[test]
fn update_field_clearing_value_shows_none_marker() {
    let (_dir, store) = temp_store();
    assert!(store
        .update_field(5, ProfileField::Restrictions, Some(FieldValue::text("колени")))
        .is_ok());
    let profile = match store.update_field(5, ProfileField::Restrictions, None) {
        Ok(profile) => profile,
        Err(err) => panic!("update should succeed: {err}"),
    };
    assert_eq!(profile.physical_data.restrictions, None);
    assert_eq!(
        profile.history[1].result(),
        "Новое значение: нет (было: колени)"
    );
}

#[test]
fn update_field_rejects_value_of_wrong_kind() {
    let (_dir, store) = temp_store();
    let result = store.update_field(5, ProfileField::Age, Some(FieldValue::text("тридцать")));
    assert!(result.is_err());
    assert_eq!(store.load(5).physical_data.age, None);
}

#[test]
fn set_goal_records_change_only_when_goal_differs() {
    let (_dir, store) = temp_store();
    let first = match store.set_goal(9, Goal::MassGain) {
        Ok(profile) => profile,
        Err(err) => panic!("set_goal should succeed: {err}"),
    };
    assert_eq!(first.physical_data.target.as_deref(), Some("набор массы"));
    assert!(first.history.is_empty());

    let same = match store.set_goal(9, Goal::MassGain) {
        Ok(profile) => profile,
        Err(err) => panic!("set_goal should succeed: {err}"),
    };
    assert!(same.history.is_empty());

    let changed = match store.set_goal(9, Goal::WeightLoss) {
        Ok(profile) => profile,
        Err(err) => panic!("set_goal should succeed: {err}"),
    };
    assert_eq!(changed.history.len(), 1);
    assert_eq!(
        changed.history[0].label(),
        "\u{1F3AF} Изменение цели с 'набор массы' на 'похудение'"
    );
}

#[test]
fn reset_keeps_name_only_when_asked() {
    let (_dir, store) = temp_store();
    let mut profile = UserProfile::default();
    profile.physical_data.name = Some("Олег".to_owned());
    profile.physical_data.age = Some(40);
    profile.physical_data_completed = true;
    profile.last_reply = Some("программа".to_owned());
    assert!(store.save(11, &profile).is_ok());

    let soft = match store.reset(11, true) {
        Ok(profile) => profile,
        Err(err) => panic!("reset should succeed: {err}"),
    };
    assert_eq!(soft.physical_data.name.as_deref(), Some("Олег"));
    assert_eq!(soft.physical_data.age, None);
    assert!(!soft.physical_data_completed);
    assert_eq!(soft.last_reply, None);

    let full = match store.reset(11, false) {
        Ok(profile) => profile,
        Err(err) => panic!("reset should succeed: {err}"),
    };
    assert_eq!(full.physical_data.name, None);
}

#[test]
fn set_name_trims_and_caps_length() {
    let (_dir, store) = temp_store();
    let long = format!("  {}  ", "я".repeat(100));
    assert!(store.set_name(2, Some(&long)).is_ok());
    let name = store.name(2).unwrap_or_default();
    assert_eq!(name.chars().count(), 80);
}

#[test]
fn record_lift_keeps_bounded_history() {
    let (_dir, store) = temp_store();
    for reps in 0..55_u32 {
        assert!(store.record_lift(4, "squat", 100.0, reps, Some(2)).is_ok());
    }
    let record = match store.lift(4, "squat") {
        Some(record) => record,
        None => panic!("lift should be recorded"),
    };
    assert_eq!(record.history.len(), 50);
    assert_eq!(record.reps, Some(54));
    assert_eq!(record.history[0].reps, 5);
}

#[test]
fn last_reply_and_program_round_trip() {
    let (_dir, store) = temp_store();
    assert!(store.set_last_reply(6, Some("ответ")).is_ok());
    assert!(store.set_last_program(6, Some("программа")).is_ok());
    assert_eq!(store.last_reply(6).as_deref(), Some("ответ"));
    assert_eq!(store.last_program(6).as_deref(), Some("программа"));
}
