//! Plain-text exports of generated replies (`program_<user_id>_<unix_ts>.txt`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{Local, TimeZone};

use super::ProfileError;

fn prefix(user_id: i64) -> String {
    format!("program_{user_id}_")
}

/// Write `text` to a new export file and return its path.
///
/// # Errors
///
/// Returns [`ProfileError::Io`] if the directory or file cannot be written.
pub fn write_export(
    users_dir: &Path,
    user_id: i64,
    text: &str,
    unix_ts: i64,
) -> Result<PathBuf, ProfileError> {
    fs::create_dir_all(users_dir).map_err(|source| ProfileError::Io {
        path: users_dir.to_path_buf(),
        source,
    })?;
    let path = users_dir.join(format!("{}{unix_ts}.txt", prefix(user_id)));
    fs::write(&path, text).map_err(|source| ProfileError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// All exports of a user, newest first.
///
/// Ordered by modification time, ties broken by the timestamp in the name.
/// A missing directory yields an empty list.
///
/// # Errors
///
/// Returns [`ProfileError::Io`] if the directory exists but cannot be read.
pub fn list_exports(users_dir: &Path, user_id: i64) -> Result<Vec<PathBuf>, ProfileError> {
    let entries = match fs::read_dir(users_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ProfileError::Io {
                path: users_dir.to_path_buf(),
                source,
            })
        }
    };

    let prefix = prefix(user_id);
    let mut found: Vec<(SystemTime, i64, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter(|entry| {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            name.starts_with(&prefix) && name.ends_with(".txt")
        })
        .map(|entry| {
            let path = entry.path();
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            let ts = export_timestamp(&path).unwrap_or(0);
            (modified, ts, path)
        })
        .collect();

    found.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
    Ok(found.into_iter().map(|(_, _, path)| path).collect())
}

/// Unix timestamp encoded in an export file name.
pub fn export_timestamp(path: &Path) -> Option<i64> {
    path.file_stem()?
        .to_str()?
        .rsplit('_')
        .next()?
        .parse()
        .ok()
}

/// Caption sent with a saved export: its local creation time, or the file
/// name when the name carries no timestamp.
pub fn export_caption(path: &Path) -> String {
    let dated = export_timestamp(path)
        .and_then(|ts| Local.timestamp_opt(ts, 0).single())
        .map(|dt| dt.format("%d.%m.%Y %H:%M").to_string());

    match dated {
        Some(date) => format!("\u{1F4CE} Запрос от {date}"),
        None => format!("\u{1F4CE} {}", file_name(path)),
    }
}

/// Final path component as text.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
