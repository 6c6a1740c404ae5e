//! Human-readable profile summary.
//!
//! Output uses `**bold**` markers; the Telegram layer turns them into HTML.

use super::{MuscleFocus, PhysicalData};

const NOT_SPECIFIED: &str = "не указано";

/// Render the "my profile" block.
///
/// Absent fields show a placeholder instead of being omitted; absent
/// restrictions show `нет`.
pub fn profile_text(data: &PhysicalData) -> String {
    let or_placeholder = |v: Option<String>| v.unwrap_or_else(|| NOT_SPECIFIED.to_owned());

    let target = data.target.clone().unwrap_or_else(|| "не указана".to_owned());
    let target_icon = data.goal_kind().map_or("\u{1F3AF}", |g| g.icon());

    let muscle = match (&data.preferred_muscle_group, data.muscle_focus()) {
        (_, Some(focus)) => focus.display_label().to_owned(),
        (Some(raw), None) => raw.clone(),
        (None, None) => NOT_SPECIFIED.to_owned(),
    };

    let restrictions = data
        .restrictions
        .clone()
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "нет".to_owned());

    [
        "\u{1F4CB} **Твоя анкета:**".to_owned(),
        String::new(),
        format!("\u{1F464} Имя: {}", or_placeholder(data.name.clone())),
        format!("{target_icon} Цель: {target}"),
        format!("\u{26A7} Пол: {}", or_placeholder(data.gender.clone())),
        format!(
            "\u{1F522} Возраст: {} лет",
            or_placeholder(data.age.map(|a| a.to_string()))
        ),
        format!(
            "\u{1F4CF} Рост: {} см",
            or_placeholder(data.height.map(|h| h.to_string()))
        ),
        format!(
            "\u{2696}\u{FE0F} Текущий вес: {} кг",
            or_placeholder(data.weight.map(format_kg))
        ),
        format!(
            "\u{1F3AF} Желаемый вес: {} кг",
            or_placeholder(data.goal.map(format_kg))
        ),
        format!(
            "\u{1F3CB}\u{FE0F} Уровень: {}",
            or_placeholder(data.level.clone())
        ),
        format!(
            "\u{1F4C8} Частота: {} раз/неделю",
            or_placeholder(data.schedule.map(|s| s.to_string()))
        ),
        format!("\u{1F4AA} Акцент на мышцы: {muscle}"),
        format!("\u{26A0}\u{FE0F} Ограничения: {restrictions}"),
    ]
    .join("\n")
}

/// Format a weight with one decimal place.
pub fn format_kg(kg: f64) -> String {
    format!("{kg:.1}")
}

/// Label for a stored muscle emphasis, falling back to the raw value.
pub fn muscle_label(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    Some(
        MuscleFocus::from_stored(raw)
            .map_or_else(|| raw.to_owned(), |m| m.display_label().to_owned()),
    )
}
