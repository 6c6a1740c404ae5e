//! Validators for numeric survey answers.
//!
//! Each returns the parsed value or a [`ValidationError`] whose text is shown
//! to the user verbatim.

/// Why an answer was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The text is not a number of the expected shape.
    #[error("{0}")]
    Format(&'static str),
    /// The number is outside the accepted range.
    #[error("{0}")]
    Range(&'static str),
}

/// Age in whole years, 10 to 100 inclusive.
///
/// # Errors
///
/// Returns [`ValidationError`] on a parse failure or out-of-range value.
pub fn validate_age(text: &str) -> Result<u32, ValidationError> {
    whole_number(
        text,
        10..=100,
        "Пожалуйста, введи число (например: 25).",
        "Возраст должен быть от 10 до 100 лет.",
    )
}

/// Height in whole centimetres, 100 to 250 inclusive.
///
/// # Errors
///
/// Returns [`ValidationError`] on a parse failure or out-of-range value.
pub fn validate_height(text: &str) -> Result<u32, ValidationError> {
    whole_number(
        text,
        100..=250,
        "Пожалуйста, введи число в сантиметрах (например: 175).",
        "Рост должен быть от 100 до 250 см.",
    )
}

/// Weight in kilograms, 30 to 300 inclusive, rounded to one decimal place.
///
/// A comma is accepted as the decimal separator.
///
/// # Errors
///
/// Returns [`ValidationError`] on a parse failure or out-of-range value.
pub fn validate_weight(text: &str) -> Result<f64, ValidationError> {
    let weight: f64 = text.trim().replace(',', ".").parse().map_err(|_| {
        ValidationError::Format("Пожалуйста, введи число в килограммах (например: 70 или 70.5).")
    })?;
    if !(30.0..=300.0).contains(&weight) {
        return Err(ValidationError::Range("Вес должен быть от 30 до 300 кг."));
    }
    Ok((weight * 10.0).round() / 10.0)
}

/// Training sessions per week, 1 to 7 inclusive.
///
/// # Errors
///
/// Returns [`ValidationError`] on a parse failure or out-of-range value.
pub fn validate_schedule(text: &str) -> Result<u32, ValidationError> {
    whole_number(
        text,
        1..=7,
        "Пожалуйста, введи число (например: 3).",
        "Частота тренировок должна быть от 1 до 7 раз в неделю.",
    )
}

fn whole_number(
    text: &str,
    range: std::ops::RangeInclusive<i64>,
    format_msg: &'static str,
    range_msg: &'static str,
) -> Result<u32, ValidationError> {
    let n: i64 = text
        .trim()
        .parse()
        .map_err(|_| ValidationError::Format(format_msg))?;
    if !range.contains(&n) {
        return Err(ValidationError::Range(range_msg));
    }
    u32::try_from(n).map_err(|_| ValidationError::Range(range_msg))
}
