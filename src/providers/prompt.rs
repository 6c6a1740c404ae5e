//! Prompt assembly for the coach.

use crate::profile::{render::format_kg, PhysicalData};

/// System prompt describing the coach and embedding the user's data.
pub fn system_prompt(profile: &PhysicalData) -> String {
    let mut lines = vec![
        "Ты персональный фитнес-тренер GymAiMentor. Отвечай на русском языке, \
         дружелюбно, конкретно и без лишней воды. Учитывай ограничения по здоровью."
            .to_owned(),
    ];

    let facts = profile_facts(profile);
    if !facts.is_empty() {
        lines.push(String::new());
        lines.push("Данные пользователя:".to_owned());
        lines.extend(facts.into_iter().map(|f| format!("- {f}")));
    }

    lines.join("\n")
}

/// User message requesting a weekly program.
pub fn program_request(profile: &PhysicalData, preferences: &str) -> String {
    let days = profile
        .schedule
        .map_or_else(|| "нужное число".to_owned(), |s| s.to_string());
    let mut request = format!(
        "Составь персональную программу тренировок в тренажёрном зале на неделю \
         ({days} тренировок). Распиши её по дням в формате «День 1», «День 2» и так далее: \
         упражнения, подходы, повторения и отдых между подходами."
    );

    let preferences = preferences.trim();
    if !preferences.is_empty() {
        request.push_str("\n\nПожелания: ");
        request.push_str(preferences);
    }
    request
}

fn profile_facts(p: &PhysicalData) -> Vec<String> {
    let mut facts = Vec::new();
    if let Some(name) = &p.name {
        facts.push(format!("имя: {name}"));
    }
    if let Some(gender) = &p.gender {
        facts.push(format!("пол: {gender}"));
    }
    if let Some(age) = p.age {
        facts.push(format!("возраст: {age} лет"));
    }
    if let Some(height) = p.height {
        facts.push(format!("рост: {height} см"));
    }
    if let Some(weight) = p.weight {
        facts.push(format!("текущий вес: {} кг", format_kg(weight)));
    }
    if let Some(goal) = p.goal {
        facts.push(format!("желаемый вес: {} кг", format_kg(goal)));
    }
    if let Some(target) = &p.target {
        facts.push(format!("цель: {target}"));
    }
    if let Some(level) = &p.level {
        facts.push(format!("уровень подготовки: {level}"));
    }
    if let Some(schedule) = p.schedule {
        facts.push(format!("тренировок в неделю: {schedule}"));
    }
    if let Some(focus) = p.muscle_focus() {
        facts.push(format!("акцент на мышцы: {}", focus.emphasis_phrase()));
    }
    match p.restrictions.as_deref().filter(|r| !r.is_empty()) {
        Some(r) => facts.push(format!("ограничения и предпочтения: {r}")),
        None if !facts.is_empty() => facts.push("ограничения: нет".to_owned()),
        None => {}
    }
    facts
}
