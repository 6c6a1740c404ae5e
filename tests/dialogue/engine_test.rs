//! End-to-end dialogue tests against a scripted coach.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use gym_mentor::config::DialogueConfig;
use gym_mentor::dialogue::command::{
    goal_caption, gender_caption, level_caption, muscle_caption, ANOTHER_PROGRAM, ASK_COACH,
    BACK_TO_MENU, CHANGE_GOAL, MY_PROFILE, RESTART, SAVED_ANSWERS, SAVE_TO_FILE,
};
use gym_mentor::dialogue::state::SurveyStep;
use gym_mentor::dialogue::{
    DialogueEngine, DialogueState, EditableField, Keyboard, Outbound, Reply, Variation,
    WHATS_NEXT,
};
use gym_mentor::profile::{Gender, Goal, Level, MuscleFocus, PhysicalData, UserProfile};
use gym_mentor::providers::{FitnessCoach, ProviderError};

const USER: i64 = 1001;

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ScriptedCoach {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: AtomicUsize,
    last_input: Mutex<Option<String>>,
}

impl ScriptedCoach {
    fn push(&self, reply: Result<String, ProviderError>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_input(&self) -> Option<String> {
        self.last_input.lock().ok().and_then(|input| input.clone())
    }

    fn next(&self, input: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_input.lock() {
            *last = Some(input.to_owned());
        }
        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .unwrap_or_else(|| Ok("День 1: присед 3x10".to_owned()))
    }
}

#[async_trait]
impl FitnessCoach for ScriptedCoach {
    async fn get_program(
        &self,
        _profile: &PhysicalData,
        preferences: &str,
    ) -> Result<String, ProviderError> {
        self.next(preferences)
    }

    async fn get_answer(
        &self,
        _profile: &PhysicalData,
        question: &str,
    ) -> Result<String, ProviderError> {
        self.next(question)
    }
}

struct Harness {
    _dir: tempfile::TempDir,
    engine: DialogueEngine,
    coach: Arc<ScriptedCoach>,
    rx: mpsc::Receiver<Outbound>,
}

impl Harness {
    fn new() -> Self {
        let dir = match tempfile::tempdir() {
            Ok(dir) => dir,
            Err(err) => panic!("tempdir should be created: {err}"),
        };
        let coach = Arc::new(ScriptedCoach::default());
        let (tx, rx) = mpsc::channel(64);
        let settings = DialogueConfig {
            generation_cooldown_secs: 30,
            max_message_len: 3500,
            saved_history_limit: 10,
        };
        let engine = DialogueEngine::new(
            gym_mentor::profile::ProfileStore::new(dir.path().join("users")),
            Arc::clone(&coach) as Arc<dyn FitnessCoach>,
            &settings,
            tx,
        );
        Self {
            _dir: dir,
            engine,
            coach,
            rx,
        }
    }

    /// Harness whose user already finished onboarding.
    fn completed() -> Self {
        let h = Self::new();
        assert!(h.engine.store().save(USER, &completed_profile()).is_ok());
        h
    }

    fn drain(&mut self) -> Vec<Reply> {
        let mut replies = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            assert_eq!(msg.user_id, USER);
            replies.push(msg.reply);
        }
        replies
    }

    async fn send(&mut self, text: &str) -> Vec<Reply> {
        self.engine.handle_text(USER, text).await;
        self.drain()
    }

    async fn state(&self) -> Option<DialogueState> {
        self.engine.state_of(USER).await
    }

    fn profile(&self) -> UserProfile {
        self.engine.store().load(USER)
    }
}

fn completed_profile() -> UserProfile {
    let mut profile = UserProfile::default();
    profile.physical_data = PhysicalData {
        name: Some("Аня".to_owned()),
        gender: Some(Gender::Female.as_str().to_owned()),
        age: Some(30),
        height: Some(168),
        weight: Some(62.0),
        goal: Some(58.0),
        restrictions: None,
        level: Some(Level::Beginner.as_str().to_owned()),
        schedule: Some(3),
        target: Some(Goal::MassGain.as_str().to_owned()),
        preferred_muscle_group: Some(MuscleFocus::Balanced.as_str().to_owned()),
    };
    profile.physical_data_completed = true;
    profile
}

fn texts(replies: &[Reply]) -> Vec<&str> {
    replies.iter().filter_map(Reply::text).collect()
}

fn only_text(replies: &[Reply]) -> &str {
    assert_eq!(replies.len(), 1, "expected one reply, got {replies:?}");
    match &replies[0] {
        Reply::Text { text, .. } => text,
        other => panic!("expected text reply, got {other:?}"),
    }
}

fn keyboard_of(reply: &Reply) -> Option<Keyboard> {
    match reply {
        Reply::Text { keyboard, .. } => *keyboard,
        Reply::Document { .. } => None,
    }
}

async fn onboard(h: &mut Harness) -> Vec<Reply> {
    h.engine.handle_start(USER).await;
    h.drain();
    for answer in [
        "Аня",
        goal_caption(Goal::WeightLoss),
        gender_caption(Gender::Female),
        "25",
        "165",
        "60,4",
        "55",
        "нет",
        "3",
        level_caption(Level::Beginner),
    ] {
        h.send(answer).await;
    }
    h.send(muscle_caption(MuscleFocus::Glutes)).await
}

// ---------------------------------------------------------------------------
// Onboarding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_greets_new_user_and_asks_name() {
    let mut h = Harness::new();
    h.engine.handle_start(USER).await;
    let replies = h.drain();

    assert!(only_text(&replies).contains("GymAiMentor"));
    assert!(only_text(&replies).ends_with("Как тебя зовут?"));
    assert_eq!(h.state().await, Some(DialogueState::AwaitingName));
}

#[tokio::test]
async fn full_onboarding_saves_profile_and_sends_first_program() {
    let mut h = Harness::new();
    h.coach.push(Ok("### День 1\n\n\n\nПрисед<br>Жим".to_owned()));

    let replies = onboard(&mut h).await;
    let sent = texts(&replies);

    assert_eq!(
        sent,
        vec![
            "\u{23F3} Спасибо! Формирую твою персональную программу\u{2026}",
            "\u{2728} Программа готова!",
            "День 1\n\nПрисед\nЖим",
            WHATS_NEXT,
        ]
    );
    assert_eq!(replies.last().and_then(keyboard_of), Some(Keyboard::Main));
    assert_eq!(h.coach.calls(), 1);
    assert_eq!(h.coach.last_input().as_deref(), Some(""));

    let profile = h.profile();
    assert!(profile.physical_data_completed);
    let data = &profile.physical_data;
    assert_eq!(data.name.as_deref(), Some("Аня"));
    assert_eq!(data.target.as_deref(), Some("похудение"));
    assert_eq!(data.gender.as_deref(), Some("женский"));
    assert_eq!(data.age, Some(25));
    assert_eq!(data.height, Some(165));
    assert_eq!(data.weight, Some(60.4));
    assert_eq!(data.goal, Some(55.0));
    assert_eq!(data.restrictions, None);
    assert_eq!(data.schedule, Some(3));
    assert_eq!(data.level.as_deref(), Some("начинающий"));
    assert_eq!(data.preferred_muscle_group.as_deref(), Some("ягодицы"));
    assert_eq!(profile.last_reply.as_deref(), Some("День 1\n\nПрисед\nЖим"));
    assert_eq!(h.state().await, None);
}

#[tokio::test]
async fn first_program_failure_still_completes_profile() {
    let mut h = Harness::new();
    h.coach
        .push(Err(ProviderError::Connection("refused".to_owned())));

    let replies = onboard(&mut h).await;
    let sent = texts(&replies);

    assert_eq!(sent.len(), 3);
    assert!(sent[1].starts_with("\u{274C} Не удалось сгенерировать программу."));
    assert!(sent[1].contains("Проблемы с подключением"));
    assert_eq!(sent[2], WHATS_NEXT);
    assert!(h.profile().physical_data_completed);
}

#[tokio::test]
async fn empty_name_is_asked_again() {
    let mut h = Harness::new();
    h.engine.handle_start(USER).await;
    h.drain();

    let replies = h.send("   ").await;
    assert_eq!(only_text(&replies), "Напиши, пожалуйста, имя.");
    assert_eq!(h.state().await, Some(DialogueState::AwaitingName));
}

#[tokio::test]
async fn goal_is_recognized_from_free_text() {
    let mut h = Harness::new();
    h.engine.handle_start(USER).await;
    h.drain();
    h.send("Аня").await;

    let replies = h.send("хочу похудеть к лету").await;
    assert_eq!(only_text(&replies), "Укажи свой пол:");
    assert_eq!(keyboard_of(&replies[0]), Some(Keyboard::Gender));
    assert_eq!(
        h.state().await,
        Some(DialogueState::AwaitingGender {
            name: "Аня".to_owned(),
            goal: Goal::WeightLoss,
        })
    );
}

#[tokio::test]
async fn unknown_goal_reprompts_with_keyboard() {
    let mut h = Harness::new();
    h.engine.handle_start(USER).await;
    h.drain();
    h.send("Аня").await;

    let replies = h.send("не знаю").await;
    assert_eq!(only_text(&replies), "Пожалуйста, выбери цель кнопкой ниже:");
    assert_eq!(keyboard_of(&replies[0]), Some(Keyboard::Goal));
}

#[tokio::test]
async fn invalid_survey_answer_keeps_the_step() {
    let mut h = Harness::new();
    h.engine.handle_start(USER).await;
    h.drain();
    h.send("Аня").await;
    h.send(goal_caption(Goal::MassGain)).await;
    let replies = h.send(gender_caption(Gender::Male)).await;
    assert_eq!(only_text(&replies), SurveyStep::Age.question());

    let replies = h.send("5").await;
    assert_eq!(
        only_text(&replies),
        "\u{274C} Возраст должен быть от 10 до 100 лет.\n\nПопробуй ещё раз:"
    );
    assert!(matches!(
        h.state().await,
        Some(DialogueState::Survey {
            step: SurveyStep::Age,
            ..
        })
    ));

    let replies = h.send("30").await;
    assert_eq!(only_text(&replies), SurveyStep::Height.question());
}

#[tokio::test]
async fn out_of_range_answer_keeps_every_numeric_step() {
    let valid = [
        (SurveyStep::Age, "25"),
        (SurveyStep::Height, "165"),
        (SurveyStep::Weight, "60"),
        (SurveyStep::GoalWeight, "55"),
        (SurveyStep::Restrictions, "нет"),
    ];
    let invalid = [
        (SurveyStep::Age, "5"),
        (SurveyStep::Height, "99"),
        (SurveyStep::Weight, "20"),
        (SurveyStep::GoalWeight, "20"),
        (SurveyStep::Schedule, "8"),
    ];

    for (step, bad) in invalid {
        let mut h = Harness::new();
        h.engine.handle_start(USER).await;
        h.drain();
        h.send("Аня").await;
        h.send(goal_caption(Goal::WeightLoss)).await;
        h.send(gender_caption(Gender::Female)).await;
        for (earlier, answer) in valid.iter().take_while(|(s, _)| *s != step) {
            let replies = h.send(answer).await;
            assert!(
                !only_text(&replies).starts_with('\u{274C}'),
                "{earlier:?} answer {answer} should be accepted"
            );
        }

        let replies = h.send(bad).await;
        let text = only_text(&replies);
        assert!(text.starts_with('\u{274C}'), "{step:?} should reject {bad}");
        assert!(text.ends_with("Попробуй ещё раз:"));
        assert!(
            matches!(
                h.state().await,
                Some(DialogueState::Survey { step: current, .. }) if current == step
            ),
            "{step:?} should be asked again after {bad}"
        );
    }
}

#[tokio::test]
async fn level_requires_a_button() {
    let mut h = Harness::new();
    h.engine.handle_start(USER).await;
    h.drain();
    for answer in [
        "Олег",
        goal_caption(Goal::Maintenance),
        gender_caption(Gender::Male),
        "40",
        "180",
        "85",
        "80",
        "больная спина",
        "2",
    ] {
        h.send(answer).await;
    }

    let replies = h.send("опытный").await;
    assert_eq!(
        only_text(&replies),
        "Пожалуйста, выбери уровень кнопкой ниже:"
    );
    assert!(matches!(
        h.state().await,
        Some(DialogueState::AwaitingLevel { ref measurements, .. })
            if measurements.restrictions.as_deref() == Some("больная спина")
    ));
}

#[tokio::test]
async fn idle_incomplete_user_resumes_onboarding() {
    let mut h = Harness::new();
    let replies = h.send("привет").await;
    assert_eq!(only_text(&replies), "Как тебя зовут?");

    let mut profile = UserProfile::default();
    profile.physical_data.name = Some("Аня".to_owned());
    assert!(h.engine.store().save(USER, &profile).is_ok());
    h.send(BACK_TO_MENU).await;

    let replies = h.send("привет").await;
    assert_eq!(
        only_text(&replies),
        "Аня, выбери свою цель тренировок \u{2B07}\u{FE0F}"
    );
}

#[tokio::test]
async fn menu_commands_require_completed_profile() {
    let mut h = Harness::new();
    for command in [MY_PROFILE, CHANGE_GOAL, ANOTHER_PROGRAM] {
        let replies = h.send(command).await;
        assert!(only_text(&replies).starts_with("Сначала нужно заполнить анкету."));
    }
    assert_eq!(h.coach.calls(), 0);
}

// ---------------------------------------------------------------------------
// Completed profile
// ---------------------------------------------------------------------------

#[tokio::test]
async fn my_profile_shows_stored_values() {
    let mut h = Harness::completed();
    let replies = h.send(MY_PROFILE).await;
    let text = only_text(&replies);
    assert!(text.contains("Имя: Аня"));
    assert!(text.contains("Возраст: 30 лет"));
}

#[tokio::test]
async fn edit_age_validates_and_records_history() {
    let mut h = Harness::completed();

    let replies = h.send(EditableField::Age.caption()).await;
    assert!(only_text(&replies).starts_with("Текущий возраст: 30 лет"));

    let replies = h.send("abc").await;
    assert_eq!(
        only_text(&replies),
        "\u{274C} Пожалуйста, введи число (например: 25).\n\nПопробуй ещё раз:"
    );

    let replies = h.send("31").await;
    assert_eq!(
        only_text(&replies),
        "\u{2705} Возраст успешно обновлён: 31 лет"
    );
    assert_eq!(keyboard_of(&replies[0]), Some(Keyboard::Main));

    let profile = h.profile();
    assert_eq!(profile.physical_data.age, Some(31));
    assert_eq!(profile.history.len(), 1);
    assert_eq!(h.state().await, None);
}

#[tokio::test]
async fn edit_restrictions_accepts_none_marker() {
    let mut h = Harness::completed();
    h.send(EditableField::Restrictions.caption()).await;
    let replies = h.send("нет").await;
    assert_eq!(
        only_text(&replies),
        "\u{2705} Ограничения / предпочтения успешно обновлены: нет"
    );
    assert_eq!(h.profile().physical_data.restrictions, None);
}

#[tokio::test]
async fn edit_muscle_group_does_not_start_a_program() {
    let mut h = Harness::completed();
    h.send(EditableField::MuscleGroup.caption()).await;

    let replies = h.send(muscle_caption(MuscleFocus::Back)).await;
    assert_eq!(
        only_text(&replies),
        "\u{2705} Акцент на мышцы успешно обновлён: \u{1F519} Упор на спину"
    );
    assert_eq!(
        h.profile().physical_data.preferred_muscle_group.as_deref(),
        Some("спина")
    );
    assert_eq!(h.coach.calls(), 0);
}

#[tokio::test]
async fn edit_level_rejects_free_text() {
    let mut h = Harness::completed();
    h.send(EditableField::Level.caption()).await;

    let replies = h.send("профи").await;
    assert_eq!(
        only_text(&replies),
        "Пожалуйста, выбери уровень кнопкой ниже:"
    );

    let replies = h.send(level_caption(Level::Experienced)).await;
    assert_eq!(
        only_text(&replies),
        "\u{2705} Уровень подготовки успешно обновлён: опытный"
    );
}

#[tokio::test]
async fn change_goal_updates_target_and_history() {
    let mut h = Harness::completed();
    let replies = h.send(CHANGE_GOAL).await;
    assert!(only_text(&replies).starts_with("Текущая цель: набор массы"));

    let replies = h.send(goal_caption(Goal::WeightLoss)).await;
    assert!(only_text(&replies).starts_with("\u{2705} Цель успешно изменена на: "));

    let profile = h.profile();
    assert_eq!(profile.physical_data.target.as_deref(), Some("похудение"));
    assert_eq!(profile.history.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn variation_program_uses_emphasis_and_cooldown() {
    let mut h = Harness::completed();

    let replies = h.send(ANOTHER_PROGRAM).await;
    assert_eq!(keyboard_of(&replies[0]), Some(Keyboard::MuscleGroups));

    let replies = h.send(muscle_caption(MuscleFocus::Legs)).await;
    assert!(only_text(&replies).starts_with("Супер! Программа с акцентом на ноги."));
    assert_eq!(
        h.state().await,
        Some(DialogueState::ChoosingVariation {
            muscle: Some(MuscleFocus::Legs)
        })
    );

    let replies = h.send(Variation::Strength.caption()).await;
    assert_eq!(
        texts(&replies),
        vec![
            "\u{23F3} Генерирую программу...",
            "\u{2728} Программа готова!",
            "День 1: присед 3x10",
            WHATS_NEXT,
        ]
    );
    let preferences = h.coach.last_input().unwrap_or_default();
    assert!(preferences.starts_with(Variation::Strength.instruction()));
    assert!(preferences.contains("ОСОБЫЙ АКЦЕНТ на ноги"));

    let replies = h.send(Variation::Endurance.caption()).await;
    assert!(only_text(&replies).starts_with("\u{23F3} Подожди ещё 30 секунд"));
    assert_eq!(h.coach.calls(), 1);

    tokio::time::advance(Duration::from_secs(31)).await;
    let replies = h.send(Variation::Endurance.caption()).await;
    assert_eq!(replies.len(), 4);
    assert_eq!(h.coach.calls(), 2);
}

#[tokio::test]
async fn variation_failure_is_classified() {
    let mut h = Harness::completed();
    h.coach.push(Err(ProviderError::Timeout("30s".to_owned())));

    let replies = h.send(Variation::Random.caption()).await;
    let sent = texts(&replies);
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[1],
        "\u{274C} Не получилось сгенерировать программу.\n\n\
         \u{23F1}\u{FE0F} Сервер не ответил вовремя. Попробуй ещё раз через минуту."
    );

    // A failed generation does not start the cooldown.
    let replies = h.send(Variation::Random.caption()).await;
    assert_eq!(replies.len(), 4);
}

#[tokio::test]
async fn qa_mode_answers_until_back() {
    let mut h = Harness::completed();
    h.coach.push(Ok("## Белок\nПо 1.6 г на кг".to_owned()));

    let replies = h.send(ASK_COACH).await;
    assert!(only_text(&replies).starts_with("Задай вопрос"));

    let replies = h.send("Сколько белка есть?").await;
    assert_eq!(
        texts(&replies),
        vec!["\u{23F3} Думаю над ответом...", "Белок\nПо 1.6 г на кг"]
    );
    assert_eq!(h.coach.last_input().as_deref(), Some("Сколько белка есть?"));
    assert_eq!(h.state().await, Some(DialogueState::Qa));

    h.send("А углеводов?").await;
    assert_eq!(h.coach.calls(), 2);

    let replies = h.send(BACK_TO_MENU).await;
    assert_eq!(only_text(&replies), "Главное меню \u{2B07}\u{FE0F}");
    assert_eq!(h.state().await, None);
}

#[tokio::test]
async fn free_text_from_menu_generates_program() {
    let mut h = Harness::completed();
    let replies = h.send("программа для дома без инвентаря").await;

    assert_eq!(texts(&replies), vec!["День 1: присед 3x10", WHATS_NEXT]);
    assert_eq!(
        h.coach.last_input().as_deref(),
        Some("программа для дома без инвентаря")
    );
}

#[tokio::test]
async fn save_to_file_exports_last_reply() {
    let mut h = Harness::completed();

    let replies = h.send(SAVE_TO_FILE).await;
    assert!(only_text(&replies).starts_with("Сначала сгенерируй программу"));

    let replies = h.send(SAVED_ANSWERS).await;
    assert!(only_text(&replies).starts_with("У тебя пока нет сохранённых запросов."));

    h.send("программа на спину").await;
    let replies = h.send(SAVE_TO_FILE).await;
    assert_eq!(replies.len(), 1);
    let path = match &replies[0] {
        Reply::Document { path, caption } => {
            assert!(caption.starts_with("Вот файл с твоим последним запросом"));
            path.clone()
        }
        other => panic!("expected document, got {other:?}"),
    };
    assert_eq!(
        std::fs::read_to_string(&path).ok().as_deref(),
        Some("День 1: присед 3x10")
    );

    let replies = h.send(SAVED_ANSWERS).await;
    assert_eq!(replies.len(), 2);
    assert_eq!(
        replies[0].text(),
        Some("\u{1F4D1} Найдено сохранённых ответов: 1\n\nОтправляю последние 1...")
    );
    assert!(matches!(replies[1], Reply::Document { .. }));
}

#[tokio::test]
async fn restart_clears_everything_including_name() {
    let mut h = Harness::completed();
    let replies = h.send(RESTART).await;
    assert_eq!(
        only_text(&replies),
        "Заполним анкету заново \u{1F4DD} Как тебя зовут?"
    );

    let profile = h.profile();
    assert_eq!(profile.physical_data.name, None);
    assert!(!profile.physical_data_completed);
    assert_eq!(h.state().await, Some(DialogueState::AwaitingName));
}

#[tokio::test]
async fn start_keeps_name_and_asks_goal() {
    let mut h = Harness::completed();
    h.engine.handle_start(USER).await;
    let replies = h.drain();

    assert_eq!(
        only_text(&replies),
        "Аня, выбери свою цель тренировок \u{2B07}\u{FE0F}"
    );
    let profile = h.profile();
    assert_eq!(profile.physical_data.name.as_deref(), Some("Аня"));
    assert_eq!(profile.physical_data.age, None);
    assert!(!profile.physical_data_completed);
}

#[tokio::test]
async fn menu_command_shows_main_menu_for_completed_profile() {
    let mut h = Harness::completed();
    h.send(ASK_COACH).await;

    h.engine.handle_menu(USER).await;
    let replies = h.drain();
    assert_eq!(only_text(&replies), "Главное меню \u{2B07}\u{FE0F}");
    assert_eq!(keyboard_of(&replies[0]), Some(Keyboard::Main));
    assert_eq!(h.state().await, None);
}

// ---------------------------------------------------------------------------
// Per-user serialization
// ---------------------------------------------------------------------------

const THINKING: &str = "\u{23F3} Думаю над ответом...";

/// Coach that takes a while and echoes its input.
struct SlowCoach;

#[async_trait]
impl FitnessCoach for SlowCoach {
    async fn get_program(
        &self,
        _profile: &PhysicalData,
        preferences: &str,
    ) -> Result<String, ProviderError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(format!("P:{preferences}"))
    }

    async fn get_answer(
        &self,
        _profile: &PhysicalData,
        question: &str,
    ) -> Result<String, ProviderError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(format!("A:{question}"))
    }
}

#[tokio::test(start_paused = true)]
async fn one_user_is_served_in_order_while_others_proceed() {
    const OTHER: i64 = 2002;

    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(err) => panic!("tempdir should be created: {err}"),
    };
    let (tx, mut rx) = mpsc::channel(64);
    let settings = DialogueConfig {
        generation_cooldown_secs: 30,
        max_message_len: 3500,
        saved_history_limit: 10,
    };
    let engine = Arc::new(DialogueEngine::new(
        gym_mentor::profile::ProfileStore::new(dir.path().join("users")),
        Arc::new(SlowCoach),
        &settings,
        tx,
    ));

    for user in [USER, OTHER] {
        assert!(engine.store().save(user, &completed_profile()).is_ok());
        engine.handle_text(user, ASK_COACH).await;
    }
    while rx.try_recv().is_ok() {}

    let ask = |user: i64, question: &'static str| {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.handle_text(user, question).await })
    };
    let tasks = [ask(USER, "q1"), ask(USER, "q2"), ask(OTHER, "o1")];
    for task in tasks {
        if let Err(err) = task.await {
            panic!("dialogue task should finish: {err}");
        }
    }

    let mut log = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        if let Some(text) = msg.reply.text() {
            log.push((msg.user_id, text.to_owned()));
        }
    }
    let replies_of = |user: i64| {
        log.iter()
            .filter(|(id, _)| *id == user)
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
    };
    assert_eq!(replies_of(USER), vec![THINKING, "A:q1", THINKING, "A:q2"]);
    assert_eq!(replies_of(OTHER), vec![THINKING, "A:o1"]);

    let position = |wanted: &str| log.iter().position(|(_, text)| text == wanted);
    assert!(
        position("A:o1") < position("A:q2"),
        "another user should not wait for the second question: {log:?}"
    );
}
