//! GymAiMentor CLI entry point.
//!
//! Provides `start` to run the Telegram bot and `profile` to print a stored
//! user profile.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;

use gym_mentor::config::Config;
use gym_mentor::dialogue::DialogueEngine;
use gym_mentor::profile::ProfileStore;
use gym_mentor::providers::openai::OpenAiCoach;
use gym_mentor::providers::FitnessCoach;

/// Capacity of the reply channel between the dialogue and Telegram.
const OUTBOUND_CHANNEL_CAPACITY: usize = 256;

/// GymAiMentor: personal fitness trainer bot for Telegram.
#[derive(Parser)]
#[command(name = "gym-mentor", version, about)]
struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Run the Telegram bot.
    Start {
        /// Path to config.toml.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the stored profile of a user.
    Profile {
        /// Telegram user id.
        user_id: i64,
        /// Path to config.toml.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Start { config } => handle_start(config).await,
        Command::Profile { user_id, config } => handle_profile(user_id, config),
    }
}

/// Run the bot until Ctrl+C.
async fn handle_start(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    // A missing .env is fine; variables may come from the environment.
    let _ = dotenvy::dotenv();

    let config = Config::load(config_path.as_deref()).context("failed to load configuration")?;
    let _logging_guard = gym_mentor::logging::init_production(&config.logging.logs_dir)?;

    let secrets = config.resolve_secrets(|key| std::env::var(key).ok())?;

    let coach: Arc<dyn FitnessCoach> = Arc::new(
        OpenAiCoach::new(&config.llm, secrets.llm_api_key.clone())
            .context("failed to create LLM client")?,
    );

    let store = ProfileStore::new(&config.storage.users_dir);
    let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CHANNEL_CAPACITY);
    let engine = Arc::new(DialogueEngine::new(
        store,
        coach,
        &config.dialogue,
        outbound_tx,
    ));

    info!(
        users_dir = %config.storage.users_dir.display(),
        model = %config.llm.model,
        "gym mentor started"
    );

    gym_mentor::telegram::run_telegram(
        &secrets.telegram_token,
        engine,
        outbound_rx,
        config.dialogue.max_message_len,
    )
    .await?;

    info!("gym mentor stopped");
    Ok(())
}

/// Print one user's profile summary to stdout.
fn handle_profile(user_id: i64, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    gym_mentor::logging::init_cli();
    let _ = dotenvy::dotenv();

    let config = Config::load(config_path.as_deref()).context("failed to load configuration")?;
    let store = ProfileStore::new(&config.storage.users_dir);
    let profile = store.load(user_id);

    println!("{}", store.render_profile_text(user_id));
    println!();
    println!(
        "Анкета заполнена: {}",
        if profile.physical_data_completed {
            "да"
        } else {
            "нет"
        }
    );
    println!("Записей в истории: {}", profile.history.len());
    Ok(())
}
