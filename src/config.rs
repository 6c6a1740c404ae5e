//! Configuration loading.
//!
//! Loads settings from `./config.toml` (or `$GYM_MENTOR_CONFIG_PATH`, or an
//! explicit path from the CLI). Environment variables override file values;
//! file values override defaults. Secrets are never stored in the file, only
//! the names of the environment variables holding them.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

// ── Top-level config ────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telegram bot settings.
    pub telegram: TelegramConfig,
    /// LLM endpoint settings.
    pub llm: LlmConfig,
    /// Profile storage settings.
    pub storage: StorageConfig,
    /// Dialogue behaviour.
    pub dialogue: DialogueConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// `explicit` wins over `$GYM_MENTOR_CONFIG_PATH`, which wins over
    /// `./config.toml`. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let env = |key: &str| std::env::var(key).ok();
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => Self::config_path_with(env),
        };
        let mut config = Self::load_from_file(&path)?;
        config.apply_overrides(env);
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
                    .with_context(|| format!("invalid config at {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "failed to read config file {}: {e}",
                path.display()
            )),
        }
    }

    /// Resolve the config path using a custom env resolver.
    pub fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        match env("GYM_MENTOR_CONFIG_PATH") {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => PathBuf::from("config.toml"),
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Takes a resolver function so tests never touch the process environment.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("GYM_MENTOR_USERS_DIR") {
            self.storage.users_dir = PathBuf::from(v);
        }
        if let Some(v) = env("GYM_MENTOR_LOGS_DIR") {
            self.logging.logs_dir = PathBuf::from(v);
        }
        if let Some(v) = env("GYM_MENTOR_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = env("GYM_MENTOR_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = env("GYM_MENTOR_GENERATION_COOLDOWN_SECS") {
            match v.parse() {
                Ok(n) => self.dialogue.generation_cooldown_secs = n,
                Err(_) => tracing::warn!(
                    var = "GYM_MENTOR_GENERATION_COOLDOWN_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }

    /// Read the tokens named by this config.
    ///
    /// # Errors
    ///
    /// Returns an error if the Telegram token is missing or empty. A missing
    /// LLM token is only logged.
    pub fn resolve_secrets(&self, env: impl Fn(&str) -> Option<String>) -> Result<Secrets> {
        let telegram_token = env(&self.telegram.bot_token_env)
            .filter(|t| !t.trim().is_empty())
            .with_context(|| {
                format!(
                    "environment variable {} is not set",
                    self.telegram.bot_token_env
                )
            })?;

        let llm_api_key = env(&self.llm.api_key_env).filter(|t| !t.trim().is_empty());
        if llm_api_key.is_none() {
            tracing::warn!(
                var = %self.llm.api_key_env,
                "LLM token not set, requests will be sent without authorization"
            );
        }

        Ok(Secrets {
            telegram_token,
            llm_api_key,
        })
    }

    /// Parse a TOML string into config.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }
}

// ── Sections ────────────────────────────────────────────────────

/// Telegram bot settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Environment variable holding the bot token.
    pub bot_token_env: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token_env: "TELEGRAM_TOKEN".to_owned(),
        }
    }
}

/// OpenAI-compatible LLM endpoint settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL; `/chat/completions` is appended.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum completion tokens.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gigachat.devices.sberbank.ru/api/v1".to_owned(),
            model: "GigaChat".to_owned(),
            api_key_env: "GIGACHAT_TOKEN".to_owned(),
            timeout_secs: 120,
            max_tokens: Some(4096),
            temperature: Some(0.7),
        }
    }
}

/// Where profiles and exports live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of `<user_id>.json` and `program_*.txt` files.
    pub users_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            users_dir: PathBuf::from("data/users"),
        }
    }
}

/// Dialogue behaviour.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Minimum seconds between program generations per user.
    pub generation_cooldown_secs: u64,
    /// Maximum characters per outgoing Telegram message.
    pub max_message_len: usize,
    /// Maximum saved exports sent by the history button.
    pub saved_history_limit: usize,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            generation_cooldown_secs: 30,
            max_message_len: 3500,
            saved_history_limit: 10,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for rotated JSON logs.
    pub logs_dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            logs_dir: PathBuf::from("logs"),
        }
    }
}

// ── Secrets ─────────────────────────────────────────────────────

/// Tokens read from the environment at startup.
#[derive(Clone)]
pub struct Secrets {
    /// Telegram bot token.
    pub telegram_token: String,
    /// LLM bearer token, if configured.
    pub llm_api_key: Option<String>,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("telegram_token", &"[REDACTED]")
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

// ── Tests ───────────────────────────────────────────────────────
