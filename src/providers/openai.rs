//! OpenAI-compatible coach using the `/chat/completions` API.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::LlmConfig;
use crate::profile::PhysicalData;

use super::{check_http_response, prompt, FitnessCoach, ProviderError};

// ---------------------------------------------------------------------------
// Wire types (pub for integration testing)
// ---------------------------------------------------------------------------

/// Chat completions request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Maximum completion tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A message in chat format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct ChatMessage {
    /// Role (`system` or `user`).
    pub role: &'static str,
    /// Text content.
    pub content: String,
}

/// Chat completions response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Response choices.
    pub choices: Vec<ChatChoice>,
}

/// A response choice.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// Assistant message for this choice.
    pub message: ChatResponseMessage,
}

/// Assistant message.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct ChatResponseMessage {
    /// Optional text content.
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Coach
// ---------------------------------------------------------------------------

/// Coach backed by an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct OpenAiCoach {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl fmt::Debug for OpenAiCoach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiCoach")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl OpenAiCoach {
    /// Create a coach from LLM settings and an optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Request`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig, api_key: Option<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        Ok(Self {
            endpoint: completions_endpoint(&config.base_url),
            model: config.model.clone(),
            api_key: api_key.filter(|k| !k.is_empty()),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client,
        })
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn complete(&self, system: String, user: String) -> Result<String, ProviderError> {
        let request = build_request(
            &self.model,
            system,
            user,
            self.max_tokens,
            self.temperature,
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json");
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let started = Instant::now();
        let response = builder.json(&request).send().await?;
        let payload = check_http_response(response).await?;
        let text = parse_response(&payload)?;

        info!(
            model = %self.model,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            len = text.len(),
            "coach reply received"
        );
        Ok(text)
    }
}

/// Append `/chat/completions` unless the URL already ends with it.
#[doc(hidden)]
pub fn completions_endpoint(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/chat/completions")
    }
}

// ---------------------------------------------------------------------------
// Request / Response builders (pub for integration testing)
// ---------------------------------------------------------------------------

/// Build a two-message chat request.
#[doc(hidden)]
pub fn build_request(
    model: &str,
    system: String,
    user: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
) -> ChatRequest {
    ChatRequest {
        model: model.to_owned(),
        messages: vec![
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ],
        max_tokens,
        temperature,
    }
}

/// Extract the first choice's text.
///
/// # Errors
///
/// Returns [`ProviderError::Parse`] if the body does not deserialize or has
/// no choices, and [`ProviderError::EmptyReply`] if the text is blank.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, ProviderError> {
    let resp: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Parse(e.to_string()))?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Parse("missing choices[0]".to_owned()))?;

    match choice.message.content {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(ProviderError::EmptyReply),
    }
}

// ---------------------------------------------------------------------------
// Trait impl
// ---------------------------------------------------------------------------

#[async_trait::async_trait]
impl FitnessCoach for OpenAiCoach {
    async fn get_program(
        &self,
        profile: &PhysicalData,
        preferences: &str,
    ) -> Result<String, ProviderError> {
        debug!(preferences_len = preferences.len(), "requesting program");
        self.complete(
            prompt::system_prompt(profile),
            prompt::program_request(profile, preferences),
        )
        .await
    }

    async fn get_answer(
        &self,
        profile: &PhysicalData,
        question: &str,
    ) -> Result<String, ProviderError> {
        debug!(question_len = question.len(), "requesting answer");
        self.complete(prompt::system_prompt(profile), question.trim().to_owned())
            .await
    }
}
