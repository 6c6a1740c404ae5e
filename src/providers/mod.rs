//! LLM collaborator abstraction.
//!
//! Defines the [`FitnessCoach`] trait the dialogue calls for programs and
//! answers, the [`ProviderError`] type every implementation returns, and the
//! keyword classification used to pick a user-facing failure message.
//!
//! One implementation is provided: [`openai::OpenAiCoach`], a client for any
//! OpenAI-compatible `/chat/completions` endpoint.

use async_trait::async_trait;
use regex::Regex;

use crate::profile::PhysicalData;

pub mod openai;
pub mod prompt;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by coach implementations.
///
/// Display text always contains the keyword [`FailureKind::classify`] looks
/// for, so callers can classify from the message alone.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request did not complete in time.
    #[error("request timeout: {0}")]
    Timeout(String),
    /// The endpoint could not be reached.
    #[error("connection error: {0}")]
    Connection(String),
    /// Any other transport failure.
    #[error("provider request failed: {0}")]
    Request(String),
    /// Upstream responded with an error status.
    #[error("provider returned non-success status {status} ({reason}): {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase (e.g. `Unauthorized`).
        reason: String,
        /// Sanitized response body.
        body: String,
    },
    /// Response did not match the expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// The model returned no text.
    #[error("provider returned an empty reply")]
    EmptyReply,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

impl ProviderError {
    /// Classification of this error for user-facing messages.
    pub fn kind(&self) -> FailureKind {
        FailureKind::classify(&self.to_string())
    }
}

/// Coarse failure category derived from an error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Message mentions `timeout`.
    Timeout,
    /// Message mentions `connection`.
    Connection,
    /// Message mentions `unauthorized` or `403`.
    Unauthorized,
    /// Anything else.
    Other,
}

impl FailureKind {
    /// Classify an error message by case-insensitive keyword search.
    ///
    /// Checked in order: timeout, connection, authorization.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("timeout") {
            Self::Timeout
        } else if lower.contains("connection") {
            Self::Connection
        } else if lower.contains("unauthorized") || lower.contains("403") {
            Self::Unauthorized
        } else {
            Self::Other
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns a transport [`ProviderError`] if the body cannot be read and
/// [`ProviderError::HttpStatus`] on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("unknown").to_owned(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

/// Collapse whitespace, redact token-like values and truncate to 256 chars.
pub fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [
        r"sk-[A-Za-z0-9_\-]{20,}",
        r"(?i)bearer\s+[A-Za-z0-9._\-]{16,}",
        r"eyJ[A-Za-z0-9_\-]{10,}\.[A-Za-z0-9_\-]{10,}\.[A-Za-z0-9_\-]+",
        r"\b[0-9]{6,}:[A-Za-z0-9_\-]{30,}\b",
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Text generation collaborator.
///
/// Implementations must be `Send + Sync`; one instance is shared by every
/// dialogue task.
#[async_trait]
pub trait FitnessCoach: Send + Sync {
    /// Generate a workout program for `profile`.
    ///
    /// `preferences` may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, status or parse failure.
    async fn get_program(
        &self,
        profile: &PhysicalData,
        preferences: &str,
    ) -> Result<String, ProviderError>;

    /// Answer a free-form training or nutrition question.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on transport, status or parse failure.
    async fn get_answer(
        &self,
        profile: &PhysicalData,
        question: &str,
    ) -> Result<String, ProviderError>;
}
