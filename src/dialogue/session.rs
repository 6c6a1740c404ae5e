//! In-memory per-user session store.
//!
//! Each user gets one [`Session`] behind its own async mutex. The engine
//! holds that lock for the whole handling of a message, so two messages from
//! the same user are processed one after the other while different users
//! proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::state::DialogueState;

/// Transient state of one user. Lost on restart.
#[derive(Debug, Default)]
pub struct Session {
    /// Current dialogue stage; `None` means idle at the main menu.
    pub state: Option<DialogueState>,
    /// When the last counted program generation finished.
    pub last_generation: Option<Instant>,
    /// Most recent generated text.
    pub last_reply: Option<String>,
}

/// Shared handle to one user's session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Process-wide map of user sessions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<i64, SessionHandle>>,
}

impl SessionStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session of `user_id`, created on first use.
    pub async fn session(&self, user_id: i64) -> SessionHandle {
        let mut sessions = self.sessions.lock().await;
        Arc::clone(sessions.entry(user_id).or_default())
    }

    /// Number of users seen since start.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Whether no user has been seen yet.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    /// Drops sessions that carry nothing worth keeping and returns how many
    /// were removed.
    ///
    /// A session survives while a handler holds it, while it is in a
    /// dialogue stage, or while its last generation is younger than
    /// `keep_for`. A dropped user's cached reply is still in the profile.
    pub async fn prune_idle(&self, keep_for: Duration) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(session) => {
                    session.state.is_some()
                        || session
                            .last_generation
                            .is_some_and(|at| at.elapsed() < keep_for)
                }
                Err(_) => true,
            }
        });
        before.saturating_sub(sessions.len())
    }
}
