//! Per-user session store tests.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use gym_mentor::dialogue::{DialogueState, SessionStore};

#[tokio::test]
async fn sessions_are_created_on_first_use() {
    let store = SessionStore::new();
    assert!(store.is_empty().await);

    let _ = store.session(1).await;
    let _ = store.session(2).await;
    let _ = store.session(1).await;

    assert_eq!(store.len().await, 2);
    assert!(!store.is_empty().await);
}

#[tokio::test]
async fn same_user_shares_one_session() {
    let store = SessionStore::new();
    let first = store.session(42).await;
    let second = store.session(42).await;
    assert!(Arc::ptr_eq(&first, &second));

    first.lock().await.state = Some(DialogueState::Qa);
    assert_eq!(second.lock().await.state, Some(DialogueState::Qa));
}

#[tokio::test]
async fn users_do_not_share_state() {
    let store = SessionStore::new();
    store.session(1).await.lock().await.last_reply = Some("план".to_owned());
    assert_eq!(store.session(2).await.lock().await.last_reply, None);
}

#[tokio::test(start_paused = true)]
async fn prune_keeps_busy_staged_and_cooling_sessions() {
    let store = SessionStore::new();
    let window = Duration::from_secs(30);

    let _ = store.session(1).await;
    store.session(2).await.lock().await.state = Some(DialogueState::Qa);
    store.session(3).await.lock().await.last_generation = Some(Instant::now());
    let held = store.session(4).await;

    assert_eq!(store.prune_idle(window).await, 1);
    assert_eq!(store.len().await, 3);

    tokio::time::advance(Duration::from_secs(31)).await;
    drop(held);

    assert_eq!(store.prune_idle(window).await, 2);
    assert_eq!(store.len().await, 1);
    assert_eq!(
        store.session(2).await.lock().await.state,
        Some(DialogueState::Qa)
    );
}
