use reprise_state_memory::MemorySessionStore;
use reprise_types::{
    ProviderFamily, ReasoningState, SessionError, SessionId, SessionStore, ThinkingState,
};
use std::sync::Arc;
use std::time::Duration;

fn state(id: &str) -> ThinkingState {
    let mut state = ThinkingState::new(SessionId::new(id), "claude-sonnet");
    state.record_round(
        Some(&ReasoningState::new(ProviderFamily::Anthropic, vec![0, 159, 146, 150])),
        1200,
        1500,
        false,
    );
    state
}

// --- Snapshots ---

#[tokio::test]
async fn save_then_load() {
    let store = MemorySessionStore::new();
    let saved = state("s1");
    store.save(&saved).await.unwrap();

    let loaded = store.load(&SessionId::new("s1")).await.unwrap();
    assert_eq!(loaded, Some(saved));
}

#[tokio::test]
async fn load_missing_returns_none() {
    let store = MemorySessionStore::new();
    assert!(store.load(&SessionId::new("nope")).await.unwrap().is_none());
}

#[tokio::test]
async fn save_overwrites() {
    let store = MemorySessionStore::new();
    let mut s = state("s1");
    store.save(&s).await.unwrap();
    s.record_round(None, 10, 20, true);
    store.save(&s).await.unwrap();

    let loaded = store.load(&SessionId::new("s1")).await.unwrap().unwrap();
    assert_eq!(loaded.continuation_count, 1);
    assert_eq!(loaded.total_thinking_tokens, 1210);
    // A round without state kept the earlier bytes.
    assert_eq!(
        loaded.reasoning_state.unwrap().opaque_data,
        vec![0, 159, 146, 150]
    );
}

#[tokio::test]
async fn sessions_are_isolated() {
    let store = MemorySessionStore::new();
    store.save(&state("a")).await.unwrap();
    store.save(&state("b")).await.unwrap();

    assert_eq!(
        store.sessions().await,
        vec![SessionId::new("a"), SessionId::new("b")]
    );
    assert!(store.remove(&SessionId::new("a")).await);
    assert!(!store.remove(&SessionId::new("a")).await);
    assert!(store.load(&SessionId::new("a")).await.unwrap().is_none());
    assert!(store.load(&SessionId::new("b")).await.unwrap().is_some());
}

#[tokio::test]
async fn export_import_round_trip() {
    let source = MemorySessionStore::new();
    source.save(&state("s1")).await.unwrap();
    let snapshot = source.export(&SessionId::new("s1")).await.unwrap();

    let target = MemorySessionStore::default();
    target.import(SessionId::new("s1"), snapshot).await;
    assert_eq!(
        target.load(&SessionId::new("s1")).await.unwrap(),
        source.load(&SessionId::new("s1")).await.unwrap()
    );
}

#[tokio::test]
async fn undecodable_snapshot_is_corrupt() {
    let store = MemorySessionStore::new();
    store
        .import(SessionId::new("s1"), serde_json::json!({"model_id": 7}))
        .await;

    let err = store.load(&SessionId::new("s1")).await.unwrap_err();
    assert!(matches!(err, SessionError::Corrupt { ref session, .. } if session.as_str() == "s1"));
}

// --- Exclusivity ---

#[tokio::test]
async fn try_lock_on_held_session_is_busy() {
    let store = MemorySessionStore::new();
    let id = SessionId::new("s1");
    let guard = store.try_lock(&id).await.unwrap();

    let err = store.try_lock(&id).await.unwrap_err();
    assert!(matches!(err, SessionError::Busy(ref busy) if *busy == id));

    drop(guard);
    assert!(store.try_lock(&id).await.is_ok());
}

#[tokio::test]
async fn lock_waits_for_release() {
    let store = Arc::new(MemorySessionStore::new());
    let id = SessionId::new("s1");
    let guard = store.lock(&id).await.unwrap();

    let waiter = {
        let store = Arc::clone(&store);
        let id = id.clone();
        tokio::spawn(async move { store.lock(&id).await.map(|g| g.session().clone()) })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    drop(guard);
    let acquired = waiter.await.unwrap().unwrap();
    assert_eq!(acquired, id);
}
