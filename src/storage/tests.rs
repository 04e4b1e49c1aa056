use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::core::message::MessageRole;
use crate::core::session::MAX_MESSAGES;
use crate::storage::{SessionStore, SqliteStore};

async fn test_store() -> (Arc<SessionStore>, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let config = AppConfig {
        working_dir: tmp.path().to_path_buf(),
        data_dir: "data".into(),
        ..Default::default()
    };
    let kv = SqliteStore::open(&config).await.unwrap();
    kv.run_migrations().await.unwrap();
    (Arc::new(SessionStore::new(Arc::new(kv))), tmp)
}

#[tokio::test]
async fn test_read_unknown_key_returns_empty_session() {
    let (store, _tmp) = test_store().await;

    let session = store.read("nope").await.unwrap();
    assert!(session.messages.is_empty());
    assert!(session.user_name.is_none());
    assert!(session.last_art_prompt.is_none());

    // Reading never writes: a second read still sees no stored state.
    let again = store.read("nope").await.unwrap();
    assert!(again.messages.is_empty());
}

#[tokio::test]
async fn test_append_then_read_round_trip() {
    let (store, _tmp) = test_store().await;

    let appended = store
        .append("s1", MessageRole::User, "I'm Alice, draw me a cat")
        .await
        .unwrap();
    assert_eq!(appended.messages.len(), 1);
    assert_eq!(appended.user_name.as_deref(), Some("Alice"));

    let read = store.read("s1").await.unwrap();
    assert_eq!(read.messages, appended.messages);
    assert_eq!(read.user_name.as_deref(), Some("Alice"));
    assert_eq!(read.created_at, appended.created_at);
    assert_eq!(read.updated_at, appended.updated_at);
}

#[tokio::test]
async fn test_reads_are_idempotent() {
    let (store, _tmp) = test_store().await;

    store.append("s1", MessageRole::User, "hello").await.unwrap();
    let first = store.read("s1").await.unwrap();
    let second = store.read("s1").await.unwrap();

    assert_eq!(first.messages, second.messages);
    assert_eq!(first.created_at, second.created_at);
    assert_eq!(first.updated_at, second.updated_at);
}

#[tokio::test]
async fn test_log_truncates_at_cap() {
    let (store, _tmp) = test_store().await;

    for i in 0..MAX_MESSAGES + 5 {
        store
            .append("s1", MessageRole::User, &format!("message {i}"))
            .await
            .unwrap();
    }

    let session = store.read("s1").await.unwrap();
    assert_eq!(session.messages.len(), MAX_MESSAGES);
    assert_eq!(session.messages[0].content, "message 5");
}

#[tokio::test]
async fn test_user_name_persists_and_stays_first() {
    let (store, _tmp) = test_store().await;

    store.append("s1", MessageRole::User, "i'm alice").await.unwrap();
    store.append("s1", MessageRole::User, "call me bob").await.unwrap();

    let session = store.read("s1").await.unwrap();
    assert_eq!(session.user_name.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_set_last_prompt() {
    let (store, _tmp) = test_store().await;

    store.append("s1", MessageRole::User, "draw a fox").await.unwrap();
    let before = store.read("s1").await.unwrap();

    store.set_last_prompt("s1", "a fox").await.unwrap();
    let after = store.read("s1").await.unwrap();
    assert_eq!(after.last_art_prompt.as_deref(), Some("a fox"));
    assert!(after.updated_at >= before.updated_at);
}

#[tokio::test]
async fn test_clear_resets_to_empty() {
    let (store, _tmp) = test_store().await;

    store.append("s1", MessageRole::User, "I'm Alice").await.unwrap();
    store.set_last_prompt("s1", "a fox").await.unwrap();
    store.clear("s1").await.unwrap();

    let session = store.read("s1").await.unwrap();
    assert!(session.messages.is_empty());
    assert!(session.user_name.is_none());
    assert!(session.last_art_prompt.is_none());
}

#[tokio::test]
async fn test_concurrent_appends_do_not_lose_messages() {
    let (store, _tmp) = test_store().await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .append("busy", MessageRole::User, &format!("turn {i}"))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let session = store.read("busy").await.unwrap();
    assert_eq!(session.messages.len(), 20);
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let (store, _tmp) = test_store().await;

    store.append("one", MessageRole::User, "first session").await.unwrap();
    store.append("two", MessageRole::User, "second session").await.unwrap();

    let one = store.read("one").await.unwrap();
    let two = store.read("two").await.unwrap();
    assert_eq!(one.messages.len(), 1);
    assert_eq!(one.messages[0].content, "first session");
    assert_eq!(two.messages[0].content, "second session");
}
