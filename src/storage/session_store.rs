use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::core::error::StorageError;
use crate::core::message::MessageRole;
use crate::core::session::Session;
use crate::storage::kv::KvStore;

/// Typed session facade over a [`KvStore`]. Each operation holds a per-key
/// async lock for its whole read-modify-write cycle, so concurrent turns on
/// one session serialize while distinct sessions proceed in parallel.
pub struct SessionStore {
    kv: Arc<dyn KvStore>,
    locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    // Lock entries are never reaped; session counts stay small enough that
    // the map is cheaper than any eviction scheme.
    fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks.entry(key.to_string()).or_default().clone()
    }

    async fn load(&self, key: &str) -> Result<Session, StorageError> {
        match self.kv.get(key).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(Session::new()),
        }
    }

    async fn save(&self, key: &str, session: &Session) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(session)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.kv.put(key, &bytes).await
    }

    /// Current snapshot. An unknown key reads as a fresh empty session;
    /// nothing is written, so reads never create state.
    pub async fn read(&self, key: &str) -> Result<Session, StorageError> {
        let lock = self.key_lock(key);
        let _guard = lock.lock().await;
        self.load(key).await
    }

    /// Append one message and return the updated snapshot.
    pub async fn append(
        &self,
        key: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<Session, StorageError> {
        let lock = self.key_lock(key);
        let _guard = lock.lock().await;
        let mut session = self.load(key).await?;
        session.record(role, content);
        self.save(key, &session).await?;
        Ok(session)
    }

    pub async fn set_last_prompt(&self, key: &str, prompt: &str) -> Result<(), StorageError> {
        let lock = self.key_lock(key);
        let _guard = lock.lock().await;
        let mut session = self.load(key).await?;
        session.set_last_art_prompt(prompt);
        self.save(key, &session).await
    }

    /// Reset to the empty snapshot. Expressed as a put so a cleared session
    /// is indistinguishable from a never-written one.
    pub async fn clear(&self, key: &str) -> Result<(), StorageError> {
        let lock = self.key_lock(key);
        let _guard = lock.lock().await;
        self.save(key, &Session::new()).await
    }
}
