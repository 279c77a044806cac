use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session backend error: {0}")]
    Backend(String),
    #[error("Failed to encode session value: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Raw per-visitor key/value storage. Values are JSON strings.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session_id: &str, key: &str, value: String) -> SessionResult<()>;

    async fn load(&self, session_id: &str, key: &str) -> SessionResult<Option<String>>;

    /// Removing an absent key is a no-op.
    async fn delete(&self, session_id: &str, key: &str) -> SessionResult<()>;

    /// Reads and removes `key` in one step.
    async fn take(&self, session_id: &str, key: &str) -> SessionResult<Option<String>>;
}

/// One visitor's session: the id from their cookie bound to a store.
/// Clones share the same write flag.
#[derive(Clone)]
pub struct Session {
    id: String,
    store: Arc<dyn SessionStore>,
    written: Arc<AtomicBool>,
}

impl Session {
    pub fn new(id: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            id: id.into(),
            store,
            written: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// True once any clone of this handle has stored a value. Stores restart
    /// the session lifetime on every write, so the cookie must follow.
    pub fn was_written(&self) -> bool {
        self.written.load(Ordering::Relaxed)
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) -> SessionResult<()> {
        let encoded = serde_json::to_string(value)?;
        self.store.insert(&self.id, key, encoded).await?;
        self.written.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Typed read. A value stored under `key` with a different shape is
    /// reported as absent.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> SessionResult<Option<T>> {
        let raw = self.store.load(&self.id, key).await?;
        Ok(raw.and_then(|raw| decode(key, &raw)))
    }

    pub async fn get_string(&self, key: &str) -> SessionResult<String> {
        Ok(self.get::<String>(key).await?.unwrap_or_default())
    }

    pub async fn pop<T: DeserializeOwned>(&self, key: &str) -> SessionResult<Option<T>> {
        let raw = self.store.take(&self.id, key).await?;
        Ok(raw.and_then(|raw| decode(key, &raw)))
    }

    pub async fn pop_string(&self, key: &str) -> SessionResult<Option<String>> {
        self.pop::<String>(key).await
    }

    pub async fn remove(&self, key: &str) -> SessionResult<()> {
        self.store.delete(&self.id, key).await
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Session value under '{}' has an unexpected shape: {}", key, e);
            None
        }
    }
}

struct MemoryEntry {
    values: HashMap<String, String>,
    expires_at: Instant,
}

/// Process-local session store. Entries expire `lifetime` after their last
/// write. An expired session is dropped when its visitor touches it again;
/// abandoned ones are left for [`MemorySessionStore::spawn_sweeper`].
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, MemoryEntry>>,
    lifetime: Duration,
}

impl MemorySessionStore {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            lifetime,
        }
    }

    pub async fn entry_count(&self, session_id: &str) -> usize {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.values.len())
            .unwrap_or(0)
    }

    /// Drops every expired session and returns how many went.
    pub async fn sweep_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Instant::now();
        sessions.retain(|_, entry| entry.expires_at > now);
        before - sessions.len()
    }

    /// Sweeps every `every` until the store is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let swept = store.sweep_expired().await;
                if swept > 0 {
                    debug!("Swept {} expired session(s)", swept);
                }
            }
        })
    }

    async fn purge_expired(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get(session_id) {
            if entry.expires_at <= Instant::now() {
                sessions.remove(session_id);
            }
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(24 * 60 * 60))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session_id: &str, key: &str, value: String) -> SessionResult<()> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let entry = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| MemoryEntry {
                values: HashMap::new(),
                expires_at: now,
            });
        if entry.expires_at <= now {
            entry.values.clear();
        }
        entry.values.insert(key.to_string(), value);
        entry.expires_at = now + self.lifetime;
        Ok(())
    }

    async fn load(&self, session_id: &str, key: &str) -> SessionResult<Option<String>> {
        self.purge_expired(session_id).await;
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(session_id)
            .and_then(|entry| entry.values.get(key).cloned()))
    }

    async fn delete(&self, session_id: &str, key: &str) -> SessionResult<()> {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(session_id) {
            entry.values.remove(key);
        }
        Ok(())
    }

    async fn take(&self, session_id: &str, key: &str) -> SessionResult<Option<String>> {
        self.purge_expired(session_id).await;
        let mut sessions = self.sessions.write().await;
        Ok(sessions
            .get_mut(session_id)
            .and_then(|entry| entry.values.remove(key)))
    }
}
