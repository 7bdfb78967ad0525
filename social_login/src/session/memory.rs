use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::errors::SessionError;
use super::types::{SessionKey, SessionStore};

struct SessionEntry {
    values: HashMap<SessionKey, String>,
    expires_at: DateTime<Utc>,
}

/// Process-local session storage with a sliding idle expiry.
///
/// Every read or write of a live session pushes its expiry `ttl` seconds into the
/// future. Expired sessions behave as empty and are dropped lazily on access or in
/// bulk by [`SessionStore::purge_expired`].
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<String, SessionEntry>>,
    ttl: u64,
}

impl InMemorySessionStore {
    pub fn new(ttl: u64) -> Self {
        tracing::info!("Creating new in-memory session store (idle ttl: {}s)", ttl);
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Saturates at the latest representable time for very large ttls.
    fn next_expiry(&self) -> DateTime<Utc> {
        i64::try_from(self.ttl)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Returns the live entry for `session_id`, dropping it first if it has expired.
    fn live_entry<'a>(
        entries: &'a mut HashMap<String, SessionEntry>,
        session_id: &str,
    ) -> Option<&'a mut SessionEntry> {
        let expired = entries
            .get(session_id)
            .is_some_and(|entry| entry.expires_at <= Utc::now());
        if expired {
            tracing::debug!("Dropping expired session");
            entries.remove(session_id);
        }
        entries.get_mut(session_id)
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(1800)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str, key: SessionKey) -> Result<Option<String>, SessionError> {
        let mut entries = self.entries.lock().await;
        let expires_at = self.next_expiry();
        Ok(Self::live_entry(&mut entries, session_id).and_then(|entry| {
            entry.expires_at = expires_at;
            entry.values.get(&key).cloned()
        }))
    }

    async fn insert(
        &self,
        session_id: &str,
        key: SessionKey,
        value: String,
    ) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().await;
        let expires_at = self.next_expiry();
        if Self::live_entry(&mut entries, session_id).is_none() {
            entries.insert(
                session_id.to_string(),
                SessionEntry {
                    values: HashMap::new(),
                    expires_at,
                },
            );
        }
        if let Some(entry) = entries.get_mut(session_id) {
            entry.expires_at = expires_at;
            entry.values.insert(key, value);
        }
        Ok(())
    }

    async fn take(
        &self,
        session_id: &str,
        key: SessionKey,
    ) -> Result<Option<String>, SessionError> {
        let mut entries = self.entries.lock().await;
        let expires_at = self.next_expiry();
        let Some(entry) = Self::live_entry(&mut entries, session_id) else {
            return Ok(None);
        };
        entry.expires_at = expires_at;
        let value = entry.values.remove(&key);
        if entry.values.is_empty() {
            entries.remove(session_id);
        }
        Ok(value)
    }

    async fn clear(&self, session_id: &str) -> Result<(), SessionError> {
        self.entries.lock().await.remove(session_id);
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.lock().await;
        let expires_at = self.next_expiry();
        if Self::live_entry(&mut entries, from).is_none() {
            return Ok(());
        }
        if let Some(mut entry) = entries.remove(from) {
            entry.expires_at = expires_at;
            entries.insert(to.to_string(), entry);
        }
        Ok(())
    }

    async fn is_empty(&self, session_id: &str) -> Result<bool, SessionError> {
        let mut entries = self.entries.lock().await;
        Ok(Self::live_entry(&mut entries, session_id)
            .is_none_or(|entry| entry.values.is_empty()))
    }

    async fn purge_expired(&self) -> Result<usize, SessionError> {
        let now = Utc::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!("Purged {} expired sessions", removed);
        }
        Ok(removed)
    }
}
