use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::cookie::new_session_id;
use super::errors::SessionError;

/// The fixed set of keys the login flow keeps in a browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// Single-use CSRF token, present only while a login is in flight
    OAuthState,
    /// Where to send the user after a successful login
    RedirectPath,
    /// JSON-serialized `UserProfile` of the logged-in user
    User,
}

impl SessionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OAuthState => "oauth_state",
            Self::RedirectPath => "redirect_path",
            Self::User => "user",
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session data of the current request, as seen by the login flow.
///
/// Implementations are scoped to a single browser session. `take` must read and
/// remove the value in one step so that a value can be consumed at most once even
/// when two requests for the same session overlap.
#[async_trait]
pub trait LoginSession: Send + Sync {
    async fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError>;

    async fn insert(&self, key: SessionKey, value: String) -> Result<(), SessionError>;

    /// Remove a value and return what was stored, if anything.
    async fn take(&self, key: SessionKey) -> Result<Option<String>, SessionError>;

    async fn remove(&self, key: SessionKey) -> Result<(), SessionError> {
        self.take(key).await.map(|_| ())
    }

    /// Remove every key of this session.
    async fn clear(&self) -> Result<(), SessionError>;

    /// Move the session's data to a fresh session id. The old id is left empty.
    async fn regenerate(&self) -> Result<(), SessionError>;
}

/// Backing storage for all sessions, keyed by session id.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    async fn get(&self, session_id: &str, key: SessionKey) -> Result<Option<String>, SessionError>;

    async fn insert(
        &self,
        session_id: &str,
        key: SessionKey,
        value: String,
    ) -> Result<(), SessionError>;

    async fn take(&self, session_id: &str, key: SessionKey)
    -> Result<Option<String>, SessionError>;

    async fn clear(&self, session_id: &str) -> Result<(), SessionError>;

    /// Move all data of session `from` to the unused id `to`, leaving `from` empty.
    async fn rename(&self, from: &str, to: &str) -> Result<(), SessionError>;

    /// True when the session holds no keys (unknown and expired sessions are empty).
    async fn is_empty(&self, session_id: &str) -> Result<bool, SessionError>;

    /// Drop every expired session and return how many were removed.
    async fn purge_expired(&self) -> Result<usize, SessionError>;
}

/// A `LoginSession` bound to one session id of a shared `SessionStore`.
///
/// Clones share the id, so a `regenerate` through one clone is seen by all of
/// them (the cookie layer reads the current id after the handler ran).
#[derive(Clone)]
pub struct SessionHandle {
    store: Arc<dyn SessionStore>,
    session_id: Arc<RwLock<String>>,
}

impl SessionHandle {
    pub fn new(store: Arc<dyn SessionStore>, session_id: impl Into<String>) -> Self {
        Self {
            store,
            session_id: Arc::new(RwLock::new(session_id.into())),
        }
    }

    pub async fn session_id(&self) -> String {
        self.session_id.read().await.clone()
    }

    pub async fn is_empty(&self) -> Result<bool, SessionError> {
        let session_id = self.session_id.read().await;
        self.store.is_empty(&session_id).await
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("session_id", &"[redacted]")
            .finish()
    }
}

#[async_trait]
impl LoginSession for SessionHandle {
    async fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError> {
        let session_id = self.session_id.read().await;
        self.store.get(&session_id, key).await
    }

    async fn insert(&self, key: SessionKey, value: String) -> Result<(), SessionError> {
        let session_id = self.session_id.read().await;
        self.store.insert(&session_id, key, value).await
    }

    async fn take(&self, key: SessionKey) -> Result<Option<String>, SessionError> {
        let session_id = self.session_id.read().await;
        self.store.take(&session_id, key).await
    }

    async fn clear(&self) -> Result<(), SessionError> {
        let session_id = self.session_id.read().await;
        self.store.clear(&session_id).await
    }

    async fn regenerate(&self) -> Result<(), SessionError> {
        let new_id = new_session_id()?;
        let mut session_id = self.session_id.write().await;
        self.store.rename(&session_id, &new_id).await?;
        tracing::debug!("Session id regenerated");
        *session_id = new_id;
        Ok(())
    }
}
