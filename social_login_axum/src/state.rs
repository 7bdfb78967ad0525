use std::sync::Arc;

use social_login::{OAuth2Orchestrator, SessionStore};

use crate::config::SessionCookieConfig;

/// Shared state of the login routes.
#[derive(Clone)]
pub struct AuthState {
    pub(crate) orchestrator: Arc<OAuth2Orchestrator>,
    pub(crate) sessions: Arc<dyn SessionStore>,
    pub(crate) cookie: Arc<SessionCookieConfig>,
    /// Public origin used as the base of callback URLs
    pub(crate) origin: String,
}

impl AuthState {
    pub fn new(
        orchestrator: OAuth2Orchestrator,
        sessions: Arc<dyn SessionStore>,
        cookie: SessionCookieConfig,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            sessions,
            cookie: Arc::new(cookie),
            origin: origin.into(),
        }
    }

    pub fn orchestrator(&self) -> &OAuth2Orchestrator {
        &self.orchestrator
    }
}
