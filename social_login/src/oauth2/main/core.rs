use std::sync::Arc;
use url::Url;

use crate::config::DEFAULT_SUCCESS_PATH;
use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::registry::ProviderRegistry;
use crate::oauth2::types::{CallbackParams, LoginOutcome, UserProfile};
use crate::session::{LoginSession, SessionError, SessionKey};
use crate::utils::gen_random_string;

use super::exchange::TokenRequest;
use super::userinfo::fetch_user_profile;
use super::utils::{callback_url, default_http_client, states_match};

/// Drives the authorization-code flow for every registered provider.
#[derive(Debug, Clone)]
pub struct OAuth2Orchestrator {
    registry: Arc<ProviderRegistry>,
    client: reqwest::Client,
}

impl OAuth2Orchestrator {
    /// Creates an orchestrator with a client honoring `OAUTH2_HTTP_TIMEOUT_SECS`.
    pub fn new(registry: Arc<ProviderRegistry>) -> Result<Self, OAuth2Error> {
        Ok(Self::with_client(registry, default_http_client()?))
    }

    pub fn with_client(registry: Arc<ProviderRegistry>, client: reqwest::Client) -> Self {
        Self { registry, client }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Start a login with `provider` and return the URL to send the browser to.
    ///
    /// Stores a fresh single-use state token in the session, replacing any login
    /// still in flight. `redirect_path` is remembered for after the callback; a
    /// destination left over from an earlier attempt is dropped when none is given.
    pub async fn initiate_login(
        &self,
        provider: &str,
        session: &dyn LoginSession,
        callback_base_url: &str,
        redirect_path: Option<&str>,
    ) -> Result<Url, OAuth2Error> {
        let provider = self.registry.get(provider)?;
        let endpoints = provider.endpoints(&self.client).await?;
        let config = provider.config();

        let mut auth_url = Url::parse(&endpoints.authorization).map_err(|e| {
            OAuth2Error::Config(format!(
                "Invalid authorization endpoint for {}: {e}",
                provider.id()
            ))
        })?;

        let state = gen_random_string(32)?;
        let redirect_uri = callback_url(callback_base_url, provider.id());

        session.insert(SessionKey::OAuthState, state.clone()).await?;
        match redirect_path {
            Some(path) => {
                session
                    .insert(SessionKey::RedirectPath, path.to_string())
                    .await?
            }
            None => session.remove(SessionKey::RedirectPath).await?,
        }

        auth_url
            .query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &config.client_id)
            .append_pair("redirect_uri", &redirect_uri)
            .append_pair("scope", &config.scope)
            .append_pair("state", &state);

        tracing::info!("Login initiated with {}", provider.id());
        tracing::debug!("Authorization URL: {}", auth_url);

        Ok(auth_url)
    }

    /// Complete a login from the provider's redirect back to us.
    ///
    /// The stored state is consumed before anything else is checked, so each state
    /// token backs at most one callback attempt. On success the session moves to a
    /// fresh id, the profile is stored under `user` and the remembered destination
    /// (or `/success`) is returned.
    pub async fn handle_callback(
        &self,
        provider: &str,
        session: &dyn LoginSession,
        params: &CallbackParams,
        callback_base_url: &str,
    ) -> Result<LoginOutcome, OAuth2Error> {
        let provider = self.registry.get(provider)?;

        let stored_state = session.take(SessionKey::OAuthState).await?;
        match (stored_state.as_deref(), params.state.as_deref()) {
            (Some(stored), Some(received)) if states_match(stored, received) => {}
            (None, _) => {
                tracing::warn!("Callback for {} without a pending login", provider.id());
                tracing::debug!("No oauth_state in session");
                return Err(OAuth2Error::InvalidState);
            }
            (Some(_), None) => {
                tracing::warn!("Callback for {} rejected: invalid state", provider.id());
                tracing::debug!("Callback carries no state parameter");
                return Err(OAuth2Error::InvalidState);
            }
            (Some(_), Some(_)) => {
                tracing::warn!("Callback for {} rejected: invalid state", provider.id());
                tracing::debug!("State parameter does not match the stored state");
                return Err(OAuth2Error::InvalidState);
            }
        }

        if let Some(error) = &params.error {
            tracing::error!(
                "Provider {} returned error: {} ({})",
                provider.id(),
                error,
                params.error_description.as_deref().unwrap_or("no description")
            );
            return Err(OAuth2Error::TokenExchange(format!(
                "Authorization denied: {error}"
            )));
        }
        let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
            tracing::error!("Callback for {} has no authorization code", provider.id());
            return Err(OAuth2Error::TokenExchange(
                "Missing authorization code".to_string(),
            ));
        };

        let endpoints = provider.endpoints(&self.client).await?;
        let config = provider.config();
        let redirect_uri = callback_url(callback_base_url, provider.id());

        let token = provider
            .token_exchange()
            .exchange(
                &self.client,
                TokenRequest {
                    token_endpoint: &endpoints.token,
                    code,
                    redirect_uri: &redirect_uri,
                    client_id: &config.client_id,
                    client_secret: &config.client_secret,
                },
            )
            .await?;

        let user = fetch_user_profile(
            &self.client,
            &endpoints.userinfo,
            &token,
            config.userinfo_fields.as_deref(),
        )
        .await
        .ok_or_else(|| {
            OAuth2Error::ProfileFetch(format!("Failed to fetch profile from {}", provider.id()))
        })?;

        let user_json =
            serde_json::to_string(&user).map_err(|e| SessionError::Serde(e.to_string()))?;
        // A session id known before authentication must not carry the login
        session.regenerate().await?;
        session.insert(SessionKey::User, user_json).await?;

        let redirect_path = session
            .take(SessionKey::RedirectPath)
            .await?
            .unwrap_or_else(|| DEFAULT_SUCCESS_PATH.to_string());

        tracing::info!("User {} logged in with {}", user.id, provider.id());

        Ok(LoginOutcome {
            user,
            redirect_path,
        })
    }
}

/// Remove everything the login flow stored in `session`.
///
/// Store failures are logged and otherwise ignored.
pub async fn logout(session: &dyn LoginSession) {
    match session.clear().await {
        Ok(()) => tracing::info!("User logged out"),
        Err(e) => tracing::error!("Failed to clear session on logout: {}", e),
    }
}

/// The logged-in user of `session`, if any.
pub async fn current_user(session: &dyn LoginSession) -> Option<UserProfile> {
    let user_json = match session.get(SessionKey::User).await {
        Ok(user_json) => user_json?,
        Err(e) => {
            tracing::error!("Failed to read user from session: {}", e);
            return None;
        }
    };

    match serde_json::from_str(&user_json) {
        Ok(user) => Some(user),
        Err(e) => {
            tracing::error!("Corrupt user payload in session: {}", e);
            None
        }
    }
}
