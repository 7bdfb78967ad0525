//! social_login - "Login with Google / Facebook / LinkedIn" over OAuth 2.0
//!
//! This crate owns the authorization-code flow: it builds authorization URLs
//! protected by a single-use state token, redeems the returned code (including
//! LinkedIn's credentials-in-form token endpoint), normalizes each provider's
//! user-info response into a [`UserProfile`] and binds it to a session.
//!
//! It is framework-agnostic. Sessions are reached through the [`LoginSession`]
//! trait; `social_login_axum` wires everything into an axum router.

mod config;
mod oauth2;
mod session;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{AUTH_ROUTE_PREFIX, DEFAULT_SUCCESS_PATH, OAUTH2_HTTP_TIMEOUT_SECS};

pub use oauth2::{
    AccessToken, CallbackParams, LinkedInTokenExchange, LoginOutcome, OAuth2Error,
    OAuth2Orchestrator, OidcDiscoveryDocument, OidcDiscoveryError, Provider, ProviderConfig,
    ProviderEndpoints, ProviderId, ProviderRegistry, StandardTokenExchange, TokenExchange,
    TokenRequest, UserProfile, current_user, logout, token_exchange_for,
};

pub use session::{
    InMemorySessionStore, LoginSession, SessionError, SessionHandle, SessionKey, SessionStore,
    new_session_id, sign_session_id, verify_signed_session_id,
};

pub use utils::UtilError;
