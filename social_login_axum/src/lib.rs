//! social_login_axum - axum integration for the social_login crate
//!
//! Provides a ready-made router with the login, callback, logout and result
//! pages, backed by a signed session cookie.
//!
//! ```no_run
//! use std::sync::Arc;
//! use social_login::{InMemorySessionStore, OAuth2Orchestrator, ProviderRegistry};
//! use social_login_axum::{AuthState, ORIGIN, SessionCookieConfig, social_login_router};
//!
//! # fn build() -> Result<axum::Router, social_login::OAuth2Error> {
//! let registry = Arc::new(ProviderRegistry::from_env()?);
//! let orchestrator = OAuth2Orchestrator::new(registry)?;
//! let cookie = SessionCookieConfig::from_env();
//! let sessions = Arc::new(InMemorySessionStore::new(cookie.max_age));
//! let state = AuthState::new(orchestrator, sessions, cookie, ORIGIN.as_str());
//! Ok(social_login_router(state))
//! # }
//! ```

mod config;
mod error;
mod oauth2;
mod pages;
mod router;
mod session;
mod state;

pub use config::{CookieSameSite, FAILURE_PATH, LOGOUT_REDIRECT_PATH, ORIGIN, SessionCookieConfig};
pub use router::{social_login_router, social_login_router_no_trace};
pub use session::AuthSession;
pub use state::AuthState;

// Re-export the core crate's route prefix
pub use social_login::AUTH_ROUTE_PREFIX;
