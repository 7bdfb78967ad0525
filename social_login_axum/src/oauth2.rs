use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
    routing::get,
};
use serde::Deserialize;

use social_login::CallbackParams;

use crate::config::{FAILURE_PATH, LOGOUT_REDIRECT_PATH};
use crate::error::IntoResponseError;
use crate::session::AuthSession;
use crate::state::AuthState;

pub(super) fn router() -> Router<AuthState> {
    Router::new()
        .route("/{provider}", get(login))
        .route("/{provider}/callback", get(callback))
}

#[derive(Debug, Deserialize)]
struct LoginParams {
    redirect_path: Option<String>,
}

/// Only same-origin absolute paths are accepted as post-login destinations.
///
/// Browsers strip tabs and newlines while parsing a `Location`, so `/\t/host`
/// would turn into the protocol-relative `//host`.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}

async fn login(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    session: AuthSession,
    Query(params): Query<LoginParams>,
) -> Result<Redirect, (StatusCode, String)> {
    let redirect_path = match params.redirect_path.as_deref() {
        Some(path) if is_local_path(path) => Some(path),
        Some(path) => {
            tracing::warn!("Dropping non-local redirect_path: {}", path);
            None
        }
        None => None,
    };

    let auth_url = state
        .orchestrator
        .initiate_login(&provider, &*session, &state.origin, redirect_path)
        .await
        .into_response_error()?;

    Ok(Redirect::temporary(auth_url.as_str()))
}

async fn callback(
    State(state): State<AuthState>,
    Path(provider): Path<String>,
    session: AuthSession,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    match state
        .orchestrator
        .handle_callback(&provider, &*session, &params, &state.origin)
        .await
    {
        Ok(outcome) => Redirect::temporary(&outcome.redirect_path),
        Err(e) => {
            tracing::error!("Login with {} failed: {}", provider, e);
            Redirect::temporary(FAILURE_PATH)
        }
    }
}

pub(super) async fn logout(session: AuthSession) -> Redirect {
    social_login::logout(&*session).await;
    Redirect::temporary(LOGOUT_REDIRECT_PATH)
}
