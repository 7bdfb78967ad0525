use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use headers::HeaderMapExt;
use http::{HeaderValue, StatusCode, header::SET_COOKIE, request::Parts};

use social_login::{SessionHandle, new_session_id, sign_session_id, verify_signed_session_id};

use crate::state::AuthState;

/// The browser session of the current request.
///
/// Inserted by the session middleware of the login router. Dereferences to a
/// [`SessionHandle`], so it can be handed to the orchestrator directly.
#[derive(Clone, Debug)]
pub struct AuthSession(pub SessionHandle);

impl std::ops::Deref for AuthSession {
    type Target = SessionHandle;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionHandle>()
            .cloned()
            .map(AuthSession)
            .ok_or_else(|| {
                tracing::error!("Session middleware is not installed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable")
            })
    }
}

/// Resolve the session cookie into a [`SessionHandle`] for the handlers and keep
/// the cookie in sync with the session afterwards.
///
/// A missing or badly signed cookie starts a fresh session. The cookie is
/// (re)issued whenever the session holds data and expired once it becomes empty.
/// The id is read back after the handler ran, so a regenerated id reaches the
/// browser in the same response.
pub(crate) async fn session_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .typed_get::<headers::Cookie>()
        .and_then(|cookies| cookies.get(&state.cookie.name).map(str::to_string));

    let verified = presented
        .as_deref()
        .and_then(|value| verify_signed_session_id(&state.cookie.secret, value));
    if presented.is_some() && verified.is_none() {
        tracing::debug!("Ignoring invalid session cookie");
    }

    let session_id = match verified {
        Some(session_id) => session_id,
        None => match new_session_id() {
            Ok(session_id) => session_id,
            Err(e) => {
                tracing::error!("Failed to create session id: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                    .into_response();
            }
        },
    };

    let session = SessionHandle::new(state.sessions.clone(), session_id);
    req.extensions_mut().insert(session.clone());

    let mut response = next.run(req).await;

    let cookie = match session.is_empty().await {
        Ok(false) => match sign_session_id(&state.cookie.secret, &session.session_id().await) {
            Ok(value) => Some(state.cookie.set_cookie(&value)),
            Err(e) => {
                tracing::error!("Failed to sign session cookie: {}", e);
                None
            }
        },
        Ok(true) if presented.is_some() => Some(state.cookie.expire_cookie()),
        Ok(true) => None,
        Err(e) => {
            tracing::error!("Failed to inspect session: {}", e);
            None
        }
    };

    if let Some(cookie) = cookie {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Invalid session cookie header: {}", e),
        }
    }

    response
}
