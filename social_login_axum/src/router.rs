//! Router for the login pages and endpoints

use axum::{Router, middleware, routing::get};
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use social_login::AUTH_ROUTE_PREFIX;

use crate::session::session_middleware;
use crate::state::AuthState;

/// Create the router serving the whole login flow
///
/// Routes:
/// - `GET /` landing page
/// - `GET {AUTH_ROUTE_PREFIX}/{provider}` start a login
/// - `GET {AUTH_ROUTE_PREFIX}/{provider}/callback` provider redirect target
/// - `GET /success`, `GET /failure` result pages
/// - `GET /logout`
///
/// Every route runs inside the session middleware, which maintains the signed
/// session cookie.
pub fn social_login_router(state: AuthState) -> Router {
    social_login_router_no_trace(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as `social_login_router()` but without the HTTP tracing middleware.
pub fn social_login_router_no_trace(state: AuthState) -> Router {
    Router::new()
        .route("/", get(super::pages::index))
        .route("/success", get(super::pages::success))
        .route("/failure", get(super::pages::failure))
        .route("/logout", get(super::oauth2::logout))
        .nest(AUTH_ROUTE_PREFIX, super::oauth2::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .with_state(state)
}
