use std::sync::Arc;
use std::time::Duration;

use social_login::{InMemorySessionStore, OAuth2Orchestrator, ProviderRegistry, SessionStore};
use social_login_axum::{AuthState, ORIGIN, SessionCookieConfig, social_login_router};

mod server;

use crate::server::{init_tracing, spawn_http_server, spawn_session_sweeper};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing(env!("CARGO_CRATE_NAME"));

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let registry = ProviderRegistry::from_env()?;
    tracing::info!("Login providers: {:?}", registry.providers());
    let orchestrator = OAuth2Orchestrator::new(Arc::new(registry))?;

    let cookie = SessionCookieConfig::from_env();
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(cookie.max_age));
    let sweeper = spawn_session_sweeper(sessions.clone(), Duration::from_secs(60));

    tracing::info!("Callback base URL: {}", ORIGIN.as_str());
    let state = AuthState::new(orchestrator, sessions, cookie, ORIGIN.as_str());
    let app = social_login_router(state);

    let http_server = spawn_http_server(port, app);

    tokio::try_join!(http_server, sweeper)?;
    Ok(())
}
