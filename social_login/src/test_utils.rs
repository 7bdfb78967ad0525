//! In-process mock identity provider for tests
//!
//! Each `MockProvider` is an axum server on an ephemeral loopback port serving
//! discovery, authorization, token and user-info endpoints. Responses are
//! configurable per test and every request is recorded for assertions.

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::oauth2::{ProviderConfig, ProviderId};

#[derive(Default)]
struct Recorded {
    discovery_hits: usize,
    token_hits: usize,
    userinfo_hits: usize,
    token_form: Option<HashMap<String, String>>,
    token_authorization: Option<String>,
    userinfo_authorization: Option<String>,
    userinfo_query: Option<HashMap<String, String>>,
}

struct MockState {
    base_url: String,
    issuer: String,
    token_response: (u16, String),
    userinfo_response: (u16, String),
    /// Applied to token and user-info responses
    response_delay: Option<Duration>,
    recorded: Recorded,
}

type SharedState = Arc<Mutex<MockState>>;

pub(crate) struct MockProvider {
    base_url: String,
    state: SharedState,
}

impl MockProvider {
    /// Bind to `127.0.0.1:0` and serve until the test runtime shuts down.
    pub(crate) async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock provider");
        let addr = listener.local_addr().expect("Mock provider has no address");
        let base_url = format!("http://{addr}");

        let state = Arc::new(Mutex::new(MockState {
            base_url: base_url.clone(),
            issuer: base_url.clone(),
            token_response: (
                200,
                json!({
                    "access_token": "mock-access-token",
                    "token_type": "Bearer",
                    "expires_in": 3600
                })
                .to_string(),
            ),
            userinfo_response: (
                200,
                json!({"id": "12345", "email": "test@example.com"}).to_string(),
            ),
            response_delay: None,
            recorded: Recorded::default(),
        }));

        let app = Router::new()
            .route("/.well-known/openid-configuration", get(discovery))
            .route("/token", post(token))
            .route("/userinfo", get(userinfo))
            .with_state(state.clone());

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Mock provider stopped: {e}");
            }
        });

        Self { base_url, state }
    }

    pub(crate) fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub(crate) fn discovery_url(&self) -> String {
        format!("{}/.well-known/openid-configuration", self.base_url)
    }

    pub(crate) fn authorization_url(&self) -> String {
        format!("{}/authorize", self.base_url)
    }

    pub(crate) fn token_url(&self) -> String {
        format!("{}/token", self.base_url)
    }

    pub(crate) fn userinfo_url(&self) -> String {
        format!("{}/userinfo", self.base_url)
    }

    /// Provider configuration with every endpoint pointing at this mock.
    pub(crate) fn config(&self, id: ProviderId) -> ProviderConfig {
        let mut config = ProviderConfig::defaults_for(id, "test-client-id", "test-client-secret");
        config.authorization_endpoint = Some(self.authorization_url());
        config.token_endpoint = Some(self.token_url());
        config.userinfo_endpoint = Some(self.userinfo_url());
        config.discovery_url = None;
        config
    }

    /// Provider configuration that must discover its authorization and token endpoints.
    pub(crate) fn discovery_config(&self, id: ProviderId) -> ProviderConfig {
        let mut config = self.config(id);
        config.authorization_endpoint = None;
        config.token_endpoint = None;
        config.discovery_url = Some(self.discovery_url());
        config
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("Mock provider state poisoned")
    }

    pub(crate) fn set_discovery_issuer(&self, issuer: &str) {
        self.lock().issuer = issuer.to_string();
    }

    pub(crate) fn set_token_response(&self, status: u16, body: String) {
        self.lock().token_response = (status, body);
    }

    pub(crate) fn set_userinfo_response(&self, status: u16, body: String) {
        self.lock().userinfo_response = (status, body);
    }

    pub(crate) fn set_response_delay(&self, delay: Duration) {
        self.lock().response_delay = Some(delay);
    }

    pub(crate) fn discovery_hits(&self) -> usize {
        self.lock().recorded.discovery_hits
    }

    pub(crate) fn token_hits(&self) -> usize {
        self.lock().recorded.token_hits
    }

    pub(crate) fn userinfo_hits(&self) -> usize {
        self.lock().recorded.userinfo_hits
    }

    pub(crate) fn last_token_form(&self) -> Option<HashMap<String, String>> {
        self.lock().recorded.token_form.clone()
    }

    pub(crate) fn last_token_authorization(&self) -> Option<String> {
        self.lock().recorded.token_authorization.clone()
    }

    pub(crate) fn last_userinfo_authorization(&self) -> Option<String> {
        self.lock().recorded.userinfo_authorization.clone()
    }

    pub(crate) fn last_userinfo_query(&self) -> Option<HashMap<String, String>> {
        self.lock().recorded.userinfo_query.clone()
    }
}

fn authorization_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

fn json_response((status, body): (u16, String)) -> impl IntoResponse {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

async fn discovery(State(state): State<SharedState>) -> Json<Value> {
    let mut state = state.lock().expect("Mock provider state poisoned");
    state.recorded.discovery_hits += 1;
    let base = state.base_url.clone();
    Json(json!({
        "issuer": state.issuer,
        "authorization_endpoint": format!("{base}/authorize"),
        "token_endpoint": format!("{base}/token"),
        "userinfo_endpoint": format!("{base}/userinfo"),
        "jwks_uri": format!("{base}/jwks"),
        "scopes_supported": ["openid", "email", "profile"]
    }))
}

async fn token(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let (response, delay) = {
        let mut state = state.lock().expect("Mock provider state poisoned");
        state.recorded.token_hits += 1;
        state.recorded.token_form = Some(form);
        state.recorded.token_authorization = authorization_header(&headers);
        (state.token_response.clone(), state.response_delay)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    json_response(response)
}

async fn userinfo(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let (response, delay) = {
        let mut state = state.lock().expect("Mock provider state poisoned");
        state.recorded.userinfo_hits += 1;
        state.recorded.userinfo_query = Some(query);
        state.recorded.userinfo_authorization = authorization_header(&headers);
        (state.userinfo_response.clone(), state.response_delay)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    json_response(response)
}
