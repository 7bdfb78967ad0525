//! Axum-based mock identity provider for end-to-end tests
//!
//! Serves token and user-info endpoints on an ephemeral loopback port. The
//! authorization endpoint is never called by the server side of the flow, so
//! tests read the state straight from the authorization URL instead.

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MockProviderState {
    pub token_requests: Arc<Mutex<Vec<HashMap<String, String>>>>,
    pub userinfo: Arc<Mutex<Value>>,
}

pub struct MockProvider {
    pub base_url: String,
    pub state: MockProviderState,
}

impl MockProvider {
    pub async fn start(userinfo: Value) -> Self {
        let state = MockProviderState {
            userinfo: Arc::new(Mutex::new(userinfo)),
            ..Default::default()
        };

        let app = Router::new()
            .route("/token", post(token))
            .route("/userinfo", get(userinfo_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock provider");
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, state }
    }

    pub fn token_requests(&self) -> Vec<HashMap<String, String>> {
        self.state.token_requests.lock().unwrap().clone()
    }
}

async fn token(
    State(state): State<MockProviderState>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    let code = form.get("code").cloned().unwrap_or_default();
    state.token_requests.lock().unwrap().push(form);

    if code == "valid-code" {
        (
            StatusCode::OK,
            Json(json!({"access_token": "mock-access-token", "token_type": "Bearer"})),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant"})),
        )
    }
}

async fn userinfo_handler(
    State(state): State<MockProviderState>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some("Bearer mock-access-token");

    if authorized {
        (StatusCode::OK, Json(state.userinfo.lock().unwrap().clone()))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid_token"})),
        )
    }
}
