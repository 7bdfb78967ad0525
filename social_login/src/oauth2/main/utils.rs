use std::time::Duration;
use subtle::ConstantTimeEq;

use crate::config::{AUTH_ROUTE_PREFIX, OAUTH2_HTTP_TIMEOUT_SECS};
use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::ProviderId;

/// Shared client for every outbound provider call.
pub(super) fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, OAuth2Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| OAuth2Error::Config(format!("Failed to create HTTP client: {e}")))
}

pub(super) fn default_http_client() -> Result<reqwest::Client, OAuth2Error> {
    build_http_client(*OAUTH2_HTTP_TIMEOUT_SECS)
}

/// `{base}/auth/{provider}/callback`, tolerating a trailing slash on `base`.
pub(super) fn callback_url(callback_base_url: &str, provider: ProviderId) -> String {
    format!(
        "{}{}/{}/callback",
        callback_base_url.trim_end_matches('/'),
        AUTH_ROUTE_PREFIX,
        provider
    )
}

pub(super) fn states_match(stored: &str, received: &str) -> bool {
    stored.as_bytes().ct_eq(received.as_bytes()).into()
}
