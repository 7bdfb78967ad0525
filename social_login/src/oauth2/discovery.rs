use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::errors::OAuth2Error;

/// OIDC Discovery Document as defined by OpenID Connect Discovery 1.0
/// https://openid.net/specs/openid-connect-discovery-1_0.html
///
/// Only the endpoints the login flow needs are required. Everything else a
/// provider publishes is ignored.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OidcDiscoveryDocument {
    /// The issuer identifier for the OpenID Provider
    pub issuer: String,
    /// URL of the OAuth 2.0 Authorization Endpoint
    pub authorization_endpoint: String,
    /// URL of the OAuth 2.0 Token Endpoint
    pub token_endpoint: String,
    /// URL of the UserInfo Endpoint
    pub userinfo_endpoint: Option<String>,
    /// List of the OAuth 2.0 scope values supported
    pub scopes_supported: Option<Vec<String>>,
}

/// Errors that can occur during OIDC discovery
#[derive(Error, Debug, Clone)]
pub enum OidcDiscoveryError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),
    #[error("HTTP status error: {0}")]
    HttpStatusError(reqwest::StatusCode),
    #[error("JSON parsing failed: {0}")]
    JsonError(String),
    #[error("Issuer mismatch: discovered={0}, discovery url={1}")]
    IssuerMismatch(String, String),
}

impl From<reqwest::Error> for OidcDiscoveryError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for OidcDiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<OidcDiscoveryError> for OAuth2Error {
    fn from(err: OidcDiscoveryError) -> Self {
        Self::Discovery(err.to_string())
    }
}

/// Fetch an OIDC discovery document from its full well-known URL
///
/// The discovery URL must live under the issuer it advertises, otherwise the
/// document is rejected.
pub(crate) async fn fetch_oidc_discovery(
    client: &reqwest::Client,
    discovery_url: &str,
) -> Result<OidcDiscoveryDocument, OidcDiscoveryError> {
    tracing::debug!("Fetching OIDC discovery from: {}", discovery_url);

    let response = client.get(discovery_url).send().await?;

    if !response.status().is_success() {
        tracing::error!("OIDC discovery failed with status: {}", response.status());
        return Err(OidcDiscoveryError::HttpStatusError(response.status()));
    }

    let body = response.text().await?;
    let document: OidcDiscoveryDocument = serde_json::from_str(&body)?;

    if !issuer_matches(&document.issuer, discovery_url) {
        tracing::error!(
            "Issuer mismatch in discovery document. Discovery URL: {}, Found: {}",
            discovery_url,
            document.issuer
        );
        return Err(OidcDiscoveryError::IssuerMismatch(
            document.issuer,
            discovery_url.to_string(),
        ));
    }

    tracing::debug!("Successfully fetched OIDC discovery document");
    tracing::debug!(
        "Authorization endpoint: {}",
        document.authorization_endpoint
    );
    tracing::debug!("Token endpoint: {}", document.token_endpoint);

    Ok(document)
}

fn issuer_matches(issuer: &str, discovery_url: &str) -> bool {
    let issuer = issuer.trim_end_matches('/');
    if issuer.is_empty() {
        return false;
    }
    discovery_url
        .strip_prefix(issuer)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
