use std::env;
use std::fmt;

use super::types::ProviderId;

const GOOGLE_DISCOVERY_URL: &str = "https://accounts.google.com/.well-known/openid-configuration";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v1/userinfo";

const FACEBOOK_AUTH_URL: &str = "https://www.facebook.com/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/oauth/access_token";
const FACEBOOK_USERINFO_URL: &str = "https://graph.facebook.com/v12.0/me";
const FACEBOOK_USERINFO_FIELDS: &str = "id,name,email,picture";

const LINKEDIN_AUTH_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";
const LINKEDIN_TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
const LINKEDIN_USERINFO_URL: &str = "https://api.linkedin.com/v2/userinfo";

/// Static description of one provider: credentials, endpoints and scope.
///
/// An endpoint left as `None` is looked up in the discovery document, so every
/// `None` endpoint requires `discovery_url` to be set.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_endpoint: Option<String>,
    pub token_endpoint: Option<String>,
    pub userinfo_endpoint: Option<String>,
    pub scope: String,
    pub discovery_url: Option<String>,
    /// Value of the `fields` query parameter sent with the user-info request
    pub userinfo_fields: Option<String>,
}

impl ProviderConfig {
    pub fn google(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorization_endpoint: None,
            token_endpoint: None,
            userinfo_endpoint: Some(GOOGLE_USERINFO_URL.to_string()),
            scope: "openid email profile".to_string(),
            discovery_url: Some(GOOGLE_DISCOVERY_URL.to_string()),
            userinfo_fields: None,
        }
    }

    pub fn facebook(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorization_endpoint: Some(FACEBOOK_AUTH_URL.to_string()),
            token_endpoint: Some(FACEBOOK_TOKEN_URL.to_string()),
            userinfo_endpoint: Some(FACEBOOK_USERINFO_URL.to_string()),
            scope: "email public_profile".to_string(),
            discovery_url: None,
            userinfo_fields: Some(FACEBOOK_USERINFO_FIELDS.to_string()),
        }
    }

    pub fn linkedin(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorization_endpoint: Some(LINKEDIN_AUTH_URL.to_string()),
            token_endpoint: Some(LINKEDIN_TOKEN_URL.to_string()),
            userinfo_endpoint: Some(LINKEDIN_USERINFO_URL.to_string()),
            scope: "openid profile email".to_string(),
            discovery_url: None,
            userinfo_fields: None,
        }
    }

    /// Default configuration of `id` with the given credentials.
    pub fn defaults_for(
        id: ProviderId,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        match id {
            ProviderId::Google => Self::google(client_id, client_secret),
            ProviderId::Facebook => Self::facebook(client_id, client_secret),
            ProviderId::LinkedIn => Self::linkedin(client_id, client_secret),
        }
    }

    /// Reads `OAUTH2_<PROVIDER>_*` variables. Returns `None` when the provider has
    /// no credentials configured.
    pub fn from_env(id: ProviderId) -> Option<Self> {
        Self::from_lookup(id, |key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        id: ProviderId,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<Self> {
        let prefix = id.env_prefix();
        let var = |suffix: &str| {
            lookup(&format!("{prefix}_{suffix}"))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let client_id = var("CLIENT_ID")?;
        let client_secret = var("CLIENT_SECRET")?;
        let mut config = Self::defaults_for(id, client_id, client_secret);

        if let Some(url) = var("AUTH_URL") {
            tracing::debug!("Using {}_AUTH_URL from environment: {}", prefix, url);
            config.authorization_endpoint = Some(url);
        }
        if let Some(url) = var("TOKEN_URL") {
            tracing::debug!("Using {}_TOKEN_URL from environment: {}", prefix, url);
            config.token_endpoint = Some(url);
        }
        if let Some(url) = var("USERINFO_URL") {
            tracing::debug!("Using {}_USERINFO_URL from environment: {}", prefix, url);
            config.userinfo_endpoint = Some(url);
        }
        if let Some(url) = var("DISCOVERY_URL") {
            tracing::debug!("Using {}_DISCOVERY_URL from environment: {}", prefix, url);
            config.discovery_url = Some(url);
        }
        if let Some(scope) = var("SCOPE") {
            config.scope = scope;
        }

        Some(config)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("userinfo_endpoint", &self.userinfo_endpoint)
            .field("scope", &self.scope)
            .field("discovery_url", &self.discovery_url)
            .field("userinfo_fields", &self.userinfo_fields)
            .finish()
    }
}
