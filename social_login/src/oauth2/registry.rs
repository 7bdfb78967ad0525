use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::config::ProviderConfig;
use super::discovery::{OidcDiscoveryDocument, fetch_oidc_discovery};
use super::errors::OAuth2Error;
use super::main::{TokenExchange, token_exchange_for};
use super::types::ProviderId;

/// Fully resolved endpoint URLs of a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub authorization: String,
    pub token: String,
    pub userinfo: String,
}

/// A registered provider: its configuration, cached discovery document and
/// token-exchange strategy.
pub struct Provider {
    id: ProviderId,
    config: ProviderConfig,
    discovery: OnceCell<OidcDiscoveryDocument>,
    exchange: Arc<dyn TokenExchange>,
}

impl Provider {
    pub fn new(id: ProviderId, config: ProviderConfig) -> Self {
        Self {
            id,
            config,
            discovery: OnceCell::new(),
            exchange: token_exchange_for(id),
        }
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub(crate) fn token_exchange(&self) -> &dyn TokenExchange {
        self.exchange.as_ref()
    }

    /// Resolve endpoints, preferring static configuration over discovery.
    ///
    /// The discovery document is fetched only if some endpoint is not configured,
    /// and at most once per provider. A failed fetch is retried on the next call.
    pub async fn endpoints(
        &self,
        client: &reqwest::Client,
    ) -> Result<ProviderEndpoints, OAuth2Error> {
        let config = &self.config;
        if let (Some(authorization), Some(token), Some(userinfo)) = (
            &config.authorization_endpoint,
            &config.token_endpoint,
            &config.userinfo_endpoint,
        ) {
            return Ok(ProviderEndpoints {
                authorization: authorization.clone(),
                token: token.clone(),
                userinfo: userinfo.clone(),
            });
        }

        let document = self.discovery_document(client).await?;

        let userinfo = config
            .userinfo_endpoint
            .clone()
            .or_else(|| document.userinfo_endpoint.clone())
            .ok_or_else(|| {
                OAuth2Error::Config(format!(
                    "No userinfo endpoint configured or discovered for {}",
                    self.id
                ))
            })?;

        Ok(ProviderEndpoints {
            authorization: config
                .authorization_endpoint
                .clone()
                .unwrap_or_else(|| document.authorization_endpoint.clone()),
            token: config
                .token_endpoint
                .clone()
                .unwrap_or_else(|| document.token_endpoint.clone()),
            userinfo,
        })
    }

    async fn discovery_document(
        &self,
        client: &reqwest::Client,
    ) -> Result<&OidcDiscoveryDocument, OAuth2Error> {
        let Some(discovery_url) = self.config.discovery_url.as_deref() else {
            return Err(OAuth2Error::Config(format!(
                "Missing endpoint for {} and no discovery URL configured",
                self.id
            )));
        };

        self.discovery
            .get_or_try_init(|| async {
                tracing::debug!("Fetching OIDC discovery for provider: {}", self.id);
                fetch_oidc_discovery(client, discovery_url)
                    .await
                    .map_err(OAuth2Error::from)
            })
            .await
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("discovered", &self.discovery.initialized())
            .finish()
    }
}

/// Immutable map of the providers available to this process.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderId, Provider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, id: ProviderId, config: ProviderConfig) -> Self {
        tracing::debug!("Registering provider: {}", id);
        self.providers.insert(id, Provider::new(id, config));
        self
    }

    /// Replace the token-exchange strategy of an already registered provider.
    pub fn with_token_exchange(mut self, id: ProviderId, exchange: Arc<dyn TokenExchange>) -> Self {
        if let Some(provider) = self.providers.get_mut(&id) {
            provider.exchange = exchange;
        }
        self
    }

    /// Registers every provider that has credentials in the environment.
    pub fn from_env() -> Result<Self, OAuth2Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, OAuth2Error> {
        let mut registry = Self::new();
        for id in ProviderId::ALL {
            match ProviderConfig::from_lookup(id, &lookup) {
                Some(config) => {
                    tracing::info!("Provider {} configured", id);
                    registry = registry.with_provider(id, config);
                }
                None => {
                    tracing::warn!(
                        "Provider {} skipped: {}_CLIENT_ID and {}_CLIENT_SECRET must be set",
                        id,
                        id.env_prefix(),
                        id.env_prefix()
                    );
                }
            }
        }

        if registry.is_empty() {
            return Err(OAuth2Error::Config(
                "No OAuth2 provider configured".to_string(),
            ));
        }
        Ok(registry)
    }

    /// Look up a provider by its URL path segment.
    pub fn get(&self, provider: &str) -> Result<&Provider, OAuth2Error> {
        let id: ProviderId = provider.parse()?;
        self.providers
            .get(&id)
            .ok_or_else(|| OAuth2Error::UnsupportedProvider(provider.to_string()))
    }

    /// Registered provider ids in a stable order
    pub fn providers(&self) -> Vec<ProviderId> {
        ProviderId::ALL
            .into_iter()
            .filter(|id| self.providers.contains_key(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
