mod config;
mod discovery;
mod errors;
mod main;
mod registry;
mod types;

pub use config::ProviderConfig;
pub use discovery::{OidcDiscoveryDocument, OidcDiscoveryError};
pub use errors::OAuth2Error;
pub use main::{
    LinkedInTokenExchange, OAuth2Orchestrator, StandardTokenExchange, TokenExchange, TokenRequest,
    current_user, logout, token_exchange_for,
};
pub use registry::{Provider, ProviderEndpoints, ProviderRegistry};
pub use types::{AccessToken, CallbackParams, LoginOutcome, ProviderId, UserProfile};
