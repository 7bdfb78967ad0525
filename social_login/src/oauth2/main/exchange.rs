//! Authorization-code to access-token exchange strategies

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::types::{AccessToken, ProviderId};

/// Everything a token endpoint needs to redeem an authorization code.
#[derive(Clone, Copy)]
pub struct TokenRequest<'a> {
    pub token_endpoint: &'a str,
    pub code: &'a str,
    pub redirect_uri: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Strategy for redeeming an authorization code at a provider's token endpoint.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(
        &self,
        client: &reqwest::Client,
        request: TokenRequest<'_>,
    ) -> Result<AccessToken, OAuth2Error>;
}

/// Token-exchange strategy for a provider
pub fn token_exchange_for(provider: ProviderId) -> Arc<dyn TokenExchange> {
    match provider {
        ProviderId::LinkedIn => Arc::new(LinkedInTokenExchange),
        ProviderId::Google | ProviderId::Facebook => Arc::new(StandardTokenExchange),
    }
}

#[derive(Deserialize)]
struct OAuthErrorResponse {
    error: String,
    error_description: Option<String>,
}

/// RFC 6749 exchange with the client authenticating via HTTP Basic
/// (`client_secret_basic`).
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardTokenExchange;

#[async_trait]
impl TokenExchange for StandardTokenExchange {
    async fn exchange(
        &self,
        client: &reqwest::Client,
        request: TokenRequest<'_>,
    ) -> Result<AccessToken, OAuth2Error> {
        let response = client
            .post(request.token_endpoint)
            .basic_auth(request.client_id, Some(request.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", request.code),
                ("redirect_uri", request.redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(
                "Token exchange failed with status {}: {}",
                status,
                response_body
            );
            let message = match serde_json::from_str::<OAuthErrorResponse>(&response_body) {
                Ok(OAuthErrorResponse {
                    error,
                    error_description: Some(description),
                }) => format!("{error}: {description}"),
                Ok(OAuthErrorResponse { error, .. }) => error,
                Err(_) => status.to_string(),
            };
            return Err(OAuth2Error::TokenExchange(message));
        }

        parse_token_response(&response_body)
    }
}

/// LinkedIn rejects Basic client authentication and expects the credentials as
/// form fields instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedInTokenExchange;

#[async_trait]
impl TokenExchange for LinkedInTokenExchange {
    async fn exchange(
        &self,
        client: &reqwest::Client,
        request: TokenRequest<'_>,
    ) -> Result<AccessToken, OAuth2Error> {
        let response = client
            .post(request.token_endpoint)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", request.code),
                ("redirect_uri", request.redirect_uri),
                ("client_id", request.client_id),
                ("client_secret", request.client_secret),
            ])
            .send()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

        if !status.is_success() {
            tracing::error!(
                "LinkedIn token exchange failed with status {}: {}",
                status,
                response_body
            );
            return Err(OAuth2Error::TokenExchange(format!(
                "LinkedIn token endpoint returned {status}: {response_body}"
            )));
        }

        parse_token_response(&response_body)
    }
}

fn parse_token_response(body: &str) -> Result<AccessToken, OAuth2Error> {
    let token: AccessToken = serde_json::from_str(body).map_err(|e| {
        OAuth2Error::TokenExchange(format!("Failed to deserialize token response: {e}"))
    })?;
    if token.access_token.is_empty() {
        return Err(OAuth2Error::TokenExchange(
            "Empty access token in response".to_string(),
        ));
    }
    tracing::debug!("Token exchange succeeded: {:?}", token);
    Ok(token)
}
