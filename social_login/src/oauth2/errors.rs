use crate::session::SessionError;
use crate::utils::UtilError;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum OAuth2Error {
    /// The provider segment of the request names no registered provider
    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Stored state missing, callback state missing, or the two differ
    #[error("Invalid state")]
    InvalidState,

    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    #[error("Profile fetch error: {0}")]
    ProfileFetch(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from session operations
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}
