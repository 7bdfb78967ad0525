mod core;
mod exchange;
mod userinfo;
mod utils;

pub use core::{OAuth2Orchestrator, current_user, logout};
pub use exchange::{
    LinkedInTokenExchange, StandardTokenExchange, TokenExchange, TokenRequest, token_exchange_for,
};
