//! Central configuration for the social_login crate

use std::sync::LazyLock;

/// Path prefix under which the login and callback routes are mounted.
///
/// The callback URL sent to providers is `{origin}{AUTH_ROUTE_PREFIX}/{provider}/callback`,
/// so this value has to match the redirect URIs registered with each provider.
pub const AUTH_ROUTE_PREFIX: &str = "/auth";

/// Destination after a successful login when no redirect path was requested.
pub const DEFAULT_SUCCESS_PATH: &str = "/success";

/// Per-call timeout for outbound requests to identity providers.
/// Default: 5 seconds
pub static OAUTH2_HTTP_TIMEOUT_SECS: LazyLock<u64> = LazyLock::new(|| {
    parse_timeout(std::env::var("OAUTH2_HTTP_TIMEOUT_SECS").ok().as_deref())
});

fn parse_timeout(value: Option<&str>) -> u64 {
    value
        .and_then(|s| s.parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(5)
}
