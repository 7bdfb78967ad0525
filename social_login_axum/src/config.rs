//! Central configuration for the social_login_axum crate

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Public origin of this service, used to build provider callback URLs.
/// Default: "http://localhost:3001"
pub static ORIGIN: LazyLock<String> =
    LazyLock::new(|| parse_origin(env::var("ORIGIN").ok().as_deref()));

/// Where the browser lands when a login fails for any reason
pub const FAILURE_PATH: &str = "/failure";

/// Where the browser lands after logout
pub const LOGOUT_REDIRECT_PATH: &str = "/";

const DEFAULT_COOKIE_NAME: &str = "oauth_session";
const DEFAULT_COOKIE_MAX_AGE: u64 = 1800;
const DEV_SESSION_SECRET: &str = "dev_session_secret_change_in_production";

fn parse_origin(value: Option<&str>) -> String {
    value
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .unwrap_or("http://localhost:3001")
        .to_string()
}

/// `SameSite` attribute of the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieSameSite {
    Strict,
    Lax,
    None,
}

impl FromStr for CookieSameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lax" => Ok(Self::Lax),
            "none" => Ok(Self::None),
            other => Err(format!("Invalid SameSite value: {other}")),
        }
    }
}

impl fmt::Display for CookieSameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        })
    }
}

/// Session cookie settings, materialized once at startup.
#[derive(Clone)]
pub struct SessionCookieConfig {
    pub name: String,
    /// Cookie `Max-Age`, also used as the idle expiry of server-side sessions
    pub max_age: u64,
    pub same_site: CookieSameSite,
    pub secure: bool,
    pub secret: Vec<u8>,
}

impl SessionCookieConfig {
    /// Reads `SESSION_SECRET`, `SESSION_COOKIE_NAME`, `SESSION_COOKIE_MAX_AGE`,
    /// `SESSION_COOKIE_SAME_SITE` and `SESSION_COOKIE_SECURE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secret = match lookup("SESSION_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret.into_bytes(),
            None => {
                tracing::warn!("SESSION_SECRET is not set, using an insecure development secret");
                DEV_SESSION_SECRET.as_bytes().to_vec()
            }
        };

        let same_site = match lookup("SESSION_COOKIE_SAME_SITE") {
            Some(value) => value.parse().unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to Lax", e);
                CookieSameSite::Lax
            }),
            None => CookieSameSite::Lax,
        };

        Self {
            name: lookup("SESSION_COOKIE_NAME")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
            max_age: lookup("SESSION_COOKIE_MAX_AGE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_COOKIE_MAX_AGE),
            same_site,
            secure: lookup("SESSION_COOKIE_SECURE")
                .map(|val| val.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            secret,
        }
    }

    /// `Set-Cookie` value carrying a signed session id
    pub(crate) fn set_cookie(&self, value: &str) -> String {
        self.cookie_string(value, self.max_age)
    }

    /// `Set-Cookie` value telling the browser to drop the session cookie
    pub(crate) fn expire_cookie(&self) -> String {
        self.cookie_string("", 0)
    }

    fn cookie_string(&self, value: &str, max_age: u64) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={value}; SameSite={}{secure}; HttpOnly; Path=/; Max-Age={max_age}",
            self.name, self.same_site
        )
    }
}

impl Default for SessionCookieConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl fmt::Debug for SessionCookieConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookieConfig")
            .field("name", &self.name)
            .field("max_age", &self.max_age)
            .field("same_site", &self.same_site)
            .field("secure", &self.secure)
            .field("secret", &"[redacted]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    /// Helper function to set an environment variable for the duration of the test
    /// and restore the original value afterward.
    fn with_env_var<F, R>(key: &str, value: Option<&str>, test: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();

        match value {
            Some(val) => unsafe { env::set_var(key, val) },
            None => unsafe { env::remove_var(key) },
        }

        let result = test();

        match original {
            Some(val) => unsafe { env::set_var(key, val) },
            None => unsafe { env::remove_var(key) },
        }

        result
    }

    fn config_from(vars: &[(&str, &str)]) -> SessionCookieConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SessionCookieConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_parse_origin() {
        assert_eq!(parse_origin(None), "http://localhost:3001");
        assert_eq!(parse_origin(Some("")), "http://localhost:3001");
        assert_eq!(
            parse_origin(Some("https://example.com/")),
            "https://example.com"
        );
    }

    #[test]
    fn test_same_site_parsing() {
        assert_eq!("strict".parse::<CookieSameSite>(), Ok(CookieSameSite::Strict));
        assert_eq!("Lax".parse::<CookieSameSite>(), Ok(CookieSameSite::Lax));
        assert_eq!("NONE".parse::<CookieSameSite>(), Ok(CookieSameSite::None));
        assert!("sometimes".parse::<CookieSameSite>().is_err());
    }

    #[test]
    fn test_session_cookie_defaults() {
        let config = SessionCookieConfig::default();
        assert_eq!(config.name, "oauth_session");
        assert_eq!(config.max_age, 1800);
        assert_eq!(config.same_site, CookieSameSite::Lax);
        assert!(!config.secure);
        assert_eq!(config.secret, DEV_SESSION_SECRET.as_bytes());
    }

    #[test]
    fn test_session_cookie_overrides() {
        let config = config_from(&[
            ("SESSION_SECRET", "s3cret"),
            ("SESSION_COOKIE_NAME", "sid"),
            ("SESSION_COOKIE_MAX_AGE", "60"),
            ("SESSION_COOKIE_SAME_SITE", "Strict"),
            ("SESSION_COOKIE_SECURE", "true"),
        ]);
        assert_eq!(config.name, "sid");
        assert_eq!(config.max_age, 60);
        assert_eq!(config.same_site, CookieSameSite::Strict);
        assert!(config.secure);
        assert_eq!(config.secret, b"s3cret");
    }

    #[test]
    fn test_session_cookie_invalid_values_fall_back() {
        let config = config_from(&[
            ("SESSION_COOKIE_MAX_AGE", "forever"),
            ("SESSION_COOKIE_SAME_SITE", "sometimes"),
            ("SESSION_COOKIE_SECURE", "yes please"),
        ]);
        assert_eq!(config.max_age, 1800);
        assert_eq!(config.same_site, CookieSameSite::Lax);
        assert!(!config.secure);
    }

    #[test]
    fn test_cookie_strings() {
        let config = config_from(&[("SESSION_COOKIE_SECURE", "true")]);
        assert_eq!(
            config.set_cookie("abc.def"),
            "oauth_session=abc.def; SameSite=Lax; Secure; HttpOnly; Path=/; Max-Age=1800"
        );
        assert_eq!(
            config.expire_cookie(),
            "oauth_session=; SameSite=Lax; Secure; HttpOnly; Path=/; Max-Age=0"
        );
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = config_from(&[("SESSION_SECRET", "top-secret-value")]);
        assert!(!format!("{config:?}").contains("top-secret-value"));
    }

    #[test]
    #[serial]
    fn test_from_env_reads_cookie_name() {
        with_env_var("SESSION_COOKIE_NAME", Some("from_env"), || {
            assert_eq!(SessionCookieConfig::from_env().name, "from_env");
        });
        with_env_var("SESSION_COOKIE_NAME", None, || {
            assert_eq!(SessionCookieConfig::from_env().name, "oauth_session");
        });
    }
}
