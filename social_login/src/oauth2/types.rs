use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::OAuth2Error;

/// Identity providers this crate knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Google,
    Facebook,
    LinkedIn,
}

impl ProviderId {
    pub const ALL: [ProviderId; 3] = [Self::Google, Self::Facebook, Self::LinkedIn];

    /// Lowercase identifier used in URL paths (`/auth/{provider}`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
            Self::LinkedIn => "linkedin",
        }
    }

    /// Human readable name for login buttons
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Facebook => "Facebook",
            Self::LinkedIn => "LinkedIn",
        }
    }

    /// Prefix of the environment variables configuring this provider.
    pub(crate) fn env_prefix(&self) -> &'static str {
        match self {
            Self::Google => "OAUTH2_GOOGLE",
            Self::Facebook => "OAUTH2_FACEBOOK",
            Self::LinkedIn => "OAUTH2_LINKEDIN",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = OAuth2Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "facebook" => Ok(Self::Facebook),
            "linkedin" => Ok(Self::LinkedIn),
            _ => Err(OAuth2Error::UnsupportedProvider(s.to_string())),
        }
    }
}

/// Normalized identity of a logged-in user, whichever provider vouched for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

impl UserProfile {
    /// Best label for showing the user on a page
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Token endpoint response. Lives only long enough to fetch the profile.
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[redacted]")
            .field("id_token", &self.id_token.as_ref().map(|_| "[redacted]"))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Query parameters a provider appends to the callback URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Result of a completed login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user: UserProfile,
    /// Local path the browser should be sent to next
    pub redirect_path: String,
}
