use serde::Deserialize;
use serde_json::Value;

use crate::oauth2::types::{AccessToken, UserProfile};

/// User-info payload as returned by any supported provider.
///
/// Google's v1 endpoint and Facebook's Graph API identify the user by `id`,
/// OIDC userinfo endpoints (LinkedIn) by `sub`.
#[derive(Debug, Deserialize)]
pub(super) struct RawUserInfo {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default)]
    picture: Option<RawPicture>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPicture {
    Url(String),
    /// Facebook: `{"data": {"url": "...", "height": 50, ...}}`
    Nested { data: PictureData },
    Other(Value),
}

#[derive(Debug, Deserialize)]
struct PictureData {
    #[serde(default)]
    url: Option<String>,
}

impl RawUserInfo {
    pub(super) fn into_profile(self) -> Option<UserProfile> {
        let id = match self.id {
            Some(Value::String(id)) => Some(id),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        }
        .or(self.sub)
        .filter(|id| !id.is_empty())?;

        let name = self.name.filter(|n| !n.is_empty()).or_else(|| {
            let full = [self.given_name, self.family_name]
                .into_iter()
                .flatten()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            (!full.is_empty()).then_some(full)
        });

        let picture = match self.picture {
            Some(RawPicture::Url(url)) => Some(url),
            Some(RawPicture::Nested { data }) => data.url,
            Some(RawPicture::Other(_)) | None => None,
        }
        .filter(|url| !url.is_empty());

        Some(UserProfile {
            id,
            email: self.email.filter(|e| !e.is_empty()),
            name,
            picture,
        })
    }
}

/// Fetch and normalize the user's profile.
///
/// Every failure (transport, non-2xx, malformed body, missing id) is logged and
/// reported as `None`.
pub(super) async fn fetch_user_profile(
    client: &reqwest::Client,
    userinfo_endpoint: &str,
    token: &AccessToken,
    fields: Option<&str>,
) -> Option<UserProfile> {
    let mut request = client
        .get(userinfo_endpoint)
        .bearer_auth(&token.access_token);
    if let Some(fields) = fields {
        request = request.query(&[("fields", fields)]);
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("User info request failed: {}", e);
            return None;
        }
    };

    let status = response.status();
    let response_body = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to read user info response: {}", e);
            return None;
        }
    };

    if !status.is_success() {
        tracing::error!(
            "User info endpoint returned {}: {}",
            status,
            response_body
        );
        return None;
    }

    let raw: RawUserInfo = match serde_json::from_str(&response_body) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!("Failed to deserialize user info: {}", e);
            return None;
        }
    };

    tracing::debug!("User info: {:#?}", raw);

    let profile = raw.into_profile();
    if profile.is_none() {
        tracing::error!("User info response has no user id");
    }
    profile
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockProvider;
    use serde_json::json;

    fn normalize(value: Value) -> Option<UserProfile> {
        serde_json::from_value::<RawUserInfo>(value)
            .ok()
            .and_then(RawUserInfo::into_profile)
    }

    fn token() -> AccessToken {
        serde_json::from_value(json!({"access_token": "T"})).unwrap()
    }

    /// Google's v1 userinfo response
    #[test]
    fn test_normalize_google() {
        let profile = normalize(json!({
            "id": "123456789",
            "email": "test@example.com",
            "verified_email": true,
            "name": "Test User",
            "given_name": "Test",
            "family_name": "User",
            "picture": "https://example.com/pic.jpg",
            "locale": "en"
        }))
        .unwrap();

        assert_eq!(
            profile,
            UserProfile {
                id: "123456789".to_string(),
                email: Some("test@example.com".to_string()),
                name: Some("Test User".to_string()),
                picture: Some("https://example.com/pic.jpg".to_string()),
            }
        );
    }

    /// Facebook nests the picture URL under `picture.data.url`
    #[test]
    fn test_normalize_facebook_nested_picture() {
        let profile = normalize(json!({
            "id": "10158",
            "name": "Face Book",
            "email": "fb@example.com",
            "picture": {
                "data": {
                    "height": 50,
                    "is_silhouette": false,
                    "url": "https://platform-lookaside.fbsbx.com/pic",
                    "width": 50
                }
            }
        }))
        .unwrap();

        assert_eq!(profile.id, "10158");
        assert_eq!(
            profile.picture.as_deref(),
            Some("https://platform-lookaside.fbsbx.com/pic")
        );
    }

    /// OIDC userinfo (LinkedIn) identifies the user by `sub`
    #[test]
    fn test_normalize_oidc_sub() {
        let profile = normalize(json!({
            "sub": "782bbtaQ",
            "given_name": "Link",
            "family_name": "Edin",
            "picture": "https://media.licdn.com/pic",
            "email": "li@example.com",
            "email_verified": true,
            "locale": {"country": "US", "language": "en"}
        }))
        .unwrap();

        assert_eq!(profile.id, "782bbtaQ");
        assert_eq!(profile.name.as_deref(), Some("Link Edin"));
        assert_eq!(profile.email.as_deref(), Some("li@example.com"));
    }

    #[test]
    fn test_normalize_id_wins_over_sub() {
        let profile = normalize(json!({"id": "from-id", "sub": "from-sub"})).unwrap();
        assert_eq!(profile.id, "from-id");
    }

    #[test]
    fn test_normalize_numeric_id() {
        let profile = normalize(json!({"id": 42})).unwrap();
        assert_eq!(profile.id, "42");
    }

    #[test]
    fn test_normalize_missing_id() {
        assert!(normalize(json!({"email": "test@example.com"})).is_none());
        assert!(normalize(json!({"id": ""})).is_none());
        assert!(normalize(json!({"id": null, "sub": ""})).is_none());
    }

    #[test]
    fn test_normalize_unexpected_picture_shape() {
        let profile = normalize(json!({"id": "1", "picture": 17})).unwrap();
        assert!(profile.picture.is_none());
    }

    #[test]
    fn test_normalize_minimal_profile() {
        let profile = normalize(json!({"id": "12345"})).unwrap();
        assert_eq!(profile.email, None);
        assert_eq!(profile.name, None);
        assert_eq!(profile.picture, None);
    }

    #[tokio::test]
    async fn test_fetch_user_profile_sends_bearer_and_fields() {
        let mock = MockProvider::start().await;
        mock.set_userinfo_response(200, json!({"id": "12345"}).to_string());

        let profile = fetch_user_profile(
            &reqwest::Client::new(),
            &mock.userinfo_url(),
            &token(),
            Some("id,name,email,picture"),
        )
        .await
        .unwrap();

        assert_eq!(profile.id, "12345");
        assert_eq!(mock.last_userinfo_authorization().as_deref(), Some("Bearer T"));
        assert_eq!(
            mock.last_userinfo_query().and_then(|q| q.get("fields").cloned()),
            Some("id,name,email,picture".to_string())
        );
    }

    #[tokio::test]
    async fn test_fetch_user_profile_without_fields() {
        let mock = MockProvider::start().await;
        mock.set_userinfo_response(200, json!({"sub": "abc"}).to_string());

        let profile = fetch_user_profile(&reqwest::Client::new(), &mock.userinfo_url(), &token(), None)
            .await
            .unwrap();

        assert_eq!(profile.id, "abc");
        assert!(
            mock.last_userinfo_query()
                .is_some_and(|q| !q.contains_key("fields"))
        );
    }

    #[tokio::test]
    async fn test_fetch_user_profile_failures_are_none() {
        let mock = MockProvider::start().await;
        let client = reqwest::Client::new();

        mock.set_userinfo_response(401, r#"{"error":"invalid_token"}"#.to_string());
        assert!(
            fetch_user_profile(&client, &mock.userinfo_url(), &token(), None)
                .await
                .is_none()
        );

        mock.set_userinfo_response(200, "not json".to_string());
        assert!(
            fetch_user_profile(&client, &mock.userinfo_url(), &token(), None)
                .await
                .is_none()
        );

        mock.set_userinfo_response(200, json!({"email": "a@b.c"}).to_string());
        assert!(
            fetch_user_profile(&client, &mock.userinfo_url(), &token(), None)
                .await
                .is_none()
        );

        assert!(
            fetch_user_profile(&client, "http://127.0.0.1:9/userinfo", &token(), None)
                .await
                .is_none()
        );
    }
}
