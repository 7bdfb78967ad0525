use http::StatusCode;
use social_login::OAuth2Error;

/// Helper trait for converting errors to a standard response error format
pub(super) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

/// Client mistakes keep their message; upstream and internal failures are logged
/// and answered with a generic text.
impl<T> IntoResponseError<T> for Result<T, OAuth2Error> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| match e {
            OAuth2Error::UnsupportedProvider(_) | OAuth2Error::InvalidState => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            OAuth2Error::TokenExchange(_)
            | OAuth2Error::ProfileFetch(_)
            | OAuth2Error::Discovery(_) => {
                tracing::error!("Upstream provider failure: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Login provider unavailable".to_string(),
                )
            }
            _ => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        })
    }
}
