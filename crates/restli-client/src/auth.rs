//! OAuth 2.0 helpers.
//!
//! Covers the member authorization code flow (3-legged), refresh token
//! exchange, the client credential flow (2-legged) and token introspection.
//! Token endpoints are plain form POSTs; they do not use the Rest.li
//! protocol headers.

use crate::config::RestliClientConfig;
use crate::error::ClientError;
use crate::transport::{ReqwestTransport, Transport};
use chrono::{DateTime, TimeZone, Utc};
use restli_core::http::{CONTENT_TYPE, CONTENT_TYPE_URL_ENCODED, USER_AGENT};
use restli_core::{encode_string, HttpMethod, PreparedRequest, RestliError, RestliResponse};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::form_urlencoded;

/// Response of the authorization code exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccessToken3L {
    /// The 3-legged access token
    pub access_token: Option<String>,
    /// Access token TTL in seconds
    pub expires_in: Option<u64>,
    /// Refresh token, when refresh tokens are enabled for the application
    pub refresh_token: Option<String>,
    /// Refresh token TTL in seconds
    pub refresh_token_expires_in: Option<u64>,
    /// Comma-separated scopes authorized by the member
    pub scope: Option<String>,
}

impl AccessToken3L {
    /// Expiry of the access token for a token issued at `issued_at`.
    #[must_use]
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        add_ttl(issued_at, self.expires_in?)
    }

    /// Scopes as a list.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        split_scopes(self.scope.as_deref())
    }
}

/// Response of the refresh token exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenExchange {
    /// The new 3-legged access token
    pub access_token: Option<String>,
    /// Access token TTL in seconds
    pub expires_in: Option<u64>,
    /// The refresh token
    pub refresh_token: Option<String>,
    /// Refresh token TTL in seconds
    pub refresh_token_expires_in: Option<u64>,
}

impl RefreshTokenExchange {
    /// Expiry of the access token for a token issued at `issued_at`.
    #[must_use]
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        add_ttl(issued_at, self.expires_in?)
    }
}

/// Response of the client credential flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AccessToken2L {
    /// The 2-legged access token
    pub access_token: Option<String>,
    /// Access token TTL in seconds
    pub expires_in: Option<u64>,
}

impl AccessToken2L {
    /// Expiry of the access token for a token issued at `issued_at`.
    #[must_use]
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        add_ttl(issued_at, self.expires_in?)
    }
}

/// Response of token introspection. Timestamps are epoch seconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenIntrospection {
    /// Whether the token is valid and active
    pub active: Option<bool>,
    /// `2L`, `3L` or `Enterprise_User`
    pub auth_type: Option<String>,
    /// When the token was authorized
    pub authorized_at: Option<i64>,
    /// Client id of the developer application
    pub client_id: Option<String>,
    /// When the token was originally issued
    pub created_at: Option<i64>,
    /// When the token expires
    pub expires_at: Option<i64>,
    /// Comma-separated scopes; only returned for 3-legged tokens
    pub scope: Option<String>,
    /// `revoked`, `expired` or `active`
    pub status: Option<String>,
}

impl TokenIntrospection {
    /// `authorized_at` as a timestamp.
    #[must_use]
    pub fn authorized_at_datetime(&self) -> Option<DateTime<Utc>> {
        from_epoch(self.authorized_at?)
    }

    /// `created_at` as a timestamp.
    #[must_use]
    pub fn created_at_datetime(&self) -> Option<DateTime<Utc>> {
        from_epoch(self.created_at?)
    }

    /// `expires_at` as a timestamp.
    #[must_use]
    pub fn expires_at_datetime(&self) -> Option<DateTime<Utc>> {
        from_epoch(self.expires_at?)
    }

    /// Whether the token has expired at `now`. Unknown expiry counts as expired.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at_datetime().map_or(true, |expiry| expiry <= now)
    }

    /// Scopes as a list.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        split_scopes(self.scope.as_deref())
    }
}

fn from_epoch(secs: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0).single()
}

fn add_ttl(issued_at: DateTime<Utc>, ttl_secs: u64) -> Option<DateTime<Utc>> {
    let ttl = chrono::Duration::from_std(std::time::Duration::from_secs(ttl_secs)).ok()?;
    issued_at.checked_add_signed(ttl)
}

fn split_scopes(scope: Option<&str>) -> Vec<&str> {
    scope
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Client for the OAuth endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient<T = ReqwestTransport> {
    transport: T,
    client_id: String,
    client_secret: String,
    redirect_url: Option<String>,
    oauth_base_url: String,
}

impl AuthClient<ReqwestTransport> {
    /// Create an auth client with the default configuration.
    ///
    /// `redirect_url` is only needed for the authorization code flow.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: Option<String>,
    ) -> Result<Self, ClientError> {
        let config = RestliClientConfig::default();
        let transport = ReqwestTransport::new(&config.transport_config())?;
        Ok(Self::with_transport(transport, client_id, client_secret, redirect_url)
            .with_oauth_base_url(config.oauth_base_url))
    }
}

impl<T: Transport> AuthClient<T> {
    /// Create an auth client on top of an arbitrary transport.
    pub fn with_transport(
        transport: T,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: Option<String>,
    ) -> Self {
        Self {
            transport,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url,
            oauth_base_url: crate::config::OAUTH_BASE_URL.to_string(),
        }
    }

    /// Send OAuth requests to another base URL.
    #[must_use]
    pub fn with_oauth_base_url(mut self, oauth_base_url: impl Into<String>) -> Self {
        self.oauth_base_url = oauth_base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// URL of the consent page members are sent to in the authorization
    /// code flow.
    ///
    /// # Errors
    ///
    /// Returns [`RestliError::MissingArgument`] if the client has no redirect
    /// URL, and [`RestliError::InvalidArgument`] if `scopes` is empty.
    pub fn generate_member_auth_url(
        &self,
        scopes: &[&str],
        state: Option<&str>,
    ) -> Result<String, RestliError> {
        let redirect_url = self.redirect_url.as_deref().ok_or_else(|| {
            RestliError::MissingArgument("the redirect URL is missing from the auth client".into())
        })?;
        if scopes.is_empty() {
            return Err(RestliError::InvalidArgument(
                "at least one scope must be specified".into(),
            ));
        }

        let mut params = vec![
            ("response_type", "code".to_string()),
            ("client_id", self.client_id.clone()),
            ("redirect_uri", redirect_url.to_string()),
            ("scope", scopes.join(" ")),
        ];
        if let Some(state) = state {
            params.push(("state", state.to_string()));
        }

        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={}", encode_string(v)))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!("{}/authorization?{query}", self.oauth_base_url))
    }

    /// Exchange an authorization code for a 3-legged access token.
    ///
    /// # Errors
    ///
    /// Returns error if the exchange fails or the response is not JSON.
    pub async fn exchange_auth_code_for_access_token(
        &self,
        code: &str,
    ) -> Result<RestliResponse<AccessToken3L>, ClientError> {
        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        if let Some(redirect_url) = &self.redirect_url {
            form.push(("redirect_uri", redirect_url.as_str()));
        }
        self.post_form("accessToken", &form).await
    }

    /// Exchange a refresh token for a new 3-legged access token.
    ///
    /// # Errors
    ///
    /// Returns error if the exchange fails or the response is not JSON.
    pub async fn exchange_refresh_token_for_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<RestliResponse<RefreshTokenExchange>, ClientError> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        self.post_form("accessToken", &form).await
    }

    /// Obtain a 2-legged access token with the client credential flow.
    ///
    /// # Errors
    ///
    /// Returns error if the exchange fails or the response is not JSON.
    pub async fn get_two_legged_access_token(
        &self,
    ) -> Result<RestliResponse<AccessToken2L>, ClientError> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        self.post_form("accessToken", &form).await
    }

    /// Look up status, expiry and scopes of an access token.
    ///
    /// # Errors
    ///
    /// Returns error if the exchange fails or the response is not JSON.
    pub async fn introspect_access_token(
        &self,
        access_token: &str,
    ) -> Result<RestliResponse<TokenIntrospection>, ClientError> {
        let form = [
            ("token", access_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        self.post_form("introspectToken", &form).await
    }

    async fn post_form<R: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        form: &[(&str, &str)],
    ) -> Result<RestliResponse<R>, ClientError> {
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();
        let request = PreparedRequest {
            method: HttpMethod::Post,
            url: format!("{}/{endpoint}", self.oauth_base_url),
            headers: vec![
                (CONTENT_TYPE.to_string(), CONTENT_TYPE_URL_ENCODED.to_string()),
                (USER_AGENT.to_string(), restli_core::http::user_agent()),
            ],
            body: Some(body),
        };

        tracing::debug!(endpoint, "OAuth request");
        let response = self.transport.send(request).await?;

        let data = serde_json::from_str(&response.body)
            .map_err(|source| ClientError::AuthResponse { endpoint, source })?;

        Ok(RestliResponse {
            status_code: response.status,
            url: response.url,
            headers: response.headers,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use restli_core::HttpResponse;

    struct Unreachable;

    impl Transport for Unreachable {
        async fn send(&self, _request: PreparedRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::Request("offline".into()))
        }
    }

    fn client(redirect_url: Option<&str>) -> AuthClient<Unreachable> {
        AuthClient::with_transport(Unreachable, "abc", "secret", redirect_url.map(String::from))
    }

    #[test]
    fn member_auth_url() {
        let url = client(Some("https://example.com/callback"))
            .generate_member_auth_url(&["r_liteprofile", "rw_ads"], Some("xyz"))
            .unwrap();

        assert_eq!(
            url,
            "https://www.linkedin.com/oauth/v2/authorization?response_type=code&client_id=abc\
             &redirect_uri=https%3A%2F%2Fexample.com%2Fcallback&scope=r_liteprofile%20rw_ads\
             &state=xyz"
        );
    }

    #[test]
    fn member_auth_url_without_state() {
        let url = client(Some("http://localhost"))
            .with_oauth_base_url("http://localhost:9000/oauth/v2/")
            .generate_member_auth_url(&["openid"], None)
            .unwrap();
        assert!(url.starts_with("http://localhost:9000/oauth/v2/authorization?"));
        assert!(!url.contains("state="));
    }

    #[test]
    fn member_auth_url_requires_redirect_and_scopes() {
        let err = client(None)
            .generate_member_auth_url(&["openid"], None)
            .unwrap_err();
        assert!(matches!(err, RestliError::MissingArgument(_)));

        let err = client(Some("http://localhost"))
            .generate_member_auth_url(&[], None)
            .unwrap_err();
        assert!(matches!(err, RestliError::InvalidArgument(_)));
    }

    #[test]
    fn expiry_helpers() {
        let issued = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let token = AccessToken3L {
            expires_in: Some(3600),
            scope: Some("r_ads, rw_ads".into()),
            ..Default::default()
        };
        assert_eq!(
            token.expires_at(issued),
            Some(Utc.timestamp_opt(1_700_003_600, 0).unwrap())
        );
        assert_eq!(token.scopes(), vec!["r_ads", "rw_ads"]);
        assert!(AccessToken2L::default().expires_at(issued).is_none());
    }

    #[test]
    fn introspection_timestamps() {
        let introspection: TokenIntrospection = serde_json::from_str(
            r#"{"active": true, "auth_type": "3L", "expires_at": 1700003600, "status": "active"}"#,
        )
        .unwrap();

        let expiry = introspection.expires_at_datetime().unwrap();
        assert_eq!(expiry.timestamp(), 1_700_003_600);
        assert!(!introspection.is_expired_at(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
        assert!(introspection.is_expired_at(expiry));
        assert!(introspection.created_at_datetime().is_none());
        assert!(TokenIntrospection::default().is_expired_at(expiry));
    }
}
