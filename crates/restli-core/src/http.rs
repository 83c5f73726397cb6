//! Transport-facing request and response values.
//!
//! The core never performs I/O. It produces [`PreparedRequest`] values and
//! consumes [`HttpResponse`] values; executing the exchange is the job of a
//! transport.

use crate::method::{HttpMethod, RestliMethod};
use crate::url::normalize_version;

/// `Connection` header.
pub const CONNECTION: &str = "Connection";
/// `Content-Type` header.
pub const CONTENT_TYPE: &str = "Content-Type";
/// `Authorization` header.
pub const AUTHORIZATION: &str = "Authorization";
/// `User-Agent` header.
pub const USER_AGENT: &str = "User-Agent";
/// Rest.li protocol version header.
pub const RESTLI_PROTOCOL_VERSION: &str = "X-RestLi-Protocol-Version";
/// Rest.li operation kind header.
pub const RESTLI_METHOD: &str = "X-RestLi-Method";
/// API version header.
pub const LINKEDIN_VERSION: &str = "LinkedIn-Version";
/// Verb override header used by query tunneling.
pub const HTTP_METHOD_OVERRIDE: &str = "X-HTTP-Method-Override";
/// Response header carrying the id of a created entity.
pub const CREATED_ENTITY_ID: &str = "x-restli-id";

/// Protocol version sent with every request.
pub const PROTOCOL_VERSION: &str = "2.0.0";

/// `application/json`
pub const CONTENT_TYPE_JSON: &str = "application/json";
/// `application/x-www-form-urlencoded`
pub const CONTENT_TYPE_URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// Ordered list of header name/value pairs.
pub type Headers = Vec<(String, String)>;

/// A transport-ready HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Absolute URL including any query string
    pub url: String,
    /// Request headers, in insertion order
    pub headers: Headers,
    /// Request body
    pub body: Option<String>,
}

impl PreparedRequest {
    /// Case-insensitive lookup of the first header named `name`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A raw HTTP response as returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Final URL of the response
    pub url: String,
    /// Response headers
    pub headers: Headers,
    /// Response body
    pub body: String,
}

impl HttpResponse {
    /// Case-insensitive lookup of the first header named `name`.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Value of the `User-Agent` header.
#[must_use]
pub fn user_agent() -> String {
    format!("restli-client-rs/{}", env!("CARGO_PKG_VERSION"))
}

/// Headers common to every Rest.li request.
///
/// `content_type` is only sent for requests with a body;
/// `method_override` is only set on tunneled requests.
#[must_use]
pub fn restli_request_headers(
    restli_method: RestliMethod,
    access_token: &str,
    version: Option<&str>,
    content_type: Option<&str>,
    method_override: Option<HttpMethod>,
) -> Headers {
    let mut headers = vec![
        (CONNECTION.to_string(), "Keep-Alive".to_string()),
        (
            RESTLI_PROTOCOL_VERSION.to_string(),
            PROTOCOL_VERSION.to_string(),
        ),
        (RESTLI_METHOD.to_string(), restli_method.as_str().to_string()),
        (AUTHORIZATION.to_string(), format!("Bearer {access_token}")),
        (USER_AGENT.to_string(), user_agent()),
    ];

    if let Some(content_type) = content_type {
        headers.push((CONTENT_TYPE.to_string(), content_type.to_string()));
    }
    if let Some(version) = normalize_version(version) {
        headers.push((LINKEDIN_VERSION.to_string(), version.to_string()));
    }
    if let Some(method) = method_override {
        headers.push((HTTP_METHOD_OVERRIDE.to_string(), method.as_str().to_string()));
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_headers() {
        let headers = restli_request_headers(RestliMethod::Finder, "ABC123", None, None, None);
        let request = PreparedRequest {
            method: HttpMethod::Get,
            url: String::new(),
            headers,
            body: None,
        };

        assert_eq!(request.header("connection"), Some("Keep-Alive"));
        assert_eq!(request.header("x-restli-protocol-version"), Some("2.0.0"));
        assert_eq!(request.header("X-RestLi-Method"), Some("FINDER"));
        assert_eq!(request.header("Authorization"), Some("Bearer ABC123"));
        assert!(request.header(USER_AGENT).unwrap().starts_with("restli-client-rs/"));
        assert!(request.header(CONTENT_TYPE).is_none());
        assert!(request.header(LINKEDIN_VERSION).is_none());
        assert!(request.header(HTTP_METHOD_OVERRIDE).is_none());
    }

    #[test]
    fn optional_headers() {
        let headers = restli_request_headers(
            RestliMethod::Create,
            "t",
            Some("202401"),
            Some(CONTENT_TYPE_JSON),
            Some(HttpMethod::Post),
        );

        assert!(headers.contains(&(LINKEDIN_VERSION.into(), "202401".into())));
        assert!(headers.contains(&(CONTENT_TYPE.into(), CONTENT_TYPE_JSON.into())));
        assert!(headers.contains(&(HTTP_METHOD_OVERRIDE.into(), "POST".into())));
    }

    #[test]
    fn empty_version_is_not_sent() {
        let headers = restli_request_headers(RestliMethod::Get, "t", Some(""), None, None);
        assert!(!headers.iter().any(|(k, _)| k == LINKEDIN_VERSION));
    }

    #[test]
    fn response_helpers() {
        let response = HttpResponse {
            status: 201,
            url: "https://api.linkedin.com/v2/x".into(),
            headers: vec![("X-RestLi-Id".into(), "123".into())],
            body: String::new(),
        };
        assert!(response.is_success());
        assert_eq!(response.header(CREATED_ENTITY_ID), Some("123"));
    }
}
