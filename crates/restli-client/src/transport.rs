//! HTTP transports.
//!
//! A [`Transport`] executes one [`PreparedRequest`] and returns the raw
//! [`HttpResponse`]. Clients are generic over it, so tests and callers with
//! special needs can plug in their own implementation. Cross-cutting
//! behavior is added by wrapping, as [`ErrorForStatus`] does.

use crate::error::ClientError;
use reqwest::Client;
use restli_core::{HttpMethod, HttpResponse, PreparedRequest};
use std::fs;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

/// Executes prepared requests.
pub trait Transport: Send + Sync {
    /// Send one request and return the response, whatever its status.
    fn send(
        &self,
        request: PreparedRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Errors raised by a transport.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the response not read
    #[error("request error: {0}")]
    Request(String),

    /// The server answered with a non-2xx status
    #[error("API error (status {status}): {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The prepared request cannot be expressed by the transport
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Settings of the [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Custom CA certificate path (PEM format)
    pub ca_cert_path: Option<PathBuf>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            ca_cert_path: None,
        }
    }
}

/// Transport backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Init`] if the CA certificate cannot be read or
    /// parsed, or if the HTTP client cannot be built.
    pub fn new(config: &TransportConfig) -> Result<Self, ClientError> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls();

        if let Some(ca_path) = &config.ca_cert_path {
            let ca_cert = fs::read(ca_path).map_err(|e| {
                ClientError::Init(format!(
                    "failed to read CA certificate {}: {e}",
                    ca_path.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&ca_cert)
                .map_err(|e| ClientError::Init(format!("failed to parse CA certificate: {e}")))?;
            builder = builder.add_root_certificate(cert);
            tracing::debug!(ca_path = %ca_path.display(), "Loaded custom CA certificate");
        }

        let client = builder
            .build()
            .map_err(|e| ClientError::Init(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an already configured `reqwest` client.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<HttpResponse, TransportError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {e}", request.url)))?;

        tracing::debug!(method = %request.method, url = %request.url, "Sending request");

        let mut builder = self.client.request(reqwest_method(request.method), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        tracing::debug!(status, url = %url, "Received response");

        Ok(HttpResponse {
            status,
            url,
            headers,
            body,
        })
    }
}

/// Transport wrapper turning non-2xx responses into
/// [`TransportError::Status`].
#[derive(Debug, Clone)]
pub struct ErrorForStatus<T>(pub T);

impl<T: Transport> Transport for ErrorForStatus<T> {
    async fn send(&self, request: PreparedRequest) -> Result<HttpResponse, TransportError> {
        let response = self.0.send(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(TransportError::Status {
                status: response.status,
                body: response.body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.ca_cert_path.is_none());
    }

    #[test]
    fn transport_creation() {
        assert!(ReqwestTransport::new(&TransportConfig::default()).is_ok());
    }

    #[test]
    fn transport_creation_with_missing_ca_fails() {
        let config = TransportConfig {
            ca_cert_path: Some(PathBuf::from("/nonexistent/ca.pem")),
            ..Default::default()
        };

        let err = ReqwestTransport::new(&config).unwrap_err();
        assert!(err.to_string().contains("client init error"));
    }

    #[test]
    fn method_mapping() {
        assert_eq!(reqwest_method(HttpMethod::Get), reqwest::Method::GET);
        assert_eq!(reqwest_method(HttpMethod::Post), reqwest::Method::POST);
        assert_eq!(reqwest_method(HttpMethod::Put), reqwest::Method::PUT);
        assert_eq!(reqwest_method(HttpMethod::Delete), reqwest::Method::DELETE);
    }
}
