//! Client configuration.

use crate::error::ClientError;
use crate::transport::TransportConfig;
use restli_core::url::{NON_VERSIONED_BASE_URL, VERSIONED_BASE_URL};
use restli_core::{ApiHosts, RestliError};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Base URL of the OAuth 2.0 endpoints.
pub const OAUTH_BASE_URL: &str = "https://www.linkedin.com/oauth/v2";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct RestliClientConfig {
    /// Host for versioned APIs
    pub versioned_base_url: String,
    /// Host for non-versioned APIs
    pub non_versioned_base_url: String,
    /// Base URL of the OAuth endpoints
    pub oauth_base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Custom CA certificate path (PEM format)
    pub ca_cert_path: Option<PathBuf>,
}

impl Default for RestliClientConfig {
    fn default() -> Self {
        Self {
            versioned_base_url: VERSIONED_BASE_URL.to_string(),
            non_versioned_base_url: NON_VERSIONED_BASE_URL.to_string(),
            oauth_base_url: OAUTH_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            ca_cert_path: None,
        }
    }
}

impl RestliClientConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `RESTLI_VERSIONED_BASE_URL`: host for versioned APIs
    /// - `RESTLI_NON_VERSIONED_BASE_URL`: host for non-versioned APIs
    /// - `RESTLI_OAUTH_BASE_URL`: OAuth endpoint base
    /// - `RESTLI_TIMEOUT_SECS`: request timeout in seconds
    /// - `RESTLI_CA_CERT_PATH`: custom CA certificate (PEM)
    ///
    /// # Errors
    ///
    /// Returns error if a variable holds an unparsable value.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// See [`RestliClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut config = Self::default();

        if let Some(url) = lookup("RESTLI_VERSIONED_BASE_URL") {
            config.versioned_base_url = url;
        }

        if let Some(url) = lookup("RESTLI_NON_VERSIONED_BASE_URL") {
            config.non_versioned_base_url = url;
        }

        if let Some(url) = lookup("RESTLI_OAUTH_BASE_URL") {
            config.oauth_base_url = url;
        }

        if let Some(secs) = lookup("RESTLI_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|e| {
                ClientError::Config(format!("invalid RESTLI_TIMEOUT_SECS '{secs}': {e}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(path) = lookup("RESTLI_CA_CERT_PATH") {
            config.ca_cert_path = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that every base URL is an absolute http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns [`RestliError::InvalidArgument`] naming the offending URL.
    pub fn validate(&self) -> Result<(), ClientError> {
        for url in [
            &self.versioned_base_url,
            &self.non_versioned_base_url,
            &self.oauth_base_url,
        ] {
            validate_base_url(url)?;
        }
        Ok(())
    }

    /// Hosts used to build resource URLs.
    #[must_use]
    pub fn api_hosts(&self) -> ApiHosts {
        ApiHosts {
            versioned: self.versioned_base_url.trim_end_matches('/').to_string(),
            non_versioned: self.non_versioned_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Settings of the default transport.
    #[must_use]
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            ca_cert_path: self.ca_cert_path.clone(),
        }
    }
}

fn validate_base_url(raw: &str) -> Result<(), RestliError> {
    let url = Url::parse(raw)
        .map_err(|e| RestliError::InvalidArgument(format!("invalid base URL '{raw}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(RestliError::InvalidArgument(format!(
            "base URL '{raw}' must use http or https"
        )));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(RestliError::InvalidArgument(format!(
            "base URL '{raw}' must not carry a query or fragment"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn config_default() {
        let config = RestliClientConfig::default();
        assert_eq!(config.versioned_base_url, "https://api.linkedin.com/rest");
        assert_eq!(config.non_versioned_base_url, "https://api.linkedin.com/v2");
        assert_eq!(config.oauth_base_url, OAUTH_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.ca_cert_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_from_lookup() {
        let config = RestliClientConfig::from_lookup(lookup(&[
            ("RESTLI_VERSIONED_BASE_URL", "http://localhost:9000/rest/"),
            ("RESTLI_TIMEOUT_SECS", "5"),
            ("RESTLI_CA_CERT_PATH", "/etc/ca.pem"),
        ]))
        .unwrap();

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.ca_cert_path, Some(PathBuf::from("/etc/ca.pem")));

        let hosts = config.api_hosts();
        assert_eq!(hosts.versioned, "http://localhost:9000/rest");
        assert_eq!(hosts.non_versioned, "https://api.linkedin.com/v2");
    }

    #[test]
    fn invalid_timeout_is_config_error() {
        let err = RestliClientConfig::from_lookup(lookup(&[("RESTLI_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn invalid_urls_are_rejected() {
        for bad in ["not a url", "ftp://example.com", "https://example.com/v2?x=1"] {
            let err = RestliClientConfig::from_lookup(lookup(&[("RESTLI_OAUTH_BASE_URL", bad)]))
                .unwrap_err();
            assert!(
                matches!(err, ClientError::Restli(RestliError::InvalidArgument(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn transport_config_follows_client_config() {
        let config = RestliClientConfig {
            timeout: Duration::from_secs(3),
            ..Default::default()
        };
        assert_eq!(config.transport_config().timeout, Duration::from_secs(3));
    }
}
