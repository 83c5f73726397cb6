//! Client error type.

use crate::transport::TransportError;
use restli_core::RestliError;

/// Errors returned by the clients in this crate.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Client initialization failed
    #[error("client init error: {0}")]
    Init(String),

    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(String),

    /// Request building or response formatting failed
    #[error(transparent)]
    Restli(#[from] RestliError),

    /// An OAuth endpoint answered with something other than JSON
    #[error("failed to parse {endpoint} response: {source}")]
    AuthResponse {
        /// OAuth endpoint that was called
        endpoint: &'static str,
        /// Underlying parse failure
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP exchange failed
    #[error(transparent)]
    Transport(#[from] TransportError),
}
