//! Error taxonomy shared by every stage of the request pipeline.

use crate::method::RestliMethod;

/// Boxed cause carried by [`RestliError::ResponseFormatting`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building requests or interpreting responses.
///
/// Argument errors are always raised before a request reaches the transport.
/// Non-2xx HTTP statuses are never mapped to an error here; batch operations
/// report per-id failures inside successful responses.
#[derive(Debug, thiserror::Error)]
pub enum RestliError {
    /// A caller-supplied argument is inconsistent or malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A required argument was not configured
    #[error("missing argument: {0}")]
    MissingArgument(String),

    /// A Rest.li-serialized string could not be parsed
    #[error("invalid serialized Rest.li value: {0}")]
    InvalidSerializedValue(String),

    /// The response of an operation did not have the expected shape
    #[error("failed to format {method} response: {source}")]
    ResponseFormatting {
        /// Operation whose response was being formatted
        method: RestliMethod,
        /// Underlying parse failure
        #[source]
        source: BoxError,
    },

    /// An internal invariant could not be satisfied
    #[error("internal error: {0}")]
    Internal(String),
}

impl RestliError {
    /// Wrap a formatting failure for `method`, keeping the cause.
    pub fn formatting(method: RestliMethod, source: impl Into<BoxError>) -> Self {
        Self::ResponseFormatting {
            method,
            source: source.into(),
        }
    }
}

/// Result alias used throughout the core crate.
pub type Result<T, E = RestliError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn formatting_error_keeps_source() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = RestliError::formatting(RestliMethod::BatchGet, cause);

        assert!(err.to_string().starts_with("failed to format BATCH_GET response"));
        assert!(err.source().is_some());
    }
}
