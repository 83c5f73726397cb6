//! Typed results of Rest.li operations.
//!
//! Every result type implements [`FromRestliResponse`]; [`format_response`]
//! wraps the result together with the status, URL and headers of the raw
//! response. Any parse failure is reported as
//! [`RestliError::ResponseFormatting`] with the cause attached, never as a
//! partially filled result.
//!
//! Non-2xx statuses are not errors at this layer: batch operations report
//! per-id failures in otherwise successful responses.

use crate::decoding::reduced_decode;
use crate::error::{BoxError, RestliError, Result};
use crate::http::{Headers, HttpResponse, CREATED_ENTITY_ID};
use crate::method::RestliMethod;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Encoded entity id used as key of batch result maps.
pub type EncodedEntityId = String;

/// A formatted response.
#[derive(Debug, Clone, PartialEq)]
pub struct RestliResponse<T> {
    /// HTTP status code
    pub status_code: u16,
    /// Final URL of the response
    pub url: String,
    /// Response headers
    pub headers: Headers,
    /// Operation-specific result
    pub data: T,
}

/// Conversion from a raw response into an operation result.
pub trait FromRestliResponse: Sized {
    /// Parse the raw response.
    ///
    /// # Errors
    ///
    /// Returns the underlying cause if the response has an unexpected shape.
    fn from_response(response: &HttpResponse) -> Result<Self, BoxError>;
}

/// Format the raw response of a `method` call as the result type `T`.
///
/// # Errors
///
/// Returns [`RestliError::ResponseFormatting`] wrapping the parse failure.
pub fn format_response<T: FromRestliResponse>(
    method: RestliMethod,
    response: HttpResponse,
) -> Result<RestliResponse<T>> {
    let data = T::from_response(&response).map_err(|e| RestliError::formatting(method, e))?;

    Ok(RestliResponse {
        status_code: response.status,
        url: response.url,
        headers: response.headers,
        data,
    })
}

/// Parse a JSON body; an empty body parses as `None`.
fn optional_json<T: DeserializeOwned>(body: &str) -> Result<Option<T>, BoxError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(body)?))
}

/// Parse a JSON body that must be present.
fn required_json<T: DeserializeOwned>(body: &str) -> Result<T, BoxError> {
    Ok(serde_json::from_str(body)?)
}

/// Paging metadata of a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Paging {
    /// Zero-based index of the first returned result
    pub start: Option<u64>,
    /// Number of results returned
    pub count: Option<u64>,
    /// Total number of results available
    pub total: Option<u64>,
}

/// Result of a GET.
#[derive(Debug, Clone, PartialEq)]
pub struct GetResult {
    /// The entity; `Null` when the body is empty
    pub entity: Value,
}

impl FromRestliResponse for GetResult {
    fn from_response(response: &HttpResponse) -> Result<Self, BoxError> {
        Ok(Self {
            entity: optional_json(&response.body)?.unwrap_or(Value::Null),
        })
    }
}

/// Result of a BATCH_GET.
///
/// An absent map is `None`, distinct from an empty map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BatchGetResult {
    /// Retrieved entities by encoded id
    pub results: Option<HashMap<EncodedEntityId, Value>>,
    /// Status codes by encoded id
    pub statuses: Option<HashMap<EncodedEntityId, u16>>,
    /// Error bodies of failed ids
    pub errors: Option<HashMap<EncodedEntityId, Value>>,
}

impl FromRestliResponse for BatchGetResult {
    fn from_response(response: &HttpResponse) -> Result<Self, BoxError> {
        required_json(&response.body)
    }
}

/// Result of a GET_ALL or FINDER.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CollectionResult {
    /// Returned entities
    pub elements: Option<Vec<Value>>,
    /// Paging metadata
    pub paging: Option<Paging>,
    /// Finder-specific metadata
    pub metadata: Option<Value>,
}

impl FromRestliResponse for CollectionResult {
    fn from_response(response: &HttpResponse) -> Result<Self, BoxError> {
        required_json(&response.body)
    }
}

/// Result of one search of a BATCH_FINDER.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FinderResult {
    /// Entities found for the criteria
    pub elements: Option<Vec<Value>>,
    /// Paging metadata
    pub paging: Option<Paging>,
    /// Finder-specific metadata
    pub metadata: Option<Value>,
    /// Error details when the search failed
    pub error: Option<Value>,
    /// Whether the search failed
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

/// Result of a BATCH_FINDER.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchFinderResult {
    /// One result per criteria, in request order
    pub results: Option<Vec<FinderResult>>,
}

impl FromRestliResponse for BatchFinderResult {
    fn from_response(response: &HttpResponse) -> Result<Self, BoxError> {
        #[derive(Deserialize)]
        struct Body {
            elements: Option<Vec<FinderResult>>,
        }

        let body: Body = required_json(&response.body)?;
        Ok(Self {
            results: body.elements,
        })
    }
}

/// Result of a CREATE.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateResult {
    /// Raw `x-restli-id` header value
    pub encoded_entity_id: Option<String>,
    /// Decoded id of the created entity
    pub entity_id: Option<Value>,
    /// Created entity, for APIs that echo it back
    pub entity: Option<Value>,
}

impl FromRestliResponse for CreateResult {
    fn from_response(response: &HttpResponse) -> Result<Self, BoxError> {
        let encoded_entity_id = response.header(CREATED_ENTITY_ID).map(str::to_string);
        let entity_id = encoded_entity_id
            .as_deref()
            .map(reduced_decode)
            .transpose()?;

        Ok(Self {
            encoded_entity_id,
            entity_id,
            entity: optional_json(&response.body)?,
        })
    }
}

/// Outcome of one entity of a BATCH_CREATE.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BatchCreateElement {
    /// Status code of the individual create
    pub status: Option<u16>,
    /// Id of the created entity
    pub id: Option<Value>,
    /// Error details of a failed create
    pub error: Option<Value>,
}

/// Result of a BATCH_CREATE.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BatchCreateResult {
    /// One element per requested entity, in request order
    pub elements: Vec<BatchCreateElement>,
}

impl FromRestliResponse for BatchCreateResult {
    fn from_response(response: &HttpResponse) -> Result<Self, BoxError> {
        required_json(&response.body)
    }
}

/// Result of an UPDATE or PARTIAL_UPDATE.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateResult {
    /// Updated entity, for APIs that echo it back
    pub entity: Option<Value>,
}

impl FromRestliResponse for UpdateResult {
    fn from_response(response: &HttpResponse) -> Result<Self, BoxError> {
        // Servers answering 204 send no body at all, and some send non-JSON text
        let entity = serde_json::from_str(&response.body).ok();
        Ok(Self { entity })
    }
}

/// Status of one entity of a batch write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BatchItemStatus {
    /// Status code of the individual call
    pub status: Option<u16>,
}

/// Result of a BATCH_UPDATE or BATCH_PARTIAL_UPDATE.
///
/// Entities echoed back per id are not parsed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BatchUpdateResult {
    /// Status by encoded id
    pub results: Option<HashMap<EncodedEntityId, BatchItemStatus>>,
}

impl FromRestliResponse for BatchUpdateResult {
    fn from_response(response: &HttpResponse) -> Result<Self, BoxError> {
        required_json(&response.body)
    }
}

/// Result of a DELETE. Only the status is meaningful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteResult;

impl FromRestliResponse for DeleteResult {
    fn from_response(_response: &HttpResponse) -> Result<Self, BoxError> {
        Ok(Self)
    }
}

/// Result of a BATCH_DELETE.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BatchDeleteResult {
    /// Status by encoded id
    pub results: Option<HashMap<EncodedEntityId, BatchItemStatus>>,
}

impl FromRestliResponse for BatchDeleteResult {
    fn from_response(response: &HttpResponse) -> Result<Self, BoxError> {
        required_json(&response.body)
    }
}

/// Result of an ACTION.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionResult {
    /// The action's return value; `None` for void actions
    pub value: Option<Value>,
}

impl FromRestliResponse for ActionResult {
    fn from_response(response: &HttpResponse) -> Result<Self, BoxError> {
        let body: Option<Map<String, Value>> = optional_json(&response.body)?;
        Ok(Self {
            value: body.and_then(|mut b| b.remove("value")),
        })
    }
}
