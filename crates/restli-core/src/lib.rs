//! # Rest.li Core
//!
//! Protocol layer of the Rest.li client: everything between a caller's
//! structured inputs and the bytes on the wire, without any I/O.
//!
//! ## Components
//!
//! - **Encoding / decoding**: the Rest.li 2.0.0 value grammar
//!   (`List(a,b)`, `(k:v)`) used in URLs, query strings and headers
//! - **URL building**: resource path templates filled with encoded keys
//! - **Dispatch**: the 14 operation kinds mapped onto HTTP verb, query and body
//! - **Query tunneling**: oversized requests rewritten as POST with
//!   `X-HTTP-Method-Override`
//! - **Response formatting**: typed results per operation kind
//!
//! Decoding is lossy by nature: every primitive comes back as a string.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoding;
pub mod dispatch;
pub mod encoding;
pub mod error;
pub mod http;
pub mod method;
pub mod response;
pub mod tunneling;
pub mod url;

pub use decoding::{decode, find_matching_close, reduced_decode, MAX_NESTING_DEPTH};
pub use dispatch::{prepare_request, RequestShape, RestliOperation, RestliRequest};
pub use encoding::{
    encode, encode_query_params_for_get_requests, encode_string, param_encode, QueryParams,
};
pub use error::{BoxError, RestliError, Result};
pub use http::{HttpResponse, PreparedRequest};
pub use method::{HttpMethod, RestliMethod};
pub use response::{
    format_response, ActionResult, BatchCreateElement, BatchCreateResult, BatchDeleteResult,
    BatchFinderResult, BatchGetResult, BatchItemStatus, BatchUpdateResult, CollectionResult,
    CreateResult, DeleteResult, FinderResult, FromRestliResponse, GetResult, Paging,
    RestliResponse, UpdateResult,
};
pub use serde_json::Value;
pub use url::{build_rest_url, ApiHosts, PathKeys};
