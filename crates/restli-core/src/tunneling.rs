//! Query tunneling.
//!
//! Requests whose encoded query string is longer than
//! [`MAX_QUERY_STRING_LENGTH`] are rewritten as POST requests carrying an
//! `X-HTTP-Method-Override` header:
//!
//! - without a body, the query becomes a form-encoded body;
//! - with a body, query and JSON are packed into a `multipart/mixed` body.

use crate::error::{RestliError, Result};
use crate::http::{
    restli_request_headers, PreparedRequest, CONTENT_TYPE, CONTENT_TYPE_JSON,
    CONTENT_TYPE_URL_ENCODED,
};
use crate::method::{HttpMethod, RestliMethod};
use serde_json::Value;
use uuid::Uuid;

/// Longest query string sent in the URL.
pub const MAX_QUERY_STRING_LENGTH: usize = 4000;

/// Attempts at finding a multipart boundary absent from the payload.
pub const MAX_BOUNDARY_ATTEMPTS: usize = 10;

/// Request attributes needed to build the final request.
#[derive(Debug, Clone, Copy)]
pub struct TunnelContext<'a> {
    /// Resource URL without query string
    pub url: &'a str,
    /// Operation kind
    pub restli_method: RestliMethod,
    /// Bearer token
    pub access_token: &'a str,
    /// API version
    pub version: Option<&'a str>,
}

/// Whether an encoded query string is too long for the URL.
#[must_use]
pub fn is_query_tunneling_required(encoded_query: &str) -> bool {
    encoded_query.chars().count() > MAX_QUERY_STRING_LENGTH
}

/// Build a request for an operation without a body.
///
/// A tunneled request overrides to the operation's own verb: `GET` for the
/// read family, `DELETE` for `DELETE` and `BATCH_DELETE`.
#[must_use]
pub fn maybe_apply_query_tunneling_get_requests(
    ctx: &TunnelContext<'_>,
    encoded_query: &str,
) -> PreparedRequest {
    if is_query_tunneling_required(encoded_query) {
        tracing::debug!(
            restli_method = %ctx.restli_method,
            query_len = encoded_query.len(),
            "Tunneling query through POST body"
        );
        return PreparedRequest {
            method: HttpMethod::Post,
            url: ctx.url.to_string(),
            headers: restli_request_headers(
                ctx.restli_method,
                ctx.access_token,
                ctx.version,
                Some(CONTENT_TYPE_URL_ENCODED),
                Some(ctx.restli_method.http_method()),
            ),
            body: Some(encoded_query.to_string()),
        };
    }

    PreparedRequest {
        method: ctx.restli_method.http_method(),
        url: url_with_query(ctx.url, encoded_query),
        headers: restli_request_headers(
            ctx.restli_method,
            ctx.access_token,
            ctx.version,
            None,
            None,
        ),
        body: None,
    }
}

/// Build a request for an operation carrying a JSON body.
///
/// # Errors
///
/// Returns [`RestliError::Internal`] if no collision-free multipart boundary
/// was found within [`MAX_BOUNDARY_ATTEMPTS`].
pub fn maybe_apply_query_tunneling_requests_with_body(
    ctx: &TunnelContext<'_>,
    encoded_query: &str,
    body: &Value,
) -> Result<PreparedRequest> {
    let original_method = ctx.restli_method.http_method();
    let json = body.to_string();

    if is_query_tunneling_required(encoded_query) {
        let boundary = choose_boundary(&[encoded_query, json.as_str()], generate_boundary)?;
        tracing::debug!(
            restli_method = %ctx.restli_method,
            query_len = encoded_query.len(),
            "Tunneling query and body through multipart POST"
        );

        let multipart = multipart_body(&boundary, encoded_query, &json);
        return Ok(PreparedRequest {
            method: HttpMethod::Post,
            url: ctx.url.to_string(),
            headers: restli_request_headers(
                ctx.restli_method,
                ctx.access_token,
                ctx.version,
                Some(&format!("multipart/mixed; boundary={boundary}")),
                Some(original_method),
            ),
            body: Some(multipart),
        });
    }

    Ok(PreparedRequest {
        method: original_method,
        url: url_with_query(ctx.url, encoded_query),
        headers: restli_request_headers(
            ctx.restli_method,
            ctx.access_token,
            ctx.version,
            Some(CONTENT_TYPE_JSON),
            None,
        ),
        body: Some(json),
    })
}

fn url_with_query(url: &str, encoded_query: &str) -> String {
    if encoded_query.is_empty() {
        url.to_string()
    } else {
        format!("{url}?{encoded_query}")
    }
}

fn multipart_body(boundary: &str, encoded_query: &str, json: &str) -> String {
    format!(
        "--{boundary}\r\n\
         {CONTENT_TYPE}: {CONTENT_TYPE_URL_ENCODED}\r\n\r\n\
         {encoded_query}\r\n\
         --{boundary}\r\n\
         {CONTENT_TYPE}: {CONTENT_TYPE_JSON}\r\n\r\n\
         {json}\r\n\
         --{boundary}--"
    )
}

fn generate_boundary() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Pick a boundary that does not occur in any of the payload parts.
pub(crate) fn choose_boundary(
    parts: &[&str],
    mut generate: impl FnMut() -> String,
) -> Result<String> {
    for attempt in 1..=MAX_BOUNDARY_ATTEMPTS {
        let boundary = generate();
        if parts.iter().all(|part| !part.contains(boundary.as_str())) {
            return Ok(boundary);
        }
        tracing::trace!(attempt, "Multipart boundary collides with payload, regenerating");
    }

    Err(RestliError::Internal(format!(
        "no collision-free multipart boundary after {MAX_BOUNDARY_ATTEMPTS} attempts"
    )))
}
