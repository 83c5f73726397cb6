//! Resource URL construction.
//!
//! Resource paths are templates such as `/adAccounts/{id}` whose
//! placeholders are filled from a path-key map. Keys may be composite
//! objects; they are serialized with the Rest.li encoder, so
//! `{"account": "urn:li:a:1", "user": "urn:li:u:2"}` becomes
//! `(account:urn%3Ali%3Aa%3A1,user:urn%3Ali%3Au%3A2)`.

use crate::encoding::encode;
use crate::error::{RestliError, Result};
use serde_json::{Map, Value};

/// Host serving versioned APIs (selected when a version string is given).
pub const VERSIONED_BASE_URL: &str = "https://api.linkedin.com/rest";
/// Host serving legacy, non-versioned APIs.
pub const NON_VERSIONED_BASE_URL: &str = "https://api.linkedin.com/v2";

/// Path keys filling the placeholders of a resource path template.
pub type PathKeys = Map<String, Value>;

/// Base URLs requests are sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiHosts {
    /// Used when a version string is supplied
    pub versioned: String,
    /// Used otherwise
    pub non_versioned: String,
}

impl Default for ApiHosts {
    fn default() -> Self {
        Self {
            versioned: VERSIONED_BASE_URL.to_string(),
            non_versioned: NON_VERSIONED_BASE_URL.to_string(),
        }
    }
}

impl ApiHosts {
    /// Select the base URL for an optional API version.
    #[must_use]
    pub fn base_url(&self, version: Option<&str>) -> &str {
        match normalize_version(version) {
            Some(_) => &self.versioned,
            None => &self.non_versioned,
        }
    }
}

/// Treat an empty version string as no version at all.
#[must_use]
pub fn normalize_version(version: Option<&str>) -> Option<&str> {
    version.filter(|v| !v.is_empty())
}

/// Build the URL of a resource, without query parameters.
///
/// # Errors
///
/// Returns [`RestliError::InvalidArgument`] if the template does not start
/// with `/`, contains an unterminated `{`, or its placeholders do not match
/// the keys of `path_keys` exactly.
///
/// # Examples
///
/// ```
/// use restli_core::{build_rest_url, ApiHosts};
/// use serde_json::json;
///
/// let keys = json!({"id": 123});
/// let url = build_rest_url(&ApiHosts::default(), "/adAccounts/{id}", keys.as_object(), None)
///     .unwrap();
/// assert_eq!(url, "https://api.linkedin.com/v2/adAccounts/123");
/// ```
pub fn build_rest_url(
    hosts: &ApiHosts,
    resource_path: &str,
    path_keys: Option<&PathKeys>,
    version: Option<&str>,
) -> Result<String> {
    let path = fill_path_template(resource_path, path_keys)?;
    Ok(format!("{}{path}", hosts.base_url(version)))
}

/// Substitute encoded path keys into a resource path template.
///
/// # Errors
///
/// See [`build_rest_url`].
pub fn fill_path_template(resource_path: &str, path_keys: Option<&PathKeys>) -> Result<String> {
    if !resource_path.starts_with('/') {
        return Err(RestliError::InvalidArgument(format!(
            "resource path must start with '/': {resource_path}"
        )));
    }

    let segments = parse_template(resource_path)?;
    let placeholders = segments
        .iter()
        .filter(|s| matches!(s, Segment::Placeholder(_)))
        .count();
    let key_count = path_keys.map_or(0, Map::len);

    if placeholders != key_count {
        return Err(RestliError::InvalidArgument(format!(
            "the number of placeholders in the resource path ({placeholders}) does not match \
             the number of path keys ({key_count})"
        )));
    }

    let mut path = String::with_capacity(resource_path.len());
    for segment in segments {
        match segment {
            Segment::Literal(text) => path.push_str(text),
            Segment::Placeholder(name) => {
                let value = path_keys.and_then(|keys| keys.get(name)).ok_or_else(|| {
                    RestliError::InvalidArgument(format!(
                        "placeholder '{{{name}}}' in the resource path has no matching path key"
                    ))
                })?;
                path.push_str(&encode(value));
            }
        }
    }

    Ok(path)
}

enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn parse_template(template: &str) -> Result<Vec<Segment<'_>>> {
    let mut segments = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }
        let close = rest[open..].find('}').map(|i| open + i).ok_or_else(|| {
            RestliError::InvalidArgument(format!(
                "unterminated placeholder in resource path: {template}"
            ))
        })?;
        segments.push(Segment::Placeholder(&rest[open + 1..close]));
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::Literal(rest));
    }

    Ok(segments)
}
