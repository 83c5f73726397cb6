//! Rest.li 2.0.0 URL encoding.
//!
//! Values are serialized with the protocol's reduced grammar:
//!
//! - Strings are percent-encoded, leaving only RFC 3986 unreserved characters
//! - Sequences become `List(a,b,c)`
//! - Mappings become `(k1:v1,k2:v2)` with keys sorted by their encoded form
//!
//! Sorting makes the output independent of map insertion order, so equal
//! values always produce byte-identical query strings.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

/// Characters that must be percent-encoded in a Rest.li string primitive.
/// Every reserved character is escaped, including `/`, `:`, `,`, `(` and `)`.
const RESTLI_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub(crate) const LIST_PREFIX: &str = "List(";
pub(crate) const OBJ_PREFIX: &str = "(";
pub(crate) const SUFFIX: &str = ")";
pub(crate) const ITEM_SEP: char = ',';
pub(crate) const KEY_VAL_SEP: char = ':';

/// Query parameter projecting the returned fields. Sent in the 1.0.0 format.
pub const FIELDS_PARAM: &str = "fields";

/// Query parameters before encoding.
pub type QueryParams = Map<String, Value>;

/// Encode a single value with the Rest.li grammar.
///
/// # Examples
///
/// ```
/// use restli_core::encode;
/// use serde_json::json;
///
/// assert_eq!(encode(&json!([1, 2, 3])), "List(1,2,3)");
/// assert_eq!(
///     encode(&json!({"k2": {"k21": "v21"}, "k1": "v1"})),
///     "(k1:v1,k2:(k21:v21))"
/// );
/// assert_eq!(encode(&json!("urn:li:app:1")), "urn%3Ali%3Aapp%3A1");
/// ```
#[must_use]
pub fn encode(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => encode_string(s),
        Value::Array(items) => encode_list(items),
        Value::Object(map) => encode_object(map),
    }
}

/// Encode a map of query parameters into a query string.
///
/// Keys are percent-encoded and sorted; values go through [`encode`].
/// Returns an empty string for `None` or an empty map.
///
/// # Examples
///
/// ```
/// use restli_core::param_encode;
/// use serde_json::json;
///
/// let params = json!({"param2": {"k": ["v"]}, "param1": "v1"});
/// assert_eq!(
///     param_encode(params.as_object()),
///     "param1=v1&param2=(k:List(v))"
/// );
/// ```
#[must_use]
pub fn param_encode(params: Option<&QueryParams>) -> String {
    let Some(params) = params else {
        return String::new();
    };

    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode_string(k), encode(v)))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Encode query parameters for GET-family requests.
///
/// Identical to [`param_encode`] except for `fields`: endpoints still expect
/// the 1.0.0 projection syntax `fields=id,firstName`, so the value is emitted
/// verbatim after all other parameters instead of as `List(...)`.
///
/// # Examples
///
/// ```
/// use restli_core::encode_query_params_for_get_requests;
/// use serde_json::json;
///
/// let params = json!({"param1": [1, 2], "fields": "id,firstName"});
/// assert_eq!(
///     encode_query_params_for_get_requests(params.as_object()),
///     "param1=List(1,2)&fields=id,firstName"
/// );
/// ```
#[must_use]
pub fn encode_query_params_for_get_requests(params: Option<&QueryParams>) -> String {
    let Some(params) = params else {
        return String::new();
    };

    let mut rest = params.clone();
    let fields = rest.remove(FIELDS_PARAM).and_then(|v| fields_projection(&v));

    let encoded = param_encode(Some(&rest));
    match fields {
        Some(fields) if encoded.is_empty() => format!("{FIELDS_PARAM}={fields}"),
        Some(fields) => format!("{encoded}&{FIELDS_PARAM}={fields}"),
        None => encoded,
    }
}

/// Render a `fields` value as a plain comma-separated projection.
fn fields_projection(value: &Value) -> Option<String> {
    let projection = match value {
        Value::Array(items) => items
            .iter()
            .map(plain_string)
            .collect::<Vec<_>>()
            .join(","),
        other => plain_string(other),
    };

    (!projection.is_empty()).then_some(projection)
}

fn plain_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Percent-encode a string primitive, leaving only unreserved characters.
#[must_use]
pub fn encode_string(value: &str) -> String {
    utf8_percent_encode(value, RESTLI_ESCAPE).to_string()
}

fn encode_list(items: &[Value]) -> String {
    let body = items.iter().map(encode).collect::<Vec<_>>().join(",");
    format!("{LIST_PREFIX}{body}{SUFFIX}")
}

fn encode_object(map: &Map<String, Value>) -> String {
    let mut pairs: Vec<(String, String)> = map
        .iter()
        .map(|(k, v)| (encode_string(k), encode(v)))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let body = pairs
        .iter()
        .map(|(k, v)| format!("{k}{KEY_VAL_SEP}{v}"))
        .collect::<Vec<_>>()
        .join(",");
    format!("{OBJ_PREFIX}{body}{SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: &Value) -> Option<&QueryParams> {
        value.as_object()
    }

    #[test]
    fn encode_primitives() {
        assert_eq!(encode(&Value::Null), "");
        assert_eq!(encode(&json!("")), "");
        assert_eq!(encode(&json!("abc123")), "abc123");
        assert_eq!(encode(&json!(123)), "123");
        assert_eq!(encode(&json!(123.5)), "123.5");
        assert_eq!(encode(&json!(true)), "true");
        assert_eq!(encode(&json!(false)), "false");
    }

    #[test]
    fn encode_escapes_reserved_characters() {
        assert_eq!(encode(&json!(" t?':,*!")), "%20t%3F%27%3A%2C%2A%21");
        assert_eq!(encode(&json!("a/b(c)")), "a%2Fb%28c%29");
        // Unreserved characters pass through
        assert_eq!(encode(&json!("a-b_c.d~e")), "a-b_c.d~e");
    }

    #[test]
    fn encode_list_mixed() {
        assert_eq!(encode(&json!([1, 2, "foobar"])), "List(1,2,foobar)");
        assert_eq!(encode(&json!([])), "List()");
    }

    #[test]
    fn encode_nested_object() {
        let value = json!({
            "k1": "v1",
            "k2": "urn:li:app:123",
            "k3": [1, 2],
            "k4": {"k41": "foobar"}
        });
        assert_eq!(
            encode(&value),
            "(k1:v1,k2:urn%3Ali%3Aapp%3A123,k3:List(1,2),k4:(k41:foobar))"
        );
    }

    #[test]
    fn encode_list_of_complex_values() {
        let value = json!([{"k1": "v1"}, ["v2", " t?':,*!"]]);
        assert_eq!(
            encode(&value),
            "List((k1:v1),List(v2,%20t%3F%27%3A%2C%2A%21))"
        );
    }

    #[test]
    fn encode_sorts_by_encoded_key() {
        // "a b" encodes to "a%20b", which sorts before "a0"
        let value = json!({"a0": 1, "a b": 2});
        assert_eq!(encode(&value), "(a%20b:2,a0:1)");
    }

    #[test]
    fn encode_is_insertion_order_independent() {
        let mut forward = Map::new();
        forward.insert("zeta".into(), json!(1));
        forward.insert("alpha".into(), json!({"y": 2, "x": 3}));

        let mut backward = Map::new();
        backward.insert("alpha".into(), json!({"x": 3, "y": 2}));
        backward.insert("zeta".into(), json!(1));

        let a = encode(&Value::Object(forward));
        assert_eq!(a, encode(&Value::Object(backward)));
        assert_eq!(a, "(alpha:(x:3,y:2),zeta:1)");
    }

    #[test]
    fn param_encode_cases() {
        assert_eq!(param_encode(None), "");
        assert_eq!(param_encode(params(&json!({}))), "");
        assert_eq!(param_encode(params(&json!({"param1": "foobar"}))), "param1=foobar");
        assert_eq!(
            param_encode(params(&json!({"param2": "v2", "param1": "v1"}))),
            "param1=v1&param2=v2"
        );
        assert_eq!(
            param_encode(params(&json!({"pr op:1": " t?':,*!&+"}))),
            "pr%20op%3A1=%20t%3F%27%3A%2C%2A%21%26%2B"
        );
        assert_eq!(
            param_encode(params(&json!({
                "param1": [{"k1": "v1"}, ["e1", "e2"]],
                "param2": {"k2": {"k21": "v21"}, "k3": ["v3"]}
            }))),
            "param1=List((k1:v1),List(e1,e2))&param2=(k2:(k21:v21),k3:List(v3))"
        );
    }

    #[test]
    fn generic_param_encode_treats_fields_as_list() {
        let value = json!({"fields": ["id", "firstName"]});
        assert_eq!(param_encode(params(&value)), "fields=List(id,firstName)");
    }

    #[test]
    fn get_encoding_passes_fields_through() {
        let value = json!({"param1": [1, 2], "fields": "id,firstName"});
        assert_eq!(
            encode_query_params_for_get_requests(params(&value)),
            "param1=List(1,2)&fields=id,firstName"
        );

        let value = json!({"param1": [1, 2], "fields": ["id", "firstName"]});
        assert_eq!(
            encode_query_params_for_get_requests(params(&value)),
            "param1=List(1,2)&fields=id,firstName"
        );
    }

    #[test]
    fn get_encoding_fields_only() {
        let value = json!({"fields": "id"});
        assert_eq!(encode_query_params_for_get_requests(params(&value)), "fields=id");
    }

    #[test]
    fn get_encoding_drops_empty_fields() {
        let value = json!({"q": "search", "fields": ""});
        assert_eq!(encode_query_params_for_get_requests(params(&value)), "q=search");
        assert_eq!(encode_query_params_for_get_requests(None), "");
    }
}
