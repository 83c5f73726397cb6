//! Rest.li 2.0.0 URL decoding.
//!
//! The grammar is not regular: lists and objects nest to arbitrary depth, so
//! nested groups are located with an explicit depth-counting scanner
//! ([`find_matching_close`]) rather than by searching for the next `)`.
//!
//! Decoding is lossy. Every primitive comes back as a string, e.g.
//! `List(1,2,3)` decodes to `["1","2","3"]`; batch responses rely on this to
//! correlate ids by their string form.

use crate::encoding::{ITEM_SEP, KEY_VAL_SEP, LIST_PREFIX, OBJ_PREFIX};
use crate::error::{RestliError, Result};
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

/// Deepest nesting of lists and objects accepted by the decoders.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Escapes unescaped by [`reduced_decode`], with their characters.
const REDUCED_ESCAPES: [(&str, char); 5] = [
    ("%28", '('),
    ("%29", ')'),
    ("%2C", ','),
    ("%3A", ':'),
    ("%27", '\''),
];

/// Decode a Rest.li URL-encoded value, percent-decoding every primitive.
///
/// # Errors
///
/// Returns [`RestliError::InvalidSerializedValue`] on unbalanced brackets,
/// an object pair without a `:` separator, or nesting deeper than
/// [`MAX_NESTING_DEPTH`].
///
/// # Examples
///
/// ```
/// use restli_core::decode;
/// use serde_json::json;
///
/// assert_eq!(decode("List(1,2,3)").unwrap(), json!(["1", "2", "3"]));
/// assert_eq!(
///     decode("(key1:urn%3Ali%3Aapp%3A1,key2:List(a,b))").unwrap(),
///     json!({"key1": "urn:li:app:1", "key2": ["a", "b"]})
/// );
/// ```
pub fn decode(value: &str) -> Result<Value> {
    Decoder { reduced: false }.decode(value, 0)
}

/// Decode a value that was already partially unescaped by an HTTP layer,
/// such as a header. Only `%28 %29 %2C %3A %27` are unescaped.
///
/// # Errors
///
/// Same as [`decode`].
///
/// # Examples
///
/// ```
/// use restli_core::reduced_decode;
/// use serde_json::json;
///
/// assert_eq!(
///     reduced_decode("List(%28a%3Ab%29,%27c%2Cd%27?)").unwrap(),
///     json!(["(a:b)", "'c,d'?"])
/// );
/// ```
pub fn reduced_decode(value: &str) -> Result<Value> {
    Decoder { reduced: true }.decode(value, 0)
}

/// Return the index of the `)` matching the `(` at `open_index`.
///
/// # Errors
///
/// Returns [`RestliError::InvalidSerializedValue`] if `open_index` does not
/// point at `(` or the group is never closed.
///
/// # Examples
///
/// ```
/// use restli_core::find_matching_close;
///
/// let s = "List(1,(k:v))";
/// assert_eq!(find_matching_close(s, 4).unwrap(), 12);
/// assert_eq!(find_matching_close(s, 7).unwrap(), 11);
/// ```
pub fn find_matching_close(s: &str, open_index: usize) -> Result<usize> {
    let bytes = s.as_bytes();
    if bytes.get(open_index) != Some(&b'(') {
        return Err(RestliError::InvalidSerializedValue(format!(
            "expected '(' at index {open_index}: {s}"
        )));
    }

    let mut depth = 0usize;
    for (idx, &byte) in bytes.iter().enumerate().skip(open_index) {
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(idx);
                }
            }
            _ => {}
        }
    }

    Err(RestliError::InvalidSerializedValue(format!(
        "unbalanced brackets: {s}"
    )))
}

struct Decoder {
    reduced: bool,
}

impl Decoder {
    fn decode(&self, value: &str, depth: usize) -> Result<Value> {
        let value = if value == "''" { "" } else { value };

        if let Some(group) = Group::at(value, 0) {
            if depth >= MAX_NESTING_DEPTH {
                return Err(RestliError::InvalidSerializedValue(format!(
                    "nesting deeper than {MAX_NESTING_DEPTH} levels"
                )));
            }
            let close = find_matching_close(value, group.open_index())?;
            if close != value.len() - 1 {
                return Err(RestliError::InvalidSerializedValue(format!(
                    "unbalanced prefix and suffix: {value}"
                )));
            }
            let inner = &value[group.prefix_len()..close];
            return match group {
                Group::List => self.decode_list(inner, depth + 1),
                Group::Object => self.decode_object(inner, depth + 1),
            };
        }

        Ok(Value::String(self.unescape(value)))
    }

    /// Decode the contents of `List(...)`, without the brackets.
    fn decode_list(&self, s: &str, depth: usize) -> Result<Value> {
        let mut items = Vec::new();
        let mut idx = 0;

        while idx < s.len() {
            let (item, next) = self.decode_entry(s, idx, depth)?;
            items.push(item);
            idx = next;
        }

        Ok(Value::Array(items))
    }

    /// Decode the contents of `(...)`, without the brackets.
    fn decode_object(&self, s: &str, depth: usize) -> Result<Value> {
        let mut map = Map::new();
        let mut idx = 0;

        while idx < s.len() {
            let colon = s[idx..].find(KEY_VAL_SEP).map(|i| idx + i).ok_or_else(|| {
                RestliError::InvalidSerializedValue(format!(
                    "object entry without '{KEY_VAL_SEP}' separator: {s}"
                ))
            })?;
            let key = self.unescape(&s[idx..colon]);

            let (value, next) = self.decode_entry(s, colon + 1, depth)?;
            map.insert(key, value);
            idx = next;
        }

        Ok(Value::Object(map))
    }

    /// Decode one list item or object value starting at `start`.
    ///
    /// Returns the value and the index just past its trailing separator.
    fn decode_entry(
        &self,
        s: &str,
        start: usize,
        depth: usize,
    ) -> Result<(Value, usize)> {
        if let Some(group) = Group::at(s, start) {
            let close = find_matching_close(s, start + group.open_index())?;
            let value = self.decode(&s[start..=close], depth)?;

            let next = close + 1;
            return match s.as_bytes().get(next) {
                None => Ok((value, next)),
                Some(b',') => Ok((value, next + 1)),
                Some(_) => Err(RestliError::InvalidSerializedValue(format!(
                    "expected '{ITEM_SEP}' after nested value at index {next}: {s}"
                ))),
            };
        }

        let end = s[start..].find(ITEM_SEP).map_or(s.len(), |i| start + i);
        Ok((Value::String(self.unescape(&s[start..end])), end + 1))
    }

    fn unescape(&self, value: &str) -> String {
        if self.reduced {
            reduced_unescape(value)
        } else {
            percent_decode_str(value).decode_utf8_lossy().into_owned()
        }
    }
}

/// Kind of nested group starting at some index.
#[derive(Clone, Copy)]
enum Group {
    List,
    Object,
}

impl Group {
    fn at(s: &str, idx: usize) -> Option<Self> {
        let rest = s.get(idx..)?;
        if rest.starts_with(LIST_PREFIX) {
            Some(Self::List)
        } else if rest.starts_with(OBJ_PREFIX) {
            Some(Self::Object)
        } else {
            None
        }
    }

    /// Offset of the opening bracket from the start of the group.
    fn open_index(self) -> usize {
        self.prefix_len() - 1
    }

    fn prefix_len(self) -> usize {
        match self {
            Self::List => LIST_PREFIX.len(),
            Self::Object => OBJ_PREFIX.len(),
        }
    }
}

fn reduced_unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    'outer: while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        for (escape, ch) in REDUCED_ESCAPES {
            if let Some(tail) = rest.strip_prefix(escape) {
                out.push(ch);
                rest = tail;
                continue 'outer;
            }
        }
        out.push('%');
        rest = &rest[1..];
    }
    out.push_str(rest);

    out
}
