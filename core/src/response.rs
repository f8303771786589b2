//! The normalized result of a dispatched request.

use serde_json::{Map, Value};

use crate::error::{JsonKind, ParseError, Result};
use crate::store::Headers;

/// An HTTP response with its body fully read into memory.
///
/// `headers` keeps one value per lowercased name (the first one received);
/// `raw_headers` keeps every header line in the order the server sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// `true` when `status_code < 400`.
    pub ok: bool,
    pub status_code: u16,
    pub headers: Headers,
    pub raw_headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// Assemble a response from wire-order headers, deriving `ok` and the
    /// first-value header map.
    pub fn new(status_code: u16, raw_headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        let raw_headers: Vec<(String, String)> = raw_headers
            .into_iter()
            .map(|(name, value)| (name.to_lowercase(), value))
            .collect();
        let mut headers = Headers::default();
        for (name, value) in &raw_headers {
            if !headers.contains(name) {
                headers.set(name, value.as_str());
            }
        }
        Self {
            ok: status_code < 400,
            status_code,
            headers,
            raw_headers,
            body,
        }
    }

    /// First value of the header `name`, compared case-insensitively.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Every value received for `name`, in wire order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        let name = name.to_lowercase();
        self.raw_headers
            .iter()
            .filter(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// The body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as a JSON object.
    ///
    /// An empty body decodes to an empty map, since many servers answer
    /// 200/204 with no content. Any other top-level value than an object is a
    /// [`ParseError::NotAnObject`].
    pub fn decode_json(&self) -> Result<Map<String, Value>> {
        if self.body.is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_slice::<Value>(&self.body).map_err(ParseError::Json)? {
            Value::Object(map) => Ok(map),
            other => Err(ParseError::NotAnObject(
                JsonKind::of(&other).unwrap_or(JsonKind::Null),
            )
            .into()),
        }
    }
}
