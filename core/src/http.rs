//! HTTP methods and the plain-data types exchanged with a transport.
//!
//! # Design
//! `WireRequest` and `WireResponse` describe one exchange as owned data. The
//! dispatcher builds a `WireRequest` from a [`Request`](crate::Request) and
//! turns the `WireResponse` it gets back into a [`Response`](crate::Response);
//! the transport in between is the only code that touches the network. This
//! keeps the request pipeline deterministic and testable with an in-memory
//! transport.

use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::time::Duration;

/// HTTP request method.
///
/// Read more here: <https://developer.mozilla.org/en-US/docs/Web/HTTP/Methods>
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Options,
    Head,
    Connect,
    Trace,
    Patch,
}

impl HttpMethod {
    /// Every method, in declaration order.
    pub const ALL: [HttpMethod; 9] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Connect,
        HttpMethod::Trace,
        HttpMethod::Patch,
    ];

    /// The uppercase token sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Whether requests with this method conventionally carry a body.
    pub fn sends_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a token that is not one of the nine methods.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown HTTP method: {0:?}")]
pub struct UnknownMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    /// Tokens are case-sensitive, as on the wire.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMethod(s.to_string()))
    }
}

/// An outgoing exchange described as plain data.
///
/// `url` already carries the encoded query string and header names are
/// already lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Deadline for the whole exchange; `None` means unbounded.
    pub timeout: Option<Duration>,
}

/// A reply from the transport, with the body still unread.
///
/// Headers keep wire order and may repeat a name. Dropping the value drops the
/// body reader, which releases the underlying connection.
pub struct WireResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Box<dyn Read + Send>,
}

impl WireResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Read + Send + 'static) -> Self {
        Self {
            status,
            headers,
            body: Box::new(body),
        }
    }
}

impl fmt::Debug for WireResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WireResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_method_has_its_wire_token() {
        let tokens: Vec<&str> = HttpMethod::ALL.iter().map(HttpMethod::as_str).collect();
        assert_eq!(
            tokens,
            ["GET", "POST", "PUT", "DELETE", "OPTIONS", "HEAD", "CONNECT", "TRACE", "PATCH"]
        );
    }

    #[test]
    fn display_matches_wire_token() {
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(format!("{}", HttpMethod::Options), "OPTIONS");
    }

    #[test]
    fn parses_wire_tokens() {
        for method in HttpMethod::ALL {
            assert_eq!(method.as_str().parse::<HttpMethod>(), Ok(method));
        }
    }

    #[test]
    fn rejects_unknown_and_lowercase_tokens() {
        assert_eq!(
            "get".parse::<HttpMethod>(),
            Err(UnknownMethod("get".to_string()))
        );
        assert!("BREW".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn only_post_put_patch_send_bodies() {
        let with_body: Vec<HttpMethod> = HttpMethod::ALL
            .into_iter()
            .filter(HttpMethod::sends_body)
            .collect();
        assert_eq!(with_body, [HttpMethod::Post, HttpMethod::Put, HttpMethod::Patch]);
    }

    #[test]
    fn default_method_is_get() {
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
    }
}
