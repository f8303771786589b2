//! Percent-encoding for URL path segments.

use std::fmt::Display;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything except the RFC 3986 §2.3 unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Render `value` with `Display` and percent-encode it for use inside a URL
/// path segment.
///
/// Only letters, digits, `-`, `.`, `_` and `~` pass through unchanged; every
/// other byte of the UTF-8 text becomes `%XX`.
///
/// ```
/// assert_eq!(requests::url_encode("Hello, World!"), "Hello%2C%20World%21");
/// assert_eq!(requests::url_encode(123), "123");
/// ```
pub fn url_encode(value: impl Display) -> String {
    utf8_percent_encode(&value.to_string(), PATH_SEGMENT).to_string()
}
