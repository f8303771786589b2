//! The mutable request descriptor and its helpers.
//!
//! # Design
//! `Request` is plain data: every field is public and `Request::default()` is
//! a usable instance whose header and query stores start empty. Cloning is a
//! deep copy, so a clone can be mutated without affecting the original.
//! Fallible operations return `Result`; the `must_*` variants panic instead
//! and are meant only for call sites where success is already guaranteed.

use std::time::Duration;

use serde::Serialize;

use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::http::HttpMethod;
use crate::json::encode_json;
use crate::response::Response;
use crate::store::{Headers, Query};
use crate::template;
use crate::transport::Transport;

/// An HTTP request under construction.
///
/// Notes:
/// - `url` must not include a query string or fragment; query parameters
///   belong in `query`. This is not validated.
/// - Headers and query parameters hold a single value per name.
/// - A `timeout` of `None` or zero means no deadline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Absolute URL, possibly containing `{{ }}` path template actions.
    pub url: String,
    pub method: HttpMethod,
    pub headers: Headers,
    pub query: Query,
    pub body: Vec<u8>,
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            ..Self::default()
        }
    }

    /// A GET request for `url`.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    /// A POST request for `url` with `body` and a `content-type` header.
    pub fn post(url: impl Into<String>, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::new(HttpMethod::Post, url)
            .with_header("content-type", content_type)
            .with_body(body)
    }

    /// A POST request whose body is `data` encoded as JSON.
    pub fn post_json<T: Serialize + ?Sized>(url: impl Into<String>, data: &T) -> Result<Self> {
        Ok(Self::post(url, "application/json", encode_json(data)?))
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn with_query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.set(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Header value for `name`, compared case-insensitively.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Set a header; the name is stored lowercased.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    pub fn delete_header(&mut self, name: &str) {
        self.headers.delete(name);
    }

    /// Query parameter for `name`, compared exactly.
    pub fn get_query(&self, name: &str) -> Option<&str> {
        self.query.get(name)
    }

    pub fn set_query(&mut self, name: &str, value: impl Into<String>) {
        self.query.set(name, value);
    }

    pub fn delete_query(&mut self, name: &str) {
        self.query.delete(name);
    }

    /// Return a copy of this request with the path template in `url`
    /// substituted from `data`. `self` is left untouched.
    ///
    /// The template can call `URLEncode` to make a value safe for a path
    /// segment, e.g. `{{ .Name | URLEncode }}`.
    pub fn parse_path_params<T: Serialize + ?Sized>(&self, data: &T) -> Result<Request> {
        let url = template::substitute(&self.url, data)?;
        Ok(Request {
            url,
            ..self.clone()
        })
    }

    /// Like [`parse_path_params`](Self::parse_path_params), but panics on a
    /// malformed template or missing data.
    pub fn must_parse_path_params<T: Serialize + ?Sized>(&self, data: &T) -> Request {
        match self.parse_path_params(data) {
            Ok(request) => request,
            Err(err) => panic!("{err}"),
        }
    }

    /// The URL to send, with the query parameters appended.
    ///
    /// Parameters are ordered by name and form-encoded
    /// (`application/x-www-form-urlencoded`): ASCII letters, digits and
    /// `*-._` are kept, a space becomes `+`, and every other byte is
    /// percent-encoded, so `~` is written as `%7E`. Without parameters the
    /// URL is returned unchanged.
    pub fn build_url(&self) -> Result<String> {
        if self.url.is_empty() {
            return Err(Error::Config("URL is required".to_string()));
        }
        if self.query.is_empty() {
            return Ok(self.url.clone());
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        Ok(format!("{}?{}", self.url, query))
    }

    /// Send the request with the default `ureq` transport.
    pub fn send(&self) -> Result<Response> {
        self.send_with(&Dispatcher::new())
    }

    pub fn send_with<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<Response> {
        dispatcher.send(self)
    }

    /// Like [`send`](Self::send), but panics if the exchange fails.
    pub fn must_send(&self) -> Response {
        match self.send() {
            Ok(response) => response,
            Err(err) => panic!("{err}"),
        }
    }
}

/// Send a GET request to `url`.
pub fn send_get(url: impl Into<String>) -> Result<Response> {
    Request::get(url).send()
}

/// Send a POST request to `url` with the given content type and body.
pub fn send_post(
    url: impl Into<String>,
    content_type: &str,
    body: impl Into<Vec<u8>>,
) -> Result<Response> {
    Request::post(url, content_type, body).send()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn get_constructor() {
        let req = Request::get("http://example.com");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://example.com");
        assert!(req.headers.is_empty());
        assert!(req.body.is_empty());
        assert_eq!(req.timeout, None);
    }

    #[test]
    fn post_constructor_sets_content_type() {
        let req = Request::post("http://example.com", "text/plain", "hi");
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.get_header("Content-Type"), Some("text/plain"));
        assert_eq!(req.body, b"hi");
    }

    #[test]
    fn post_json_encodes_body() {
        let req = Request::post_json("http://example.com", &json!({ "message": "ping" })).unwrap();
        assert_eq!(req.get_header("content-type"), Some("application/json"));
        assert_eq!(req.body, br#"{"message":"ping"}"#);
    }

    #[test]
    fn default_request_supports_reads_and_writes() {
        let mut req = Request::default();
        assert_eq!(req.get_header("x"), None);
        assert_eq!(req.get_query("x"), None);
        req.delete_header("x");
        req.delete_query("x");
        req.set_header("X", "1");
        req.set_query("x", "2");
        assert_eq!(req.get_header("x"), Some("1"));
        assert_eq!(req.get_query("x"), Some("2"));
    }

    #[test]
    fn headers_are_case_insensitive() {
        let mut req = Request::default();
        req.set_header("Content-Type", "application/json");
        assert_eq!(req.get_header("content-type"), Some("application/json"));
        req.delete_header("Content-Type");
        assert_eq!(req.get_header("content-type"), None);
    }

    #[test]
    fn query_is_case_sensitive() {
        let mut req = Request::default();
        req.set_query("Foo", "bar");
        assert_eq!(req.get_query("Foo"), Some("bar"));
        assert_eq!(req.get_query("foo"), None);
    }

    #[test]
    fn clone_is_independent() {
        let original = Request::post("http://example.com", "text/plain", "body")
            .with_query("q", "1")
            .with_timeout(Duration::from_secs(3));
        let mut copy = original.clone();
        copy.set_header("content-type", "application/json");
        copy.set_query("q", "2");
        copy.body.push(b'!');
        assert_eq!(original.get_header("content-type"), Some("text/plain"));
        assert_eq!(original.get_query("q"), Some("1"));
        assert_eq!(original.body, b"body");
        assert_eq!(copy.timeout, original.timeout);

        let mut original = original;
        original.set_header("x-only-original", "1");
        assert_eq!(copy.get_header("x-only-original"), None);
    }

    #[test]
    fn parse_path_params_returns_new_request() {
        let req = Request::get("http://x/{{.UserID}}/{{.Text|URLEncode}}").with_header("Accept", "*/*");
        let parsed = req
            .parse_path_params(&json!({ "UserID": 123, "Text": "Hello, World!" }))
            .unwrap();
        assert_eq!(parsed.url, "http://x/123/Hello%2C%20World%21");
        assert_eq!(parsed.get_header("accept"), Some("*/*"));
        assert_eq!(req.url, "http://x/{{.UserID}}/{{.Text|URLEncode}}");
    }

    #[test]
    fn parse_path_params_propagates_errors() {
        let req = Request::get("http://x/{{.UserID");
        assert!(matches!(
            req.parse_path_params(&json!({})),
            Err(Error::Parse(_))
        ));
        let req = Request::get("http://x/{{.UserID}}");
        assert!(matches!(
            req.parse_path_params(&json!({})),
            Err(Error::Execution(_))
        ));
        assert_eq!(req.url, "http://x/{{.UserID}}");
    }

    #[test]
    #[should_panic(expected = "UserID")]
    fn must_parse_path_params_panics() {
        Request::get("http://x/{{.UserID}}").must_parse_path_params(&json!({}));
    }

    #[test]
    fn build_url_without_query_is_unchanged() {
        let req = Request::get("http://example.com/path");
        assert_eq!(req.build_url().unwrap(), "http://example.com/path");
    }

    #[test]
    fn build_url_sorts_and_encodes_query() {
        let req = Request::get("http://example.com/search")
            .with_query("q", "a b&c=d")
            .with_query("page", "2")
            .with_query("empty", "");
        assert_eq!(
            req.build_url().unwrap(),
            "http://example.com/search?empty=&page=2&q=a+b%26c%3Dd"
        );
    }

    #[test]
    fn build_url_form_encoding_set() {
        let req = Request::get("http://example.com/")
            .with_query("k", "a~b*c-d.e_f")
            .with_query("u", "é/?");
        assert_eq!(
            req.build_url().unwrap(),
            "http://example.com/?k=a%7Eb*c-d.e_f&u=%C3%A9%2F%3F"
        );
    }

    #[test]
    fn build_url_requires_url() {
        let err = Request::default().with_query("a", "b").build_url().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn send_without_url_fails_before_dispatch() {
        let err = Request::default().send().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    #[should_panic(expected = "URL is required")]
    fn must_send_panics_on_error() {
        Request::default().must_send();
    }
}
