//! A small convenience layer over a blocking HTTP client.
//!
//! # Overview
//! Build a [`Request`] (directly or with [`Request::get`] / [`Request::post`]),
//! optionally fill in a URL path template with
//! [`Request::parse_path_params`], adjust headers and query parameters, then
//! [`send`](Request::send) it to get a [`Response`] whose body is already in
//! memory.
//!
//! ```no_run
//! use requests::Request;
//! use serde_json::json;
//!
//! let response = Request::get("https://api.example.com/users/{{.Id}}")
//!     .with_query("fields", "name,email")
//!     .parse_path_params(&json!({ "Id": 42 }))?
//!     .send()?;
//! if response.ok {
//!     let user = response.decode_json()?;
//!     println!("{}", user["name"]);
//! }
//! # Ok::<(), requests::Error>(())
//! ```
//!
//! # Design
//! - `Request` and `Response` are plain data; clones never share state.
//! - Header names are case-insensitive (stored lowercased); query names are
//!   exact. Both hold one value per name.
//! - All network I/O sits behind the [`Transport`] trait. The default
//!   [`UreqTransport`] uses `ureq`; tests can plug in an in-memory transport.
//! - Every fallible operation returns [`Result`]; `must_*` variants panic
//!   and exist only for call sites where failure is impossible.

pub mod dispatch;
pub mod encode;
pub mod error;
pub mod http;
pub mod json;
pub mod mime;
pub mod request;
pub mod response;
pub mod store;
pub mod template;
pub mod transport;

pub use dispatch::Dispatcher;
pub use encode::url_encode;
pub use error::{BoxError, Error, JsonKind, ParseError, Result};
pub use http::{HttpMethod, UnknownMethod, WireRequest, WireResponse};
pub use json::{encode_json, must_encode_json};
pub use mime::{guess_mime, mime_type, MIME_DEFAULT_BINARY, MIME_DEFAULT_TEXT};
pub use request::{send_get, send_post, Request};
pub use response::Response;
pub use store::{Headers, KeyValueStore, Query};
pub use template::{substitute, Funcs, Template};
pub use transport::{Transport, TransportConfig, UreqTransport};
