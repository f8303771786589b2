//! Dispatcher behaviour against in-memory transports.
//!
//! No sockets are opened: each transport records the `WireRequest` it was
//! given and replies with canned data, so the mapping between `Request`,
//! the wire, and `Response` can be checked exactly.

use std::io::{self, Cursor, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use requests::{Dispatcher, Error, HttpMethod, Request, Transport, WireRequest, WireResponse};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Replies with a fixed status, headers, and body; remembers every request.
struct Canned {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    seen: Mutex<Vec<WireRequest>>,
}

impl Canned {
    fn new(status: u16, headers: &[(&str, &str)], body: &[u8]) -> Self {
        Self {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: body.to_vec(),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn last(&self) -> WireRequest {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }

    fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl Transport for Canned {
    fn execute(&self, request: WireRequest) -> requests::Result<WireResponse> {
        self.seen.lock().unwrap().push(request);
        Ok(WireResponse::new(
            self.status,
            self.headers.clone(),
            Cursor::new(self.body.clone()),
        ))
    }
}

struct Refused;

impl Transport for Refused {
    fn execute(&self, _request: WireRequest) -> requests::Result<WireResponse> {
        Err(Error::transport("connection refused"))
    }
}

/// Yields some bytes, then fails; flags when it is dropped.
struct BrokenBody {
    sent: bool,
    dropped: Arc<AtomicBool>,
}

impl Read for BrokenBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.sent {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset mid-body"));
        }
        self.sent = true;
        buf[..4].copy_from_slice(b"part");
        Ok(4)
    }
}

impl Drop for BrokenBody {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

struct Truncating {
    dropped: Arc<AtomicBool>,
}

impl Transport for Truncating {
    fn execute(&self, _request: WireRequest) -> requests::Result<WireResponse> {
        Ok(WireResponse::new(
            200,
            Vec::new(),
            BrokenBody {
                sent: false,
                dropped: Arc::clone(&self.dropped),
            },
        ))
    }
}

#[test]
fn maps_request_onto_the_wire() {
    init_tracing();
    let dispatcher = Dispatcher::with_transport(Canned::new(200, &[], b""));

    let req = Request::new(HttpMethod::Patch, "http://example.com/items/1")
        .with_header("X-Trace", "abc")
        .with_header("Content-Type", "application/json")
        .with_query("b", "2")
        .with_query("a", "1 2")
        .with_body(r#"{"done":true}"#)
        .with_timeout(Duration::from_secs(5));
    dispatcher.send(&req).unwrap();

    let wire = dispatcher.transport().last();
    assert_eq!(wire.method, HttpMethod::Patch);
    assert_eq!(wire.url, "http://example.com/items/1?a=1+2&b=2");
    assert_eq!(
        wire.headers,
        vec![
            ("content-type".to_string(), "application/json".to_string()),
            ("x-trace".to_string(), "abc".to_string()),
        ]
    );
    assert_eq!(wire.body, br#"{"done":true}"#);
    assert_eq!(wire.timeout, Some(Duration::from_secs(5)));
}

#[test]
fn zero_timeout_becomes_unbounded() {
    let dispatcher = Dispatcher::with_transport(Canned::new(200, &[], b""));

    let req = Request::get("http://example.com").with_timeout(Duration::ZERO);
    dispatcher.send(&req).unwrap();
    assert_eq!(dispatcher.transport().last().timeout, None);

    dispatcher.send(&Request::get("http://example.com")).unwrap();
    assert_eq!(dispatcher.transport().last().timeout, None);
}

#[test]
fn normalizes_the_reply() {
    init_tracing();
    let dispatcher = Dispatcher::with_transport(Canned::new(
        201,
        &[
            ("Content-Type", "application/json"),
            ("Set-Cookie", "a=1"),
            ("SET-COOKIE", "b=2"),
        ],
        br#"{"id":7}"#,
    ));

    let res = dispatcher.send(&Request::get("http://example.com")).unwrap();
    assert!(res.ok);
    assert_eq!(res.status_code, 201);
    assert_eq!(res.get_header("content-type"), Some("application/json"));
    assert_eq!(res.get_header("set-cookie"), Some("a=1"));
    assert_eq!(res.header_values("set-cookie"), ["a=1", "b=2"]);
    assert_eq!(res.decode_json().unwrap()["id"], 7);
}

#[test]
fn error_status_is_not_an_error() {
    let dispatcher = Dispatcher::with_transport(Canned::new(503, &[], b"busy"));

    let res = dispatcher.send(&Request::get("http://example.com")).unwrap();
    assert!(!res.ok);
    assert_eq!(res.status_code, 503);
    assert_eq!(res.body, b"busy");
}

#[test]
fn empty_url_fails_before_the_transport() {
    let dispatcher = Dispatcher::with_transport(Canned::new(200, &[], b""));

    let err = dispatcher.send(&Request::default()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert_eq!(dispatcher.transport().calls(), 0);
}

#[test]
fn transport_errors_pass_through_unretried() {
    init_tracing();
    let dispatcher = Dispatcher::with_transport(Refused);

    let err = dispatcher.send(&Request::get("http://example.com")).unwrap_err();
    assert!(err.is_transport());
    assert!(!err.is_timeout());
    assert_eq!(err.to_string(), "transport error: connection refused");
}

#[test]
fn body_read_failure_is_io_error_and_releases_reader() {
    init_tracing();
    let dropped = Arc::new(AtomicBool::new(false));
    let dispatcher = Dispatcher::with_transport(Truncating {
        dropped: Arc::clone(&dropped),
    });

    let err = dispatcher.send(&Request::get("http://example.com")).unwrap_err();
    assert!(matches!(&err, Error::Io(e) if e.kind() == io::ErrorKind::ConnectionReset));
    assert!(dropped.load(Ordering::SeqCst));
}

#[test]
fn send_with_uses_the_given_dispatcher() {
    let dispatcher = Dispatcher::with_transport(Canned::new(200, &[], b"hi"));

    let res = Request::get("http://example.com").send_with(&dispatcher).unwrap();
    assert_eq!(res.text(), "hi");
    assert_eq!(dispatcher.transport().calls(), 1);
}

#[test]
fn boxed_transports_work() {
    let transport: Box<dyn Transport> = Box::new(Canned::new(204, &[], b""));
    let dispatcher = Dispatcher::with_transport(transport);

    let res = dispatcher.send(&Request::get("http://example.com")).unwrap();
    assert_eq!(res.status_code, 204);
    assert!(res.decode_json().unwrap().is_empty());
}

#[test]
fn prepare_does_not_send() {
    let dispatcher = Dispatcher::with_transport(Canned::new(200, &[], b""));

    let wire = dispatcher
        .prepare(&Request::post("http://example.com", "text/plain", "x"))
        .unwrap();
    assert_eq!(wire.method, HttpMethod::Post);
    assert_eq!(wire.headers, vec![("content-type".to_string(), "text/plain".to_string())]);
    assert_eq!(dispatcher.transport().calls(), 0);
}
