//! The network collaborator behind the dispatcher.
//!
//! # Design
//! `Transport` is the only seam that performs I/O. It receives a fully built
//! [`WireRequest`] and returns the status, headers, and an unread body stream.
//! Connection, DNS, TLS, protocol, and timeout failures are reported as
//! [`Error::Transport`]; an error status code is a normal reply, not an error.
//! Redirect handling is entirely up to the implementation.

use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::http::{HttpMethod, WireRequest, WireResponse};

/// Performs one HTTP exchange.
pub trait Transport: Send + Sync {
    fn execute(&self, request: WireRequest) -> Result<WireResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: WireRequest) -> Result<WireResponse> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: WireRequest) -> Result<WireResponse> {
        (**self).execute(request)
    }
}

/// Settings for [`UreqTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Sent as `user-agent` unless the request sets its own.
    pub user_agent: String,
    /// Redirects followed before the last reply is returned as-is.
    pub max_redirects: u32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("requests/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

/// Dropped when a redirect leaves the original host.
const CREDENTIAL_HEADERS: [&str; 3] = ["authorization", "cookie", "www-authenticate"];

/// Dropped along with the body when a redirect turns into a bodiless request.
const BODY_HEADERS: [&str; 3] = ["content-type", "content-length", "transfer-encoding"];

/// Blocking transport backed by `ureq`.
///
/// A fresh agent is built per exchange so each request carries its own
/// deadline; nothing is pooled between calls. Redirects are followed here
/// rather than by `ureq`, so a 3xx reply that cannot be followed (no
/// `location`, or a status such as 300 or 304) is returned unchanged.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport {
    config: TransportConfig,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn agent(&self, timeout: Option<Duration>) -> ureq::Agent {
        ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .timeout_global(timeout)
            .build()
            .new_agent()
    }

    /// One request and its reply, without following redirects.
    fn exchange(
        &self,
        request: &WireRequest,
        timeout: Option<Duration>,
    ) -> Result<ureq::http::Response<ureq::Body>> {
        let mut builder = ureq::http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        if !request.headers.iter().any(|(name, _)| name == "user-agent") {
            builder = builder.header("user-agent", self.config.user_agent.as_str());
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let agent = self.agent(timeout);
        // ureq frames a body for POST, PUT and PATCH even when it is empty;
        // for the other methods an empty body is sent as no body at all.
        let result = if request.body.is_empty() && !request.method.sends_body() {
            let built = builder.body(()).map_err(|e| Error::Config(e.to_string()))?;
            agent.run(built)
        } else {
            let built = builder
                .body(request.body.clone())
                .map_err(|e| Error::Config(e.to_string()))?;
            agent.run(built)
        };

        result.map_err(|err| {
            let timed_out = match &err {
                ureq::Error::Timeout(_) => true,
                ureq::Error::Io(io) => io.kind() == std::io::ErrorKind::TimedOut,
                _ => false,
            };
            if timed_out {
                Error::timeout(err)
            } else {
                Error::transport(err)
            }
        })
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: WireRequest) -> Result<WireResponse> {
        let started = Instant::now();
        let mut request = request;
        let mut redirects = 0;

        let response = loop {
            let remaining = request.timeout.map(|t| t.saturating_sub(started.elapsed()));
            let response = self.exchange(&request, remaining)?;
            if redirects >= self.config.max_redirects {
                break response;
            }
            let location = response
                .headers()
                .get("location")
                .and_then(|value| value.to_str().ok());
            match follow(&request, response.status().as_u16(), location)? {
                Some(next) => {
                    tracing::debug!(
                        status = response.status().as_u16(),
                        from = %request.url,
                        to = %next.url,
                        "following redirect"
                    );
                    redirects += 1;
                    request = next;
                }
                None => break response,
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.into_body().into_reader();
        Ok(WireResponse::new(status, headers, body))
    }
}

/// The request to send after a reply with `status`, or `None` when the reply
/// is final.
///
/// 301, 302 and 303 are followed without a body (POST becomes GET, and 303
/// turns everything except HEAD into GET); 307 and 308 repeat the method
/// and body. Credentials are not forwarded to another host.
fn follow(request: &WireRequest, status: u16, location: Option<&str>) -> Result<Option<WireRequest>> {
    let keep_body = match status {
        301 | 302 | 303 => false,
        307 | 308 => true,
        _ => return Ok(None),
    };
    let Some(location) = location.filter(|l| !l.is_empty()) else {
        return Ok(None);
    };

    let base = url::Url::parse(&request.url).map_err(Error::transport)?;
    let target = base.join(location).map_err(Error::transport)?;
    let method = match (status, request.method) {
        (303, HttpMethod::Get | HttpMethod::Head) => request.method,
        (303, _) | (301 | 302, HttpMethod::Post) => HttpMethod::Get,
        _ => request.method,
    };
    let same_origin = base.origin() == target.origin();
    let headers = request
        .headers
        .iter()
        .filter(|(name, _)| same_origin || !CREDENTIAL_HEADERS.contains(&name.as_str()))
        .filter(|(name, _)| keep_body || !BODY_HEADERS.contains(&name.as_str()))
        .cloned()
        .collect();

    Ok(Some(WireRequest {
        method,
        url: target.into(),
        headers,
        body: if keep_body { request.body.clone() } else { Vec::new() },
        timeout: request.timeout,
    }))
}
