//! Sends a [`Request`] through a [`Transport`] and normalizes the reply.
//!
//! # Design
//! The dispatcher owns no state besides its transport. `send` builds a
//! [`WireRequest`] from the request, hands it to the transport, and turns the
//! [`WireResponse`] into a [`Response`] by lowercasing header names and
//! reading the whole body. The body reader is dropped before `send` returns
//! on every path, which closes or releases the connection.

use std::io::Read;

use crate::error::{Error, Result};
use crate::http::{WireRequest, WireResponse};
use crate::request::Request;
use crate::response::Response;
use crate::transport::{Transport, UreqTransport};

/// Dispatches requests through a transport, `ureq` by default.
#[derive(Debug, Clone, Default)]
pub struct Dispatcher<T = UreqTransport> {
    transport: T,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Map `request` onto the wire without sending it.
    ///
    /// Fails with [`Error::Config`] if the request has no URL. A zero timeout
    /// means no deadline.
    pub fn prepare(&self, request: &Request) -> Result<WireRequest> {
        Ok(WireRequest {
            method: request.method,
            url: request.build_url()?,
            headers: request
                .headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body: request.body.clone(),
            timeout: request.timeout.filter(|t| !t.is_zero()),
        })
    }

    /// Perform the exchange described by `request`.
    ///
    /// Transport failures are returned as-is and never retried. Status codes
    /// are not interpreted beyond setting [`Response::ok`].
    pub fn send(&self, request: &Request) -> Result<Response> {
        let wire = self.prepare(request)?;
        tracing::debug!(
            method = %wire.method,
            url = %wire.url,
            headers = wire.headers.len(),
            body_bytes = wire.body.len(),
            timeout = ?wire.timeout,
            "sending request"
        );

        let WireResponse {
            status,
            headers,
            mut body,
        } = match self.transport.execute(wire) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "request failed");
                return Err(err);
            }
        };

        let mut buf = Vec::new();
        let read = body.read_to_end(&mut buf);
        drop(body);
        if let Err(err) = read {
            tracing::warn!(status, error = %err, "failed to read response body");
            return Err(Error::Io(err));
        }

        let response = Response::new(status, headers, buf);
        tracing::debug!(
            status = response.status_code,
            ok = response.ok,
            body_bytes = response.body.len(),
            "received response"
        );
        Ok(response)
    }
}
