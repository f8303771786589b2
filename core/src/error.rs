//! Error types for the request pipeline.
//!
//! # Design
//! One `Error` enum covers every fallible operation so callers can match on
//! the failure class: a request that was never sendable (`Config`), input
//! that could not be parsed (`Parse`), a template that referenced missing
//! data (`Execution`), a failed exchange (`Transport`), or a response body
//! that could not be read in full (`Io`). Nothing is retried internally; the
//! variant tells the caller whether a retry makes sense.

use std::fmt;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error produced by a [`Transport`](crate::Transport) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by request building, dispatch, and response decoding.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request is missing a required field (e.g. an empty URL).
    #[error("invalid request: {0}")]
    Config(String),

    /// A path template or JSON body is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A path template could not be evaluated against the supplied data.
    #[error("template execution failed: {0}")]
    Execution(String),

    /// The exchange could not be established or completed, including timeouts.
    #[error("transport error: {source}")]
    Transport {
        #[source]
        source: BoxError,
        timeout: bool,
    },

    /// The response body could not be read in full.
    #[error("failed to read response body: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl Error {
    /// Wrap a transport failure.
    pub fn transport(source: impl Into<BoxError>) -> Self {
        Error::Transport {
            source: source.into(),
            timeout: false,
        }
    }

    /// Wrap a transport failure caused by the request deadline expiring.
    pub fn timeout(source: impl Into<BoxError>) -> Self {
        Error::Transport {
            source: source.into(),
            timeout: true,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport { timeout: true, .. })
    }
}

/// Parse failures for path templates and JSON response bodies.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The template's action syntax is malformed. `offset` is the byte
    /// position in the template where the problem was detected.
    #[error("template parse error at byte {offset}: {message}")]
    Template { offset: usize, message: String },

    /// The body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    /// The body is valid JSON but its top-level value is not an object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(JsonKind),
}

/// Top-level JSON value kinds other than objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
}

impl JsonKind {
    pub(crate) fn of(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(JsonKind::Null),
            serde_json::Value::Bool(_) => Some(JsonKind::Bool),
            serde_json::Value::Number(_) => Some(JsonKind::Number),
            serde_json::Value::String(_) => Some(JsonKind::String),
            serde_json::Value::Array(_) => Some(JsonKind::Array),
            serde_json::Value::Object(_) => None,
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonKind::Null => "null",
            JsonKind::Bool => "a boolean",
            JsonKind::Number => "a number",
            JsonKind::String => "a string",
            JsonKind::Array => "an array",
        };
        f.write_str(name)
    }
}
