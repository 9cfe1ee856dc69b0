//! Error types for WebSocket dialing.
//!
//! [`Error`] is the cause taxonomy returned unwrapped by
//! [`dial_config_raw`](super::dial_config_raw). [`DialError`] pairs a cause
//! with the location that was being dialed and is what the config-level
//! entry points return.

use crate::base::neterror::NetError;
use crate::socket::tls::TlsError;
use http::StatusCode;
use std::fmt;
use std::io;
use thiserror::Error;

/// Which of the two config URIs failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UriInput {
    Location,
    Origin,
}

impl fmt::Display for UriInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UriInput::Location => f.write_str("location"),
            UriInput::Origin => f.write_str("origin"),
        }
    }
}

/// Failure while establishing a WebSocket connection.
#[derive(Debug, Error)]
pub enum Error {
    /// A config URI could not be parsed as an absolute request URI.
    #[error("invalid {input} URI: {source}")]
    InvalidUri {
        input: UriInput,
        #[source]
        source: url::ParseError,
    },
    #[error("bad WebSocket location")]
    BadLocation,
    #[error("bad WebSocket origin")]
    BadOrigin,
    /// The dialer could not open a transport connection.
    #[error(transparent)]
    Transport(io::Error),
    /// TLS setup or handshake failed on the secure scheme.
    #[error("TLS: {0}")]
    Tls(#[source] TlsError),
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
}

impl Error {
    /// True for failures detected before any I/O was attempted.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::InvalidUri { .. } | Error::BadLocation | Error::BadOrigin)
    }

    /// Classify this failure as a network error code.
    pub fn net_error(&self) -> NetError {
        match self {
            Error::InvalidUri { .. } | Error::BadLocation | Error::BadOrigin => {
                NetError::InvalidUrl
            }
            Error::Transport(e) => NetError::from_io_error(e),
            Error::Tls(e) => e.code,
            Error::Handshake(e) => e.net_error(),
        }
    }
}

/// Failure during the HTTP upgrade exchange.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("handshake I/O: {0}")]
    Io(#[from] io::Error),
    #[error("malformed handshake response")]
    MalformedResponse,
    #[error("handshake response headers too big")]
    ResponseHeadersTooBig,
    #[error("bad status: {0}")]
    BadStatus(StatusCode),
    #[error("missing or bad upgrade")]
    BadUpgrade,
    #[error("mismatch challenge/response")]
    BadAccept,
    #[error("unsupported extensions")]
    UnsupportedExtensions,
    #[error("bad WebSocket protocol {0:?}")]
    BadProtocol(String),
    /// The config lacks a URI the request needs.
    #[error("config has no {0}")]
    Incomplete(UriInput),
    #[error("failed to generate handshake key")]
    Rng,
}

impl HandshakeError {
    pub fn net_error(&self) -> NetError {
        match self {
            HandshakeError::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                NetError::EmptyResponse
            }
            HandshakeError::Io(e) => NetError::from_io_error(e),
            HandshakeError::MalformedResponse => NetError::InvalidHttpResponse,
            HandshakeError::ResponseHeadersTooBig => NetError::ResponseHeadersTooBig,
            HandshakeError::BadStatus(_) => NetError::InvalidResponse,
            _ => NetError::WsProtocolError,
        }
    }
}

/// An error that occurred while dialing a WebSocket server.
///
/// Holds a snapshot of the location string taken when the error was built,
/// so later edits to a reused [`Config`](super::Config) do not change what
/// an already-reported error says.
#[derive(Debug)]
pub struct DialError {
    location: String,
    source: Error,
}

impl DialError {
    pub const PREFIX: &'static str = "websocket.Dial ";

    pub fn new(location: impl Into<String>, source: Error) -> Self {
        Self {
            location: location.into(),
            source,
        }
    }

    /// The location that was being dialed, as a string.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The underlying failure.
    pub fn cause(&self) -> &Error {
        &self.source
    }

    pub fn into_cause(self) -> Error {
        self.source
    }
}

impl fmt::Display for DialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}: {}", Self::PREFIX, self.location, self.source)
    }
}

impl std::error::Error for DialError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
