//! Dial orchestration: validate config → open transport → handshake → wrap.
//!
//! Two layers share one core. [`dial_config_raw`] stops after the handshake
//! and returns unwrapped [`Error`]s; [`dial_config`] builds the [`Conn`] and
//! wraps every failure in a [`DialError`] that names the location.

use super::config::Config;
use super::connection::Conn;
use super::error::{DialError, Error};
use super::handshake::{ClientHandshake, Handshake, Negotiated};
use crate::socket::connectjob::ConnectJob;
use crate::socket::stream::{BoxedSocket, BufferedSocket};
use http::HeaderMap;
use tokio::io::{AsyncWriteExt, BufStream};

/// Read and write buffer capacity for the handshake stream.
const BUFFER_SIZE: usize = 4096;

/// A transport that has completed the upgrade handshake but is not yet
/// wrapped in a [`Conn`].
#[derive(Debug)]
pub struct RawConn {
    io: BufferedSocket,
    negotiated: Negotiated,
}

impl RawConn {
    /// The underlying transport connection.
    pub fn transport(&self) -> &BoxedSocket {
        self.io.get_ref()
    }

    /// Writing here bypasses any buffered bytes; prefer [`io_mut`](Self::io_mut).
    pub fn transport_mut(&mut self) -> &mut BoxedSocket {
        self.io.get_mut()
    }

    /// The buffered stream, positioned right after the handshake response.
    pub fn io_mut(&mut self) -> &mut BufferedSocket {
        &mut self.io
    }

    /// Sub-protocol accepted by the server.
    pub fn protocol(&self) -> Option<&str> {
        self.negotiated.protocol.as_deref()
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.negotiated.headers
    }

    pub fn into_parts(self) -> (BufferedSocket, Negotiated) {
        (self.io, self.negotiated)
    }
}

/// Open a new client connection to `url`.
///
/// `protocol` is requested as the only sub-protocol unless empty. URI parse
/// failures are reported as a [`DialError`] carrying the raw `url`.
///
/// # Example
/// ```ignore
/// let conn = wsnet::ws::dial("ws://localhost:8080/echo", "", "http://localhost/").await?;
/// conn.send_text("hello").await?;
/// ```
pub async fn dial(url: &str, protocol: &str, origin: &str) -> Result<Conn, DialError> {
    let mut config = Config::new(url, origin).map_err(|e| DialError::new(url, e))?;
    if !protocol.is_empty() {
        config.protocols.push(protocol.to_string());
    }
    dial_config(&config).await
}

/// Open a new client connection described by `config`.
pub async fn dial_config(config: &Config) -> Result<Conn, DialError> {
    dial_config_with(config, &ClientHandshake).await
}

/// [`dial_config`] with a caller-supplied handshake.
pub async fn dial_config_with(
    config: &Config,
    handshake: &dyn Handshake,
) -> Result<Conn, DialError> {
    let raw = dial_config_raw_with(config, handshake)
        .await
        .map_err(|e| DialError::new(location_string(config), e))?;
    Ok(Conn::from_raw(raw, config).await)
}

/// Dial and handshake without building a [`Conn`].
pub async fn dial_config_raw(config: &Config) -> Result<RawConn, Error> {
    dial_config_raw_with(config, &ClientHandshake).await
}

/// [`dial_config_raw`] with a caller-supplied handshake.
///
/// If the handshake fails the transport is shut down and dropped before the
/// error is returned.
pub async fn dial_config_raw_with(
    config: &Config,
    handshake: &dyn Handshake,
) -> Result<RawConn, Error> {
    let location = config.location.as_ref().ok_or(Error::BadLocation)?;
    if config.origin.is_none() {
        return Err(Error::BadOrigin);
    }

    let socket = ConnectJob::connect(config, location).await?;
    let mut io = BufStream::with_capacity(BUFFER_SIZE, BUFFER_SIZE, socket);

    match handshake.handshake(config, &mut io).await {
        Ok(negotiated) => Ok(RawConn { io, negotiated }),
        Err(e) => {
            // Skip the write buffer; a half-written request is not worth flushing.
            if let Err(shutdown) = io.get_mut().shutdown().await {
                tracing::debug!(error = %shutdown, "transport shutdown after failed handshake");
            }
            Err(e.into())
        }
    }
}

fn location_string(config: &Config) -> String {
    config.location.as_ref().map_or_else(|| "<none>".to_string(), |u| u.to_string())
}
