//! Client side of the HTTP upgrade handshake (RFC 6455 section 4.1).
//!
//! The dial path talks to the handshake through the [`Handshake`] trait so
//! tests and alternative negotiators can be swapped in.
//! [`ClientHandshake`] is the default.

use super::config::Config;
use super::error::{HandshakeError, UriInput};
use crate::socket::stream::BufferedSocket;
use base64::prelude::{Engine as _, BASE64_STANDARD};
use bytes::{BufMut, BytesMut};
use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use std::{future::Future, io, pin::Pin};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt};
use url::{Position, Url};

/// GUID appended to the client key when computing `Sec-WebSocket-Accept`.
const ACCEPT_GUID: &[u8] = b"258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Upper bound on the response status line plus headers.
const MAX_RESPONSE_HEAD: u64 = 16 * 1024;

/// Headers the handshake writes itself; copies in `Config::headers` are
/// skipped.
const RESERVED_HEADERS: &[&str] = &[
    "host",
    "upgrade",
    "connection",
    "sec-websocket-key",
    "origin",
    "sec-websocket-version",
    "sec-websocket-protocol",
    "sec-websocket-accept",
];

/// Outcome of a successful handshake.
#[derive(Debug, Clone, Default)]
pub struct Negotiated {
    /// Sub-protocol selected by the server, if any.
    pub protocol: Option<String>,
    /// Response headers as sent by the server.
    pub headers: HeaderMap,
}

/// Alias for the `Future` type returned by a handshake.
pub type Handshaking<'a> =
    Pin<Box<dyn Future<Output = Result<Negotiated, HandshakeError>> + Send + 'a>>;

/// Performs one upgrade request/response exchange over a buffered stream.
///
/// On success the stream must be positioned immediately after the response
/// head. On failure its position is unspecified.
pub trait Handshake: Send + Sync {
    fn handshake<'a>(&'a self, config: &'a Config, io: &'a mut BufferedSocket) -> Handshaking<'a>;
}

/// The RFC 6455 client handshake.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientHandshake;

impl Handshake for ClientHandshake {
    fn handshake<'a>(&'a self, config: &'a Config, io: &'a mut BufferedSocket) -> Handshaking<'a> {
        Box::pin(client_handshake(config, io))
    }
}

/// Run the client handshake for `config` over `io`.
pub async fn client_handshake(
    config: &Config,
    io: &mut BufferedSocket,
) -> Result<Negotiated, HandshakeError> {
    let location =
        config.location.as_ref().ok_or(HandshakeError::Incomplete(UriInput::Location))?;
    let origin = config.origin.as_ref().ok_or(HandshakeError::Incomplete(UriInput::Origin))?;

    let key = generate_key()?;
    let request = build_request(config, location, origin, &key);
    io.write_all(&request).await?;
    io.flush().await?;

    let (status, headers) = read_response_head(io).await?;
    let negotiated = validate_response(config, &key, status, headers)?;
    tracing::debug!(%location, protocol = ?negotiated.protocol, "WebSocket handshake complete");
    Ok(negotiated)
}

/// The `Sec-WebSocket-Accept` value a server must answer `key` with.
pub fn accept_key(key: &str) -> String {
    let mut input = Vec::with_capacity(key.len() + ACCEPT_GUID.len());
    input.extend_from_slice(key.as_bytes());
    input.extend_from_slice(ACCEPT_GUID);
    BASE64_STANDARD.encode(boring::sha::sha1(&input))
}

fn generate_key() -> Result<String, HandshakeError> {
    let mut nonce = [0u8; 16];
    boring::rand::rand_bytes(&mut nonce).map_err(|_| HandshakeError::Rng)?;
    Ok(BASE64_STANDARD.encode(nonce))
}

fn build_request(config: &Config, location: &Url, origin: &Url, key: &str) -> BytesMut {
    let mut buf = BytesMut::with_capacity(256);

    let target = &location[Position::BeforePath..Position::AfterQuery];
    let target = if target.is_empty() { "/" } else { target };
    put_line(&mut buf, &format!("GET {target} HTTP/1.1"));
    put_line(&mut buf, &format!("Host: {}", host_header(location)));
    put_line(&mut buf, "Upgrade: websocket");
    put_line(&mut buf, "Connection: Upgrade");
    put_line(&mut buf, &format!("Sec-WebSocket-Key: {key}"));
    put_line(&mut buf, &format!("Origin: {}", origin_header(origin)));
    put_line(&mut buf, &format!("Sec-WebSocket-Version: {}", config.version.as_str()));
    if !config.protocols.is_empty() {
        put_line(&mut buf, &format!("Sec-WebSocket-Protocol: {}", config.protocols.join(", ")));
    }

    for (name, value) in config.headers.iter() {
        if RESERVED_HEADERS.contains(&name.as_str()) {
            continue;
        }
        buf.put_slice(name.as_str().as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(value.as_bytes());
        buf.put_slice(b"\r\n");
    }

    buf.put_slice(b"\r\n");
    buf
}

fn put_line(buf: &mut BytesMut, line: &str) {
    buf.put_slice(line.as_bytes());
    buf.put_slice(b"\r\n");
}

/// Host plus the port when one was written explicitly.
fn host_header(location: &Url) -> String {
    let host = location.host_str().unwrap_or_default();
    match location.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

fn origin_header(origin: &Url) -> String {
    let serialized = origin.origin();
    if serialized.is_tuple() {
        serialized.ascii_serialization()
    } else {
        origin.as_str().to_ascii_lowercase()
    }
}

async fn read_response_head<R>(io: &mut R) -> Result<(StatusCode, HeaderMap), HandshakeError>
where
    R: AsyncBufRead + Unpin,
{
    let mut limited = (&mut *io).take(MAX_RESPONSE_HEAD);
    let mut line = Vec::with_capacity(128);

    read_line(&mut limited, &mut line).await?;
    let status = parse_status_line(&line)?;

    let mut headers = HeaderMap::new();
    loop {
        read_line(&mut limited, &mut line).await?;
        if line.is_empty() {
            break;
        }
        let (name, value) = parse_header_line(&line)?;
        headers.append(name, value);
    }

    Ok((status, headers))
}

/// Read one CRLF (or bare LF) terminated line into `line`, without the
/// terminator.
async fn read_line<R>(
    reader: &mut tokio::io::Take<R>,
    line: &mut Vec<u8>,
) -> Result<(), HandshakeError>
where
    R: AsyncBufRead + Unpin,
{
    line.clear();
    reader.read_until(b'\n', line).await?;
    if line.last() != Some(&b'\n') {
        if reader.limit() == 0 {
            return Err(HandshakeError::ResponseHeadersTooBig);
        }
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
    }

    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(())
}

fn parse_status_line(line: &[u8]) -> Result<StatusCode, HandshakeError> {
    let mut parts = line.splitn(3, |b| *b == b' ');
    let version = parts.next().unwrap_or_default();
    if !version.starts_with(b"HTTP/1.") {
        return Err(HandshakeError::MalformedResponse);
    }
    let code = parts.next().ok_or(HandshakeError::MalformedResponse)?;
    StatusCode::from_bytes(code).map_err(|_| HandshakeError::MalformedResponse)
}

fn parse_header_line(line: &[u8]) -> Result<(HeaderName, HeaderValue), HandshakeError> {
    let colon =
        line.iter().position(|b| *b == b':').ok_or(HandshakeError::MalformedResponse)?;
    let name = HeaderName::from_bytes(line[..colon].trim_ascii())
        .map_err(|_| HandshakeError::MalformedResponse)?;
    let value = HeaderValue::from_bytes(line[colon + 1..].trim_ascii())
        .map_err(|_| HandshakeError::MalformedResponse)?;
    Ok((name, value))
}

fn validate_response(
    config: &Config,
    key: &str,
    status: StatusCode,
    headers: HeaderMap,
) -> Result<Negotiated, HandshakeError> {
    if status != StatusCode::SWITCHING_PROTOCOLS {
        return Err(HandshakeError::BadStatus(status));
    }

    let upgrade_ok = headers
        .get(header::UPGRADE)
        .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"websocket"));
    let connection_ok = headers.get_all(header::CONNECTION).iter().any(|v| {
        v.as_bytes()
            .split(|b| *b == b',')
            .any(|token| token.trim_ascii().eq_ignore_ascii_case(b"upgrade"))
    });
    if !upgrade_ok || !connection_ok {
        return Err(HandshakeError::BadUpgrade);
    }

    let expected = accept_key(key);
    if headers.get(header::SEC_WEBSOCKET_ACCEPT).map(HeaderValue::as_bytes)
        != Some(expected.as_bytes())
    {
        return Err(HandshakeError::BadAccept);
    }

    if headers.get(header::SEC_WEBSOCKET_EXTENSIONS).is_some_and(|v| !v.is_empty()) {
        return Err(HandshakeError::UnsupportedExtensions);
    }

    let protocol = match headers.get(header::SEC_WEBSOCKET_PROTOCOL) {
        Some(value) if !value.is_empty() => {
            let offered = String::from_utf8_lossy(value.as_bytes()).into_owned();
            if !config.protocols.iter().any(|p| *p == offered) {
                return Err(HandshakeError::BadProtocol(offered));
            }
            Some(offered)
        }
        _ => None,
    };

    Ok(Negotiated { protocol, headers })
}
