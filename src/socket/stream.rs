//! Transport socket abstraction.
//!
//! `StreamSocket` lets the dial path treat plain TCP, TLS over TCP and
//! in-memory pipes uniformly. Dialers hand back a [`BoxedSocket`], and the
//! secure scheme wraps that socket again in TLS, which is itself boxed.
//!
//! Based on Chromium's `StreamSocket` interface.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, BufStream, DuplexStream, ReadBuf};
use tokio::net::TcpStream;
use tokio_boring::SslStream;

/// A trait for any socket that supports async read/write operations.
///
/// Chromium equivalent: `net::StreamSocket`
pub trait StreamSocket: AsyncRead + AsyncWrite + Unpin + Send + Sync + 'static {
    /// Whether the bytes on this socket are encrypted.
    fn is_secure(&self) -> bool {
        false
    }
}

impl StreamSocket for TcpStream {}

impl StreamSocket for DuplexStream {}

impl<S: StreamSocket> StreamSocket for SslStream<S> {
    fn is_secure(&self) -> bool {
        true
    }
}

impl StreamSocket for BoxedSocket {
    fn is_secure(&self) -> bool {
        self.secure
    }
}

/// A transport with independent read and write buffers, as used by the
/// handshake and handed to the connection afterwards.
pub type BufferedSocket = BufStream<BoxedSocket>;

/// A boxed dynamic `StreamSocket`: the transport connection handed out by
/// dialers and owned by the WebSocket connection after the handshake.
pub struct BoxedSocket {
    inner: Pin<Box<dyn StreamSocket>>,
    secure: bool,
}

impl BoxedSocket {
    /// Create a new BoxedSocket from any StreamSocket.
    pub fn new<S: StreamSocket>(socket: S) -> Self {
        let secure = socket.is_secure();
        Self {
            inner: Box::pin(socket),
            secure,
        }
    }

    /// Get a pinned mutable reference to the inner socket.
    pub fn as_mut(&mut self) -> Pin<&mut dyn StreamSocket> {
        self.inner.as_mut()
    }

    /// Whether this transport is encrypted.
    pub fn is_secure(&self) -> bool {
        self.secure
    }
}

impl fmt::Debug for BoxedSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxedSocket").field("secure", &self.secure).finish_non_exhaustive()
    }
}

impl AsyncRead for BoxedSocket {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_read(cx, buf)
    }
}

impl AsyncWrite for BoxedSocket {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        self.inner.as_mut().poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        self.inner.as_mut().poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_boxed_duplex_roundtrip() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut socket = BoxedSocket::new(client);
        assert!(!socket.is_secure());

        socket.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 4];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");

        server.write_all(b"pong").await.unwrap();
        socket.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"pong");
    }

    #[test]
    fn test_reboxing_keeps_security_flag() {
        let (client, _server) = tokio::io::duplex(8);
        let inner = BoxedSocket::new(client);
        let outer = BoxedSocket::new(inner);
        assert!(!outer.is_secure());
    }
}
