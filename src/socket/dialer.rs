//! Pluggable transport dialers.
//!
//! The [`Dialer`] trait is the seam between the WebSocket dial path and the
//! network: given a network name and a `host:port` authority it produces a
//! connected [`BoxedSocket`]. [`TcpDialer`] is the default.

use super::stream::BoxedSocket;
use std::{fmt, future::Future, io, net::SocketAddr, pin::Pin, time::Duration};
use tokio::net::TcpStream;

/// Network name passed to dialers for stream transports.
pub const NETWORK_TCP: &str = "tcp";

/// Alias for the `Future` type returned by a dialer.
pub type Dialing = Pin<Box<dyn Future<Output = io::Result<BoxedSocket>> + Send>>;

/// Trait for opening transport connections.
///
/// Implementations must be thread-safe; a single dialer may be shared by
/// many configs through an `Arc`. Errors are returned as-is to the caller,
/// and any timeout or cancellation policy belongs to the implementation.
pub trait Dialer: Send + Sync {
    /// Opens a connection to `address` (a `host:port` or bare host string)
    /// over `network`.
    fn dial(&self, network: &'static str, address: String) -> Dialing;
}

impl fmt::Debug for dyn Dialer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dialer")
    }
}

/// Plain TCP dialer backed by the system resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpDialer {
    /// Upper bound on the whole resolve + connect sequence. `None` waits as
    /// long as the operating system does.
    pub connect_timeout: Option<Duration>,
    /// Disable Nagle's algorithm on the connected socket.
    pub nodelay: bool,
}

impl Default for TcpDialer {
    fn default() -> Self {
        Self {
            connect_timeout: None,
            nodelay: true,
        }
    }
}

impl TcpDialer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    async fn connect(address: String, nodelay: bool) -> io::Result<TcpStream> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host(address.as_str()).await?.collect();

        // Try each resolved address in order, keeping the last failure.
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    stream.set_nodelay(nodelay)?;
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "TCP connect attempt failed");
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no addresses resolved for {address}"),
            )
        }))
    }
}

impl Dialer for TcpDialer {
    fn dial(&self, network: &'static str, address: String) -> Dialing {
        let TcpDialer {
            connect_timeout,
            nodelay,
        } = *self;

        Box::pin(async move {
            if network != NETWORK_TCP {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unsupported network {network:?}"),
                ));
            }

            let connecting = Self::connect(address, nodelay);
            let stream = match connect_timeout {
                Some(limit) => tokio::time::timeout(limit, connecting).await.map_err(|_| {
                    io::Error::new(io::ErrorKind::TimedOut, "connect timed out")
                })??,
                None => connecting.await?,
            };

            Ok(BoxedSocket::new(stream))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_default_has_no_timeout() {
        let dialer = TcpDialer::default();
        assert_eq!(dialer.connect_timeout, None);
        assert!(dialer.nodelay);
    }

    #[test]
    fn test_builder() {
        let dialer = TcpDialer::new().connect_timeout(Duration::from_secs(3)).nodelay(false);
        assert_eq!(dialer.connect_timeout, Some(Duration::from_secs(3)));
        assert!(!dialer.nodelay);
    }

    #[tokio::test]
    async fn test_dial_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept = tokio::spawn(async move { listener.accept().await.map(|_| ()) });
        let socket = TcpDialer::new().dial(NETWORK_TCP, addr.to_string()).await.unwrap();
        assert!(!socket.is_secure());
        accept.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_dial_refused() {
        // Bind then drop to obtain a port with nothing listening.
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let err = TcpDialer::new().dial(NETWORK_TCP, addr.to_string()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
    }

    #[tokio::test]
    async fn test_dial_rejects_unknown_network() {
        let err = TcpDialer::new().dial("udp", "127.0.0.1:9".into()).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
