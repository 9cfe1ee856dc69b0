//! Transport sockets for the dial path.
//!
//! Mirrors Chromium's `net/socket/`:
//! - [`stream`]: `StreamSocket` trait and the boxed transport type
//! - [`dialer`]: pluggable transport dialers, TCP by default
//! - [`connectjob`]: authority → dialer → TLS connection flow
//! - [`tls`]: TLS configuration with BoringSSL

pub mod connectjob;
pub mod dialer;
pub mod stream;
pub mod tls;

pub use dialer::{Dialer, Dialing, TcpDialer, NETWORK_TCP};
pub use stream::{BoxedSocket, BufferedSocket, StreamSocket};
pub use tls::{TlsConfig, TlsError};
