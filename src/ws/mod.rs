//! WebSocket client connection establishment.
//!
//! Mirrors the client half of Chromium's `net/websockets/`: a [`Config`]
//! describes one connection attempt, [`dial_config_raw`] opens the transport
//! and runs the upgrade [`Handshake`], and [`dial_config`] wraps the result
//! in a [`Conn`].
//!
//! # Example
//! ```ignore
//! use wsnet::ws::{self, Config};
//!
//! let config = Config::new("wss://echo.example/ws", "https://example/")?
//!     .with_protocol("chat");
//! let conn = ws::dial_config(&config).await?;
//! conn.send_text("hello").await?;
//! let reply = conn.recv().await?;
//! ```

pub mod config;
mod connection;
mod dial;
pub mod error;
pub mod handshake;
mod message;

pub use config::{authority, Config, ProtocolVersion};
pub use connection::Conn;
pub use dial::{dial, dial_config, dial_config_raw, dial_config_raw_with, dial_config_with, RawConn};
pub use error::{DialError, Error, HandshakeError, UriInput};
pub use handshake::{client_handshake, ClientHandshake, Handshake, Handshaking, Negotiated};
pub use message::{CloseCode, CloseFrame, Message};
