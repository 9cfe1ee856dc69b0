//! # wsnet
//!
//! Client-side WebSocket (RFC 6455) connection establishment for Rust,
//! structured after Chromium's network stack.
//!
//! Given a server location and an origin, `wsnet` resolves the authority to
//! dial, opens a TCP transport through a pluggable dialer, layers BoringSSL
//! on top for `wss`, performs the HTTP upgrade handshake and hands back a
//! framed connection. Every failure is attributable to a stage.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let conn = wsnet::ws::dial("ws://localhost:8080/echo", "", "http://localhost/").await?;
//!     conn.send_text("hello").await?;
//!     println!("{:?}", conn.recv().await?);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Network error codes
//! - [`socket`] - Transport sockets, dialers and TLS
//! - [`ws`] - Config, handshake, dial orchestration and the connection type

pub mod base;
pub mod socket;
pub mod ws;
