//! The negotiated WebSocket connection.
//!
//! Framing is delegated to tokio-tungstenite; this type only wires an
//! already-upgraded stream into it.

use super::config::Config;
use super::dial::RawConn;
use super::message::{CloseFrame, Message};
use crate::base::neterror::NetError;
use crate::socket::stream::BufferedSocket;
use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{self, protocol::Role};
use tokio_tungstenite::WebSocketStream;
use url::Url;

type WsStream = WebSocketStream<BufferedSocket>;

/// WebSocket client connection.
///
/// Sole owner of the transport and its buffers. Sending and receiving lock
/// independently, so one task may `recv` while another sends.
pub struct Conn {
    sink: Mutex<SplitSink<WsStream, tungstenite::Message>>,
    stream: Mutex<SplitStream<WsStream>>,
    config: Config,
    protocol: Option<String>,
}

impl Conn {
    /// Wrap a handshaken transport. Performs no I/O; bytes the server sent
    /// after its handshake response are still in the read buffer and become
    /// the first frames read.
    pub async fn from_raw(raw: RawConn, config: &Config) -> Self {
        let (io, negotiated) = raw.into_parts();
        let ws = WebSocketStream::from_raw_socket(io, Role::Client, None).await;
        let (sink, stream) = ws.split();

        Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
            config: config.clone(),
            protocol: negotiated.protocol,
        }
    }

    /// The config this connection was dialed with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn location(&self) -> Option<&Url> {
        self.config.location.as_ref()
    }

    /// Sub-protocol accepted by the server.
    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    /// Send a message.
    pub async fn send(&self, msg: Message) -> Result<(), NetError> {
        let mut sink = self.sink.lock().await;
        sink.send(msg.into()).await.map_err(|e| {
            tracing::debug!("WebSocket send error: {:?}", e);
            NetError::ConnectionClosed
        })
    }

    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), NetError> {
        self.send(Message::Text(text.into())).await
    }

    pub async fn send_binary(&self, data: impl Into<Bytes>) -> Result<(), NetError> {
        self.send(Message::Binary(data.into())).await
    }

    /// Receive a message.
    ///
    /// Returns `None` once the peer has closed the stream.
    pub async fn recv(&self) -> Result<Option<Message>, NetError> {
        let mut stream = self.stream.lock().await;
        match stream.next().await {
            Some(Ok(msg)) => Message::try_from(msg).map(Some),
            Some(Err(tungstenite::Error::Protocol(e))) => {
                tracing::debug!("WebSocket protocol error: {}", e);
                Err(NetError::WsProtocolError)
            }
            Some(Err(e)) => {
                tracing::debug!("WebSocket recv error: {:?}", e);
                Err(NetError::ConnectionClosed)
            }
            None => Ok(None),
        }
    }

    pub async fn ping(&self, data: Vec<u8>) -> Result<(), NetError> {
        self.send(Message::Ping(data)).await
    }

    /// Start the close handshake with an optional code and reason.
    pub async fn close(&self, frame: Option<CloseFrame>) -> Result<(), NetError> {
        self.send(Message::Close(frame)).await
    }
}

impl std::fmt::Debug for Conn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conn")
            .field("location", &self.location().map(Url::as_str))
            .field("protocol", &self.protocol)
            .finish_non_exhaustive()
    }
}
