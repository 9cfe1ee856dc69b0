//! WebSocket message types.

use crate::base::neterror::NetError;
use bytes::Bytes;
use tokio_tungstenite::tungstenite;
use tungstenite::protocol::frame::coding::CloseCode as WireCloseCode;

/// A complete WebSocket message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// UTF-8 text
    Text(String),
    Binary(Bytes),
    Ping(Vec<u8>),
    Pong(Vec<u8>),
    Close(Option<CloseFrame>),
}

/// Close frame data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    pub code: CloseCode,
    pub reason: String,
}

impl CloseFrame {
    pub fn new(code: CloseCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// WebSocket close codes (RFC 6455 section 7.4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CloseCode(pub u16);

impl CloseCode {
    pub const NORMAL: Self = Self(1000);
    pub const GOING_AWAY: Self = Self(1001);
    pub const PROTOCOL_ERROR: Self = Self(1002);
    pub const UNSUPPORTED: Self = Self(1003);
    pub const POLICY_VIOLATION: Self = Self(1008);
    pub const MESSAGE_TOO_BIG: Self = Self(1009);
    pub const INTERNAL_ERROR: Self = Self(1011);
}

impl From<u16> for CloseCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.0
    }
}

impl From<Message> for tungstenite::Message {
    fn from(msg: Message) -> Self {
        match msg {
            Message::Text(s) => tungstenite::Message::Text(s),
            Message::Binary(b) => tungstenite::Message::Binary(b.to_vec()),
            Message::Ping(d) => tungstenite::Message::Ping(d),
            Message::Pong(d) => tungstenite::Message::Pong(d),
            Message::Close(frame) => {
                tungstenite::Message::Close(frame.map(|f| tungstenite::protocol::CloseFrame {
                    code: WireCloseCode::from(f.code.0),
                    reason: f.reason.into(),
                }))
            }
        }
    }
}

impl TryFrom<tungstenite::Message> for Message {
    type Error = NetError;

    /// Fails for raw frames, which are a write-side construct and never a
    /// complete message.
    fn try_from(msg: tungstenite::Message) -> Result<Self, Self::Error> {
        Ok(match msg {
            tungstenite::Message::Text(s) => Message::Text(s),
            tungstenite::Message::Binary(b) => Message::Binary(Bytes::from(b)),
            tungstenite::Message::Ping(d) => Message::Ping(d),
            tungstenite::Message::Pong(d) => Message::Pong(d),
            tungstenite::Message::Close(frame) => Message::Close(frame.map(|f| CloseFrame {
                code: CloseCode(f.code.into()),
                reason: f.reason.into_owned(),
            })),
            tungstenite::Message::Frame(_) => return Err(NetError::WsProtocolError),
        })
    }
}
