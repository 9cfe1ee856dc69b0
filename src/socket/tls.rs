use super::stream::BoxedSocket;
use crate::base::neterror::NetError;
use boring::error::ErrorStack;
use boring::ssl::{
    ErrorCode, SslConnector, SslConnectorBuilder, SslMethod, SslRef, SslVerifyMode, SslVersion,
};
use boring::x509::X509VerifyError;
use std::io;
use thiserror::Error;

/// TLS setup or handshake failure on the secure scheme.
///
/// `code` classifies the failure; `source` carries the underlying cause,
/// either the socket error, the certificate verification result or the
/// BoringSSL error stack.
#[derive(Debug, Error)]
#[error("{code}: {source}")]
pub struct TlsError {
    pub code: NetError,
    #[source]
    pub source: io::Error,
}

impl TlsError {
    fn new(code: NetError, source: io::Error) -> Self {
        Self { code, source }
    }

    /// Failure while building the connector.
    fn setup(source: ErrorStack) -> Self {
        Self::new(NetError::SslProtocolError, io::Error::new(io::ErrorKind::Other, source))
    }

    fn from_handshake<S>(err: tokio_boring::HandshakeError<S>, verified: bool) -> Self {
        // Without peer verification the recorded result is meaningless.
        if verified {
            if let Some(Err(verify)) = err.ssl().map(SslRef::verify_result) {
                return Self::new(
                    cert_error_code(verify),
                    io::Error::new(io::ErrorKind::InvalidData, verify),
                );
            }
        }

        if let Some(io_err) = err.as_io_error() {
            return Self::new(
                NetError::from_io_error(io_err),
                io::Error::new(io_err.kind(), io_err.to_string()),
            );
        }

        let code = match err.code() {
            Some(ErrorCode::ZERO_RETURN) => NetError::ConnectionClosed,
            _ => NetError::SslProtocolError,
        };
        Self::new(code, io::Error::new(io::ErrorKind::Other, err.to_string()))
    }
}

/// Map an X.509 verification failure to its certificate error code.
fn cert_error_code(err: X509VerifyError) -> NetError {
    match err {
        X509VerifyError::HOSTNAME_MISMATCH => NetError::CertCommonNameInvalid,
        X509VerifyError::CERT_HAS_EXPIRED | X509VerifyError::CERT_NOT_YET_VALID => {
            NetError::CertDateInvalid
        }
        X509VerifyError::DEPTH_ZERO_SELF_SIGNED_CERT
        | X509VerifyError::SELF_SIGNED_CERT_IN_CHAIN
        | X509VerifyError::UNABLE_TO_GET_ISSUER_CERT
        | X509VerifyError::UNABLE_TO_GET_ISSUER_CERT_LOCALLY
        | X509VerifyError::UNABLE_TO_VERIFY_LEAF_SIGNATURE
        | X509VerifyError::CERT_UNTRUSTED => NetError::CertAuthorityInvalid,
        _ => NetError::CertInvalid,
    }
}

/// TLS settings applied when dialing the secure (`wss`) scheme.
///
/// The upgrade request is an HTTP/1.1 exchange, so ALPN offers only
/// `http/1.1` by default.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub min_version: Option<SslVersion>,
    pub max_version: Option<SslVersion>,
    pub alpn_protos: Vec<String>,
    /// Verify the server certificate chain and hostname.
    pub verify_peer: bool,
    /// Overrides the name used for SNI and hostname verification. Defaults
    /// to the location host.
    pub server_name: Option<String>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            min_version: Some(SslVersion::TLS1_2),
            max_version: Some(SslVersion::TLS1_3),
            alpn_protos: vec!["http/1.1".to_string()],
            verify_peer: true,
            server_name: None,
        }
    }
}

impl TlsConfig {
    /// Disable certificate and hostname verification.
    ///
    /// Only meant for test servers with self-signed certificates.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.verify_peer = false;
        self
    }

    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// Apply this configuration to an SSL connector builder.
    pub fn apply_to_builder(&self, builder: &mut SslConnectorBuilder) -> Result<(), TlsError> {
        if let Some(min) = self.min_version {
            builder.set_min_proto_version(Some(min)).map_err(TlsError::setup)?;
        }
        if let Some(max) = self.max_version {
            builder.set_max_proto_version(Some(max)).map_err(TlsError::setup)?;
        }

        if !self.alpn_protos.is_empty() {
            let wire = alpn_wire_format(&self.alpn_protos).ok_or_else(|| {
                TlsError::new(
                    NetError::SslProtocolError,
                    io::Error::new(io::ErrorKind::InvalidInput, "ALPN protocol name too long"),
                )
            })?;
            builder.set_alpn_protos(&wire).map_err(TlsError::setup)?;
        }

        builder.set_verify(if self.verify_peer {
            SslVerifyMode::PEER
        } else {
            SslVerifyMode::NONE
        });

        Ok(())
    }

    /// Check if SNI (Server Name Indication) should be set for this host.
    /// Per RFC 6066, SNI MUST NOT be set for raw IP addresses.
    pub fn should_set_sni(host: &str) -> bool {
        let bare = host.trim_start_matches('[').trim_end_matches(']');
        bare.parse::<std::net::IpAddr>().is_err()
    }

    /// Run the TLS client handshake over an already-dialed socket.
    pub async fn connect(&self, host: &str, socket: BoxedSocket) -> Result<BoxedSocket, TlsError> {
        let mut builder = SslConnector::builder(SslMethod::tls()).map_err(TlsError::setup)?;
        self.apply_to_builder(&mut builder)?;

        let name = self.server_name.as_deref().unwrap_or(host);
        let mut config = builder.build().configure().map_err(TlsError::setup)?;
        config.set_use_server_name_indication(Self::should_set_sni(name));
        config.set_verify_hostname(self.verify_peer);

        let domain = name.trim_start_matches('[').trim_end_matches(']');
        let stream = tokio_boring::connect(config, domain, socket).await.map_err(|e| {
            tracing::debug!(host = domain, "TLS handshake failed: {}", e);
            TlsError::from_handshake(e, self.verify_peer)
        })?;

        Ok(BoxedSocket::new(stream))
    }
}

/// Encode protocol names as length-prefixed ALPN wire bytes.
fn alpn_wire_format(protos: &[String]) -> Option<Vec<u8>> {
    let mut wire = Vec::new();
    for proto in protos {
        wire.push(u8::try_from(proto.len()).ok()?);
        wire.extend_from_slice(proto.as_bytes());
    }
    Some(wire)
}
