use crate::socket::dialer::{Dialer, TcpDialer, NETWORK_TCP};
use crate::socket::stream::BoxedSocket;
use crate::socket::tls::TlsConfig;
use crate::ws::config::{authority, is_secure_scheme, Config};
use crate::ws::error::Error;
use url::Url;

/// Manages the transport half of a dial: authority -> dialer -> TLS.
/// Roughly equivalent to net::ConnectJob.
pub struct ConnectJob;

impl ConnectJob {
    /// Open the transport for `location` using the dialer and TLS settings
    /// of `config`.
    ///
    /// Dialer failures are returned as [`Error::Transport`] without retry.
    pub async fn connect(config: &Config, location: &Url) -> Result<BoxedSocket, Error> {
        let address = authority(location);
        tracing::debug!(%location, %address, "dialing WebSocket transport");

        let socket = match config.dialer.as_deref() {
            Some(dialer) => dialer.dial(NETWORK_TCP, address).await,
            None => TcpDialer::default().dial(NETWORK_TCP, address).await,
        }
        .map_err(Error::Transport)?;

        if !is_secure_scheme(location.scheme()) {
            return Ok(socket);
        }

        let host = location.host_str().unwrap_or_default();
        let default_tls;
        let tls = match config.tls.as_ref() {
            Some(tls) => tls,
            None => {
                default_tls = TlsConfig::default();
                &default_tls
            }
        };

        tracing::debug!(host, "starting TLS handshake");
        tls.connect(host, socket).await.map_err(Error::Tls)
    }
}
