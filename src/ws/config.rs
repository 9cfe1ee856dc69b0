//! Dial configuration and authority resolution.

use super::error::{Error, UriInput};
use crate::socket::dialer::Dialer;
use crate::socket::tls::TlsConfig;
use http::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use url::Url;

/// Default ports for the schemes this crate dials.
const DEFAULT_PORTS: &[(&str, u16)] = &[("ws", 80), ("wss", 443)];

/// Schemes whose transport is wrapped in TLS.
const SECURE_SCHEMES: &[&str] = &["wss"];

/// The default port for `scheme`, if it is a recognized WebSocket scheme.
pub fn default_port(scheme: &str) -> Option<u16> {
    DEFAULT_PORTS.iter().find(|(name, _)| *name == scheme).map(|(_, port)| *port)
}

pub fn is_secure_scheme(scheme: &str) -> bool {
    SECURE_SCHEMES.contains(&scheme)
}

/// Compute the `host:port` authority to dial for `location`.
///
/// An explicit port is kept. Otherwise recognized schemes get their default
/// port appended and any other scheme yields the bare host, leaving the
/// dialer to resolve it.
///
/// `Url` drops a port equal to the default of a scheme it knows (`http`,
/// `https`, `ftp` and the WebSocket schemes), so for those schemes the known
/// default stands in for the explicit port.
pub fn authority(location: &Url) -> String {
    let host = location.host_str().unwrap_or_default();
    let port = location
        .port()
        .or_else(|| default_port(location.scheme()))
        .or_else(|| location.port_or_known_default());
    match port {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

/// WebSocket protocol revision spoken during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ProtocolVersion {
    /// RFC 6455.
    #[default]
    Hybi13,
}

impl ProtocolVersion {
    /// Value sent in `Sec-WebSocket-Version`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolVersion::Hybi13 => "13",
        }
    }
}

/// Parameters for one WebSocket connection attempt.
///
/// A config may be built incrementally; `location` and `origin` are only
/// required to be set when it is dialed. Dialing never mutates it, so one
/// config can be reused for sequential dials.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Server URI, e.g. `wss://example.com/socket`.
    pub location: Option<Url>,
    /// Origin claimed by the connecting client.
    pub origin: Option<Url>,
    pub version: ProtocolVersion,
    /// Requested sub-protocols, in preference order.
    pub protocols: Vec<String>,
    /// Extra headers sent with the upgrade request.
    pub headers: HeaderMap,
    /// Transport dialer; `TcpDialer::default()` when unset.
    pub dialer: Option<Arc<dyn Dialer>>,
    /// TLS settings for the secure scheme; defaults apply when unset.
    pub tls: Option<TlsConfig>,
}

impl Config {
    /// Create a client config from a server URI and an origin URI.
    ///
    /// # Example
    /// ```
    /// let config = wsnet::ws::Config::new("ws://localhost:8080/chat", "http://localhost/")?;
    /// assert_eq!(config.authority().as_deref(), Some("localhost:8080"));
    /// # Ok::<(), wsnet::ws::Error>(())
    /// ```
    pub fn new(server: &str, origin: &str) -> Result<Self, Error> {
        let location = parse_request_uri(server, UriInput::Location)?;
        let origin = parse_request_uri(origin, UriInput::Origin)?;

        Ok(Self {
            location: Some(location),
            origin: Some(origin),
            ..Self::default()
        })
    }

    pub fn with_location(mut self, location: Url) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_version(mut self, version: ProtocolVersion) -> Self {
        self.version = version;
        self
    }

    /// Add a sub-protocol to the request list.
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocols.push(protocol.into());
        self
    }

    /// Append a header value; earlier values for the same name are kept.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_dialer(mut self, dialer: Arc<dyn Dialer>) -> Self {
        self.dialer = Some(dialer);
        self
    }

    pub fn with_tls_config(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    /// The authority to dial, or `None` without a location.
    pub fn authority(&self) -> Option<String> {
        self.location.as_ref().map(authority)
    }

    /// Check if secure (wss://).
    pub fn is_secure(&self) -> bool {
        self.location.as_ref().is_some_and(|u| is_secure_scheme(u.scheme()))
    }
}

fn parse_request_uri(raw: &str, input: UriInput) -> Result<Url, Error> {
    let url = Url::parse(raw).map_err(|source| Error::InvalidUri { input, source })?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::InvalidUri {
            input,
            source: url::ParseError::EmptyHost,
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_new_config() {
        let config = Config::new("ws://example.com/chat?room=1", "http://example.com/").unwrap();
        assert_eq!(config.location, Some(url("ws://example.com/chat?room=1")));
        assert_eq!(config.origin, Some(url("http://example.com/")));
        assert_eq!(config.version, ProtocolVersion::Hybi13);
        assert!(config.protocols.is_empty());
        assert!(config.headers.is_empty());
        assert!(config.dialer.is_none());
    }

    #[test]
    fn test_new_config_bad_location() {
        let err = Config::new("not a uri", "http://example.com/").unwrap_err();
        assert!(matches!(err, Error::InvalidUri { input: UriInput::Location, .. }));
    }

    #[test]
    fn test_new_config_bad_origin() {
        let err = Config::new("ws://example.com/", "/relative").unwrap_err();
        assert!(matches!(err, Error::InvalidUri { input: UriInput::Origin, .. }));
    }

    #[test]
    fn test_new_config_requires_host() {
        let err = Config::new("ws://example.com/", "mailto:someone").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidUri {
                input: UriInput::Origin,
                source: url::ParseError::EmptyHost
            }
        ));
    }

    #[test]
    fn test_authority_default_ports() {
        assert_eq!(authority(&url("ws://host")), "host:80");
        assert_eq!(authority(&url("wss://host")), "host:443");
        assert_eq!(authority(&url("ws://host:9999")), "host:9999");
        assert_eq!(authority(&url("wss://host:80/x")), "host:80");
        assert_eq!(authority(&url("ws://host:80")), "host:80");
    }

    #[test]
    fn test_authority_unknown_scheme() {
        assert_eq!(authority(&url("custom://host")), "host");
        assert_eq!(authority(&url("custom://host:7000")), "host:7000");
        assert_eq!(authority(&url("https://host:443/")), "host:443");
        assert_eq!(authority(&url("http://host:80/")), "host:80");
        assert_eq!(authority(&url("ftp://host:21/")), "host:21");
        assert_eq!(authority(&url("https://host:8443/")), "host:8443");
    }

    #[test]
    fn test_authority_ipv6() {
        assert_eq!(authority(&url("ws://[::1]/")), "[::1]:80");
        assert_eq!(authority(&url("wss://[::1]:8443/")), "[::1]:8443");
    }

    #[test]
    fn test_authority_idempotent() {
        let location = url("wss://example.com/feed");
        let before = location.clone();
        assert_eq!(authority(&location), authority(&location));
        assert_eq!(location, before);
    }

    #[test]
    fn test_headers_keep_order_within_name() {
        let config = Config::default()
            .with_header(header::COOKIE, HeaderValue::from_static("a=1"))
            .with_header(header::USER_AGENT, HeaderValue::from_static("wsnet"))
            .with_header(header::COOKIE, HeaderValue::from_static("b=2"));

        let cookies: Vec<_> = config.headers.get_all(header::COOKIE).iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_is_secure() {
        assert!(Config::default().with_location(url("wss://a/")).is_secure());
        assert!(!Config::default().with_location(url("ws://a/")).is_secure());
        assert!(!Config::default().is_secure());
    }
}
