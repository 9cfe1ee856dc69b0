use crate::base::neterror::NetError;
use std::io;

#[test]
fn test_net_error_roundtrip() {
    let original = NetError::ConnectionRefused;
    let code = original.as_i32();
    assert_eq!(code, -102);
    let converted = NetError::from(code);
    assert!(matches!(converted, NetError::ConnectionRefused));

    let ws = NetError::WsProtocolError;
    assert_eq!(ws.as_i32(), -145);
    assert_eq!(NetError::from(-145), NetError::WsProtocolError);
}

#[test]
fn test_cert_error_codes_roundtrip() {
    for err in [
        NetError::CertCommonNameInvalid,
        NetError::CertDateInvalid,
        NetError::CertAuthorityInvalid,
        NetError::CertInvalid,
    ] {
        assert_eq!(NetError::from(err.as_i32()), err);
    }
    assert_eq!(NetError::CertAuthorityInvalid.as_i32(), -202);
}

#[test]
fn test_unknown_error() {
    let err = NetError::from(-9999);
    assert!(matches!(err, NetError::Unknown(-9999)));
    assert_eq!(err.as_i32(), -9999);
}

#[test]
fn test_io_error_classification() {
    let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
    assert_eq!(NetError::from_io_error(&refused), NetError::ConnectionRefused);

    let timed_out = io::Error::new(io::ErrorKind::TimedOut, "connect timed out");
    assert_eq!(NetError::from_io_error(&timed_out), NetError::ConnectionTimedOut);

    let pipe = io::Error::from(io::ErrorKind::BrokenPipe);
    assert_eq!(NetError::from_io_error(&pipe), NetError::ConnectionReset);

    let eof = io::Error::from(io::ErrorKind::UnexpectedEof);
    assert_eq!(NetError::from_io_error(&eof), NetError::ConnectionClosed);

    // lookup_host failures carry no specific kind
    let other = io::Error::new(io::ErrorKind::Other, "failed to lookup address information");
    assert_eq!(NetError::from_io_error(&other), NetError::ConnectionFailed);
}
