use std::fmt;

#[derive(Debug)]
pub enum NetError {
    Io(std::io::Error),
    WebSocket(tokio_websockets::Error),
    ConnectionClosed,
    Protocol(String),
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Io(err) => write!(f, "io error: {err}"),
            NetError::WebSocket(err) => write!(f, "websocket error: {err}"),
            NetError::ConnectionClosed => write!(f, "connection closed"),
            NetError::Protocol(msg) => write!(f, "protocol error: {msg}"),
        }
    }
}

impl std::error::Error for NetError {}

impl From<std::io::Error> for NetError {
    fn from(err: std::io::Error) -> Self {
        NetError::Io(err)
    }
}

impl From<tokio_websockets::Error> for NetError {
    fn from(err: tokio_websockets::Error) -> Self {
        NetError::WebSocket(err)
    }
}
