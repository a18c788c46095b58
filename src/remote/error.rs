// ABOUTME: Remote layer error types with SNAFU pattern.
// ABOUTME: Transport, protocol decoding, and dispatch failures.

use std::net::SocketAddr;

use snafu::Snafu;

/// Failure to reach a remote manager or to make sense of its answer.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RemoteError {
    #[snafu(display("no endpoint known for resource {resource}"))]
    UnknownResource { resource: String },

    #[snafu(display("failed to connect to {addr}: {source}"))]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[snafu(display("I/O error talking to {addr}: {source}"))]
    Io {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[snafu(display("request to {addr} timed out"))]
    Timeout { addr: SocketAddr },

    #[snafu(display("connection to {addr} closed before a response arrived"))]
    Closed { addr: SocketAddr },

    #[snafu(display("malformed message: {source}"))]
    Malformed { source: serde_json::Error },

    #[snafu(display("unknown operation {name}"))]
    UnknownOperation { name: String },

    #[snafu(display("remote endpoint reported: {message}"))]
    Endpoint { message: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The endpoint of a resource could not be resolved.
    Resolution,
    /// Network-level failure (connect, I/O, timeout, closed).
    Transport,
    /// A message could not be decoded.
    Protocol,
    /// The server has no operation of that name.
    UnknownOperation,
    /// The server failed to handle the request.
    Endpoint,
}

impl RemoteError {
    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            RemoteError::UnknownResource { .. } => RemoteErrorKind::Resolution,
            RemoteError::Connect { .. }
            | RemoteError::Io { .. }
            | RemoteError::Timeout { .. }
            | RemoteError::Closed { .. } => RemoteErrorKind::Transport,
            RemoteError::Malformed { .. } => RemoteErrorKind::Protocol,
            RemoteError::UnknownOperation { .. } => RemoteErrorKind::UnknownOperation,
            RemoteError::Endpoint { .. } => RemoteErrorKind::Endpoint,
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(source: serde_json::Error) -> Self {
        RemoteError::Malformed { source }
    }
}
