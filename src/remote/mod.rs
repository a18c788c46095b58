// ABOUTME: Remote control surface: named operations, envelopes, transports, and the client proxy.
// ABOUTME: A ContainerClient presents the same ContainerOperations as a local manager.

mod client;
mod envelope;
mod error;
pub mod names;
mod server;
mod tcp;
mod transport;

pub use client::{ContainerClient, EndpointResolver, StaticResolver};
pub use envelope::ResultEnvelope;
pub use error::{RemoteError, RemoteErrorKind};
pub use server::ContainerServer;
pub use tcp::{DEFAULT_TIMEOUT, MAX_REQUEST_LEN, TcpInvoker, serve, serve_with_timeout};
pub use transport::{Invoker, LocalInvoker, Request, Response};
